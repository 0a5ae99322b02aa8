use crate::{
    foundation::core::Canvas,
    foundation::error::{FxError, FxResult},
};

/// Decoded RGBA8 raster, straight (non-premultiplied) alpha, row-major.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl PixelBuffer {
    /// Fully transparent black buffer.
    pub fn new(width: u32, height: u32) -> FxResult<Self> {
        let len = expected_len(width, height)?;
        Ok(Self {
            width,
            height,
            data: vec![0u8; len],
        })
    }

    pub fn from_raw(width: u32, height: u32, data: Vec<u8>) -> FxResult<Self> {
        let len = expected_len(width, height)?;
        if data.len() != len {
            return Err(FxError::validation(format!(
                "pixel buffer expects {len} bytes for {width}x{height}, got {}",
                data.len()
            )));
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Buffer filled with a single RGBA value.
    pub fn filled(width: u32, height: u32, rgba: [u8; 4]) -> FxResult<Self> {
        let mut buf = Self::new(width, height)?;
        for px in buf.data.chunks_exact_mut(4) {
            px.copy_from_slice(&rgba);
        }
        Ok(buf)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn canvas(&self) -> Canvas {
        Canvas {
            width: self.width,
            height: self.height,
        }
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    pub fn into_raw(self) -> Vec<u8> {
        self.data
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = ((y as usize) * (self.width as usize) + (x as usize)) * 4;
        Some([
            self.data[idx],
            self.data[idx + 1],
            self.data[idx + 2],
            self.data[idx + 3],
        ])
    }

    pub fn set_pixel(&mut self, x: u32, y: u32, rgba: [u8; 4]) {
        if x >= self.width || y >= self.height {
            return;
        }
        let idx = ((y as usize) * (self.width as usize) + (x as usize)) * 4;
        self.data[idx..idx + 4].copy_from_slice(&rgba);
    }

    pub fn same_size(&self, other: &PixelBuffer) -> bool {
        self.width == other.width && self.height == other.height
    }
}

fn expected_len(width: u32, height: u32) -> FxResult<usize> {
    Canvas { width, height }
        .byte_len()
        .ok_or_else(|| FxError::validation("pixel buffer size overflow"))
}
