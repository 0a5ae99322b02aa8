use std::{io::Cursor, sync::Arc};

use anyhow::Context as _;
use image::ImageEncoder as _;

use crate::{
    foundation::core::{Canvas, Fps},
    foundation::error::{FxError, FxResult},
    frames::buffer::PixelBuffer,
};

/// Compressed frame payload with its declared dimensions.
#[derive(Debug, PartialEq, Eq)]
pub struct EncodedImage {
    pub width: u32,
    pub height: u32,
    pub format: image::ImageFormat,
    pub bytes: Vec<u8>,
}

/// Cheap-to-clone handle to one video frame.
///
/// Cloning shares the payload; effects that only reorder frames never copy pixels.
#[derive(Clone, Debug)]
pub enum Frame {
    Raw(Arc<PixelBuffer>),
    Encoded(Arc<EncodedImage>),
}

impl Frame {
    pub fn raw(buf: PixelBuffer) -> Self {
        Self::Raw(Arc::new(buf))
    }

    pub fn encode_png(buf: &PixelBuffer) -> FxResult<Self> {
        let mut bytes = Vec::new();
        image::codecs::png::PngEncoder::new(&mut bytes)
            .write_image(
                buf.data(),
                buf.width(),
                buf.height(),
                image::ExtendedColorType::Rgba8,
            )
            .map_err(|e| FxError::encode(format!("png encode failed: {e}")))?;
        Ok(Self::Encoded(Arc::new(EncodedImage {
            width: buf.width(),
            height: buf.height(),
            format: image::ImageFormat::Png,
            bytes,
        })))
    }

    /// Wrap already-compressed image bytes, reading only the header for dimensions.
    pub fn from_encoded_bytes(bytes: Vec<u8>) -> FxResult<Self> {
        let reader = image::ImageReader::new(Cursor::new(&bytes))
            .with_guessed_format()
            .context("guess encoded frame format")?;
        let format = reader
            .format()
            .ok_or_else(|| FxError::validation("unrecognized encoded frame format"))?;
        let (width, height) = reader
            .into_dimensions()
            .context("read encoded frame dimensions")?;
        Ok(Self::Encoded(Arc::new(EncodedImage {
            width,
            height,
            format,
            bytes,
        })))
    }

    pub fn canvas(&self) -> Canvas {
        match self {
            Self::Raw(buf) => buf.canvas(),
            Self::Encoded(img) => Canvas {
                width: img.width,
                height: img.height,
            },
        }
    }

    /// Decode into an owned raster. `index` only labels the error.
    pub fn decode(&self, index: usize) -> FxResult<PixelBuffer> {
        match self {
            Self::Raw(buf) => Ok(PixelBuffer::clone(buf)),
            Self::Encoded(img) => {
                let dyn_img = image::load_from_memory_with_format(&img.bytes, img.format)
                    .map_err(|e| FxError::decode(index, e.to_string()))?;
                let rgba = dyn_img.to_rgba8();
                let (width, height) = rgba.dimensions();
                if width != img.width || height != img.height {
                    return Err(FxError::decode(
                        index,
                        format!(
                            "decoded {width}x{height} but frame declares {}x{}",
                            img.width, img.height
                        ),
                    ));
                }
                PixelBuffer::from_raw(width, height, rgba.into_raw())
                    .map_err(|e| FxError::decode(index, e.to_string()))
            }
        }
    }

    /// `true` when both handles share the same payload.
    pub fn ptr_eq(&self, other: &Frame) -> bool {
        match (self, other) {
            (Self::Raw(a), Self::Raw(b)) => Arc::ptr_eq(a, b),
            (Self::Encoded(a), Self::Encoded(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

/// Ordered, immutable frames of one input stream.
#[derive(Clone, Debug)]
pub struct FrameSequence {
    canvas: Canvas,
    frames: Vec<Frame>,
}

impl FrameSequence {
    pub fn new(canvas: Canvas, frames: Vec<Frame>) -> FxResult<Self> {
        if canvas.width == 0 || canvas.height == 0 {
            return Err(FxError::validation(
                "frame sequence width/height must be non-zero",
            ));
        }
        if let Some((i, f)) = frames
            .iter()
            .enumerate()
            .find(|(_, f)| f.canvas() != canvas)
        {
            let c = f.canvas();
            return Err(FxError::validation(format!(
                "frame {i} is {}x{}, sequence is {}x{}",
                c.width, c.height, canvas.width, canvas.height
            )));
        }
        Ok(Self { canvas, frames })
    }

    pub fn from_buffers(buffers: Vec<PixelBuffer>) -> FxResult<Self> {
        let canvas = buffers
            .first()
            .map(PixelBuffer::canvas)
            .ok_or_else(|| FxError::validation("frame sequence needs at least one buffer"))?;
        Self::new(canvas, buffers.into_iter().map(Frame::raw).collect())
    }

    pub fn canvas(&self) -> Canvas {
        self.canvas
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Frame> {
        self.frames.get(index)
    }

    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }
}

/// The inputs of one run: up to two streams plus the frame rate used for
/// seconds-to-frames conversion.
#[derive(Clone, Debug)]
pub struct FrameStore {
    input1: Option<FrameSequence>,
    input2: Option<FrameSequence>,
    fps: Fps,
}

impl FrameStore {
    pub fn new(fps: Fps) -> Self {
        Self {
            input1: None,
            input2: None,
            fps,
        }
    }

    pub fn with_input1(mut self, seq: FrameSequence) -> Self {
        self.input1 = Some(seq);
        self
    }

    pub fn with_input2(mut self, seq: FrameSequence) -> Self {
        self.input2 = Some(seq);
        self
    }

    pub fn fps(&self) -> Fps {
        self.fps
    }

    pub fn input1(&self) -> FxResult<&FrameSequence> {
        self.input1
            .as_ref()
            .ok_or_else(|| FxError::validation("effect requires input1"))
    }

    pub fn input2(&self) -> FxResult<&FrameSequence> {
        self.input2
            .as_ref()
            .ok_or_else(|| FxError::validation("effect requires a second input (input2)"))
    }
}
