use std::future::Future;

use crate::{
    foundation::error::{FxError, FxResult},
    frames::{buffer::PixelBuffer, frame::Frame},
};

/// Decode/re-encode seam between the effects and the frame representation.
///
/// `decode` is the single suspension point of pixel-level effects: a run
/// yields there while the frame is turned into a raster.
pub trait FrameCodec {
    fn decode(
        &self,
        index: usize,
        frame: &Frame,
    ) -> impl Future<Output = FxResult<PixelBuffer>> + Send;

    /// Convert a finished raster into the output frame representation.
    fn store(&self, buf: PixelBuffer) -> FxResult<Frame>;
}

#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    /// Keep output frames as shared raw RGBA buffers.
    #[default]
    Raw,
    /// Compress each output frame to PNG.
    Png,
}

/// Default codec backed by the `image` crate.
///
/// Compressed frames are decoded on tokio's blocking pool; raw frames are
/// copied without leaving the task.
#[derive(Clone, Copy, Debug, Default)]
pub struct ImageCodec {
    output: OutputFormat,
}

impl ImageCodec {
    pub fn new(output: OutputFormat) -> Self {
        Self { output }
    }

    pub fn output_format(&self) -> OutputFormat {
        self.output
    }
}

impl FrameCodec for ImageCodec {
    async fn decode(&self, index: usize, frame: &Frame) -> FxResult<PixelBuffer> {
        match frame {
            Frame::Raw(buf) => Ok(PixelBuffer::clone(buf)),
            Frame::Encoded(_) => {
                let frame = frame.clone();
                tokio::task::spawn_blocking(move || frame.decode(index))
                    .await
                    .map_err(|e| FxError::decode(index, format!("decode task failed: {e}")))?
            }
        }
    }

    fn store(&self, buf: PixelBuffer) -> FxResult<Frame> {
        match self.output {
            OutputFormat::Raw => Ok(Frame::raw(buf)),
            OutputFormat::Png => Frame::encode_png(&buf),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn decodes_raw_and_png_frames_identically() {
        let mut src = PixelBuffer::filled(3, 2, [5, 6, 7, 8]).unwrap();
        src.set_pixel(0, 1, [200, 100, 50, 25]);

        let codec = ImageCodec::default();
        let raw = Frame::raw(src.clone());
        let png = Frame::encode_png(&src).unwrap();

        assert_eq!(codec.decode(0, &raw).await.unwrap(), src);
        assert_eq!(codec.decode(1, &png).await.unwrap(), src);
    }

    #[test]
    fn store_respects_output_format() {
        let buf = PixelBuffer::filled(2, 2, [1, 2, 3, 4]).unwrap();
        assert!(matches!(
            ImageCodec::new(OutputFormat::Raw).store(buf.clone()).unwrap(),
            Frame::Raw(_)
        ));
        assert!(matches!(
            ImageCodec::new(OutputFormat::Png).store(buf).unwrap(),
            Frame::Encoded(_)
        ));
    }
}
