pub mod buffer;
pub mod codec;
pub mod frame;

pub use buffer::PixelBuffer;
pub use codec::{FrameCodec, ImageCodec, OutputFormat};
pub use frame::{EncodedImage, Frame, FrameSequence, FrameStore};
