use std::collections::VecDeque;

use crate::{
    composite::mean_opaque,
    foundation::error::{FxError, FxResult},
    frames::{Frame, FrameCodec, FrameStore, PixelBuffer},
};

/// Temporal box blur over the last `window` decoded frames.
///
/// Frames must be processed in ascending order; the window is the rolling state.
#[derive(Debug)]
pub struct MotionBlur {
    window: usize,
    duration: usize,
    recent: VecDeque<PixelBuffer>,
    next_index: usize,
}

impl MotionBlur {
    pub fn setup(inputs: &FrameStore, window_frames: u32) -> FxResult<Self> {
        if window_frames == 0 {
            return Err(FxError::validation("motion blur window_frames must be >= 1"));
        }
        let window = window_frames as usize;
        let duration = inputs.input1()?.len();
        Ok(Self {
            window,
            duration,
            // The window never holds more buffers than there are frames.
            recent: VecDeque::with_capacity(window.min(duration)),
            next_index: 0,
        })
    }

    pub fn output_duration(&self) -> usize {
        self.duration
    }

    pub async fn process<C: FrameCodec>(
        &mut self,
        index: usize,
        inputs: &FrameStore,
        codec: &C,
    ) -> FxResult<Frame> {
        if index != self.next_index {
            return Err(FxError::sequencer(format!(
                "motion blur expects frame {} next, got {index}",
                self.next_index
            )));
        }
        let frame = inputs
            .input1()?
            .get(index)
            .ok_or_else(|| FxError::sequencer(format!("input1 has no frame {index}")))?;
        let buf = codec.decode(index, frame).await?;

        self.recent.push_back(buf);
        while self.recent.len() > self.window {
            self.recent.pop_front();
        }
        self.next_index = index + 1;

        let out = mean_opaque(&self.recent)?;
        codec.store(out)
    }
}
