use crate::{
    foundation::error::{FxError, FxResult},
    frames::{Frame, FrameStore},
};

/// Plays input1 backwards by reordering frame handles; never decodes.
#[derive(Clone, Debug)]
pub struct Reverse {
    duration: usize,
}

impl Reverse {
    pub fn setup(inputs: &FrameStore) -> FxResult<Self> {
        Ok(Self {
            duration: inputs.input1()?.len(),
        })
    }

    pub fn output_duration(&self) -> usize {
        self.duration
    }

    pub fn process(&self, index: usize, inputs: &FrameStore) -> FxResult<Frame> {
        let src = self
            .duration
            .checked_sub(1 + index)
            .ok_or_else(|| FxError::sequencer(format!("reverse index {index} out of range")))?;
        inputs
            .input1()?
            .get(src)
            .cloned()
            .ok_or_else(|| FxError::sequencer(format!("input1 has no frame {src}")))
    }
}
