use crate::{
    foundation::error::{FxError, FxResult},
    frames::Frame,
};

/// Pre-sized output slots, each written exactly once by index.
#[derive(Clone, Debug, Default)]
pub struct OutputSequence {
    slots: Vec<Option<Frame>>,
    filled: usize,
}

impl OutputSequence {
    pub fn with_len(len: usize) -> Self {
        Self {
            slots: vec![None; len],
            filled: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn filled(&self) -> usize {
        self.filled
    }

    pub fn is_complete(&self) -> bool {
        self.filled == self.slots.len()
    }

    pub fn fill(&mut self, index: usize, frame: Frame) -> FxResult<()> {
        let len = self.slots.len();
        let slot = self
            .slots
            .get_mut(index)
            .ok_or_else(|| FxError::sequencer(format!("output slot {index} out of range ({len})")))?;
        if slot.is_some() {
            return Err(FxError::sequencer(format!(
                "output slot {index} written twice"
            )));
        }
        *slot = Some(frame);
        self.filled += 1;
        Ok(())
    }

    pub fn get(&self, index: usize) -> Option<&Frame> {
        self.slots.get(index).and_then(Option::as_ref)
    }

    /// Iterate frames in order; fails if any slot is still empty.
    pub fn frames(&self) -> FxResult<impl Iterator<Item = &Frame>> {
        if !self.is_complete() {
            return Err(FxError::sequencer(format!(
                "output sequence incomplete: {}/{} frames",
                self.filled,
                self.slots.len()
            )));
        }
        Ok(self.slots.iter().flatten())
    }

    pub fn into_frames(self) -> FxResult<Vec<Frame>> {
        if !self.is_complete() {
            return Err(FxError::sequencer(format!(
                "output sequence incomplete: {}/{} frames",
                self.filled,
                self.slots.len()
            )));
        }
        Ok(self.slots.into_iter().flatten().collect())
    }
}
