use crate::{
    composite::crossfade_in_place,
    foundation::error::{FxError, FxResult},
    frames::{Frame, FrameCodec, FrameStore},
};

/// Which inputs feed output frame `index`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum CrossFadeRegion {
    /// Untouched `input1[i]`.
    First(usize),
    /// `input1[i]` blended with `input2[j]`; `t` is the weight of input2.
    Blend { i: usize, j: usize, t: f32 },
    /// Untouched `input2[j]`.
    Second(usize),
}

/// Plays input1 then input2, blending across `overlap` frames.
#[derive(Clone, Debug)]
pub struct CrossFade {
    overlap: usize,
    len1: usize,
    duration: usize,
}

impl CrossFade {
    pub fn setup(inputs: &FrameStore, overlap_sec: f64) -> FxResult<Self> {
        let input1 = inputs.input1()?;
        let input2 = inputs.input2()?;
        if input1.canvas() != input2.canvas() {
            let (a, b) = (input1.canvas(), input2.canvas());
            return Err(FxError::validation(format!(
                "cross fade inputs differ in size: {}x{} vs {}x{}",
                a.width, a.height, b.width, b.height
            )));
        }
        let overlap = inputs.fps().frames_for_secs(overlap_sec, "overlap_sec")?;
        if overlap > input1.len() || overlap > input2.len() {
            return Err(FxError::validation(format!(
                "cross fade overlap of {overlap} frames is longer than an input ({} / {} frames)",
                input1.len(),
                input2.len()
            )));
        }
        Ok(Self {
            overlap,
            len1: input1.len(),
            duration: input1.len() + input2.len() - overlap,
        })
    }

    pub fn output_duration(&self) -> usize {
        self.duration
    }

    pub fn overlap(&self) -> usize {
        self.overlap
    }

    pub fn region(&self, index: usize) -> CrossFadeRegion {
        let blend_start = self.len1 - self.overlap;
        if index < blend_start {
            CrossFadeRegion::First(index)
        } else if index < self.len1 {
            let j = index - blend_start;
            CrossFadeRegion::Blend {
                i: index,
                j,
                t: j as f32 / self.overlap as f32,
            }
        } else {
            CrossFadeRegion::Second(index - blend_start)
        }
    }

    pub async fn process<C: FrameCodec>(
        &self,
        index: usize,
        inputs: &FrameStore,
        codec: &C,
    ) -> FxResult<Frame> {
        if index >= self.duration {
            return Err(FxError::sequencer(format!(
                "cross fade index {index} out of range"
            )));
        }
        let input1 = inputs.input1()?;
        let input2 = inputs.input2()?;
        let missing =
            |which: &str, k: usize| FxError::sequencer(format!("{which} has no frame {k}"));

        match self.region(index) {
            CrossFadeRegion::First(i) => {
                input1.get(i).cloned().ok_or_else(|| missing("input1", i))
            }
            CrossFadeRegion::Second(j) => {
                input2.get(j).cloned().ok_or_else(|| missing("input2", j))
            }
            CrossFadeRegion::Blend { i, j, t } => {
                let a = input1.get(i).ok_or_else(|| missing("input1", i))?;
                let b = input2.get(j).ok_or_else(|| missing("input2", j))?;
                let (mut a, b) = tokio::try_join!(codec.decode(index, a), codec.decode(index, b))?;
                crossfade_in_place(&mut a, &b, t)
                    .map_err(|e| FxError::decode(index, e.to_string()))?;
                codec.store(a)
            }
        }
    }
}
