use crate::{
    composite::{CropRect, sample_crop_scaled},
    foundation::core::Canvas,
    foundation::error::{FxError, FxResult},
    foundation::math::hash_unit,
    frames::{Frame, FrameCodec, FrameStore},
};

/// Random pan and zoom: each frame shows a jittered crop scaled back to full size.
#[derive(Clone, Debug)]
pub struct Earthquake {
    strength: u32,
    seed: u64,
    canvas: Canvas,
    duration: usize,
}

impl Earthquake {
    pub fn setup(inputs: &FrameStore, strength_px: u32, seed: u64) -> FxResult<Self> {
        let input1 = inputs.input1()?;
        let canvas = input1.canvas();
        let span = u64::from(strength_px) * 2;
        if span >= u64::from(canvas.width.min(canvas.height)) {
            return Err(FxError::validation(format!(
                "earthquake strength {strength_px}px leaves no crop region in {}x{}",
                canvas.width, canvas.height
            )));
        }
        Ok(Self {
            strength: strength_px,
            seed,
            canvas,
            duration: input1.len(),
        })
    }

    pub fn output_duration(&self) -> usize {
        self.duration
    }

    /// Crop rectangle for frame `index`; origin drawn from `[0, 2 * strength)` per axis.
    pub fn crop_for(&self, index: usize) -> CropRect {
        let span = 2.0 * f64::from(self.strength);
        CropRect {
            x: hash_unit(self.seed, index as u64, 0) * span,
            y: hash_unit(self.seed, index as u64, 1) * span,
            width: f64::from(self.canvas.width) - span,
            height: f64::from(self.canvas.height) - span,
        }
    }

    pub async fn process<C: FrameCodec>(
        &self,
        index: usize,
        inputs: &FrameStore,
        codec: &C,
    ) -> FxResult<Frame> {
        let frame = inputs
            .input1()?
            .get(index)
            .ok_or_else(|| FxError::sequencer(format!("input1 has no frame {index}")))?;
        let buf = codec.decode(index, frame).await?;
        let out = sample_crop_scaled(&buf, self.crop_for(index))
            .map_err(|e| FxError::decode(index, e.to_string()))?;
        codec.store(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        foundation::core::Fps,
        frames::{FrameSequence, PixelBuffer},
    };

    fn store(w: u32, h: u32, n: usize) -> FrameStore {
        let bufs = vec![PixelBuffer::new(w, h).unwrap(); n];
        FrameStore::new(Fps::default()).with_input1(FrameSequence::from_buffers(bufs).unwrap())
    }

    #[test]
    fn strength_must_leave_a_crop_region() {
        assert!(Earthquake::setup(&store(10, 8, 1), 3, 0).is_ok());
        assert!(Earthquake::setup(&store(10, 8, 1), 4, 0).unwrap_err().is_validation());
        assert!(Earthquake::setup(&store(10, 8, 1), u32::MAX, 0).is_err());
    }

    #[test]
    fn crops_stay_inside_the_frame() {
        let fx = Earthquake::setup(&store(32, 24, 1), 5, 99).unwrap();
        for i in 0..200 {
            let c = fx.crop_for(i);
            assert!(c.x >= 0.0 && c.x < 10.0);
            assert!(c.y >= 0.0 && c.y < 10.0);
            assert_eq!((c.width, c.height), (22.0, 14.0));
            assert!(c.x + c.width < 32.0);
        }
    }

    #[test]
    fn jitter_is_seeded() {
        let a = Earthquake::setup(&store(32, 32, 1), 4, 7).unwrap();
        let b = Earthquake::setup(&store(32, 32, 1), 4, 7).unwrap();
        let c = Earthquake::setup(&store(32, 32, 1), 4, 8).unwrap();
        assert_eq!(a.crop_for(3), b.crop_for(3));
        assert_ne!(a.crop_for(3), c.crop_for(3));
    }

    #[test]
    fn zero_strength_is_the_full_frame() {
        let fx = Earthquake::setup(&store(6, 4, 1), 0, 1).unwrap();
        assert_eq!(
            fx.crop_for(0),
            CropRect {
                x: 0.0,
                y: 0.0,
                width: 6.0,
                height: 4.0
            }
        );
    }
}
