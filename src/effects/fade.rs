use crate::{
    composite::scale_in_place,
    foundation::error::{FxError, FxResult},
    frames::{Frame, FrameCodec, FrameStore},
};

/// Brightness-and-alpha ramp in from black at the start and out at the end.
#[derive(Clone, Debug)]
pub struct FadeInOut {
    fade_in_frames: usize,
    fade_out_frames: usize,
    duration: usize,
}

impl FadeInOut {
    pub fn setup(inputs: &FrameStore, fade_in_sec: f64, fade_out_sec: f64) -> FxResult<Self> {
        let duration = inputs.input1()?.len();
        let fps = inputs.fps();
        let fade_in_frames = fps.frames_for_secs(fade_in_sec, "fade_in_sec")?;
        let fade_out_frames = fps.frames_for_secs(fade_out_sec, "fade_out_sec")?;
        Ok(Self {
            fade_in_frames,
            fade_out_frames,
            duration,
        })
    }

    pub fn output_duration(&self) -> usize {
        self.duration
    }

    pub fn fade_in_frames(&self) -> usize {
        self.fade_in_frames
    }

    pub fn fade_out_frames(&self) -> usize {
        self.fade_out_frames
    }

    pub fn multiplier(&self, index: usize) -> f32 {
        fade_multiplier(index, self.duration, self.fade_in_frames, self.fade_out_frames)
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
        let mut buf = codec.decode(index, frame).await?;
        scale_in_place(&mut buf, self.multiplier(index));
        codec.store(buf)
    }
}

/// Multiplier for frame `index` of `duration`.
///
/// The fade-out ramp mirrors the fade-in ramp: counting `j = duration - 1 - index`
/// from the last frame, `m = j / fade_out` while `j < fade_out`. Both the first
/// and the last frame therefore reach exactly 0 when their fade is non-empty.
/// Where the ramps overlap the smaller multiplier wins.
pub fn fade_multiplier(index: usize, duration: usize, fade_in: usize, fade_out: usize) -> f32 {
    let mut m = 1.0f32;
    if index < fade_in {
        m = m.min(index as f32 / fade_in as f32);
    }
    if let Some(from_end) = duration.checked_sub(index + 1)
        && from_end < fade_out
    {
        m = m.min(from_end as f32 / fade_out as f32);
    }
    m
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        foundation::core::Fps,
        frames::{FrameSequence, PixelBuffer},
    };

    #[test]
    fn two_frame_fades_over_six_frames() {
        let ms: Vec<f32> = (0..6).map(|i| fade_multiplier(i, 6, 2, 2)).collect();
        assert_eq!(ms, vec![0.0, 0.5, 1.0, 1.0, 0.5, 0.0]);
    }

    #[test]
    fn zero_length_fades_leave_frames_untouched() {
        assert!((0..5).all(|i| fade_multiplier(i, 5, 0, 0) == 1.0));
    }

    #[test]
    fn ramps_are_monotonic() {
        let (d, fi, fo) = (40, 12, 9);
        let ms: Vec<f32> = (0..d).map(|i| fade_multiplier(i, d, fi, fo)).collect();
        assert_eq!(ms[0], 0.0);
        assert_eq!(ms[d - 1], 0.0);
        assert!(ms[..fi].windows(2).all(|w| w[0] <= w[1]));
        assert!(ms[d - fo..].windows(2).all(|w| w[0] >= w[1]));
        assert!(ms[fi..d - fo].iter().all(|&m| m == 1.0));
        assert!(ms.iter().all(|m| (0.0..=1.0).contains(m)));
    }

    #[test]
    fn fades_longer_than_the_clip_never_reach_full_brightness() {
        let bufs = vec![PixelBuffer::new(1, 1).unwrap(); 3];
        let inputs = FrameStore::new(Fps::new(10, 1).unwrap())
            .with_input1(FrameSequence::from_buffers(bufs).unwrap());
        let fx = FadeInOut::setup(&inputs, 1.0, 0.0).unwrap();
        assert_eq!(fx.fade_in_frames(), 10);
        let ms: Vec<f32> = (0..3).map(|i| fx.multiplier(i)).collect();
        assert_eq!(ms, vec![0.0, 0.1, 0.2]);
    }

    #[test]
    fn overlapping_ramps_take_the_minimum() {
        // 4 frames with 4-frame fades on both ends.
        let ms: Vec<f32> = (0..4).map(|i| fade_multiplier(i, 4, 4, 4)).collect();
        assert_eq!(ms, vec![0.0, 0.25, 0.25, 0.0]);
    }
}
