pub mod cross_fade;
pub mod earthquake;
pub mod fade;
pub mod motion_blur;
pub mod reverse;
pub mod spec;

pub use cross_fade::{CrossFade, CrossFadeRegion};
pub use earthquake::Earthquake;
pub use fade::{FadeInOut, fade_multiplier};
pub use motion_blur::MotionBlur;
pub use reverse::Reverse;
pub use spec::{EffectName, EffectSpec};

use crate::{
    foundation::error::FxResult,
    frames::{Frame, FrameCodec, FrameStore},
};

/// An effect after setup: derived parameters plus any rolling state.
///
/// A fresh value is built for every run, so no state leaks between runs.
#[derive(Debug)]
pub enum Effect {
    Reverse(Reverse),
    FadeInOut(FadeInOut),
    MotionBlur(MotionBlur),
    Earthquake(Earthquake),
    CrossFade(CrossFade),
}

impl Effect {
    /// Validate `spec` against `inputs` and compute derived parameters.
    ///
    /// Pure and deterministic; any configuration error surfaces here, before a
    /// single frame is processed.
    #[tracing::instrument(skip(inputs), fields(effect = %spec.name()))]
    pub fn setup(spec: &EffectSpec, inputs: &FrameStore) -> FxResult<Self> {
        let effect = match *spec {
            EffectSpec::Reverse => Self::Reverse(Reverse::setup(inputs)?),
            EffectSpec::FadeInOut {
                fade_in_sec,
                fade_out_sec,
            } => Self::FadeInOut(FadeInOut::setup(inputs, fade_in_sec, fade_out_sec)?),
            EffectSpec::MotionBlur { window_frames } => {
                Self::MotionBlur(MotionBlur::setup(inputs, window_frames)?)
            }
            EffectSpec::Earthquake { strength_px, seed } => {
                Self::Earthquake(Earthquake::setup(inputs, strength_px, seed)?)
            }
            EffectSpec::CrossFade { overlap_sec } => {
                Self::CrossFade(CrossFade::setup(inputs, overlap_sec)?)
            }
        };
        tracing::debug!(output_duration = effect.output_duration(), "effect ready");
        Ok(effect)
    }

    pub fn name(&self) -> EffectName {
        match self {
            Self::Reverse(_) => EffectName::Reverse,
            Self::FadeInOut(_) => EffectName::FadeInOut,
            Self::MotionBlur(_) => EffectName::MotionBlur,
            Self::Earthquake(_) => EffectName::Earthquake,
            Self::CrossFade(_) => EffectName::CrossFade,
        }
    }

    pub fn output_duration(&self) -> usize {
        match self {
            Self::Reverse(fx) => fx.output_duration(),
            Self::FadeInOut(fx) => fx.output_duration(),
            Self::MotionBlur(fx) => fx.output_duration(),
            Self::Earthquake(fx) => fx.output_duration(),
            Self::CrossFade(fx) => fx.output_duration(),
        }
    }

    /// Produce output frame `index`.
    ///
    /// Reverse and the cross-fade pass-through regions resolve without
    /// suspending; everything else awaits `codec.decode`.
    pub async fn process<C: FrameCodec>(
        &mut self,
        index: usize,
        inputs: &FrameStore,
        codec: &C,
    ) -> FxResult<Frame> {
        match self {
            Self::Reverse(fx) => fx.process(index, inputs),
            Self::FadeInOut(fx) => fx.process(index, inputs, codec).await,
            Self::MotionBlur(fx) => fx.process(index, inputs, codec).await,
            Self::Earthquake(fx) => fx.process(index, inputs, codec).await,
            Self::CrossFade(fx) => fx.process(index, inputs, codec).await,
        }
    }
}
