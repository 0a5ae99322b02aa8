use std::{fmt, str::FromStr};

use crate::foundation::error::{FxError, FxResult};

/// The closed set of effect names.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EffectName {
    Reverse,
    FadeInOut,
    MotionBlur,
    Earthquake,
    CrossFade,
}

impl EffectName {
    pub const ALL: [EffectName; 5] = [
        EffectName::Reverse,
        EffectName::FadeInOut,
        EffectName::MotionBlur,
        EffectName::Earthquake,
        EffectName::CrossFade,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Reverse => "reverse",
            Self::FadeInOut => "fade_in_out",
            Self::MotionBlur => "motion_blur",
            Self::Earthquake => "earthquake",
            Self::CrossFade => "cross_fade",
        }
    }

    pub fn needs_second_input(self) -> bool {
        matches!(self, Self::CrossFade)
    }
}

impl fmt::Display for EffectName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EffectName {
    type Err = FxError;

    fn from_str(s: &str) -> FxResult<Self> {
        let name = s.trim().to_ascii_lowercase();
        if name.is_empty() {
            return Err(FxError::validation("effect name must be non-empty"));
        }
        match name.as_str() {
            "reverse" => Ok(Self::Reverse),
            "fade_in_out" | "fadeinout" | "fade-in-out" | "fade" => Ok(Self::FadeInOut),
            "motion_blur" | "motionblur" | "motion-blur" | "blur" => Ok(Self::MotionBlur),
            "earthquake" | "shake" => Ok(Self::Earthquake),
            "cross_fade" | "crossfade" | "cross-fade" => Ok(Self::CrossFade),
            _ => Err(FxError::validation(format!(
                "unknown effect '{name}' (expected one of: reverse, fade_in_out, motion_blur, earthquake, cross_fade)"
            ))),
        }
    }
}

/// Externally supplied effect selection and parameters, in UI units.
///
/// Seconds are converted to frame counts with the input frame rate during setup.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EffectSpec {
    Reverse,
    FadeInOut {
        #[serde(default)]
        fade_in_sec: f64,
        #[serde(default)]
        fade_out_sec: f64,
    },
    MotionBlur {
        window_frames: u32,
    },
    Earthquake {
        strength_px: u32,
        #[serde(default)]
        seed: u64,
    },
    CrossFade {
        overlap_sec: f64,
    },
}

impl EffectSpec {
    pub fn name(&self) -> EffectName {
        match self {
            Self::Reverse => EffectName::Reverse,
            Self::FadeInOut { .. } => EffectName::FadeInOut,
            Self::MotionBlur { .. } => EffectName::MotionBlur,
            Self::Earthquake { .. } => EffectName::Earthquake,
            Self::CrossFade { .. } => EffectName::CrossFade,
        }
    }
}
