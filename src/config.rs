use std::path::{Path, PathBuf};

use anyhow::Context as _;

use crate::{
    effects::{EffectName, EffectSpec},
    foundation::core::Fps,
    foundation::error::{FxError, FxResult},
    frames::OutputFormat,
};

/// One effect job: which inputs, which effect, where the video goes.
///
/// ```json
/// {
///   "input1": "a.mp4",
///   "input2": "b.mp4",
///   "output": "out.mp4",
///   "effect": { "kind": "cross_fade", "overlap_sec": 1.0 }
/// }
/// ```
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct JobSpec {
    pub input1: PathBuf,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input2: Option<PathBuf>,
    pub output: PathBuf,
    /// Overrides the frame rate probed from `input1`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fps: Option<Fps>,
    pub effect: EffectSpec,
    #[serde(default = "default_overwrite")]
    pub overwrite: bool,
    /// Colour that transparent output pixels are flattened onto before encoding.
    #[serde(default = "default_background")]
    pub background: [u8; 4],
    /// How output frames are held in memory until assembly.
    #[serde(default)]
    pub frame_storage: OutputFormat,
}

fn default_overwrite() -> bool {
    true
}

fn default_background() -> [u8; 4] {
    [0, 0, 0, 255]
}

impl JobSpec {
    pub fn new(input1: impl Into<PathBuf>, output: impl Into<PathBuf>, effect: EffectSpec) -> Self {
        Self {
            input1: input1.into(),
            input2: None,
            output: output.into(),
            fps: None,
            effect,
            overwrite: default_overwrite(),
            background: default_background(),
            frame_storage: OutputFormat::default(),
        }
    }

    pub fn from_json_str(s: &str) -> FxResult<Self> {
        let job: Self = serde_json::from_str(s).context("parse job JSON")?;
        Ok(job)
    }

    pub fn from_path(path: &Path) -> FxResult<Self> {
        let s = std::fs::read_to_string(path)
            .with_context(|| format!("read job file '{}'", path.display()))?;
        Self::from_json_str(&s)
    }

    /// Static checks that need no input media.
    pub fn validate(&self) -> FxResult<()> {
        if self.input1.as_os_str().is_empty() {
            return Err(FxError::validation("job input1 path must be non-empty"));
        }
        if self.output.as_os_str().is_empty() {
            return Err(FxError::validation("job output path must be non-empty"));
        }
        if let Some(fps) = self.fps {
            Fps::new(fps.num, fps.den)?;
        }
        let needs_second = self.effect.name().needs_second_input();
        match (&self.input2, needs_second) {
            (None, true) => {
                return Err(FxError::validation(format!(
                    "effect '{}' requires input2",
                    self.effect.name()
                )));
            }
            (Some(p), true) if p.as_os_str().is_empty() => {
                return Err(FxError::validation("job input2 path must be non-empty"));
            }
            (Some(_), false) => {
                tracing::warn!(effect = %self.effect.name(), "input2 is ignored by this effect");
            }
            _ => {}
        }
        Ok(())
    }
}

/// Effect parameters as loose optional values, as they arrive from CLI flags.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct EffectParams {
    pub fade_in_sec: Option<f64>,
    pub fade_out_sec: Option<f64>,
    pub window_frames: Option<u32>,
    pub strength_px: Option<u32>,
    pub seed: Option<u64>,
    pub overlap_sec: Option<f64>,
}

impl EffectParams {
    /// Build a spec for `name`, taking unset parameters from `base` when it is
    /// the same effect. A required parameter missing from both is an error.
    pub fn resolve(&self, name: EffectName, base: Option<&EffectSpec>) -> FxResult<EffectSpec> {
        let base = base.filter(|b| b.name() == name);
        let missing = |flag: &str| {
            FxError::validation(format!("effect '{name}' requires a value for {flag}"))
        };

        Ok(match name {
            EffectName::Reverse => EffectSpec::Reverse,
            EffectName::FadeInOut => {
                let (in0, out0) = match base {
                    Some(EffectSpec::FadeInOut {
                        fade_in_sec,
                        fade_out_sec,
                    }) => (*fade_in_sec, *fade_out_sec),
                    _ => (0.0, 0.0),
                };
                EffectSpec::FadeInOut {
                    fade_in_sec: self.fade_in_sec.unwrap_or(in0),
                    fade_out_sec: self.fade_out_sec.unwrap_or(out0),
                }
            }
            EffectName::MotionBlur => {
                let base_window = match base {
                    Some(EffectSpec::MotionBlur { window_frames }) => Some(*window_frames),
                    _ => None,
                };
                EffectSpec::MotionBlur {
                    window_frames: self
                        .window_frames
                        .or(base_window)
                        .ok_or_else(|| missing("window_frames"))?,
                }
            }
            EffectName::Earthquake => {
                let (strength0, seed0) = match base {
                    Some(EffectSpec::Earthquake { strength_px, seed }) => {
                        (Some(*strength_px), *seed)
                    }
                    _ => (None, 0),
                };
                EffectSpec::Earthquake {
                    strength_px: self
                        .strength_px
                        .or(strength0)
                        .ok_or_else(|| missing("strength_px"))?,
                    seed: self.seed.unwrap_or(seed0),
                }
            }
            EffectName::CrossFade => {
                let base_overlap = match base {
                    Some(EffectSpec::CrossFade { overlap_sec }) => Some(*overlap_sec),
                    _ => None,
                };
                EffectSpec::CrossFade {
                    overlap_sec: self
                        .overlap_sec
                        .or(base_overlap)
                        .ok_or_else(|| missing("overlap_sec"))?,
                }
            }
        })
    }
}
