#![forbid(unsafe_code)]

//! Frame-level video effects.
//!
//! Input videos are decoded into [`FrameSequence`]s, a [`Sequencer`] drives one
//! [`EffectSpec`] over them frame by frame, and an [`OutputAssembler`] turns the
//! finished [`OutputSequence`] into a video file.

pub mod composite;
pub mod config;
pub mod effects;
pub mod encode_ffmpeg;
pub mod foundation;
pub mod frames;
pub mod media;
pub mod output;
pub mod pipeline;
pub mod sequencer;

pub use config::{EffectParams, JobSpec};
pub use effects::{Effect, EffectName, EffectSpec};
pub use encode_ffmpeg::{EncodeConfig, FfmpegAssembler, FfmpegEncoder, is_ffmpeg_on_path};
pub use foundation::core::{Canvas, Fps};
pub use foundation::error::{FxError, FxResult};
pub use frames::{
    EncodedImage, Frame, FrameCodec, FrameSequence, FrameStore, ImageCodec, OutputFormat,
    PixelBuffer,
};
pub use media::{VideoSourceInfo, extract_frames, is_ffprobe_on_path, load_video, probe_video};
pub use output::OutputSequence;
pub use pipeline::{ApplyOutcome, OutputAssembler, apply_effect};
pub use sequencer::{CancelHandle, ProgressState, Run, RunOutcome, RunState, Sequencer, Step};
