use crate::{
    effects::EffectSpec,
    foundation::error::{FxError, FxResult},
    frames::{FrameCodec, FrameStore},
    output::OutputSequence,
    sequencer::{ProgressState, RunOutcome, Sequencer},
};

/// Turns a completed output sequence into a single artifact (a video file, a
/// frame dump, ...).
///
/// The sequence is borrowed; on failure the caller still owns it and may retry.
pub trait OutputAssembler {
    type Artifact;

    fn assemble(&mut self, output: &OutputSequence) -> FxResult<Self::Artifact>;
}

#[derive(Debug)]
pub enum ApplyOutcome<A> {
    Encoded(A),
    /// Stopped at a frame boundary; the assembler was never invoked.
    Cancelled(ProgressState),
    /// Every frame was produced but assembly failed. The frames are kept so
    /// assembly can be retried without recomputing them.
    EncodeFailed { output: OutputSequence, error: FxError },
}

/// Start a run of `spec`, drive it to a terminal state and hand a completed
/// output to `assembler`.
///
/// Configuration and frame errors are returned as `Err`; cancellation and
/// assembler failures are outcomes.
#[tracing::instrument(skip_all, fields(effect = %spec.name()))]
pub async fn apply_effect<C, A>(
    sequencer: &mut Sequencer<C>,
    spec: &EffectSpec,
    inputs: FrameStore,
    assembler: &mut A,
    on_progress: impl FnMut(f64),
) -> FxResult<ApplyOutcome<A::Artifact>>
where
    C: FrameCodec,
    A: OutputAssembler,
{
    let run = sequencer.start(spec, inputs)?;
    let output = match run.drive(on_progress).await? {
        RunOutcome::Completed(output) => output,
        RunOutcome::Cancelled(progress) => return Ok(ApplyOutcome::Cancelled(progress)),
    };

    match assembler.assemble(&output) {
        Ok(artifact) => Ok(ApplyOutcome::Encoded(artifact)),
        Err(error) => {
            tracing::error!(%error, frames = output.len(), "output assembly failed");
            Ok(ApplyOutcome::EncodeFailed { output, error })
        }
    }
}
