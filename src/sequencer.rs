//! Drives an effect over every output index, one frame in flight at a time.
//!
//! ```text
//! Idle --start--> Running --last frame done--> Completed
//!                    |------cancel observed--> Cancelled
//!                    `------frame failed-----> Failed
//! ```
//!
//! Each frame is a `request_frame` (kick off `Effect::process`, possibly
//! suspending on a decode) followed by exactly one `on_frame_done`. The
//! cancellation flag is polled in `on_frame_done`, so a cancel never leaves a
//! half-written slot behind.

use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

use crate::{
    effects::{Effect, EffectSpec},
    foundation::error::{FxError, FxResult},
    frames::{FrameCodec, FrameStore},
    output::OutputSequence,
};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RunState {
    #[default]
    Idle,
    Running,
    Completed,
    Cancelled,
    Failed,
}

impl RunState {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled | Self::Failed)
    }
}

/// Frame counters of one run. `completed_frames <= current_frame <= output_duration`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ProgressState {
    pub current_frame: usize,
    pub completed_frames: usize,
    pub output_duration: usize,
}

impl ProgressState {
    pub fn fraction(&self) -> f64 {
        if self.output_duration == 0 {
            1.0
        } else {
            self.completed_frames as f64 / self.output_duration as f64
        }
    }
}

/// Externally settable cancellation flag; clones share the flag.
#[derive(Clone, Debug, Default)]
pub struct CancelHandle(Arc<AtomicBool>);

impl CancelHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_requested(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    /// Consume the request, clearing the flag.
    fn take(&self) -> bool {
        self.0.swap(false, Ordering::SeqCst)
    }
}

/// Result of one `Run::step`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Step {
    /// Frame done, run continues; carries `completed / duration` in `[0, 1)`.
    Progress(f64),
    Completed,
    Cancelled,
}

/// Terminal result of `Run::drive`.
#[derive(Debug)]
pub enum RunOutcome {
    Completed(OutputSequence),
    Cancelled(ProgressState),
}

#[derive(Debug)]
pub struct Sequencer<C> {
    codec: C,
    cancel: CancelHandle,
    last_state: RunState,
}

impl<C: FrameCodec> Sequencer<C> {
    pub fn new(codec: C) -> Self {
        Self {
            codec,
            cancel: CancelHandle::new(),
            last_state: RunState::Idle,
        }
    }

    pub fn cancel_handle(&self) -> CancelHandle {
        self.cancel.clone()
    }

    /// State of the most recent run (`Idle` before the first).
    pub fn state(&self) -> RunState {
        self.last_state
    }

    /// Set up `spec` against `inputs` and begin a run.
    ///
    /// The run borrows the sequencer mutably, so runs can never interleave.
    /// On a configuration error the sequencer stays in its previous state.
    #[tracing::instrument(skip(self, inputs), fields(effect = %spec.name()))]
    pub fn start(&mut self, spec: &EffectSpec, inputs: FrameStore) -> FxResult<Run<'_, C>> {
        let effect = Effect::setup(spec, &inputs)?;
        let output_duration = effect.output_duration();

        // A cancel aimed at an earlier run must not stop this one.
        self.cancel.take();
        self.last_state = RunState::Running;
        tracing::info!(output_duration, "run started");

        Ok(Run {
            seq: self,
            effect,
            inputs,
            output: OutputSequence::with_len(output_duration),
            progress: ProgressState {
                current_frame: 0,
                completed_frames: 0,
                output_duration,
            },
            state: RunState::Running,
        })
    }
}

/// One effect run: the explicit context threaded through every frame.
#[derive(Debug)]
pub struct Run<'a, C> {
    seq: &'a mut Sequencer<C>,
    effect: Effect,
    inputs: FrameStore,
    output: OutputSequence,
    progress: ProgressState,
    state: RunState,
}

impl<C: FrameCodec> Run<'_, C> {
    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn progress(&self) -> ProgressState {
        self.progress
    }

    pub fn output(&self) -> &OutputSequence {
        &self.output
    }

    /// Process the next frame and write its slot. Must be followed by `on_frame_done`.
    pub async fn request_frame(&mut self) -> FxResult<()> {
        self.ensure_running()?;
        let index = self.progress.current_frame;
        if index >= self.progress.output_duration {
            return Err(FxError::sequencer(format!(
                "no frame left to request ({index} of {})",
                self.progress.output_duration
            )));
        }
        if self.progress.completed_frames != index {
            return Err(FxError::sequencer(format!(
                "frame {} still in flight",
                self.progress.completed_frames
            )));
        }
        self.progress.current_frame += 1;

        let result = self
            .effect
            .process(index, &self.inputs, &self.seq.codec)
            .await
            .and_then(|frame| self.output.fill(index, frame));
        if let Err(e) = result {
            tracing::warn!(index, error = %e, "frame failed, halting run");
            self.finish(RunState::Failed);
            return Err(e);
        }
        tracing::debug!(index, "frame written");
        Ok(())
    }

    /// Account for the frame finished by the preceding `request_frame`.
    pub fn on_frame_done(&mut self) -> FxResult<Step> {
        self.ensure_running()?;
        if self.progress.completed_frames >= self.progress.current_frame {
            return Err(FxError::sequencer("on_frame_done without a requested frame"));
        }
        let index = self.progress.completed_frames;
        if self.output.get(index).is_none() {
            // The request was abandoned before its slot was written.
            tracing::warn!(index, "frame finished without output, halting run");
            self.finish(RunState::Failed);
            return Err(FxError::sequencer(format!(
                "frame {index} finished without writing its output slot"
            )));
        }
        self.progress.completed_frames += 1;

        if self.progress.completed_frames == self.progress.output_duration {
            self.finish(RunState::Completed);
            tracing::info!(frames = self.progress.output_duration, "run completed");
            return Ok(Step::Completed);
        }
        if self.seq.cancel.take() {
            tracing::warn!(
                completed = self.progress.completed_frames,
                total = self.progress.output_duration,
                "run cancelled"
            );
            self.finish(RunState::Cancelled);
            return Ok(Step::Cancelled);
        }
        Ok(Step::Progress(self.progress.fraction()))
    }

    /// One full frame: `request_frame` then `on_frame_done`.
    ///
    /// A zero-length run completes on its first step.
    pub async fn step(&mut self) -> FxResult<Step> {
        self.ensure_running()?;
        if self.progress.output_duration == 0 {
            self.finish(RunState::Completed);
            tracing::info!("run completed (empty output)");
            return Ok(Step::Completed);
        }
        self.request_frame().await?;
        self.on_frame_done()
    }

    /// Step until a terminal state, yielding to the scheduler between frames.
    ///
    /// `on_progress` sees a non-decreasing fraction after every frame and
    /// exactly `1.0` once, on completion.
    pub async fn drive(mut self, mut on_progress: impl FnMut(f64)) -> FxResult<RunOutcome> {
        loop {
            match self.step().await? {
                Step::Progress(p) => {
                    on_progress(p);
                    tokio::task::yield_now().await;
                }
                Step::Completed => {
                    on_progress(1.0);
                    return Ok(RunOutcome::Completed(self.output));
                }
                Step::Cancelled => return Ok(RunOutcome::Cancelled(self.progress)),
            }
        }
    }

    /// Take the finished output. Fails unless the run completed.
    pub fn into_output(self) -> FxResult<OutputSequence> {
        if self.state != RunState::Completed {
            return Err(FxError::sequencer(format!(
                "output is only available after completion (state {:?})",
                self.state
            )));
        }
        Ok(self.output)
    }

    fn ensure_running(&self) -> FxResult<()> {
        if self.state != RunState::Running {
            return Err(FxError::sequencer(format!(
                "run is {:?}, not Running",
                self.state
            )));
        }
        Ok(())
    }

    fn finish(&mut self, state: RunState) {
        self.state = state;
        self.seq.last_state = state;
        if state != RunState::Completed {
            // Partial output is discarded.
            self.output = OutputSequence::default();
        }
    }
}
