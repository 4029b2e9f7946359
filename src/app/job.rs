// ReelMend - app/job.rs
//
// Job lifecycle management.  Runs one batch repair or analysis at a time on
// a background thread while the owning context keeps ticking.
//
// Architecture:
//   - `JobController` lives on the owning context; `run_job` runs on the
//     worker thread.
//   - The worker only crosses back through a `JobContext`: the output relay,
//     a progress reporter bound to the job's phase, and the dispatcher.
//   - The context is moved into the worker and handed back through the
//     `JoinHandle` together with the job's outcome.
//   - Controls are re-enabled by a drop guard, so every exit path of the
//     worker (including a panic) restores them.
//   - There is no cancellation: shutdown waits for the worker, servicing
//     the dispatcher meanwhile so a worker blocked on a full queue can finish.

use crate::app::dispatch::Dispatcher;
use crate::app::progress::{ProgressChannel, ProgressReporter};
use crate::app::relay::OutputRelay;
use crate::app::surface::PresentationSurface;
use crate::core::analyze;
use crate::core::batch::{BatchObserver, BatchRunner};
use crate::core::engine::RepairEngine;
use crate::core::model::{AnalysisStats, Notice, Phase, RepairSettings, RunStats};
use crate::util::constants;
use crate::util::error::{ArgumentError, FailureInfo, ReelMendError, SetupError};
use std::path::Path;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// Name given to the background worker thread.
const WORKER_THREAD_NAME: &str = "reelmend-worker";

// =============================================================================
// Requests and outcomes
// =============================================================================

/// What the user asked to run.  Arguments are the raw text of the inputs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobRequest {
    Repair { reference: String, target_dir: String },
    Analyze { file: String },
}

impl JobRequest {
    /// The phase whose pane and progress indicator the job reports to.
    pub fn phase(&self) -> Phase {
        match self {
            Self::Repair { .. } => Phase::Repair,
            Self::Analyze { .. } => Phase::Analyze,
        }
    }

    /// Reject blank required arguments.
    pub fn validate(&self) -> Result<(), ArgumentError> {
        match self {
            Self::Repair { reference, .. } if reference.trim().is_empty() => {
                Err(ArgumentError::MissingReference)
            }
            Self::Repair { target_dir, .. } if target_dir.trim().is_empty() => {
                Err(ArgumentError::MissingTarget)
            }
            Self::Analyze { file } if file.trim().is_empty() => {
                Err(ArgumentError::MissingAnalyzeFile)
            }
            _ => Ok(()),
        }
    }
}

/// Result of `JobController::start`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartOutcome {
    Started,
    /// A job was already running; nothing happened.
    AlreadyRunning,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JobState {
    #[default]
    Idle,
    Running,
}

/// How a finished job ended.
#[derive(Debug)]
pub enum JobOutcome {
    Repaired(RunStats),
    Analyzed(AnalysisStats),
    SetupFailed(SetupError),
    AnalysisFailed(FailureInfo),
}

impl JobOutcome {
    /// True when anything went wrong, including a single failed item.
    pub fn has_failures(&self) -> bool {
        match self {
            Self::Repaired(stats) => stats.failed > 0,
            Self::Analyzed(_) => false,
            Self::SetupFailed(_) | Self::AnalysisFailed(_) => true,
        }
    }
}

/// Value returned through the worker's `JoinHandle`.
#[derive(Debug)]
pub struct JobReport {
    pub context: JobContext,
    pub outcome: JobOutcome,
}

// =============================================================================
// JobContext (worker side)
// =============================================================================

/// Everything a running job may touch.  Moved into the worker.
#[derive(Debug, Clone)]
pub struct JobContext {
    pub phase: Phase,
    pub relay: OutputRelay,
    pub progress: ProgressReporter,
    pub dispatcher: Dispatcher,
}

impl BatchObserver for JobContext {
    fn output(&self, text: &str) {
        self.relay.write(text);
    }

    fn progress(&self, percentage: u8) {
        self.progress.report(percentage);
    }

    fn notify(&self, notice: Notice) {
        self.dispatcher
            .schedule(move |surface| surface.show_blocking_message(notice));
    }

    fn status(&self, text: String) {
        self.dispatcher.schedule(move |surface| surface.set_status(&text));
    }
}

/// Schedules "controls enabled" when dropped.
struct ControlsGuard(Dispatcher);

impl Drop for ControlsGuard {
    fn drop(&mut self) {
        self.0.schedule(|surface| surface.set_controls_enabled(true));
    }
}

/// Worker entry point.
fn run_job(
    engine: Arc<dyn RepairEngine>,
    settings: RepairSettings,
    request: JobRequest,
    context: JobContext,
) -> JobReport {
    let _controls = ControlsGuard(context.dispatcher.clone());

    let outcome = match &request {
        JobRequest::Repair {
            reference,
            target_dir,
        } => {
            let runner = BatchRunner::new(engine, settings);
            match runner.run(
                Path::new(reference.trim()),
                Path::new(target_dir.trim()),
                &context,
            ) {
                Ok(stats) => JobOutcome::Repaired(stats),
                Err(e) => {
                    tracing::warn!(error = %e, "Batch setup failed");
                    context.output(&format!("{e}\n"));
                    context.status("Setup failed".to_string());
                    context.notify(Notice::Error(e.to_string()));
                    JobOutcome::SetupFailed(e)
                }
            }
        }
        JobRequest::Analyze { file } => match analyze::analyze(Path::new(file.trim()), &context) {
            Ok(stats) => JobOutcome::Analyzed(stats),
            Err(info) => {
                tracing::warn!(error = %info, "Analysis failed");
                context.output(&format!("{info}\n"));
                context.status("Analysis failed".to_string());
                context.notify(Notice::Error(info.to_string()));
                JobOutcome::AnalysisFailed(info)
            }
        },
    };

    JobReport { context, outcome }
}

// =============================================================================
// JobController (owning context)
// =============================================================================

/// Owns the single job slot and pumps worker output into the surface.
pub struct JobController {
    engine: Arc<dyn RepairEngine>,
    settings: RepairSettings,
    relay: OutputRelay,
    progress: ProgressChannel,
    dispatcher: Dispatcher,
    state: JobState,
    worker: Option<JoinHandle<JobReport>>,
    active_phase: Phase,
    last_outcome: Option<JobOutcome>,
    shut_down: bool,
}

impl JobController {
    /// Create a controller owned by the calling thread.
    ///
    /// `relay` is shared with the logging subsystem so relayed log events
    /// land in the active pane alongside job output.
    pub fn new(engine: Arc<dyn RepairEngine>, relay: OutputRelay, settings: RepairSettings) -> Self {
        Self {
            engine,
            settings,
            relay,
            progress: ProgressChannel::new(),
            dispatcher: Dispatcher::new(constants::DISPATCH_QUEUE_CAPACITY),
            state: JobState::Idle,
            worker: None,
            active_phase: Phase::default(),
            last_outcome: None,
            shut_down: false,
        }
    }

    /// Settings for jobs started from now on.
    pub fn set_settings(&mut self, settings: RepairSettings) {
        self.settings = settings;
    }

    pub fn settings(&self) -> RepairSettings {
        self.settings
    }

    pub fn active_phase(&self) -> Phase {
        self.active_phase
    }

    pub fn state(&self) -> JobState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == JobState::Running
    }

    /// Outcome of the most recently reaped job.
    pub fn last_outcome(&self) -> Option<&JobOutcome> {
        self.last_outcome.as_ref()
    }

    /// Start `request` on a background worker.
    ///
    /// A blank argument is reported synchronously through `surface` and
    /// returned as an error without touching any job state.  Starting while
    /// a job runs is a silent no-op.
    pub fn start(
        &mut self,
        request: JobRequest,
        surface: &mut dyn PresentationSurface,
    ) -> Result<StartOutcome, ReelMendError> {
        if let Err(e) = request.validate() {
            tracing::debug!(error = %e, "Start rejected");
            surface.show_blocking_message(Notice::Error(e.user_message().to_string()));
            return Err(e.into());
        }

        // Deliver leftovers of a finished job to its own pane first.
        self.reap(surface);
        if self.is_running() {
            tracing::debug!(phase = %self.active_phase, "Job already running; start ignored");
            return Ok(StartOutcome::AlreadyRunning);
        }
        self.flush(surface);

        let phase = request.phase();
        self.active_phase = phase;
        surface.set_text(phase, "");
        self.progress.clear(phase);
        surface.set_progress(phase, 0);
        self.dispatcher
            .schedule(|surface| surface.set_controls_enabled(false));

        let context = JobContext {
            phase,
            relay: self.relay.clone(),
            progress: self.progress.reporter(phase),
            dispatcher: self.dispatcher.clone(),
        };
        let engine = Arc::clone(&self.engine);
        let settings = self.settings;

        let spawned = thread::Builder::new()
            .name(WORKER_THREAD_NAME.to_string())
            .spawn(move || run_job(engine, settings, request, context));

        match spawned {
            Ok(handle) => {
                self.worker = Some(handle);
                self.state = JobState::Running;
                tracing::info!(phase = %phase, "Job started");
                Ok(StartOutcome::Started)
            }
            Err(source) => {
                tracing::error!(error = %source, "Cannot spawn worker thread");
                self.dispatcher
                    .schedule(|surface| surface.set_controls_enabled(true));
                Err(ReelMendError::Spawn { source })
            }
        }
    }

    /// One pass of the owning context's periodic loop.
    ///
    /// Returns `true` while a job is still running.
    pub fn tick(&mut self, surface: &mut dyn PresentationSurface) -> bool {
        self.flush(surface);
        self.reap(surface);
        self.is_running()
    }

    /// Wait for any running job, deliver its remaining output and ask the
    /// surface to quit.  Only the first call has any effect.
    pub fn shutdown(&mut self, surface: &mut dyn PresentationSurface) {
        if self.shut_down {
            return;
        }
        self.shut_down = true;

        if self.is_running() {
            tracing::info!(phase = %self.active_phase, "Waiting for running job before exit");
        }
        while self
            .worker
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
        {
            self.flush(surface);
            thread::sleep(Duration::from_millis(constants::SHUTDOWN_POLL_INTERVAL_MS));
        }
        self.reap(surface);
        self.drain_all(surface);

        tracing::debug!("Job controller shut down");
        surface.quit();
    }

    /// Run due dispatcher actions, drain the relay into the active pane and
    /// render pending progress.
    fn flush(&mut self, surface: &mut dyn PresentationSurface) {
        self.dispatcher
            .run_pending(surface, constants::MAX_DISPATCH_ACTIONS_PER_TICK);
        self.relay.drain_and_dispatch(surface, self.active_phase);
        for (phase, percentage) in self.progress.take_updates() {
            surface.set_progress(phase, percentage);
        }
    }

    /// Like `flush`, but runs every queued action.
    fn drain_all(&mut self, surface: &mut dyn PresentationSurface) {
        while self
            .dispatcher
            .run_pending(surface, constants::MAX_DISPATCH_ACTIONS_PER_TICK)
            > 0
        {}
        self.flush(surface);
    }

    /// Join a finished worker, if any, and deliver everything it left.
    fn reap(&mut self, surface: &mut dyn PresentationSurface) {
        let finished = self.worker.as_ref().is_some_and(JoinHandle::is_finished);
        if !finished {
            return;
        }
        let Some(handle) = self.worker.take() else {
            return;
        };
        self.state = JobState::Idle;

        match handle.join() {
            Ok(report) => {
                tracing::info!(
                    phase = %report.context.phase,
                    failures = report.outcome.has_failures(),
                    "Job finished"
                );
                self.last_outcome = Some(report.outcome);
            }
            Err(payload) => {
                let info = FailureInfo::from_panic(payload.as_ref());
                tracing::error!(error = %info, "Worker thread panicked");
                self.relay.write(&format!("{info}\n"));
                surface.show_blocking_message(Notice::Error(info.to_string()));
                self.last_outcome = None;
            }
        }

        self.drain_all(surface);
    }
}
