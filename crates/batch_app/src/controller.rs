use std::path::PathBuf;
use std::time::Duration;

use batch_core::{update, ApiVariant, Effect, JobRequest, JobState, Msg, UiEvent};
use batch_engine::{export_results, EngineEvent, EngineHandle, ExportFormat};
use batch_logging::{batch_error, batch_info, batch_warn};

/// Receives every UI event in emission order.
pub trait UiSink {
    fn deliver(&mut self, event: &UiEvent);
}

impl UiSink for Vec<UiEvent> {
    fn deliver(&mut self, event: &UiEvent) {
        self.push(event.clone());
    }
}

/// Prints one line per event on stdout.
#[derive(Debug, Default)]
pub struct StdoutSink;

impl UiSink for StdoutSink {
    fn deliver(&mut self, event: &UiEvent) {
        println!("{}", describe_event(event));
    }
}

/// `channel` plus a short payload, e.g. `result:number 3`.
pub fn describe_event(event: &UiEvent) -> String {
    let channel = event.channel();
    match event {
        UiEvent::InvalidJob(reason) => format!("{channel} {reason}"),
        UiEvent::ListLength(n) | UiEvent::DomainNumber(n) | UiEvent::ResultNumber(n) => {
            format!("{channel} {n}")
        }
        UiEvent::ResultItself(records) => format!("{channel} {} records", records.len()),
        _ => channel.to_string(),
    }
}

/// Owns the job state and the engine. All state changes happen on the
/// thread that drives the controller; the engine only reports back.
pub struct Controller<S> {
    state: JobState,
    engine: EngineHandle,
    sink: S,
    format: ExportFormat,
    engine_failure: Option<String>,
}

impl<S: UiSink> Controller<S> {
    pub fn new(variant: ApiVariant, engine: EngineHandle, sink: S) -> Self {
        Self {
            state: JobState::new(variant),
            engine,
            sink,
            format: ExportFormat::for_variant(variant),
            engine_failure: None,
        }
    }

    pub fn state(&self) -> &JobState {
        &self.state
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn engine_failure(&self) -> Option<&str> {
        self.engine_failure.as_deref()
    }

    /// Returns whether the job was accepted and scheduled.
    pub fn submit(&mut self, request: JobRequest) -> bool {
        self.dispatch(Msg::Submit(request));
        self.state.is_running()
    }

    pub fn cancel(&mut self) {
        self.dispatch(Msg::CancelRequested);
    }

    pub fn export(&mut self, destination: Option<PathBuf>) {
        self.dispatch(Msg::ExportRequested { destination });
    }

    /// Waits up to `timeout` for engine events and applies all that arrived.
    pub fn pump(&mut self, timeout: Duration) -> bool {
        let Some(first) = self.engine.recv_timeout(timeout) else {
            return false;
        };
        self.handle_engine_event(first);
        while let Some(event) = self.engine.try_recv() {
            self.handle_engine_event(event);
        }
        true
    }

    /// Pumps until the job is done or stopped. `interrupted` is polled once
    /// per round; returning true requests cancellation.
    pub fn run_until_settled(&mut self, poll: Duration, mut interrupted: impl FnMut() -> bool) {
        while self.state.is_running() && self.engine_failure.is_none() {
            if interrupted() {
                batch_info!("cancellation requested");
                self.cancel();
            }
            self.pump(poll);
        }
    }

    fn handle_engine_event(&mut self, event: EngineEvent) {
        let msg = match event {
            EngineEvent::CallDispatched { job_id, index, .. } => {
                Msg::CallDispatched { job_id, index }
            }
            EngineEvent::CallSettled {
                job_id,
                index,
                outcome,
            } => Msg::CallSettled {
                job_id,
                index,
                outcome,
            },
            EngineEvent::JobCancelled {
                job_id,
                fired,
                suppressed,
            } => {
                batch_info!(
                    "job {} stop acknowledged: {} fired, {} suppressed",
                    job_id,
                    fired,
                    suppressed
                );
                Msg::CancelCompleted { job_id }
            }
            EngineEvent::EngineFailed { message } => {
                batch_error!("engine failed: {}", message);
                self.engine_failure = Some(message);
                return;
            }
        };
        self.dispatch(msg);
    }

    fn dispatch(&mut self, msg: Msg) {
        let state = std::mem::take(&mut self.state);
        let (state, effects) = update(state, msg);
        self.state = state;
        for effect in effects {
            self.run_effect(effect);
        }
    }

    fn run_effect(&mut self, effect: Effect) {
        match effect {
            Effect::ScheduleJob {
                job_id,
                targets,
                stagger,
                credentials,
            } => self.engine.schedule(job_id, targets, stagger, credentials),
            Effect::CancelJob { job_id } => self.engine.cancel(job_id),
            Effect::WriteExport {
                destination,
                records,
            } => {
                let result = export_results(&records, Some(destination.as_path()), self.format)
                    .map(|summary| summary.path)
                    .map_err(|err| {
                        batch_warn!("export to {:?} failed: {}", destination, err);
                        err.to_string()
                    });
                self.dispatch(Msg::ExportFinished { result });
            }
            Effect::Notify(event) => self.sink.deliver(&event),
        }
    }
}
