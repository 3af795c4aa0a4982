use crate::state::CallStatus;
use crate::{
    export_precheck, ApiVariant, CallOutcome, Effect, ExportRefusal, JobId, JobPhase, JobState,
    Msg, SubmitError, UiEvent,
};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: JobState, msg: Msg) -> (JobState, Vec<Effect>) {
    let effects = match msg {
        Msg::Submit(request) => match request.into_job() {
            Err(SubmitError::EmptyTargets) => vec![Effect::Notify(UiEvent::ListError)],
            Err(err) => vec![Effect::Notify(UiEvent::InvalidJob(err))],
            Ok(job) => {
                let job_id = state.begin_job(&job);
                let count = job.targets.len();
                vec![
                    Effect::Notify(UiEvent::ListLength(count)),
                    Effect::Notify(UiEvent::DomainNumber(count)),
                    Effect::ScheduleJob {
                        job_id,
                        targets: job.targets,
                        stagger: job.stagger,
                        credentials: job.credentials,
                    },
                ]
            }
        },
        Msg::CallDispatched { job_id, index } => {
            if let Some(job) = state.live_job_mut(job_id) {
                if let Some(status) = job.calls.get_mut(index) {
                    if *status == CallStatus::Scheduled {
                        *status = CallStatus::InFlight;
                    }
                }
            }
            Vec::new()
        }
        Msg::CallSettled {
            job_id,
            index,
            outcome,
        } => apply_settled(&mut state, job_id, index, outcome),
        Msg::CancelRequested => match state.phase() {
            JobPhase::Running => match state.job_id() {
                Some(job_id) => {
                    state.set_phase(JobPhase::Cancelling);
                    vec![Effect::CancelJob { job_id }]
                }
                None => vec![Effect::Notify(UiEvent::ScrapeStopped)],
            },
            // Acknowledgment still pending; one stopped event is enough.
            JobPhase::Cancelling => Vec::new(),
            JobPhase::Idle | JobPhase::Stopped | JobPhase::Done => {
                vec![Effect::Notify(UiEvent::ScrapeStopped)]
            }
        },
        Msg::CancelCompleted { job_id } => {
            if state.phase() == JobPhase::Cancelling && state.job_id() == Some(job_id) {
                state.set_phase(JobPhase::Stopped);
                vec![Effect::Notify(UiEvent::ScrapeStopped)]
            } else {
                Vec::new()
            }
        }
        Msg::ExportRequested { destination } => {
            match export_precheck(destination.as_deref(), state.results()) {
                Err(ExportRefusal::NoDestination) => vec![Effect::Notify(UiEvent::FileNotSaved)],
                Err(ExportRefusal::Empty) => vec![Effect::Notify(UiEvent::FileEmpty)],
                Ok(path) => vec![Effect::WriteExport {
                    destination: path.to_path_buf(),
                    records: state.results().to_vec(),
                }],
            }
        }
        Msg::ExportFinished { result } => match result {
            Ok(_) => vec![Effect::Notify(UiEvent::FileSaved)],
            Err(_) => vec![Effect::Notify(UiEvent::FileNotSaved)],
        },
        Msg::NoOp => Vec::new(),
    };

    (state, effects)
}

fn apply_settled(
    state: &mut JobState,
    job_id: JobId,
    index: usize,
    outcome: CallOutcome,
) -> Vec<Effect> {
    // Stale job, cancelled job, unknown index or duplicate settlement: discard.
    let Some(job) = state.live_job_mut(job_id) else {
        return Vec::new();
    };
    match job.calls.get_mut(index) {
        Some(status) if *status != CallStatus::Settled => *status = CallStatus::Settled,
        _ => return Vec::new(),
    }

    job.completed += 1;
    let completed = job.completed;
    let finished = completed == job.targets.len();

    let mut effects = vec![Effect::Notify(UiEvent::ResultNumber(completed))];
    match outcome {
        CallOutcome::Record(record) => state.push_result(record),
        CallOutcome::NoArticle => {
            job.no_article += 1;
            effects.push(Effect::Notify(UiEvent::ResultErrorNoArticle));
        }
        CallOutcome::Failed { .. } => {
            job.failed += 1;
            effects.push(Effect::Notify(UiEvent::ResultError));
        }
    }

    if finished {
        state.set_phase(JobPhase::Done);
        if state.variant() == ApiVariant::Categorization {
            effects.push(Effect::Notify(UiEvent::ResultItself(
                state.results().to_vec(),
            )));
        }
    }
    effects
}
