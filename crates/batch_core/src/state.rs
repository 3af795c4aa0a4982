use crate::view_model::JobView;
use crate::{ApiVariant, Job, JobId, ResultRecord};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JobPhase {
    #[default]
    Idle,
    Running,
    /// Cancel sent to the engine, waiting for its acknowledgment.
    Cancelling,
    Stopped,
    /// Every target settled.
    Done,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallStatus {
    Scheduled,
    InFlight,
    Settled,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ActiveJob {
    pub(crate) id: JobId,
    pub(crate) targets: Vec<String>,
    pub(crate) calls: Vec<CallStatus>,
    pub(crate) completed: usize,
    pub(crate) failed: usize,
    pub(crate) no_article: usize,
}

/// Orchestrator state for one harvester instance. Holds at most one job;
/// submitting a new job replaces the previous one and its results.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct JobState {
    variant: ApiVariant,
    next_job_id: JobId,
    phase: JobPhase,
    active: Option<ActiveJob>,
    results: Vec<ResultRecord>,
}

impl JobState {
    pub fn new(variant: ApiVariant) -> Self {
        Self {
            variant,
            ..Self::default()
        }
    }

    pub fn variant(&self) -> ApiVariant {
        self.variant
    }

    pub fn phase(&self) -> JobPhase {
        self.phase
    }

    pub fn job_id(&self) -> Option<JobId> {
        self.active.as_ref().map(|job| job.id)
    }

    pub fn targets(&self) -> &[String] {
        self.active
            .as_ref()
            .map(|job| job.targets.as_slice())
            .unwrap_or_default()
    }

    pub fn results(&self) -> &[ResultRecord] {
        &self.results
    }

    pub fn completed(&self) -> usize {
        self.active.as_ref().map_or(0, |job| job.completed)
    }

    /// True while calls may still settle into the result set.
    pub fn is_running(&self) -> bool {
        matches!(self.phase, JobPhase::Running | JobPhase::Cancelling)
    }

    pub fn view(&self) -> JobView {
        let Some(job) = self.active.as_ref() else {
            return JobView {
                phase: self.phase,
                result_count: self.results.len(),
                ..JobView::default()
            };
        };
        let count = |status: CallStatus| job.calls.iter().filter(|s| **s == status).count();
        JobView {
            phase: self.phase,
            job_id: Some(job.id),
            target_count: job.targets.len(),
            scheduled: count(CallStatus::Scheduled),
            in_flight: count(CallStatus::InFlight),
            completed: job.completed,
            result_count: self.results.len(),
            failed: job.failed,
            no_article: job.no_article,
        }
    }

    /// Resets results and counters and installs `job`. Returns the new id.
    pub(crate) fn begin_job(&mut self, job: &Job) -> JobId {
        self.next_job_id += 1;
        let id = self.next_job_id;
        self.results.clear();
        self.active = Some(ActiveJob {
            id,
            targets: job.targets.clone(),
            calls: vec![CallStatus::Scheduled; job.targets.len()],
            completed: 0,
            failed: 0,
            no_article: 0,
        });
        self.phase = JobPhase::Running;
        id
    }

    pub(crate) fn set_phase(&mut self, phase: JobPhase) {
        self.phase = phase;
    }

    /// Returns the active job when `job_id` is current and still accepting settlements.
    pub(crate) fn live_job_mut(&mut self, job_id: JobId) -> Option<&mut ActiveJob> {
        if self.phase != JobPhase::Running {
            return None;
        }
        self.active.as_mut().filter(|job| job.id == job_id)
    }

    pub(crate) fn push_result(&mut self, record: ResultRecord) {
        self.results.push(record);
    }
}
