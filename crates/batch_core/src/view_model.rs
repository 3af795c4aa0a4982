use crate::{JobId, JobPhase};

/// Progress snapshot for rendering.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct JobView {
    pub phase: JobPhase,
    pub job_id: Option<JobId>,
    pub target_count: usize,
    /// Calls that have not fired yet.
    pub scheduled: usize,
    pub in_flight: usize,
    pub completed: usize,
    pub result_count: usize,
    pub failed: usize,
    pub no_article: usize,
}
