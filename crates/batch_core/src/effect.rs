use std::path::PathBuf;
use std::time::Duration;

use crate::{Credentials, JobId, ResultRecord, UiEvent};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Fan out one call per target, call `i` firing `i * stagger` after submission.
    ScheduleJob {
        job_id: JobId,
        targets: Vec<String>,
        stagger: Duration,
        credentials: Credentials,
    },
    /// Suppress every call of the job that has not fired yet.
    CancelJob { job_id: JobId },
    /// Serialize a snapshot of the result set to `destination`.
    WriteExport {
        destination: PathBuf,
        records: Vec<ResultRecord>,
    },
    Notify(UiEvent),
}
