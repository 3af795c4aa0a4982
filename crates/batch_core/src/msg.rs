use std::path::PathBuf;

use crate::{CallOutcome, JobId, JobRequest};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// User submitted the job form.
    Submit(JobRequest),
    /// Engine fired the call for `index`.
    CallDispatched { job_id: JobId, index: usize },
    /// Engine finished the call for `index`, successfully or not.
    CallSettled {
        job_id: JobId,
        index: usize,
        outcome: CallOutcome,
    },
    /// User clicked Stop (or reloaded the page).
    CancelRequested,
    /// Engine confirmed every pending call of the job was suppressed.
    CancelCompleted { job_id: JobId },
    /// User picked (or dismissed) a save destination.
    ExportRequested { destination: Option<PathBuf> },
    /// Outcome of a `WriteExport` effect.
    ExportFinished { result: Result<PathBuf, String> },
    /// Fallback for placeholder wiring.
    NoOp,
}
