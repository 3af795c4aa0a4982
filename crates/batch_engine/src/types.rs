use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use batch_core::{CallOutcome, JobId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    /// The call for `index` fired `after` the job was scheduled.
    CallDispatched {
        job_id: JobId,
        index: usize,
        after: Duration,
    },
    CallSettled {
        job_id: JobId,
        index: usize,
        outcome: CallOutcome,
    },
    /// Every not-yet-fired call of the job was suppressed.
    JobCancelled {
        job_id: JobId,
        /// Calls that had already fired when the cancel was processed.
        fired: usize,
        suppressed: usize,
    },
    /// The engine could not start its runtime; no job will run.
    EngineFailed { message: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallError {
    pub kind: FailureKind,
    pub message: String,
}

impl CallError {
    pub(crate) fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for CallError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

impl std::error::Error for CallError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    InvalidUrl,
    HttpStatus(u16),
    Timeout,
    TooLarge { max_bytes: u64, actual: Option<u64> },
    MalformedPayload,
    /// The API answered with an explicit error for this target.
    Remote,
    Network,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::InvalidUrl => write!(f, "invalid url"),
            FailureKind::HttpStatus(code) => write!(f, "http status {code}"),
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::TooLarge { max_bytes, actual } => {
                write!(f, "response too large (max {max_bytes}, actual {actual:?})")
            }
            FailureKind::MalformedPayload => write!(f, "malformed payload"),
            FailureKind::Remote => write!(f, "remote error"),
            FailureKind::Network => write!(f, "network error"),
        }
    }
}

impl From<CallError> for CallOutcome {
    fn from(err: CallError) -> Self {
        CallOutcome::Failed {
            reason: err.to_string(),
        }
    }
}

/// Where an export landed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportSummary {
    pub path: PathBuf,
    pub record_count: usize,
}
