use std::fmt;
use std::time::Duration;

pub type JobId = u64;

/// Which remote API a harvester instance drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ApiVariant {
    /// Article extraction; results export as XML.
    #[default]
    Extraction,
    /// Page categorization; results export as CSV.
    Categorization,
}

/// Opaque API credential. Never printed in full.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials(String);

impl Credentials {
    pub fn new(secret: impl Into<String>) -> Self {
        Self(secret.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Credentials(<redacted {} chars>)", self.0.chars().count())
    }
}

/// Raw job submission as it arrives from the UI form.
#[derive(Clone, PartialEq, Eq, Default)]
pub struct JobRequest {
    pub stagger_ms: Option<u64>,
    pub credentials: Option<String>,
    /// Newline-delimited target URLs.
    pub targets: String,
}

impl fmt::Debug for JobRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JobRequest")
            .field("stagger_ms", &self.stagger_ms)
            .field("credentials", &self.credentials.as_ref().map(|_| "<redacted>"))
            .field("targets", &self.targets)
            .finish()
    }
}

/// A validated job. Immutable once scheduling begins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Job {
    pub targets: Vec<String>,
    pub stagger: Duration,
    pub credentials: Credentials,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitError {
    EmptyTargets,
    MissingStagger,
    MissingCredentials,
}

impl fmt::Display for SubmitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubmitError::EmptyTargets => write!(f, "no targets"),
            SubmitError::MissingStagger => write!(f, "missing-stagger"),
            SubmitError::MissingCredentials => write!(f, "missing-credentials"),
        }
    }
}

impl JobRequest {
    /// Validates the submission. Checks run in order: targets, stagger, credentials.
    pub fn into_job(self) -> Result<Job, SubmitError> {
        let targets = parse_targets(&self.targets);
        if targets.is_empty() {
            return Err(SubmitError::EmptyTargets);
        }
        let stagger_ms = self.stagger_ms.ok_or(SubmitError::MissingStagger)?;
        let credentials = self
            .credentials
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty())
            .ok_or(SubmitError::MissingCredentials)?;

        Ok(Job {
            targets,
            stagger: Duration::from_millis(stagger_ms),
            credentials: Credentials::new(credentials),
        })
    }
}

/// Splits newline-delimited input into trimmed, non-empty targets.
/// Order and duplicates are preserved.
pub fn parse_targets(raw: &str) -> Vec<String> {
    raw.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(ToOwned::to_owned)
        .collect()
}
