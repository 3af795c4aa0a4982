//! Remote API adapters. Each adapter knows how to phrase the request for
//! one target and how to turn the response body into a `CallOutcome`.
mod categorization;
mod extraction;

pub use categorization::{CategorizationApi, DEFAULT_CATEGORIZATION_ENDPOINT, DEFAULT_MODEL};
pub use extraction::{ExtractionApi, DEFAULT_EXTRACTION_ENDPOINT};

use batch_core::{CallOutcome, Credentials};

use crate::types::{CallError, FailureKind};

pub trait ApiProtocol: Send + Sync {
    fn name(&self) -> &'static str;

    fn build_request(
        &self,
        client: &reqwest::Client,
        target: &str,
        credentials: &Credentials,
    ) -> Result<reqwest::RequestBuilder, CallError>;

    /// Maps a successful response body to an outcome. Malformed bodies are errors.
    fn parse_response(&self, target: &str, body: &[u8]) -> Result<CallOutcome, CallError>;
}

fn parse_endpoint(endpoint: &str) -> Result<url::Url, CallError> {
    url::Url::parse(endpoint)
        .map_err(|err| CallError::new(FailureKind::InvalidUrl, format!("endpoint: {err}")))
}

fn malformed(err: serde_json::Error) -> CallError {
    CallError::new(FailureKind::MalformedPayload, err.to_string())
}
