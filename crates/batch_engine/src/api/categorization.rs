use batch_core::{CallOutcome, Credentials};
use batch_logging::batch_warn;
use serde::Deserialize;
use serde_json::Value;

use super::{malformed, parse_endpoint, ApiProtocol};
use crate::format::{format_categories, CategoryPayload};
use crate::types::CallError;

pub const DEFAULT_CATEGORIZATION_ENDPOINT: &str = "https://api.meaningcloud.com/class-1.1";
pub const DEFAULT_MODEL: &str = "IAB_en";

#[derive(Deserialize)]
struct CategorizationResponse {
    status: Option<StatusPayload>,
    category_list: Option<Vec<CategoryPayload>>,
}

#[derive(Deserialize)]
struct StatusPayload {
    #[serde(default)]
    code: Value,
    msg: Option<String>,
}

impl StatusPayload {
    fn is_ok(&self) -> bool {
        match &self.code {
            Value::String(code) => code == "0",
            Value::Number(code) => code.as_u64() == Some(0),
            Value::Null => true,
            _ => false,
        }
    }
}

/// Categorization: GET with `key`, `url` and `model` query parameters.
#[derive(Debug, Clone)]
pub struct CategorizationApi {
    endpoint: url::Url,
    model: String,
}

impl CategorizationApi {
    pub fn new(endpoint: &str, model: impl Into<String>) -> Result<Self, CallError> {
        Ok(Self {
            endpoint: parse_endpoint(endpoint)?,
            model: model.into(),
        })
    }
}

impl ApiProtocol for CategorizationApi {
    fn name(&self) -> &'static str {
        "categorization"
    }

    fn build_request(
        &self,
        client: &reqwest::Client,
        target: &str,
        credentials: &Credentials,
    ) -> Result<reqwest::RequestBuilder, CallError> {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut()
            .append_pair("key", credentials.expose())
            .append_pair("url", target)
            .append_pair("model", &self.model);
        Ok(client.get(url))
    }

    fn parse_response(&self, target: &str, body: &[u8]) -> Result<CallOutcome, CallError> {
        let response: CategorizationResponse = serde_json::from_slice(body).map_err(malformed)?;
        // A non-zero status still produces a (possibly empty) record.
        if let Some(status) = response.status.as_ref().filter(|s| !s.is_ok()) {
            batch_warn!(
                "categorization status {} for {}: {}",
                status.code,
                target,
                status.msg.as_deref().unwrap_or("no message")
            );
        }
        Ok(format_categories(response.category_list, target))
    }
}
