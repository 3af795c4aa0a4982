use batch_core::{CallOutcome, Credentials};
use reqwest::header::CONTENT_TYPE;
use serde::{Deserialize, Serialize};

use super::{malformed, parse_endpoint, ApiProtocol};
use crate::format::{format_article, ArticlePayload};
use crate::sanitize::AllowList;
use crate::types::{CallError, FailureKind};

pub const DEFAULT_EXTRACTION_ENDPOINT: &str = "https://autoextract.scrapinghub.com/v1/extract";

#[derive(Serialize)]
struct ExtractionQuery<'a> {
    url: &'a str,
    #[serde(rename = "pageType")]
    page_type: &'static str,
}

#[derive(Deserialize)]
struct ExtractionItem {
    article: Option<ArticlePayload>,
    error: Option<String>,
}

/// Article extraction: POST `[{url, pageType: "article"}]` with basic auth,
/// the credential as user name and an empty password.
#[derive(Debug, Clone)]
pub struct ExtractionApi {
    endpoint: url::Url,
    allow: AllowList,
}

impl ExtractionApi {
    pub fn new(endpoint: &str) -> Result<Self, CallError> {
        Ok(Self {
            endpoint: parse_endpoint(endpoint)?,
            allow: AllowList::article(),
        })
    }

    pub fn with_allow_list(mut self, allow: AllowList) -> Self {
        self.allow = allow;
        self
    }
}

impl ApiProtocol for ExtractionApi {
    fn name(&self) -> &'static str {
        "extraction"
    }

    fn build_request(
        &self,
        client: &reqwest::Client,
        target: &str,
        credentials: &Credentials,
    ) -> Result<reqwest::RequestBuilder, CallError> {
        let body = serde_json::to_vec(&[ExtractionQuery {
            url: target,
            page_type: "article",
        }])
        .map_err(malformed)?;

        Ok(client
            .post(self.endpoint.clone())
            .header(CONTENT_TYPE, "application/json")
            .basic_auth(credentials.expose(), Some(""))
            .body(body))
    }

    fn parse_response(&self, target: &str, body: &[u8]) -> Result<CallOutcome, CallError> {
        let items: Vec<ExtractionItem> = serde_json::from_slice(body).map_err(malformed)?;
        let first = items.into_iter().next().ok_or_else(|| {
            CallError::new(FailureKind::MalformedPayload, "empty response array")
        })?;

        if let Some(error) = first.error {
            return Err(CallError::new(FailureKind::Remote, error));
        }
        Ok(match first.article {
            Some(article) => format_article(article, target, &self.allow),
            None => CallOutcome::NoArticle,
        })
    }
}
