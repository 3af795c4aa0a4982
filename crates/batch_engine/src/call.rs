use std::time::Duration;

use batch_core::{CallOutcome, Credentials};
use batch_logging::{batch_debug, batch_warn};
use bytes::{Bytes, BytesMut};
use futures_util::StreamExt;

use crate::api::ApiProtocol;
use crate::types::{CallError, FailureKind};

#[derive(Debug, Clone)]
pub struct CallSettings {
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    pub max_response_bytes: u64,
}

impl Default for CallSettings {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(60),
            max_response_bytes: 16 * 1024 * 1024,
        }
    }
}

/// Performs the remote call for one target and settles it into an outcome.
/// Never fails: transport and payload problems become `CallOutcome::Failed`.
#[async_trait::async_trait]
pub trait RemoteCaller: Send + Sync {
    async fn call(&self, target: &str, credentials: &Credentials) -> CallOutcome;
}

#[derive(Debug, Clone)]
pub struct HttpCaller<P> {
    protocol: P,
    client: reqwest::Client,
    settings: CallSettings,
}

impl<P: ApiProtocol> HttpCaller<P> {
    pub fn new(protocol: P, settings: CallSettings) -> Result<Self, CallError> {
        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .build()
            .map_err(|err| CallError::new(FailureKind::Network, err.to_string()))?;
        Ok(Self {
            protocol,
            client,
            settings,
        })
    }

    /// Like `call`, but keeps the failure classification.
    pub async fn try_call(
        &self,
        target: &str,
        credentials: &Credentials,
    ) -> Result<CallOutcome, CallError> {
        url::Url::parse(target)
            .map_err(|err| CallError::new(FailureKind::InvalidUrl, err.to_string()))?;

        let response = self
            .protocol
            .build_request(&self.client, target, credentials)?
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(CallError::new(
                FailureKind::HttpStatus(status.as_u16()),
                status.to_string(),
            ));
        }

        let body = self.read_body(response).await?;
        batch_debug!(
            "{} response for {}: {} bytes",
            self.protocol.name(),
            target,
            body.len()
        );
        self.protocol.parse_response(target, &body)
    }

    async fn read_body(&self, response: reqwest::Response) -> Result<Bytes, CallError> {
        let max_bytes = self.settings.max_response_bytes;
        if let Some(content_len) = response.content_length() {
            if content_len > max_bytes {
                return Err(too_large(max_bytes, content_len));
            }
        }

        let mut body = BytesMut::new();
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(map_reqwest_error)?;
            let next_len = body.len() as u64 + chunk.len() as u64;
            if next_len > max_bytes {
                return Err(too_large(max_bytes, next_len));
            }
            body.extend_from_slice(&chunk);
        }
        Ok(body.freeze())
    }
}

#[async_trait::async_trait]
impl<P: ApiProtocol + 'static> RemoteCaller for HttpCaller<P> {
    async fn call(&self, target: &str, credentials: &Credentials) -> CallOutcome {
        match self.try_call(target, credentials).await {
            Ok(outcome) => outcome,
            Err(err) => {
                batch_warn!("{} call for {} failed: {}", self.protocol.name(), target, err);
                err.into()
            }
        }
    }
}

fn too_large(max_bytes: u64, actual: u64) -> CallError {
    CallError::new(
        FailureKind::TooLarge {
            max_bytes,
            actual: Some(actual),
        },
        "response too large",
    )
}

fn map_reqwest_error(err: reqwest::Error) -> CallError {
    // Strip the request URL: it may carry the credential as a query parameter.
    let err = err.without_url();
    if err.is_timeout() {
        return CallError::new(FailureKind::Timeout, err.to_string());
    }
    if err.is_decode() || err.is_body() {
        return CallError::new(FailureKind::MalformedPayload, err.to_string());
    }
    CallError::new(FailureKind::Network, err.to_string())
}
