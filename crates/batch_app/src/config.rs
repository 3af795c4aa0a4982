use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use batch_core::ApiVariant;
use batch_engine::{
    CallError, CallSettings, CategorizationApi, ExtractionApi, HttpCaller, RemoteCaller,
    DEFAULT_CATEGORIZATION_ENDPOINT, DEFAULT_EXTRACTION_ENDPOINT, DEFAULT_MODEL,
};
use batch_logging::{batch_info, LogDestination, DEFAULT_LOG_FILE};
use serde::Deserialize;
use thiserror::Error;

pub const DEFAULT_CONFIG_FILE: &str = "batch.ron";

/// Remote API selection, as written in the config file and on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum ApiKind {
    #[default]
    Extraction,
    Categorization,
}

impl From<ApiKind> for ApiVariant {
    fn from(kind: ApiKind) -> Self {
        match kind {
            ApiKind::Extraction => ApiVariant::Extraction,
            ApiKind::Categorization => ApiVariant::Categorization,
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("malformed config {}: {message}", path.display())]
    Parse { path: PathBuf, message: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    pub api: ApiKind,
    pub extraction_endpoint: String,
    pub categorization_endpoint: String,
    pub model: String,
    /// Delay between consecutive call start times. Required to submit a job.
    pub stagger_ms: Option<u64>,
    pub connect_timeout_secs: u64,
    pub request_timeout_secs: u64,
    pub max_response_bytes: u64,
    pub log_destination: LogDestination,
    pub log_file: PathBuf,
}

impl Default for AppConfig {
    fn default() -> Self {
        let call = CallSettings::default();
        Self {
            api: ApiKind::default(),
            extraction_endpoint: DEFAULT_EXTRACTION_ENDPOINT.to_string(),
            categorization_endpoint: DEFAULT_CATEGORIZATION_ENDPOINT.to_string(),
            model: DEFAULT_MODEL.to_string(),
            stagger_ms: None,
            connect_timeout_secs: call.connect_timeout.as_secs(),
            request_timeout_secs: call.request_timeout.as_secs(),
            max_response_bytes: call.max_response_bytes,
            log_destination: LogDestination::default(),
            log_file: PathBuf::from(DEFAULT_LOG_FILE),
        }
    }
}

impl AppConfig {
    /// Loads `explicit` if given; otherwise `batch.ron` in the working
    /// directory, falling back to defaults when that file does not exist.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        match explicit {
            Some(path) => Self::from_file(path),
            None => {
                let path = Path::new(DEFAULT_CONFIG_FILE);
                match fs::read_to_string(path) {
                    Ok(text) => Self::from_ron(&text, path),
                    Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(Self::default()),
                    Err(source) => Err(ConfigError::Read {
                        path: path.to_path_buf(),
                        source,
                    }),
                }
            }
        }
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_ron(&text, path)
    }

    fn from_ron(text: &str, path: &Path) -> Result<Self, ConfigError> {
        let config: Self = ron::from_str(text).map_err(|err| ConfigError::Parse {
            path: path.to_path_buf(),
            message: err.to_string(),
        })?;
        batch_info!("Loaded configuration from {:?}", path);
        Ok(config)
    }

    pub fn variant(&self) -> ApiVariant {
        self.api.into()
    }

    pub fn call_settings(&self) -> CallSettings {
        CallSettings {
            connect_timeout: Duration::from_secs(self.connect_timeout_secs),
            request_timeout: Duration::from_secs(self.request_timeout_secs),
            max_response_bytes: self.max_response_bytes,
        }
    }

    /// HTTP caller for the configured API.
    pub fn remote_caller(&self) -> Result<Arc<dyn RemoteCaller>, CallError> {
        let settings = self.call_settings();
        let caller: Arc<dyn RemoteCaller> = match self.api {
            ApiKind::Extraction => {
                let api = ExtractionApi::new(&self.extraction_endpoint)?;
                Arc::new(HttpCaller::new(api, settings)?)
            }
            ApiKind::Categorization => {
                let api = CategorizationApi::new(&self.categorization_endpoint, &self.model)?;
                Arc::new(HttpCaller::new(api, settings)?)
            }
        };
        Ok(caller)
    }
}
