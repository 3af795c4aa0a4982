use std::path::PathBuf;

use batch_core::JobRequest;
use clap::Parser;

use crate::config::{ApiKind, AppConfig};

#[derive(Debug, Parser)]
#[command(
    name = "batch-harvest",
    version,
    about = "Submit a list of URLs to a remote extraction or categorization API"
)]
pub struct Cli {
    /// File with one target URL per line.
    #[arg(long)]
    pub targets: PathBuf,

    /// Where to write the export. Without it the export is refused.
    #[arg(long)]
    pub output: Option<PathBuf>,

    /// Delay between consecutive calls, in milliseconds.
    #[arg(long)]
    pub stagger_ms: Option<u64>,

    #[arg(long, value_enum)]
    pub api: Option<ApiKind>,

    /// RON configuration file (default: ./batch.ron if present).
    #[arg(long)]
    pub config: Option<PathBuf>,

    #[arg(long, env = "BATCH_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,
}

impl Cli {
    /// Command-line values take precedence over the config file.
    pub fn apply(&self, mut config: AppConfig) -> AppConfig {
        if let Some(api) = self.api {
            config.api = api;
        }
        if let Some(stagger_ms) = self.stagger_ms {
            config.stagger_ms = Some(stagger_ms);
        }
        config
    }

    pub fn job_request(&self, config: &AppConfig, targets: String) -> JobRequest {
        JobRequest {
            stagger_ms: config.stagger_ms,
            credentials: self.api_key.clone(),
            targets,
        }
    }
}
