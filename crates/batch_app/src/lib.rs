//! Batch harvester application: configuration, command line and the
//! controller that connects the job state machine to the engine.
pub mod cli;
pub mod config;
pub mod controller;

pub use cli::Cli;
pub use config::{ApiKind, AppConfig, ConfigError, DEFAULT_CONFIG_FILE};
pub use controller::{describe_event, Controller, StdoutSink, UiSink};
