//! Batch harvester core: pure job state machine and result model.
mod effect;
mod event;
mod export;
mod job;
mod msg;
mod record;
mod state;
mod update;
mod view_model;

pub use effect::Effect;
pub use event::UiEvent;
pub use export::{export_precheck, ExportRefusal};
pub use job::{parse_targets, ApiVariant, Credentials, Job, JobId, JobRequest, SubmitError};
pub use msg::Msg;
pub use record::{ArticleRecord, CallOutcome, Category, CategoryRecord, ResultRecord};
pub use state::{CallStatus, JobPhase, JobState};
pub use update::update;
pub use view_model::JobView;
