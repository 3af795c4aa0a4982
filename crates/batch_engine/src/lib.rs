//! Batch harvester engine: remote calls, staggered scheduling and export.
pub mod api;
mod call;
mod engine;
mod export;
mod format;
mod persist;
mod sanitize;
mod types;

pub use api::{
    ApiProtocol, CategorizationApi, ExtractionApi, DEFAULT_CATEGORIZATION_ENDPOINT,
    DEFAULT_EXTRACTION_ENDPOINT, DEFAULT_MODEL,
};
pub use call::{CallSettings, HttpCaller, RemoteCaller};
pub use engine::EngineHandle;
pub use export::{export_results, render_csv, render_xml, ExportError, ExportFormat, CSV_HEADER};
pub use format::{format_article, format_categories, title_case, ArticlePayload, CategoryPayload};
pub use persist::{AtomicFileWriter, PersistError};
pub use sanitize::{sanitize, AllowList};
pub use types::{CallError, EngineEvent, ExportSummary, FailureKind};
