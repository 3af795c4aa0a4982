use crate::{ResultRecord, SubmitError};

/// Events delivered to the UI layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiEvent {
    /// Submission had no targets after trimming.
    ListError,
    /// Submission was missing stagger or credentials.
    InvalidJob(SubmitError),
    ListLength(usize),
    DomainNumber(usize),
    /// Completion counter after a call settled.
    ResultNumber(usize),
    ResultError,
    ResultErrorNoArticle,
    /// Full result set once every target settled (categorization only).
    ResultItself(Vec<ResultRecord>),
    ScrapeStopped,
    FileNotSaved,
    FileEmpty,
    FileSaved,
}

impl UiEvent {
    /// Channel name used by the UI wiring.
    pub fn channel(&self) -> &'static str {
        match self {
            UiEvent::ListError => "list:error",
            UiEvent::InvalidJob(_) => "job:invalid",
            UiEvent::ListLength(_) => "list:length",
            UiEvent::DomainNumber(_) => "domain:number",
            UiEvent::ResultNumber(_) => "result:number",
            UiEvent::ResultError => "result:error",
            UiEvent::ResultErrorNoArticle => "result:error-no-article",
            UiEvent::ResultItself(_) => "result:itself",
            UiEvent::ScrapeStopped => "scrape:stopped",
            UiEvent::FileNotSaved => "file:notSaved",
            UiEvent::FileEmpty => "file:empty",
            UiEvent::FileSaved => "file:save",
        }
    }
}
