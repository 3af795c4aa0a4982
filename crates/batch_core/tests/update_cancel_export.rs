use std::path::PathBuf;

use batch_core::{
    update, ApiVariant, ArticleRecord, CallOutcome, Effect, JobPhase, JobRequest, JobState, Msg,
    ResultRecord, UiEvent,
};
use pretty_assertions::assert_eq;

fn running(targets: &str) -> JobState {
    let request = JobRequest {
        stagger_ms: Some(1000),
        credentials: Some("key".to_string()),
        targets: targets.to_string(),
    };
    update(JobState::new(ApiVariant::Extraction), Msg::Submit(request)).0
}

fn article(title: &str) -> CallOutcome {
    CallOutcome::Record(ResultRecord::Article(ArticleRecord {
        title: title.to_string(),
        url: format!("https://a.example/{title}"),
        ..ArticleRecord::default()
    }))
}

#[test]
fn cancel_waits_for_engine_acknowledgment() {
    let state = running("a\nb\nc");

    let (state, effects) = update(state, Msg::CancelRequested);
    assert_eq!(state.phase(), JobPhase::Cancelling);
    assert_eq!(effects, vec![Effect::CancelJob { job_id: 1 }]);

    // Second click while cancelling does nothing.
    let (state, effects) = update(state, Msg::CancelRequested);
    assert!(effects.is_empty());

    let (state, effects) = update(state, Msg::CancelCompleted { job_id: 1 });
    assert_eq!(state.phase(), JobPhase::Stopped);
    assert_eq!(effects, vec![Effect::Notify(UiEvent::ScrapeStopped)]);
}

#[test]
fn cancel_without_job_stops_immediately() {
    let (state, effects) = update(JobState::default(), Msg::CancelRequested);

    assert_eq!(state.phase(), JobPhase::Idle);
    assert_eq!(effects, vec![Effect::Notify(UiEvent::ScrapeStopped)]);
}

#[test]
fn in_flight_results_after_cancel_are_discarded() {
    let state = running("a\nb\nc");
    let (state, _effects) = update(
        state,
        Msg::CallSettled {
            job_id: 1,
            index: 0,
            outcome: article("first"),
        },
    );
    let (state, _effects) = update(state, Msg::CancelRequested);

    let (state, effects) = update(
        state,
        Msg::CallSettled {
            job_id: 1,
            index: 1,
            outcome: article("late"),
        },
    );
    assert!(effects.is_empty());

    let (state, _effects) = update(state, Msg::CancelCompleted { job_id: 1 });
    let (state, effects) = update(
        state,
        Msg::CallSettled {
            job_id: 1,
            index: 2,
            outcome: article("later"),
        },
    );
    assert!(effects.is_empty());
    assert_eq!(state.completed(), 1);
    assert_eq!(state.results().len(), 1);
}

#[test]
fn export_without_destination_is_refused_first() {
    let (state, effects) = update(
        JobState::default(),
        Msg::ExportRequested { destination: None },
    );

    assert_eq!(effects, vec![Effect::Notify(UiEvent::FileNotSaved)]);
    assert_eq!(state, JobState::default());
}

#[test]
fn export_of_empty_results_is_refused() {
    let state = running("a");
    let before = state.clone();

    let (state, effects) = update(
        state,
        Msg::ExportRequested {
            destination: Some(PathBuf::from("out.xml")),
        },
    );

    assert_eq!(effects, vec![Effect::Notify(UiEvent::FileEmpty)]);
    assert_eq!(state, before);
}

#[test]
fn partial_results_remain_exportable_after_stop() {
    let state = running("a\nb");
    let (state, _effects) = update(
        state,
        Msg::CallSettled {
            job_id: 1,
            index: 0,
            outcome: article("kept"),
        },
    );
    let (state, _effects) = update(state, Msg::CancelRequested);
    let (state, _effects) = update(state, Msg::CancelCompleted { job_id: 1 });

    let (state, effects) = update(
        state,
        Msg::ExportRequested {
            destination: Some(PathBuf::from("out.xml")),
        },
    );

    assert_eq!(
        effects,
        vec![Effect::WriteExport {
            destination: PathBuf::from("out.xml"),
            records: state.results().to_vec(),
        }]
    );
}

#[test]
fn export_outcome_maps_to_file_events_and_keeps_results() {
    let state = running("a");
    let (state, _effects) = update(
        state,
        Msg::CallSettled {
            job_id: 1,
            index: 0,
            outcome: article("one"),
        },
    );

    let (state, effects) = update(
        state,
        Msg::ExportFinished {
            result: Err("permission denied".to_string()),
        },
    );
    assert_eq!(effects, vec![Effect::Notify(UiEvent::FileNotSaved)]);
    assert_eq!(state.results().len(), 1);

    let (state, effects) = update(
        state,
        Msg::ExportFinished {
            result: Ok(PathBuf::from("out.xml")),
        },
    );
    assert_eq!(effects, vec![Effect::Notify(UiEvent::FileSaved)]);
    assert_eq!(state.results().len(), 1);
}
