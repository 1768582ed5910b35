//! Functional tests for the annotation and review workflow.
//!
//! These tests exercise the Workbench end to end over a real temp
//! directory:
//! - ensure_workspace is idempotent and seeds the file layout.
//! - annotations and uncertain samples round-trip through their files.
//! - review actions move samples through the resolve/flag/promote states.
//! - stats aggregate counts, label sets, and the cached accuracy.

use annolab_core::{CoreError, ReviewAction, SampleState, Workbench};
use annolab_test_utils::{
    annotation, annotation_with_entity, assert_workspace_layout, init_tracing, sample,
    temp_workbench, write_rasa_archive, write_spacy_model, ScriptedTrainer,
};
use std::sync::Arc;

fn make_workbench() -> (tempfile::TempDir, Workbench) {
    init_tracing();
    temp_workbench(Arc::new(ScriptedTrainer::succeeding()))
}

/// Ensuring a workspace twice must not disturb existing data.
#[tokio::test]
async fn ensure_workspace_is_idempotent() {
    let (_dir, wb) = make_workbench();

    let paths = wb.ensure_workspace("demo").unwrap();
    assert_workspace_layout(&paths);

    wb.append_annotation("demo", annotation("hello", "greet"))
        .await
        .unwrap();

    let again = wb.ensure_workspace("demo").unwrap();
    assert_eq!(paths.base(), again.base());
    assert_eq!(wb.list_annotations("demo").unwrap().len(), 1);
}

#[test]
fn list_workspaces_is_sorted() {
    let (_dir, wb) = make_workbench();
    wb.ensure_workspace("zeta").unwrap();
    wb.ensure_workspace("alpha").unwrap();

    assert_eq!(wb.list_workspaces().unwrap(), vec!["alpha", "zeta"]);
}

/// The demo scenario: annotate, queue a sample, promote it.
#[tokio::test]
async fn promote_sample_into_training_set() {
    let (_dir, wb) = make_workbench();
    wb.ensure_workspace("demo").unwrap();

    wb.append_annotation("demo", annotation("hello there", "greet"))
        .await
        .unwrap();
    wb.save_uncertain_samples("demo", &[sample("s1", "book a flight", "book_flight")])
        .await
        .unwrap();

    let outcome = wb
        .mark_sample_reviewed("demo", "s1", "add_to_training")
        .await
        .unwrap();
    assert_eq!(outcome.state, SampleState::Promoted);
    assert_eq!(outcome.action, ReviewAction::AddToTraining);

    let annotations = wb.list_annotations("demo").unwrap();
    assert_eq!(annotations.len(), 2);
    assert_eq!(annotations[1].text, "book a flight");
    assert_eq!(annotations[1].intent, "book_flight");
    assert!(wb.list_uncertain_samples("demo").unwrap().is_empty());
}

/// Caller-supplied fields survive the append/list cycle through the
/// file verbatim.
#[tokio::test]
async fn append_round_trips_extra_fields() {
    let (_dir, wb) = make_workbench();

    let mut ann = annotation("hi", "greet");
    ann.extra
        .insert("reviewer".to_string(), serde_json::Value::from("ana"));
    ann.extra
        .insert("pass".to_string(), serde_json::Value::from(2));

    let echoed = wb.append_annotation("demo", ann.clone()).await.unwrap();
    assert_eq!(echoed, ann);

    let listed = wb.list_annotations("demo").unwrap();
    assert_eq!(listed, vec![ann]);
}

/// Re-annotation flags the sample and keeps it queued; repeating the
/// action changes nothing.
#[tokio::test]
async fn reannotate_is_idempotent() {
    let (_dir, wb) = make_workbench();
    wb.save_uncertain_samples("demo", &[sample("s1", "hm", "greet")])
        .await
        .unwrap();

    for _ in 0..2 {
        let outcome = wb
            .mark_sample_reviewed("demo", "s1", "reannotate")
            .await
            .unwrap();
        assert_eq!(outcome.state, SampleState::Flagged);
    }

    let queued = wb.list_uncertain_samples("demo").unwrap();
    assert_eq!(queued.len(), 1);
    assert!(queued[0].marked_for_reannotation);
    assert!(wb.list_annotations("demo").unwrap().is_empty());
}

/// Reviewing an unknown sample is an error and leaves both collections
/// unchanged.
#[tokio::test]
async fn unknown_sample_mutates_nothing() {
    let (_dir, wb) = make_workbench();
    wb.save_uncertain_samples("demo", &[sample("s1", "hm", "greet")])
        .await
        .unwrap();

    let err = wb
        .mark_sample_reviewed("demo", "ghost", "reviewed")
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::SampleNotFound { .. }));
    assert!(err.is_caller_error());

    assert_eq!(wb.list_uncertain_samples("demo").unwrap().len(), 1);
    assert!(wb.list_annotations("demo").unwrap().is_empty());
}

#[tokio::test]
async fn unknown_action_is_rejected() {
    let (_dir, wb) = make_workbench();
    wb.save_uncertain_samples("demo", &[sample("s1", "hm", "greet")])
        .await
        .unwrap();

    let err = wb
        .mark_sample_reviewed("demo", "s1", "promote")
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::UnknownAction { .. }));
    assert_eq!(wb.list_uncertain_samples("demo").unwrap().len(), 1);
}

/// Stats count distinct labels, not occurrences.
#[tokio::test]
async fn stats_count_distinct_intents_and_entities() {
    let (_dir, wb) = make_workbench();
    wb.ensure_workspace("demo").unwrap();

    wb.append_annotation("demo", annotation("hi", "greet"))
        .await
        .unwrap();
    wb.append_annotation("demo", annotation("hello", "greet"))
        .await
        .unwrap();
    wb.append_annotation(
        "demo",
        annotation_with_entity("fly to Paris", "book_flight", 7, 12, "city"),
    )
    .await
    .unwrap();
    wb.save_uncertain_samples("demo", &[sample("s1", "hm", "greet")])
        .await
        .unwrap();

    let stats = wb.get_workspace_stats("demo");
    assert!(stats.error.is_none());
    assert_eq!(stats.total_annotations, 3);
    assert_eq!(stats.total_uncertain, 1);
    assert_eq!(stats.num_intents, 2);
    assert_eq!(stats.intents, vec!["book_flight", "greet"]);
    assert_eq!(stats.entity_types, vec!["city"]);
}

/// The accuracy scalar is seeded in [60, 90] on first read and then
/// cached.
#[test]
fn accuracy_is_seeded_once_and_cached() {
    let (_dir, wb) = make_workbench();
    wb.ensure_workspace("demo").unwrap();

    let first = wb.get_workspace_stats("demo").accuracy.unwrap();
    assert!((60.0..=90.0).contains(&first));

    let second = wb.get_workspace_stats("demo").accuracy.unwrap();
    assert_eq!(first, second);
}

/// Model artifacts written by training show up in stats, with Rasa's
/// timestamp taking priority.
#[test]
fn stats_pick_up_model_artifacts() {
    let (_dir, wb) = make_workbench();
    let paths = wb.ensure_workspace("demo").unwrap();

    write_spacy_model(&paths.spacy_model_dir(), 1_700_000_000);
    write_rasa_archive(&paths.rasa_model_dir(), "20250113-123456.tar.gz");

    let stats = wb.get_workspace_stats("demo");
    assert_eq!(stats.model_versions.spacy.len(), 2);
    assert_eq!(stats.model_versions.rasa.len(), 1);
    let rasa_ts = stats.model_versions.rasa[0].timestamp;
    assert_eq!(stats.last_training_ts, rasa_ts);

    let health = wb.model_health("demo");
    assert_eq!(health.last_trained, rasa_ts);
    assert_eq!(health.total_annotations, 0);
}

#[test]
fn average_accuracy_spans_all_workspaces() {
    let (_dir, wb) = make_workbench();
    assert_eq!(wb.average_accuracy().unwrap(), None);

    wb.ensure_workspace("a").unwrap();
    wb.ensure_workspace("b").unwrap();

    let avg = wb.average_accuracy().unwrap().unwrap();
    assert!((60.0..=90.0).contains(&avg));

    let a = wb.get_workspace_stats("a").accuracy.unwrap();
    let b = wb.get_workspace_stats("b").accuracy.unwrap();
    let expected = (((a + b) / 2.0) * 100.0).round() / 100.0;
    assert_eq!(avg, expected);
}

/// The NLU export groups by intent and inlines entity markup.
#[tokio::test]
async fn nlu_export_writes_markup() -> anyhow::Result<()> {
    let (_dir, wb) = make_workbench();
    wb.ensure_workspace("demo")?;

    wb.append_annotation(
        "demo",
        annotation_with_entity("fly to Paris", "book_flight", 7, 12, "city"),
    )
    .await?;
    wb.append_annotation("demo", annotation("hello", "greet"))
        .await?;

    let path = wb.export_rasa_nlu("demo").await?;
    let content = std::fs::read_to_string(path)?;
    assert!(content.starts_with("version: \"3.1\"\nnlu:\n"));
    assert!(content.contains("- intent: book_flight\n  examples: |\n    - fly to [Paris](city)\n"));
    assert!(content.contains("- intent: greet\n  examples: |\n    - hello\n"));
    Ok(())
}

/// Concurrent appends under the per-workspace lock lose no writes.
#[tokio::test]
async fn concurrent_appends_are_serialized() {
    let (_dir, wb) = make_workbench();
    wb.ensure_workspace("demo").unwrap();
    let wb = Arc::new(wb);

    let mut handles = Vec::new();
    for i in 0..8 {
        let wb = Arc::clone(&wb);
        handles.push(tokio::spawn(async move {
            wb.append_annotation("demo", annotation(&format!("text {i}"), "greet"))
                .await
                .unwrap();
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    assert_eq!(wb.list_annotations("demo").unwrap().len(), 8);
}
