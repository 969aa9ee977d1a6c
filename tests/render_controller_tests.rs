//! Render lifecycle: idle, success, failure, supersession.

mod common;

use common::{FAILING_PREFIX, ScriptedEngine, pipeline_in_tmp_dir};
use mermaid_export::mount::ERROR_PANEL_SUMMARY;
use mermaid_export::{CommitStatus, MountContent};

fn mounted_text(content: &MountContent) -> String {
    match content {
        MountContent::Diagram(markup) => markup.as_str().to_string(),
        other => panic!("expected a mounted diagram, got {other:?}"),
    }
}

#[tokio::test]
async fn test_starts_idle() {
    let (pipeline, _dir) = pipeline_in_tmp_dir(ScriptedEngine::new());
    assert!(pipeline.mount().is_empty());
    assert!(!pipeline.controller.is_pending());
    assert_eq!(pipeline.controller.latest_description(), None);
}

#[tokio::test]
async fn test_blank_description_starts_nothing() {
    let engine = ScriptedEngine::new();
    let (pipeline, _dir) = pipeline_in_tmp_dir(engine.clone());

    assert!(pipeline.controller.on_description_change("").is_none());
    assert!(pipeline.controller.on_description_change("  \n\t ").is_none());
    assert!(pipeline.mount().is_empty());
    assert_eq!(engine.calls(), 0);
}

#[tokio::test]
async fn test_success_mounts_normalized_markup() {
    let (pipeline, _dir) = pipeline_in_tmp_dir(ScriptedEngine::new());

    let task = pipeline
        .controller
        .on_description_change("flowchart TD\nA-->B")
        .unwrap();
    assert!(pipeline.controller.is_pending());
    assert_eq!(task.wait().await, CommitStatus::Committed);
    assert!(!pipeline.controller.is_pending());

    let svg = mounted_text(&pipeline.mount().snapshot());
    assert!(svg.contains("A--&gt;B") || svg.contains("A-->B"));
    assert!(svg.contains("max-width: 100%"));
    assert!(svg.contains("height: auto"));
    assert!(svg.contains("background-color: transparent"));
}

#[tokio::test]
async fn test_failure_mounts_error_panel() {
    let (pipeline, _dir) = pipeline_in_tmp_dir(ScriptedEngine::new());
    let bad = format!("{FAILING_PREFIX} @@@");

    let task = pipeline.controller.on_description_change(&bad).unwrap();
    assert_eq!(task.wait().await, CommitStatus::Committed);

    match pipeline.mount().snapshot() {
        MountContent::Error(panel) => {
            assert_eq!(panel.summary(), ERROR_PANEL_SUMMARY);
            assert!(panel.summary().contains("Error"));
            assert!(panel.detail().contains("Parse error on line 1"));
        }
        other => panic!("expected an error panel, got {other:?}"),
    }
    assert!(pipeline.mount().mounted_markup().is_none());
}

#[tokio::test]
async fn test_later_description_wins_when_earlier_finishes_last() {
    let engine = ScriptedEngine::new();
    let release_first = engine.hold("graph D1");
    let (pipeline, _dir) = pipeline_in_tmp_dir(engine.clone());

    let first = pipeline
        .controller
        .on_description_change("graph D1")
        .unwrap();
    let second = pipeline
        .controller
        .on_description_change("graph D2")
        .unwrap();
    assert_ne!(first.id(), second.id());

    assert_eq!(second.wait().await, CommitStatus::Committed);
    assert!(mounted_text(&pipeline.mount().snapshot()).contains("graph D2"));

    release_first.send(()).unwrap();
    assert_eq!(first.wait().await, CommitStatus::Superseded);

    let svg = mounted_text(&pipeline.mount().snapshot());
    assert!(svg.contains("graph D2"));
    assert!(!svg.contains("graph D1"));
}

#[tokio::test]
async fn test_stale_result_never_flashes() {
    let engine = ScriptedEngine::new();
    let release_second = engine.hold("graph D2");
    let (pipeline, _dir) = pipeline_in_tmp_dir(engine.clone());

    let first = pipeline
        .controller
        .on_description_change("graph D1")
        .unwrap();
    let second = pipeline
        .controller
        .on_description_change("graph D2")
        .unwrap();

    // D1 completes first but is already stale.
    assert_eq!(first.wait().await, CommitStatus::Superseded);
    assert!(pipeline.mount().is_empty());
    assert!(pipeline.controller.is_pending());

    release_second.send(()).unwrap();
    assert_eq!(second.wait().await, CommitStatus::Committed);
    assert!(mounted_text(&pipeline.mount().snapshot()).contains("graph D2"));
}

#[tokio::test]
async fn test_stale_failure_does_not_replace_diagram() {
    let engine = ScriptedEngine::new();
    let bad = format!("{FAILING_PREFIX} first");
    let release_bad = engine.hold(&bad);
    let (pipeline, _dir) = pipeline_in_tmp_dir(engine.clone());

    let failing = pipeline.controller.on_description_change(&bad).unwrap();
    let good = pipeline
        .controller
        .on_description_change("graph OK")
        .unwrap();
    assert_eq!(good.wait().await, CommitStatus::Committed);

    release_bad.send(()).unwrap();
    assert_eq!(failing.wait().await, CommitStatus::Superseded);
    assert!(matches!(
        pipeline.mount().snapshot(),
        MountContent::Diagram(_)
    ));
}

#[tokio::test]
async fn test_unchanged_description_is_not_rerendered() {
    let engine = ScriptedEngine::new();
    let (pipeline, _dir) = pipeline_in_tmp_dir(engine.clone());

    let task = pipeline
        .controller
        .on_description_change("graph A")
        .unwrap();
    assert!(pipeline.controller.on_description_change("graph A").is_none());
    assert_eq!(task.wait().await, CommitStatus::Committed);
    assert!(pipeline.controller.on_description_change("graph A").is_none());
    assert_eq!(engine.calls(), 1);
    assert_eq!(
        pipeline.controller.latest_description().as_deref(),
        Some("graph A")
    );
}

#[tokio::test]
async fn test_blank_clears_and_supersedes_in_flight() {
    let engine = ScriptedEngine::new();
    let release = engine.hold("graph D1");
    let (pipeline, _dir) = pipeline_in_tmp_dir(engine.clone());

    common::render_committed(&pipeline, "graph D0").await;
    assert!(!pipeline.mount().is_empty());

    let in_flight = pipeline
        .controller
        .on_description_change("graph D1")
        .unwrap();
    assert!(pipeline.controller.on_description_change("   ").is_none());
    assert!(pipeline.mount().is_empty());
    assert_eq!(pipeline.controller.latest_description(), None);

    release.send(()).unwrap();
    assert_eq!(in_flight.wait().await, CommitStatus::Superseded);
    assert!(pipeline.mount().is_empty());

    // The same text after a clear is a new request.
    common::render_committed(&pipeline, "graph D1").await;
    assert!(mounted_text(&pipeline.mount().snapshot()).contains("graph D1"));
}

#[tokio::test]
async fn test_dropped_task_still_commits() {
    let (pipeline, _dir) = pipeline_in_tmp_dir(ScriptedEngine::new());

    drop(pipeline.controller.on_description_change("graph Z"));
    for _ in 0..100 {
        if !pipeline.controller.is_pending() {
            break;
        }
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
    }
    assert!(mounted_text(&pipeline.mount().snapshot()).contains("graph Z"));
}
