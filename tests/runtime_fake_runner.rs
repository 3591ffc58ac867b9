mod common;

use std::sync::Arc;
use std::time::Duration;

use assetpipe::engine::{Runtime, RuntimeEvent};
use assetpipe::types::{AssetCategory, TriggerReason};
use assetpipe_test_utils::FakeRunner;
use common::{init_tracing, with_timeout};
use tokio::sync::mpsc;

fn trigger(category: AssetCategory) -> RuntimeEvent {
    RuntimeEvent::CategoryTriggered {
        category,
        reason: TriggerReason::FileWatch,
    }
}

#[tokio::test]
async fn each_trigger_runs_its_category() {
    init_tracing();
    let runner = FakeRunner::new();
    let (tx, rx) = mpsc::channel(16);
    let handle = tokio::spawn(Runtime::new(Arc::new(runner.clone()), rx).run());

    tx.send(trigger(AssetCategory::Styles)).await.unwrap();
    tx.send(trigger(AssetCategory::Scripts)).await.unwrap();
    tokio::time::sleep(Duration::from_millis(50)).await;
    tx.send(RuntimeEvent::ShutdownRequested).await.unwrap();
    with_timeout(handle).await.unwrap();

    let mut runs = runner.runs();
    runs.sort_by_key(|(category, _)| *category);
    assert_eq!(
        runs,
        vec![
            (AssetCategory::Styles, TriggerReason::FileWatch),
            (AssetCategory::Scripts, TriggerReason::FileWatch),
        ]
    );
}

#[tokio::test]
async fn same_category_triggers_overlap() {
    init_tracing();
    let runner = FakeRunner::new().with_delay(Duration::from_millis(200));
    let (tx, rx) = mpsc::channel(16);
    let handle = tokio::spawn(Runtime::new(Arc::new(runner.clone()), rx).run());

    tx.send(trigger(AssetCategory::Styles)).await.unwrap();
    tx.send(trigger(AssetCategory::Styles)).await.unwrap();
    tokio::time::sleep(Duration::from_millis(100)).await;

    assert_eq!(runner.runs().len(), 2);
    assert_eq!(runner.max_concurrent(AssetCategory::Styles), 2);

    tx.send(RuntimeEvent::ShutdownRequested).await.unwrap();
    with_timeout(handle).await.unwrap();
}

#[tokio::test]
async fn shutdown_stops_the_loop() {
    init_tracing();
    let runner = FakeRunner::new();
    let (tx, rx) = mpsc::channel(16);
    let handle = tokio::spawn(Runtime::new(Arc::new(runner.clone()), rx).run());

    tx.send(RuntimeEvent::ShutdownRequested).await.unwrap();
    with_timeout(handle).await.unwrap();

    // The receiver is gone once the loop returns.
    assert!(tx.send(trigger(AssetCategory::Fonts)).await.is_err());
    assert!(runner.runs().is_empty());
}

#[tokio::test]
async fn closing_the_channel_stops_the_loop() {
    init_tracing();
    let runner = FakeRunner::new();
    let (tx, rx) = mpsc::channel(16);
    let handle = tokio::spawn(Runtime::new(Arc::new(runner), rx).run());

    drop(tx);
    with_timeout(handle).await.unwrap();
}
