//! Integration test: delivery failures and producer faults stay inside their unit.

mod common;

use async_trait::async_trait;
use common::{rooms, Log, RecordingSink, ScriptedProducer};
use nagloop_core::dispatch::{DispatchSettings, Dispatcher, PollOutcome, Producer, RunSummary};
use nagloop_core::models::{Notice, PostRequest};
use nagloop_core::sinks::{ChatSink, SinkError};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

async fn run_for(dispatcher: Dispatcher, window: Duration) -> RunSummary {
    let cancel = CancellationToken::new();
    let handle = tokio::spawn(dispatcher.run_until_cancelled(cancel.clone()));
    tokio::time::sleep(window).await;
    cancel.cancel();
    handle.await.unwrap()
}

fn settings_with_backoff(backoff: Duration) -> DispatchSettings {
    DispatchSettings {
        fault_backoff: backoff,
        ..DispatchSettings::default()
    }
}

#[tokio::test(start_paused = true)]
async fn test_failed_recipient_skips_rest_of_notice_only() {
    let sink = Arc::new(RecordingSink::new().failing("r2"));
    let producer = ScriptedProducer::new(
        "triple",
        vec![
            Notice::new("first", rooms(&["r1", "r2", "r3"])),
            Notice::to_room("second", "r4"),
        ],
        Duration::from_secs(10),
    );
    let invocations = producer.invocations.clone();
    let mut dispatcher = Dispatcher::new(sink.clone());
    dispatcher.register(producer);

    let summary = run_for(dispatcher, Duration::from_secs(15)).await;

    assert_eq!(
        sink.rooms_attempted().await,
        rooms(&["r1", "r2", "r4", "r1", "r2", "r4"])
    );
    assert_eq!(invocations.lock().await.len(), 2, "unit kept cycling");
    assert_eq!(summary.faults, 0, "delivery failures are not producer faults");
}

#[tokio::test(start_paused = true)]
async fn test_empty_recipients_make_no_post() {
    let sink = Arc::new(RecordingSink::new());
    let producer = ScriptedProducer::new(
        "silent",
        vec![Notice::new("nobody listens", Vec::new())],
        Duration::from_secs(1),
    );
    let invocations = producer.invocations.clone();
    let mut dispatcher = Dispatcher::new(sink.clone());
    dispatcher.register(producer);

    let summary = run_for(dispatcher, Duration::from_millis(3_500)).await;

    assert!(sink.posts.lock().await.is_empty());
    assert_eq!(invocations.lock().await.len(), 4);
    assert_eq!(summary.faults, 0);
}

#[tokio::test(start_paused = true)]
async fn test_slow_failing_delivery_does_not_block_other_unit() {
    let sink = Arc::new(
        RecordingSink::new()
            .failing("down")
            .slow("down", Duration::from_secs(30)),
    );
    let mut dispatcher = Dispatcher::new(sink.clone());
    dispatcher.register(ScriptedProducer::new(
        "broken-room",
        vec![Notice::to_room("lost", "down")],
        Duration::from_secs(1),
    ));
    dispatcher.register(ScriptedProducer::new(
        "healthy-room",
        vec![Notice::to_room("ok", "up")],
        Duration::from_secs(1),
    ));
    let start = Instant::now();

    run_for(dispatcher, Duration::from_millis(10_500)).await;

    let posts = sink.posts.lock().await;
    let healthy: Vec<Duration> = posts
        .iter()
        .filter(|p| p.room == "up")
        .map(|p| p.at - start)
        .collect();
    assert_eq!(healthy.len(), 11);
    for (i, at) in healthy.iter().enumerate() {
        assert_eq!(*at, Duration::from_secs(i as u64));
    }
    // The stalled post only completes long after the healthy unit stopped.
    let stalled: Vec<Duration> = posts
        .iter()
        .filter(|p| p.room == "down")
        .map(|p| p.at - start)
        .collect();
    assert_eq!(stalled, vec![Duration::from_secs(30)]);
}

/// Fails according to a script, then behaves like a plain producer.
struct FlakyProducer {
    script: Vec<Fault>,
    polls: Log<Instant>,
}

#[derive(Clone, Copy)]
enum Fault {
    Panic,
    Error,
    Healthy,
}

#[async_trait]
impl Producer for FlakyProducer {
    fn name(&self) -> &str {
        "flaky"
    }

    async fn poll(&mut self) -> anyhow::Result<PollOutcome> {
        self.polls.lock().await.push(Instant::now());
        let fault = if self.script.is_empty() {
            Fault::Healthy
        } else {
            self.script.remove(0)
        };
        match fault {
            Fault::Panic => panic!("flaky producer blew up"),
            Fault::Error => anyhow::bail!("upstream returned 500"),
            Fault::Healthy => Ok(PollOutcome::from_notices(
                vec![Notice::to_room("recovered", "room")],
                Duration::from_secs(100),
            )),
        }
    }
}

#[tokio::test(start_paused = true)]
async fn test_producer_faults_back_off_and_recover() {
    let sink = Arc::new(RecordingSink::new());
    let polls = common::log();
    let mut dispatcher =
        Dispatcher::with_settings(sink.clone(), settings_with_backoff(Duration::from_secs(5)));
    dispatcher.register(FlakyProducer {
        script: vec![Fault::Panic, Fault::Error],
        polls: polls.clone(),
    });
    let bystander = ScriptedProducer::new(
        "bystander",
        vec![Notice::to_room("still here", "other")],
        Duration::from_secs(1),
    );
    let bystander_polls = bystander.invocations.clone();
    dispatcher.register(bystander);
    let start = Instant::now();

    let summary = run_for(dispatcher, Duration::from_millis(12_500)).await;

    let polls: Vec<Duration> = polls.lock().await.iter().map(|t| *t - start).collect();
    assert_eq!(
        polls,
        vec![
            Duration::ZERO,
            Duration::from_secs(5),
            Duration::from_secs(10)
        ]
    );
    assert_eq!(summary.units, 2);
    assert_eq!(summary.faults, 2);
    assert_eq!(bystander_polls.lock().await.len(), 13);

    let posts = sink.posts.lock().await;
    let recovered: Vec<_> = posts.iter().filter(|p| p.text == "recovered").collect();
    assert_eq!(recovered.len(), 1);
}

/// Sink that panics on every post.
struct PanickingSink;

#[async_trait]
impl ChatSink for PanickingSink {
    fn name(&self) -> &str {
        "panicking"
    }

    async fn post(&self, _request: &PostRequest) -> Result<(), SinkError> {
        panic!("sink blew up");
    }
}

#[tokio::test(start_paused = true)]
async fn test_sink_panic_is_a_cycle_fault_with_backoff() {
    let producer = ScriptedProducer::new(
        "steady",
        vec![Notice::to_room("boom", "room")],
        Duration::from_secs(1),
    );
    let invocations = producer.invocations.clone();
    let mut dispatcher = Dispatcher::with_settings(
        Arc::new(PanickingSink),
        settings_with_backoff(Duration::from_secs(60)),
    );
    dispatcher.register(producer);
    let start = Instant::now();

    let summary = run_for(dispatcher, Duration::from_secs(130)).await;

    // Backoff replaces the producer's 1s delay after each panic.
    let started: Vec<Duration> = invocations
        .lock()
        .await
        .iter()
        .map(|i| i.started - start)
        .collect();
    assert_eq!(
        started,
        vec![
            Duration::ZERO,
            Duration::from_secs(60),
            Duration::from_secs(120)
        ]
    );
    assert_eq!(summary.cycles, 3);
    assert_eq!(summary.faults, 3);
}
