//! Execution unit: the per-producer poll → drain → sleep cycle.

use crate::dispatch::{deliver, DispatchSettings, PollOutcome, Producer};
use crate::sinks::ChatSink;
use futures_util::{FutureExt, StreamExt};
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Counters reported by a unit once it stops
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct UnitReport {
    pub cycles: u64,
    pub faults: u64,
}

pub(crate) struct ExecutionUnit {
    index: usize,
    producer: Box<dyn Producer>,
    sink: Arc<dyn ChatSink>,
    settings: Arc<DispatchSettings>,
    cancel: CancellationToken,
}

impl ExecutionUnit {
    pub fn new(
        index: usize,
        producer: Box<dyn Producer>,
        sink: Arc<dyn ChatSink>,
        settings: Arc<DispatchSettings>,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            index,
            producer,
            sink,
            settings,
            cancel,
        }
    }

    /// Repeat cycles until the token is cancelled. Faults never end the loop.
    ///
    /// A cycle fault is a producer error or a panic raised by the producer or
    /// the sink while draining; either one defers the next poll by the fault
    /// backoff instead of the producer's own delay.
    pub async fn run(mut self) -> UnitReport {
        let mut report = UnitReport::default();
        tracing::debug!(unit = self.index, producer = self.producer.name(), "unit started");

        while !self.cancel.is_cancelled() {
            let wait = match AssertUnwindSafe(self.cycle()).catch_unwind().await {
                Ok(Ok(next_poll)) => next_poll,
                Ok(Err(e)) => {
                    report.faults += 1;
                    tracing::error!(
                        unit = self.index,
                        producer = self.producer.name(),
                        error = %format!("{:#}", e),
                        backoff_secs = self.settings.fault_backoff.as_secs(),
                        "cycle failed, backing off"
                    );
                    self.settings.fault_backoff
                }
                Err(payload) => {
                    report.faults += 1;
                    tracing::error!(
                        unit = self.index,
                        producer = self.producer.name(),
                        panic = panic_message(payload.as_ref()),
                        backoff_secs = self.settings.fault_backoff.as_secs(),
                        "cycle panicked, backing off"
                    );
                    self.settings.fault_backoff
                }
            };
            report.cycles += 1;

            tokio::select! {
                _ = self.cancel.cancelled() => break,
                _ = tokio::time::sleep(wait) => {}
            }
        }

        tracing::debug!(
            unit = self.index,
            producer = self.producer.name(),
            cycles = report.cycles,
            faults = report.faults,
            "unit stopped"
        );
        report
    }

    /// Poll once and drain the stream, delivering each notice before pulling the next.
    async fn cycle(&mut self) -> anyhow::Result<Duration> {
        let PollOutcome {
            mut notices,
            next_poll,
        } = self.producer.poll().await?;

        while let Some(notice) = notices.next().await {
            match deliver(self.sink.as_ref(), &self.settings, &notice).await {
                Ok(delivered) => {
                    tracing::debug!(
                        unit = self.index,
                        producer = self.producer.name(),
                        delivered,
                        "notice delivered"
                    );
                }
                Err(e) => {
                    tracing::warn!(
                        unit = self.index,
                        producer = self.producer.name(),
                        recipient = e.recipient(),
                        error = %e,
                        "delivery failed"
                    );
                }
            }
        }

        Ok(next_poll)
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.as_str()
    } else {
        "non-string panic payload"
    }
}
