//! Dispatcher: producer registry and run loop

use crate::dispatch::unit::ExecutionUnit;
use crate::dispatch::Producer;
use crate::models::{Color, Configuration, DEFAULT_SENDER_NAME};
use crate::sinks::ChatSink;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

/// Fixed parts of every post plus fault handling
#[derive(Debug, Clone)]
pub struct DispatchSettings {
    /// Sender shown on every post
    pub sender_name: String,
    pub color: Color,
    /// Pause after a cycle fault before polling the producer again
    pub fault_backoff: Duration,
}

impl Default for DispatchSettings {
    fn default() -> Self {
        Self {
            sender_name: DEFAULT_SENDER_NAME.to_string(),
            color: Color::Purple,
            fault_backoff: Duration::from_secs(60),
        }
    }
}

impl DispatchSettings {
    pub fn from_config(config: &Configuration) -> Self {
        Self {
            sender_name: config.sender_name.clone(),
            color: config.color,
            fault_backoff: Duration::from_secs(config.fault_backoff_seconds),
        }
    }
}

/// Totals collected once every unit has stopped
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Execution units started (one per registered producer)
    pub units: usize,
    /// Completed cycles across all units
    pub cycles: u64,
    /// Cycle faults absorbed by the units: producer errors, and panics raised
    /// while polling or delivering
    pub faults: u64,
}

/// Schedules registered producers and routes their notices to the sink.
pub struct Dispatcher {
    producers: Vec<Box<dyn Producer>>,
    sink: Arc<dyn ChatSink>,
    settings: DispatchSettings,
}

impl Dispatcher {
    pub fn new(sink: Arc<dyn ChatSink>) -> Self {
        Self::with_settings(sink, DispatchSettings::default())
    }

    pub fn with_settings(sink: Arc<dyn ChatSink>, settings: DispatchSettings) -> Self {
        Self {
            producers: Vec::new(),
            sink,
            settings,
        }
    }

    /// Append a producer. Each registration becomes its own execution unit.
    pub fn register<P: Producer>(&mut self, producer: P) {
        tracing::debug!(
            producer = producer.name(),
            position = self.producers.len(),
            "producer registered"
        );
        self.producers.push(Box::new(producer));
    }

    pub fn len(&self) -> usize {
        self.producers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.producers.is_empty()
    }

    /// Run every producer forever. Returns only if no producer is registered.
    pub async fn run(self) {
        self.run_until_cancelled(CancellationToken::new()).await;
    }

    /// Run every producer until `cancel` fires, then wait for all units to stop.
    ///
    /// The token is observed at the top of each cycle and during the
    /// post-cycle sleep; an in-flight poll or delivery is allowed to finish.
    pub async fn run_until_cancelled(self, cancel: CancellationToken) -> RunSummary {
        let mut summary = RunSummary::default();
        if self.producers.is_empty() {
            tracing::warn!("no producers registered, nothing to run");
            return summary;
        }

        let settings = Arc::new(self.settings);
        let mut units = JoinSet::new();
        for (index, producer) in self.producers.into_iter().enumerate() {
            tracing::info!(unit = index, producer = producer.name(), "starting unit");
            let unit = ExecutionUnit::new(
                index,
                producer,
                Arc::clone(&self.sink),
                Arc::clone(&settings),
                cancel.clone(),
            );
            units.spawn(unit.run());
            summary.units += 1;
        }
        tracing::info!(units = summary.units, sink = self.sink.name(), "dispatcher running");

        while let Some(joined) = units.join_next().await {
            match joined {
                Ok(report) => {
                    summary.cycles += report.cycles;
                    summary.faults += report.faults;
                }
                Err(e) => {
                    summary.faults += 1;
                    tracing::error!(error = %e, "unit terminated abnormally");
                }
            }
        }

        tracing::info!(
            units = summary.units,
            cycles = summary.cycles,
            faults = summary.faults,
            "dispatcher stopped"
        );
        summary
    }
}
