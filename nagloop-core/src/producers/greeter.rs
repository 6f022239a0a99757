//! Static greeter producer

use crate::dispatch::{PollOutcome, Producer};
use crate::models::{GreeterConfig, Notice};
use async_trait::async_trait;
use std::time::Duration;

/// Emits the same notice to the same rooms every `interval`.
#[derive(Debug, Clone)]
pub struct Greeter {
    name: String,
    text: String,
    rooms: Vec<String>,
    interval: Duration,
}

impl Greeter {
    pub fn new(text: impl Into<String>, rooms: Vec<String>, interval: Duration) -> Self {
        Self {
            name: "greeter".to_string(),
            text: text.into(),
            rooms,
            interval,
        }
    }

    pub fn from_config(config: &GreeterConfig) -> Self {
        Self::new(
            config.text.clone(),
            config.rooms.clone(),
            Duration::from_secs(config.interval_seconds),
        )
    }
}

#[async_trait]
impl Producer for Greeter {
    fn name(&self) -> &str {
        &self.name
    }

    async fn poll(&mut self) -> anyhow::Result<PollOutcome> {
        Ok(PollOutcome::from_notices(
            vec![Notice::new(self.text.clone(), self.rooms.clone())],
            self.interval,
        ))
    }
}
