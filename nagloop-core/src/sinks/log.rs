//! Dry-run sink that only logs

use crate::models::PostRequest;
use crate::sinks::{ChatSink, SinkError};
use async_trait::async_trait;

/// Sink that records each post as a tracing event instead of sending it.
#[derive(Debug, Default, Clone)]
pub struct LogSink;

impl LogSink {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ChatSink for LogSink {
    fn name(&self) -> &str {
        "log"
    }

    async fn post(&self, request: &PostRequest) -> Result<(), SinkError> {
        tracing::info!(
            room = %request.room_id,
            from = %request.from,
            color = request.color.as_str(),
            notify = request.notify,
            "{}",
            request.message
        );
        Ok(())
    }
}
