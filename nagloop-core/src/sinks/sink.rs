//! Chat sink contract

use crate::models::PostRequest;
use async_trait::async_trait;
use thiserror::Error;

/// Errors a sink can report for a single post
#[derive(Error, Debug)]
pub enum SinkError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error {status}: {body}")]
    Api { status: u16, body: String },

    #[error("Post rejected: {0}")]
    Rejected(String),
}

/// Sink posting one message to one room (e.g. HipChat, Telegram).
#[async_trait]
pub trait ChatSink: Send + Sync {
    /// Provider name for logging (e.g. "hipchat").
    fn name(&self) -> &str;

    /// Post to `request.room_id`. Failures are reported, never retried here.
    async fn post(&self, request: &PostRequest) -> Result<(), SinkError>;
}
