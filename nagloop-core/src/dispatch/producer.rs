//! Producer contract

use crate::models::Notice;
use async_trait::async_trait;
use futures_util::stream::{self, BoxStream, StreamExt};
use std::time::Duration;

/// Finite stream of notices returned by one poll. Pulled one element at a time.
pub type NoticeStream = BoxStream<'static, Notice>;

/// Result of one producer invocation
pub struct PollOutcome {
    pub notices: NoticeStream,
    /// Wait after the stream is drained before polling again
    pub next_poll: Duration,
}

impl PollOutcome {
    pub fn new(notices: NoticeStream, next_poll: Duration) -> Self {
        Self { notices, next_poll }
    }

    /// Wrap an already collected batch.
    pub fn from_notices(notices: Vec<Notice>, next_poll: Duration) -> Self {
        Self::new(stream::iter(notices).boxed(), next_poll)
    }
}

impl std::fmt::Debug for PollOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PollOutcome")
            .field("next_poll", &self.next_poll)
            .finish_non_exhaustive()
    }
}

/// A unit of work that checks some condition and reports notices.
///
/// Any state carried between polls lives in the implementing value; each
/// registered producer is owned by exactly one execution unit.
#[async_trait]
pub trait Producer: Send + 'static {
    /// Name used in log events.
    fn name(&self) -> &str;

    /// Check the condition once. The returned stream must terminate.
    ///
    /// An `Err` is treated as a producer fault: it is logged and the producer
    /// is polled again after the dispatcher's fault backoff.
    async fn poll(&mut self) -> anyhow::Result<PollOutcome>;
}

