//! Delivery routine: post one notice to each of its recipients in order.

use crate::dispatch::DispatchSettings;
use crate::models::{MessageFormat, Notice, PostRequest};
use crate::sinks::{ChatSink, SinkError};
use thiserror::Error;

/// Delivery of a notice stopped at the first failing recipient
#[derive(Error, Debug)]
pub enum DeliveryError {
    #[error("post to {recipient} via {sink} failed after {delivered} delivered: {source}")]
    Post {
        recipient: String,
        sink: String,
        delivered: usize,
        #[source]
        source: SinkError,
    },
}

impl DeliveryError {
    pub fn recipient(&self) -> &str {
        match self {
            DeliveryError::Post { recipient, .. } => recipient,
        }
    }
}

/// Deliver `notice` and return how many recipients were posted to.
///
/// The first failing post aborts delivery to the remaining recipients. Nothing
/// is retried. An empty recipient list makes no sink call.
pub async fn deliver(
    sink: &dyn ChatSink,
    settings: &DispatchSettings,
    notice: &Notice,
) -> Result<usize, DeliveryError> {
    let mut delivered = 0;
    for recipient in &notice.recipients {
        let request = PostRequest {
            room_id: recipient.clone(),
            from: settings.sender_name.clone(),
            message: notice.text.clone(),
            format: MessageFormat::Text,
            color: settings.color,
            notify: true,
        };
        if let Err(source) = sink.post(&request).await {
            return Err(DeliveryError::Post {
                recipient: recipient.clone(),
                sink: sink.name().to_string(),
                delivered,
                source,
            });
        }
        delivered += 1;
    }
    Ok(delivered)
}
