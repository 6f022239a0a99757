//! Notice and transport request structures

use serde::{Deserialize, Serialize};

/// Sender name used on every post unless configured otherwise.
pub const DEFAULT_SENDER_NAME: &str = "NagLoop";

/// Outbound notification emitted by a producer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    /// Human-readable body
    pub text: String,
    /// Rooms to post to, in order. Duplicates are posted twice.
    pub recipients: Vec<String>,
}

impl Notice {
    /// Create a new notice
    pub fn new(text: impl Into<String>, recipients: Vec<String>) -> Self {
        Self {
            text: text.into(),
            recipients,
        }
    }

    /// Create a notice addressed to a single room
    pub fn to_room(text: impl Into<String>, room: impl Into<String>) -> Self {
        Self::new(text, vec![room.into()])
    }
}

/// Body format understood by the chat transport
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum MessageFormat {
    Html,
    #[default]
    Text,
}

impl MessageFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageFormat::Html => "html",
            MessageFormat::Text => "text",
        }
    }
}

/// Background color of a posted message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Color {
    Yellow,
    Red,
    Green,
    #[default]
    Purple,
    Gray,
    Random,
}

impl Color {
    pub fn as_str(&self) -> &'static str {
        match self {
            Color::Yellow => "yellow",
            Color::Red => "red",
            Color::Green => "green",
            Color::Purple => "purple",
            Color::Gray => "gray",
            Color::Random => "random",
        }
    }
}

/// Single-recipient post handed to a sink
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PostRequest {
    pub room_id: String,
    pub from: String,
    pub message: String,
    pub format: MessageFormat,
    pub color: Color,
    pub notify: bool,
}
