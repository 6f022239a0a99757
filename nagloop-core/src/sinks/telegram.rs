//! Telegram sink: each recipient is a chat id, posted via Bot API sendMessage.

use crate::models::PostRequest;
use crate::sinks::{ChatSink, SinkError};
use async_trait::async_trait;
use reqwest::Client;

pub const TELEGRAM_API_BASE: &str = "https://api.telegram.org";

/// Telegram notification sink. Token from config/env; never log it.
pub struct TelegramSink {
    token: String,
    base_url: String,
    client: Client,
}

impl TelegramSink {
    pub fn new(token: String) -> Self {
        Self::with_base_url(token, TELEGRAM_API_BASE.to_string())
    }

    pub fn with_base_url(token: String, base_url: String) -> Self {
        Self {
            token,
            base_url: base_url.trim_end_matches('/').to_string(),
            client: Client::new(),
        }
    }

    /// Telegram has no sender field, so the sender name prefixes the text.
    fn format_message(request: &PostRequest) -> String {
        format!("{}: {}", request.from, request.message)
    }

    fn body(request: &PostRequest) -> serde_json::Value {
        serde_json::json!({
            "chat_id": request.room_id,
            "text": Self::format_message(request),
            "disable_notification": !request.notify,
        })
    }
}

#[async_trait]
impl ChatSink for TelegramSink {
    fn name(&self) -> &str {
        "telegram"
    }

    async fn post(&self, request: &PostRequest) -> Result<(), SinkError> {
        let url = format!("{}/bot{}/sendMessage", self.base_url, self.token);
        let res = self
            .client
            .post(&url)
            .json(&Self::body(request))
            .send()
            .await?;
        if !res.status().is_success() {
            let status = res.status().as_u16();
            let body = res.text().await.unwrap_or_default();
            return Err(SinkError::Api { status, body });
        }
        Ok(())
    }
}
