//! HipChat sink: post room messages via the v1 REST API.

use crate::models::PostRequest;
use crate::sinks::{ChatSink, SinkError};
use async_trait::async_trait;
use reqwest::Client;

pub const HIPCHAT_API_BASE: &str = "https://api.hipchat.com/v1";

/// HipChat room notification sink. Token comes from env/CLI; never log it.
pub struct HipChatSink {
    token: String,
    base_url: String,
    client: Client,
}

impl HipChatSink {
    pub fn new(token: String) -> Self {
        Self::with_base_url(token, HIPCHAT_API_BASE.to_string())
    }

    pub fn with_base_url(token: String, base_url: String) -> Self {
        Self {
            token,
            base_url: base_url.trim_end_matches('/').to_string(),
            client: Client::new(),
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/rooms/message", self.base_url)
    }

    fn form_fields(request: &PostRequest) -> [(&'static str, &str); 6] {
        [
            ("room_id", request.room_id.as_str()),
            ("from", request.from.as_str()),
            ("message", request.message.as_str()),
            ("message_format", request.format.as_str()),
            ("notify", if request.notify { "1" } else { "0" }),
            ("color", request.color.as_str()),
        ]
    }
}

#[async_trait]
impl ChatSink for HipChatSink {
    fn name(&self) -> &str {
        "hipchat"
    }

    async fn post(&self, request: &PostRequest) -> Result<(), SinkError> {
        let res = self
            .client
            .post(self.endpoint())
            .query(&[("auth_token", self.token.as_str())])
            .form(&Self::form_fields(request))
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
