//! Graph API client.

use std::time::Duration;

use async_trait::async_trait;

use super::error::SendError;
use super::types::{GraphResponse, OutgoingText, Recipient, SendRequest, SentMessage};
use super::MessageSender;
use crate::config::Config;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Sends messages through the platform's Send API.
#[derive(Debug, Clone)]
pub struct GraphApiClient {
    http: reqwest::Client,
    send_url: String,
}

impl GraphApiClient {
    pub fn new(config: &Config) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self {
            http,
            send_url: config.send_message_url(),
        })
    }
}

#[async_trait]
impl MessageSender for GraphApiClient {
    async fn send_text(
        &self,
        access_token: &str,
        recipient_id: &str,
        text: &str,
    ) -> Result<SentMessage, SendError> {
        let body = SendRequest {
            recipient: Recipient { id: recipient_id },
            message: OutgoingText { text },
            access_token,
        };

        // Errors come back as a JSON body, usually with a 4xx status
        let response: GraphResponse = self
            .http
            .post(&self.send_url)
            .json(&body)
            .send()
            .await?
            .json()
            .await?;

        if let Some(error) = response.error {
            tracing::warn!(
                code = ?error.code,
                kind = error.kind.as_deref().unwrap_or("-"),
                message = %error.message,
                "Graph API rejected message"
            );
            return Err(SendError::Platform {
                message: error.message,
                code: error.code,
            });
        }

        Ok(SentMessage {
            message_id: response.message_id,
            recipient_id: response.recipient_id,
        })
    }
}
