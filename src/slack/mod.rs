pub mod blocks;
pub mod signature;
pub mod terminal;
pub mod types;

pub use blocks::{Block, Text};
pub use types::{Message, MessageRef, SlashCommand};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, instrument};

use crate::config::SlackConfig;

#[derive(Debug, Error)]
pub enum SlackError {
    #[error("Slack API request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Slack API {method} failed: {error}")]
    Api { method: &'static str, error: String },
}

/// Outbound side of the chat connection.
#[async_trait]
pub trait Messenger: Send + Sync {
    /// Send a message to a channel, returning its address for later edits.
    async fn post(&self, channel: &str, message: &Message) -> Result<MessageRef, SlackError>;

    /// Replace the content of a message sent earlier.
    async fn update(&self, target: &MessageRef, message: &Message) -> Result<(), SlackError>;
}

/// [`Messenger`] backed by the Slack Web API.
pub struct SlackClient {
    http: reqwest::Client,
    api_base: String,
    token: String,
}

#[derive(Serialize)]
struct PostMessageRequest<'a> {
    channel: &'a str,
    #[serde(flatten)]
    message: &'a Message,
}

#[derive(Serialize)]
struct UpdateMessageRequest<'a> {
    channel: &'a str,
    ts: &'a str,
    #[serde(flatten)]
    message: &'a Message,
}

#[derive(Deserialize)]
struct ApiResponse {
    ok: bool,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    channel: Option<String>,
    #[serde(default)]
    ts: Option<String>,
}

impl SlackClient {
    pub fn new(config: &SlackConfig, token: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_base: config.api_base.trim_end_matches('/').to_string(),
            token: token.to_string(),
        }
    }

    async fn call<B: Serialize + Sync>(
        &self,
        method: &'static str,
        body: &B,
    ) -> Result<ApiResponse, SlackError> {
        let response = self
            .http
            .post(format!("{}/{}", self.api_base, method))
            .bearer_auth(&self.token)
            .json(body)
            .send()
            .await?
            .error_for_status()?
            .json::<ApiResponse>()
            .await?;

        // Slack reports most failures as 200 with `ok: false`
        if !response.ok {
            return Err(SlackError::Api {
                method,
                error: response.error.unwrap_or_else(|| "unknown_error".to_string()),
            });
        }
        Ok(response)
    }
}

#[async_trait]
impl Messenger for SlackClient {
    #[instrument(skip(self, message), fields(blocks = message.blocks.len()))]
    async fn post(&self, channel: &str, message: &Message) -> Result<MessageRef, SlackError> {
        let request = PostMessageRequest { channel, message };
        let response = self.call("chat.postMessage", &request).await?;

        let ts = response.ts.ok_or(SlackError::Api {
            method: "chat.postMessage",
            error: "response carried no ts".to_string(),
        })?;
        debug!(ts = %ts, "posted message");
        Ok(MessageRef {
            channel: response.channel.unwrap_or_else(|| channel.to_string()),
            ts,
        })
    }

    #[instrument(skip(self, message), fields(channel = %target.channel, ts = %target.ts))]
    async fn update(&self, target: &MessageRef, message: &Message) -> Result<(), SlackError> {
        let request = UpdateMessageRequest {
            channel: &target.channel,
            ts: &target.ts,
            message,
        };
        self.call("chat.update", &request).await?;
        debug!("updated message");
        Ok(())
    }
}
