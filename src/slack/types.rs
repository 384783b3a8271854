use serde::{Deserialize, Serialize};

use super::blocks::Block;

/// Slash command invocation as posted by Slack (form fields).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SlashCommand {
    /// Command name including the leading slash, e.g. "/stale"
    pub command: String,
    /// Everything typed after the command
    pub text: String,
    pub user_id: String,
    pub channel_id: String,
}

impl SlashCommand {
    /// Build from decoded `application/x-www-form-urlencoded` pairs.
    /// Unknown fields are ignored; missing ones stay empty.
    pub fn from_form<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        let mut command = SlashCommand::default();
        for (key, value) in pairs {
            match key {
                "command" => command.command = value.to_string(),
                "text" => command.text = value.to_string(),
                "user_id" => command.user_id = value.to_string(),
                "channel_id" => command.channel_id = value.to_string(),
                _ => {}
            }
        }
        command
    }
}

/// Message body for `chat.postMessage` and `chat.update`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Message {
    /// Notification fallback, shown alone when there are no blocks
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub blocks: Vec<Block>,
}

impl Message {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            blocks: Vec::new(),
        }
    }

    pub fn blocks(blocks: Vec<Block>) -> Self {
        Self { text: None, blocks }
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }
}

/// Address of a message already posted, used to edit it in place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageRef {
    pub channel: String,
    pub ts: String,
}

/// Envelope of an Events API request.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EventEnvelope {
    UrlVerification { challenge: String },
    EventCallback { event: Event },
    #[serde(other)]
    Other,
}

/// Inner event of an `event_callback`.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    Message {
        #[serde(default)]
        text: Option<String>,
        #[serde(default)]
        user: Option<String>,
        channel: String,
        /// Set when the message was sent by a bot, including this one
        #[serde(default)]
        bot_id: Option<String>,
    },
    #[serde(other)]
    Other,
}
