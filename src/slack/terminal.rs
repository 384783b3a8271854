use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use colored::Colorize;

use super::blocks::{Accessory, Block, ContextElement};
use super::{Message, MessageRef, Messenger, SlackError};

/// [`Messenger`] that prints messages to stdout instead of sending them.
/// Used by `pr-police preview` to try commands without a Slack workspace.
#[derive(Default)]
pub struct TerminalMessenger {
    sent: AtomicU64,
}

impl TerminalMessenger {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Messenger for TerminalMessenger {
    async fn post(&self, channel: &str, message: &Message) -> Result<MessageRef, SlackError> {
        let ts = self.sent.fetch_add(1, Ordering::SeqCst) + 1;
        println!("{}", format!("── message {ts} ──").dimmed());
        print!("{}", render(message));
        Ok(MessageRef {
            channel: channel.to_string(),
            ts: ts.to_string(),
        })
    }

    async fn update(&self, target: &MessageRef, message: &Message) -> Result<(), SlackError> {
        println!("{}", format!("── message {} (edited) ──", target.ts).dimmed());
        print!("{}", render(message));
        Ok(())
    }
}

/// Plain-text rendering of a message, one line per block.
fn render(message: &Message) -> String {
    let mut out = String::new();
    if message.blocks.is_empty() {
        if let Some(text) = &message.text {
            out.push_str(text);
            out.push('\n');
        }
        return out;
    }

    for block in &message.blocks {
        match block {
            Block::Header { text } => {
                out.push_str(&format!("═══ {} ═══\n", text.as_str().bold()));
            }
            Block::Divider => out.push_str("────────────────\n"),
            Block::Section { text, accessory } => {
                out.push_str(text.as_str());
                if let Some(Accessory::Button { text, url, .. }) = accessory {
                    out.push_str(&format!("  [{}]({})", text.as_str(), url.as_str().cyan()));
                }
                out.push('\n');
            }
            Block::Context { elements } => {
                let parts: Vec<String> = elements
                    .iter()
                    .map(|element| match element {
                        ContextElement::Image { alt_text, .. } => format!("[{alt_text}]"),
                        ContextElement::Mrkdwn { text } => text.clone(),
                    })
                    .collect();
                out.push_str(&format!("{}\n", parts.join(" ").as_str().italic()));
            }
        }
    }
    out
}
