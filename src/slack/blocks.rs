use serde::Serialize;

/// Text object used inside blocks.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Text {
    Mrkdwn { text: String },
    PlainText { text: String, emoji: bool },
}

impl Text {
    pub fn mrkdwn(text: impl Into<String>) -> Self {
        Text::Mrkdwn { text: text.into() }
    }

    pub fn plain(text: impl Into<String>) -> Self {
        Text::PlainText {
            text: text.into(),
            emoji: true,
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Text::Mrkdwn { text } | Text::PlainText { text, .. } => text,
        }
    }
}

/// Interactive element placed beside a section's text.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Accessory {
    Button {
        text: Text,
        value: String,
        url: String,
        action_id: String,
    },
}

/// Element of a context block.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContextElement {
    Image { image_url: String, alt_text: String },
    Mrkdwn { text: String },
}

/// The subset of Slack Block Kit layout blocks the bot sends.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Block {
    Section {
        text: Text,
        #[serde(skip_serializing_if = "Option::is_none")]
        accessory: Option<Accessory>,
    },
    Header {
        text: Text,
    },
    Divider,
    Context {
        elements: Vec<ContextElement>,
    },
}

impl Block {
    pub fn section(text: Text) -> Self {
        Block::Section {
            text,
            accessory: None,
        }
    }

    /// Section with a link button on the right.
    pub fn linked_section(
        text: Text,
        label: &str,
        value: impl Into<String>,
        url: impl Into<String>,
        action_id: impl Into<String>,
    ) -> Self {
        Block::Section {
            text,
            accessory: Some(Accessory::Button {
                text: Text::plain(label),
                value: value.into(),
                url: url.into(),
                action_id: action_id.into(),
            }),
        }
    }

    pub fn header(text: impl Into<String>) -> Self {
        Block::Header {
            text: Text::plain(text),
        }
    }

    pub fn context(text: impl Into<String>) -> Self {
        Block::Context {
            elements: vec![ContextElement::Mrkdwn { text: text.into() }],
        }
    }

    /// Context line with a small image in front of the text.
    pub fn context_with_image(
        image_url: impl Into<String>,
        alt_text: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        Block::Context {
            elements: vec![
                ContextElement::Image {
                    image_url: image_url.into(),
                    alt_text: alt_text.into(),
                },
                ContextElement::Mrkdwn { text: text.into() },
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_section_with_button_wire_format() {
        let block = Block::linked_section(
            Text::mrkdwn(" • Fix login"),
            "Link",
            "9001",
            "https://github.com/o/r/pull/1",
            "button-9001",
        );
        assert_eq!(
            serde_json::to_value(&block).unwrap(),
            json!({
                "type": "section",
                "text": { "type": "mrkdwn", "text": " • Fix login" },
                "accessory": {
                    "type": "button",
                    "text": { "type": "plain_text", "text": "Link", "emoji": true },
                    "value": "9001",
                    "url": "https://github.com/o/r/pull/1",
                    "action_id": "button-9001"
                }
            })
        );
    }

    #[test]
    fn test_plain_section_omits_accessory() {
        let value = serde_json::to_value(Block::section(Text::mrkdwn("hi"))).unwrap();
        assert!(value.get("accessory").is_none());
    }

    #[test]
    fn test_divider_and_context() {
        assert_eq!(
            serde_json::to_value(Block::Divider).unwrap(),
            json!({ "type": "divider" })
        );
        assert_eq!(
            serde_json::to_value(Block::context_with_image("https://img", "alt", "text")).unwrap(),
            json!({
                "type": "context",
                "elements": [
                    { "type": "image", "image_url": "https://img", "alt_text": "alt" },
                    { "type": "mrkdwn", "text": "text" }
                ]
            })
        );
    }
}
