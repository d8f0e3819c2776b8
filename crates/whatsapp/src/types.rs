//! Webhook payload types for the WhatsApp Business Cloud API.
//!
//! Every field defaults so that unrelated webhook notifications (status
//! updates, unknown change kinds) deserialize cleanly into empty shapes
//! instead of failing the request.

use {
    serde::{Deserialize, Serialize},
    tracing::debug,
};

use omniai_common::InboundMessage;

/// Top-level webhook payload from Meta.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WebhookPayload {
    #[serde(default)]
    pub entry: Vec<Entry>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Entry {
    #[serde(default)]
    pub changes: Vec<Change>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Change {
    #[serde(default)]
    pub field: String,
    #[serde(default)]
    pub value: ChangeValue,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChangeValue {
    #[serde(default)]
    pub messages: Vec<Message>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Message {
    /// Sender phone number in international format.
    #[serde(default)]
    pub from: String,
    #[serde(default, rename = "type")]
    pub message_type: String,
    #[serde(default)]
    pub text: Option<TextBody>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TextBody {
    #[serde(default)]
    pub body: String,
}

impl Message {
    /// Body text if this is a text message.
    #[must_use]
    pub fn text_body(&self) -> Option<String> {
        if self.message_type == "text" {
            self.text.as_ref().map(|t| t.body.clone())
        } else {
            None
        }
    }
}

/// Flatten a webhook payload into the text messages it carries,
/// preserving arrival order. Non-text messages are skipped.
#[must_use]
pub fn extract_text_messages(payload: &WebhookPayload) -> Vec<InboundMessage> {
    let mut out = Vec::new();
    for entry in &payload.entry {
        for change in &entry.changes {
            if change.field != "messages" {
                debug!(field = %change.field, "ignoring non-message webhook change");
                continue;
            }
            for msg in &change.value.messages {
                match msg.text_body() {
                    Some(body) => out.push(InboundMessage::new(msg.from.clone(), body)),
                    None => {
                        debug!(message_type = %msg.message_type, "ignoring non-text message");
                    },
                }
            }
        }
    }
    out
}
