//! Types shared between the webhook surface and the router.

use serde::{Deserialize, Serialize};

/// One inbound text message extracted from a webhook delivery.
///
/// Only text messages become `InboundMessage`s; other message kinds are
/// dropped during extraction. `text` is the raw body, untrimmed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InboundMessage {
    /// Platform sender ID (the `from` field of the webhook message).
    pub sender: String,
    /// Message body as delivered.
    pub text: String,
}

impl InboundMessage {
    pub fn new(sender: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            sender: sender.into(),
            text: text.into(),
        }
    }
}
