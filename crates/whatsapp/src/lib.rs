//! WhatsApp Business Cloud API channel.
//!
//! Deserializes webhook payloads from Meta, verifies subscription
//! handshakes and payload signatures, and sends replies through the
//! Graph API.

pub mod send;
pub mod types;
pub mod webhook;

pub use {
    send::{MAX_TEXT_LEN, WhatsAppClient},
    types::{WebhookPayload, extract_text_messages},
    webhook::{verify_signature, verify_webhook_subscription},
};
