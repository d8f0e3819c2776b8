//! OpenAI-compatible chat completion client.

pub mod model;
pub mod openai;

pub use {
    model::ChatMessage,
    openai::{OpenAiClient, REQUEST_TIMEOUT},
};
