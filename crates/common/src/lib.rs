//! Shared types and text utilities used across all omniai crates.

pub mod text;
pub mod types;

pub use {text::truncate_at_char_boundary, types::InboundMessage};
