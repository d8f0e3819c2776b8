//! Environment-sourced configuration for the omniai webhook service.
//!
//! All settings come from process environment variables (loaded from a
//! `.env` file by the binary before this crate reads them); empty values
//! are treated as unset and fall back to defaults.

pub mod schema;

pub use schema::{AppConfig, OpenAiConfig, ServerConfig, WhatsAppConfig};
