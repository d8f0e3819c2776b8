//! Classify inbound text and produce replies.
//!
//! Dispatch (first match wins):
//! 1. Greeting token (`hi`, `hello`, `/start`, `start`) → static intro
//! 2. `brief` → weather lookup + LLM morning brief
//! 3. `summarize <url>` → page fetch + LLM bullet summary
//! 4. anything else → free-form chat with a fixed system turn

pub mod context;
pub mod intent;
pub mod reply;

pub use {
    context::AppContext,
    intent::{Intent, classify},
    reply::{GREETING, route_event},
};
