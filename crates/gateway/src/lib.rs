//! Webhook HTTP server.
//!
//! Three routes: a health probe, the subscription verification
//! handshake, and the inbound message webhook. Everything else (intent
//! classification, collaborator calls, outbound sends) lives in other
//! crates and is reached through [`server::AppState`].

pub mod server;

pub use server::{AppState, build_app, serve};
