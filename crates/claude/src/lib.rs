//! HTTP client for the Claude messages API, implementing the engine's
//! `TextGeneration` port.

pub mod client;

pub use client::{ClaudeClient, ClaudeConfig};
