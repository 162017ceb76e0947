//! # agora-llm
//!
//! Minimal Gemini client for the Agora chat server.
//!
//! - [`GeminiClient`]: unary `generateContent` over HTTPS with API-key auth
//! - [`ChatTurn`] / [`TurnRole`]: role-tagged conversation turns
//! - [`GenerationConfig`]: sampling parameters (camelCase wire format)
//!
//! Streaming is deliberately absent: every reply in this system is delivered
//! as one WebSocket frame, so the unary endpoint is all that is needed.

#![deny(unsafe_code)]

pub mod client;
pub mod error;
pub mod types;

pub use client::GeminiClient;
pub use error::LlmError;
pub use types::{ChatTurn, GenerationConfig, TurnRole};
