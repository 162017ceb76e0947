//! # agora-server
//!
//! Axum HTTP + `WebSocket` server and the conversation-orchestration pipeline.
//!
//! - Connection routing: `/project/{project_id}/chat` upgrade, one session
//!   per connection
//! - Session registry with explicit eviction on close
//! - Two-stage message analysis (claim extraction → stance classification)
//! - Stance-context resolution and prompt assembly
//! - Reply generation with graceful degradation on partial failure
//! - Graceful shutdown via `tokio::signal` + `CancellationToken`

#![deny(unsafe_code)]

pub mod analyzer;
pub mod composer;
pub mod config;
pub mod connection;
pub mod frames;
pub mod health;
pub mod orchestrator;
pub mod resolver;
pub mod server;
pub mod shutdown;
pub mod store;
