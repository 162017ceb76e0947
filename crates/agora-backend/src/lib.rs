//! # agora-backend
//!
//! REST client for the deliberation-platform backend.
//!
//! Three endpoints, all authenticated by a static `x-api-key` header:
//!
//! - `GET /projects/{id}` — project questions
//! - `POST /projects/{id}/comments` — submit a claim; returns per-question
//!   stance classifications
//! - `GET /projects/{id}/questions/{qid}/stance-analysis` — opaque report
//!
//! Every call is attempted exactly once; callers decide how failures degrade.

#![deny(unsafe_code)]

pub mod client;
pub mod error;
pub mod types;

pub use client::BackendClient;
pub use error::BackendError;
pub use types::{AnalyzedQuestion, CommentResponse, StanceClassification};
