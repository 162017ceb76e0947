//! # agora-core
//!
//! Foundation types for the Agora deliberation-chat server.
//!
//! This crate provides the shared vocabulary the other Agora crates depend on:
//!
//! - **Branded IDs**: `SessionId`, `MessageId`, `ProjectId`, `QuestionId`,
//!   `StanceId`, `CommentId` as newtypes for type safety
//! - **Chat types**: `Sender`, `ChatMessage`, `Session` with append-only history
//! - **Analysis types**: `Question`, `Stance`, `ClaimAnalysis`,
//!   `RelatedQuestion`, `StanceContext`

#![deny(unsafe_code)]

pub mod analysis;
pub mod ids;
pub mod messages;

pub use analysis::{ClaimAnalysis, Question, RelatedQuestion, Stance, StanceContext};
pub use ids::{CommentId, MessageId, ProjectId, QuestionId, SessionId, StanceId};
pub use messages::{ChatMessage, Sender, Session, PROMPT_HISTORY_LIMIT};
