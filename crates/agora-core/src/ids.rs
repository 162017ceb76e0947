//! Branded ID newtypes for type safety.
//!
//! Every entity in the system has a distinct ID type implemented as a newtype
//! wrapper around `String`. This prevents accidentally passing a question ID
//! where a session ID is expected.
//!
//! Locally generated IDs (`SessionId`, `MessageId`) are UUID v7 (time-ordered)
//! via [`uuid::Uuid::now_v7`]. Backend-sourced IDs (`ProjectId`, `QuestionId`,
//! `StanceId`, `CommentId`) are opaque strings owned by the deliberation
//! platform and are only ever constructed from received values.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Generate a new UUID v7 string (time-ordered).
fn new_v7() -> String {
    Uuid::now_v7().to_string()
}

macro_rules! branded_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Create a new random ID (UUID v7, time-ordered).
            #[must_use]
            pub fn new() -> Self {
                Self(new_v7())
            }

            /// Return the inner string as a slice.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consume self and return the inner `String`.
            #[must_use]
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_owned())
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

branded_id! {
    /// Unique identifier for a per-connection conversation session.
    SessionId
}

branded_id! {
    /// Unique identifier for a chat message within a session.
    MessageId
}

branded_id! {
    /// Identifier of a deliberation project, taken from the connection path.
    ProjectId
}

branded_id! {
    /// Identifier of a backend-managed question (論点).
    QuestionId
}

branded_id! {
    /// Identifier of a stance a claim can be classified against.
    StanceId
}

branded_id! {
    /// Identifier of a comment created on the backend.
    CommentId
}
