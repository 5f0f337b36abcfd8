//! `rp-domain` — shared types for the ReplyPilot pipeline.
//!
//! Holds the conversation data model ([`Message`], [`Sender`],
//! [`ReplyResult`], [`SimilarMessageSnippet`]), the immutable [`Settings`]
//! configuration snapshot, and the shared [`Error`]/[`Result`] types used
//! across all crates.

pub mod error;
pub mod message;
pub mod settings;

// Re-exports for convenience.
pub use error::{Error, Result};
pub use message::{Message, MessageRow, ReplyResult, Sender, SimilarMessageSnippet, Tone};
pub use settings::Settings;
