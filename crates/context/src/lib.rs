//! `rp-context` — conversational context assembly for ReplyPilot.
//!
//! Resolves the history lookback window, defines the collaborator traits for
//! the external message store and semantic recall index, merges their output
//! into a single context contribution, and renders the provider-agnostic
//! prompt that every adapter consumes.

pub mod assemble;
pub mod history;
pub mod prompt;
pub mod recall;
pub mod window;

// Re-exports for convenience.
pub use assemble::{assemble_context, format_messages_as_text, merge_history};
pub use history::{relevant_history, HistoryFetcher, NoHistory};
pub use prompt::{build_prompt, Prompt};
pub use recall::{similar_snippets, EmbeddingRecall, NoRecall, SemanticRecall};
pub use window::{resolve_window, LookbackWindow};
