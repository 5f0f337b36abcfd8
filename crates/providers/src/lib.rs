//! `rp-providers` — AI provider adapters and the suggestion pipeline.
//!
//! Each adapter translates the uniform "generate reply" request into one
//! vendor's wire protocol (OpenAI and Grok tool-calling, Anthropic and Khoj
//! free text) and normalizes the output into a [`rp_domain::ReplyResult`].
//! Adapter failures never escape as errors: every network, HTTP, or parse
//! failure becomes a well-formed sentinel result the UI can display.

pub mod anthropic;
pub mod grok;
pub mod khoj;
pub mod normalize;
pub mod openai;
pub mod pipeline;
pub mod registry;
pub mod traits;
pub(crate) mod util;

// Re-exports for convenience.
pub use pipeline::SuggestionPipeline;
pub use registry::{ProviderInfo, ProviderRegistry};
pub use traits::ReplyProvider;
