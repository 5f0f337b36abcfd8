//! Context assembly.
//!
//! Merges the history window into the active batch and renders the extra
//! context string handed to the provider adapters. Recent and historical
//! messages are formatted uniformly, so history is merged into the
//! conversation list once, up front — never re-merged at render time.

use rp_domain::{Message, SimilarMessageSnippet};

const SNIPPET_HEADER: &str = "Similar Past Snippets:";

/// Render messages as `<sender>: <text>` lines, preserving order.
pub fn format_messages_as_text(messages: &[Message]) -> String {
    messages
        .iter()
        .map(|m| format!("{}: {}", m.sender, m.text))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Prepend the history window to the active batch, dropping any history item
/// whose exact text also appears among the active messages. A message must
/// never contextualize itself.
pub fn merge_history(history: Vec<Message>, active: &[Message]) -> Vec<Message> {
    let mut merged: Vec<Message> = history
        .into_iter()
        .filter(|h| !active.iter().any(|a| a.text == h.text))
        .collect();
    merged.extend_from_slice(active);
    merged
}

/// Concatenate the non-empty context pieces: extra context first, then the
/// semantic recall snippets under a literal header. Empty pieces are omitted
/// entirely — the result never carries stray separators.
pub fn assemble_context(extra_context: &str, snippets: &[SimilarMessageSnippet]) -> String {
    let mut pieces: Vec<String> = Vec::new();

    let extra = extra_context.trim();
    if !extra.is_empty() {
        pieces.push(extra.to_string());
    }

    if !snippets.is_empty() {
        let lines: Vec<String> = snippets
            .iter()
            .map(|s| format!("- {} ({}): {}", s.sender, s.ts, s.text))
            .collect();
        pieces.push(format!("{}\n{}", SNIPPET_HEADER, lines.join("\n")));
    }

    pieces.join("\n\n")
}
