//! Response normalization for free-text provider output.
//!
//! This is the primary integration point with model output and its exact
//! behavior is a frozen contract shared with the prompt builder: the
//! `Summary:` / `Suggested replies:` / `Reply <n>:` markers, the stop
//! boundaries, and the cleaning quirks (notably the asymmetric leading-only
//! asterisk strip) are all pinned by golden fixtures below. Do not "improve"
//! the parsing — it silently changes user-visible behavior.

use regex::Regex;
use std::sync::LazyLock;

const SUMMARY_MARKER: &str = "Summary:";
const REPLIES_HEADER: &str = "Suggested replies:";

/// Matches both accepted reply-marker forms: `Reply <n>:` and
/// `**Reply <n>:**`, case-insensitive on "Reply".
static REPLY_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\*{0,2}reply \d+:\*{0,2}").unwrap());

/// Extract the summary section from raw model output.
///
/// Captures everything after the case-sensitive `Summary:` marker up to the
/// earliest following `Suggested replies:` header or `Reply <n>:` marker
/// (end of string if neither follows), trims it, and strips one trailing
/// `###` artifact some providers emit.
///
/// When no `Summary:` marker exists the raw text is returned unchanged —
/// partially-conforming output is never silently discarded, and re-running
/// on already-normalized text is a no-op.
pub fn parse_summary(raw: &str) -> String {
    let Some(idx) = raw.find(SUMMARY_MARKER) else {
        return raw.to_string();
    };
    let after = &raw[idx + SUMMARY_MARKER.len()..];

    let header_stop = after.find(REPLIES_HEADER);
    let reply_stop = REPLY_MARKER.find(after).map(|m| m.start());
    let end = match (header_stop, reply_stop) {
        (Some(a), Some(b)) => a.min(b),
        (Some(a), None) => a,
        (None, Some(b)) => b,
        (None, None) => after.len(),
    };

    let summary = after[..end].trim();
    match summary.strip_suffix("###") {
        Some(stripped) => stripped.trim_end().to_string(),
        None => summary.to_string(),
    }
}

/// Extract individual replies from raw model output.
///
/// Scans for every reply marker and emits the cleaned bodies in encounter
/// order — the numbering in the model's own output is informational only and
/// is never used to resort or correct. Bodies that clean down to nothing are
/// dropped. Marker-free input yields an empty vector.
pub fn parse_replies(raw: &str) -> Vec<String> {
    let markers: Vec<_> = REPLY_MARKER.find_iter(raw).collect();

    markers
        .iter()
        .enumerate()
        .filter_map(|(i, m)| {
            let end = markers.get(i + 1).map_or(raw.len(), |next| next.start());
            let cleaned = clean_reply(&raw[m.end()..end]);
            if cleaned.is_empty() {
                None
            } else {
                Some(cleaned)
            }
        })
        .collect()
}

/// Clean one captured reply body.
///
/// Order matters: trim, strip the leading asterisk/space run, strip one
/// matched pair of surrounding double-quotes, trim again. Only a leading
/// asterisk run is stripped — a trailing `*` inside unquoted text survives,
/// which is a long-standing quirk callers depend on.
fn clean_reply(body: &str) -> String {
    let trimmed = body.trim();
    let no_stars = trimmed.trim_start_matches(['*', ' ']);
    let unquoted = if no_stars.len() >= 2 && no_stars.starts_with('"') && no_stars.ends_with('"') {
        &no_stars[1..no_stars.len() - 1]
    } else {
        no_stars
    };
    unquoted.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── Summary extraction ─────────────────────────────────────────

    #[test]
    fn extracts_summary_before_reply_marker() {
        let raw = "Summary: This is a summary of the conversation.\n\n\
                   Reply 1: First reply\nReply 2: Second reply";
        assert_eq!(parse_summary(raw), "This is a summary of the conversation.");
    }

    #[test]
    fn extracts_summary_before_suggested_replies_header() {
        let raw = "Summary: Planning a trip.\n\nSuggested replies:\nReply 1: Sounds good";
        assert_eq!(parse_summary(raw), "Planning a trip.");
    }

    #[test]
    fn stops_at_whichever_marker_comes_first() {
        let raw = "Summary: Short.\nReply 1: A\nSuggested replies:\nReply 2: B";
        assert_eq!(parse_summary(raw), "Short.");
    }

    #[test]
    fn handles_multiline_summaries() {
        let raw = "Summary:\nThis is a summary.\nIt spans multiple lines.\n\
                   It has details about the conversation.\n\nReply 1: First reply";
        assert_eq!(
            parse_summary(raw),
            "This is a summary.\nIt spans multiple lines.\nIt has details about the conversation."
        );
    }

    #[test]
    fn no_marker_returns_raw_text_unchanged() {
        let raw = "This doesn't have a summary prefix but is still valid text.\n\nok";
        assert_eq!(parse_summary(raw), raw);
    }

    #[test]
    fn empty_input_stays_empty() {
        assert_eq!(parse_summary(""), "");
    }

    #[test]
    fn strips_trailing_hash_artifact() {
        let raw = "Summary: A calm exchange. ###\nReply 1: ok";
        assert_eq!(parse_summary(raw), "A calm exchange.");
    }

    #[test]
    fn reparsing_normalized_output_is_a_no_op() {
        let once = parse_summary("Summary: Clean text.\nReply 1: hi");
        assert_eq!(parse_summary(&once), once);
    }

    // ── Reply extraction ───────────────────────────────────────────

    #[test]
    fn parses_replies_with_and_without_formatting() {
        let raw = "**Reply 1:** \"First reply\"\nReply 2: Second reply\nReply 3: *Third reply*";
        let replies = parse_replies(raw);
        // Only the leading asterisk run is stripped; the trailing `*` in the
        // third reply survives.
        assert_eq!(replies, vec!["First reply", "Second reply", "Third reply*"]);
    }

    #[test]
    fn reply_matching_is_case_insensitive() {
        let raw = "reply 1: lower\nREPLY 2: upper";
        assert_eq!(parse_replies(raw), vec!["lower", "upper"]);
    }

    #[test]
    fn replies_keep_encounter_order_not_numbering() {
        let raw = "Reply 3: first seen\nReply 1: second seen";
        assert_eq!(parse_replies(raw), vec!["first seen", "second seen"]);
    }

    #[test]
    fn empty_bodies_are_dropped() {
        let raw = "Reply 1:\nReply 2: kept";
        assert_eq!(parse_replies(raw), vec!["kept"]);
    }

    #[test]
    fn marker_free_input_yields_no_replies() {
        assert!(parse_replies("just some prose with no markers").is_empty());
        assert!(parse_replies("").is_empty());
    }

    #[test]
    fn unmatched_quote_is_preserved() {
        let raw = "Reply 1: \"half quoted";
        assert_eq!(parse_replies(raw), vec!["\"half quoted"]);
    }

    // ── Round-trip of the canonical prompt format ──────────────────

    #[test]
    fn canonical_format_round_trips() {
        let raw = "Summary: X\n\nReply 1: A\nReply 2: B\nReply 3: C";
        assert_eq!(parse_summary(raw), "X");
        assert_eq!(parse_replies(raw), vec!["A", "B", "C"]);
    }

    #[test]
    fn zero_replies_is_distinguishable_from_error() {
        // Well-formed summary, no reply markers: callers that need at least
        // one reply must check the vector, not summary emptiness.
        let raw = "Summary: All quiet.";
        assert_eq!(parse_summary(raw), "All quiet.");
        assert!(parse_replies(raw).is_empty());
    }
}
