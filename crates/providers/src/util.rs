//! Shared helpers for provider adapters.

use rp_domain::{Error, ReplyResult, Result};
use serde_json::Value;

/// Convert a [`reqwest::Error`] into the domain [`Error`] type.
///
/// Timeout errors map to [`Error::Timeout`]; everything else maps to
/// [`Error::Http`].
pub(crate) fn from_reqwest(e: reqwest::Error) -> Error {
    if e.is_timeout() {
        Error::Timeout(e.to_string())
    } else {
        Error::Http(e.to_string())
    }
}

/// The `draft_replies` function-calling tool schema shared by the OpenAI and
/// Grok adapters: the model must return `{summary, replies[]}` directly, so
/// no text-pattern extraction is needed on success.
pub(crate) fn draft_replies_tool() -> Value {
    serde_json::json!({
        "type": "function",
        "function": {
            "name": "draft_replies",
            "description": "Generate a short summary and three suggested replies",
            "parameters": {
                "type": "object",
                "properties": {
                    "summary": { "type": "string" },
                    "replies": { "type": "array", "items": { "type": "string" } },
                },
                "required": ["summary", "replies"],
            },
        },
    })
}

/// Force the model to call `draft_replies`.
pub(crate) fn draft_replies_tool_choice() -> Value {
    serde_json::json!({
        "type": "function",
        "function": { "name": "draft_replies" },
    })
}

/// Extract the normalized result from a tool-calling chat completion.
///
/// Reads `choices[0].message.tool_calls[0].function.arguments` (a JSON
/// string), parses it, and requires a string `summary` plus an array
/// `replies`. Anything else is a provider parse error — the adapter maps it
/// to its sentinel.
pub(crate) fn parse_tool_reply(provider: &str, body: &Value) -> Result<ReplyResult> {
    let arguments = body
        .get("choices")
        .and_then(|c| c.get(0))
        .and_then(|choice| choice.get("message"))
        .and_then(|m| m.get("tool_calls"))
        .and_then(|t| t.get(0))
        .and_then(|call| call.get("function"))
        .and_then(|f| f.get("arguments"))
        .and_then(|a| a.as_str())
        .ok_or_else(|| Error::ProviderParse {
            provider: provider.to_string(),
            message: "no tool call in response".into(),
        })?;

    let parsed: Value = serde_json::from_str(arguments).map_err(|e| Error::ProviderParse {
        provider: provider.to_string(),
        message: format!("tool arguments are not valid JSON: {e}"),
    })?;

    let summary = parsed
        .get("summary")
        .and_then(|s| s.as_str())
        .ok_or_else(|| Error::ProviderParse {
            provider: provider.to_string(),
            message: "tool arguments missing string 'summary'".into(),
        })?;
    let replies = parsed
        .get("replies")
        .and_then(|r| r.as_array())
        .ok_or_else(|| Error::ProviderParse {
            provider: provider.to_string(),
            message: "tool arguments missing array 'replies'".into(),
        })?
        .iter()
        .filter_map(|v| v.as_str().map(String::from))
        .collect();

    Ok(ReplyResult::new(summary, replies))
}


#[cfg(test)]
mod tests {
    use super::*;

    fn tool_response(arguments: &str) -> Value {
        serde_json::json!({
            "choices": [{
                "message": {
                    "tool_calls": [{
                        "function": {
                            "name": "draft_replies",
                            "arguments": arguments,
                        }
                    }]
                }
            }]
        })
    }

    #[test]
    fn parses_valid_tool_arguments() {
        let body = tool_response(r#"{"summary":"sum","replies":["r1","r2","r3"]}"#);
        let result = parse_tool_reply("openai", &body).unwrap();
        assert_eq!(result.summary, "sum");
        assert_eq!(result.replies, vec!["r1", "r2", "r3"]);
    }

    #[test]
    fn missing_tool_call_is_a_parse_error() {
        let body = serde_json::json!({
            "choices": [{ "message": { "content": "plain text instead" } }]
        });
        let err = parse_tool_reply("openai", &body).unwrap_err();
        assert!(err.to_string().contains("no tool call"));
    }

    #[test]
    fn invalid_argument_json_is_a_parse_error() {
        let body = tool_response("{not json");
        let err = parse_tool_reply("grok", &body).unwrap_err();
        assert!(err.to_string().contains("not valid JSON"));
    }

    #[test]
    fn missing_summary_or_replies_is_a_parse_error() {
        let body = tool_response(r#"{"summary":"only"}"#);
        assert!(parse_tool_reply("openai", &body).is_err());

        let body = tool_response(r#"{"replies":["only"]}"#);
        assert!(parse_tool_reply("openai", &body).is_err());
    }

    #[test]
    fn non_string_reply_entries_are_skipped() {
        let body = tool_response(r#"{"summary":"s","replies":["ok", 42, "also ok"]}"#);
        let result = parse_tool_reply("openai", &body).unwrap();
        assert_eq!(result.replies, vec!["ok", "also ok"]);
    }
}
