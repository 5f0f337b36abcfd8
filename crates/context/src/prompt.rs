//! Provider-agnostic prompt rendering.
//!
//! The instruction text pins the literal `Summary:` / `Reply <n>:` output
//! format that the response normalizer scans for. The two are a frozen pair:
//! changing the markers here without updating the normalizer (and its golden
//! fixtures) silently breaks reply extraction.

use rp_domain::{Message, Settings, Tone};

use crate::assemble::format_messages_as_text;

/// Persona used when the `custom_context` setting is blank.
const DEFAULT_PERSONA: &str =
    "Act as my therapist suggesting replies to the person I'm texting with.";

/// Fixed behavioral rules appended to every persona.
const BEHAVIORAL_RULES: &str = "Messages labeled \"me\" are mine; messages labeled \"contact\" \
     are from the person I'm replying to. Analyze my messages to mimic my vocabulary and tone \
     when suggesting replies.\n\n\
     Additional context about prior conversation history may be provided. Use it to understand \
     the current situation, but focus your reply on the most recent messages. Do not summarize \
     the context - it is background only. Always match the requested tone.";

/// The rendered, provider-agnostic prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    /// Persona directive plus the fixed behavioral rules.
    pub system_instruction: String,
    /// The conversation as `<sender>: <text>` lines.
    pub conversation_text: String,
    /// The format-pinning request for a summary and three replies.
    pub instruction_text: String,
}

impl Prompt {
    /// Collapse the three parts into one prompt string for providers that
    /// take a single free-text query (Khoj, Anthropic).
    pub fn rendered(&self) -> String {
        format!(
            "{}\n\nHere are some text messages between my contact and me:\n\n{}\n\n{}",
            self.system_instruction, self.conversation_text, self.instruction_text
        )
    }
}

/// Build the prompt from the settings persona, tone, assembled context, and
/// conversation.
///
/// Tone and context are interpolated verbatim (the prompt is consumed by a
/// model, not executed), but control characters are stripped so the JSON
/// transport never breaks.
pub fn build_prompt(
    settings: &Settings,
    tone: &Tone,
    context: &str,
    conversation: &[Message],
) -> Prompt {
    let persona = if settings.custom_context.trim().is_empty() {
        DEFAULT_PERSONA
    } else {
        settings.custom_context.trim()
    };

    let system_instruction =
        strip_control_chars(&format!("{}\n\n{}", persona, BEHAVIORAL_RULES));
    let conversation_text = strip_control_chars(&format_messages_as_text(conversation));
    let instruction_text = strip_control_chars(&instruction_text(tone.as_str(), context));

    Prompt {
        system_instruction,
        conversation_text,
        instruction_text,
    }
}

fn instruction_text(tone: &str, context: &str) -> String {
    let context_block = if context.trim().is_empty() {
        String::new()
    } else {
        format!(
            "Recent conversation context (for reference only):\n{}\n\n",
            context.trim()
        )
    };

    format!(
        "Given the conversation above, provide a brief summary including the emotional tone, \
         main topics, and any changes in mood.\n\
         Suggest 3 {tone} replies that I might send. Provide one short reply, one medium-length \
         reply, and one long reply.\n\n\
         {context_block}\
         Please respond using this format:\n\
         Summary: <summary>\n\
         Suggested replies:\n\
         Reply 1: <short reply>\n\
         Reply 2: <medium reply>\n\
         Reply 3: <long reply>"
    )
}

/// Drop control characters other than newline and tab.
pub fn strip_control_chars(text: &str) -> String {
    text.chars()
        .filter(|c| !c.is_control() || *c == '\n' || *c == '\t')
        .collect()
}
