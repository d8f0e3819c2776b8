//! Pure text-to-intent classification.

/// Tokens that count as a greeting, compared case-insensitively.
pub const GREETING_TOKENS: [&str; 4] = ["hi", "hello", "/start", "start"];

/// What an inbound text message is asking for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    Greeting,
    DailyBrief,
    /// Summarize the given URL. The argument keeps its original case;
    /// URLs must not be lower-cased.
    Summarize(String),
    /// Free-form chat with the trimmed original text as the prompt.
    FreeChat(String),
}

/// Classify one message body. Matching happens on a trimmed, lower-cased
/// copy; arguments are taken from the original-case text.
///
/// Returns `None` for whitespace-only text, which produces no reply.
#[must_use]
pub fn classify(text: &str) -> Option<Intent> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    let lower = text.to_lowercase();

    if GREETING_TOKENS.contains(&lower.as_str()) {
        return Some(Intent::Greeting);
    }
    if lower == "brief" {
        return Some(Intent::DailyBrief);
    }
    if lower.starts_with("summarize ")
        && let Some((_, rest)) = text.split_once(' ')
    {
        return Some(Intent::Summarize(rest.trim().to_string()));
    }
    Some(Intent::FreeChat(text.to_string()))
}
