//! Prompts sent with every review request

/// Instructions given to the model as the system message.
///
/// The answer layout matters: everything before the `Suggestions:` line is
/// stored as the summary, everything after as the suggestions.
pub const SYSTEM_PROMPT: &str = "You are a senior software engineer reviewing a single source file. \
Start with a short summary of what the code does and its overall quality. \
Then write a line that starts with \"Suggestions:\" followed by concrete, \
actionable improvements (bugs, readability, performance, security), one per line. \
If you have no suggestions, write \"Suggestions: none\".";

/// Largest amount of source text forwarded to the model, in bytes
pub const MAX_SOURCE_BYTES: usize = 48 * 1024;

/// Build the user message carrying the code under review
pub fn user_prompt(source: &str) -> String {
    let (source, truncated) = truncate(source, MAX_SOURCE_BYTES);

    let mut prompt = String::new();
    prompt.push_str("Review the following code:\n\n");
    prompt.push_str("```\n");
    prompt.push_str(source);
    if !source.ends_with('\n') {
        prompt.push('\n');
    }
    prompt.push_str("```\n");

    if truncated {
        prompt.push_str("\nThe file was cut off; review only the part shown.\n");
    }

    prompt
}

/// Cut `text` to at most `max` bytes on a character boundary
fn truncate(text: &str, max: usize) -> (&str, bool) {
    if text.len() <= max {
        return (text, false);
    }

    let mut end = max;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    (&text[..end], true)
}
