//! Splits generated review text into a summary and a suggestions section
//!
//! The generator is asked to end its review with a `Suggestions:` section, but
//! models are not consistent about casing or plurality, so the marker is
//! matched case-insensitively as `suggestion` with an optional `s` followed by a
//! colon. Text before the first marker is the summary. Everything after it is
//! the suggestions body; later markers are kept by re-joining the pieces with
//! the canonical `Suggestions:` label.

use std::sync::LazyLock;

use regex::Regex;

/// Label used when re-joining suggestion pieces split on a repeated marker
pub const SUGGESTIONS_LABEL: &str = "Suggestions:";

static MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)suggestions?:").expect("marker pattern is valid"));

/// Summary and suggestions extracted from a generated review
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedReview {
    pub summary: String,
    pub suggestions: String,
}

/// Split `raw` on the suggestions marker
pub fn parse_review(raw: &str) -> ParsedReview {
    let mut pieces = MARKER.split(raw);
    let head = pieces.next().unwrap_or_default();
    let rest: Vec<&str> = pieces.collect();

    if rest.is_empty() {
        return ParsedReview {
            summary: raw.trim().to_string(),
            suggestions: String::new(),
        };
    }

    ParsedReview {
        summary: head.trim().to_string(),
        suggestions: rest.join(SUGGESTIONS_LABEL).trim().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_marker_is_all_summary() {
        let parsed = parse_review("  The code is clean and idiomatic.\n");
        assert_eq!(parsed.summary, "The code is clean and idiomatic.");
        assert_eq!(parsed.suggestions, "");
    }

    #[test]
    fn test_single_marker() {
        let parsed = parse_review("Looks fine overall.\nSuggestions: rename x to y");
        assert_eq!(parsed.summary, "Looks fine overall.");
        assert_eq!(parsed.suggestions, "rename x to y");
    }

    #[test]
    fn test_marker_is_case_insensitive_and_singular() {
        let parsed = parse_review("Summary here\nSUGGESTION: add tests");
        assert_eq!(parsed.summary, "Summary here");
        assert_eq!(parsed.suggestions, "add tests");

        let parsed = parse_review("Summary here\nsuggestions:\n- a\n- b\n");
        assert_eq!(parsed.suggestions, "- a\n- b");
    }

    #[test]
    fn test_repeated_marker_keeps_all_text() {
        let raw = "Overall ok.\nSuggestions:\n1. Handle errors.\nSuggestion: prefer iterators.\n";
        let parsed = parse_review(raw);
        assert_eq!(parsed.summary, "Overall ok.");
        assert_eq!(
            parsed.suggestions,
            "1. Handle errors.\nSuggestions: prefer iterators."
        );
    }

    #[test]
    fn test_repeated_marker_loses_only_markers() {
        let raw = "A suggestions: B Suggestion: C SUGGESTIONS: D";
        let parsed = parse_review(raw);
        let original: String = MARKER
            .split(raw)
            .collect::<String>()
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect();
        let rebuilt: String = format!("{}{}", parsed.summary, parsed.suggestions)
            .replace(SUGGESTIONS_LABEL, "")
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect();
        assert_eq!(original, rebuilt);
    }

    #[test]
    fn test_leading_marker_gives_empty_summary() {
        let parsed = parse_review("Suggestions: everything");
        assert_eq!(parsed.summary, "");
        assert_eq!(parsed.suggestions, "everything");
    }

    #[test]
    fn test_marker_requires_colon() {
        let parsed = parse_review("I have no suggestions for this file.");
        assert_eq!(parsed.summary, "I have no suggestions for this file.");
        assert!(parsed.suggestions.is_empty());
    }
}
