//! Rule-based prompt complexity classification, per SPEC_FULL.md §4.F step 1.

use modelgate_core::{ChatMessage, Complexity, canonical::flatten_lowercase};

const K_SIMPLE: &[&str] =
    &["classify", "extract", "parse", "format", "yes/no", "true/false", "sentiment"];

const K_COMPLEX: &[&str] =
    &["analyze", "explain step-by-step", "reasoning", "derive", "essay", "creative", "detailed"];

/// Rough token count for the classifier only — not the adapter's per-model-family estimate,
/// just enough to tell "short" from "long" for the simple/complex thresholds.
fn estimate_prompt_tokens(messages: &[ChatMessage]) -> u64 {
    let chars: usize = messages.iter().map(|m| m.content.chars().count()).sum();
    ((chars as f64) / 4.0).ceil() as u64
}

pub fn classify(messages: &[ChatMessage]) -> Complexity {
    let tokens = estimate_prompt_tokens(messages);
    let text = flatten_lowercase(messages);

    if tokens < 100 && K_SIMPLE.iter().any(|kw| text.contains(kw)) {
        return Complexity::Simple;
    }
    if tokens > 500 || K_COMPLEX.iter().any(|kw| text.contains(kw)) {
        return Complexity::Complex;
    }
    Complexity::Medium
}

#[cfg(test)]
mod tests {
    use super::*;

    fn messages(text: &str) -> Vec<ChatMessage> {
        vec![ChatMessage::user(text)]
    }

    #[test]
    fn short_keyword_match_classifies_simple() {
        assert_eq!(classify(&messages("classify this sentence")), Complexity::Simple);
    }

    #[test]
    fn long_text_classifies_complex_regardless_of_keywords() {
        let long_text = "word ".repeat(600);
        assert_eq!(classify(&messages(&long_text)), Complexity::Complex);
    }

    #[test]
    fn complex_keyword_overrides_short_length() {
        assert_eq!(classify(&messages("please analyze this briefly")), Complexity::Complex);
    }

    #[test]
    fn unmatched_mid_length_text_classifies_medium() {
        assert_eq!(classify(&messages("write a short poem about the sea")), Complexity::Medium);
    }

    #[test]
    fn classification_is_stable_across_repeated_calls() {
        let msgs = messages("summarize this article for me please");
        let a = classify(&msgs);
        let b = classify(&msgs);
        assert_eq!(a, b);
    }
}
