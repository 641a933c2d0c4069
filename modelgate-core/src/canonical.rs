//! Deterministic canonicalization of a [`ChatCompletionRequest`] for fingerprinting.
//!
//! `modelgate-cache` hashes the output of [`canonicalize`]; keeping the canonicalization rules in
//! `modelgate-core` means both the cache and any future diagnostic tooling hash the exact same
//! bytes.

use crate::types::{ChatCompletionRequest, ChatMessage, Role};
use unicode_normalization::UnicodeNormalization;

/// Fixed precision used when rendering floating point sampling parameters. Two requests that
/// differ only beyond this precision are considered identical for caching purposes.
const FLOAT_PRECISION: usize = 4;

/// Render a request into the exact byte sequence that gets SHA-256 hashed into a fingerprint.
///
/// Field order is fixed; unset optional fields are omitted entirely rather than defaulted, so a
/// request that never specified `temperature` never collides with one that explicitly passed the
/// provider's own default value.
pub fn canonicalize(req: &ChatCompletionRequest) -> String {
    let mut out = String::new();
    out.push_str("model=");
    out.push_str(&req.model);
    out.push('\n');

    for (i, msg) in req.messages.iter().enumerate() {
        out.push_str("msg[");
        out.push_str(&i.to_string());
        out.push_str("].role=");
        out.push_str(role_str(msg.role));
        out.push('\n');
        out.push_str("msg[");
        out.push_str(&i.to_string());
        out.push_str("].content=");
        out.push_str(&normalize_text(&msg.content));
        out.push('\n');
    }

    push_float_field(&mut out, "temperature", req.temperature);
    push_float_field(&mut out, "top_p", req.top_p);
    if let Some(v) = req.max_tokens {
        out.push_str("max_tokens=");
        out.push_str(&v.to_string());
        out.push('\n');
    }
    push_float_field(&mut out, "frequency_penalty", req.frequency_penalty);
    push_float_field(&mut out, "presence_penalty", req.presence_penalty);

    out
}

fn role_str(role: Role) -> &'static str {
    match role {
        Role::System => "system",
        Role::User => "user",
        Role::Assistant => "assistant",
    }
}

fn normalize_text(text: &str) -> String {
    text.nfc().collect::<String>()
}

fn push_float_field(out: &mut String, name: &str, value: Option<f32>) {
    if let Some(v) = value {
        out.push_str(name);
        out.push('=');
        out.push_str(&format!("{:.*}", FLOAT_PRECISION, v));
        out.push('\n');
    }
}

/// Concatenated, lower-cased message text — the input the router's complexity classifier scans.
pub fn flatten_lowercase(messages: &[ChatMessage]) -> String {
    messages.iter().map(|m| m.content.to_lowercase()).collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ChatMessage;

    fn req(temp: Option<f32>) -> ChatCompletionRequest {
        ChatCompletionRequest {
            model: "gpt-4o-mini".into(),
            messages: vec![ChatMessage::user("hello")],
            temperature: temp,
            top_p: None,
            max_tokens: None,
            frequency_penalty: None,
            presence_penalty: None,
        }
    }

    #[test]
    fn canonicalize_is_idempotent_in_content() {
        let a = canonicalize(&req(Some(0.7)));
        let b = canonicalize(&req(Some(0.7)));
        assert_eq!(a, b);
    }

    #[test]
    fn absent_optional_field_differs_from_explicit_default() {
        let without_temp = canonicalize(&req(None));
        let with_zero_temp = canonicalize(&req(Some(0.0)));
        assert_ne!(without_temp, with_zero_temp);
    }

    #[test]
    fn float_precision_beyond_fourth_decimal_collapses() {
        let a = canonicalize(&req(Some(0.700_001)));
        let b = canonicalize(&req(Some(0.700_002)));
        assert_eq!(a, b);
    }

    proptest::proptest! {
        #[test]
        fn canonicalize_never_panics(text in ".*", temp in proptest::option::of(-2.0f32..2.0f32)) {
            let r = ChatCompletionRequest {
                model: "m".into(),
                messages: vec![ChatMessage::user(text)],
                temperature: temp,
                top_p: None,
                max_tokens: None,
                frequency_penalty: None,
                presence_penalty: None,
            };
            let _ = canonicalize(&r);
        }
    }
}
