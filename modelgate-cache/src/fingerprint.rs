//! Deterministic request fingerprinting, the sole canonicalization boundary per SPEC_FULL.md §9.

use modelgate_core::{ChatCompletionRequest, Fingerprint, canonical::canonicalize};
use sha2::{Digest, Sha256};

/// SHA-256 over the canonical byte form of `request`. Two requests with identical canonical form
/// always produce the same fingerprint, and canonicalize is idempotent, so this is too.
pub fn fingerprint(request: &ChatCompletionRequest) -> Fingerprint {
    let canonical = canonicalize(request);
    let digest = Sha256::digest(canonical.as_bytes());
    Fingerprint::from_hex(format!("{digest:x}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use modelgate_core::ChatMessage;

    fn req(model: &str, content: &str) -> ChatCompletionRequest {
        ChatCompletionRequest {
            model: model.into(),
            messages: vec![ChatMessage::user(content)],
            temperature: None,
            top_p: None,
            max_tokens: None,
            frequency_penalty: None,
            presence_penalty: None,
        }
    }

    #[test]
    fn identical_requests_fingerprint_identically() {
        let a = fingerprint(&req("gpt-4o-mini", "hello"));
        let b = fingerprint(&req("gpt-4o-mini", "hello"));
        assert_eq!(a, b);
    }

    #[test]
    fn different_content_fingerprints_differently() {
        let a = fingerprint(&req("gpt-4o-mini", "hello"));
        let b = fingerprint(&req("gpt-4o-mini", "goodbye"));
        assert_ne!(a, b);
    }

    proptest::proptest! {
        #[test]
        fn fingerprint_is_deterministic(text in ".*") {
            let r = req("gpt-4o-mini", &text);
            let f1 = fingerprint(&r);
            let f2 = fingerprint(&r);
            prop_assert_eq!(f1, f2);
        }
    }
}
