//! AES-256-GCM encryption at rest for provider API keys.
//!
//! Per SPEC_FULL.md §11/§9: key material is loaded once at process start from
//! `PROVIDER_SECRET_KEY` (base64, 32 bytes) — no per-record key derivation, unlike the
//! passphrase+Argon2id scheme this is grounded on (`caelator-openclaw/keyvault-package`'s
//! `vault::encrypt`/`decrypt`). Plaintext is only materialized inside an adapter call.

use aes_gcm::{
    Aes256Gcm, Nonce,
    aead::{Aead, KeyInit, OsRng, rand_core::RngCore},
};
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use modelgate_core::GatewayError;

const NONCE_LEN: usize = 12;

#[derive(Clone)]
pub struct ProviderKeyCipher {
    cipher: Aes256Gcm,
}

impl ProviderKeyCipher {
    /// `key_b64` must decode to exactly 32 bytes.
    pub fn from_base64(key_b64: &str) -> Result<Self, GatewayError> {
        let key_bytes = BASE64
            .decode(key_b64.trim())
            .map_err(|e| GatewayError::Crypto(format!("invalid PROVIDER_SECRET_KEY base64: {e}")))?;
        if key_bytes.len() != 32 {
            return Err(GatewayError::Crypto(format!(
                "PROVIDER_SECRET_KEY must decode to 32 bytes, got {}",
                key_bytes.len()
            )));
        }
        let cipher = Aes256Gcm::new_from_slice(&key_bytes)
            .map_err(|e| GatewayError::Crypto(format!("invalid key material: {e}")))?;
        Ok(Self { cipher })
    }

    /// Returns base64(nonce || ciphertext), safe to persist in `provider_configs.api_key_encrypted`.
    pub fn encrypt(&self, plaintext: &str) -> Result<String, GatewayError> {
        let mut nonce_bytes = [0u8; NONCE_LEN];
        OsRng.fill_bytes(&mut nonce_bytes);
        let nonce = Nonce::from_slice(&nonce_bytes);
        let ciphertext = self
            .cipher
            .encrypt(nonce, plaintext.as_bytes())
            .map_err(|e| GatewayError::Crypto(format!("encryption failed: {e}")))?;
        let mut out = Vec::with_capacity(NONCE_LEN + ciphertext.len());
        out.extend_from_slice(&nonce_bytes);
        out.extend_from_slice(&ciphertext);
        Ok(BASE64.encode(out))
    }

    pub fn decrypt(&self, stored: &str) -> Result<String, GatewayError> {
        let raw = BASE64
            .decode(stored)
            .map_err(|e| GatewayError::Crypto(format!("invalid ciphertext base64: {e}")))?;
        if raw.len() < NONCE_LEN {
            return Err(GatewayError::Crypto("ciphertext too short".to_string()));
        }
        let (nonce_bytes, ciphertext) = raw.split_at(NONCE_LEN);
        let nonce = Nonce::from_slice(nonce_bytes);
        let plaintext = self
            .cipher
            .decrypt(nonce, ciphertext)
            .map_err(|_| GatewayError::Crypto("decryption failed".to_string()))?;
        String::from_utf8(plaintext).map_err(|e| GatewayError::Crypto(format!("non-utf8 plaintext: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::Engine;

    fn test_cipher() -> ProviderKeyCipher {
        let key = [7u8; 32];
        ProviderKeyCipher::from_base64(&base64::engine::general_purpose::STANDARD.encode(key)).unwrap()
    }

    #[test]
    fn round_trips() {
        let cipher = test_cipher();
        let ct = cipher.encrypt("sk-live-abc123").unwrap();
        assert_ne!(ct, "sk-live-abc123");
        assert_eq!(cipher.decrypt(&ct).unwrap(), "sk-live-abc123");
    }

    #[test]
    fn rejects_wrong_length_key() {
        let short = base64::engine::general_purpose::STANDARD.encode([1u8; 16]);
        assert!(ProviderKeyCipher::from_base64(&short).is_err());
    }

    #[test]
    fn tampered_ciphertext_fails_to_decrypt() {
        let cipher = test_cipher();
        let mut ct = cipher.encrypt("secret").unwrap();
        ct.push('x');
        assert!(cipher.decrypt(&ct).is_err());
    }
}
