use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes256Gcm, Key, Nonce};
use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
use rand::Rng;
use sha2::{Digest, Sha256};
use std::env;

use crate::utils::error::CustomError;

/// Encrypts social OAuth tokens before they are stored on the user
/// document. Output format: base64(nonce || ciphertext).
pub struct TokenCipher {
    cipher: Aes256Gcm,
}

const NONCE_LEN: usize = 12;

impl TokenCipher {
    /// Key material comes from TOKEN_ENCRYPTION_KEY; the raw string is
    /// hashed to a fixed 32-byte key.
    pub fn from_env() -> Result<Self, CustomError> {
        let secret = env::var("TOKEN_ENCRYPTION_KEY").map_err(|_| {
            CustomError::InternalServerError("TOKEN_ENCRYPTION_KEY is required".to_string())
        })?;
        Ok(Self::from_secret(&secret))
    }

    pub fn from_secret(secret: &str) -> Self {
        let digest = Sha256::digest(secret.as_bytes());
        let key = Key::<Aes256Gcm>::from_slice(&digest);
        Self {
            cipher: Aes256Gcm::new(key),
        }
    }

    pub fn encrypt(&self, plaintext: &str) -> Result<String, CustomError> {
        let mut nonce_bytes = [0u8; NONCE_LEN];
        rand::rng().fill(&mut nonce_bytes);
        let nonce = Nonce::from_slice(&nonce_bytes);

        let ciphertext = self
            .cipher
            .encrypt(nonce, plaintext.as_bytes())
            .map_err(|_| CustomError::InternalServerError("Token encryption failed".to_string()))?;

        let mut out = Vec::with_capacity(NONCE_LEN + ciphertext.len());
        out.extend_from_slice(&nonce_bytes);
        out.extend_from_slice(&ciphertext);
        Ok(BASE64.encode(out))
    }

    pub fn decrypt(&self, encoded: &str) -> Result<String, CustomError> {
        let raw = BASE64
            .decode(encoded)
            .map_err(|_| CustomError::BadRequestError("Malformed encrypted token".to_string()))?;
        if raw.len() <= NONCE_LEN {
            return Err(CustomError::BadRequestError(
                "Malformed encrypted token".to_string(),
            ));
        }

        let (nonce_bytes, ciphertext) = raw.split_at(NONCE_LEN);
        let nonce = Nonce::from_slice(nonce_bytes);

        let plaintext = self
            .cipher
            .decrypt(nonce, ciphertext)
            .map_err(|_| CustomError::InternalServerError("Token decryption failed".to_string()))?;

        String::from_utf8(plaintext)
            .map_err(|_| CustomError::InternalServerError("Token decryption failed".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrip() {
        let cipher = TokenCipher::from_secret("unit-test-secret");
        let token = "IGQVJXa-long-access-token-value";
        let encrypted = cipher.encrypt(token).unwrap();
        assert_ne!(encrypted, token);
        assert!(!encrypted.contains(token));
        assert_eq!(cipher.decrypt(&encrypted).unwrap(), token);
    }

    #[test]
    fn distinct_nonces_produce_distinct_ciphertexts() {
        let cipher = TokenCipher::from_secret("unit-test-secret");
        let a = cipher.encrypt("same-token").unwrap();
        let b = cipher.encrypt("same-token").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn wrong_key_fails() {
        let cipher = TokenCipher::from_secret("key-one");
        let other = TokenCipher::from_secret("key-two");
        let encrypted = cipher.encrypt("token").unwrap();
        assert!(other.decrypt(&encrypted).is_err());
    }

    #[test]
    fn malformed_input_fails() {
        let cipher = TokenCipher::from_secret("unit-test-secret");
        assert!(cipher.decrypt("not-base64!!!").is_err());
        assert!(cipher.decrypt("c2hvcnQ=").is_err());
    }
}
