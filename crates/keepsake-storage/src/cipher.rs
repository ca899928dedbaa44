use std::fmt;

use aes_gcm::{
    aead::{Aead, KeyInit},
    Aes256Gcm, Nonce,
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use keepsake_core::StoreError;
use sha2::{Digest, Sha256};
use thiserror::Error;

/// Length of the synthetic nonce stored in front of the ciphertext.
pub const NONCE_LEN: usize = 12;
const TAG_LEN: usize = 16;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CipherError {
    #[error("cipher init failed: {0}")]
    Init(String),
    #[error("encrypt failed: {0}")]
    Encrypt(String),
    #[error("ciphertext decode failed: {0}")]
    Decode(String),
    #[error("ciphertext too short: {len} bytes")]
    Truncated { len: usize },
    #[error("authentication failed (wrong secret or corrupted data)")]
    Authentication,
    #[error("plaintext is not utf-8: {0}")]
    Utf8(String),
}

impl From<CipherError> for StoreError {
    fn from(err: CipherError) -> Self {
        match err {
            CipherError::Init(_) | CipherError::Encrypt(_) => StoreError::Encryption {
                reason: err.to_string(),
            },
            _ => StoreError::Decryption {
                reason: err.to_string(),
            },
        }
    }
}

/// Deterministic symmetric cipher for serialized payload text.
///
/// The key is SHA-256 of the secret. The nonce is derived from the key and the
/// plaintext, so identical input always yields identical output and nothing
/// but the base64 blob (`nonce || ciphertext || tag`) has to be stored.
/// Equal payloads are therefore recognisable on disk.
#[derive(Clone)]
pub struct Cipher {
    key: [u8; 32],
}

impl Cipher {
    pub fn new(secret: &str) -> Self {
        let digest = Sha256::digest(secret.as_bytes());
        let mut key = [0u8; 32];
        key.copy_from_slice(&digest);
        Self { key }
    }

    pub fn encrypt(&self, plaintext: &str) -> Result<String, CipherError> {
        let cipher = self.build()?;
        let nonce_bytes = self.synthetic_nonce(plaintext.as_bytes());
        let sealed = cipher
            .encrypt(Nonce::from_slice(&nonce_bytes), plaintext.as_bytes())
            .map_err(|e| CipherError::Encrypt(e.to_string()))?;

        let mut blob = Vec::with_capacity(NONCE_LEN + sealed.len());
        blob.extend_from_slice(&nonce_bytes);
        blob.extend_from_slice(&sealed);
        Ok(STANDARD.encode(blob))
    }

    pub fn decrypt(&self, ciphertext: &str) -> Result<String, CipherError> {
        let blob = STANDARD
            .decode(ciphertext.trim())
            .map_err(|e| CipherError::Decode(e.to_string()))?;
        if blob.len() < NONCE_LEN + TAG_LEN {
            return Err(CipherError::Truncated { len: blob.len() });
        }

        let (nonce, sealed) = blob.split_at(NONCE_LEN);
        let plaintext = self
            .build()?
            .decrypt(Nonce::from_slice(nonce), sealed)
            .map_err(|_| CipherError::Authentication)?;
        String::from_utf8(plaintext).map_err(|e| CipherError::Utf8(e.to_string()))
    }

    fn build(&self) -> Result<Aes256Gcm, CipherError> {
        Aes256Gcm::new_from_slice(&self.key).map_err(|e| CipherError::Init(e.to_string()))
    }

    fn synthetic_nonce(&self, plaintext: &[u8]) -> [u8; NONCE_LEN] {
        let digest = Sha256::new()
            .chain_update(self.key)
            .chain_update(plaintext)
            .finalize();
        let mut nonce = [0u8; NONCE_LEN];
        nonce.copy_from_slice(&digest[..NONCE_LEN]);
        nonce
    }
}

impl fmt::Debug for Cipher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cipher").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAYLOAD: &str = r#"{"highscore":100,"last_score":20}"#;

    #[test]
    fn round_trip_restores_plaintext() {
        let cipher = Cipher::new("YOUR_SALT");
        let sealed = cipher.encrypt(PAYLOAD).expect("encrypt");
        assert!(!sealed.contains("highscore"), "plaintext must not leak");
        assert_eq!(cipher.decrypt(&sealed).expect("decrypt"), PAYLOAD);
    }

    #[test]
    fn encryption_is_deterministic() {
        let first = Cipher::new("salt").encrypt(PAYLOAD).expect("encrypt");
        let second = Cipher::new("salt").encrypt(PAYLOAD).expect("encrypt");
        assert_eq!(first, second);

        let other = Cipher::new("pepper").encrypt(PAYLOAD).expect("encrypt");
        assert_ne!(first, other);
    }

    #[test]
    fn wrong_secret_fails_authentication() {
        let sealed = Cipher::new("salt").encrypt(PAYLOAD).expect("encrypt");
        let err = Cipher::new("pepper")
            .decrypt(&sealed)
            .expect_err("wrong secret must fail");
        assert_eq!(err, CipherError::Authentication);
        assert!(matches!(StoreError::from(err), StoreError::Decryption { .. }));
    }

    #[test]
    fn tampered_or_short_input_is_rejected() {
        let cipher = Cipher::new("salt");
        let sealed = cipher.encrypt(PAYLOAD).expect("encrypt");

        let mut blob = STANDARD.decode(&sealed).expect("base64");
        let last = blob.len() - 1;
        blob[last] ^= 0x01;
        assert_eq!(
            cipher.decrypt(&STANDARD.encode(&blob)),
            Err(CipherError::Authentication)
        );

        assert!(matches!(
            cipher.decrypt(&STANDARD.encode([0u8; 8])),
            Err(CipherError::Truncated { len: 8 })
        ));
        assert!(matches!(
            cipher.decrypt("not base64!"),
            Err(CipherError::Decode(_))
        ));
    }

    #[test]
    fn debug_hides_key_bytes() {
        let printed = format!("{:?}", Cipher::new("salt"));
        assert_eq!(printed, "Cipher { .. }");
    }
}
