//! Encrypted configuration store.
//!
//! Seals a [`Configuration`] with ChaCha20-Poly1305 under a detached 256-bit
//! key.  The key and the resulting blob are written to two separate files so
//! that shipping one never leaks the other.
//!
//! # Blob format
//!
//! ```text
//! ┌──────────────┬──────────────────────────────────────────┐
//! │ nonce (12 B) │ ciphertext of canonical JSON ‖ tag (16 B) │
//! └──────────────┴──────────────────────────────────────────┘
//! ```
//!
//! A fresh random nonce is drawn for every [`encrypt`] call, so encrypting
//! the same configuration twice yields two different blobs.  Both decrypt to
//! the same value under the same key.
//!
//! # Failure modes
//!
//! - Wrong key, truncated blob, or any flipped byte: the Poly1305 tag does
//!   not verify and [`decrypt`] returns [`StoreError::Decryption`].  No
//!   plaintext is ever returned in that case.
//! - Tag verifies but the plaintext is not a configuration object:
//!   [`StoreError::MalformedConfig`].
//!
//! There is no recovery path for a lost key.  Re-provisioning produces a new
//! key and a new blob together.

use std::fmt;

use chacha20poly1305::{
    aead::{Aead, KeyInit},
    ChaCha20Poly1305, Key, Nonce,
};
use rand::{rngs::OsRng, RngCore};
use thiserror::Error;
use tracing::debug;

use crate::domain::config::{ConfigError, Configuration};

/// Key size for ChaCha20-Poly1305 (256 bits).
pub const KEY_SIZE: usize = 32;
/// Nonce size for ChaCha20-Poly1305 (96 bits).
pub const NONCE_SIZE: usize = 12;
/// Poly1305 authentication tag size.
pub const TAG_SIZE: usize = 16;

/// An encrypted configuration blob: `nonce ‖ ciphertext ‖ tag`.
pub type Blob = Vec<u8>;

/// Error type for encrypted store operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// Key material of the wrong length was supplied.
    #[error("invalid key length: expected {expected} bytes, got {actual}")]
    InvalidKeyLength { expected: usize, actual: usize },

    /// The AEAD seal operation failed.
    #[error("encryption failed")]
    Encryption,

    /// Authentication failed: wrong key, truncated or corrupted blob.
    #[error("decryption failed: the key does not match or the blob is corrupted")]
    Decryption,

    /// The blob authenticated but its plaintext is not a valid configuration.
    #[error("decrypted configuration is malformed: {0}")]
    MalformedConfig(String),

    /// The blob authenticated and parsed but a required field is empty.
    #[error(transparent)]
    Config(ConfigError),
}

/// A raw 256-bit symmetric key.
///
/// The `Debug` impl never prints key material.
#[derive(Clone, PartialEq, Eq)]
pub struct SymmetricKey([u8; KEY_SIZE]);

impl SymmetricKey {
    /// Wraps raw key bytes as read from the key file.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::InvalidKeyLength`] unless `bytes` is exactly
    /// [`KEY_SIZE`] bytes long.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, StoreError> {
        let key: [u8; KEY_SIZE] = bytes.try_into().map_err(|_| StoreError::InvalidKeyLength {
            expected: KEY_SIZE,
            actual: bytes.len(),
        })?;
        Ok(Self(key))
    }

    /// Raw key bytes, suitable for writing to the key file.
    pub fn as_bytes(&self) -> &[u8; KEY_SIZE] {
        &self.0
    }

    fn cipher(&self) -> ChaCha20Poly1305 {
        ChaCha20Poly1305::new(Key::from_slice(&self.0))
    }
}

impl fmt::Debug for SymmetricKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SymmetricKey(..)")
    }
}

/// Generates a fresh random key from the operating system CSPRNG.
pub fn generate_key() -> SymmetricKey {
    let mut key = [0u8; KEY_SIZE];
    OsRng.fill_bytes(&mut key);
    SymmetricKey(key)
}

/// Encrypts `config` under `key`.
///
/// # Errors
///
/// Returns [`StoreError::Encryption`] if the AEAD primitive reports a failure.
pub fn encrypt(config: &Configuration, key: &SymmetricKey) -> Result<Blob, StoreError> {
    let mut nonce = [0u8; NONCE_SIZE];
    rand::thread_rng().fill_bytes(&mut nonce);
    encrypt_with_nonce(config, key, &nonce)
}

/// Encrypts `config` under `key` with a caller-provided nonce.
///
/// Reusing a nonce under the same key breaks confidentiality; this entry
/// point exists for deterministic benchmarks and tests.
pub fn encrypt_with_nonce(
    config: &Configuration,
    key: &SymmetricKey,
    nonce: &[u8; NONCE_SIZE],
) -> Result<Blob, StoreError> {
    let plaintext = config.to_json_vec();

    let ciphertext = key
        .cipher()
        .encrypt(Nonce::from_slice(nonce), plaintext.as_slice())
        .map_err(|_| StoreError::Encryption)?;

    let mut blob = Vec::with_capacity(NONCE_SIZE + ciphertext.len());
    blob.extend_from_slice(nonce);
    blob.extend_from_slice(&ciphertext);
    debug!(blob_len = blob.len(), "configuration sealed");
    Ok(blob)
}

/// Authenticates and decrypts `blob` under `key`.
///
/// # Errors
///
/// - [`StoreError::Decryption`] for a wrong key, a truncated blob, or any
///   corrupted byte.
/// - [`StoreError::MalformedConfig`] if the plaintext is not a JSON object of
///   string fields.
/// - [`StoreError::Config`] if a required field is missing or empty.
pub fn decrypt(blob: &[u8], key: &SymmetricKey) -> Result<Configuration, StoreError> {
    if blob.len() < NONCE_SIZE + TAG_SIZE {
        return Err(StoreError::Decryption);
    }
    let (nonce, ciphertext) = blob.split_at(NONCE_SIZE);

    let plaintext = key
        .cipher()
        .decrypt(Nonce::from_slice(nonce), ciphertext)
        .map_err(|_| StoreError::Decryption)?;

    Configuration::from_json_slice(&plaintext).map_err(|e| match e {
        ConfigError::Parse(msg) => StoreError::MalformedConfig(msg),
        other => StoreError::Config(other),
    })
}

/// Seals arbitrary bytes; used to build malformed-but-authentic blobs in tests.
#[cfg(test)]
fn seal_raw(plaintext: &[u8], key: &SymmetricKey) -> Blob {
    let nonce = [7u8; NONCE_SIZE];
    let mut blob = nonce.to_vec();
    blob.extend(
        key.cipher()
            .encrypt(Nonce::from_slice(&nonce), plaintext)
            .expect("seal"),
    );
    blob
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_config() -> Configuration {
        Configuration::new("sk-test", "https://api.example.com/v1", None).unwrap()
    }

    #[test]
    fn test_round_trip_returns_original_configuration() {
        // Arrange
        let key = generate_key();
        let cfg = sample_config();

        // Act
        let blob = encrypt(&cfg, &key).unwrap();
        let restored = decrypt(&blob, &key).unwrap();

        // Assert
        assert_eq!(restored, cfg);
    }

    #[test]
    fn test_blob_does_not_contain_plaintext_credential() {
        let key = generate_key();
        let blob = encrypt(&sample_config(), &key).unwrap();
        let needle = b"sk-test";
        assert!(!blob.windows(needle.len()).any(|w| w == needle));
    }

    #[test]
    fn test_two_encryptions_use_distinct_nonces() {
        let key = generate_key();
        let cfg = sample_config();
        let a = encrypt(&cfg, &key).unwrap();
        let b = encrypt(&cfg, &key).unwrap();
        assert_ne!(a, b);
        assert_eq!(decrypt(&a, &key).unwrap(), decrypt(&b, &key).unwrap());
    }

    #[test]
    fn test_generated_keys_differ() {
        assert_ne!(generate_key(), generate_key());
    }

    #[test]
    fn test_every_single_byte_flip_is_detected() {
        // Arrange
        let key = generate_key();
        let blob = encrypt(&sample_config(), &key).unwrap();

        // Act / Assert
        for i in 0..blob.len() {
            let mut tampered = blob.clone();
            tampered[i] ^= 0x01;
            assert_eq!(
                decrypt(&tampered, &key),
                Err(StoreError::Decryption),
                "flip at byte {i} must fail authentication"
            );
        }
    }

    #[test]
    fn test_wrong_key_fails_authentication() {
        let blob = encrypt(&sample_config(), &generate_key()).unwrap();
        assert_eq!(decrypt(&blob, &generate_key()), Err(StoreError::Decryption));
    }

    #[test]
    fn test_truncated_blob_fails_authentication() {
        let key = generate_key();
        let blob = encrypt(&sample_config(), &key).unwrap();

        assert_eq!(decrypt(&blob[..blob.len() - 1], &key), Err(StoreError::Decryption));
        assert_eq!(decrypt(&blob[..NONCE_SIZE], &key), Err(StoreError::Decryption));
        assert_eq!(decrypt(&[], &key), Err(StoreError::Decryption));
    }

    #[test]
    fn test_authentic_non_json_plaintext_is_malformed() {
        let key = generate_key();
        let blob = seal_raw(b"not json at all", &key);
        assert!(matches!(decrypt(&blob, &key), Err(StoreError::MalformedConfig(_))));
    }

    #[test]
    fn test_authentic_plaintext_missing_field_reports_field() {
        let key = generate_key();
        let blob = seal_raw(br#"{"api_url":"http://x"}"#, &key);
        assert_eq!(
            decrypt(&blob, &key),
            Err(StoreError::Config(ConfigError::MissingField("api_key")))
        );
    }

    #[test]
    fn test_key_from_bytes_rejects_wrong_length() {
        assert_eq!(
            SymmetricKey::from_bytes(&[0u8; 44]),
            Err(StoreError::InvalidKeyLength { expected: 32, actual: 44 })
        );
    }

    #[test]
    fn test_key_from_bytes_round_trips_raw_bytes() {
        let key = generate_key();
        let restored = SymmetricKey::from_bytes(key.as_bytes()).unwrap();
        assert_eq!(restored, key);
    }

    #[test]
    fn test_key_debug_hides_material() {
        let key = SymmetricKey::from_bytes(&[0xAB; KEY_SIZE]).unwrap();
        assert_eq!(format!("{key:?}"), "SymmetricKey(..)");
    }

    #[test]
    fn test_encrypt_with_fixed_nonce_is_deterministic() {
        let key = SymmetricKey::from_bytes(&[1u8; KEY_SIZE]).unwrap();
        let nonce = [9u8; NONCE_SIZE];
        let a = encrypt_with_nonce(&sample_config(), &key, &nonce).unwrap();
        let b = encrypt_with_nonce(&sample_config(), &key, &nonce).unwrap();
        assert_eq!(a, b);
        assert_eq!(&a[..NONCE_SIZE], &nonce);
    }
}
