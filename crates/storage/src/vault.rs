// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Token Vault (§4.3): scoped acquisition of the plaintext token with
//! guaranteed release. Encryption key material lives in the OS keyring,
//! never on disk; ciphertext decrypts only on the host that produced it.

use aes_gcm::aead::{Aead, KeyInit, OsRng};
use aes_gcm::{Aes256Gcm, Key, Nonce};
use base64::Engine;
use rand::RngCore;
use zeroize::Zeroizing;

use warden_core::identity::EnrollmentToken;

use crate::error::StorageError;

const KEYRING_SERVICE: &str = "warden-agent";
const KEYRING_ACCOUNT: &str = "token-vault-key";
const NONCE_LEN: usize = 12;

enum KeySource {
    Keyring(keyring::Entry),
    /// Bypasses the OS keyring facility for deterministic tests.
    #[cfg(any(test, feature = "test-support"))]
    Fixed([u8; 32]),
}

/// Encrypts/decrypts the auth token with a key bound to this host via the
/// OS keyring. `decrypt` never logs partial plaintext on failure.
pub struct TokenVault {
    source: KeySource,
}

impl TokenVault {
    pub fn new() -> Result<Self, StorageError> {
        let entry = keyring::Entry::new(KEYRING_SERVICE, KEYRING_ACCOUNT)
            .map_err(|e| StorageError::TokenDecryption(format!("keyring unavailable: {e}")))?;
        Ok(Self { source: KeySource::Keyring(entry) })
    }

    #[cfg(any(test, feature = "test-support"))]
    pub fn with_fixed_key(key: [u8; 32]) -> Self {
        Self { source: KeySource::Fixed(key) }
    }

    fn host_key(&self) -> Result<Key<Aes256Gcm>, StorageError> {
        let entry = match &self.source {
            KeySource::Keyring(entry) => entry,
            #[cfg(any(test, feature = "test-support"))]
            KeySource::Fixed(key) => return Ok(*Key::<Aes256Gcm>::from_slice(key)),
        };

        let encoded = match entry.get_password() {
            Ok(existing) => existing,
            Err(keyring::Error::NoEntry) => {
                let mut raw = [0u8; 32];
                OsRng.fill_bytes(&mut raw);
                let encoded = base64::engine::general_purpose::STANDARD.encode(raw);
                entry
                    .set_password(&encoded)
                    .map_err(|e| StorageError::TokenDecryption(format!("keyring write failed: {e}")))?;
                encoded
            }
            Err(e) => {
                return Err(StorageError::TokenDecryption(format!("keyring read failed: {e}")))
            }
        };
        let bytes = base64::engine::general_purpose::STANDARD
            .decode(encoded)
            .map_err(|_| StorageError::TokenDecryption("corrupt host key".into()))?;
        if bytes.len() != 32 {
            return Err(StorageError::TokenDecryption("host key has wrong length".into()));
        }
        Ok(*Key::<Aes256Gcm>::from_slice(&bytes))
    }

    /// Encrypts `plaintext`, returning an opaque blob decryptable only on
    /// this host.
    pub fn encrypt(&self, plaintext: &str) -> Result<EnrollmentToken, StorageError> {
        let key = self.host_key()?;
        let cipher = Aes256Gcm::new(&key);
        let mut nonce_bytes = [0u8; NONCE_LEN];
        OsRng.fill_bytes(&mut nonce_bytes);
        let nonce = Nonce::from_slice(&nonce_bytes);

        let ciphertext = cipher
            .encrypt(nonce, plaintext.as_bytes())
            .map_err(|e| StorageError::TokenDecryption(format!("encrypt failed: {e}")))?;

        let mut blob = Vec::with_capacity(NONCE_LEN + ciphertext.len());
        blob.extend_from_slice(&nonce_bytes);
        blob.extend_from_slice(&ciphertext);
        Ok(EnrollmentToken::new(base64::engine::general_purpose::STANDARD.encode(blob)))
    }

    /// Decrypts a ciphertext blob. Fails with `TokenDecryptionFailed` if
    /// the blob was produced on a different host or is corrupt.
    pub fn decrypt(&self, token: &EnrollmentToken) -> Result<Zeroizing<String>, StorageError> {
        let blob = base64::engine::general_purpose::STANDARD
            .decode(&token.ciphertext)
            .map_err(|_| StorageError::TokenDecryption("malformed ciphertext encoding".into()))?;
        if blob.len() < NONCE_LEN {
            return Err(StorageError::TokenDecryption("ciphertext truncated".into()));
        }
        let (nonce_bytes, ciphertext) = blob.split_at(NONCE_LEN);
        let key = self.host_key()?;
        let cipher = Aes256Gcm::new(&key);
        let nonce = Nonce::from_slice(nonce_bytes);

        let plaintext = cipher
            .decrypt(nonce, ciphertext)
            .map_err(|_| StorageError::TokenDecryption("ciphertext rejected by AEAD".into()))?;
        let text = String::from_utf8(plaintext)
            .map_err(|_| StorageError::TokenDecryption("decrypted bytes were not UTF-8".into()))?;
        Ok(Zeroizing::new(text))
    }
}

#[cfg(test)]
#[path = "vault_tests.rs"]
mod tests;
