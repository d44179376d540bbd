//! Passphrase key derivation using scrypt
//!
//! Derivation is deliberately expensive (memory-hard scrypt) and runs with
//! fixed cost parameters so that the same (passphrase, salt) pair always
//! reproduces the same key, on any platform. Callers that encrypt or decrypt
//! repeatedly under one passphrase should derive a [`PassKey`] once and reuse
//! it rather than re-paying the derivation cost per call.

use crate::error::{ErrorCategory, ErrorKind, Result, SavelockError};
use crate::format::SALT_LENGTH;
use rand::RngCore;
use rand::rngs::OsRng;
use scrypt::{Params, scrypt};
use zeroize::Zeroize;

/// Length of derived key in bytes
pub const KEY_LENGTH: usize = 32;

/// scrypt N parameter (CPU/memory cost), as log2. 2^15 = 32768.
const SCRYPT_LOG_N: u8 = 15;

/// scrypt r parameter (block size)
const SCRYPT_R: u32 = 8;

/// scrypt p parameter (parallelization)
const SCRYPT_P: u32 = 1;

/// A reusable derived key: the scrypt output together with the salt that
/// produced it.
///
/// The salt is not secret and is embedded in every blob encrypted under this
/// key; the key bytes are secret and are wiped from memory when the value is
/// dropped. The pair is immutable after creation.
pub struct PassKey {
    key: [u8; KEY_LENGTH],
    salt: [u8; SALT_LENGTH],
}

impl PassKey {
    /// Derive a key from a passphrase using a freshly generated random salt
    pub fn derive(passphrase: &[u8]) -> Result<Self> {
        let mut salt = [0u8; SALT_LENGTH];
        OsRng.fill_bytes(&mut salt);
        Self::from_salt_array(passphrase, salt)
    }

    /// Derive a key from a passphrase and an explicit salt
    ///
    /// This is how a key is re-derived to unlock previously encrypted data:
    /// extract the salt from the blob and pass it here with the original
    /// passphrase. The salt must be exactly [`SALT_LENGTH`] bytes.
    pub fn derive_with_salt(passphrase: &[u8], salt: &[u8]) -> Result<Self> {
        let salt: [u8; SALT_LENGTH] = salt.try_into().map_err(|_| {
            SavelockError::with_kind(
                ErrorCategory::User,
                ErrorKind::InvalidSaltLength,
                format!("salt must be exactly {} bytes, got {}", SALT_LENGTH, salt.len()),
            )
        })?;
        Self::from_salt_array(passphrase, salt)
    }

    fn from_salt_array(passphrase: &[u8], salt: [u8; SALT_LENGTH]) -> Result<Self> {
        let key = stretch(passphrase, &salt)?;
        Ok(Self { key, salt })
    }

    /// The derived secret key bytes
    pub fn key(&self) -> &[u8; KEY_LENGTH] {
        &self.key
    }

    /// The salt the key was derived with
    pub fn salt(&self) -> &[u8; SALT_LENGTH] {
        &self.salt
    }
}

impl Drop for PassKey {
    fn drop(&mut self) {
        self.key.zeroize();
    }
}

impl std::fmt::Debug for PassKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Never print key material.
        f.debug_struct("PassKey")
            .field("salt", &self.salt)
            .finish_non_exhaustive()
    }
}

/// Run the scrypt key-stretching function over (passphrase, salt)
fn stretch(passphrase: &[u8], salt: &[u8; SALT_LENGTH]) -> Result<[u8; KEY_LENGTH]> {
    let params = Params::new(SCRYPT_LOG_N, SCRYPT_R, SCRYPT_P, KEY_LENGTH).map_err(|e| {
        SavelockError::with_kind_and_source(
            ErrorCategory::Internal,
            ErrorKind::DerivationFailed,
            "failed to create scrypt params",
            e,
        )
    })?;

    let mut key = [0u8; KEY_LENGTH];
    scrypt(passphrase, salt, &params, &mut key).map_err(|e| {
        SavelockError::with_kind_and_source(
            ErrorCategory::Internal,
            ErrorKind::DerivationFailed,
            "scrypt key derivation failed",
            e,
        )
    })?;

    Ok(key)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derivation_is_deterministic() {
        let salt = [7u8; SALT_LENGTH];
        let a = PassKey::derive_with_salt(b"passphrase", &salt).unwrap();
        let b = PassKey::derive_with_salt(b"passphrase", &salt).unwrap();
        assert_eq!(a.key(), b.key());
        assert_eq!(a.salt(), b.salt());
    }

    #[test]
    fn test_different_salts_give_different_keys() {
        let a = PassKey::derive_with_salt(b"passphrase", &[1u8; SALT_LENGTH]).unwrap();
        let b = PassKey::derive_with_salt(b"passphrase", &[2u8; SALT_LENGTH]).unwrap();
        assert_ne!(a.key(), b.key());
    }

    #[test]
    fn test_different_passphrases_give_different_keys() {
        let salt = [3u8; SALT_LENGTH];
        let a = PassKey::derive_with_salt(b"one", &salt).unwrap();
        let b = PassKey::derive_with_salt(b"two", &salt).unwrap();
        assert_ne!(a.key(), b.key());
    }

    #[test]
    fn test_derive_generates_random_salt() {
        let a = PassKey::derive(b"passphrase").unwrap();
        let b = PassKey::derive(b"passphrase").unwrap();
        assert_ne!(a.salt(), b.salt());
        assert_ne!(a.key(), b.key());
    }

    #[test]
    fn test_rederive_with_generated_salt_matches() {
        let first = PassKey::derive(b"passphrase").unwrap();
        let second = PassKey::derive_with_salt(b"passphrase", first.salt()).unwrap();
        assert_eq!(first.key(), second.key());
    }

    #[test]
    fn test_salt_too_short_rejected() {
        let err = PassKey::derive_with_salt(b"passphrase", &[0u8; SALT_LENGTH - 1]).unwrap_err();
        assert_eq!(err.kind, Some(ErrorKind::InvalidSaltLength));
    }

    #[test]
    fn test_salt_too_long_rejected() {
        let err = PassKey::derive_with_salt(b"passphrase", &[0u8; SALT_LENGTH + 1]).unwrap_err();
        assert_eq!(err.kind, Some(ErrorKind::InvalidSaltLength));
    }

    #[test]
    fn test_empty_salt_rejected() {
        let err = PassKey::derive_with_salt(b"passphrase", b"").unwrap_err();
        assert_eq!(err.kind, Some(ErrorKind::InvalidSaltLength));
    }

    /// Derivation holds no shared state, so concurrent derivations with the
    /// same inputs must be safe and must agree bit-for-bit.
    #[test]
    fn test_parallel_derivations_agree() {
        let salt = [9u8; SALT_LENGTH];
        let handles: Vec<_> = (0..4)
            .map(|_| std::thread::spawn(move || PassKey::derive_with_salt(b"shared", &salt).unwrap()))
            .collect();
        let keys: Vec<PassKey> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        for pair in keys.windows(2) {
            assert_eq!(pair[0].key(), pair[1].key());
        }
    }

    #[test]
    fn test_debug_does_not_leak_key() {
        let key = PassKey::derive_with_salt(b"secret", &[0u8; SALT_LENGTH]).unwrap();
        let rendered = format!("{:?}", key);
        assert!(!rendered.contains("key:"));
    }
}
