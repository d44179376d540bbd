//! Authenticated encryption/decryption of save blobs
//!
//! This module implements passphrase-based encryption using:
//! - scrypt for key derivation from passphrase (see [`crate::keys`])
//! - NaCl secretbox (XSalsa20Poly1305) for authenticated encryption
//!
//! Output blobs follow the format defined in [`crate::format`]:
//! `magic || salt || nonce || sealed box`. Every encryption adds exactly
//! [`EXTRA_LENGTH`] bytes of overhead to the plaintext.
//!
//! Two entry families exist: the passphrase-based functions derive a fresh
//! key (new random salt) per call, while the `_with_key` functions reuse a
//! caller-held [`PassKey`] and skip the expensive derivation. Salt reuse
//! across blobs on the keyed path is safe because per-message uniqueness
//! comes from the nonce, not the salt.

use crate::error::{ErrorCategory, ErrorKind, Result, SavelockError};
use crate::format::{self, EXTRA_LENGTH, MAGIC, MAGIC_LENGTH, NONCE_LENGTH, SALT_LENGTH};
use crate::keys::PassKey;
use crypto_secretbox::aead::{Aead, KeyInit};
use crypto_secretbox::{Nonce, XSalsa20Poly1305};
use rand::RngCore;
use rand::rngs::OsRng;

/// The secret used for a cipher operation: either a raw passphrase (a key
/// is derived per call) or a previously derived key.
#[derive(Clone, Copy)]
pub enum KeySource<'a> {
    /// Derive a key from these passphrase bytes for this one call.
    Passphrase(&'a [u8]),
    /// Reuse an existing derived key.
    Derived(&'a PassKey),
}

/// Encrypt plaintext with a passphrase
///
/// Derives a fresh key with a new random salt, then seals the plaintext
/// under a freshly generated nonce. Zero-length plaintext is legal and
/// yields an [`EXTRA_LENGTH`]-byte blob.
pub fn encrypt(plaintext: &[u8], passphrase: &[u8]) -> Result<Vec<u8>> {
    encrypt_with(plaintext, KeySource::Passphrase(passphrase))
}

/// Encrypt plaintext with a previously derived key, skipping derivation
///
/// The blob embeds the key's salt, so it remains decryptable with the
/// original passphrase alone.
pub fn encrypt_with_key(plaintext: &[u8], key: &PassKey) -> Result<Vec<u8>> {
    encrypt_with(plaintext, KeySource::Derived(key))
}

/// Encrypt plaintext with either a passphrase or a derived key
pub fn encrypt_with(plaintext: &[u8], source: KeySource<'_>) -> Result<Vec<u8>> {
    match source {
        KeySource::Passphrase(passphrase) => {
            let key = PassKey::derive(passphrase)?;
            seal(plaintext, &key)
        }
        KeySource::Derived(key) => seal(plaintext, key),
    }
}

/// Decrypt a blob with a passphrase
///
/// Re-derives the key from the supplied passphrase and the salt embedded in
/// the blob. Fails with `NotEncrypted` if the magic prefix is absent, with
/// `MalformedBlob` if the blob is shorter than the fixed overhead, and with
/// `DecryptionFailed` if authentication fails - the latter deliberately does
/// not distinguish a wrong passphrase from corrupted data.
pub fn decrypt(data: &[u8], passphrase: &[u8]) -> Result<Vec<u8>> {
    decrypt_with(data, KeySource::Passphrase(passphrase))
}

/// Decrypt a blob with a previously derived key, skipping derivation
///
/// The salt embedded in the blob is not consulted; the caller is asserting
/// that this key is the one the blob was sealed under.
pub fn decrypt_with_key(data: &[u8], key: &PassKey) -> Result<Vec<u8>> {
    decrypt_with(data, KeySource::Derived(key))
}

/// Decrypt a blob with either a passphrase or a derived key
pub fn decrypt_with(data: &[u8], source: KeySource<'_>) -> Result<Vec<u8>> {
    check_well_formed(data)?;
    match source {
        KeySource::Passphrase(passphrase) => {
            let salt = format::extract_salt(data)?;
            let key = PassKey::derive_with_salt(passphrase, &salt)?;
            open(data, &key)
        }
        KeySource::Derived(key) => open(data, key),
    }
}

fn check_well_formed(data: &[u8]) -> Result<()> {
    if !format::is_encrypted(data) {
        return Err(SavelockError::with_kind(
            ErrorCategory::User,
            ErrorKind::NotEncrypted,
            "input is not in the savelock encrypted format",
        ));
    }

    if data.len() < EXTRA_LENGTH {
        return Err(SavelockError::with_kind(
            ErrorCategory::User,
            ErrorKind::MalformedBlob,
            "input shorter than the fixed encryption overhead; likely truncated",
        ));
    }

    Ok(())
}

fn seal(plaintext: &[u8], key: &PassKey) -> Result<Vec<u8>> {
    let mut nonce = [0u8; NONCE_LENGTH];
    OsRng.fill_bytes(&mut nonce);

    let cipher = XSalsa20Poly1305::new(key.key().into());
    let sealed_box = cipher
        .encrypt(&Nonce::from(nonce), plaintext)
        .map_err(|_| {
            SavelockError::with_kind(
                ErrorCategory::Internal,
                ErrorKind::EncryptionFailed,
                "secretbox failed to seal data",
            )
        })?;

    let mut output = Vec::with_capacity(plaintext.len() + EXTRA_LENGTH);
    output.extend_from_slice(&MAGIC);
    output.extend_from_slice(key.salt());
    output.extend_from_slice(&nonce);
    output.extend_from_slice(&sealed_box);

    Ok(output)
}

fn open(data: &[u8], key: &PassKey) -> Result<Vec<u8>> {
    let pos = MAGIC_LENGTH + SALT_LENGTH;
    let nonce: [u8; NONCE_LENGTH] = data[pos..pos + NONCE_LENGTH].try_into().map_err(|_| {
        SavelockError::with_kind(
            ErrorCategory::Internal,
            ErrorKind::MalformedBlob,
            "failed to read nonce region",
        )
    })?;
    let sealed_box = &data[pos + NONCE_LENGTH..];

    let cipher = XSalsa20Poly1305::new(key.key().into());
    let plaintext = cipher
        .decrypt(&Nonce::from(nonce), sealed_box)
        .map_err(|_| {
            SavelockError::with_kind(
                ErrorCategory::User,
                ErrorKind::DecryptionFailed,
                "wrong passphrase, tampered-with data, or corrupt input",
            )
        })?;

    Ok(plaintext)
}
