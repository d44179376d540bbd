//! Encrypted blob format definition and salt recovery
//!
//! An encrypted blob is laid out as:
//! - magic: 8 bytes, identifies data in this format
//! - salt: 32 bytes, input to key derivation
//! - nonce: 24 bytes
//! - sealed box: variable length (includes 16-byte Poly1305 MAC)
//!
//! The magic prefix exists so that "is this encrypted?" can be answered
//! without attempting decryption and without the passphrase. Salt recovery
//! likewise needs no key material, which is what allows a caller to
//! re-derive the key for a blob it is about to decrypt.

use crate::error::{ErrorCategory, ErrorKind, Result, SavelockError};

/// Magic prefix identifying data in the savelock format
pub const MAGIC: [u8; MAGIC_LENGTH] = *b"saveLock";

/// Length of the magic prefix in bytes
pub const MAGIC_LENGTH: usize = 8;

/// Length of salt in bytes
pub const SALT_LENGTH: usize = 32;

/// Length of nonce in bytes
pub const NONCE_LENGTH: usize = 24;

/// Length of the Poly1305 authentication tag in bytes
pub const TAG_LENGTH: usize = 16;

/// Fixed byte overhead added to any plaintext by encryption
pub const EXTRA_LENGTH: usize = MAGIC_LENGTH + SALT_LENGTH + NONCE_LENGTH + TAG_LENGTH;

/// Returns true if `data` begins with the savelock magic prefix
///
/// This inspects only the prefix; it never fails and returns false for any
/// input shorter than the prefix. A true result does not guarantee the rest
/// of the blob is intact.
pub fn is_encrypted(data: &[u8]) -> bool {
    data.len() >= MAGIC_LENGTH && data[..MAGIC_LENGTH] == MAGIC
}

/// Extract the salt embedded in an encrypted blob
///
/// Requires a well-formed blob: magic prefix present and at least
/// [`EXTRA_LENGTH`] bytes total. The passphrase is not needed.
pub fn extract_salt(data: &[u8]) -> Result<[u8; SALT_LENGTH]> {
    if !is_encrypted(data) {
        return Err(SavelockError::with_kind(
            ErrorCategory::User,
            ErrorKind::MalformedBlob,
            "input does not begin with the savelock magic prefix",
        ));
    }

    if data.len() < EXTRA_LENGTH {
        return Err(SavelockError::with_kind(
            ErrorCategory::User,
            ErrorKind::MalformedBlob,
            "input shorter than the fixed encryption overhead; likely truncated",
        ));
    }

    let salt: [u8; SALT_LENGTH] = data[MAGIC_LENGTH..MAGIC_LENGTH + SALT_LENGTH]
        .try_into()
        .map_err(|_| {
            SavelockError::with_kind(
                ErrorCategory::Internal,
                ErrorKind::MalformedBlob,
                "failed to read salt region",
            )
        })?;

    Ok(salt)
}
