//! File persistence for encrypted save blobs
//!
//! Thin layer over [`crate::secretcrypt`]: the whole blob is materialized in
//! memory in both directions (save blobs are bounded application state, not
//! large media), and I/O failures surface with their own error kind rather
//! than being reinterpreted as cryptographic failures. No locking is
//! performed; concurrent writers to one path race at the filesystem level.

use crate::error::{ErrorCategory, ErrorKind, Result, SavelockError};
use crate::keys::PassKey;
use crate::secretcrypt;
use std::fs;
use std::io::{self, Write};
use std::path::Path;

/// Encrypt plaintext with a passphrase and write the blob to `path`
///
/// Any existing file at `path` is overwritten. The derived key is dropped
/// before the write begins, so a write failure cannot leave key material
/// live. The output file is created with mode 0o600 (read/write for owner
/// only) on Unix systems.
pub fn encrypt_to_file(path: &Path, plaintext: &[u8], passphrase: &[u8]) -> Result<()> {
    let blob = secretcrypt::encrypt(plaintext, passphrase)
        .map_err(|e| e.with_context("encryption failed"))?;
    write_file_secure(path, &blob)
        .map_err(|e| e.with_context(format!("failed to write to {}", path.display())))
}

/// Encrypt plaintext with a previously derived key and write the blob to `path`
pub fn encrypt_to_file_with_key(path: &Path, plaintext: &[u8], key: &PassKey) -> Result<()> {
    let blob = secretcrypt::encrypt_with_key(plaintext, key)
        .map_err(|e| e.with_context("encryption failed"))?;
    write_file_secure(path, &blob)
        .map_err(|e| e.with_context(format!("failed to write to {}", path.display())))
}

/// Read an encrypted blob from `path` and decrypt it with a passphrase
///
/// A missing or unreadable file fails with an `Io` error, never with a
/// decryption error; the underlying `std::io::Error` is preserved as source.
pub fn decrypt_from_file(path: &Path, passphrase: &[u8]) -> Result<Vec<u8>> {
    let data = fs::read(path).map_err(|e| read_error(path, e))?;
    secretcrypt::decrypt(&data, passphrase).map_err(|e| e.with_context("failed to decrypt"))
}

/// Read an encrypted blob from `path` and decrypt it with a previously derived key
pub fn decrypt_from_file_with_key(path: &Path, key: &PassKey) -> Result<Vec<u8>> {
    let data = fs::read(path).map_err(|e| read_error(path, e))?;
    secretcrypt::decrypt_with_key(&data, key).map_err(|e| e.with_context("failed to decrypt"))
}

/// Write file with secure permissions (0o600 on Unix)
fn write_file_secure(path: &Path, contents: &[u8]) -> Result<()> {
    #[cfg(unix)]
    {
        use std::fs::OpenOptions;
        use std::os::unix::fs::OpenOptionsExt;

        let mut file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .mode(0o600)
            .open(path)
            .map_err(|e| {
                SavelockError::with_kind_and_source(
                    ErrorCategory::User,
                    ErrorKind::Io,
                    format!("failed to open {}", path.display()),
                    e,
                )
            })?;

        file.write_all(contents).map_err(|e| {
            SavelockError::with_kind_and_source(
                ErrorCategory::Internal,
                ErrorKind::Io,
                format!("failed to write {}", path.display()),
                e,
            )
        })?;
        Ok(())
    }

    #[cfg(not(unix))]
    {
        fs::write(path, contents).map_err(|e| {
            SavelockError::with_kind_and_source(
                ErrorCategory::User,
                ErrorKind::Io,
                format!("failed to write {}", path.display()),
                e,
            )
        })?;
        Ok(())
    }
}

fn read_error(path: &Path, err: io::Error) -> SavelockError {
    let category = if err.kind() == io::ErrorKind::NotFound {
        ErrorCategory::User
    } else {
        ErrorCategory::Internal
    };
    SavelockError::with_kind_and_source(
        category,
        ErrorKind::Io,
        format!("failed to read from {}", path.display()),
        err,
    )
}
