//! Savelock - passphrase-protected save-data encryption
//!
//! Turns a user-supplied passphrase into a key (scrypt), authenticated-encrypts
//! opaque binary blobs under it (NaCl secretbox), and persists the result in a
//! self-describing format that can be recognized without the passphrase.
//!
//! ```no_run
//! use savelock::secretcrypt;
//! use savelock::format;
//!
//! # fn main() -> savelock::error::Result<()> {
//! let blob = secretcrypt::encrypt(b"hello world", b"somePassphrase")?;
//! assert!(format::is_encrypted(&blob));
//! let plaintext = secretcrypt::decrypt(&blob, b"somePassphrase")?;
//! assert_eq!(plaintext, b"hello world");
//! # Ok(())
//! # }
//! ```
//!
//! All operations are synchronous and touch no shared mutable state; callers
//! that want deferred completion run them on a worker thread of their own.
//! Key derivation is the only long-running step, and callers that encrypt
//! repeatedly under one passphrase should derive a [`keys::PassKey`] once and
//! use the `_with_key` entry points.

#![forbid(unsafe_code)]

pub mod error;
pub mod file_ops;
pub mod format;
pub mod keys;
pub mod secretcrypt;
