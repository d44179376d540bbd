//! End-to-end scenarios exercising the public API only

use savelock::error::ErrorKind;
use savelock::file_ops;
use savelock::format;
use savelock::keys::PassKey;
use savelock::secretcrypt;
use tempfile::TempDir;

#[test]
fn hello_world_scenario() {
    let blob = secretcrypt::encrypt(b"hello world", b"somePassphrase").unwrap();

    assert_eq!(blob.len(), 11 + format::EXTRA_LENGTH);
    assert!(format::is_encrypted(&blob));

    let plaintext = secretcrypt::decrypt(&blob, b"somePassphrase").unwrap();
    assert_eq!(plaintext, b"hello world");

    let err = secretcrypt::decrypt(&blob, b"wrongPass").unwrap_err();
    assert_eq!(err.kind, Some(ErrorKind::DecryptionFailed));
}

#[test]
fn rederive_key_from_generated_salt() {
    let first = PassKey::derive(b"passphrase").unwrap();
    let second = PassKey::derive_with_salt(b"passphrase", first.salt()).unwrap();
    assert_eq!(first.key(), second.key());
}

#[test]
fn salt_recovered_from_blob_unlocks_it() {
    let blob = secretcrypt::encrypt(b"opaque save state", b"passphrase").unwrap();
    let salt = format::extract_salt(&blob).unwrap();
    let key = PassKey::derive_with_salt(b"passphrase", &salt).unwrap();
    let plaintext = secretcrypt::decrypt_with_key(&blob, &key).unwrap();
    assert_eq!(plaintext, b"opaque save state");
}

#[test]
fn file_roundtrip_scenario() {
    let temp_dir = TempDir::new().unwrap();
    let save_path = temp_dir.path().join("profile.sav");

    let original = b"serialized session state goes here";
    file_ops::encrypt_to_file(&save_path, original, b"somePassphrase").unwrap();

    let restored = file_ops::decrypt_from_file(&save_path, b"somePassphrase").unwrap();
    assert_eq!(restored, original);

    let err = file_ops::decrypt_from_file(&save_path, b"wrongPass").unwrap_err();
    assert_eq!(err.kind, Some(ErrorKind::DecryptionFailed));
}

#[test]
fn reused_key_across_many_blobs() {
    let key = PassKey::derive(b"somePassphrase").unwrap();

    let blobs: Vec<Vec<u8>> = (0u8..4)
        .map(|i| secretcrypt::encrypt_with_key(&[i; 16], &key).unwrap())
        .collect();

    // Every blob carries the key's salt and stays recoverable from the
    // passphrase alone.
    for (i, blob) in blobs.iter().enumerate() {
        assert_eq!(&format::extract_salt(blob).unwrap(), key.salt());
        let plaintext = secretcrypt::decrypt(blob, b"somePassphrase").unwrap();
        assert_eq!(plaintext, vec![i as u8; 16]);
    }
}

#[test]
fn malformed_inputs_fail_cleanly() {
    for len in [0usize, format::EXTRA_LENGTH - 1] {
        let mut data = vec![0u8; len];
        let n = len.min(format::MAGIC_LENGTH);
        data[..n].copy_from_slice(&format::MAGIC[..n]);

        assert!(format::extract_salt(&data).is_err());
        assert!(secretcrypt::decrypt(&data, b"pass").is_err());
    }
}
