use std::fs;
use std::path::PathBuf;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use vault::{CryptoError, KeyError, Vault, IV_LEN, KEY_LEN};

const KEY: [u8; KEY_LEN] = [0x5A; KEY_LEN];

fn write_key_file(dir: &tempfile::TempDir, name: &str, contents: &[u8]) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, contents).expect("write key file");
    path
}

fn ready_vault() -> Vault {
    Vault::with_key(KEY)
}

#[test]
fn fresh_vault_is_not_ready() {
    let vault = Vault::new();
    assert!(!vault.is_ready());
    assert_eq!(vault.encrypt(b"x"), Err(CryptoError::NotReady));
    assert_eq!(vault.decrypt(&[0u8; 48]), Err(CryptoError::NotReady));
}

#[test]
fn loads_key_in_any_supported_encoding() {
    let dir = tempfile::tempdir().expect("tempdir");
    let base64_path = write_key_file(&dir, "b64.key", BASE64.encode(KEY).as_bytes());
    let hex_path = write_key_file(&dir, "hex.key", hex::encode(KEY).as_bytes());
    let raw_path = write_key_file(&dir, "raw.key", &KEY);

    let mut sealer = Vault::new();
    sealer.load_key(&base64_path).expect("base64 key");
    assert!(sealer.is_ready());
    let sealed = sealer.encrypt(b"cross-encoding").expect("encrypt");

    for path in [hex_path, raw_path] {
        let mut other = Vault::new();
        other.load_key(&path).expect("key");
        assert_eq!(other.decrypt(&sealed).expect("decrypt"), b"cross-encoding");
    }
}

#[test]
fn trailing_newline_in_key_file_is_tolerated() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = write_key_file(&dir, "k.key", format!("{}\n", BASE64.encode(KEY)).as_bytes());
    let mut vault = Vault::new();
    vault.load_key(&path).expect("key");
    assert!(vault.is_ready());
}

#[test]
fn missing_key_file_is_an_io_error() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut vault = Vault::new();
    let err = vault.load_key(&dir.path().join("absent.key")).unwrap_err();
    assert!(matches!(err, KeyError::Io(_)));
    assert!(!vault.is_ready());
}

#[test]
fn short_or_garbage_key_file_is_invalid_format() {
    let dir = tempfile::tempdir().expect("tempdir");
    for contents in [&b"too short"[..], &[0x5A; 31][..], &[0x5A; 33][..]] {
        let path = write_key_file(&dir, "bad.key", contents);
        let mut vault = Vault::new();
        assert!(matches!(
            vault.load_key(&path),
            Err(KeyError::InvalidFormat)
        ));
        assert!(!vault.is_ready());
    }
}

#[test]
fn failed_reload_keeps_previous_key() {
    let dir = tempfile::tempdir().expect("tempdir");
    let bad = write_key_file(&dir, "bad.key", b"nope");
    let mut vault = ready_vault();
    assert!(vault.load_key(&bad).is_err());
    assert!(vault.is_ready());
}

#[test]
fn round_trips_arbitrary_plaintexts() {
    let vault = ready_vault();
    for plaintext in [&b""[..], &b"a"[..], &[0u8; 16][..], &[0xAB; 1000][..]] {
        let sealed = vault.encrypt(plaintext).expect("encrypt");
        assert_eq!(vault.decrypt(&sealed).expect("decrypt"), plaintext);
    }
}

#[test]
fn container_layout_is_iv_then_padded_ciphertext() {
    let vault = ready_vault();
    // Empty plaintext pads to one full block.
    assert_eq!(vault.encrypt(b"").expect("encrypt").len(), IV_LEN + 16);
    // A block-aligned plaintext still gains a full padding block.
    assert_eq!(
        vault.encrypt(&[0u8; 16]).expect("encrypt").len(),
        IV_LEN + 32
    );
    assert_eq!(vault.encrypt(&[0u8; 17]).expect("encrypt").len(), IV_LEN + 32);
}

#[test]
fn each_seal_uses_a_fresh_iv() {
    let vault = ready_vault();
    let first = vault.encrypt(b"same plaintext").expect("encrypt");
    let second = vault.encrypt(b"same plaintext").expect("encrypt");
    assert_ne!(first, second);
    assert_ne!(first[..IV_LEN], second[..IV_LEN]);
    assert_eq!(vault.decrypt(&first).expect("decrypt"), b"same plaintext");
    assert_eq!(vault.decrypt(&second).expect("decrypt"), b"same plaintext");
}

#[test]
fn too_short_containers_are_malformed() {
    let vault = ready_vault();
    assert_eq!(vault.decrypt(&[]), Err(CryptoError::Malformed));
    assert_eq!(vault.decrypt(&[0u8; 15]), Err(CryptoError::Malformed));
    // Exactly one IV with no ciphertext at all.
    assert_eq!(vault.decrypt(&[0u8; IV_LEN]), Err(CryptoError::Malformed));
}

#[test]
fn truncated_ciphertext_is_a_cipher_failure() {
    let vault = ready_vault();
    let mut sealed = vault.encrypt(b"some ledger bytes").expect("encrypt");
    sealed.truncate(IV_LEN + 15);
    assert_eq!(vault.decrypt(&sealed), Err(CryptoError::CipherFailure));
}

#[test]
fn wrong_key_never_recovers_the_plaintext() {
    let sealer = ready_vault();
    let sealed = sealer.encrypt(b"the real ledger").expect("encrypt");

    let wrong = Vault::with_key([0xA5; KEY_LEN]);
    match wrong.decrypt(&sealed) {
        Err(CryptoError::CipherFailure) => {}
        Ok(recovered) => assert_ne!(recovered, b"the real ledger"),
        Err(other) => panic!("unexpected error: {other}"),
    }
}
