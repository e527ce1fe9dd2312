//! End-to-end load pipeline: files on disk in, verified ledgers out,
//! with the protection gate wired explicitly so the tests control it.

use std::fs;
use std::path::{Path, PathBuf};

use ledger::link_digest;
use self_protect::{DebuggerProbeConfig, GateConfig, ProtectionGate, ReferenceDigest};
use vault::{CryptoError, Vault};
use viewer_core::{is_encrypted_path, LedgerService, LoadError};

const KEY: [u8; 32] = [0x42; 32];

fn silent_gate(reference_digest: ReferenceDigest) -> ProtectionGate {
    ProtectionGate::new(GateConfig {
        reference_digest,
        debugger: DebuggerProbeConfig {
            enable_api_probe: false,
            enable_control_block_probe: false,
            enable_kernel_query_probe: false,
        },
        block_on_debugger: false,
    })
}

fn service_with_key() -> LedgerService {
    LedgerService::new(silent_gate(ReferenceDigest::Unset), Vault::with_key(KEY))
}

fn service_without_key() -> LedgerService {
    LedgerService::new(silent_gate(ReferenceDigest::Unset), Vault::new())
}

fn chained_json(fields: &[(&str, u32, i64)]) -> Vec<u8> {
    let mut rows = Vec::new();
    let mut previous = String::new();
    for &(article, quantity, timestamp) in fields {
        let hash = link_digest(article, quantity, timestamp, &previous);
        rows.push(format!(
            r#"{{"article":"{article}","quantity":{quantity},"timestamp":{timestamp},"hash":"{hash}"}}"#
        ));
        previous = hash;
    }
    format!("[{}]", rows.join(",")).into_bytes()
}

fn sample_json() -> Vec<u8> {
    chained_json(&[
        ("1234567890", 5, 1_000),
        ("9876543210", 7, 2_000),
        ("5550001111", 12, 3_000),
    ])
}

fn write_file(dir: &tempfile::TempDir, name: &str, bytes: &[u8]) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, bytes).expect("write test file");
    path
}

#[test]
fn plaintext_ledger_loads_and_verifies() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = write_file(&dir, "invoices.json", &sample_json());

    let ledger = service_without_key().open(&path).expect("open");
    assert_eq!(ledger.records.len(), 3);
    assert!(ledger.records.iter().all(|r| r.valid));
    assert_eq!(ledger.broken_count(), 0);
    assert_eq!(ledger.source, path);
}

#[test]
fn sealed_ledger_is_unsealed_and_verified() {
    let dir = tempfile::tempdir().expect("tempdir");
    let service = service_with_key();
    let sealed = service.vault().encrypt(&sample_json()).expect("seal");
    let path = write_file(&dir, "invoices.json.enc", &sealed);

    let ledger = service.open(&path).expect("open sealed");
    assert_eq!(ledger.records.len(), 3);
    assert!(ledger.records.iter().all(|r| r.valid));
}

#[test]
fn sealed_extension_matches_case_insensitively() {
    let dir = tempfile::tempdir().expect("tempdir");
    let service = service_with_key();
    let sealed = service.vault().encrypt(&sample_json()).expect("seal");
    let path = write_file(&dir, "INVOICES.ENC", &sealed);

    let ledger = service.open(&path).expect("open sealed");
    assert_eq!(ledger.records.len(), 3);
}

#[test]
fn tampered_record_poisons_the_suffix_through_the_pipeline() {
    let dir = tempfile::tempdir().expect("tempdir");
    let tampered = String::from_utf8(sample_json())
        .expect("utf8")
        .replace(r#""quantity":7"#, r#""quantity":700"#);
    let path = write_file(&dir, "invoices.json", tampered.as_bytes());

    let ledger = service_without_key().open(&path).expect("open");
    let flags: Vec<bool> = ledger.records.iter().map(|r| r.valid).collect();
    assert_eq!(flags, vec![true, false, false]);
    assert_eq!(ledger.broken_count(), 2);
}

#[test]
fn missing_file_reports_io_error() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("absent.json");

    let err = service_without_key().open(&path).expect_err("must fail");
    match err {
        LoadError::Io { path: p, source } => {
            assert_eq!(p, path);
            assert_eq!(source.kind(), std::io::ErrorKind::NotFound);
        }
        other => panic!("expected Io error, got {other}"),
    }
    assert!(!LoadError::Io {
        path,
        source: std::io::Error::from(std::io::ErrorKind::NotFound),
    }
    .is_fatal());
}

#[test]
fn garbage_bytes_report_parse_error() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = write_file(&dir, "invoices.json", b"not json at all");

    let err = service_without_key().open(&path).expect_err("must fail");
    assert!(matches!(err, LoadError::Parse { .. }), "got {err}");
}

#[test]
fn sealed_file_without_key_reports_key_missing() {
    let dir = tempfile::tempdir().expect("tempdir");
    let sealed = Vault::with_key(KEY).encrypt(&sample_json()).expect("seal");
    let path = write_file(&dir, "invoices.json.enc", &sealed);

    let err = service_without_key().open(&path).expect_err("must fail");
    assert!(matches!(err, LoadError::KeyMissing { .. }), "got {err}");
}

#[test]
fn wrong_key_never_yields_a_ledger() {
    let dir = tempfile::tempdir().expect("tempdir");
    let sealed = Vault::with_key([0x99; 32])
        .encrypt(&sample_json())
        .expect("seal");
    let path = write_file(&dir, "invoices.json.enc", &sealed);

    match service_with_key().open(&path) {
        Err(LoadError::Crypto { source, .. }) => {
            assert_eq!(source, CryptoError::CipherFailure)
        }
        // A wrong key can slip past the padding check; the bytes it
        // yields are noise and never parse into records.
        Err(LoadError::Parse { .. }) => {}
        Ok(_) => panic!("wrong key produced a ledger"),
        Err(other) => panic!("unexpected error: {other}"),
    }
}

#[test]
fn mismatched_pinned_digest_blocks_the_load() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = write_file(&dir, "invoices.json", &sample_json());

    // No build of this test binary hashes to all zeroes, so a pinned
    // zero digest always trips the gate.
    let service = LedgerService::new(
        silent_gate(ReferenceDigest::Pinned([0u8; 32])),
        Vault::new(),
    );
    let err = service.open(&path).expect_err("gate must refuse");
    assert!(matches!(err, LoadError::IntegrityBlocked { .. }), "got {err}");
    assert!(err.is_fatal());
}

#[test]
fn encrypted_path_detection_is_extension_based() {
    assert!(is_encrypted_path(Path::new("data/invoices.json.enc")));
    assert!(is_encrypted_path(Path::new("DATA.ENC")));
    assert!(is_encrypted_path(Path::new("x.Enc")));
    assert!(!is_encrypted_path(Path::new("data/invoices.json")));
    assert!(!is_encrypted_path(Path::new("enc")));
    assert!(!is_encrypted_path(Path::new("archive.enc.bak")));
}
