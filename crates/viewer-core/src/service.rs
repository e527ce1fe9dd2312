//! The protected load pipeline. Every open runs the protection gate
//! first, then reads, unseals when the file is sealed, parses, and
//! chain-verifies the records. The viewer never shows data the gate
//! refused.

use std::fmt;
use std::path::{Path, PathBuf};

use tracing::{debug, error, info, warn};

use ledger::{parse_ledger, verify_chain, InvoiceRecord, ParseError};
use self_protect::{IntegrityCheck, ProtectionGate};
use vault::{CryptoError, Vault};

use crate::config::ViewerConfig;
use crate::discovery;

/// A loaded ledger with chain verification already applied.
#[derive(Debug)]
pub struct Ledger {
    pub records: Vec<InvoiceRecord>,
    pub source: PathBuf,
}

impl Ledger {
    /// Records whose stored hash failed chain verification.
    pub fn broken_count(&self) -> usize {
        self.records.iter().filter(|r| !r.valid).count()
    }
}

/// Why a ledger failed to load.
#[derive(Debug)]
pub enum LoadError {
    /// The protection gate refused the operation. The only fatal
    /// variant: the process itself can no longer be trusted.
    IntegrityBlocked { summary: String },
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    /// The file is sealed but no usable key is loaded.
    KeyMissing { path: PathBuf },
    Crypto {
        path: PathBuf,
        source: CryptoError,
    },
    Parse {
        path: PathBuf,
        source: ParseError,
    },
}

impl LoadError {
    /// Whether the viewer should stop instead of continuing without a
    /// ledger.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::IntegrityBlocked { .. })
    }
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::IntegrityBlocked { summary } => {
                write!(f, "protection gate refused the load: {}", summary)
            }
            Self::Io { path, source } => {
                write!(f, "cannot read ledger file {}: {}", path.display(), source)
            }
            Self::KeyMissing { path } => write!(
                f,
                "{} is sealed but no encryption key is loaded",
                path.display()
            ),
            Self::Crypto { path, source } => {
                write!(f, "cannot unseal {}: {}", path.display(), source)
            }
            Self::Parse { path, source } => {
                write!(f, "cannot parse {}: {}", path.display(), source)
            }
        }
    }
}

impl std::error::Error for LoadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Crypto { source, .. } => Some(source),
            Self::Parse { source, .. } => Some(source),
            Self::IntegrityBlocked { .. } | Self::KeyMissing { .. } => None,
        }
    }
}

/// Gate plus vault, wired once at startup and consulted on every open.
pub struct LedgerService {
    gate: ProtectionGate,
    vault: Vault,
}

impl LedgerService {
    pub fn new(gate: ProtectionGate, vault: Vault) -> Self {
        Self { gate, vault }
    }

    /// Build the service from resolved viewer settings. A missing or
    /// unusable key file is logged and tolerated: the viewer then runs
    /// plaintext-only and sealed files report [`LoadError::KeyMissing`].
    pub fn from_config(config: &ViewerConfig) -> Self {
        let gate = ProtectionGate::new(config.gate_config());

        let mut vault = Vault::new();
        let key_path = config.key_file.clone().or_else(discovery::locate_key_file);
        match key_path {
            Some(path) => match vault.load_key(&path) {
                Ok(()) => info!(path = %path.display(), "encryption key loaded"),
                Err(err) => {
                    warn!(
                        path = %path.display(),
                        error = %err,
                        "encryption key unusable, sealed ledgers stay locked"
                    );
                }
            },
            None => debug!("no encryption key found, sealed ledgers stay locked"),
        }

        Self { gate, vault }
    }

    pub fn vault(&self) -> &Vault {
        &self.vault
    }

    /// Load and verify the ledger at `path`.
    pub fn open(&self, path: &Path) -> Result<Ledger, LoadError> {
        let report = self.gate.evaluate();
        if report.debugger.detected() {
            warn!(
                signals = ?report.debugger.signal_codes(),
                "debugger observation during ledger open"
            );
        }
        if !report.is_clean() {
            error!(
                violations = ?report.violation_codes(),
                "protection gate refused ledger open"
            );
            return Err(LoadError::IntegrityBlocked {
                summary: report.summary(),
            });
        }
        if matches!(report.integrity, IntegrityCheck::NotPinned) {
            debug!("code integrity not pinned, check skipped");
        }

        let raw = std::fs::read(path).map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let plaintext = if is_encrypted_path(path) {
            if !self.vault.is_ready() {
                return Err(LoadError::KeyMissing {
                    path: path.to_path_buf(),
                });
            }
            self.vault.decrypt(&raw).map_err(|source| LoadError::Crypto {
                path: path.to_path_buf(),
                source,
            })?
        } else {
            raw
        };

        let mut records = parse_ledger(&plaintext).map_err(|source| LoadError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        verify_chain(&mut records);

        let ledger = Ledger {
            records,
            source: path.to_path_buf(),
        };
        info!(
            path = %path.display(),
            records = ledger.records.len(),
            broken = ledger.broken_count(),
            "ledger loaded"
        );
        Ok(ledger)
    }
}

/// Sealed ledger files carry an `.enc` extension, matched without case
/// sensitivity.
pub fn is_encrypted_path(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("enc"))
}
