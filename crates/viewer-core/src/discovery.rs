//! Upward path discovery. The viewer ships as a bare executable next to
//! (or a few directories below) its data and config folders, so the
//! conventional relative paths are searched from the executable's
//! directory through a bounded number of ancestors.

use std::path::{Path, PathBuf};

use tracing::debug;

/// Ledger loaded at startup when no path is picked.
pub const DEFAULT_DATA_FILE: &str = "data/invoices_valid.json";
/// Key material for sealed ledger files.
pub const DEFAULT_KEY_FILE: &str = "config/encryption.key";
/// Viewer settings file.
pub const DEFAULT_CONFIG_FILE: &str = "config/ledgerguard.toml";
/// How many parent directories are probed above the start directory.
pub const ANCESTOR_SEARCH_DEPTH: usize = 5;

/// Search `start` and up to [`ANCESTOR_SEARCH_DEPTH`] ancestors for
/// `relative`, returning the first hit canonicalized.
pub fn find_upward(start: &Path, relative: &str) -> Option<PathBuf> {
    let mut dir = start.to_path_buf();
    for _ in 0..=ANCESTOR_SEARCH_DEPTH {
        let candidate = dir.join(relative);
        if candidate.exists() {
            debug!(path = %candidate.display(), "resolved relative path");
            return Some(candidate.canonicalize().unwrap_or(candidate));
        }
        if !dir.pop() {
            break;
        }
    }
    None
}

/// Directory holding the running executable.
pub fn executable_dir() -> Option<PathBuf> {
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
}

/// Default ledger location. When nothing is found the working-directory
/// candidate is still returned so the caller can name the file it
/// expected.
pub fn locate_data_file() -> PathBuf {
    if let Some(dir) = executable_dir() {
        if let Some(found) = find_upward(&dir, DEFAULT_DATA_FILE) {
            return found;
        }
    }

    let fallback = PathBuf::from(DEFAULT_DATA_FILE);
    if fallback.exists() {
        fallback.canonicalize().unwrap_or(fallback)
    } else {
        fallback
    }
}

/// Default key file location, or `None` when no key ships with this
/// installation (the viewer then runs plaintext-only).
pub fn locate_key_file() -> Option<PathBuf> {
    let dir = executable_dir()?;
    find_upward(&dir, DEFAULT_KEY_FILE)
}
