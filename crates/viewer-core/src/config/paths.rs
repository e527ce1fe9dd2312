use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::discovery;

const CWD_CONFIG_FILE: &str = "ledgerguard.toml";

/// The config file named by `LEDGERGUARD_CONFIG` wins; otherwise the
/// conventional locations are probed: `config/ledgerguard.toml` upward
/// from the executable, then `ledgerguard.toml` in the working
/// directory. Having no config file at all is not an error.
pub(super) fn resolve_config_path() -> Result<Option<PathBuf>> {
    if let Ok(raw) = std::env::var("LEDGERGUARD_CONFIG") {
        let trimmed = raw.trim();
        if !trimmed.is_empty() {
            let path = PathBuf::from(trimmed);
            if !path.exists() {
                anyhow::bail!(
                    "configured LEDGERGUARD_CONFIG does not exist: {}",
                    path.display()
                );
            }
            return Ok(Some(path));
        }
    }

    if let Some(dir) = discovery::executable_dir() {
        if let Some(found) = discovery::find_upward(&dir, discovery::DEFAULT_CONFIG_FILE) {
            return Ok(Some(found));
        }
    }

    let cwd_candidate = Path::new(CWD_CONFIG_FILE);
    if cwd_candidate.exists() {
        return Ok(Some(cwd_candidate.to_path_buf()));
    }

    Ok(None)
}
