use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::Deserialize;

use super::paths::resolve_config_path;
use super::types::ViewerConfig;
use super::util::{non_empty, parse_enforcement};

impl ViewerConfig {
    pub(super) fn apply_file_config(&mut self) -> Result<bool> {
        let Some(path) = resolve_config_path()? else {
            return Ok(false);
        };

        let raw = std::fs::read_to_string(&path)
            .with_context(|| format!("failed reading config file {}", path.display()))?;
        let file_cfg: FileConfig = toml::from_str(&raw)
            .with_context(|| format!("failed parsing TOML config {}", path.display()))?;

        self.apply_file_ledger(file_cfg.ledger);
        self.apply_file_vault(file_cfg.vault);
        self.apply_file_protection(file_cfg.protection);

        Ok(true)
    }

    fn apply_file_ledger(&mut self, ledger: Option<FileLedgerConfig>) {
        let Some(ledger) = ledger else {
            return;
        };
        if let Some(v) = non_empty(ledger.data_file) {
            self.data_file = Some(PathBuf::from(v));
        }
    }

    fn apply_file_vault(&mut self, vault: Option<FileVaultConfig>) {
        let Some(vault) = vault else {
            return;
        };
        if let Some(v) = non_empty(vault.key_file) {
            self.key_file = Some(PathBuf::from(v));
        }
    }

    fn apply_file_protection(&mut self, protection: Option<FileProtectionConfig>) {
        let Some(protection) = protection else {
            return;
        };

        if let Some(v) = non_empty(protection.mode) {
            self.enforcement = parse_enforcement(&v);
        }
        if let Some(v) = protection.block_on_debugger {
            self.block_on_debugger = v;
        }
        if let Some(v) = non_empty(protection.pinned_code_sha256) {
            self.pinned_code_sha256 = Some(v);
        }

        let Some(probes) = protection.probes else {
            return;
        };
        if let Some(v) = probes.api {
            self.probe_api = v;
        }
        if let Some(v) = probes.control_block {
            self.probe_control_block = v;
        }
        if let Some(v) = probes.kernel_query {
            self.probe_kernel_query = v;
        }
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
struct FileConfig {
    #[serde(default)]
    ledger: Option<FileLedgerConfig>,
    #[serde(default)]
    vault: Option<FileVaultConfig>,
    #[serde(default)]
    protection: Option<FileProtectionConfig>,
}

#[derive(Debug, Clone, Deserialize, Default)]
struct FileLedgerConfig {
    #[serde(default)]
    data_file: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Default)]
struct FileVaultConfig {
    #[serde(default)]
    key_file: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Default)]
struct FileProtectionConfig {
    #[serde(default)]
    mode: Option<String>,
    #[serde(default)]
    block_on_debugger: Option<bool>,
    #[serde(default)]
    pinned_code_sha256: Option<String>,
    #[serde(default)]
    probes: Option<FileProbesConfig>,
}

#[derive(Debug, Clone, Deserialize, Default)]
struct FileProbesConfig {
    #[serde(default)]
    api: Option<bool>,
    #[serde(default)]
    control_block: Option<bool>,
    #[serde(default)]
    kernel_query: Option<bool>,
}
