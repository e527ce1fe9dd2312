use anyhow::Result;

use super::types::ViewerConfig;

impl ViewerConfig {
    /// Layered load: built-in defaults, then the TOML config file if
    /// one resolves, then `LEDGERGUARD_*` environment overrides.
    pub fn load() -> Result<Self> {
        let mut cfg = Self::default();
        cfg.apply_file_config()?;
        cfg.apply_env_overrides();
        Ok(cfg)
    }
}
