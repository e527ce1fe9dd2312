use std::path::PathBuf;

use super::types::ViewerConfig;
use super::util::{env_non_empty, parse_bool, parse_enforcement};

impl ViewerConfig {
    pub(super) fn apply_env_overrides(&mut self) {
        if let Some(v) = env_non_empty("LEDGERGUARD_DATA_FILE") {
            self.data_file = Some(PathBuf::from(v));
        }
        if let Some(v) = env_non_empty("LEDGERGUARD_KEY_FILE") {
            self.key_file = Some(PathBuf::from(v));
        }
        if let Some(v) = env_non_empty("LEDGERGUARD_ENFORCEMENT") {
            self.enforcement = parse_enforcement(&v);
        }
        if let Some(v) = env_non_empty("LEDGERGUARD_BLOCK_ON_DEBUGGER") {
            self.block_on_debugger = parse_bool(&v);
        }
        if let Some(v) = env_non_empty("LEDGERGUARD_ENABLE_API_PROBE") {
            self.probe_api = parse_bool(&v);
        }
        if let Some(v) = env_non_empty("LEDGERGUARD_ENABLE_CONTROL_BLOCK_PROBE") {
            self.probe_control_block = parse_bool(&v);
        }
        if let Some(v) = env_non_empty("LEDGERGUARD_ENABLE_KERNEL_QUERY_PROBE") {
            self.probe_kernel_query = parse_bool(&v);
        }
    }
}
