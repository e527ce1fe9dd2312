use super::types::{Enforcement, ViewerConfig};

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            data_file: None,
            key_file: None,
            enforcement: Enforcement::Block,
            block_on_debugger: false,
            pinned_code_sha256: None,
            probe_api: true,
            probe_control_block: true,
            probe_kernel_query: true,
        }
    }
}
