use std::path::PathBuf;

use self_protect::{DebuggerProbeConfig, GateConfig, ReferenceDigest};

/// What happens when the protection gate refuses an operation: `Block`
/// aborts that operation with a user-visible error, `Terminate` ends
/// the whole process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Enforcement {
    #[default]
    Block,
    Terminate,
}

/// Resolved viewer settings. Built-in defaults, overlaid by the TOML
/// config file when one resolves, overlaid by `LEDGERGUARD_*`
/// environment variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewerConfig {
    /// Explicit ledger path. When unset the default location is
    /// discovered relative to the executable.
    pub data_file: Option<PathBuf>,
    /// Explicit key file path, same discovery fallback as the ledger.
    pub key_file: Option<PathBuf>,
    pub enforcement: Enforcement,
    /// Whether a positive debugger observation blocks the gate. Off by
    /// default; the probes are advisory and only logged.
    pub block_on_debugger: bool,
    /// Hex SHA-256 the running code must match. Environment and
    /// compile-time pins take precedence over this value.
    pub pinned_code_sha256: Option<String>,
    pub probe_api: bool,
    pub probe_control_block: bool,
    pub probe_kernel_query: bool,
}

impl ViewerConfig {
    /// Project the protection-relevant settings into the gate's own
    /// configuration type.
    pub fn gate_config(&self) -> GateConfig {
        let reference_digest = match ReferenceDigest::resolve() {
            ReferenceDigest::Unset => self
                .pinned_code_sha256
                .as_deref()
                .and_then(ReferenceDigest::from_hex)
                .unwrap_or(ReferenceDigest::Unset),
            pinned => pinned,
        };

        GateConfig {
            reference_digest,
            debugger: DebuggerProbeConfig {
                enable_api_probe: self.probe_api,
                enable_control_block_probe: self.probe_control_block,
                enable_kernel_query_probe: self.probe_kernel_query,
            },
            block_on_debugger: self.block_on_debugger,
        }
    }
}
