mod debugger;
mod gate;
mod integrity;

pub use debugger::{
    api_probe, control_block_probe, kernel_query_probe, observe_debugger, DebuggerObservation,
    DebuggerProbeConfig, DebuggerSignal,
};
pub use gate::{GateConfig, GateReport, GateViolation, ProtectionGate};
pub use integrity::{
    check_code_integrity, compute_code_digest, digest_code_region, locate_code_region,
    measure_executable_file, normalize_digest_hex, CodeRegion, IntegrityCheck, ReferenceDigest,
    CODE_DIGEST_LEN,
};

#[cfg(target_os = "linux")]
pub use debugger::parse_tracer_pid;
