use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;

use crate::debugger::{observe_debugger, DebuggerObservation, DebuggerProbeConfig};
use crate::integrity::{check_code_integrity, IntegrityCheck, ReferenceDigest, CODE_DIGEST_LEN};

#[derive(Debug, Clone)]
pub struct GateConfig {
    pub reference_digest: ReferenceDigest,
    pub debugger: DebuggerProbeConfig,
    /// When set, a positive debugger observation blocks the gate. Off by
    /// default: the probes are advisory and only the integrity check
    /// decides, while the observation still lands in every report.
    pub block_on_debugger: bool,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            reference_digest: ReferenceDigest::resolve(),
            debugger: DebuggerProbeConfig::default(),
            block_on_debugger: env_bool("LEDGERGUARD_BLOCK_ON_DEBUGGER", false),
        }
    }
}

/// The yes/no authority consulted before any ledger data is touched.
#[derive(Debug)]
pub struct ProtectionGate {
    config: GateConfig,
}

impl ProtectionGate {
    pub fn from_env() -> Self {
        Self::new(GateConfig::default())
    }

    pub fn new(config: GateConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &GateConfig {
        &self.config
    }

    /// Run every check and return the full picture.
    pub fn evaluate(&self) -> GateReport {
        let mut violations = Vec::new();

        let debugger = observe_debugger(&self.config.debugger);
        if self.config.block_on_debugger {
            for signal in &debugger.signals {
                if signal.is_detection() {
                    violations.push(GateViolation::DebuggerDetected {
                        code: signal.code(),
                        detail: signal.to_string(),
                    });
                }
            }
        }

        let integrity = check_code_integrity(&self.config.reference_digest);
        match &integrity {
            IntegrityCheck::Mismatch { expected, observed } => {
                violations.push(GateViolation::CodeTampered {
                    expected: *expected,
                    observed: *observed,
                });
            }
            IntegrityCheck::ProbeFailed { detail } => {
                violations.push(GateViolation::IntegrityUnavailable {
                    detail: detail.clone(),
                });
            }
            IntegrityCheck::NotPinned | IntegrityCheck::Clean => {}
        }

        GateReport {
            debugger,
            integrity,
            violations,
        }
    }

    /// The boolean the load pipeline gates on.
    pub fn verify(&self) -> bool {
        self.evaluate().is_clean()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateViolation {
    DebuggerDetected {
        code: &'static str,
        detail: String,
    },
    CodeTampered {
        expected: [u8; CODE_DIGEST_LEN],
        observed: [u8; CODE_DIGEST_LEN],
    },
    IntegrityUnavailable {
        detail: String,
    },
}

impl GateViolation {
    pub fn code(&self) -> &'static str {
        match self {
            Self::DebuggerDetected { .. } => "debugger_detected",
            Self::CodeTampered { .. } => "code_tampered",
            Self::IntegrityUnavailable { .. } => "integrity_unavailable",
        }
    }

    pub fn detail(&self) -> String {
        match self {
            Self::DebuggerDetected { detail, .. } => detail.clone(),
            Self::CodeTampered { expected, observed } => format!(
                "code digest mismatch: expected={} observed={}",
                BASE64.encode(expected),
                BASE64.encode(observed)
            ),
            Self::IntegrityUnavailable { detail } => {
                format!("code integrity unavailable: {}", detail)
            }
        }
    }
}

#[derive(Debug)]
pub struct GateReport {
    pub debugger: DebuggerObservation,
    pub integrity: IntegrityCheck,
    pub violations: Vec<GateViolation>,
}

impl GateReport {
    pub fn is_clean(&self) -> bool {
        self.violations.is_empty()
    }

    pub fn violation_codes(&self) -> Vec<String> {
        self.violations
            .iter()
            .map(|violation| match violation {
                GateViolation::DebuggerDetected { code, .. } => {
                    format!("{}:{}", violation.code(), code)
                }
                _ => violation.code().to_string(),
            })
            .collect()
    }

    pub fn summary(&self) -> String {
        if self.violations.is_empty() {
            return "ok".to_string();
        }

        self.violations
            .iter()
            .map(GateViolation::detail)
            .collect::<Vec<_>>()
            .join("; ")
    }
}

fn env_bool(name: &str, default: bool) -> bool {
    match std::env::var(name) {
        Ok(raw) => matches!(
            raw.trim().to_ascii_lowercase().as_str(),
            "1" | "true" | "yes" | "enabled" | "on"
        ),
        Err(_) => default,
    }
}
