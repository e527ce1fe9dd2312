use std::fmt;

/// Which debugger probes to run. All probes are best effort: a probe
/// that cannot run on this platform simply contributes nothing.
#[derive(Debug, Clone)]
pub struct DebuggerProbeConfig {
    pub enable_api_probe: bool,
    pub enable_control_block_probe: bool,
    pub enable_kernel_query_probe: bool,
}

impl Default for DebuggerProbeConfig {
    fn default() -> Self {
        Self {
            enable_api_probe: env_bool("LEDGERGUARD_ENABLE_API_PROBE", true),
            enable_control_block_probe: env_bool("LEDGERGUARD_ENABLE_CONTROL_BLOCK_PROBE", true),
            enable_kernel_query_probe: env_bool("LEDGERGUARD_ENABLE_KERNEL_QUERY_PROBE", true),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DebuggerSignal {
    /// The platform debugger API reports an attached debugger.
    ApiReported { detail: String },
    /// The process control block's debug flag is set.
    ControlBlockFlagSet,
    /// The kernel reports an active debug port for this process.
    DebugPortActive,
    /// A probe could not run to completion. Recorded for diagnostics but
    /// never counted as a detection.
    ProbeError { probe: &'static str, detail: String },
}

impl DebuggerSignal {
    pub fn code(&self) -> &'static str {
        match self {
            Self::ApiReported { .. } => "api_reported",
            Self::ControlBlockFlagSet => "control_block_flag",
            Self::DebugPortActive => "debug_port_active",
            Self::ProbeError { .. } => "probe_error",
        }
    }

    pub fn is_detection(&self) -> bool {
        !matches!(self, Self::ProbeError { .. })
    }
}

impl fmt::Display for DebuggerSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ApiReported { detail } => {
                write!(f, "debugger API reports attachment ({})", detail)
            }
            Self::ControlBlockFlagSet => {
                write!(f, "process control block debug flag is set")
            }
            Self::DebugPortActive => write!(f, "kernel debug port is active"),
            Self::ProbeError { probe, detail } => {
                write!(f, "debugger probe '{}' failed: {}", probe, detail)
            }
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DebuggerObservation {
    pub signals: Vec<DebuggerSignal>,
}

impl DebuggerObservation {
    /// True when at least one probe positively saw a debugger. Probe
    /// errors alone never flip this.
    pub fn detected(&self) -> bool {
        self.signals.iter().any(DebuggerSignal::is_detection)
    }

    pub fn signal_codes(&self) -> Vec<&'static str> {
        self.signals.iter().map(DebuggerSignal::code).collect()
    }
}

/// Run every enabled probe and collect what they saw.
pub fn observe_debugger(config: &DebuggerProbeConfig) -> DebuggerObservation {
    let mut signals = Vec::new();

    if config.enable_api_probe {
        if let Some(signal) = api_probe() {
            signals.push(signal);
        }
    }
    if config.enable_control_block_probe {
        if let Some(signal) = control_block_probe() {
            signals.push(signal);
        }
    }
    if config.enable_kernel_query_probe {
        if let Some(signal) = kernel_query_probe() {
            signals.push(signal);
        }
    }

    DebuggerObservation { signals }
}

/// Ask the operating system directly whether a debugger is attached.
#[cfg(windows)]
pub fn api_probe() -> Option<DebuggerSignal> {
    // SAFETY: IsDebuggerPresent takes no arguments and only reads a flag
    // belonging to the current process.
    let present = unsafe { windows_sys::Win32::System::Diagnostics::Debug::IsDebuggerPresent() };
    if present != 0 {
        return Some(DebuggerSignal::ApiReported {
            detail: "IsDebuggerPresent".to_string(),
        });
    }
    None
}

/// Ask the operating system directly whether a debugger is attached.
#[cfg(target_os = "linux")]
pub fn api_probe() -> Option<DebuggerSignal> {
    match std::fs::read_to_string("/proc/self/status") {
        Ok(status) => {
            let tracer_pid = parse_tracer_pid(&status)?;
            if tracer_pid > 0 {
                return Some(DebuggerSignal::ApiReported {
                    detail: format!("TracerPid {}", tracer_pid),
                });
            }
            None
        }
        Err(err) => Some(DebuggerSignal::ProbeError {
            probe: "tracer_pid",
            detail: err.to_string(),
        }),
    }
}

#[cfg(not(any(windows, target_os = "linux")))]
pub fn api_probe() -> Option<DebuggerSignal> {
    None
}

#[cfg(target_os = "linux")]
pub fn parse_tracer_pid(status: &str) -> Option<u32> {
    for line in status.lines() {
        let Some(raw) = line.strip_prefix("TracerPid:") else {
            continue;
        };
        let value = raw.trim();
        if value.is_empty() {
            return None;
        }
        return value.parse::<u32>().ok();
    }
    None
}

/// Read the debug flag straight out of the process control block,
/// bypassing the API the OS offers for the same question.
#[cfg(all(windows, any(target_arch = "x86_64", target_arch = "x86")))]
pub fn control_block_probe() -> Option<DebuggerSignal> {
    if read_being_debugged_flag() != 0 {
        return Some(DebuggerSignal::ControlBlockFlagSet);
    }
    None
}

#[cfg(not(all(windows, any(target_arch = "x86_64", target_arch = "x86"))))]
pub fn control_block_probe() -> Option<DebuggerSignal> {
    None
}

#[cfg(all(windows, target_arch = "x86_64"))]
fn read_being_debugged_flag() -> u8 {
    let peb: *const u8;
    // SAFETY: on x86_64 Windows gs:[0x60] always holds the current
    // process environment block pointer; the BeingDebugged byte sits at
    // offset 2, well inside the mapped structure.
    unsafe {
        core::arch::asm!("mov {}, gs:[0x60]", out(reg) peb, options(nostack, readonly));
        *peb.add(2)
    }
}

#[cfg(all(windows, target_arch = "x86"))]
fn read_being_debugged_flag() -> u8 {
    let peb: *const u8;
    // SAFETY: on x86 Windows fs:[0x30] always holds the current process
    // environment block pointer; the BeingDebugged byte sits at offset 2.
    unsafe {
        core::arch::asm!("mov {}, fs:[0x30]", out(reg) peb, options(nostack, readonly));
        *peb.add(2)
    }
}

/// Query the kernel for this process's debug port through the native
/// API. The entry point is resolved at runtime so the import table never
/// names it.
#[cfg(windows)]
pub fn kernel_query_probe() -> Option<DebuggerSignal> {
    use windows_sys::Win32::Foundation::{HANDLE, NTSTATUS};
    use windows_sys::Win32::System::LibraryLoader::{GetModuleHandleA, GetProcAddress};
    use windows_sys::Win32::System::Threading::GetCurrentProcess;

    const PROCESS_DEBUG_PORT: u32 = 7;

    type NtQueryInformationProcessFn = unsafe extern "system" fn(
        process: HANDLE,
        class: u32,
        info: *mut core::ffi::c_void,
        info_len: u32,
        return_len: *mut u32,
    ) -> NTSTATUS;

    // SAFETY: ntdll.dll is mapped into every Windows process; a null
    // result is handled below.
    let ntdll = unsafe { GetModuleHandleA(b"ntdll.dll\0".as_ptr()) };
    if ntdll.is_null() {
        return Some(DebuggerSignal::ProbeError {
            probe: "debug_port",
            detail: "ntdll.dll not mapped".to_string(),
        });
    }

    // SAFETY: the module handle is valid and the name is NUL terminated.
    let Some(entry) = (unsafe { GetProcAddress(ntdll, b"NtQueryInformationProcess\0".as_ptr()) })
    else {
        return Some(DebuggerSignal::ProbeError {
            probe: "debug_port",
            detail: "NtQueryInformationProcess not exported".to_string(),
        });
    };
    // SAFETY: the export has the documented five-argument native API
    // signature on every supported Windows version.
    let query: NtQueryInformationProcessFn = unsafe { core::mem::transmute(entry) };

    let mut debug_port: usize = 0;
    let mut return_len: u32 = 0;
    // SAFETY: ProcessDebugPort writes one pointer-sized value into the
    // buffer we hand it, and the pseudo handle needs no closing.
    let status = unsafe {
        query(
            GetCurrentProcess(),
            PROCESS_DEBUG_PORT,
            (&mut debug_port as *mut usize).cast(),
            std::mem::size_of::<usize>() as u32,
            &mut return_len,
        )
    };
    if status < 0 {
        return Some(DebuggerSignal::ProbeError {
            probe: "debug_port",
            detail: format!("NtQueryInformationProcess status {:#010x}", status),
        });
    }
    if debug_port != 0 {
        return Some(DebuggerSignal::DebugPortActive);
    }
    None
}

#[cfg(not(windows))]
pub fn kernel_query_probe() -> Option<DebuggerSignal> {
    None
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
