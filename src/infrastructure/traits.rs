//! I/O boundary traits for testability
//!
//! These traits abstract process-level state (environment variables, argv,
//! debugger attachment), allowing services to be tested with fake implementations.

/// Process environment abstraction.
pub trait EnvSource: Send + Sync {
    /// Value of an environment variable, `None` if unset or not valid UTF-8.
    fn var(&self, key: &str) -> Option<String>;

    /// Command-line arguments without the program name.
    fn args(&self) -> Vec<String>;
}

/// Answers "is a debugger attached to this process right now".
pub trait DebuggerProbe: Send + Sync {
    fn is_attached(&self) -> bool;
}

// ============================================================
// REAL IMPLEMENTATIONS
// ============================================================

/// Reads the real process environment.
#[derive(Debug, Default, Clone, Copy)]
pub struct RealEnv;

impl EnvSource for RealEnv {
    fn var(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }

    fn args(&self) -> Vec<String> {
        std::env::args().skip(1).collect()
    }
}

/// Detects a tracer via `/proc/self/status` on Linux.
///
/// On other platforms no debugger is ever reported.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcDebuggerProbe;

impl DebuggerProbe for ProcDebuggerProbe {
    #[cfg(target_os = "linux")]
    fn is_attached(&self) -> bool {
        std::fs::read_to_string("/proc/self/status")
            .ok()
            .and_then(|status| tracer_pid(&status))
            .is_some_and(|pid| pid != 0)
    }

    #[cfg(not(target_os = "linux"))]
    fn is_attached(&self) -> bool {
        false
    }
}

/// Extract the `TracerPid` field from a `/proc/<pid>/status` document.
pub fn tracer_pid(status: &str) -> Option<u32> {
    status
        .lines()
        .find_map(|line| line.strip_prefix("TracerPid:"))
        .and_then(|value| value.trim().parse().ok())
}
