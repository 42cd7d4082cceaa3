//! Pre-execution interception: optional wait for a debugger
//!
//! Waiting has no timeout and no cancellation. It is a debugging aid, opted into per
//! invocation with the hidden `--wait-for-debugger` flag, and blocks the calling thread
//! until a debugger attaches or the process is killed.

use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use crate::application::command::{CommandContext, DebuggerOptIn};
use crate::infrastructure::traits::DebuggerProbe;

/// Poll cadence while waiting for a debugger.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(400);

/// Runs after settings are parsed and before the handler is built.
pub trait CommandInterceptor: Send + Sync {
    fn intercept(&self, ctx: &CommandContext, settings: &dyn DebuggerOptIn);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitState {
    Idle,
    Polling,
    Released,
}

impl WaitState {
    fn from_u8(value: u8) -> Self {
        match value {
            1 => WaitState::Polling,
            2 => WaitState::Released,
            _ => WaitState::Idle,
        }
    }
}

/// Blocks until [`DebuggerProbe::is_attached`] reports true, when the settings opt in.
pub struct WaitForDebuggerInterceptor {
    probe: Arc<dyn DebuggerProbe>,
    poll_interval: Duration,
    state: AtomicU8,
}

impl WaitForDebuggerInterceptor {
    pub fn new(probe: Arc<dyn DebuggerProbe>) -> Self {
        Self::with_poll_interval(probe, DEFAULT_POLL_INTERVAL)
    }

    pub fn with_poll_interval(probe: Arc<dyn DebuggerProbe>, poll_interval: Duration) -> Self {
        Self {
            probe,
            poll_interval,
            state: AtomicU8::new(WaitState::Idle as u8),
        }
    }

    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    pub fn state(&self) -> WaitState {
        WaitState::from_u8(self.state.load(Ordering::SeqCst))
    }

    fn set_state(&self, state: WaitState) {
        self.state.store(state as u8, Ordering::SeqCst);
    }
}

impl CommandInterceptor for WaitForDebuggerInterceptor {
    fn intercept(&self, ctx: &CommandContext, settings: &dyn DebuggerOptIn) {
        if !settings.wait_for_debugger() {
            return;
        }
        self.set_state(WaitState::Polling);
        println!("Waiting for debugger to attach...");
        warn!(verb = %ctx.verb, "blocking until a debugger attaches");

        let mut polls: u64 = 0;
        while !self.probe.is_attached() {
            std::thread::sleep(self.poll_interval);
            polls += 1;
        }

        self.set_state(WaitState::Released);
        info!(polls, "debugger attached");
    }
}
