//! Flags shared by every command

use clap::Args;

use crate::application::DebuggerOptIn;

/// Flatten into a command's settings to get the shared flags.
#[derive(Args, Debug, Clone, Default, PartialEq, Eq)]
pub struct SharedSettings {
    /// Block until a debugger attaches before running the command
    #[arg(short = 'w', long = "wait-for-debugger", hide = true)]
    pub wait_for_debugger: bool,
}

impl DebuggerOptIn for SharedSettings {
    fn wait_for_debugger(&self) -> bool {
        self.wait_for_debugger
    }
}
