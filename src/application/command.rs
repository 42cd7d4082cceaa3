//! Command abstraction: handlers, their settings and the execution context

use async_trait::async_trait;

use crate::domain::CancellationSignal;
use crate::infrastructure::di::Injectable;

/// Capability: settings that can ask to block until a debugger attaches.
pub trait DebuggerOptIn {
    fn wait_for_debugger(&self) -> bool;
}

/// Typed settings parsed from the arguments following a verb.
pub trait CommandSettings:
    DebuggerOptIn + clap::Args + clap::FromArgMatches + Send + Sync + 'static
{
}

impl<T> CommandSettings for T where
    T: DebuggerOptIn + clap::Args + clap::FromArgMatches + Send + Sync + 'static
{
}

/// Per-invocation context handed to a command handler.
#[derive(Debug, Clone)]
pub struct CommandContext {
    pub verb: String,
    pub app_name: String,
    pub cancellation: CancellationSignal,
}

/// A command handler. Instances are built through the service container.
#[async_trait]
pub trait Command: Injectable {
    type Settings: CommandSettings;

    /// One-line help text for the verb.
    const DESCRIPTION: &'static str;

    /// Run the command; the returned integer becomes the process exit code.
    async fn execute(&self, ctx: &CommandContext, settings: Self::Settings) -> anyhow::Result<i32>;
}
