//! Sample command: `hello [-m <MESSAGE>]`

use std::sync::Arc;

use async_trait::async_trait;
use clap::Args;
use tracing::info;

use crate::application::{AppInfo, Command, CommandContext, DebuggerOptIn};
use crate::commands::settings::SharedSettings;
use crate::exitcode;
use crate::infrastructure::di::{Injectable, ResolverExt, TypeResolver};
use crate::infrastructure::InfraError;

#[derive(Args, Debug, Clone, Default, PartialEq, Eq)]
pub struct HelloSettings {
    #[command(flatten)]
    pub shared: SharedSettings,

    /// Text appended to the greeting
    #[arg(short, long, value_name = "MESSAGE", default_value = "")]
    pub message: String,
}

impl DebuggerOptIn for HelloSettings {
    fn wait_for_debugger(&self) -> bool {
        self.shared.wait_for_debugger()
    }
}

pub struct HelloCommand {
    app: Arc<AppInfo>,
}

impl HelloCommand {
    pub fn greeting(message: &str) -> String {
        format!("Hello World! {}", message)
    }
}

impl Injectable for HelloCommand {
    fn inject(resolver: &dyn TypeResolver) -> Result<Self, InfraError> {
        Ok(Self {
            app: resolver.require::<AppInfo>()?,
        })
    }
}

#[async_trait]
impl Command for HelloCommand {
    type Settings = HelloSettings;
    const DESCRIPTION: &'static str = "Print a greeting";

    async fn execute(&self, ctx: &CommandContext, settings: HelloSettings) -> anyhow::Result<i32> {
        info!(app = %self.app.name, verb = %ctx.verb, "{}", Self::greeting(&settings.message));
        Ok(exitcode::OK)
    }
}
