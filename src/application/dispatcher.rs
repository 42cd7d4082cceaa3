//! Command dispatcher: argv → registered command → handler result
//!
//! Matching is by exact, case-sensitive verb. Flag parsing and usage rendering
//! are delegated to clap; handler construction to the service container.

use std::sync::Arc;

use clap::error::ErrorKind;
use tracing::{debug, info, instrument};

use crate::application::command::CommandContext;
use crate::application::debugger::CommandInterceptor;
use crate::application::environment::AppInfo;
use crate::application::registry::CommandRegistry;
use crate::application::{DispatchError, ParseError};
use crate::domain::CancellationSignal;
use crate::infrastructure::di::TypeResolver;

pub struct CommandDispatcher {
    registry: CommandRegistry,
    resolver: Arc<dyn TypeResolver>,
    interceptor: Arc<dyn CommandInterceptor>,
    app: AppInfo,
}

impl CommandDispatcher {
    pub fn new(
        registry: CommandRegistry,
        resolver: Arc<dyn TypeResolver>,
        interceptor: Arc<dyn CommandInterceptor>,
        app: AppInfo,
    ) -> Self {
        Self {
            registry,
            resolver,
            interceptor,
            app,
        }
    }

    pub fn registry(&self) -> &CommandRegistry {
        &self.registry
    }

    pub fn app(&self) -> &AppInfo {
        &self.app
    }

    /// The clap command tree: one subcommand per registered verb.
    pub fn command(&self) -> clap::Command {
        let root = clap::Command::new(self.app.name.clone())
            .version(self.app.version.clone())
            .disable_help_subcommand(true)
            .subcommand_required(true)
            .arg_required_else_help(true);

        self.registry.iter().fold(root, |root, descriptor| {
            let sub = clap::Command::new(descriptor.verb().to_string())
                .about(descriptor.description());
            root.subcommand(descriptor.entry.augment(sub))
        })
    }

    /// Dispatch `args` (program name excluded) and return the handler's code.
    #[instrument(level = "debug", skip_all, fields(app = %self.app.name))]
    pub async fn run(
        &self,
        args: &[String],
        cancellation: &CancellationSignal,
    ) -> Result<i32, DispatchError> {
        info!("{} {}", self.app.name, self.app.version);

        let Some(first) = args.first() else {
            self.print_usage_error(ErrorKind::MissingSubcommand, "no command specified");
            return Err(ParseError::MissingCommand.into());
        };
        // A lone "-" is a verb candidate, not a flag.
        let is_verb = first == "-" || !first.starts_with('-');
        if is_verb && self.registry.get(first).is_none() {
            let message = format!("no matching command: '{}'", first);
            self.print_usage_error(ErrorKind::InvalidSubcommand, &message);
            return Err(ParseError::UnknownCommand {
                verb: first.clone(),
            }
            .into());
        }

        let argv = std::iter::once(self.app.name.clone()).chain(args.iter().cloned());
        let matches = match self.command().try_get_matches_from(argv) {
            Ok(matches) => matches,
            Err(e) => {
                let _ = e.print();
                return match e.kind() {
                    ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => Ok(0),
                    _ => Err(ParseError::InvalidArguments {
                        message: e.to_string().trim().to_string(),
                    }
                    .into()),
                };
            }
        };

        let Some((verb, sub_matches)) = matches.subcommand() else {
            return Err(ParseError::MissingCommand.into());
        };
        let descriptor = self.registry.get(verb).ok_or(ParseError::UnknownCommand {
            verb: verb.to_string(),
        })?;
        debug!("matched command '{}' -> {}", verb, descriptor.handler_key());

        let ctx = CommandContext {
            verb: verb.to_string(),
            app_name: self.app.name.clone(),
            cancellation: cancellation.clone(),
        };
        let code = descriptor
            .entry
            .invoke(
                sub_matches,
                &ctx,
                self.interceptor.as_ref(),
                self.resolver.as_ref(),
            )
            .await?;

        info!("command '{}' returned {}", verb, code);
        Ok(code)
    }

    fn print_usage_error(&self, kind: ErrorKind, message: &str) {
        let _ = self.command().error(kind, message).print();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::command::{Command, DebuggerOptIn};
    use crate::infrastructure::di::{Injectable, ServiceCollection};
    use crate::infrastructure::InfraError;
    use async_trait::async_trait;

    struct NoWait;

    impl CommandInterceptor for NoWait {
        fn intercept(&self, _: &CommandContext, _: &dyn DebuggerOptIn) {}
    }

    #[derive(clap::Args, Debug)]
    struct EchoSettings {
        #[arg(short, long, default_value = "")]
        text: String,
    }

    impl DebuggerOptIn for EchoSettings {
        fn wait_for_debugger(&self) -> bool {
            false
        }
    }

    struct Echo;

    impl Injectable for Echo {
        fn inject(_: &dyn TypeResolver) -> Result<Self, InfraError> {
            Ok(Echo)
        }
    }

    #[async_trait]
    impl Command for Echo {
        type Settings = EchoSettings;
        const DESCRIPTION: &'static str = "returns the length of its text";

        async fn execute(&self, _: &CommandContext, settings: EchoSettings) -> anyhow::Result<i32> {
            Ok(settings.text.len() as i32)
        }
    }

    fn dispatcher() -> CommandDispatcher {
        let mut registry = CommandRegistry::new();
        registry.add_command::<Echo>("echo").unwrap();
        let mut services = ServiceCollection::new();
        registry.register_handlers(&mut services);
        CommandDispatcher::new(
            registry,
            Arc::new(services.into_container()),
            Arc::new(NoWait),
            AppInfo::new("testapp", "1.2.3"),
        )
    }

    fn args(tokens: &[&str]) -> Vec<String> {
        tokens.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn verify_command_tree() {
        dispatcher().command().debug_assert();
    }

    #[tokio::test]
    async fn given_registered_verb_when_running_then_returns_handler_code() {
        let code = dispatcher()
            .run(&args(&["echo", "--text", "abcd"]), &CancellationSignal::new())
            .await
            .unwrap();
        assert_eq!(code, 4);
    }

    #[tokio::test]
    async fn given_wrong_case_verb_when_running_then_unknown_command() {
        let err = dispatcher()
            .run(&args(&["ECHO"]), &CancellationSignal::new())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DispatchError::Parse(ParseError::UnknownCommand { verb }) if verb == "ECHO"
        ));
    }

    #[tokio::test]
    async fn given_version_flag_when_running_then_succeeds() {
        let code = dispatcher()
            .run(&args(&["--version"]), &CancellationSignal::new())
            .await
            .unwrap();
        assert_eq!(code, 0);
    }

    #[tokio::test]
    async fn given_unregistered_handler_when_running_then_construction_error() {
        let mut registry = CommandRegistry::new();
        registry.add_command::<Echo>("echo").unwrap();
        let dispatcher = CommandDispatcher::new(
            registry,
            Arc::new(ServiceCollection::new().into_container()),
            Arc::new(NoWait),
            AppInfo::new("testapp", "1.2.3"),
        );

        let err = dispatcher
            .run(&args(&["echo"]), &CancellationSignal::new())
            .await
            .unwrap_err();
        assert!(matches!(err, DispatchError::Construction(InfraError::Unresolved { .. })));
    }
}
