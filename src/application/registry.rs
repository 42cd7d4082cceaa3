//! Command registry: verb → handler type
//!
//! Populated once during startup, then moved into the dispatcher and never
//! mutated again.

use std::any::type_name;
use std::collections::BTreeMap;
use std::marker::PhantomData;
use std::sync::Arc;

use async_trait::async_trait;
use clap::{ArgMatches, FromArgMatches};
use tracing::debug;

use crate::application::command::{Command, CommandContext};
use crate::application::debugger::CommandInterceptor;
use crate::application::{ApplicationError, ApplicationResult, DispatchError, ParseError};
use crate::infrastructure::di::{
    Constructor, Injectable, ResolverExt, ServiceKey, Shared, TypeRegistrar, TypeResolver,
};
use crate::infrastructure::InfraError;

/// Type-erased view of one registered command type.
#[async_trait]
pub(crate) trait CommandEntry: Send + Sync {
    /// Add the command's flags to its clap subcommand.
    fn augment(&self, cmd: clap::Command) -> clap::Command;

    fn service_key(&self) -> ServiceKey;

    fn constructor(&self) -> Constructor;

    /// Parse settings, run the interceptor, build the handler and execute it.
    async fn invoke(
        &self,
        matches: &ArgMatches,
        ctx: &CommandContext,
        interceptor: &dyn CommandInterceptor,
        resolver: &dyn TypeResolver,
    ) -> Result<i32, DispatchError>;
}

struct TypedEntry<C>(PhantomData<fn() -> C>);

#[async_trait]
impl<C: Command> CommandEntry for TypedEntry<C> {
    fn augment(&self, cmd: clap::Command) -> clap::Command {
        <C::Settings as clap::Args>::augment_args(cmd)
    }

    fn service_key(&self) -> ServiceKey {
        ServiceKey::of::<C>()
    }

    fn constructor(&self) -> Constructor {
        Arc::new(|resolver: &dyn TypeResolver| {
            <C as Injectable>::inject(resolver).map(|c| Arc::new(c) as Shared)
        })
    }

    async fn invoke(
        &self,
        matches: &ArgMatches,
        ctx: &CommandContext,
        interceptor: &dyn CommandInterceptor,
        resolver: &dyn TypeResolver,
    ) -> Result<i32, DispatchError> {
        let settings = C::Settings::from_arg_matches(matches).map_err(|e| {
            ParseError::InvalidArguments {
                message: e.to_string().trim().to_string(),
            }
        })?;

        interceptor.intercept(ctx, &settings);

        let handler = resolver
            .resolve_typed::<C>()
            .map_err(DispatchError::Construction)?
            .ok_or(DispatchError::Construction(InfraError::Unresolved {
                service: type_name::<C>(),
            }))?;
        debug!("resolved handler {}", type_name::<C>());

        handler
            .execute(ctx, settings)
            .await
            .map_err(DispatchError::from_handler)
    }
}

/// A registered verb and the handler type behind it.
#[derive(Clone)]
pub struct CommandDescriptor {
    verb: String,
    description: &'static str,
    pub(crate) entry: Arc<dyn CommandEntry>,
}

impl CommandDescriptor {
    pub fn verb(&self) -> &str {
        &self.verb
    }

    pub fn description(&self) -> &'static str {
        self.description
    }

    pub fn handler_key(&self) -> ServiceKey {
        self.entry.service_key()
    }
}

impl std::fmt::Debug for CommandDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandDescriptor")
            .field("verb", &self.verb)
            .field("handler", &self.handler_key().name())
            .finish()
    }
}

/// Verb → command mapping. Verbs are unique and case-sensitive.
#[derive(Default, Debug)]
pub struct CommandRegistry {
    commands: BTreeMap<String, CommandDescriptor>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register handler type `C` under `verb`.
    pub fn add_command<C: Command>(&mut self, verb: &str) -> ApplicationResult<&mut Self> {
        if verb.is_empty() || verb.starts_with('-') || verb.chars().any(char::is_whitespace) {
            return Err(ApplicationError::InvalidVerb(verb.to_string()));
        }
        if self.commands.contains_key(verb) {
            return Err(ApplicationError::DuplicateCommand(verb.to_string()));
        }
        debug!("add command '{}' -> {}", verb, type_name::<C>());
        self.commands.insert(
            verb.to_string(),
            CommandDescriptor {
                verb: verb.to_string(),
                description: C::DESCRIPTION,
                entry: Arc::new(TypedEntry::<C>(PhantomData)),
            },
        );
        Ok(self)
    }

    pub fn get(&self, verb: &str) -> Option<&CommandDescriptor> {
        self.commands.get(verb)
    }

    pub fn verbs(&self) -> impl Iterator<Item = &str> {
        self.commands.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &CommandDescriptor> {
        self.commands.values()
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Make every handler type resolvable through `registrar`.
    pub fn register_handlers(&self, registrar: &mut dyn TypeRegistrar) {
        for descriptor in self.commands.values() {
            registrar.register(descriptor.entry.service_key(), descriptor.entry.constructor());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::command::DebuggerOptIn;
    use crate::infrastructure::di::ServiceCollection;

    #[derive(clap::Args, Debug)]
    struct NoSettings {}

    impl DebuggerOptIn for NoSettings {
        fn wait_for_debugger(&self) -> bool {
            false
        }
    }

    struct Noop;

    impl Injectable for Noop {
        fn inject(_: &dyn TypeResolver) -> Result<Self, InfraError> {
            Ok(Noop)
        }
    }

    #[async_trait]
    impl Command for Noop {
        type Settings = NoSettings;
        const DESCRIPTION: &'static str = "does nothing";

        async fn execute(&self, _: &CommandContext, _: NoSettings) -> anyhow::Result<i32> {
            Ok(0)
        }
    }

    #[test]
    fn given_registered_verb_when_getting_then_is_case_sensitive() {
        let mut registry = CommandRegistry::new();
        registry.add_command::<Noop>("noop").unwrap();

        assert!(registry.get("noop").is_some());
        assert!(registry.get("NOOP").is_none());
        assert_eq!(registry.get("noop").unwrap().description(), "does nothing");
    }

    #[test]
    fn given_duplicate_verb_when_adding_then_fails() {
        let mut registry = CommandRegistry::new();
        registry.add_command::<Noop>("noop").unwrap();
        let err = registry.add_command::<Noop>("noop").unwrap_err();
        assert!(matches!(err, ApplicationError::DuplicateCommand(v) if v == "noop"));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn given_invalid_verb_when_adding_then_fails() {
        let mut registry = CommandRegistry::new();
        for verb in ["", "-x", "two words"] {
            assert!(matches!(
                registry.add_command::<Noop>(verb),
                Err(ApplicationError::InvalidVerb(_))
            ));
        }
        assert!(registry.is_empty());
    }

    #[test]
    fn given_registry_when_registering_handlers_then_container_resolves_them() {
        let mut registry = CommandRegistry::new();
        registry
            .add_command::<Noop>("noop")
            .unwrap()
            .add_command::<Noop>("other")
            .unwrap();
        let mut services = ServiceCollection::new();
        registry.register_handlers(&mut services);

        let container = services.into_container();
        assert!(container.require::<Noop>().is_ok());
        assert_eq!(registry.verbs().collect::<Vec<_>>(), vec!["noop", "other"]);
    }
}
