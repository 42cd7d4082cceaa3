//! Application layer: command hosting use cases
//!
//! Registry, dispatcher and lifecycle runner. Depends on the domain types and
//! on the infrastructure traits (service container, host, process probes).

pub mod command;
pub mod debugger;
pub mod dispatcher;
pub mod environment;
pub mod error;
pub mod lifecycle;
pub mod registry;

pub use command::{Command, CommandContext, CommandSettings, DebuggerOptIn};
pub use debugger::{CommandInterceptor, WaitForDebuggerInterceptor, DEFAULT_POLL_INTERVAL};
pub use dispatcher::CommandDispatcher;
pub use environment::{AppInfo, EnvironmentResolver};
pub use error::{ApplicationError, ApplicationResult, DispatchError, ParseError};
pub use lifecycle::LifecycleRunner;
pub use registry::{CommandDescriptor, CommandRegistry};
