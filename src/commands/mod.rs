//! Built-in commands

pub mod hello;
pub mod settings;

pub use hello::{HelloCommand, HelloSettings};
pub use settings::SharedSettings;

use crate::application::{ApplicationResult, CommandRegistry};

/// Register every built-in command.
pub fn register_commands(registry: &mut CommandRegistry) -> ApplicationResult<()> {
    registry.add_command::<HelloCommand>("hello")?;
    Ok(())
}
