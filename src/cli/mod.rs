//! CLI layer: startup errors and terminal output

pub mod error;
pub mod output;

pub use error::{CliError, CliResult};
