//! Domain layer: execution outcome, cancellation and exit-code state
//!
//! This layer is independent of external concerns (no I/O, no CLI, no config loading).

pub mod cancellation;
pub mod environment;
pub mod error;
pub mod exit;
pub mod outcome;

pub use cancellation::CancellationSignal;
pub use environment::EnvironmentName;
pub use error::DomainError;
pub use exit::ExitCodeCell;
pub use outcome::ExecutionOutcome;
