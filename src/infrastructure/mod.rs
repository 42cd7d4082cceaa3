//! Infrastructure layer: I/O implementations, DI container and generic host
//!
//! This layer implements I/O boundary traits and wires up services.

pub mod di;
pub mod error;
pub mod host;
pub mod traits;

pub use error::{InfraError, InfraResult};
