//! Infrastructure-level errors (container and host concerns)

use thiserror::Error;

/// Infrastructure errors cover service resolution and construction.
#[derive(Error, Debug)]
pub enum InfraError {
    #[error("service not registered: {service}")]
    Unresolved { service: &'static str },

    #[error("cannot construct service {service}")]
    Construction {
        service: &'static str,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("registered service does not have the requested type: {service}")]
    TypeMismatch { service: &'static str },
}

impl InfraError {
    /// Wrap a constructor failure for `service`.
    pub fn construction(
        service: &'static str,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        Self::Construction {
            service,
            source: source.into(),
        }
    }
}

/// Result type for infrastructure layer operations.
pub type InfraResult<T> = Result<T, InfraError>;
