//! Application-level errors (wraps domain and infrastructure errors)

use thiserror::Error;

use crate::domain::DomainError;
use crate::infrastructure::InfraError;

/// Application errors raised while configuring or composing the application.
#[derive(Error, Debug)]
pub enum ApplicationError {
    #[error("{0}")]
    Domain(#[from] DomainError),

    #[error("{0}")]
    Infra(#[from] InfraError),

    #[error("missing environment variable {primary} or {fallback}")]
    MissingEnvironment {
        primary: &'static str,
        fallback: &'static str,
    },

    #[error("config error: {message}")]
    Config { message: String },

    #[error("command already registered: {0}")]
    DuplicateCommand(String),

    #[error("invalid command verb: '{0}'")]
    InvalidVerb(String),
}

/// Result type for application layer operations.
pub type ApplicationResult<T> = Result<T, ApplicationError>;

/// The command line did not describe a runnable command.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("no command specified")]
    MissingCommand,

    #[error("no matching command: '{verb}'")]
    UnknownCommand { verb: String },

    #[error("{message}")]
    InvalidArguments { message: String },
}

/// Failure of a single dispatch, as seen by the lifecycle runner.
#[derive(Error, Debug)]
pub enum DispatchError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("operation was cancelled")]
    Cancelled,

    #[error("cannot construct command handler")]
    Construction(#[source] InfraError),

    #[error("{} concurrent failures", .0.len())]
    Batch(Vec<DispatchError>),

    #[error(transparent)]
    Fault(anyhow::Error),
}

impl DispatchError {
    /// Classify an error returned by a command handler.
    ///
    /// A wrapped `DispatchError` or `ParseError` is taken as-is, a cancelled tokio
    /// task counts as cancellation, anything else is a fault.
    pub fn from_handler(err: anyhow::Error) -> Self {
        let err = match err.downcast::<DispatchError>() {
            Ok(dispatch) => return dispatch,
            Err(err) => err,
        };
        let err = match err.downcast::<ParseError>() {
            Ok(parse) => return DispatchError::Parse(parse),
            Err(err) => err,
        };
        if err
            .downcast_ref::<tokio::task::JoinError>()
            .is_some_and(|join| join.is_cancelled())
        {
            return DispatchError::Cancelled;
        }
        DispatchError::Fault(err)
    }

    /// Nested batches expanded into their leaf failures, in order.
    pub fn flatten(self) -> Vec<DispatchError> {
        match self {
            DispatchError::Batch(members) => {
                members.into_iter().flat_map(DispatchError::flatten).collect()
            }
            other => vec![other],
        }
    }

    pub fn into_anyhow(self) -> anyhow::Error {
        match self {
            DispatchError::Fault(err) => err,
            other => anyhow::Error::new(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_nested_batches_when_flattening_then_returns_leaves_in_order() {
        let err = DispatchError::Batch(vec![
            DispatchError::Cancelled,
            DispatchError::Batch(vec![
                ParseError::MissingCommand.into(),
                DispatchError::Fault(anyhow::anyhow!("boom")),
            ]),
        ]);

        let leaves = err.flatten();

        assert_eq!(leaves.len(), 3);
        assert!(matches!(leaves[0], DispatchError::Cancelled));
        assert!(matches!(leaves[1], DispatchError::Parse(_)));
        assert!(matches!(leaves[2], DispatchError::Fault(_)));
    }

    #[test]
    fn given_wrapped_dispatch_error_when_classifying_handler_error_then_unwraps() {
        let err = anyhow::Error::new(DispatchError::Cancelled);
        assert!(matches!(
            DispatchError::from_handler(err),
            DispatchError::Cancelled
        ));

        let err = anyhow::Error::new(ParseError::MissingCommand);
        assert!(matches!(
            DispatchError::from_handler(err),
            DispatchError::Parse(ParseError::MissingCommand)
        ));
    }

    #[test]
    fn given_plain_error_when_classifying_handler_error_then_is_fault() {
        let err = anyhow::anyhow!("disk on fire");
        match DispatchError::from_handler(err) {
            DispatchError::Fault(e) => assert_eq!(e.to_string(), "disk on fire"),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[tokio::test]
    async fn given_aborted_task_when_classifying_handler_error_then_is_cancelled() {
        let task = tokio::spawn(async {
            tokio::time::sleep(std::time::Duration::from_secs(60)).await;
        });
        task.abort();
        let join_err = task.await.unwrap_err();

        let err = anyhow::Error::new(join_err);
        assert!(matches!(
            DispatchError::from_handler(err),
            DispatchError::Cancelled
        ));
    }
}
