//! Terminal state of the dispatch task

use std::fmt;
use std::sync::Arc;

/// Result of running the command dispatcher once.
#[derive(Debug, Clone)]
pub enum ExecutionOutcome {
    /// The command ran to completion and returned this code.
    Success(i32),
    /// The run was cancelled (interrupt or upstream cancellation).
    Cancelled,
    /// The command line did not match a registered command or its flags.
    ParseFailure(String),
    /// Any other failure.
    Fault(Arc<anyhow::Error>),
}

impl ExecutionOutcome {
    /// Exit code this outcome maps to, or `None` to leave the default error code.
    pub fn exit_code(&self) -> Option<i32> {
        match self {
            ExecutionOutcome::Success(code) => Some(*code),
            ExecutionOutcome::Cancelled => Some(crate::exitcode::OK),
            ExecutionOutcome::ParseFailure(_) | ExecutionOutcome::Fault(_) => None,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, ExecutionOutcome::Success(_))
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, ExecutionOutcome::Cancelled)
    }

    pub fn is_parse_failure(&self) -> bool {
        matches!(self, ExecutionOutcome::ParseFailure(_))
    }

    pub fn is_fault(&self) -> bool {
        matches!(self, ExecutionOutcome::Fault(_))
    }
}

impl fmt::Display for ExecutionOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExecutionOutcome::Success(code) => write!(f, "success ({code})"),
            ExecutionOutcome::Cancelled => f.write_str("cancelled"),
            ExecutionOutcome::ParseFailure(message) => write!(f, "parse failure: {message}"),
            ExecutionOutcome::Fault(err) => write!(f, "fault: {err:#}"),
        }
    }
}
