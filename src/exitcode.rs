//! Process exit codes

/// Successful termination, or a graceful cancellation
pub const OK: i32 = 0;

/// Default error code: parse failure, fault, or no outcome recorded
pub const ERROR: i32 = -1;
