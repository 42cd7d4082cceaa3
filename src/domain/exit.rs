//! Write-once process exit code

use std::sync::{Arc, OnceLock};

use crate::exitcode;

/// Shared exit code slot. Unset reads as [`exitcode::ERROR`].
///
/// The first successful [`set`](Self::set) wins; later writes are ignored.
#[derive(Debug, Clone, Default)]
pub struct ExitCodeCell {
    code: Arc<OnceLock<i32>>,
}

impl ExitCodeCell {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `false` if a code was already written.
    pub fn set(&self, code: i32) -> bool {
        self.code.set(code).is_ok()
    }

    pub fn get(&self) -> i32 {
        self.code.get().copied().unwrap_or(exitcode::ERROR)
    }

    pub fn is_set(&self) -> bool {
        self.code.get().is_some()
    }
}
