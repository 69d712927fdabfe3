use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

use crate::foundation::error::{MashupError, MashupResult};

/// Shared cancellation flag.
///
/// Clones observe the same flag. Long-running operations poll it at their natural boundaries
/// (before each render, while waiting on a child process, between decoded keys).
#[derive(Clone, Debug, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }

    /// Fail with [`MashupError::Cancelled`] once the token has fired.
    pub fn check(&self, what: &str) -> MashupResult<()> {
        if self.is_cancelled() {
            return Err(MashupError::cancelled(what.to_string()));
        }
        Ok(())
    }
}
