//! Cooperative cancellation
//!
//! A [`CancellationToken`] is a shared stop flag. The pipeline polls it before each
//! extractor and before scoring; once set, the analysis returns
//! `AnalysisError::Cancelled` and discards partial results.
//!
//! [`AnalysisGate`] hands out tokens so that starting a new analysis cancels the one
//! still in flight: the newest submission wins.

use crate::error::AnalysisError;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

/// Shared cancellation flag
///
/// Clones share the same flag.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    stop_flag: Arc<AtomicBool>,
}

impl CancellationToken {
    /// Create a token that is not cancelled
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation; idempotent
    pub fn cancel(&self) {
        self.stop_flag.store(true, Ordering::Relaxed);
    }

    /// Whether cancellation was requested
    #[inline]
    pub fn is_cancelled(&self) -> bool {
        self.stop_flag.load(Ordering::Relaxed)
    }

    /// Checkpoint for pipeline stages
    ///
    /// # Errors
    ///
    /// Returns `AnalysisError::Cancelled` once [`cancel`](Self::cancel) has been called
    #[inline]
    pub fn check(&self) -> Result<(), AnalysisError> {
        if self.is_cancelled() {
            Err(AnalysisError::Cancelled)
        } else {
            Ok(())
        }
    }

    /// Whether two tokens share one flag
    pub fn same_as(&self, other: &CancellationToken) -> bool {
        Arc::ptr_eq(&self.stop_flag, &other.stop_flag)
    }
}

/// Issues tokens so that only the newest analysis stays alive
///
/// # Example
///
/// ```
/// use pixelcheck::analysis::cancel::AnalysisGate;
///
/// let gate = AnalysisGate::new();
/// let first = gate.begin();
/// let second = gate.begin();
/// assert!(first.is_cancelled());
/// assert!(!second.is_cancelled());
/// ```
#[derive(Debug, Default)]
pub struct AnalysisGate {
    current: Mutex<Option<CancellationToken>>,
}

impl AnalysisGate {
    /// Create a gate with nothing in flight
    pub fn new() -> Self {
        Self::default()
    }

    /// Cancel the in-flight analysis (if any) and issue a token for a new one
    pub fn begin(&self) -> CancellationToken {
        let token = CancellationToken::new();
        // A panic while holding the lock cannot leave the Option inconsistent
        let mut current = self.current.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(previous) = current.replace(token.clone()) {
            previous.cancel();
            log::debug!("Superseded in-flight analysis");
        }
        token
    }

    /// Cancel the in-flight analysis without starting another
    pub fn cancel_current(&self) {
        let mut current = self.current.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(token) = current.take() {
            token.cancel();
        }
    }

    /// Whether `token` belongs to the newest submission
    pub fn is_current(&self, token: &CancellationToken) -> bool {
        let current = self.current.lock().unwrap_or_else(|e| e.into_inner());
        current.as_ref().is_some_and(|c| c.same_as(token))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_token_check() {
        let token = CancellationToken::new();
        assert!(token.check().is_ok());

        let clone = token.clone();
        clone.cancel();
        assert!(token.is_cancelled());
        assert_eq!(token.check(), Err(AnalysisError::Cancelled));
    }

    #[test]
    fn test_independent_tokens() {
        let a = CancellationToken::new();
        let b = CancellationToken::new();
        a.cancel();
        assert!(!b.is_cancelled());
        assert!(!a.same_as(&b));
        assert!(a.same_as(&a.clone()));
    }

    #[test]
    fn test_gate_newest_wins() {
        let gate = AnalysisGate::new();
        let first = gate.begin();
        assert!(gate.is_current(&first));

        let second = gate.begin();
        assert!(first.is_cancelled());
        assert!(!second.is_cancelled());
        assert!(!gate.is_current(&first));
        assert!(gate.is_current(&second));

        gate.cancel_current();
        assert!(second.is_cancelled());
        assert!(!gate.is_current(&second));
    }

    #[test]
    fn test_cancel_from_another_thread() {
        let token = CancellationToken::new();
        let remote = token.clone();
        thread::spawn(move || remote.cancel()).join().unwrap();
        assert!(token.is_cancelled());
    }
}
