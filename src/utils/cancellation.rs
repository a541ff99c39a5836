use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

/// A shared flag used to stop a learning run.
///
/// Clones of a token share the same flag, so a token can be handed to a worker
/// while the caller keeps a clone to trigger the cancellation.
///
/// # Example
///
/// ```
/// # use amlearn::utils::CancellationToken;
/// let token = CancellationToken::default();
/// let worker_token = token.clone();
/// assert!(!worker_token.is_cancelled());
/// token.cancel();
/// assert!(worker_token.is_cancelled());
/// ```
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    /// Requests the cancellation of the runs polling this token.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst)
    }

    /// Returns `true` iff the cancellation was requested.
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    /// Returns `None` if the cancellation was requested, `Some(())` otherwise.
    ///
    /// This is intended to be used with the `?` operator in functions returning an [`Option`].
    pub fn check(&self) -> Option<()> {
        if self.is_cancelled() {
            None
        } else {
            Some(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shared_flag() {
        let t1 = CancellationToken::default();
        let t2 = t1.clone();
        assert_eq!(Some(()), t2.check());
        t1.cancel();
        assert!(t2.is_cancelled());
        assert_eq!(None, t2.check());
    }

    #[test]
    fn test_cancel_from_thread() {
        let token = CancellationToken::default();
        let cloned = token.clone();
        std::thread::spawn(move || cloned.cancel()).join().unwrap();
        assert!(token.is_cancelled());
    }
}
