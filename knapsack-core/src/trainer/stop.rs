//! Cooperative stop requests for training and test runs.
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

/// A cooperative stop request shared between a training run and its controller.
///
/// Clones share the same flag. The trainer only looks at it between iterations,
/// so an iteration in progress always completes.
#[derive(Debug, Clone, Default)]
pub struct StopToken(Arc<AtomicBool>);

impl StopToken {
    /// Creates a token without a pending request.
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests the run to stop.
    pub fn request_stop(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// Returns `true` if a stop was requested.
    pub fn is_stop_requested(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    /// Clears a pending request so that the token can be used for another run.
    pub fn reset(&self) {
        self.0.store(false, Ordering::SeqCst);
    }
}
