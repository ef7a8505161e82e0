//! Execution strategy for Monte Carlo runs.
//!
//! This module defines the [`MonteCarloExecutor`] trait that abstracts where
//! a Monte Carlo run happens: on a background thread (native), a deferred
//! browser task (web), or inline on the next poll. Sessions are copied in and
//! results copied out; nothing mutable is shared across the boundary.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::time::Duration;

use sanity_core::model::{LabSession, MonteCarloResult};
use sanity_core::run_monte_carlo;

/// Monotonic submission counter used to recognise stale results
pub type Generation = u64;

/// Platform-independent Monte Carlo executor.
pub trait MonteCarloExecutor {
    /// Queue a run. Returns false if the executor can no longer accept work.
    fn submit(&self, generation: Generation, session: LabSession) -> bool;

    /// Try to receive a finished run (non-blocking)
    fn try_recv(&self) -> Option<(Generation, MonteCarloResult)>;

    /// Block for up to `timeout` waiting for a finished run.
    ///
    /// Executors without a blocking primitive only poll once.
    fn recv_timeout(&self, _timeout: Duration) -> Option<(Generation, MonteCarloResult)> {
        self.try_recv()
    }

    /// Stop accepting work and release any owned thread
    fn shutdown(&self);
}

/// Runs queued sessions inline, one per `try_recv` poll.
///
/// Submission never blocks; the work happens on the caller's next poll,
/// one scheduling tick later.
#[derive(Debug, Default)]
pub struct DeferredExecutor {
    pending: RefCell<VecDeque<(Generation, LabSession)>>,
    closed: Cell<bool>,
}

impl DeferredExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of submitted runs not yet executed
    pub fn pending(&self) -> usize {
        self.pending.borrow().len()
    }
}

impl MonteCarloExecutor for DeferredExecutor {
    fn submit(&self, generation: Generation, session: LabSession) -> bool {
        if self.closed.get() {
            return false;
        }
        self.pending.borrow_mut().push_back((generation, session));
        true
    }

    fn try_recv(&self) -> Option<(Generation, MonteCarloResult)> {
        let (generation, session) = self.pending.borrow_mut().pop_front()?;
        tracing::debug!(generation, "running deferred monte carlo");
        Some((generation, run_monte_carlo(&session)))
    }

    fn shutdown(&self) {
        self.closed.set(true);
        self.pending.borrow_mut().clear();
    }
}
