//! Web Monte Carlo executor.
//!
//! Runs are executed on the main thread but deferred with a zero-delay
//! timeout, so the UI event that triggered them returns first.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;

use gloo_timers::callback::Timeout;
use sanity_core::model::{LabSession, MonteCarloResult};
use sanity_core::run_monte_carlo;

use crate::platform::worker::{Generation, MonteCarloExecutor};

#[derive(Default)]
struct Shared {
    responses: RefCell<VecDeque<(Generation, MonteCarloResult)>>,
    /// Newest submitted generation; older timeouts skip their work
    latest: Cell<Generation>,
    closed: Cell<bool>,
}

/// Executor that defers each run to the next browser task.
#[derive(Default)]
pub struct WebExecutor {
    shared: Rc<Shared>,
}

impl WebExecutor {
    pub fn new() -> Self {
        Self::default()
    }
}

impl MonteCarloExecutor for WebExecutor {
    fn submit(&self, generation: Generation, session: LabSession) -> bool {
        if self.shared.closed.get() {
            return false;
        }
        self.shared.latest.set(generation);

        let shared = Rc::clone(&self.shared);
        Timeout::new(0, move || {
            if shared.closed.get() || shared.latest.get() != generation {
                return;
            }
            let result = run_monte_carlo(&session);
            shared.responses.borrow_mut().push_back((generation, result));
        })
        .forget();
        true
    }

    fn try_recv(&self) -> Option<(Generation, MonteCarloResult)> {
        self.shared.responses.borrow_mut().pop_front()
    }

    fn shutdown(&self) {
        self.shared.closed.set(true);
        self.shared.responses.borrow_mut().clear();
    }
}
