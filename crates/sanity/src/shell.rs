//! Presentation-side owner of Monte Carlo execution.
//!
//! The shell creates its executor lazily on the first run and tears it down
//! with itself. Every run gets a new generation number; results that come
//! back for an older generation are dropped so a slow, superseded run can
//! never overwrite a newer one.

#[cfg(not(target_arch = "wasm32"))]
use std::time::{Duration, Instant};

use sanity_core::model::{LabSession, MonteCarloResult};

use crate::platform::{DeferredExecutor, Generation, MonteCarloExecutor};

/// Monte Carlo state as seen by a results panel
#[derive(Debug, Clone, PartialEq, Default)]
pub enum MonteCarloStatus {
    #[default]
    Idle,
    Running,
    Done(MonteCarloResult),
}

impl MonteCarloStatus {
    pub fn is_running(&self) -> bool {
        matches!(self, MonteCarloStatus::Running)
    }

    pub fn result(&self) -> Option<&MonteCarloResult> {
        match self {
            MonteCarloStatus::Done(result) => Some(result),
            _ => None,
        }
    }
}

type ExecutorFactory = Box<dyn Fn() -> Box<dyn MonteCarloExecutor>>;

/// Owns a lazily created [`MonteCarloExecutor`] and tracks the latest run
pub struct MonteCarloShell {
    factory: ExecutorFactory,
    executor: Option<Box<dyn MonteCarloExecutor>>,
    generation: Generation,
    status: MonteCarloStatus,
}

impl MonteCarloShell {
    /// Shell using the best executor for this platform
    pub fn new() -> Self {
        Self::with_factory(default_executor)
    }

    /// Shell that runs Monte Carlo inline on the next poll
    pub fn deferred() -> Self {
        Self::with_factory(|| Box::new(DeferredExecutor::new()))
    }

    pub fn with_factory(factory: impl Fn() -> Box<dyn MonteCarloExecutor> + 'static) -> Self {
        Self {
            factory: Box::new(factory),
            executor: None,
            generation: 0,
            status: MonteCarloStatus::Idle,
        }
    }

    pub fn status(&self) -> &MonteCarloStatus {
        &self.status
    }

    /// Generation of the most recent submission (0 before the first run)
    pub fn generation(&self) -> Generation {
        self.generation
    }

    /// Whether an executor is currently owned
    pub fn has_executor(&self) -> bool {
        self.executor.is_some()
    }

    /// Submit a copy of `session`. Any run still in flight is superseded.
    pub fn start(&mut self, session: &LabSession) -> Generation {
        self.generation += 1;
        let generation = self.generation;

        let executor = self.executor.get_or_insert_with(|| {
            tracing::info!("Starting Monte Carlo executor");
            (self.factory)()
        });
        if executor.submit(generation, session.clone()) {
            self.status = MonteCarloStatus::Running;
        } else {
            tracing::warn!(generation, "Monte Carlo executor rejected run");
            self.status = MonteCarloStatus::Done(MonteCarloResult::failure(
                "monte carlo executor is unavailable",
                Vec::new(),
            ));
        }
        generation
    }

    /// Drain finished runs, keeping only the latest generation's result
    pub fn poll(&mut self) -> &MonteCarloStatus {
        if let Some(executor) = &self.executor {
            while let Some(response) = executor.try_recv() {
                Self::accept(&mut self.status, self.generation, response);
            }
        }
        &self.status
    }

    fn accept(
        status: &mut MonteCarloStatus,
        latest: Generation,
        (generation, result): (Generation, MonteCarloResult),
    ) {
        if generation == latest {
            *status = MonteCarloStatus::Done(result);
        } else {
            tracing::debug!(generation, latest, "Discarding stale Monte Carlo result");
        }
    }

    /// Block until the latest run finishes or `timeout` elapses
    #[cfg(not(target_arch = "wasm32"))]
    pub fn wait(&mut self, timeout: Duration) -> &MonteCarloStatus {
        let deadline = Instant::now() + timeout;
        while self.poll().is_running() {
            let Some(remaining) = deadline.checked_duration_since(Instant::now()) else {
                break;
            };
            let Some(executor) = &self.executor else {
                break;
            };
            match executor.recv_timeout(remaining.min(Duration::from_millis(50))) {
                Some(response) => Self::accept(&mut self.status, self.generation, response),
                None if remaining.is_zero() => break,
                None => {}
            }
        }
        &self.status
    }

    /// Release the executor. The next `start` creates a fresh one.
    pub fn teardown(&mut self) {
        if let Some(executor) = self.executor.take() {
            tracing::info!("Stopping Monte Carlo executor");
            executor.shutdown();
        }
        self.status = MonteCarloStatus::Idle;
    }
}

impl Default for MonteCarloShell {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for MonteCarloShell {
    fn drop(&mut self) {
        self.teardown();
    }
}

#[cfg(feature = "native")]
fn default_executor() -> Box<dyn MonteCarloExecutor> {
    match crate::platform::ThreadExecutor::spawn() {
        Ok(executor) => Box::new(executor),
        Err(e) => {
            tracing::warn!(error = %e, "Failed to spawn worker thread, running inline");
            Box::new(DeferredExecutor::new())
        }
    }
}

#[cfg(all(feature = "web", not(feature = "native")))]
fn default_executor() -> Box<dyn MonteCarloExecutor> {
    Box::new(crate::platform::WebExecutor::new())
}

#[cfg(not(any(feature = "native", feature = "web")))]
fn default_executor() -> Box<dyn MonteCarloExecutor> {
    Box::new(DeferredExecutor::new())
}
