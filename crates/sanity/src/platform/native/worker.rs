//! Native Monte Carlo executor using a background std::thread.

use std::sync::mpsc::{Receiver, RecvTimeoutError, Sender, channel};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use sanity_core::model::{LabSession, MonteCarloResult};
use sanity_core::run_monte_carlo;

use crate::platform::worker::{Generation, MonteCarloExecutor};

/// Request sent to the background thread
enum Request {
    Run {
        generation: Generation,
        session: Box<LabSession>,
    },
    Shutdown,
}

/// Long-lived worker thread fed through a channel.
///
/// When several runs queue up while one is in progress only the newest is
/// executed; older ones could never win against it anyway.
pub struct ThreadExecutor {
    request_tx: Sender<Request>,
    response_rx: Receiver<(Generation, MonteCarloResult)>,
    thread: Option<JoinHandle<()>>,
}

impl ThreadExecutor {
    /// Spawn the worker thread
    pub fn spawn() -> std::io::Result<Self> {
        let (request_tx, request_rx) = channel();
        let (response_tx, response_rx) = channel();

        let thread = thread::Builder::new()
            .name("sanity-monte-carlo".into())
            .spawn(move || run_worker(request_rx, response_tx))?;

        Ok(Self {
            request_tx,
            response_rx,
            thread: Some(thread),
        })
    }
}

fn run_worker(request_rx: Receiver<Request>, response_tx: Sender<(Generation, MonteCarloResult)>) {
    while let Ok(request) = request_rx.recv() {
        let (mut generation, mut session) = match request {
            Request::Shutdown => break,
            Request::Run {
                generation,
                session,
            } => (generation, session),
        };

        // Skip ahead to the newest queued run
        let mut shutdown = false;
        while let Ok(next) = request_rx.try_recv() {
            match next {
                Request::Run {
                    generation: g,
                    session: s,
                } => {
                    tracing::debug!(superseded = generation, by = g, "skipping stale run");
                    generation = g;
                    session = s;
                }
                Request::Shutdown => {
                    shutdown = true;
                    break;
                }
            }
        }
        if shutdown {
            break;
        }

        tracing::debug!(generation, "starting monte carlo");
        let result = run_monte_carlo(&session);
        if response_tx.send((generation, result)).is_err() {
            break;
        }
    }
    tracing::debug!("monte carlo worker exiting");
}

impl MonteCarloExecutor for ThreadExecutor {
    fn submit(&self, generation: Generation, session: LabSession) -> bool {
        self.request_tx
            .send(Request::Run {
                generation,
                session: Box::new(session),
            })
            .is_ok()
    }

    fn try_recv(&self) -> Option<(Generation, MonteCarloResult)> {
        self.response_rx.try_recv().ok()
    }

    fn recv_timeout(&self, timeout: Duration) -> Option<(Generation, MonteCarloResult)> {
        match self.response_rx.recv_timeout(timeout) {
            Ok(response) => Some(response),
            Err(RecvTimeoutError::Timeout | RecvTimeoutError::Disconnected) => None,
        }
    }

    fn shutdown(&self) {
        let _ = self.request_tx.send(Request::Shutdown);
    }
}

impl Drop for ThreadExecutor {
    fn drop(&mut self) {
        self.shutdown();
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sanity_core::model::{Distribution, VariableEntry};

    fn session(seed: u64) -> LabSession {
        let mut session = LabSession::new(
            "x + 1",
            vec![
                VariableEntry::new("x", "x", 0.0)
                    .with_range(0.0, 1.0)
                    .with_distribution(Distribution::Normal),
            ],
        );
        session.monte_carlo.seed = Some(seed);
        session
    }

    #[test]
    fn test_thread_round_trip() {
        let executor = ThreadExecutor::spawn().unwrap();
        assert!(executor.submit(7, session(1)));

        let (generation, result) = executor.recv_timeout(Duration::from_secs(30)).unwrap();
        assert_eq!(generation, 7);
        assert_eq!(result, run_monte_carlo(&session(1)));
    }

    #[test]
    fn test_worker_exits_after_shutdown() {
        let executor = ThreadExecutor::spawn().unwrap();
        executor.shutdown();

        // Once the thread exits its receiver is gone and sends fail
        let mut stopped = false;
        for _ in 0..500 {
            if !executor.submit(1, session(1)) {
                stopped = true;
                break;
            }
            thread::sleep(Duration::from_millis(10));
        }
        assert!(stopped);
        assert!(executor.try_recv().is_none());
    }
}
