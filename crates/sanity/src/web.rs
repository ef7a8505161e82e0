//! Web entry point for sanity.
//!
//! Exposes the engine to JavaScript with JSON strings in and out, plus a
//! [`SanityShell`] object that owns Monte Carlo execution and persists
//! sessions to `localStorage`.

use serde::Serialize;
use wasm_bindgen::prelude::*;

use sanity_core::model::{LabSession, MonteCarloResult, SavedSession, SessionId, VariableId};

use crate::platform::{WebExecutor, WebStorage};
use crate::session_store::SessionStore;
use crate::shell::{MonteCarloShell, MonteCarloStatus};

fn to_js(e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}

fn parse_session(json: &str) -> Result<LabSession, JsValue> {
    LabSession::from_json(json).map_err(to_js)
}

fn to_json<T: Serialize>(value: &T) -> Result<String, JsValue> {
    serde_json::to_string(value).map_err(to_js)
}

/// Evaluate a session (JSON) and return an `EvaluateResult` (JSON)
#[wasm_bindgen(js_name = evaluateFormula)]
pub fn evaluate_formula(session_json: &str) -> Result<String, JsValue> {
    let session = parse_session(session_json)?;
    to_json(&sanity_core::evaluate_formula(&session))
}

/// Sweep a session (JSON) and return a `SweepResult` (JSON)
#[wasm_bindgen(js_name = runSweep)]
pub fn run_sweep(session_json: &str, variable_id: Option<String>) -> Result<String, JsValue> {
    let session = parse_session(session_json)?;
    let variable_id = variable_id.map(VariableId::new);
    to_json(&sanity_core::run_sweep(&session, variable_id.as_ref()))
}

/// Run Monte Carlo synchronously and return a `MonteCarloResult` (JSON)
#[wasm_bindgen(js_name = runMonteCarlo)]
pub fn run_monte_carlo(session_json: &str) -> Result<String, JsValue> {
    let session = parse_session(session_json)?;
    to_json(&sanity_core::run_monte_carlo(&session))
}

#[derive(Serialize)]
struct StatusView<'a> {
    status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    result: Option<&'a MonteCarloResult>,
}

/// Browser-side shell: deferred Monte Carlo plus `localStorage` sessions
#[wasm_bindgen]
pub struct SanityShell {
    store: SessionStore<WebStorage>,
    monte_carlo: MonteCarloShell,
}

#[wasm_bindgen]
impl SanityShell {
    #[wasm_bindgen(constructor)]
    pub fn new() -> SanityShell {
        SanityShell {
            store: SessionStore::new(WebStorage::new()),
            monte_carlo: MonteCarloShell::with_factory(|| Box::new(WebExecutor::new())),
        }
    }

    /// Start a Monte Carlo run, superseding any run in flight
    #[wasm_bindgen(js_name = startMonteCarlo)]
    pub fn start_monte_carlo(&mut self, session_json: &str) -> Result<f64, JsValue> {
        let session = parse_session(session_json)?;
        Ok(self.monte_carlo.start(&session) as f64)
    }

    /// `{"status": "idle" | "running" | "done", "result"?: MonteCarloResult}`
    #[wasm_bindgen(js_name = pollMonteCarlo)]
    pub fn poll_monte_carlo(&mut self) -> Result<String, JsValue> {
        let view = match self.monte_carlo.poll() {
            MonteCarloStatus::Idle => StatusView {
                status: "idle",
                result: None,
            },
            MonteCarloStatus::Running => StatusView {
                status: "running",
                result: None,
            },
            MonteCarloStatus::Done(result) => StatusView {
                status: "done",
                result: Some(result),
            },
        };
        to_json(&view)
    }

    #[wasm_bindgen(js_name = readLastSession)]
    pub fn read_last_session(&self) -> Result<Option<String>, JsValue> {
        self.store
            .read_last_session()
            .map(|s| to_json(&s))
            .transpose()
    }

    #[wasm_bindgen(js_name = writeLastSession)]
    pub fn write_last_session(&self, session_json: &str) -> Result<(), JsValue> {
        let session = parse_session(session_json)?;
        self.store.write_last_session(&session);
        Ok(())
    }

    #[wasm_bindgen(js_name = readSavedSessions)]
    pub fn read_saved_sessions(&self) -> Result<String, JsValue> {
        to_json(&self.store.read_saved_sessions())
    }

    #[wasm_bindgen(js_name = writeSavedSessions)]
    pub fn write_saved_sessions(&self, list_json: &str) -> Result<(), JsValue> {
        let list = SavedSession::list_from_json(list_json).map_err(to_js)?;
        self.store.write_saved_sessions(&list);
        Ok(())
    }

    #[wasm_bindgen(js_name = saveSession)]
    pub fn save_session(
        &self,
        session_json: &str,
        title: &str,
        id: Option<String>,
    ) -> Result<String, JsValue> {
        let session = parse_session(session_json)?;
        let saved = self
            .store
            .save_session(&session, title, id.map(SessionId::new));
        to_json(&saved)
    }

    #[wasm_bindgen(js_name = deleteSavedSession)]
    pub fn delete_saved_session(&self, id: &str) -> Result<String, JsValue> {
        to_json(&self.store.delete_saved_session(&SessionId::new(id)))
    }

    /// Release the Monte Carlo executor
    pub fn teardown(&mut self) {
        self.monte_carlo.teardown();
    }
}

impl Default for SanityShell {
    fn default() -> Self {
        Self::new()
    }
}

/// WASM entry point.
#[wasm_bindgen(start)]
pub fn main() -> Result<(), JsValue> {
    // Set up panic hook for better error messages
    console_error_panic_hook::set_once();

    // Initialize logging to browser console
    crate::init_logging_web();

    tracing::info!("Sanity web version starting");
    Ok(())
}
