//! Decoding of session documents at the storage boundary.
//!
//! Stored payloads are untrusted. They are deserialized strictly into the
//! typed model and then checked against the session invariants, so callers
//! either get a fully valid [`LabSession`] / [`SavedSession`] or an error,
//! never a half-checked value.

use rustc_hash::FxHashSet;

use super::session::{LabSession, SavedSession, VariableEntry};
use crate::error::{Result, SessionError};

impl VariableEntry {
    pub fn validate(&self) -> Result<()> {
        if self.id.as_str().trim().is_empty() {
            return Err(SessionError::invalid("variable id is empty"));
        }
        if self.symbol.trim().is_empty() {
            return Err(SessionError::invalid(format!(
                "variable '{}' has an empty symbol",
                self.id
            )));
        }
        let numbers = [Some(self.value), self.min, self.max];
        if numbers.iter().flatten().any(|n| !n.is_finite()) {
            return Err(SessionError::invalid(format!(
                "variable '{}' has a non-finite number",
                self.id
            )));
        }
        if let (Some(min), Some(max)) = (self.min, self.max) {
            if min > max {
                return Err(SessionError::invalid(format!(
                    "variable '{}' has min {min} greater than max {max}",
                    self.id
                )));
            }
        }
        Ok(())
    }
}

impl LabSession {
    /// Check the session invariants: finite numbers, ordered bounds, unique ids.
    pub fn validate(&self) -> Result<()> {
        let mut ids = FxHashSet::default();
        for variable in &self.variables {
            variable.validate()?;
            if !ids.insert(variable.id.as_str()) {
                return Err(SessionError::invalid(format!(
                    "duplicate variable id '{}'",
                    variable.id
                )));
            }
        }
        Ok(())
    }

    /// Decode and validate a session from JSON
    pub fn from_json(json: &str) -> Result<Self> {
        let session: LabSession = serde_json::from_str(json)?;
        session.validate()?;
        Ok(session)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Decode and validate a session from YAML (import format)
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let session: LabSession =
            serde_saphyr::from_str(yaml).map_err(|e| SessionError::Yaml(e.to_string()))?;
        session.validate()?;
        Ok(session)
    }

    /// Serialize the session to YAML (export format)
    pub fn to_yaml(&self) -> Result<String> {
        serde_saphyr::to_string(self).map_err(|e| SessionError::Yaml(e.to_string()))
    }
}

impl SavedSession {
    pub fn validate(&self) -> Result<()> {
        if self.id.as_str().trim().is_empty() {
            return Err(SessionError::invalid("saved session id is empty"));
        }
        self.session.validate()
    }

    /// Decode and validate a saved-session list from JSON.
    ///
    /// Any invalid entry invalidates the whole list.
    pub fn list_from_json(json: &str) -> Result<Vec<SavedSession>> {
        let list: Vec<SavedSession> = serde_json::from_str(json)?;
        let mut ids = FxHashSet::default();
        for saved in &list {
            saved.validate()?;
            if !ids.insert(saved.id.as_str()) {
                return Err(SessionError::invalid(format!(
                    "duplicate saved session id '{}'",
                    saved.id
                )));
            }
        }
        Ok(list)
    }

    pub fn list_to_json(list: &[SavedSession]) -> Result<String> {
        Ok(serde_json::to_string(list)?)
    }
}
