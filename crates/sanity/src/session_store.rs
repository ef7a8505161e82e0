//! Persistence for the working session and the saved-session list.
//!
//! The store is a convenience cache, not a system of record. Every read is
//! decoded and validated at this boundary; a payload that is missing,
//! malformed or fails validation reads as "nothing stored". Writes are
//! best-effort: storage failures are logged and swallowed.

use jiff::Timestamp;
use rand::Rng;
use sanity_core::model::{LabSession, SavedSession, SessionId};

use crate::platform::Storage;

/// Storage key for the most recent working session
pub const LAST_SESSION_KEY: &str = "sanity.lastSession";
/// Storage key for the saved-session list
pub const SAVED_SESSIONS_KEY: &str = "sanity.savedSessions";
/// Saved-session list capacity
pub const MAX_SAVED_SESSIONS: usize = 25;

/// Title used when a session is saved without one
const UNTITLED: &str = "Untitled session";

/// Time-derived session id: `session-<unix millis>-<random hex>`
pub fn generate_session_id() -> SessionId {
    let millis = Timestamp::now().as_millisecond();
    let suffix: u32 = rand::rng().random();
    SessionId::new(format!("session-{millis}-{suffix:08x}"))
}

/// Session persistence over a raw key/value [`Storage`] backend
pub struct SessionStore<S: Storage> {
    storage: S,
}

impl<S: Storage> SessionStore<S> {
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    fn read_raw(&self, key: &str) -> Option<String> {
        match self.storage.get(key) {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!(key, error = %e, "Failed to read from storage");
                None
            }
        }
    }

    fn write_raw(&self, key: &str, value: &str) {
        if let Err(e) = self.storage.set(key, value) {
            tracing::warn!(key, error = %e, "Failed to write to storage");
        }
    }

    /// The last working session, if one is stored and valid
    pub fn read_last_session(&self) -> Option<LabSession> {
        let raw = self.read_raw(LAST_SESSION_KEY)?;
        match LabSession::from_json(&raw) {
            Ok(session) => Some(session),
            Err(e) => {
                tracing::warn!(error = %e, "Ignoring invalid stored session");
                None
            }
        }
    }

    pub fn write_last_session(&self, session: &LabSession) {
        match session.to_json() {
            Ok(json) => self.write_raw(LAST_SESSION_KEY, &json),
            Err(e) => tracing::warn!(error = %e, "Failed to serialize session"),
        }
    }

    /// The saved-session list, most recent first.
    ///
    /// A list containing any invalid entry is treated as absent.
    pub fn read_saved_sessions(&self) -> Vec<SavedSession> {
        let Some(raw) = self.read_raw(SAVED_SESSIONS_KEY) else {
            return Vec::new();
        };
        match SavedSession::list_from_json(&raw) {
            Ok(list) => list,
            Err(e) => {
                tracing::warn!(error = %e, "Ignoring invalid saved session list");
                Vec::new()
            }
        }
    }

    /// Replace the saved-session list, truncated to the capacity
    pub fn write_saved_sessions(&self, list: &[SavedSession]) {
        let list = &list[..list.len().min(MAX_SAVED_SESSIONS)];
        match SavedSession::list_to_json(list) {
            Ok(json) => self.write_raw(SAVED_SESSIONS_KEY, &json),
            Err(e) => tracing::warn!(error = %e, "Failed to serialize saved sessions"),
        }
    }

    /// Save a copy of `session` under `title`.
    ///
    /// An existing `id` is replaced and moved to the front; without an id a
    /// new one is generated and the entry prepended. The oldest entries
    /// beyond the capacity are dropped.
    pub fn save_session(
        &self,
        session: &LabSession,
        title: &str,
        id: Option<SessionId>,
    ) -> SavedSession {
        let title = match title.trim() {
            "" => session
                .title
                .as_deref()
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .unwrap_or(UNTITLED),
            t => t,
        };
        let saved = SavedSession {
            id: id.unwrap_or_else(generate_session_id),
            title: title.to_string(),
            updated_at: Timestamp::now(),
            session: session.clone(),
        };

        let mut list = self.read_saved_sessions();
        list.retain(|s| s.id != saved.id);
        list.insert(0, saved.clone());
        list.truncate(MAX_SAVED_SESSIONS);
        self.write_saved_sessions(&list);

        tracing::info!(id = %saved.id, title = %saved.title, "Saved session");
        saved
    }

    /// Remove `id` from the saved list and return what remains
    pub fn delete_saved_session(&self, id: &SessionId) -> Vec<SavedSession> {
        let mut list = self.read_saved_sessions();
        let before = list.len();
        list.retain(|s| &s.id != id);
        if list.len() != before {
            self.write_saved_sessions(&list);
        }
        list
    }

    pub fn find_saved_session(&self, id: &SessionId) -> Option<SavedSession> {
        self.read_saved_sessions().into_iter().find(|s| &s.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::MemoryStorage;

    #[test]
    fn test_generated_ids_are_distinct() {
        let a = generate_session_id();
        let b = generate_session_id();
        assert!(a.as_str().starts_with("session-"));
        assert_ne!(a, b);
    }

    #[test]
    fn test_title_falls_back() {
        let store = SessionStore::new(MemoryStorage::new());
        let mut session = LabSession::new("1", vec![]);

        assert_eq!(store.save_session(&session, "  ", None).title, UNTITLED);

        session.title = Some("Beam".into());
        assert_eq!(store.save_session(&session, "", None).title, "Beam");
        assert_eq!(store.save_session(&session, " Mine ", None).title, "Mine");
    }

    #[test]
    fn test_missing_list_reads_empty() {
        let store = SessionStore::new(MemoryStorage::new());
        assert!(store.read_saved_sessions().is_empty());
        assert!(store.read_last_session().is_none());
        assert!(store.delete_saved_session(&SessionId::new("x")).is_empty());
    }
}
