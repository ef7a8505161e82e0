use sanity_core::model::{Distribution, LabSession, SessionId, VariableEntry};

use crate::platform::{MemoryStorage, Storage};
use crate::session_store::{
    LAST_SESSION_KEY, MAX_SAVED_SESSIONS, SAVED_SESSIONS_KEY, SessionStore,
};

fn beam() -> LabSession {
    let mut session = LabSession::new(
        "P * L^3 / (3 * E * I)",
        vec![
            VariableEntry::new("p", "P", 1000.0)
                .with_unit("N")
                .with_range(900.0, 1100.0)
                .with_distribution(Distribution::Normal),
            VariableEntry::new("l", "L", 2.0).with_unit("m"),
            VariableEntry::new("e", "E", 2.0e11).with_unit("Pa"),
            VariableEntry::new("i", "I", 8.0e-6).with_unit("m^4"),
        ],
    );
    session.title = Some("Cantilever tip".into());
    session.expected_unit = Some("m".into());
    session.sweep.points = 30;
    session.monte_carlo.seed = Some(5);
    session
}

#[test]
fn test_last_session_round_trips() {
    let storage = MemoryStorage::new();
    let store = SessionStore::new(&storage);
    let session = beam();

    store.write_last_session(&session);
    assert_eq!(store.read_last_session(), Some(session));
    assert!(storage.get(LAST_SESSION_KEY).unwrap().is_some());
}

#[test]
fn test_saved_list_is_capped_most_recent_first() {
    let store = SessionStore::new(MemoryStorage::new());
    let session = beam();
    for i in 0..MAX_SAVED_SESSIONS + 5 {
        store.save_session(&session, &format!("s{i}"), None);
    }

    let list = store.read_saved_sessions();
    assert_eq!(list.len(), MAX_SAVED_SESSIONS);
    assert_eq!(list[0].title, format!("s{}", MAX_SAVED_SESSIONS + 4));
    assert_eq!(list[MAX_SAVED_SESSIONS - 1].title, "s5");
    assert!(list.iter().all(|s| s.session == session));
}

#[test]
fn test_saved_floats_round_trip_exactly() {
    let storage = MemoryStorage::new();
    let store = SessionStore::new(&storage);
    let mut session = beam();
    session.variables[0].value = 100.15090353378375;
    session.variables[0].min = Some(0.1 + 0.2);
    session.variables[0].max = Some(1e3 / 3.0);
    session.variables[3].value = 8.000000000000001e-6;

    store.write_last_session(&session);
    store.save_session(&session, "floats", None);

    assert_eq!(store.read_last_session(), Some(session.clone()));
    let list = store.read_saved_sessions();
    assert_eq!(list.len(), 1);
    assert_eq!(list[0].session, session);
    assert_eq!(list[0].session.variables[0].min, Some(0.30000000000000004));
}

#[test]
fn test_saving_existing_id_replaces_and_moves_to_front() {
    let store = SessionStore::new(MemoryStorage::new());
    let first = store.save_session(&beam(), "first", None);
    let second = store.save_session(&beam(), "second", None);
    assert_eq!(
        store
            .read_saved_sessions()
            .iter()
            .map(|s| s.title.as_str())
            .collect::<Vec<_>>(),
        vec!["second", "first"]
    );

    let mut edited = beam();
    edited.formula = "P * L^3 / (48 * E * I)".into();
    let replaced = store.save_session(&edited, "first, revised", Some(first.id.clone()));
    assert_eq!(replaced.id, first.id);
    assert!(replaced.updated_at >= first.updated_at);

    let list = store.read_saved_sessions();
    assert_eq!(list.len(), 2);
    assert_eq!(list[0].id, first.id);
    assert_eq!(list[0].title, "first, revised");
    assert_eq!(list[0].session.formula, "P * L^3 / (48 * E * I)");
    assert_eq!(list[1].id, second.id);
}

#[test]
fn test_invalid_payloads_read_as_absent() {
    let storage = MemoryStorage::new();
    let store = SessionStore::new(&storage);

    storage.set(LAST_SESSION_KEY, "not json").unwrap();
    assert!(store.read_last_session().is_none());

    storage
        .set(LAST_SESSION_KEY, r#"{"variables": [{"id": "a"}]}"#)
        .unwrap();
    assert!(store.read_last_session().is_none());

    storage.set(SAVED_SESSIONS_KEY, r#"{"a": 1}"#).unwrap();
    assert!(store.read_saved_sessions().is_empty());

    // One bad entry (min > max) poisons the whole list
    store.save_session(&beam(), "good", None);
    let raw = storage.get(SAVED_SESSIONS_KEY).unwrap().unwrap();
    assert_eq!(store.read_saved_sessions().len(), 1);
    let poisoned = raw.replace("\"min\":900.0", "\"min\":2000.0");
    assert_ne!(poisoned, raw);
    storage.set(SAVED_SESSIONS_KEY, &poisoned).unwrap();
    assert!(store.read_saved_sessions().is_empty());
}

#[test]
fn test_quota_failures_are_swallowed() {
    let storage = MemoryStorage::with_quota(64);
    let store = SessionStore::new(&storage);

    store.write_last_session(&beam());
    assert!(store.read_last_session().is_none());

    let saved = store.save_session(&beam(), "too big", None);
    assert_eq!(saved.title, "too big");
    assert!(store.read_saved_sessions().is_empty());
    assert!(storage.is_empty());
}

#[test]
fn test_delete_removes_only_that_entry() {
    let store = SessionStore::new(MemoryStorage::new());
    let keep = store.save_session(&beam(), "keep", None);
    let gone = store.save_session(&beam(), "gone", None);

    let remaining = store.delete_saved_session(&gone.id);
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].id, keep.id);
    assert_eq!(store.read_saved_sessions(), remaining);
    assert!(store.find_saved_session(&gone.id).is_none());
    assert!(store.find_saved_session(&keep.id).is_some());

    let unchanged = store.delete_saved_session(&SessionId::new("session-0-00000000"));
    assert_eq!(unchanged, remaining);
}
