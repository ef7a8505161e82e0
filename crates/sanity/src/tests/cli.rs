use std::fs;
use std::path::{Path, PathBuf};

use clap::Parser;
use color_eyre::eyre::Result;
use sanity_core::model::{Distribution, LabSession, VariableEntry};

use crate::cli::{Cli, Command, Runner, SessionsCommand, read_session_file};
use crate::platform::MemoryStorage;
use crate::session_store::SessionStore;

fn motor() -> LabSession {
    let mut session = LabSession::new(
        "T * w",
        vec![
            VariableEntry::new("torque", "T", 10.0)
                .with_unit("N m")
                .with_range(8.0, 12.0)
                .with_distribution(Distribution::Uniform),
            VariableEntry::new("omega", "w", 2.0)
                .with_unit("rad/s")
                .with_range(1.0, 3.0),
        ],
    );
    session.title = Some("Motor power".into());
    session
}

fn write_session(dir: &Path, name: &str) -> PathBuf {
    let path = dir.join(name);
    let content = if name.ends_with(".yaml") {
        motor().to_yaml().unwrap()
    } else {
        motor().to_json().unwrap()
    };
    fs::write(&path, content).unwrap();
    path
}

/// Parse `args` like the binary would and run against `storage`
fn run(storage: &MemoryStorage, args: &[&str]) -> Result<String> {
    let cli = Cli::try_parse_from(std::iter::once("sanity").chain(args.iter().copied()))?;
    Runner::new(SessionStore::new(storage), cli.json).run(&cli.command)
}

#[test]
fn test_parse_global_flags_after_subcommand() {
    let cli = Cli::try_parse_from(["sanity", "eval", "motor.json", "--json", "--expect", "W"])
        .unwrap();
    assert!(cli.json);
    assert_eq!(cli.log_level, "info");
    match cli.command {
        Command::Eval { input, expect } => {
            assert_eq!(input.file, Some(PathBuf::from("motor.json")));
            assert_eq!(expect.as_deref(), Some("W"));
        }
        other => panic!("unexpected command {other:?}"),
    }

    let cli = Cli::try_parse_from(["sanity", "sessions", "delete", "session-1-abc"]).unwrap();
    assert!(matches!(
        cli.command,
        Command::Sessions {
            command: SessionsCommand::Delete { .. }
        }
    ));

    assert!(Cli::try_parse_from(["sanity", "eval", "a.json", "--saved", "x"]).is_err());
}

#[test]
fn test_eval_from_json_file_records_last_session() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_session(dir.path(), "motor.json");
    let storage = MemoryStorage::new();

    let out = run(&storage, &["eval", path.to_str().unwrap()]).unwrap();
    assert_eq!(out, "result: 20 N m rad/s\n");

    let store = SessionStore::new(&storage);
    assert_eq!(store.read_last_session(), Some(motor()));

    // Without a file the last session is used
    let out = run(&storage, &["eval", "--expect", "W"]).unwrap();
    assert_eq!(
        out,
        "result: 20 N m rad/s\n  warning: unit mismatch: expected W, got N m rad/s\n"
    );
}

#[test]
fn test_eval_yaml_as_json() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_session(dir.path(), "motor.yaml");
    let storage = MemoryStorage::new();

    let out = run(&storage, &["--json", "eval", path.to_str().unwrap()]).unwrap();
    let value: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(value["value"].as_f64(), Some(20.0));
    assert_eq!(value["unit"], "N m rad/s");
    assert!(value.get("error").is_none());
}

#[test]
fn test_eval_without_any_session_fails() {
    let storage = MemoryStorage::new();
    let err = run(&storage, &["eval"]).unwrap_err();
    assert!(err.to_string().contains("no last session"));

    let dir = tempfile::tempdir().unwrap();
    let bad = dir.path().join("bad.json");
    fs::write(&bad, r#"{"variables": "nope"}"#).unwrap();
    assert!(run(&storage, &["eval", bad.to_str().unwrap()]).is_err());
    assert!(SessionStore::new(&storage).read_last_session().is_none());
}

#[test]
fn test_sweep_and_monte_carlo_overrides() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_session(dir.path(), "motor.json");
    let storage = MemoryStorage::new();
    let file = path.to_str().unwrap();

    let out = run(
        &storage,
        &["--json", "sweep", file, "--variable", "torque", "--points", "5"],
    )
    .unwrap();
    let sweep: serde_json::Value = serde_json::from_str(&out).unwrap();
    let ys: Vec<f64> = sweep["points"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["y"].as_f64().unwrap())
        .collect();
    assert_eq!(ys, vec![16.0, 18.0, 20.0, 22.0, 24.0]);
    assert_eq!(sweep["xUnit"], "N m");

    let out = run(
        &storage,
        &["--json", "monte-carlo", file, "--iterations", "100", "--seed", "7"],
    )
    .unwrap();
    let result: sanity_core::MonteCarloResult = serde_json::from_str(&out).unwrap();
    assert!(result.error.is_none());
    assert_eq!(result.sample_count(), 100);
    let mean = result.stats.mean.unwrap();
    assert!((16.0..=24.0).contains(&mean));

    let again = run(
        &storage,
        &["--json", "monte-carlo", file, "--iterations", "100", "--seed", "7"],
    )
    .unwrap();
    assert_eq!(out, again);
}

#[test]
fn test_report_has_every_section() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_session(dir.path(), "motor.json");
    let storage = MemoryStorage::new();

    let out = run(
        &storage,
        &["report", path.to_str().unwrap(), "--iterations", "100"],
    )
    .unwrap();
    assert!(out.starts_with("Motor power\nformula: T * w\n"));
    for section in ["== Evaluation ==", "== Sweep ==", "== Monte Carlo =="] {
        assert!(out.contains(section), "missing {section}");
    }
}

#[test]
fn test_sessions_save_list_show_delete() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_session(dir.path(), "motor.json");
    let storage = MemoryStorage::new();

    assert_eq!(run(&storage, &["sessions", "list"]).unwrap(), "no saved sessions\n");

    let out = run(
        &storage,
        &["--json", "sessions", "save", path.to_str().unwrap(), "--title", "Motor"],
    )
    .unwrap();
    let saved: sanity_core::SavedSession = serde_json::from_str(&out).unwrap();
    assert_eq!(saved.title, "Motor");
    assert_eq!(saved.session, motor());
    let id = saved.id.to_string();

    let list = run(&storage, &["sessions", "list"]).unwrap();
    assert_eq!(list.lines().count(), 1);
    assert!(list.starts_with(&id));
    assert!(list.trim_end().ends_with("Motor"));

    let shown = run(&storage, &["sessions", "show", &id]).unwrap();
    assert!(shown.contains("formula: T * w"));

    // A saved session can feed any command
    let out = run(&storage, &["eval", "--saved", &id]).unwrap();
    assert_eq!(out, "result: 20 N m rad/s\n");

    assert_eq!(
        run(&storage, &["sessions", "delete", &id]).unwrap(),
        "no saved sessions\n"
    );
    assert!(run(&storage, &["sessions", "delete", &id]).is_err());
    assert!(run(&storage, &["sessions", "show", &id]).is_err());
}

#[test]
fn test_export_yaml_round_trips() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_session(dir.path(), "motor.json");
    let exported = dir.path().join("exported.yaml");
    let storage = MemoryStorage::new();

    let out = run(
        &storage,
        &[
            "export",
            path.to_str().unwrap(),
            "--format",
            "yaml",
            "--output",
            exported.to_str().unwrap(),
        ],
    )
    .unwrap();
    assert!(out.starts_with("exported to "));
    assert_eq!(read_session_file(&exported).unwrap(), motor());

    let json = run(&storage, &["export", "--format", "json"]).unwrap();
    assert_eq!(LabSession::from_json(&json).unwrap(), motor());
}
