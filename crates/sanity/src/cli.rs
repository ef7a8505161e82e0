//! Command-line front end.
//!
//! Commands read a session from a JSON/YAML file, a saved session, or the
//! last working session, and print engine results as text or JSON. Any
//! command that loads a session records it as the last session.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::{Args, Parser, Subcommand, ValueEnum};
use color_eyre::eyre::{Result, WrapErr, bail, eyre};
use serde::Serialize;

use sanity_core::model::{LabSession, SessionId, VariableId};
use sanity_core::{evaluate_formula, run_sweep};

use crate::platform::Storage;
use crate::report::{self, Report};
use crate::session_store::SessionStore;
use crate::shell::{MonteCarloShell, MonteCarloStatus};

/// Longest the CLI waits for a Monte Carlo run
const MONTE_CARLO_TIMEOUT: Duration = Duration::from_secs(300);

#[derive(Parser, Debug)]
#[command(name = "sanity")]
#[command(about = "Unit-aware formula sanity checks: evaluate, sweep and Monte Carlo")]
pub struct Cli {
    /// Path to the data directory (default: ~/.sanity/)
    #[arg(short, long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// Log level (debug, info, warn, error)
    #[arg(short, long, default_value = "info", global = true)]
    pub log_level: String,

    /// Print results as JSON instead of text
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Evaluate the formula at the variables' point values
    Eval {
        #[command(flatten)]
        input: SessionInput,
        /// Override the expected output unit
        #[arg(long)]
        expect: Option<String>,
    },
    /// Sweep one variable across its range
    Sweep {
        #[command(flatten)]
        input: SessionInput,
        #[command(flatten)]
        sweep: SweepArgs,
    },
    /// Propagate input uncertainty with Monte Carlo sampling
    MonteCarlo {
        #[command(flatten)]
        input: SessionInput,
        #[command(flatten)]
        monte_carlo: MonteCarloArgs,
    },
    /// Evaluation, sweep and Monte Carlo together
    Report {
        #[command(flatten)]
        input: SessionInput,
        #[command(flatten)]
        sweep: SweepArgs,
        #[command(flatten)]
        monte_carlo: MonteCarloArgs,
    },
    /// Manage saved sessions
    Sessions {
        #[command(subcommand)]
        command: SessionsCommand,
    },
    /// Write a session as JSON or YAML
    Export {
        #[command(flatten)]
        input: SessionInput,
        #[arg(long, value_enum, default_value_t = ExportFormat::Yaml)]
        format: ExportFormat,
        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Subcommand, Debug)]
pub enum SessionsCommand {
    /// List saved sessions, most recent first
    List,
    /// Show one saved session
    Show { id: String },
    /// Save a session under a title
    Save {
        #[command(flatten)]
        input: SessionInput,
        #[arg(short, long, default_value = "")]
        title: String,
        /// Replace the saved session with this id
        #[arg(long)]
        id: Option<String>,
    },
    /// Delete a saved session
    Delete { id: String },
    /// Show the last working session
    Last,
}

/// Where to read the session from
#[derive(Args, Debug, Default, Clone)]
pub struct SessionInput {
    /// Session file (.json, .yaml or .yml); defaults to the last session
    pub file: Option<PathBuf>,
    /// Load a saved session by id instead of a file
    #[arg(long, conflicts_with = "file")]
    pub saved: Option<String>,
}

#[derive(Args, Debug, Default, Clone)]
pub struct SweepArgs {
    /// Variable id to sweep (default: the session's sweep variable)
    #[arg(long)]
    pub variable: Option<String>,
    /// Number of points (clamped to 2..=200)
    #[arg(long)]
    pub points: Option<usize>,
}

#[derive(Args, Debug, Default, Clone)]
pub struct MonteCarloArgs {
    /// Number of iterations (clamped to 100..=10000)
    #[arg(long)]
    pub iterations: Option<usize>,
    /// Seed for a reproducible run
    #[arg(long)]
    pub seed: Option<u64>,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Json,
    Yaml,
}

/// Decode a session file, choosing the format by extension
pub fn read_session_file(path: &Path) -> Result<LabSession> {
    let content = fs::read_to_string(path)
        .wrap_err_with(|| format!("Failed to read {}", path.display()))?;
    let is_yaml = matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("yaml" | "yml")
    );
    let session = if is_yaml {
        LabSession::from_yaml(&content)
    } else {
        LabSession::from_json(&content)
    };
    session.wrap_err_with(|| format!("Invalid session in {}", path.display()))
}

/// Runs parsed commands against a session store
pub struct Runner<S: Storage> {
    store: SessionStore<S>,
    json: bool,
}

impl<S: Storage> Runner<S> {
    pub fn new(store: SessionStore<S>, json: bool) -> Self {
        Self { store, json }
    }

    pub fn store(&self) -> &SessionStore<S> {
        &self.store
    }

    fn load(&self, input: &SessionInput) -> Result<LabSession> {
        let session = if let Some(path) = &input.file {
            read_session_file(path)?
        } else if let Some(id) = &input.saved {
            self.store
                .find_saved_session(&SessionId::new(id.as_str()))
                .map(|saved| saved.session)
                .ok_or_else(|| eyre!("No saved session with id '{id}'"))?
        } else {
            self.store
                .read_last_session()
                .ok_or_else(|| eyre!("No session file given and no last session stored"))?
        };
        self.store.write_last_session(&session);
        Ok(session)
    }

    fn output<T: Serialize>(&self, value: &T, text: impl FnOnce(&T) -> String) -> Result<String> {
        if self.json {
            let mut json = serde_json::to_string_pretty(value)?;
            json.push('\n');
            Ok(json)
        } else {
            Ok(text(value))
        }
    }

    /// Execute one command and return what should be printed
    pub fn run(&self, command: &Command) -> Result<String> {
        match command {
            Command::Eval { input, expect } => {
                let mut session = self.load(input)?;
                if let Some(expect) = expect {
                    session.expected_unit = Some(expect.clone());
                }
                let result = evaluate_formula(&session);
                self.output(&result, report::render_evaluate)
            }
            Command::Sweep { input, sweep } => {
                let session = self.load(input)?;
                let result = sweep_session(&session, sweep);
                self.output(&result, report::render_sweep)
            }
            Command::MonteCarlo { input, monte_carlo } => {
                let session = self.load(input)?;
                let result = monte_carlo_session(&session, monte_carlo)?;
                self.output(&result, report::render_monte_carlo)
            }
            Command::Report {
                input,
                sweep,
                monte_carlo,
            } => {
                let session = self.load(input)?;
                let report = Report {
                    evaluation: evaluate_formula(&session),
                    sweep: sweep_session(&session, sweep),
                    monte_carlo: monte_carlo_session(&session, monte_carlo)?,
                    session,
                };
                self.output(&report, report::render_report)
            }
            Command::Sessions { command } => self.run_sessions(command),
            Command::Export {
                input,
                format,
                output,
            } => {
                let session = self.load(input)?;
                let content = match format {
                    ExportFormat::Json => {
                        let mut json = serde_json::to_string_pretty(&session)?;
                        json.push('\n');
                        json
                    }
                    ExportFormat::Yaml => session.to_yaml()?,
                };
                match output {
                    Some(path) => {
                        fs::write(path, content)
                            .wrap_err_with(|| format!("Failed to write {}", path.display()))?;
                        tracing::info!(path = %path.display(), "Exported session");
                        Ok(format!("exported to {}\n", path.display()))
                    }
                    None => Ok(content),
                }
            }
        }
    }

    fn run_sessions(&self, command: &SessionsCommand) -> Result<String> {
        match command {
            SessionsCommand::List => {
                let list = self.store.read_saved_sessions();
                self.output(&list, |l| report::render_saved_list(l))
            }
            SessionsCommand::Show { id } => {
                let saved = self
                    .store
                    .find_saved_session(&SessionId::new(id.as_str()))
                    .ok_or_else(|| eyre!("No saved session with id '{id}'"))?;
                self.output(&saved, |s| report::render_session(&s.session))
            }
            SessionsCommand::Save { input, title, id } => {
                let session = self.load(input)?;
                let saved = self.store.save_session(
                    &session,
                    title,
                    id.as_deref().map(SessionId::new),
                );
                self.output(&saved, |s| format!("saved {} ({})\n", s.id, s.title))
            }
            SessionsCommand::Delete { id } => {
                let id = SessionId::new(id.as_str());
                if self.store.find_saved_session(&id).is_none() {
                    bail!("No saved session with id '{id}'");
                }
                let remaining = self.store.delete_saved_session(&id);
                self.output(&remaining, |l| report::render_saved_list(l))
            }
            SessionsCommand::Last => {
                let session = self
                    .store
                    .read_last_session()
                    .ok_or_else(|| eyre!("No last session stored"))?;
                self.output(&session, report::render_session)
            }
        }
    }
}

fn sweep_session(session: &LabSession, args: &SweepArgs) -> sanity_core::SweepResult {
    let mut session = session.clone();
    if let Some(points) = args.points {
        session.sweep.points = points;
    }
    let variable = args.variable.as_deref().map(VariableId::new);
    run_sweep(&session, variable.as_ref())
}

fn monte_carlo_session(
    session: &LabSession,
    args: &MonteCarloArgs,
) -> Result<sanity_core::MonteCarloResult> {
    let mut session = session.clone();
    if let Some(iterations) = args.iterations {
        session.monte_carlo.iterations = iterations;
    }
    if args.seed.is_some() {
        session.monte_carlo.seed = args.seed;
    }

    let mut shell = MonteCarloShell::new();
    shell.start(&session);
    match shell.wait(MONTE_CARLO_TIMEOUT) {
        MonteCarloStatus::Done(result) => Ok(result.clone()),
        _ => bail!("Monte Carlo did not finish within {MONTE_CARLO_TIMEOUT:?}"),
    }
}
