use std::env;
use std::io;
use std::os::unix::process::CommandExt;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::sync::LazyLock;
use std::thread::{self, JoinHandle};

use log::{debug, info, warn};
use regex::Regex;
use thiserror::Error;

use crate::model::{Action, RunMode};

const DEFAULT_TERMINAL: &str = "xterm -e";

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("nothing to run")]
    Empty,
    #[error("failed to start {program}: {source}")]
    Spawn {
        program: String,
        source: std::io::Error,
    },
}

/// Process collaborators the resolver hands work to. The launcher never
/// waits on the processes it starts.
pub trait Dispatcher {
    fn spawn_background(&mut self, command: &str) -> Result<(), DispatchError>;
    fn run_in_terminal(&mut self, command: &str) -> Result<(), DispatchError>;
    fn open_with_default(&mut self, path: &Path) -> Result<(), DispatchError>;
    fn open_url(&mut self, url: &str) -> Result<(), DispatchError>;
}

/// Result of activating an entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// A process was handed off successfully.
    Launched { stay_open: bool },
    /// Dispatch failed; the message is shown and the launcher stays open.
    Failed(String),
    /// Only launcher state changed (theme commit, input completion).
    StateChanged,
    Noop,
}

impl Outcome {
    pub fn should_exit(&self) -> bool {
        matches!(self, Outcome::Launched { stay_open: false })
    }
}

/// Session mutation requested by a resolved action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    None,
    RecordLaunch(String),
    ApplyTheme(String),
    SetInput(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub outcome: Outcome,
    pub effect: Effect,
}

impl Resolution {
    fn outcome(outcome: Outcome) -> Self {
        Self { outcome, effect: Effect::None }
    }
}

static FIELD_CODE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"%[%fFuUdDnNickvm]").expect("field code pattern"));

/// Drops desktop-entry field codes (`%f`, `%U`, ...); `%%` becomes `%`.
pub fn strip_field_codes(exec: &str) -> String {
    let stripped = FIELD_CODE.replace_all(exec, |caps: &regex::Captures| {
        if &caps[0] == "%%" { "%".to_string() } else { String::new() }
    });
    stripped.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Expands a leading `~` using `home`.
pub fn expand_home(path: &str, home: Option<&Path>) -> PathBuf {
    let expanded =
        shellexpand::tilde_with_context(path, || home.map(|h| h.to_string_lossy().into_owned()));
    PathBuf::from(expanded.into_owned())
}

fn dispatch_shell(
    dispatcher: &mut dyn Dispatcher,
    command: &str,
    run_mode: RunMode,
) -> Result<(), DispatchError> {
    match run_mode {
        RunMode::Spawn => dispatcher.spawn_background(command),
        RunMode::Terminal => dispatcher.run_in_terminal(command),
    }
}

/// Maps an action onto the dispatcher and decides the launcher lifecycle.
pub fn resolve(
    action: &Action,
    dispatcher: &mut dyn Dispatcher,
    home: Option<&Path>,
) -> Resolution {
    match action {
        Action::App { id, exec, terminal } => {
            let command = strip_field_codes(exec);
            let mode = if *terminal { RunMode::Terminal } else { RunMode::Spawn };
            match dispatch_shell(dispatcher, &command, mode) {
                Ok(()) => Resolution {
                    outcome: Outcome::Launched { stay_open: false },
                    effect: Effect::RecordLaunch(id.clone()),
                },
                Err(e) => Resolution::outcome(Outcome::Failed(format!("Launch failed: {e}"))),
            }
        }
        Action::File { path } => match dispatcher.open_with_default(path) {
            Ok(()) => Resolution::outcome(Outcome::Launched { stay_open: false }),
            Err(e) => Resolution::outcome(Outcome::Failed(format!("Open failed: {e}"))),
        },
        Action::Url { url, stay_open } => {
            if let Err(e) = dispatcher.open_url(url) {
                warn!("opening {url} failed: {e}");
            }
            Resolution::outcome(Outcome::Launched { stay_open: *stay_open })
        }
        Action::Shell { command, run_mode, stay_open } => {
            match dispatch_shell(dispatcher, command, *run_mode) {
                Ok(()) => Resolution::outcome(Outcome::Launched { stay_open: *stay_open }),
                Err(e) => Resolution::outcome(Outcome::Failed(format!("Run failed: {e}"))),
            }
        }
        Action::OpenPath { path, stay_open } => {
            let expanded = expand_home(path, home);
            if !expanded.exists() {
                let message = format!("Not found: {}", expanded.display());
                return Resolution::outcome(Outcome::Failed(message));
            }
            match dispatcher.open_with_default(&expanded) {
                Ok(()) => Resolution::outcome(Outcome::Launched { stay_open: *stay_open }),
                Err(e) => Resolution::outcome(Outcome::Failed(format!("Open failed: {e}"))),
            }
        }
        Action::Theme { name } => Resolution {
            outcome: Outcome::StateChanged,
            effect: Effect::ApplyTheme(name.clone()),
        },
        Action::Complete { input } => Resolution {
            outcome: Outcome::StateChanged,
            effect: Effect::SetInput(input.clone()),
        },
        Action::Placeholder => Resolution::outcome(Outcome::Noop),
    }
}

/// Starts real processes, detached into their own session.
pub struct SystemDispatcher {
    terminal: Option<String>,
}

impl SystemDispatcher {
    pub fn new(terminal: Option<String>) -> Self {
        Self { terminal }
    }

    /// Configured terminal, then `$TERMINAL -e`, then xterm.
    fn terminal_command(&self) -> String {
        if let Some(term) = &self.terminal {
            return term.clone();
        }
        match env::var("TERMINAL") {
            Ok(term) if !term.trim().is_empty() => format!("{} -e", term.trim()),
            _ => DEFAULT_TERMINAL.to_string(),
        }
    }

    fn spawn(program: &str, args: &[&str]) -> Result<(), DispatchError> {
        let child = Self::start(program, args)?;
        reap(child);
        Ok(())
    }

    /// Starts `program` in its own process group with stdio detached.
    fn start(program: &str, args: &[&str]) -> Result<Child, DispatchError> {
        info!("spawning {} {:?}", program, args);
        Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .process_group(0)
            .spawn()
            .map_err(|source| DispatchError::Spawn {
                program: program.to_string(),
                source,
            })
    }
}

/// Waits for `child` on a background thread so it never lingers as a zombie
/// while the launcher stays open.
fn reap(mut child: Child) -> JoinHandle<io::Result<ExitStatus>> {
    thread::spawn(move || {
        let status = child.wait();
        debug!("child {} exited: {:?}", child.id(), status);
        status
    })
}

impl Dispatcher for SystemDispatcher {
    fn spawn_background(&mut self, command: &str) -> Result<(), DispatchError> {
        if command.trim().is_empty() {
            return Err(DispatchError::Empty);
        }
        Self::spawn("sh", &["-c", command])
    }

    fn run_in_terminal(&mut self, command: &str) -> Result<(), DispatchError> {
        if command.trim().is_empty() {
            return Err(DispatchError::Empty);
        }
        let terminal = self.terminal_command();
        let mut parts: Vec<&str> = terminal.split_whitespace().collect();
        if parts.is_empty() {
            return Err(DispatchError::Empty);
        }
        let program = parts.remove(0);
        parts.extend(["sh", "-c", command]);
        Self::spawn(program, &parts)
    }

    fn open_with_default(&mut self, path: &Path) -> Result<(), DispatchError> {
        let path = path.to_string_lossy();
        Self::spawn("xdg-open", &[&*path])
    }

    fn open_url(&mut self, url: &str) -> Result<(), DispatchError> {
        Self::spawn("xdg-open", &[url])
    }
}
