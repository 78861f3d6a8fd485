//! Interactive dashboard loop.
//!
//! Reads one command per stdin line while a background worker validates.
//! The screen is redrawn after every worker message and every command.

use chrono::Local;
use skillgate_common::{Error, Result};
use skillgate_report::dashboard::{
    DashboardState, EnhancedRenderer, PlainRenderer, Renderer, StatusFilter,
};
use skillgate_runner::{discover, spawn_validation, CancelToken, DiscoveryMode, WorkerMessage};
use skillgate_schema::RuleSet;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc::UnboundedReceiver;
use tracing::{debug, warn};

const HELP: &str =
    "Commands: filter <all|pass|fail|warn>, search <text>, show <name>, rerun, help, quit";

/// One line typed at the dashboard prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Command {
    Filter(StatusFilter),
    Search(String),
    Show(String),
    Rerun,
    Help,
    Quit,
}

impl FromStr for Command {
    type Err = Error;

    fn from_str(line: &str) -> Result<Self> {
        let line = line.trim();
        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim()),
            None => (line, ""),
        };
        match word.to_lowercase().as_str() {
            "filter" | "f" => Ok(Command::Filter(rest.parse()?)),
            "search" | "/" => Ok(Command::Search(rest.to_string())),
            "show" | "s" if !rest.is_empty() => Ok(Command::Show(rest.to_string())),
            "show" | "s" => Err(Error::config("show needs a skill name")),
            "rerun" | "r" => Ok(Command::Rerun),
            "help" | "h" | "?" | "" => Ok(Command::Help),
            "quit" | "q" | "exit" => Ok(Command::Quit),
            other => Err(Error::config(format!("unknown command '{}'", other))),
        }
    }
}

/// A started background run.
struct Run {
    messages: UnboundedReceiver<WorkerMessage>,
    cancel: CancelToken,
    finished: bool,
}

impl Run {
    fn start(skills_dir: &Path, mode: &DiscoveryMode, rules: &Arc<RuleSet>) -> Result<Self> {
        let candidates = discover(skills_dir, mode, rules)?;
        debug!("Dashboard run over {} candidates", candidates.len());
        let cancel = CancelToken::new();
        let (messages, _handle) = spawn_validation(candidates, Arc::clone(rules), cancel.clone());
        Ok(Self {
            messages,
            cancel,
            finished: false,
        })
    }
}

/// Run the dashboard until `quit` or end of input. Returns the exit code of
/// the last completed report, or 0 if none completed.
pub async fn run(
    skills_dir: PathBuf,
    mode: DiscoveryMode,
    rules: Arc<RuleSet>,
    enhanced: bool,
) -> anyhow::Result<u8> {
    let renderer: Box<dyn Renderer> = if enhanced {
        Box::new(EnhancedRenderer)
    } else {
        Box::new(PlainRenderer)
    };

    let mut state = DashboardState::new();
    state.start_run();
    let mut current = Run::start(&skills_dir, &mode, &rules)?;
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    draw(renderer.as_ref(), &state);

    loop {
        tokio::select! {
            message = current.messages.recv(), if !current.finished => match message {
                Some(WorkerMessage::Progress { index, total, identifier }) => {
                    state.set_progress(index, total, identifier);
                }
                Some(WorkerMessage::ReportReady(report)) => {
                    let count = report.validated_count();
                    state.set_report(report);
                    state.set_status(format!(
                        "Validated {} skills at {}",
                        count,
                        Local::now().format("%H:%M:%S")
                    ));
                }
                Some(WorkerMessage::Cancelled) => state.set_status("Validation cancelled"),
                Some(WorkerMessage::Failed(reason)) => {
                    state.set_status(format!("Validation failed: {}", reason));
                }
                None => current.finished = true,
            },

            line = lines.next_line() => {
                let Some(line) = line? else {
                    debug!("Dashboard input closed");
                    break;
                };
                match line.parse::<Command>() {
                    Ok(Command::Quit) => break,
                    Ok(Command::Filter(filter)) => state.set_filter(filter),
                    Ok(Command::Search(query)) => state.set_search(&query),
                    Ok(Command::Show(name)) => {
                        if !state.select(&name) {
                            state.set_status(format!("No result for '{}'", name));
                        }
                    }
                    Ok(Command::Rerun) => {
                        current.cancel.cancel();
                        state.start_run();
                        current = Run::start(&skills_dir, &mode, &rules)?;
                    }
                    Ok(Command::Help) => state.set_status(HELP),
                    Err(e) => {
                        warn!("{}", e);
                        state.set_status(format!("{} ({})", e, HELP));
                    }
                }
            }
        }
        draw(renderer.as_ref(), &state);
    }

    current.cancel.cancel();
    Ok(state.report().map(|r| r.exit_code()).unwrap_or(0))
}

fn draw(renderer: &dyn Renderer, state: &DashboardState) {
    let mut stdout = std::io::stdout().lock();
    if let Err(e) = write!(stdout, "{}\n> ", renderer.render(state)).and_then(|_| stdout.flush()) {
        debug!("Dashboard redraw failed: {}", e);
    }
}
