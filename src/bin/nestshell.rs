//! Interactive demo shell
//!
//! Hosts the demonstration catalogue behind a terminal front-end with line
//! editing and command-name completion.
//!
//! # Usage
//!
//! ```bash
//! nestshell
//! nestshell --config config/nestshell.yaml --separator /
//! RUST_LOG=nestshell=debug nestshell
//! ```

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context as _, Result};
use clap::Parser;
use colored::Colorize;
use rustyline::completion::Completer;
use rustyline::error::ReadlineError;
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::history::{DefaultHistory, History};
use rustyline::validate::Validator;
use rustyline::{Context, Editor, Helper};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use nestshell::config::ConfigLoader;
use nestshell::demo;
use nestshell::runtime::{Frontend, Runtime};
use nestshell::{Dispatcher, Session};

#[derive(Parser)]
#[command(name = "nestshell")]
#[command(version)]
#[command(about = "Nested interactive command shell")]
#[command(long_about = None)]
struct Cli {
    /// Configuration file (YAML)
    #[arg(long, short, env = "NESTSHELL_CONFIG")]
    config: Option<PathBuf>,

    /// Separator placed between scope prompts
    #[arg(long)]
    separator: Option<String>,

    /// Number of history entries to keep
    #[arg(long)]
    history_size: Option<usize>,

    /// Log filter, e.g. `nestshell=debug`
    #[arg(long)]
    log: Option<String>,
}

fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_tracing(cli.log.as_deref());

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}: {:#}", "error".red().bold(), e);
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(directive: Option<&str>) {
    let filter = match directive {
        Some(directive) => EnvFilter::new(directive),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: Cli) -> Result<()> {
    let loader = match cli.config {
        Some(path) => ConfigLoader::new(path),
        None => ConfigLoader::from_env(),
    };
    let mut config = loader.load()?;
    if let Some(separator) = cli.separator {
        config.prompt_path_separator = Some(separator);
    }
    if let Some(size) = cli.history_size {
        config.history.capacity = size;
    }
    config.validate()?;

    let main = demo::main_scope().context("Failed to build the main scope")?;
    info!(config = %loader.path().display(), "starting shell");

    println!("{}", "nestshell".bold().cyan());
    if config.help.enabled {
        println!("type '{}' for a list of commands", config.help.command.yellow());
    }

    Runtime::builder(main)
        .config(config)
        .frontend(TerminalFrontend)
        .build()
        .run()
}

// ============================================================================
// Terminal front-end
// ============================================================================

struct TerminalFrontend;

impl Frontend for TerminalFrontend {
    fn name(&self) -> &str {
        "terminal"
    }

    fn run(&mut self, mut session: Session) -> Result<()> {
        let mut editor: Editor<CommandCompleter, DefaultHistory> =
            Editor::new().context("Failed to initialise line editor")?;
        editor.set_helper(Some(CommandCompleter {
            dispatcher: Arc::clone(session.dispatcher()),
        }));
        size_recall(editor.history_mut(), session.history_capacity())
            .context("Failed to size line history")?;

        while session.is_active() {
            match editor.readline(&session.prompt()) {
                Ok(line) => {
                    remember(editor.history_mut(), &line);
                    let output = session.submit(&line);
                    if !output.is_empty() {
                        println!("{}", output);
                    }
                }
                Err(ReadlineError::Interrupted) => println!("^C"),
                Err(ReadlineError::Eof) => break,
                Err(err) => return Err(err).context("Failed to read input"),
            }
        }
        Ok(())
    }
}

/// Arrow-key recall keeps as many lines as the session history, none when disabled
fn size_recall<H: History>(recall: &mut H, capacity: Option<usize>) -> rustyline::Result<()> {
    recall.set_max_len(capacity.unwrap_or(0))
}

fn remember<H: History>(recall: &mut H, line: &str) {
    if line.trim().is_empty() {
        return;
    }
    if let Err(e) = recall.add(line) {
        warn!(error = %e, "line not added to recall history");
    }
}

/// Completes the command name at the start of the line
struct CommandCompleter {
    dispatcher: Arc<Dispatcher>,
}

impl Completer for CommandCompleter {
    type Candidate = String;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<String>)> {
        let head = &line[..pos];
        let start = head.len() - head.trim_start().len();
        let fragment = &head[start..];
        if fragment.contains(char::is_whitespace) {
            return Ok((pos, Vec::new()));
        }
        Ok((start, self.dispatcher.complete(fragment).into_iter().collect()))
    }
}

impl Hinter for CommandCompleter {
    type Hint = String;
}

impl Highlighter for CommandCompleter {}

impl Validator for CommandCompleter {}

impl Helper for CommandCompleter {}
