//! Runtime: one dispatcher, many front-ends
//!
//! Built explicitly, then run: every front-end gets its own thread and its own
//! [`Session`] over the shared dispatcher. `run` returns once all front-ends
//! have stopped.
//!
//! ```no_run
//! use std::io;
//! use nestshell::runtime::{LineFrontend, Runtime};
//! use nestshell::scope::Scope;
//!
//! # fn main() -> anyhow::Result<()> {
//! let main = Scope::builder("main")
//!     .exit_commands(&["exit"], Some("leave the shell"), None)
//!     .build()?;
//! Runtime::builder(main)
//!     .frontend(LineFrontend::new("stdio", io::BufReader::new(io::stdin()), io::stdout()))
//!     .build()
//!     .run()
//! # }
//! ```

use std::io::{BufRead, Write};
use std::sync::{Arc, Mutex};

use anyhow::{anyhow, Context, Result};
use tracing::{error, info};

use crate::config::ShellConfig;
use crate::dispatcher::Dispatcher;
use crate::history::CommandHistory;
use crate::scope::Scope;
use crate::session::{Session, SharedHistory};

// ============================================================================
// Front-ends
// ============================================================================

/// A transport delivering command lines to a session.
///
/// `run` owns the calling thread until the front-end is done, typically at
/// end of input or when the session deactivates.
pub trait Frontend: Send {
    fn name(&self) -> &str;

    fn run(&mut self, session: Session) -> Result<()>;
}

/// Line-oriented front-end over any reader and writer
pub struct LineFrontend<R, W> {
    name: String,
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> LineFrontend<R, W> {
    pub fn new(name: impl Into<String>, input: R, output: W) -> Self {
        Self {
            name: name.into(),
            input,
            output,
        }
    }

    pub fn into_output(self) -> W {
        self.output
    }
}

impl<R: BufRead + Send, W: Write + Send> Frontend for LineFrontend<R, W> {
    fn name(&self) -> &str {
        &self.name
    }

    fn run(&mut self, mut session: Session) -> Result<()> {
        info!(frontend = %self.name, session = %session.id(), "front-end started");
        let mut line = String::new();

        while session.is_active() {
            write!(self.output, "{}", session.prompt())?;
            self.output.flush()?;

            line.clear();
            let read = self
                .input
                .read_line(&mut line)
                .with_context(|| format!("{}: failed to read input", self.name))?;
            if read == 0 {
                writeln!(self.output)?;
                break;
            }

            let output = session.submit(line.trim_end_matches(|c| c == '\r' || c == '\n'));
            if !output.is_empty() {
                writeln!(self.output, "{}", output)?;
            }
        }

        self.output.flush()?;
        info!(frontend = %self.name, "front-end stopped");
        Ok(())
    }
}

// ============================================================================
// Runtime
// ============================================================================

pub struct Runtime {
    dispatcher: Arc<Dispatcher>,
    config: ShellConfig,
    shared_history: Option<SharedHistory>,
    frontends: Vec<Box<dyn Frontend>>,
}

pub struct RuntimeBuilder {
    main: Scope,
    config: ShellConfig,
    frontends: Vec<Box<dyn Frontend>>,
}

impl RuntimeBuilder {
    pub fn config(mut self, config: ShellConfig) -> Self {
        self.config = config;
        self
    }

    pub fn frontend(mut self, frontend: impl Frontend + 'static) -> Self {
        self.frontends.push(Box::new(frontend));
        self
    }

    pub fn build(self) -> Runtime {
        let dispatcher = Arc::new(Dispatcher::from_config(self.main, &self.config));
        let shared_history = self
            .config
            .history
            .shared
            .then(|| new_history(&self.config));
        Runtime {
            dispatcher,
            config: self.config,
            shared_history,
            frontends: self.frontends,
        }
    }
}

fn new_history(config: &ShellConfig) -> SharedHistory {
    Arc::new(Mutex::new(CommandHistory::new(config.history.capacity)))
}

impl Runtime {
    pub fn builder(main: Scope) -> RuntimeBuilder {
        RuntimeBuilder {
            main,
            config: ShellConfig::default(),
            frontends: Vec::new(),
        }
    }

    pub fn dispatcher(&self) -> &Arc<Dispatcher> {
        &self.dispatcher
    }

    pub fn config(&self) -> &ShellConfig {
        &self.config
    }

    /// New session over this runtime's dispatcher.
    ///
    /// Sessions share one history when configured so, else each gets its own.
    pub fn session(&self) -> Session {
        let history = match &self.shared_history {
            Some(shared) => Arc::clone(shared),
            None => new_history(&self.config),
        };
        Session::with_config(Arc::clone(&self.dispatcher), &self.config, Some(history))
    }

    /// Run every front-end on its own thread until all have stopped
    pub fn run(mut self) -> Result<()> {
        let frontends = std::mem::take(&mut self.frontends);
        info!(frontends = frontends.len(), "runtime starting");

        let sessions: Vec<Session> = frontends.iter().map(|_| self.session()).collect();
        let mut failures = Vec::new();

        std::thread::scope(|scope| {
            let handles: Vec<_> = frontends
                .into_iter()
                .zip(sessions)
                .map(|(mut frontend, session)| {
                    let name = frontend.name().to_string();
                    (name, scope.spawn(move || frontend.run(session)))
                })
                .collect();

            for (name, handle) in handles {
                match handle.join() {
                    Ok(Ok(())) => {}
                    Ok(Err(err)) => {
                        error!(frontend = %name, error = %err, "front-end failed");
                        failures.push(format!("{}: {:#}", name, err));
                    }
                    Err(_) => {
                        error!(frontend = %name, "front-end panicked");
                        failures.push(format!("{}: panicked", name));
                    }
                }
            }
        });

        info!("runtime stopped");
        if failures.is_empty() {
            Ok(())
        } else {
            Err(anyhow!("{} front-end(s) failed: {}", failures.len(), failures.join("; ")))
        }
    }
}
