//! Front-end session
//!
//! The boundary a front-end talks to: it hands over complete command lines
//! and gets back the text to show. Nothing unwinds past
//! [`Session::perform_command`]; every failure becomes a one-line message
//! and the session keeps going.
//!
//! ```text
//! submit(line) ──► history ──► perform_command(line)
//!                                 parse ──► pipeline ──► render
//!                                              │
//!                          history listing ◄───┘ (intercepted per stage)
//! ```

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use command_core::{Command, CommandLineParser};
use tracing::{debug, info, info_span, warn};
use uuid::Uuid;

use crate::config::ShellConfig;
use crate::dispatcher::Dispatcher;
use crate::error::ShellError;
use crate::history::CommandHistory;
use crate::outcome::{CommandResult, ExitDepth, Transition, Value};
use crate::pipeline::PipelineExecutor;

/// History handle, owned by one session or shared by several
pub type SharedHistory = Arc<Mutex<CommandHistory>>;

/// One front-end's view of a dispatcher
pub struct Session {
    id: Uuid,
    dispatcher: Arc<Dispatcher>,
    parser: CommandLineParser,
    history: Option<SharedHistory>,
    history_command: String,
    prompt_stop: String,
    active: bool,
}

impl Session {
    /// Session with its own history, configured from defaults
    pub fn new(dispatcher: Arc<Dispatcher>) -> Self {
        let config = ShellConfig::default();
        let history = Arc::new(Mutex::new(CommandHistory::new(config.history.capacity)));
        Self::with_config(dispatcher, &config, Some(history))
    }

    /// `history` is only consulted when history is enabled in `config`
    pub fn with_config(
        dispatcher: Arc<Dispatcher>,
        config: &ShellConfig,
        history: Option<SharedHistory>,
    ) -> Self {
        let id = Uuid::new_v4();
        info!(session = %id, "session opened");
        Self {
            id,
            dispatcher,
            parser: CommandLineParser::new(),
            history: history.filter(|_| config.history.enabled),
            history_command: config.history.command.clone(),
            prompt_stop: config.prompt_stop.clone(),
            active: true,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn dispatcher(&self) -> &Arc<Dispatcher> {
        &self.dispatcher
    }

    /// False once a scope exit reached past the main scope
    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn deactivate(&mut self) {
        if self.active {
            info!(session = %self.id, "session closed");
        }
        self.active = false;
    }

    /// Prompt path, prompt stop and a trailing space
    pub fn prompt(&self) -> String {
        format!("{}{} ", self.dispatcher.prompt(), self.prompt_stop)
    }

    // ========================================================================
    // Commands
    // ========================================================================

    /// Record a line in history and perform it; blank lines yield no output
    pub fn submit(&mut self, line: &str) -> String {
        if line.trim().is_empty() {
            return String::new();
        }
        if let Some(mut history) = self.history_guard() {
            history.add(line);
        }
        self.perform_command(line)
    }

    /// Parse, execute and render one command line
    pub fn perform_command(&mut self, text: &str) -> String {
        let span = info_span!("command", session = %self.id);
        let _entered = span.enter();

        match self.execute(text) {
            Ok(result) => render(&result),
            Err(err) => {
                warn!(input = text, error = %err, "command rejected");
                err.to_string()
            }
        }
    }

    /// Parse and run `text`, returning the final stage's result
    pub fn execute(&mut self, text: &str) -> Result<CommandResult, ShellError> {
        let command = self.parser.parse(text)?;
        debug!(command = %command, "parsed");

        let result = PipelineExecutor::new(&self.dispatcher)
            .execute_with(&command, |stage| self.intercept(stage))?;

        if self.exits_past_main(&result) {
            self.deactivate();
        }
        Ok(result)
    }

    /// Answer the history listing command without dispatching it
    fn intercept(&self, stage: &Command) -> Option<CommandResult> {
        if stage.name() != self.history_command {
            return None;
        }
        let history = self.history_guard()?;
        Some(CommandResult::succeeded(
            stage.clone(),
            Some(Value::Text(history.listing())),
            Transition::Stay,
        ))
    }

    fn exits_past_main(&self, result: &CommandResult) -> bool {
        match result.transition() {
            Transition::Exited {
                requested,
                popped: 0,
            } => requested != ExitDepth::Levels(0) && self.dispatcher.depth() == 1,
            _ => false,
        }
    }

    // ========================================================================
    // History navigation
    // ========================================================================

    pub fn history(&self) -> Option<&SharedHistory> {
        self.history.as_ref()
    }

    /// Entries the history keeps; `None` when history is disabled
    pub fn history_capacity(&self) -> Option<usize> {
        self.history_guard().map(|h| h.capacity())
    }

    pub fn history_previous(&self) -> String {
        self.history_guard()
            .map(|mut h| h.previous())
            .unwrap_or_default()
    }

    pub fn history_next(&self) -> String {
        self.history_guard().map(|mut h| h.next()).unwrap_or_default()
    }

    fn history_guard(&self) -> Option<MutexGuard<'_, CommandHistory>> {
        self.history
            .as_ref()
            .map(|h| h.lock().unwrap_or_else(PoisonError::into_inner))
    }
}

/// Successful value text, or the failure's cause message
fn render(result: &CommandResult) -> String {
    match result.cause() {
        Some(cause) => cause.to_string(),
        None => result.value_text(),
    }
}
