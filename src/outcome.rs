//! Invocation outcomes and command results
//!
//! An operation returns an [`Outcome`]:
//!
//! ```text
//! Outcome
//! ├── Value(Option<Value>)   ordinary result, or a scope to enter
//! ├── Failed(anyhow::Error)  functional failure, surfaced to the user
//! └── Exit(ScopeExit)        close one or more scopes
//! ```
//!
//! The dispatcher folds the outcome into the scope stack and produces one
//! immutable [`CommandResult`] per dispatch.

use std::fmt;

use command_core::Command;

use crate::scope::Scope;

// ============================================================================
// Values
// ============================================================================

/// A value returned by an operation
#[derive(Debug, Clone)]
pub enum Value {
    Text(String),
    Bool(bool),
    Int(i64),
    UInt(u64),
    Float(f64),
    Char(char),
    List(Vec<Value>),
    /// A sub-shell to enter
    Scope(Box<Scope>),
    /// Several sub-shells to enter at once
    Scopes(ScopeList),
}

impl Value {
    pub fn text(text: impl Into<String>) -> Self {
        Value::Text(text.into())
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn is_scope(&self) -> bool {
        matches!(self, Value::Scope(_))
    }
}

/// Textual form fed to the next pipeline stage and shown to the user
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Text(text) => f.write_str(text),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(n) => write!(f, "{}", n),
            Value::UInt(n) => write!(f, "{}", n),
            Value::Float(x) => write!(f, "{}", x),
            Value::Char(c) => write!(f, "{}", c),
            Value::List(items) => {
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str("\n")?;
                    }
                    write!(f, "{}", item)?;
                }
                Ok(())
            }
            Value::Scope(scope) => f.write_str(scope.prompt()),
            Value::Scopes(list) => match list.message() {
                Some(message) => f.write_str(message),
                None => {
                    let prompts: Vec<&str> = list.scopes().iter().map(Scope::prompt).collect();
                    f.write_str(&prompts.join("\n"))
                }
            },
        }
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Text(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Text(value.to_string())
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Int(value.into())
    }
}

impl From<u64> for Value {
    fn from(value: u64) -> Self {
        Value::UInt(value)
    }
}

impl From<usize> for Value {
    fn from(value: usize) -> Self {
        Value::UInt(value as u64)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<char> for Value {
    fn from(value: char) -> Self {
        Value::Char(value)
    }
}

impl From<Scope> for Value {
    fn from(scope: Scope) -> Self {
        Value::Scope(Box::new(scope))
    }
}

impl From<ScopeList> for Value {
    fn from(list: ScopeList) -> Self {
        Value::Scopes(list)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Value::List(items.into_iter().map(Into::into).collect())
    }
}

/// Scopes entered together, with an optional message shown on entry
#[derive(Debug, Clone)]
pub struct ScopeList {
    scopes: Vec<Scope>,
    message: Option<String>,
}

impl ScopeList {
    pub fn new(scopes: Vec<Scope>) -> Self {
        Self {
            scopes,
            message: None,
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn scopes(&self) -> &[Scope] {
        &self.scopes
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn into_parts(self) -> (Vec<Scope>, Option<String>) {
        (self.scopes, self.message)
    }
}

// ============================================================================
// Scope exit
// ============================================================================

/// How far a scope exit reaches
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitDepth {
    Levels(usize),
    ToMain,
}

/// Control signal closing one or more scopes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScopeExit {
    pub depth: ExitDepth,
    pub message: Option<String>,
}

impl ScopeExit {
    pub fn levels(levels: usize) -> Self {
        Self {
            depth: ExitDepth::Levels(levels),
            message: None,
        }
    }

    pub fn to_main() -> Self {
        Self {
            depth: ExitDepth::ToMain,
            message: None,
        }
    }

    /// Signed count: negative closes everything down to the main scope.
    pub fn from_count(count: i64) -> Self {
        match usize::try_from(count) {
            Ok(levels) => Self::levels(levels),
            Err(_) => Self::to_main(),
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

// ============================================================================
// Outcome
// ============================================================================

/// What an invoked operation produced
#[derive(Debug)]
pub enum Outcome {
    Value(Option<Value>),
    Failed(anyhow::Error),
    Exit(ScopeExit),
}

impl Outcome {
    pub fn value(value: impl Into<Value>) -> Self {
        Outcome::Value(Some(value.into()))
    }

    /// Success without a value
    pub fn none() -> Self {
        Outcome::Value(None)
    }

    pub fn failed(cause: impl Into<anyhow::Error>) -> Self {
        Outcome::Failed(cause.into())
    }

    pub fn exit(levels: usize) -> Self {
        Outcome::Exit(ScopeExit::levels(levels))
    }

    pub fn exit_to_main() -> Self {
        Outcome::Exit(ScopeExit::to_main())
    }
}

impl<T: Into<Value>> From<anyhow::Result<T>> for Outcome {
    fn from(result: anyhow::Result<T>) -> Self {
        match result {
            Ok(value) => Outcome::value(value),
            Err(cause) => Outcome::Failed(cause),
        }
    }
}

// ============================================================================
// Command result
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandState {
    Succeeded,
    Failed,
}

/// Effect a dispatch had on the scope stack
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Stay,
    /// Number of scopes pushed
    Entered(usize),
    Exited { requested: ExitDepth, popped: usize },
}

impl Transition {
    pub fn is_exit(&self) -> bool {
        matches!(self, Transition::Exited { .. })
    }
}

/// Result of one dispatch attempt; immutable once built.
///
/// A value may only be present on success, a cause only on failure.
#[derive(Debug)]
pub struct CommandResult {
    command: Command,
    state: CommandState,
    value: Option<Value>,
    cause: Option<anyhow::Error>,
    transition: Transition,
}

impl CommandResult {
    pub fn succeeded(command: Command, value: Option<Value>, transition: Transition) -> Self {
        Self {
            command,
            state: CommandState::Succeeded,
            value,
            cause: None,
            transition,
        }
    }

    pub fn failed(command: Command, cause: anyhow::Error) -> Self {
        Self {
            command,
            state: CommandState::Failed,
            value: None,
            cause: Some(cause),
            transition: Transition::Stay,
        }
    }

    pub fn command(&self) -> &Command {
        &self.command
    }

    pub fn state(&self) -> CommandState {
        self.state
    }

    pub fn is_succeeded(&self) -> bool {
        self.state == CommandState::Succeeded
    }

    pub fn is_failed(&self) -> bool {
        self.state == CommandState::Failed
    }

    pub fn value(&self) -> Option<&Value> {
        self.value.as_ref()
    }

    pub fn cause(&self) -> Option<&anyhow::Error> {
        self.cause.as_ref()
    }

    pub fn transition(&self) -> Transition {
        self.transition
    }

    /// Value as text; empty when absent
    pub fn value_text(&self) -> String {
        self.value.as_ref().map(Value::to_string).unwrap_or_default()
    }

    pub fn into_value(self) -> Option<Value> {
        self.value
    }
}
