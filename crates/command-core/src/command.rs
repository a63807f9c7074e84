//! Command model
//!
//! A parsed command line is a chain of [`Command`]s. Each command carries an
//! ordered list of [`CommandParameter`]s and, when it is a pipeline stage
//! other than the last, the command it pipes into.
//!
//! ```text
//! ls | grep -n foo
//!
//! Command "ls"
//!   └── pipe target: Command "grep" [ -n foo ]
//! ```

use std::fmt;
use std::hash::{Hash, Hasher};

// ============================================================================
// Parameters
// ============================================================================

/// A single parsed parameter.
///
/// `index` is the position in the parsed argument list, assigned in parse
/// order regardless of whether the parameter is long, short or anonymous.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct CommandParameter {
    pub index: usize,
    pub name: Option<String>,
    pub short_name: Option<char>,
    pub value: Option<String>,
}

impl CommandParameter {
    /// Anonymous positional parameter
    pub fn positional(index: usize, value: impl Into<String>) -> Self {
        Self {
            index,
            value: Some(value.into()),
            ..Self::default()
        }
    }

    /// Long parameter (`--name[=value]`)
    pub fn long(index: usize, name: impl Into<String>, value: Option<String>) -> Self {
        Self {
            index,
            name: Some(name.into()),
            value,
            ..Self::default()
        }
    }

    /// Short parameter (`-c [value]`)
    pub fn short(index: usize, short_name: char, value: Option<String>) -> Self {
        Self {
            index,
            short_name: Some(short_name),
            value,
            ..Self::default()
        }
    }

    /// A parameter without a value is "unset".
    pub fn is_set(&self) -> bool {
        self.value.is_some()
    }

    /// Neither a long nor a short name.
    pub fn is_anonymous(&self) -> bool {
        self.name.is_none() && self.short_name.is_none()
    }

    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }

    /// Copy of this parameter moved to another index.
    fn reindexed(&self, index: usize) -> Self {
        Self {
            index,
            ..self.clone()
        }
    }
}

impl fmt::Display for CommandParameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.name, self.short_name, &self.value) {
            (Some(name), _, Some(value)) => write!(f, "--{}={}", name, quote(value)),
            (Some(name), _, None) => write!(f, "--{}", name),
            (None, Some(c), Some(value)) => write!(f, "-{} {}", c, quote(value)),
            (None, Some(c), None) => write!(f, "-{}", c),
            (None, None, Some(value)) => write!(f, "{}", quote(value)),
            (None, None, None) => write!(f, "\"\""),
        }
    }
}

/// Quote a token when it would not survive re-parsing as a bare word.
fn quote(token: &str) -> String {
    let needs_quotes = token.is_empty()
        || token.starts_with('-')
        || token.chars().any(|c| c.is_whitespace() || c == '|');
    if needs_quotes {
        format!("\"{}\"", token)
    } else {
        token.to_string()
    }
}

// ============================================================================
// Commands
// ============================================================================

/// A structured command, optionally piped into a follow-up command.
///
/// Commands are immutable once built. Two commands are equal iff their names
/// are equal; parameters and pipe targets do not take part in identity.
#[derive(Debug, Clone)]
pub struct Command {
    name: String,
    parameters: Vec<CommandParameter>,
    pipe_target: Option<Box<Command>>,
}

impl Command {
    pub fn new(name: impl Into<String>, parameters: Vec<CommandParameter>) -> Self {
        Self {
            name: name.into(),
            parameters,
            pipe_target: None,
        }
    }

    /// Command without parameters
    pub fn named(name: impl Into<String>) -> Self {
        Self::new(name, Vec::new())
    }

    /// Pipeline stage whose result feeds `target`
    pub fn piped(
        name: impl Into<String>,
        parameters: Vec<CommandParameter>,
        target: Command,
    ) -> Self {
        Self {
            name: name.into(),
            parameters,
            pipe_target: Some(Box::new(target)),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn parameters(&self) -> &[CommandParameter] {
        &self.parameters
    }

    /// Parameter at the given parse index
    pub fn parameter(&self, index: usize) -> Option<&CommandParameter> {
        self.parameters.iter().find(|p| p.index == index)
    }

    pub fn pipe_target(&self) -> Option<&Command> {
        self.pipe_target.as_deref()
    }

    pub fn is_piped(&self) -> bool {
        self.pipe_target.is_some()
    }

    /// This command and every stage it pipes into, in execution order.
    pub fn stages(&self) -> Vec<&Command> {
        let mut stages = vec![self];
        let mut current = self;
        while let Some(next) = current.pipe_target() {
            stages.push(next);
            current = next;
        }
        stages
    }

    /// Build the next pipeline stage from the textual result of this one.
    ///
    /// The produced command carries `previous_result` as anonymous parameter 0;
    /// the target's own parameters follow at indices 1..=n with name, short
    /// name and value preserved. If the target is itself piped, the produced
    /// command keeps chaining to the target's target.
    ///
    /// Returns `None` when this command is the last stage.
    pub fn create_pipe_target(&self, previous_result: &str) -> Option<Command> {
        let target = self.pipe_target.as_deref()?;

        let mut parameters = Vec::with_capacity(target.parameters.len() + 1);
        parameters.push(CommandParameter::positional(0, previous_result));
        parameters.extend(
            target
                .parameters
                .iter()
                .enumerate()
                .map(|(i, p)| p.reindexed(i + 1)),
        );

        Some(Command {
            name: target.name.clone(),
            parameters,
            pipe_target: target.pipe_target.clone(),
        })
    }

    /// Structural comparison: name, parameters and the whole pipe chain.
    pub fn same_structure(&self, other: &Command) -> bool {
        self.name == other.name
            && self.parameters == other.parameters
            && match (self.pipe_target(), other.pipe_target()) {
                (Some(a), Some(b)) => a.same_structure(b),
                (None, None) => true,
                _ => false,
            }
    }
}

impl PartialEq for Command {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for Command {}

impl Hash for Command {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
    }
}

/// Renders the command back into command-line text.
impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", quote(&self.name))?;
        for parameter in &self.parameters {
            write!(f, " {}", parameter)?;
        }
        if let Some(target) = self.pipe_target() {
            write!(f, " | {}", target)?;
        }
        Ok(())
    }
}
