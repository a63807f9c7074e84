//! Error types for binding, discovery and dispatch
//!
//! Functional failures raised by operations are not errors at this level:
//! they travel as `anyhow::Error` inside a failed
//! [`CommandResult`](crate::outcome::CommandResult). Everything here aborts a
//! dispatch before or instead of producing a result.

use command_core::SyntaxError;
use thiserror::Error;

/// Text could not be converted into a parameter's declared type
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConversionError {
    #[error("cannot convert '{value}' to {type_name}: {reason}")]
    Invalid {
        value: String,
        type_name: String,
        reason: String,
    },

    #[error("no binder supports type {type_name}")]
    Unsupported { type_name: String },
}

/// Parsed parameters could not be bound to an operation's declaration
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BindError {
    #[error("missing required parameter [{parameter}]")]
    MissingParameter { operation: String, parameter: String },

    #[error("insufficient value [{value}] for parameter [{parameter}]")]
    InsufficientValue {
        operation: String,
        parameter: String,
        value: String,
        #[source]
        source: ConversionError,
    },
}

impl BindError {
    /// Name of the offending parameter
    pub fn parameter(&self) -> &str {
        match self {
            BindError::MissingParameter { parameter, .. }
            | BindError::InsufficientValue { parameter, .. } => parameter,
        }
    }
}

/// The operation could not be called at all.
///
/// Distinct from a functional failure, which the operation reports through
/// [`Outcome::Failed`](crate::outcome::Outcome::Failed).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InvocationError {
    #[error("argument {index}: {reason}")]
    ArgumentMismatch { index: usize, reason: String },

    #[error("operation is not invocable: {reason}")]
    NotInvocable { reason: String },
}

/// Building a catalogue from operation sources failed
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CatalogueError {
    #[error("duplicate operation '{name}'")]
    DuplicateOperation { name: String },

    #[error("alias '{alias}' refers to unknown operation '{target}'")]
    UnknownAliasTarget { alias: String, target: String },
}

/// Dispatch-level failure: never wrapped into a `CommandResult`
#[derive(Error, Debug)]
pub enum DispatchError {
    #[error("{name}: command not found")]
    CommandNotFound { name: String },

    #[error("{0}")]
    Bind(#[from] BindError),

    #[error("{operation}: {source}")]
    Invocation {
        operation: String,
        #[source]
        source: InvocationError,
    },
}

/// Anything that stops a command line before it yields a result
#[derive(Error, Debug)]
pub enum ShellError {
    #[error(transparent)]
    Syntax(#[from] SyntaxError),

    #[error(transparent)]
    Dispatch(#[from] DispatchError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_bind_error_names_parameter() {
        let err = BindError::MissingParameter {
            operation: "add".into(),
            parameter: "first".into(),
        };
        assert_eq!(err.to_string(), "missing required parameter [first]");
        assert_eq!(err.parameter(), "first");
    }

    #[test]
    fn test_insufficient_value_keeps_source() {
        let err = BindError::InsufficientValue {
            operation: "add".into(),
            parameter: "first".into(),
            value: "x".into(),
            source: ConversionError::Invalid {
                value: "x".into(),
                type_name: "i64".into(),
                reason: "invalid digit found in string".into(),
            },
        };
        assert_eq!(
            err.to_string(),
            "insufficient value [x] for parameter [first]"
        );
        assert!(err.source().is_some());
    }

    #[test]
    fn test_dispatch_error_from_bind() {
        let err: DispatchError = BindError::MissingParameter {
            operation: "add".into(),
            parameter: "second".into(),
        }
        .into();
        assert!(matches!(err, DispatchError::Bind(_)));
        assert_eq!(err.to_string(), "missing required parameter [second]");
    }

    #[test]
    fn test_shell_error_is_transparent() {
        let err: ShellError = DispatchError::CommandNotFound { name: "ls".into() }.into();
        assert_eq!(err.to_string(), "ls: command not found");
    }
}
