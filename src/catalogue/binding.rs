//! Binding parsed parameters to declared ones
//!
//! Each declared parameter is matched against the parsed command by long
//! name, then short name, then position among anonymous parameters. The
//! matched text is converted through the parameter's binder.

use std::any::{self, Any};

use command_core::{Command, CommandParameter};
use tracing::trace;

use super::{OperationDescriptor, ParameterDescriptor};
use crate::binder::ArgValue;
use crate::error::{BindError, InvocationError};

/// Converted arguments, one slot per declared parameter.
///
/// Absent optional parameters occupy their slot as `None`.
#[derive(Debug, Default)]
pub struct BoundArgs {
    values: Vec<Option<ArgValue>>,
}

impl BoundArgs {
    pub fn from_values(values: Vec<Option<ArgValue>>) -> Self {
        Self { values }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn is_present(&self, index: usize) -> bool {
        matches!(self.values.get(index), Some(Some(_)))
    }

    /// Borrow a required argument
    pub fn get_ref<T: Any>(&self, index: usize) -> Result<&T, InvocationError> {
        self.opt_ref(index)?
            .ok_or_else(|| mismatch(index, "no value bound".to_string()))
    }

    /// Clone a required argument
    pub fn get<T: Any + Clone>(&self, index: usize) -> Result<T, InvocationError> {
        self.get_ref::<T>(index).cloned()
    }

    /// Clone an optional argument; `None` when it was not supplied
    pub fn opt<T: Any + Clone>(&self, index: usize) -> Result<Option<T>, InvocationError> {
        Ok(self.opt_ref::<T>(index)?.cloned())
    }

    fn opt_ref<T: Any>(&self, index: usize) -> Result<Option<&T>, InvocationError> {
        let slot = self.values.get(index).ok_or_else(|| {
            mismatch(
                index,
                format!("only {} arguments declared", self.values.len()),
            )
        })?;

        match slot {
            None => Ok(None),
            Some(value) => value.downcast_ref::<T>().map(Some).ok_or_else(|| {
                mismatch(
                    index,
                    format!(
                        "expected {}, bound {}",
                        any::type_name::<T>(),
                        value.type_name()
                    ),
                )
            }),
        }
    }
}

fn mismatch(index: usize, reason: String) -> InvocationError {
    InvocationError::ArgumentMismatch { index, reason }
}

/// Bind a parsed command's parameters to an operation's declaration
pub fn bind(command: &Command, operation: &OperationDescriptor) -> Result<BoundArgs, BindError> {
    let mut values = Vec::with_capacity(operation.parameters().len());

    for declared in operation.parameters() {
        let matched = find_match(command.parameters(), declared);
        trace!(
            operation = operation.name(),
            parameter = %declared.display_name(),
            matched = matched.is_some(),
            "binding parameter"
        );

        match matched.and_then(CommandParameter::value) {
            Some(raw) => {
                let value = declared
                    .convert(raw)
                    .map_err(|source| BindError::InsufficientValue {
                        operation: operation.name().to_string(),
                        parameter: declared.display_name(),
                        value: raw.to_string(),
                        source,
                    })?;
                values.push(Some(value));
            }
            None if declared.required => {
                return Err(BindError::MissingParameter {
                    operation: operation.name().to_string(),
                    parameter: declared.display_name(),
                });
            }
            None => values.push(None),
        }
    }

    Ok(BoundArgs::from_values(values))
}

fn find_match<'c>(
    parsed: &'c [CommandParameter],
    declared: &ParameterDescriptor,
) -> Option<&'c CommandParameter> {
    if let Some(name) = declared.name.as_deref() {
        if let Some(found) = parsed.iter().find(|p| p.name.as_deref() == Some(name)) {
            return Some(found);
        }
    }

    if let Some(short_name) = declared.short_name {
        if let Some(found) = parsed.iter().find(|p| p.short_name == Some(short_name)) {
            return Some(found);
        }
    }

    parsed
        .iter()
        .find(|p| p.is_anonymous() && p.index == declared.index)
}
