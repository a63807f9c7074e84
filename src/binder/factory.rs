//! Static-factory strategy

use super::{ArgValue, ParameterBinder, TypeKind, TypeSpec};
use crate::error::ConversionError;

/// Binds types that expose one or more fallible `&str` factories.
///
/// Candidates are tried in declaration order; the first success wins. When
/// all fail, the last failure is reported.
#[derive(Debug, Clone, Copy, Default)]
pub struct StaticFactoryBinder;

impl ParameterBinder for StaticFactoryBinder {
    fn name(&self) -> &'static str {
        "static-factory"
    }

    fn supports(&self, spec: &TypeSpec) -> bool {
        matches!(spec.kind(), TypeKind::Factories(factories) if !factories.is_empty())
    }

    fn convert(&self, spec: &TypeSpec, raw: &str) -> Result<ArgValue, ConversionError> {
        let TypeKind::Factories(factories) = spec.kind() else {
            return Err(ConversionError::Unsupported {
                type_name: spec.name().to_string(),
            });
        };

        let mut last_failure = String::from("no factory accepted the value");
        for factory in factories {
            match factory(raw) {
                Ok(value) => return Ok(value),
                Err(reason) => last_failure = reason,
            }
        }

        Err(ConversionError::Invalid {
            value: raw.to_string(),
            type_name: spec.name().to_string(),
            reason: last_failure,
        })
    }
}
