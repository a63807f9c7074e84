//! String-constructor strategy

use super::{ArgValue, ParameterBinder, TypeKind, TypeSpec};
use crate::error::ConversionError;

/// Binds types constructible directly from an owned `String`
#[derive(Debug, Clone, Copy, Default)]
pub struct StringConstructorBinder;

impl ParameterBinder for StringConstructorBinder {
    fn name(&self) -> &'static str {
        "string-constructor"
    }

    fn supports(&self, spec: &TypeSpec) -> bool {
        matches!(spec.kind(), TypeKind::StringConstructor(_))
    }

    fn convert(&self, spec: &TypeSpec, raw: &str) -> Result<ArgValue, ConversionError> {
        match spec.kind() {
            TypeKind::StringConstructor(construct) => Ok(construct(raw.to_string())),
            _ => Err(ConversionError::Unsupported {
                type_name: spec.name().to_string(),
            }),
        }
    }
}
