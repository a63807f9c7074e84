//! Scalar strategy: booleans, characters, numbers and strings

use std::fmt::Display;
use std::str::FromStr;

use super::{ArgValue, ParameterBinder, ScalarType, TypeSpec};
use crate::error::ConversionError;

/// Binds built-in scalar types using their canonical textual format.
///
/// Every scalar except `String` is required: there is no sensible absent
/// value for a number or a flag.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScalarBinder;

impl ParameterBinder for ScalarBinder {
    fn name(&self) -> &'static str {
        "scalar"
    }

    fn supports(&self, spec: &TypeSpec) -> bool {
        spec.scalar().is_some()
    }

    fn is_required(&self, spec: &TypeSpec) -> bool {
        spec.scalar().map_or(false, |scalar| !scalar.is_string())
    }

    fn convert(&self, spec: &TypeSpec, raw: &str) -> Result<ArgValue, ConversionError> {
        let Some(scalar) = spec.scalar() else {
            return Err(ConversionError::Unsupported {
                type_name: spec.name().to_string(),
            });
        };

        convert_scalar(scalar, raw).map_err(|reason| ConversionError::Invalid {
            value: raw.to_string(),
            type_name: spec.name().to_string(),
            reason,
        })
    }
}

fn convert_scalar(scalar: ScalarType, raw: &str) -> Result<ArgValue, String> {
    match scalar {
        ScalarType::Bool => parse_bool(raw).map(ArgValue::new),
        ScalarType::Char => parse_char(raw).map(ArgValue::new),
        ScalarType::I8 => parse::<i8>(raw),
        ScalarType::I16 => parse::<i16>(raw),
        ScalarType::I32 => parse::<i32>(raw),
        ScalarType::I64 => parse::<i64>(raw),
        ScalarType::Isize => parse::<isize>(raw),
        ScalarType::U8 => parse::<u8>(raw),
        ScalarType::U16 => parse::<u16>(raw),
        ScalarType::U32 => parse::<u32>(raw),
        ScalarType::U64 => parse::<u64>(raw),
        ScalarType::Usize => parse::<usize>(raw),
        ScalarType::F32 => parse::<f32>(raw),
        ScalarType::F64 => parse::<f64>(raw),
        ScalarType::String => Ok(ArgValue::new(raw.to_string())),
    }
}

fn parse<T>(raw: &str) -> Result<ArgValue, String>
where
    T: FromStr + Send + Sync + 'static,
    T::Err: Display,
{
    raw.parse::<T>().map(ArgValue::new).map_err(|e| e.to_string())
}

/// `true`/`false`, case-insensitive; anything else is rejected
fn parse_bool(raw: &str) -> Result<bool, String> {
    if raw.eq_ignore_ascii_case("true") {
        Ok(true)
    } else if raw.eq_ignore_ascii_case("false") {
        Ok(false)
    } else {
        Err("expected true or false".to_string())
    }
}

fn parse_char(raw: &str) -> Result<char, String> {
    let mut chars = raw.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Ok(c),
        _ => Err("expected exactly one character".to_string()),
    }
}
