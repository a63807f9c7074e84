//! Parameter binding
//!
//! Converts textual arguments into typed values for declared operation
//! parameters. A [`TypeSpec`] describes a parameter's type and how it can be
//! built from text; a [`ParameterBinder`] strategy decides whether it can
//! handle a `TypeSpec`, whether the parameter is mandatory, and performs the
//! conversion.
//!
//! Strategies live in a [`BinderRegistry`] and are tried in registration
//! order; the first one that supports a type wins.
//!
//! | Strategy | Handles | Required |
//! |----------|---------|----------|
//! | [`ScalarBinder`] | `bool`, `char`, integers, floats, `String` | non-string scalars |
//! | [`StaticFactoryBinder`] | types with fallible `&str` factories | no |
//! | [`StringConstructorBinder`] | types built from an owned `String` | no |

mod constructor;
mod factory;
mod scalar;

use std::any::{self, Any};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

pub use constructor::StringConstructorBinder;
pub use factory::StaticFactoryBinder;
pub use scalar::ScalarBinder;

use crate::error::ConversionError;

// ============================================================================
// Values
// ============================================================================

/// Type-erased converted argument
pub struct ArgValue {
    value: Box<dyn Any + Send + Sync>,
    type_name: &'static str,
}

impl ArgValue {
    pub fn new<T: Any + Send + Sync>(value: T) -> Self {
        Self {
            value: Box::new(value),
            type_name: any::type_name::<T>(),
        }
    }

    /// Rust type name of the wrapped value
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.value.downcast_ref::<T>()
    }

    pub fn is<T: Any>(&self) -> bool {
        self.value.is::<T>()
    }
}

impl fmt::Debug for ArgValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArgValue")
            .field("type_name", &self.type_name)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Type descriptors
// ============================================================================

/// Built-in scalar kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarType {
    Bool,
    Char,
    I8,
    I16,
    I32,
    I64,
    Isize,
    U8,
    U16,
    U32,
    U64,
    Usize,
    F32,
    F64,
    String,
}

impl ScalarType {
    pub fn is_string(self) -> bool {
        matches!(self, ScalarType::String)
    }
}

/// Rust types that map onto a [`ScalarType`]
pub trait Scalar: Any + Send + Sync {
    const KIND: ScalarType;
}

macro_rules! impl_scalar {
    ($($ty:ty => $kind:ident),* $(,)?) => {
        $(impl Scalar for $ty {
            const KIND: ScalarType = ScalarType::$kind;
        })*
    };
}

impl_scalar! {
    bool => Bool,
    char => Char,
    i8 => I8,
    i16 => I16,
    i32 => I32,
    i64 => I64,
    isize => Isize,
    u8 => U8,
    u16 => U16,
    u32 => U32,
    u64 => U64,
    usize => Usize,
    f32 => F32,
    f64 => F64,
    String => String,
}

/// Fallible construction from text, one candidate of a static-factory type
pub type Factory = Arc<dyn Fn(&str) -> Result<ArgValue, String> + Send + Sync>;

/// Infallible construction from an owned string
pub type StringConstructor = Arc<dyn Fn(String) -> ArgValue + Send + Sync>;

/// How a parameter type can be built from text
#[derive(Clone)]
pub enum TypeKind {
    Scalar(ScalarType),
    Factories(Vec<Factory>),
    StringConstructor(StringConstructor),
    /// No textual construction; no built-in binder supports it
    Opaque,
}

/// Declared type of an operation parameter
#[derive(Clone)]
pub struct TypeSpec {
    name: &'static str,
    kind: TypeKind,
}

impl TypeSpec {
    /// Built-in scalar type
    pub fn of<T: Scalar>() -> Self {
        Self {
            name: any::type_name::<T>(),
            kind: TypeKind::Scalar(T::KIND),
        }
    }

    /// Type with a single `FromStr` factory
    pub fn parsed<T>() -> Self
    where
        T: FromStr + Send + Sync + 'static,
        T::Err: fmt::Display,
    {
        let factory: Factory = Arc::new(|raw: &str| {
            raw.parse::<T>()
                .map(ArgValue::new)
                .map_err(|e| e.to_string())
        });
        Self {
            name: any::type_name::<T>(),
            kind: TypeKind::Factories(vec![factory]),
        }
    }

    /// Type built directly from an owned string
    pub fn from_string<T>() -> Self
    where
        T: From<String> + Send + Sync + 'static,
    {
        Self {
            name: any::type_name::<T>(),
            kind: TypeKind::StringConstructor(Arc::new(|raw: String| ArgValue::new(T::from(raw)))),
        }
    }

    /// Type with several candidate factories, tried in order
    pub fn with_factories(name: &'static str, factories: Vec<Factory>) -> Self {
        Self {
            name,
            kind: TypeKind::Factories(factories),
        }
    }

    pub fn opaque(name: &'static str) -> Self {
        Self {
            name,
            kind: TypeKind::Opaque,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn kind(&self) -> &TypeKind {
        &self.kind
    }

    pub fn scalar(&self) -> Option<ScalarType> {
        match self.kind {
            TypeKind::Scalar(scalar) => Some(scalar),
            _ => None,
        }
    }
}

impl fmt::Debug for TypeSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match &self.kind {
            TypeKind::Scalar(scalar) => format!("Scalar({:?})", scalar),
            TypeKind::Factories(factories) => format!("Factories({})", factories.len()),
            TypeKind::StringConstructor(_) => "StringConstructor".to_string(),
            TypeKind::Opaque => "Opaque".to_string(),
        };
        f.debug_struct("TypeSpec")
            .field("name", &self.name)
            .field("kind", &kind)
            .finish()
    }
}

// ============================================================================
// Strategies
// ============================================================================

/// A text-to-value conversion strategy
pub trait ParameterBinder: Send + Sync + fmt::Debug {
    /// Short strategy name for diagnostics
    fn name(&self) -> &'static str;

    fn supports(&self, spec: &TypeSpec) -> bool;

    /// Whether a parameter of this type must always be supplied
    fn is_required(&self, _spec: &TypeSpec) -> bool {
        false
    }

    fn convert(&self, spec: &TypeSpec, raw: &str) -> Result<ArgValue, ConversionError>;
}

/// Ordered set of binder strategies
#[derive(Debug, Clone)]
pub struct BinderRegistry {
    binders: Vec<Arc<dyn ParameterBinder>>,
}

impl Default for BinderRegistry {
    fn default() -> Self {
        Self {
            binders: vec![
                Arc::new(ScalarBinder),
                Arc::new(StaticFactoryBinder),
                Arc::new(StringConstructorBinder),
            ],
        }
    }
}

impl BinderRegistry {
    /// Registry without any strategies
    pub fn empty() -> Self {
        Self {
            binders: Vec::new(),
        }
    }

    /// Append a strategy; it is tried after all existing ones
    pub fn register(&mut self, binder: impl ParameterBinder + 'static) -> &mut Self {
        self.binders.push(Arc::new(binder));
        self
    }

    /// First strategy supporting `spec`
    pub fn binder_for(&self, spec: &TypeSpec) -> Option<Arc<dyn ParameterBinder>> {
        self.binders.iter().find(|b| b.supports(spec)).cloned()
    }

    pub fn len(&self) -> usize {
        self.binders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.binders.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Celsius(f64);

    #[derive(Debug)]
    struct UpperBinder;

    impl ParameterBinder for UpperBinder {
        fn name(&self) -> &'static str {
            "upper"
        }

        fn supports(&self, spec: &TypeSpec) -> bool {
            spec.name() == "upper"
        }

        fn convert(&self, _spec: &TypeSpec, raw: &str) -> Result<ArgValue, ConversionError> {
            Ok(ArgValue::new(raw.to_uppercase()))
        }
    }

    #[test]
    fn test_default_registry_order() {
        let registry = BinderRegistry::default();
        assert_eq!(registry.len(), 3);

        let scalar = registry.binder_for(&TypeSpec::of::<i32>()).unwrap();
        assert_eq!(scalar.name(), "scalar");

        let string = registry.binder_for(&TypeSpec::of::<String>()).unwrap();
        assert_eq!(string.name(), "scalar");

        let factory = registry
            .binder_for(&TypeSpec::parsed::<std::net::Ipv4Addr>())
            .unwrap();
        assert_eq!(factory.name(), "static-factory");

        let ctor = registry
            .binder_for(&TypeSpec::from_string::<std::path::PathBuf>())
            .unwrap();
        assert_eq!(ctor.name(), "string-constructor");
    }

    #[test]
    fn test_opaque_type_unsupported() {
        let registry = BinderRegistry::default();
        assert!(registry.binder_for(&TypeSpec::opaque("Socket")).is_none());
    }

    #[test]
    fn test_register_custom_binder() {
        let mut registry = BinderRegistry::default();
        registry.register(UpperBinder);

        let binder = registry.binder_for(&TypeSpec::opaque("upper")).unwrap();
        let value = binder.convert(&TypeSpec::opaque("upper"), "shout").unwrap();
        assert_eq!(value.downcast_ref::<String>().unwrap(), "SHOUT");
    }

    #[test]
    fn test_empty_registry() {
        let registry = BinderRegistry::empty();
        assert!(registry.is_empty());
        assert!(registry.binder_for(&TypeSpec::of::<bool>()).is_none());
    }

    #[test]
    fn test_arg_value_downcast() {
        let value = ArgValue::new(Celsius(21.5));
        assert!(value.is::<Celsius>());
        assert!(value.downcast_ref::<f64>().is_none());
        assert_eq!(value.downcast_ref::<Celsius>(), Some(&Celsius(21.5)));
        assert!(value.type_name().ends_with("Celsius"));
    }

    #[test]
    fn test_type_spec_names() {
        assert_eq!(TypeSpec::of::<u16>().name(), "u16");
        assert_eq!(TypeSpec::of::<u16>().scalar(), Some(ScalarType::U16));
        assert_eq!(TypeSpec::parsed::<u16>().scalar(), None);
    }
}
