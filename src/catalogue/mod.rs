//! Operation catalogue
//!
//! Operations are the invokable units a scope exposes. They arrive from
//! [`OperationSource`]s (discovery adapters) as [`OperationTarget`]s and are
//! collected into a name-sorted [`Catalogue`].
//!
//! ```text
//! OperationSource ──operations()──► Vec<OperationTarget> ──► Catalogue
//!                                     ├── Direct(OperationDescriptor)
//!                                     └── Alias { name, target }
//! ```

mod binding;
mod registry;

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

pub use binding::{bind, BoundArgs};
pub use registry::{OperationSet, OperationSpec, ParamSpec};

use crate::binder::{ArgValue, BinderRegistry, ParameterBinder, TypeSpec};
use crate::error::{CatalogueError, ConversionError, InvocationError};
use crate::outcome::Outcome;

/// Invocation thunk bound to an operation
pub type Invoker = Arc<dyn Fn(&BoundArgs) -> Result<Outcome, InvocationError> + Send + Sync>;

// ============================================================================
// Descriptors
// ============================================================================

/// Declared parameter of an operation
#[derive(Clone)]
pub struct ParameterDescriptor {
    pub index: usize,
    pub name: Option<String>,
    pub short_name: Option<char>,
    pub description: Option<String>,
    pub required: bool,
    type_spec: TypeSpec,
    binder: Arc<dyn ParameterBinder>,
}

impl ParameterDescriptor {
    /// `required` is forced on when the binder considers the type mandatory.
    pub fn new(
        index: usize,
        type_spec: TypeSpec,
        binder: Arc<dyn ParameterBinder>,
        required: bool,
    ) -> Self {
        let required = required || binder.is_required(&type_spec);
        Self {
            index,
            name: None,
            short_name: None,
            description: None,
            required,
            type_spec,
            binder,
        }
    }

    pub fn with_name(mut self, name: Option<String>) -> Self {
        self.name = name;
        self
    }

    pub fn with_short_name(mut self, short_name: Option<char>) -> Self {
        self.short_name = short_name;
        self
    }

    pub fn with_description(mut self, description: Option<String>) -> Self {
        self.description = description;
        self
    }

    pub fn type_spec(&self) -> &TypeSpec {
        &self.type_spec
    }

    pub fn convert(&self, raw: &str) -> Result<ArgValue, ConversionError> {
        self.binder.convert(&self.type_spec, raw)
    }

    /// Long name, else short name, else `arg<index>`
    pub fn display_name(&self) -> String {
        match (&self.name, self.short_name) {
            (Some(name), _) => name.clone(),
            (None, Some(c)) => c.to_string(),
            (None, None) => format!("arg{}", self.index),
        }
    }
}

impl fmt::Debug for ParameterDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParameterDescriptor")
            .field("index", &self.index)
            .field("name", &self.name)
            .field("short_name", &self.short_name)
            .field("required", &self.required)
            .field("type", &self.type_spec.name())
            .field("binder", &self.binder.name())
            .finish()
    }
}

/// One invokable unit exposed by a host
#[derive(Clone)]
pub struct OperationDescriptor {
    name: String,
    description: Option<String>,
    parameters: Vec<ParameterDescriptor>,
    invoker: Invoker,
}

impl OperationDescriptor {
    pub fn new(
        name: impl Into<String>,
        description: Option<String>,
        parameters: Vec<ParameterDescriptor>,
        invoker: Invoker,
    ) -> Self {
        Self {
            name: name.into(),
            description,
            parameters,
            invoker,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn parameters(&self) -> &[ParameterDescriptor] {
        &self.parameters
    }

    pub fn invoke(&self, args: &BoundArgs) -> Result<Outcome, InvocationError> {
        if args.len() != self.parameters.len() {
            return Err(InvocationError::NotInvocable {
                reason: format!(
                    "expected {} arguments, got {}",
                    self.parameters.len(),
                    args.len()
                ),
            });
        }
        (self.invoker)(args)
    }
}

impl fmt::Debug for OperationDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OperationDescriptor")
            .field("name", &self.name)
            .field("description", &self.description)
            .field("parameters", &self.parameters)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Targets
// ============================================================================

/// A catalogue entry: a real operation or a named redirect to one
#[derive(Debug, Clone)]
pub enum OperationTarget {
    Direct(Arc<OperationDescriptor>),
    Alias {
        name: String,
        description: Option<String>,
        target: Arc<OperationTarget>,
    },
}

impl OperationTarget {
    pub fn direct(descriptor: OperationDescriptor) -> Self {
        OperationTarget::Direct(Arc::new(descriptor))
    }

    pub fn alias(
        name: impl Into<String>,
        description: Option<String>,
        target: OperationTarget,
    ) -> Self {
        OperationTarget::Alias {
            name: name.into(),
            description,
            target: Arc::new(target),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            OperationTarget::Direct(descriptor) => descriptor.name(),
            OperationTarget::Alias { name, .. } => name,
        }
    }

    /// Own description, else that of the resolved operation
    pub fn description(&self) -> Option<&str> {
        match self {
            OperationTarget::Direct(descriptor) => descriptor.description(),
            OperationTarget::Alias { description, .. } => description
                .as_deref()
                .or_else(|| self.resolve().description()),
        }
    }

    pub fn is_alias(&self) -> bool {
        matches!(self, OperationTarget::Alias { .. })
    }

    /// Follow aliases until a real operation is reached
    pub fn resolve(&self) -> &OperationDescriptor {
        let mut current = self;
        loop {
            match current {
                OperationTarget::Direct(descriptor) => return descriptor.as_ref(),
                OperationTarget::Alias { target, .. } => current = target.as_ref(),
            }
        }
    }
}

// ============================================================================
// Catalogue
// ============================================================================

/// Name-sorted set of operation targets
#[derive(Debug, Clone, Default)]
pub struct Catalogue {
    operations: BTreeMap<String, OperationTarget>,
}

impl Catalogue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge operations from several sources; a name collision is an error.
    pub fn from_sources(
        sources: &[Box<dyn OperationSource>],
        binders: &BinderRegistry,
    ) -> Result<Self, CatalogueError> {
        let mut catalogue = Self::new();
        for source in sources {
            for target in source.operations(binders)? {
                catalogue.insert(target)?;
            }
        }
        Ok(catalogue)
    }

    pub fn insert(&mut self, target: OperationTarget) -> Result<(), CatalogueError> {
        let name = target.name().to_string();
        if self.operations.contains_key(&name) {
            return Err(CatalogueError::DuplicateOperation { name });
        }
        self.operations.insert(name, target);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&OperationTarget> {
        self.operations.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.operations.contains_key(name)
    }

    /// Targets in name order
    pub fn iter(&self) -> impl Iterator<Item = &OperationTarget> {
        self.operations.values()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.operations.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.operations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }
}

/// Discovery capability: lists the operations a host exposes
pub trait OperationSource: Send + Sync {
    fn operations(
        &self,
        binders: &BinderRegistry,
    ) -> Result<Vec<OperationTarget>, CatalogueError>;
}
