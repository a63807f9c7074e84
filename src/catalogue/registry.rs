//! Explicit-registration operation source
//!
//! Operations are declared up front with their parameters and a handler
//! closure capturing whatever host state it needs:
//!
//! ```
//! use nestshell::binder::TypeSpec;
//! use nestshell::catalogue::{OperationSet, OperationSpec, ParamSpec};
//! use nestshell::outcome::Outcome;
//!
//! let set = OperationSet::new()
//!     .operation(
//!         OperationSpec::new("add", |args| {
//!             Ok(Outcome::value(args.get::<i64>(0)? + args.get::<i64>(1)?))
//!         })
//!         .describe("add two numbers")
//!         .param(ParamSpec::of::<i64>().long("first").short('f'))
//!         .param(ParamSpec::of::<i64>().long("second").short('s')),
//!     )
//!     .alias("plus", "add", None);
//! # let _ = set;
//! ```

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use tracing::{debug, warn};

use super::{
    BoundArgs, Invoker, OperationDescriptor, OperationSource, OperationTarget,
    ParameterDescriptor,
};
use crate::binder::{BinderRegistry, Scalar, TypeSpec};
use crate::error::{CatalogueError, InvocationError};
use crate::outcome::Outcome;

// ============================================================================
// Declarations
// ============================================================================

/// Declared parameter; position follows declaration order
#[derive(Debug, Clone)]
pub struct ParamSpec {
    type_spec: TypeSpec,
    name: Option<String>,
    short_name: Option<char>,
    description: Option<String>,
    required: bool,
}

impl ParamSpec {
    pub fn new(type_spec: TypeSpec) -> Self {
        Self {
            type_spec,
            name: None,
            short_name: None,
            description: None,
            required: false,
        }
    }

    /// Parameter of a built-in scalar type
    pub fn of<T: Scalar>() -> Self {
        Self::new(TypeSpec::of::<T>())
    }

    pub fn long(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn short(mut self, short_name: char) -> Self {
        self.short_name = Some(short_name);
        self
    }

    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Mark mandatory even when the type's binder would not
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }
}

/// Declared operation with its handler
#[derive(Clone)]
pub struct OperationSpec {
    name: String,
    description: Option<String>,
    params: Vec<ParamSpec>,
    handler: Invoker,
}

impl OperationSpec {
    pub fn new<F>(name: impl Into<String>, handler: F) -> Self
    where
        F: Fn(&BoundArgs) -> Result<Outcome, InvocationError> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            description: None,
            params: Vec::new(),
            handler: Arc::new(handler),
        }
    }

    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn param(mut self, param: ParamSpec) -> Self {
        self.params.push(param);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Resolve binders for every parameter.
    ///
    /// Returns `None` when some parameter type has no binder.
    fn build(&self, binders: &BinderRegistry) -> Option<OperationDescriptor> {
        let mut parameters = Vec::with_capacity(self.params.len());
        for (index, param) in self.params.iter().enumerate() {
            let Some(binder) = binders.binder_for(&param.type_spec) else {
                warn!(
                    operation = %self.name,
                    parameter = index,
                    type_name = param.type_spec.name(),
                    "no binder supports parameter type; operation skipped"
                );
                return None;
            };

            parameters.push(
                ParameterDescriptor::new(index, param.type_spec.clone(), binder, param.required)
                    .with_name(param.name.clone())
                    .with_short_name(param.short_name)
                    .with_description(param.description.clone()),
            );
        }

        Some(OperationDescriptor::new(
            self.name.clone(),
            self.description.clone(),
            parameters,
            Arc::clone(&self.handler),
        ))
    }
}

#[derive(Clone)]
struct AliasSpec {
    alias: String,
    target: String,
    description: Option<String>,
}

// ============================================================================
// OperationSet
// ============================================================================

/// Operations and aliases registered explicitly
#[derive(Clone, Default)]
pub struct OperationSet {
    operations: Vec<OperationSpec>,
    aliases: Vec<AliasSpec>,
}

impl OperationSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn operation(mut self, spec: OperationSpec) -> Self {
        self.operations.push(spec);
        self
    }

    /// Register `alias` as another name for `target`.
    ///
    /// The target may be an operation or an alias declared earlier.
    pub fn alias(
        mut self,
        alias: impl Into<String>,
        target: impl Into<String>,
        description: Option<&str>,
    ) -> Self {
        self.aliases.push(AliasSpec {
            alias: alias.into(),
            target: target.into(),
            description: description.map(str::to_string),
        });
        self
    }

    pub fn len(&self) -> usize {
        self.operations.len() + self.aliases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty() && self.aliases.is_empty()
    }
}

impl OperationSource for OperationSet {
    fn operations(&self, binders: &BinderRegistry) -> Result<Vec<OperationTarget>, CatalogueError> {
        let mut built: BTreeMap<String, OperationTarget> = BTreeMap::new();
        let mut skipped: BTreeSet<&str> = BTreeSet::new();
        let mut order = Vec::with_capacity(self.len());

        for spec in &self.operations {
            if built.contains_key(spec.name()) || skipped.contains(spec.name()) {
                return Err(CatalogueError::DuplicateOperation {
                    name: spec.name().to_string(),
                });
            }
            match spec.build(binders) {
                Some(descriptor) => {
                    order.push(spec.name().to_string());
                    built.insert(spec.name().to_string(), OperationTarget::direct(descriptor));
                }
                None => {
                    skipped.insert(spec.name());
                }
            }
        }

        for alias in &self.aliases {
            if built.contains_key(&alias.alias) || skipped.contains(alias.alias.as_str()) {
                return Err(CatalogueError::DuplicateOperation {
                    name: alias.alias.clone(),
                });
            }
            if skipped.contains(alias.target.as_str()) {
                warn!(alias = %alias.alias, target = %alias.target, "alias target was skipped; alias skipped");
                skipped.insert(alias.alias.as_str());
                continue;
            }
            let Some(target) = built.get(&alias.target).cloned() else {
                return Err(CatalogueError::UnknownAliasTarget {
                    alias: alias.alias.clone(),
                    target: alias.target.clone(),
                });
            };
            order.push(alias.alias.clone());
            built.insert(
                alias.alias.clone(),
                OperationTarget::alias(alias.alias.clone(), alias.description.clone(), target),
            );
        }

        debug!(operations = built.len(), skipped = skipped.len(), "operation set built");
        Ok(order.into_iter().filter_map(|name| built.remove(&name)).collect())
    }
}
