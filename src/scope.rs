//! Scopes and the scope stack
//!
//! A [`Scope`] is one level of nesting: a prompt fragment plus the catalogue
//! of operations reachable while it is on top. Scopes are entered when an
//! operation returns one and left through scope-exit signals.
//!
//! ```text
//! ScopeStack (bottom → top)
//! ┌──────┐ ┌──────┐ ┌──────┐
//! │ main │ │ sub  │ │ leaf │   prompt: "main/sub/leaf"
//! └──────┘ └──────┘ └──────┘
//!  never popped          ▲ dispatch looks up here
//! ```

use std::fmt;
use std::sync::Arc;

use crate::binder::BinderRegistry;
use crate::catalogue::{Catalogue, OperationSet, OperationSource, OperationSpec, OperationTarget};
use crate::error::CatalogueError;
use crate::outcome::{Outcome, ScopeExit};

// ============================================================================
// Scope
// ============================================================================

/// One level of the shell
#[derive(Clone)]
pub struct Scope {
    prompt: String,
    prompt_path_separator: Option<String>,
    enter_message: Option<String>,
    catalogue: Arc<Catalogue>,
}

impl Scope {
    pub fn new(prompt: impl Into<String>, catalogue: Catalogue) -> Self {
        Self {
            prompt: prompt.into(),
            prompt_path_separator: None,
            enter_message: None,
            catalogue: Arc::new(catalogue),
        }
    }

    pub fn builder(prompt: impl Into<String>) -> ScopeBuilder {
        ScopeBuilder::new(prompt)
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    pub fn prompt_path_separator(&self) -> Option<&str> {
        self.prompt_path_separator.as_deref()
    }

    pub fn enter_message(&self) -> Option<&str> {
        self.enter_message.as_deref()
    }

    pub fn catalogue(&self) -> &Catalogue {
        &self.catalogue
    }

    pub fn lookup(&self, name: &str) -> Option<&OperationTarget> {
        self.catalogue.get(name)
    }
}

impl fmt::Debug for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scope")
            .field("prompt", &self.prompt)
            .field("prompt_path_separator", &self.prompt_path_separator)
            .field("operations", &self.catalogue.names().collect::<Vec<_>>())
            .finish()
    }
}

/// Declarative scope construction
pub struct ScopeBuilder {
    prompt: String,
    prompt_path_separator: Option<String>,
    enter_message: Option<String>,
    sources: Vec<Box<dyn OperationSource>>,
    binders: BinderRegistry,
}

impl ScopeBuilder {
    fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            prompt_path_separator: None,
            enter_message: None,
            sources: Vec::new(),
            binders: BinderRegistry::default(),
        }
    }

    pub fn prompt_path_separator(mut self, separator: impl Into<String>) -> Self {
        self.prompt_path_separator = Some(separator.into());
        self
    }

    /// Message shown as the result of entering this scope
    pub fn enter_message(mut self, message: impl Into<String>) -> Self {
        self.enter_message = Some(message.into());
        self
    }

    pub fn source(mut self, source: impl OperationSource + 'static) -> Self {
        self.sources.push(Box::new(source));
        self
    }

    pub fn binders(mut self, binders: BinderRegistry) -> Self {
        self.binders = binders;
        self
    }

    /// Parameterless commands that close this scope, one level each
    pub fn exit_commands(
        self,
        names: &[&str],
        description: Option<&str>,
        message: Option<&str>,
    ) -> Self {
        let exit = match message {
            Some(message) => ScopeExit::levels(1).with_message(message),
            None => ScopeExit::levels(1),
        };

        let set = names.iter().fold(OperationSet::new(), |set, name| {
            let exit = exit.clone();
            let mut spec = OperationSpec::new(*name, move |_| Ok(Outcome::Exit(exit.clone())));
            if let Some(description) = description {
                spec = spec.describe(description);
            }
            set.operation(spec)
        });
        self.source(set)
    }

    /// Collect all sources into the catalogue; name collisions fail the build
    pub fn build(self) -> Result<Scope, CatalogueError> {
        let catalogue = Catalogue::from_sources(&self.sources, &self.binders)?;
        Ok(Scope {
            prompt: self.prompt,
            prompt_path_separator: self.prompt_path_separator,
            enter_message: self.enter_message,
            catalogue: Arc::new(catalogue),
        })
    }
}

// ============================================================================
// ScopeStack
// ============================================================================

/// Stack of active scopes. Never empty: the main scope cannot be popped.
#[derive(Debug, Clone)]
pub struct ScopeStack {
    scopes: Vec<Scope>,
}

impl ScopeStack {
    pub fn new(main: Scope) -> Self {
        Self { scopes: vec![main] }
    }

    pub fn main(&self) -> &Scope {
        &self.scopes[0]
    }

    pub fn top(&self) -> &Scope {
        // scopes always holds the main scope
        &self.scopes[self.scopes.len() - 1]
    }

    pub fn depth(&self) -> usize {
        self.scopes.len()
    }

    pub fn push(&mut self, scope: Scope) {
        self.scopes.push(scope);
    }

    /// Pop up to `levels` scopes, stopping at main. Returns how many were popped.
    pub fn pop(&mut self, levels: usize) -> usize {
        let popped = levels.min(self.scopes.len() - 1);
        self.scopes.truncate(self.scopes.len() - popped);
        popped
    }

    pub fn pop_to_main(&mut self) -> usize {
        self.pop(self.scopes.len() - 1)
    }

    /// Bottom to top
    pub fn iter(&self) -> impl Iterator<Item = &Scope> {
        self.scopes.iter()
    }

    /// Prompt path from bottom to top.
    ///
    /// Joined by the top scope's separator, else `default_separator`; with
    /// neither, only the top scope's prompt.
    pub fn prompt(&self, default_separator: Option<&str>) -> String {
        let top = self.top();
        match top.prompt_path_separator().or(default_separator) {
            Some(separator) => self
                .scopes
                .iter()
                .map(Scope::prompt)
                .collect::<Vec<_>>()
                .join(separator),
            None => top.prompt().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalogue::ParamSpec;

    fn scope(prompt: &str) -> Scope {
        Scope::new(prompt, Catalogue::new())
    }

    #[test]
    fn test_pop_is_clamped() {
        let mut stack = ScopeStack::new(scope("main"));
        stack.push(scope("a"));
        stack.push(scope("b"));

        assert_eq!(stack.pop(1), 1);
        assert_eq!(stack.top().prompt(), "a");
        assert_eq!(stack.pop(10), 1);
        assert_eq!(stack.depth(), 1);
        assert_eq!(stack.pop(1), 0);
        assert_eq!(stack.top().prompt(), "main");
    }

    #[test]
    fn test_pop_to_main() {
        let mut stack = ScopeStack::new(scope("main"));
        assert_eq!(stack.pop_to_main(), 0);
        stack.push(scope("a"));
        stack.push(scope("b"));
        stack.push(scope("c"));
        assert_eq!(stack.pop_to_main(), 3);
        assert_eq!(stack.depth(), 1);
        assert_eq!(stack.main().prompt(), "main");
    }

    #[test]
    fn test_prompt_without_separator() {
        let mut stack = ScopeStack::new(scope("main"));
        stack.push(scope("sub"));
        assert_eq!(stack.prompt(None), "sub");
    }

    #[test]
    fn test_prompt_with_top_separator() {
        let mut stack = ScopeStack::new(scope("main"));
        stack.push(scope("sub"));
        stack.push(Scope::builder("leaf").prompt_path_separator("/").build().unwrap());
        assert_eq!(stack.prompt(None), "main/sub/leaf");
        assert_eq!(stack.prompt(Some(":")), "main/sub/leaf");
    }

    #[test]
    fn test_prompt_with_default_separator() {
        let mut stack = ScopeStack::new(scope("main"));
        stack.push(scope("sub"));
        assert_eq!(stack.prompt(Some(":")), "main:sub");
    }

    #[test]
    fn test_builder_exit_commands() {
        let scope = Scope::builder("sub")
            .enter_message("welcome")
            .exit_commands(&["exit", "quit"], Some("leave sub"), Some("bye"))
            .build()
            .unwrap();

        assert_eq!(scope.enter_message(), Some("welcome"));
        let exit = scope.lookup("quit").unwrap().resolve();
        assert_eq!(exit.description(), Some("leave sub"));
        assert!(exit.parameters().is_empty());

        let outcome = exit.invoke(&Default::default()).unwrap();
        match outcome {
            Outcome::Exit(signal) => {
                assert_eq!(signal, ScopeExit::levels(1).with_message("bye"));
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
    }

    #[test]
    fn test_builder_rejects_duplicates_across_sources() {
        let first = OperationSet::new().operation(OperationSpec::new("ls", |_| Ok(Outcome::none())));
        let second = OperationSet::new().operation(
            OperationSpec::new("ls", |_| Ok(Outcome::none())).param(ParamSpec::of::<String>()),
        );

        let err = Scope::builder("main")
            .source(first)
            .source(second)
            .build()
            .unwrap_err();
        assert_eq!(err, CatalogueError::DuplicateOperation { name: "ls".into() });
    }

    #[test]
    fn test_exit_command_collides_with_operation() {
        let set = OperationSet::new().operation(OperationSpec::new("exit", |_| Ok(Outcome::none())));
        let result = Scope::builder("main")
            .source(set)
            .exit_commands(&["exit"], None, None)
            .build();
        assert!(result.is_err());
    }
}
