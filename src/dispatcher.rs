//! Dispatcher and shell-stack machine
//!
//! Routes a parsed [`Command`] to an operation of the active scope and folds
//! the outcome back into the scope stack.
//!
//! ```text
//! dispatch(command)
//!   1. help request?        → render help, stack untouched
//!   2. lookup in top scope  → CommandNotFound
//!   3. resolve aliases
//!   4. bind + invoke        → BindError / InvocationError
//!   5. apply outcome:
//!        Exit(n)        pop min(n, depth-1), or down to main
//!        Scope          push
//!        [Scope, ..]    push all
//!        Failed(e)      FAILED result
//!        value          SUCCEEDED result
//! ```
//!
//! The stack is guarded by one lock per dispatcher. It is held for the
//! top-of-stack read and for the transition, never during invocation.

use std::collections::BTreeSet;
use std::sync::{Mutex, MutexGuard, PoisonError};

use command_core::Command;
use tracing::debug;

use crate::catalogue::bind;
use crate::config::ShellConfig;
use crate::error::DispatchError;
use crate::help::CommandHelp;
use crate::outcome::{CommandResult, ExitDepth, Outcome, Transition, Value};
use crate::scope::{Scope, ScopeStack};

pub struct Dispatcher {
    stack: Mutex<ScopeStack>,
    help: Option<CommandHelp>,
    prompt_path_separator: Option<String>,
}

impl Dispatcher {
    /// Dispatcher over `main` without a help facility
    pub fn new(main: Scope) -> Self {
        Self {
            stack: Mutex::new(ScopeStack::new(main)),
            help: None,
            prompt_path_separator: None,
        }
    }

    pub fn from_config(main: Scope, config: &ShellConfig) -> Self {
        let help = config
            .help
            .enabled
            .then(|| CommandHelp::from_config(&config.help));
        Self {
            stack: Mutex::new(ScopeStack::new(main)),
            help,
            prompt_path_separator: config.prompt_path_separator.clone(),
        }
    }

    pub fn with_help(mut self, help: CommandHelp) -> Self {
        self.help = Some(help);
        self
    }

    /// Separator used when the top scope defines none
    pub fn with_prompt_path_separator(mut self, separator: impl Into<String>) -> Self {
        self.prompt_path_separator = Some(separator.into());
        self
    }

    pub fn help(&self) -> Option<&CommandHelp> {
        self.help.as_ref()
    }

    fn stack(&self) -> MutexGuard<'_, ScopeStack> {
        self.stack.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Run one command against the active scope
    pub fn dispatch(&self, command: &Command) -> Result<CommandResult, DispatchError> {
        let scope = self.current_scope();

        if let Some(help) = &self.help {
            if let Some(request) = help.request(command) {
                debug!(command = command.name(), ?request, "rendering help");
                let text = help.render(&request, scope.catalogue());
                return Ok(CommandResult::succeeded(
                    command.clone(),
                    Some(Value::Text(text)),
                    Transition::Stay,
                ));
            }
        }

        let target = scope
            .lookup(command.name())
            .ok_or_else(|| DispatchError::CommandNotFound {
                name: command.name().to_string(),
            })?;
        let operation = target.resolve();
        if target.is_alias() {
            debug!(alias = target.name(), operation = operation.name(), "alias resolved");
        }

        let args = bind(command, operation)?;
        let outcome = operation
            .invoke(&args)
            .map_err(|source| DispatchError::Invocation {
                operation: operation.name().to_string(),
                source,
            })?;

        Ok(self.apply(command, outcome))
    }

    fn apply(&self, command: &Command, outcome: Outcome) -> CommandResult {
        match outcome {
            Outcome::Failed(cause) => {
                debug!(command = command.name(), %cause, "operation failed");
                CommandResult::failed(command.clone(), cause)
            }
            Outcome::Exit(exit) => {
                let mut stack = self.stack();
                let popped = match exit.depth {
                    ExitDepth::Levels(levels) => stack.pop(levels),
                    ExitDepth::ToMain => stack.pop_to_main(),
                };
                debug!(requested = ?exit.depth, popped, depth = stack.depth(), "scope exit");
                CommandResult::succeeded(
                    command.clone(),
                    exit.message.map(Value::Text),
                    Transition::Exited {
                        requested: exit.depth,
                        popped,
                    },
                )
            }
            Outcome::Value(Some(Value::Scope(scope))) => {
                let message = scope.enter_message().map(Value::text);
                self.enter(command, vec![*scope], message)
            }
            Outcome::Value(Some(Value::Scopes(list))) => {
                let (scopes, message) = list.into_parts();
                self.enter(command, scopes, message.map(Value::Text))
            }
            Outcome::Value(Some(Value::List(items))) if is_scope_list(&items) => {
                let scopes = items
                    .into_iter()
                    .filter_map(|item| match item {
                        Value::Scope(scope) => Some(*scope),
                        _ => None,
                    })
                    .collect();
                self.enter(command, scopes, None)
            }
            Outcome::Value(value) => {
                CommandResult::succeeded(command.clone(), value, Transition::Stay)
            }
        }
    }

    fn enter(&self, command: &Command, scopes: Vec<Scope>, message: Option<Value>) -> CommandResult {
        let entered = scopes.len();
        let mut stack = self.stack();
        for scope in scopes {
            debug!(prompt = scope.prompt(), "entering scope");
            stack.push(scope);
        }
        let transition = if entered == 0 {
            Transition::Stay
        } else {
            Transition::Entered(entered)
        };
        CommandResult::succeeded(command.clone(), message, transition)
    }

    /// Prompt path of the active scope stack
    pub fn prompt(&self) -> String {
        self.stack().prompt(self.prompt_path_separator.as_deref())
    }

    pub fn depth(&self) -> usize {
        self.stack().depth()
    }

    /// Snapshot of the top scope
    pub fn current_scope(&self) -> Scope {
        self.stack().top().clone()
    }

    /// Operation names in the active scope starting with `fragment`
    pub fn complete(&self, fragment: &str) -> BTreeSet<String> {
        let scope = self.current_scope();
        let help = self.help.as_ref().map(CommandHelp::command_name);
        scope
            .catalogue()
            .names()
            .chain(help)
            .filter(|name| name.starts_with(fragment))
            .map(str::to_string)
            .collect()
    }
}

/// Non-empty and made of scopes only
fn is_scope_list(items: &[Value]) -> bool {
    !items.is_empty() && items.iter().all(Value::is_scope)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalogue::{OperationSet, OperationSpec, ParamSpec};
    use crate::error::{BindError, InvocationError};
    use crate::outcome::{ScopeExit, ScopeList};
    use anyhow::anyhow;
    use command_core::parse_command_line;
    use std::sync::Arc;

    fn leaf() -> Scope {
        Scope::builder("leaf")
            .exit_commands(&["exit"], Some("leave"), None)
            .source(OperationSet::new().operation(OperationSpec::new("exitall", |_| {
                Ok(Outcome::exit_to_main())
            })))
            .build()
            .unwrap()
    }

    fn sub() -> Scope {
        Scope::builder("sub")
            .enter_message("entered sub")
            .exit_commands(&["exit"], None, Some("left sub"))
            .source(OperationSet::new().operation(OperationSpec::new("leafshell", |_| {
                Ok(Outcome::value(leaf()))
            })))
            .build()
            .unwrap()
    }

    fn main_scope() -> Scope {
        let set = OperationSet::new()
            .operation(
                OperationSpec::new("add", |args| {
                    Ok(Outcome::value(args.get::<i64>(0)? + args.get::<i64>(1)?))
                })
                .describe("add two numbers")
                .param(ParamSpec::of::<i64>().long("first").short('f'))
                .param(ParamSpec::of::<i64>().long("second").short('s')),
            )
            .operation(OperationSpec::new("subshell", |_| Ok(Outcome::value(sub()))))
            .operation(OperationSpec::new("deep", |_| {
                Ok(Outcome::value(
                    ScopeList::new(vec![sub(), leaf()]).with_message("two levels down"),
                ))
            }))
            .operation(OperationSpec::new("pair", |_| {
                Ok(Outcome::value(vec![Value::from(sub()), Value::from(leaf())]))
            }))
            .operation(OperationSpec::new("mixed", |_| {
                Ok(Outcome::value(vec![Value::from(sub()), Value::text("x")]))
            }))
            .operation(OperationSpec::new("none", |_| Ok(Outcome::value(ScopeList::new(vec![])))))
            .operation(OperationSpec::new("fail", |_| Ok(Outcome::failed(anyhow!("boom")))))
            .operation(OperationSpec::new("broken", |_| {
                Err(InvocationError::NotInvocable {
                    reason: "host gone".into(),
                })
            }))
            .operation(OperationSpec::new("close", |args| {
                Ok(Outcome::Exit(ScopeExit::from_count(args.get::<i64>(0)?)))
            })
            .param(ParamSpec::of::<i64>()))
            .alias("plus", "add", None);

        Scope::builder("main")
            .source(set)
            .exit_commands(&["exit"], None, Some("bye"))
            .build()
            .unwrap()
    }

    fn dispatcher() -> Dispatcher {
        Dispatcher::from_config(main_scope(), &ShellConfig::default())
    }

    fn run(dispatcher: &Dispatcher, line: &str) -> Result<CommandResult, DispatchError> {
        dispatcher.dispatch(&parse_command_line(line).unwrap())
    }

    #[test]
    fn test_dispatch_binds_and_invokes() {
        let d = dispatcher();
        let result = run(&d, "add -f 2 -s 3").unwrap();
        assert!(result.is_succeeded());
        assert_eq!(result.value_text(), "5");
        assert_eq!(result.transition(), Transition::Stay);
    }

    #[test]
    fn test_alias_dispatches_to_target() {
        let d = dispatcher();
        assert_eq!(run(&d, "plus 4 5").unwrap().value_text(), "9");
    }

    #[test]
    fn test_command_not_found() {
        let d = dispatcher();
        let err = run(&d, "mul 2 3").unwrap_err();
        assert!(matches!(err, DispatchError::CommandNotFound { ref name } if name == "mul"));
    }

    #[test]
    fn test_bind_failure_is_dispatch_error() {
        let d = dispatcher();
        let err = run(&d, "add 1").unwrap_err();
        assert!(matches!(
            err,
            DispatchError::Bind(BindError::MissingParameter { .. })
        ));
    }

    #[test]
    fn test_functional_failure_is_result() {
        let d = dispatcher();
        let result = run(&d, "fail").unwrap();
        assert!(result.is_failed());
        assert_eq!(result.cause().unwrap().to_string(), "boom");
    }

    #[test]
    fn test_invocation_failure_escalates() {
        let d = dispatcher();
        let err = run(&d, "broken").unwrap_err();
        assert!(matches!(err, DispatchError::Invocation { ref operation, .. } if operation == "broken"));
    }

    #[test]
    fn test_enter_and_exit_scope() {
        let d = dispatcher();
        let entered = run(&d, "subshell").unwrap();
        assert_eq!(entered.transition(), Transition::Entered(1));
        assert_eq!(entered.value_text(), "entered sub");
        assert_eq!(d.depth(), 2);
        assert_eq!(d.prompt(), "sub");

        // main's operations are not reachable from sub
        assert!(run(&d, "add 1 2").is_err());

        let exited = run(&d, "exit").unwrap();
        assert_eq!(exited.value_text(), "left sub");
        assert_eq!(
            exited.transition(),
            Transition::Exited {
                requested: ExitDepth::Levels(1),
                popped: 1
            }
        );
        assert_eq!(d.depth(), 1);
        assert_eq!(d.prompt(), "main");
    }

    #[test]
    fn test_exit_at_main_is_clamped() {
        let d = dispatcher();
        let result = run(&d, "exit").unwrap();
        assert_eq!(
            result.transition(),
            Transition::Exited {
                requested: ExitDepth::Levels(1),
                popped: 0
            }
        );
        assert_eq!(result.value_text(), "bye");
        assert_eq!(d.depth(), 1);
    }

    #[test]
    fn test_exit_to_main() {
        let d = dispatcher();
        run(&d, "subshell").unwrap();
        run(&d, "leafshell").unwrap();
        assert_eq!(d.depth(), 3);

        let result = run(&d, "exitall").unwrap();
        assert_eq!(
            result.transition(),
            Transition::Exited {
                requested: ExitDepth::ToMain,
                popped: 2
            }
        );
        assert_eq!(d.current_scope().prompt(), "main");
    }

    #[test]
    fn test_negative_count_closes_to_main() {
        let d = dispatcher();
        let result = run(&d, "close -1").unwrap();
        assert_eq!(
            result.transition(),
            Transition::Exited {
                requested: ExitDepth::ToMain,
                popped: 0
            }
        );
    }

    #[test]
    fn test_scope_list_pushes_all() {
        let d = dispatcher().with_prompt_path_separator("/");
        let result = run(&d, "deep").unwrap();
        assert_eq!(result.transition(), Transition::Entered(2));
        assert_eq!(result.value_text(), "two levels down");
        assert_eq!(d.prompt(), "main/sub/leaf");
    }

    #[test]
    fn test_homogeneous_list_pushes_all() {
        let d = dispatcher();
        let result = run(&d, "pair").unwrap();
        assert_eq!(result.transition(), Transition::Entered(2));
        assert!(result.value().is_none());
        assert_eq!(d.current_scope().prompt(), "leaf");
    }

    #[test]
    fn test_mixed_list_is_plain_value() {
        let d = dispatcher();
        let result = run(&d, "mixed").unwrap();
        assert_eq!(result.transition(), Transition::Stay);
        assert_eq!(d.depth(), 1);
        assert_eq!(result.value_text(), "sub\nx");
    }

    #[test]
    fn test_empty_scope_list_stays() {
        let d = dispatcher();
        let result = run(&d, "none").unwrap();
        assert_eq!(result.transition(), Transition::Stay);
        assert_eq!(d.depth(), 1);
    }

    #[test]
    fn test_help_overview_does_not_touch_stack() {
        let d = dispatcher();
        run(&d, "subshell").unwrap();
        let result = run(&d, "help").unwrap();
        assert!(result.value_text().starts_with("exit\t"));
        assert!(result.value_text().contains("leafshell\t"));
        assert_eq!(d.depth(), 2);
    }

    #[test]
    fn test_help_parameter() {
        let d = dispatcher();
        let result = run(&d, "add --help").unwrap();
        assert!(result.value_text().contains("usage: add <first> <second>"));
    }

    #[test]
    fn test_without_help_facility() {
        let d = Dispatcher::new(main_scope());
        assert!(matches!(
            run(&d, "help"),
            Err(DispatchError::CommandNotFound { .. })
        ));
    }

    #[test]
    fn test_complete() {
        let d = dispatcher();
        let names: Vec<String> = d.complete("e").into_iter().collect();
        assert_eq!(names, vec!["exit".to_string()]);

        let all = d.complete("");
        assert!(all.contains("help"));
        assert!(all.contains("plus"));
        assert_eq!(all.iter().next().map(String::as_str), Some("add"));
    }

    #[test]
    fn test_concurrent_dispatch_shares_stack() {
        let d = Arc::new(dispatcher());
        std::thread::scope(|s| {
            for _ in 0..4 {
                let d = Arc::clone(&d);
                s.spawn(move || {
                    for _ in 0..25 {
                        assert_eq!(run(&d, "add 1 1").unwrap().value_text(), "2");
                    }
                });
            }
        });
        assert_eq!(d.depth(), 1);
    }
}
