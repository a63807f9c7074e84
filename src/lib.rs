//! nestshell: a nested interactive command shell framework
//!
//! A host registers operations in scopes; front-ends submit command lines to
//! a [`Session`]; the [`Dispatcher`] parses, binds, invokes and tracks which
//! scope is active.
//!
//! ```text
//! front-end ──line──► Session ──► parser (command-core)
//!                        │
//!                        ▼
//!                   PipelineExecutor ──stage──► Dispatcher
//!                                                 ├── help
//!                                                 ├── ScopeStack.top ─► Catalogue
//!                                                 ├── bind (binders)
//!                                                 └── invoke ─► Outcome ─► stack
//! ```
//!
//! ```
//! use std::sync::Arc;
//! use nestshell::catalogue::{OperationSet, OperationSpec, ParamSpec};
//! use nestshell::outcome::Outcome;
//! use nestshell::scope::Scope;
//! use nestshell::{Dispatcher, Session};
//!
//! let main = Scope::builder("main")
//!     .source(OperationSet::new().operation(
//!         OperationSpec::new("greet", |args| {
//!             let name = args.opt::<String>(0)?.unwrap_or_else(|| "world".into());
//!             Ok(Outcome::value(format!("hello {}", name)))
//!         })
//!         .param(ParamSpec::of::<String>().long("name")),
//!     ))
//!     .build()
//!     .unwrap();
//!
//! let mut session = Session::new(Arc::new(Dispatcher::new(main)));
//! assert_eq!(session.submit("greet --name=bob"), "hello bob");
//! ```

pub mod binder;
pub mod catalogue;
pub mod config;
pub mod demo;
pub mod dispatcher;
pub mod error;
pub mod help;
pub mod history;
pub mod outcome;
pub mod pipeline;
pub mod runtime;
pub mod scope;
pub mod session;

pub use command_core::{parse_command_line, Command, CommandLineParser, CommandParameter, SyntaxError};

pub use catalogue::{BoundArgs, Catalogue, OperationSet, OperationSpec, ParamSpec};
pub use config::{ConfigLoader, ShellConfig};
pub use dispatcher::Dispatcher;
pub use error::{BindError, CatalogueError, DispatchError, InvocationError, ShellError};
pub use outcome::{CommandResult, Outcome, ScopeExit, ScopeList, Value};
pub use runtime::{Frontend, LineFrontend, Runtime};
pub use scope::Scope;
pub use session::Session;
