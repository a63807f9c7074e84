//! Command model and command-line parser
//!
//! This crate has no dispatch dependencies. It turns raw command-line text
//! into structured [`Command`] pipelines that a dispatcher can execute.
//!
//! ```
//! use command_core::parse_command_line;
//!
//! let command = parse_command_line("ls | grep -n foo").unwrap();
//! assert_eq!(command.name(), "ls");
//! assert_eq!(command.pipe_target().map(|c| c.name()), Some("grep"));
//! ```

pub mod command;
pub mod error;
pub mod parser;

pub use command::{Command, CommandParameter};
pub use error::SyntaxError;
pub use parser::{parse_command_line, CommandLineParser};
