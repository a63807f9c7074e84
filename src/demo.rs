//! Demonstration catalogue
//!
//! Three nested scopes used by the `nestshell` binary:
//!
//! ```text
//! main  add sub echo upper grep count subshell leafshell plus→add exit
//! └── calc  mul exit
//!     └── leaf  exit exitall
//! ```

use anyhow::anyhow;

use crate::catalogue::{OperationSet, OperationSpec, ParamSpec};
use crate::error::CatalogueError;
use crate::outcome::{Outcome, ScopeList};
use crate::scope::Scope;

fn operand(name: &'static str, short: char) -> ParamSpec {
    ParamSpec::of::<i64>().long(name).short(short)
}

fn checked(result: Option<i64>) -> Outcome {
    match result {
        Some(value) => Outcome::value(value),
        None => Outcome::failed(anyhow!("integer overflow")),
    }
}

pub fn main_scope() -> Result<Scope, CatalogueError> {
    let arithmetic = OperationSet::new()
        .operation(
            OperationSpec::new("add", |args| {
                let (first, second) = (args.get::<i64>(0)?, args.get::<i64>(1)?);
                Ok(checked(first.checked_add(second)))
            })
            .describe("add two numbers")
            .param(operand("first", 'f').describe("first summand"))
            .param(operand("second", 's').describe("second summand")),
        )
        .operation(
            OperationSpec::new("sub", |args| {
                let (first, second) = (args.get::<i64>(0)?, args.get::<i64>(1)?);
                Ok(checked(first.checked_sub(second)))
            })
            .describe("subtract the second number from the first")
            .param(operand("first", 'f'))
            .param(operand("second", 's')),
        )
        .alias("plus", "add", Some("alias for add"));

    let text = OperationSet::new()
        .operation(
            OperationSpec::new("echo", |args| {
                Ok(Outcome::value(args.opt::<String>(0)?.unwrap_or_default()))
            })
            .describe("print the given text")
            .param(ParamSpec::of::<String>().describe("text to print")),
        )
        .operation(
            OperationSpec::new("upper", |args| {
                Ok(Outcome::value(args.opt::<String>(0)?.unwrap_or_default().to_uppercase()))
            })
            .describe("convert text to upper case")
            .param(ParamSpec::of::<String>()),
        )
        .operation(
            OperationSpec::new("grep", |args| {
                let text = args.opt::<String>(0)?.unwrap_or_default();
                let pattern = args.get::<String>(1)?;
                let lines: Vec<&str> = text.lines().filter(|l| l.contains(&pattern)).collect();
                Ok(Outcome::value(lines.join("\n")))
            })
            .describe("keep the lines containing a pattern")
            .param(ParamSpec::of::<String>().describe("text to filter"))
            .param(
                ParamSpec::of::<String>()
                    .long("pattern")
                    .short('n')
                    .required()
                    .describe("pattern to look for"),
            ),
        )
        .operation(
            OperationSpec::new("count", |args| {
                let text = args.opt::<String>(0)?.unwrap_or_default();
                Ok(Outcome::value(text.lines().count()))
            })
            .describe("count lines")
            .param(ParamSpec::of::<String>()),
        );

    let navigation = OperationSet::new()
        .operation(
            OperationSpec::new("subshell", |_| Ok(calc_scope().into()))
                .describe("enter the calculator shell"),
        )
        .operation(
            OperationSpec::new("leafshell", |_| Ok(enter_both().into()))
                .describe("enter the calculator and leaf shells at once"),
        );

    Scope::builder("main")
        .source(arithmetic)
        .source(text)
        .source(navigation)
        .exit_commands(&["exit"], Some("leave the shell"), Some("bye"))
        .build()
}

fn calc_scope() -> anyhow::Result<Scope> {
    let set = OperationSet::new().operation(
        OperationSpec::new("mul", |args| {
            let (first, second) = (args.get::<i64>(0)?, args.get::<i64>(1)?);
            Ok(checked(first.checked_mul(second)))
        })
        .describe("multiply two numbers")
        .param(operand("first", 'f'))
        .param(operand("second", 's')),
    );

    Ok(Scope::builder("calc")
        .enter_message("calculator shell, 'exit' to leave")
        .source(set)
        .exit_commands(&["exit"], Some("leave the calculator shell"), None)
        .build()?)
}

fn leaf_scope() -> anyhow::Result<Scope> {
    let set = OperationSet::new().operation(
        OperationSpec::new("exitall", |_| Ok(Outcome::exit_to_main()))
            .describe("return to the main shell"),
    );

    Ok(Scope::builder("leaf")
        .source(set)
        .exit_commands(&["exit"], Some("leave the leaf shell"), None)
        .build()?)
}

fn enter_both() -> anyhow::Result<ScopeList> {
    Ok(ScopeList::new(vec![calc_scope()?, leaf_scope()?]).with_message("entered calc and leaf"))
}
