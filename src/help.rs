//! Help rendering from catalogue metadata
//!
//! Overview (`help`):
//!
//! ```text
//! add	add two numbers
//! echo	no description available
//!
//! For detailed command description use: help <command>
//! ```
//!
//! Detail (`help add` or `add --help`):
//!
//! ```text
//! add	add two numbers
//!
//! usage: add <first> <second>
//!
//!  -f, --first	first summand
//!  -s, --second	second summand
//! ```

use command_core::Command;

use crate::catalogue::{Catalogue, OperationTarget, ParameterDescriptor};
use crate::config::HelpConfig;

/// What a command asks the help facility for
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HelpRequest {
    Overview,
    Detail(String),
}

/// Alias-aware help generator
#[derive(Debug, Clone)]
pub struct CommandHelp {
    command: String,
    parameter: Option<String>,
    placeholder: String,
    footer: bool,
}

impl Default for CommandHelp {
    fn default() -> Self {
        Self::from_config(&HelpConfig::default())
    }
}

impl CommandHelp {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            ..Self::default()
        }
    }

    pub fn from_config(config: &HelpConfig) -> Self {
        Self {
            command: config.command.clone(),
            parameter: config.parameter.clone(),
            placeholder: config.placeholder.clone(),
            footer: config.footer,
        }
    }

    /// Long parameter name that turns any command into a help request
    pub fn with_parameter(mut self, parameter: Option<String>) -> Self {
        self.parameter = parameter;
        self
    }

    pub fn with_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = placeholder.into();
        self
    }

    pub fn with_footer(mut self, footer: bool) -> Self {
        self.footer = footer;
        self
    }

    pub fn command_name(&self) -> &str {
        &self.command
    }

    /// Classify `command` as a help request, if it is one.
    ///
    /// `help` alone asks for the overview and `help <name>` for a detail. Any
    /// command whose only parameter is `--<help parameter>` asks for its own
    /// detail.
    pub fn request(&self, command: &Command) -> Option<HelpRequest> {
        if command.name() == self.command {
            let subject = command.parameters().first().and_then(|p| {
                p.value
                    .clone()
                    .or_else(|| p.name.clone())
                    .or_else(|| p.short_name.map(String::from))
            });
            return Some(match subject {
                Some(name) if !name.is_empty() => HelpRequest::Detail(name),
                _ => HelpRequest::Overview,
            });
        }

        let parameter = self.parameter.as_deref()?;
        match command.parameters() {
            [only] if only.name.as_deref() == Some(parameter) => {
                Some(HelpRequest::Detail(command.name().to_string()))
            }
            _ => None,
        }
    }

    pub fn render(&self, request: &HelpRequest, catalogue: &Catalogue) -> String {
        match request {
            HelpRequest::Overview => self.overview(catalogue),
            HelpRequest::Detail(name) => self.detail(name, catalogue),
        }
    }

    /// One line per operation, sorted by name
    pub fn overview(&self, catalogue: &Catalogue) -> String {
        let mut lines: Vec<String> = catalogue.iter().map(|t| self.headline(t)).collect();
        if self.footer {
            lines.push(String::new());
            lines.push(format!(
                "For detailed command description use: {} <command>",
                self.command
            ));
        }
        lines.join("\n")
    }

    pub fn detail(&self, name: &str, catalogue: &Catalogue) -> String {
        let Some(target) = catalogue.get(name) else {
            return format!("{}: {}: command not found", self.command, name);
        };
        let parameters = target.resolve().parameters();

        let mut lines = vec![self.headline(target), String::new(), usage(target.name(), parameters)];

        // one described parameter lists them all
        if parameters.iter().any(|p| p.description.is_some()) {
            lines.push(String::new());
            lines.extend(parameters.iter().map(|p| {
                format!(
                    " {}\t{}",
                    flags(p),
                    p.description.as_deref().unwrap_or(&self.placeholder)
                )
            }));
        }

        lines.join("\n")
    }

    fn headline(&self, target: &OperationTarget) -> String {
        format!(
            "{}\t{}",
            target.name(),
            target.description().unwrap_or(&self.placeholder)
        )
    }
}

/// `usage: name <required> [optional]`
fn usage(name: &str, parameters: &[ParameterDescriptor]) -> String {
    let mut line = format!("usage: {}", name);
    for parameter in parameters {
        if parameter.required {
            line.push_str(&format!(" <{}>", parameter.display_name()));
        } else {
            line.push_str(&format!(" [{}]", parameter.display_name()));
        }
    }
    line
}

/// `-f, --first`, `--first`, `-f` or `argN`
fn flags(parameter: &ParameterDescriptor) -> String {
    match (parameter.short_name, parameter.name.as_deref()) {
        (Some(c), Some(name)) => format!("-{}, --{}", c, name),
        (None, Some(name)) => format!("--{}", name),
        (Some(c), None) => format!("-{}", c),
        (None, None) => format!("arg{}", parameter.index),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binder::BinderRegistry;
    use crate::catalogue::{OperationSet, OperationSource, OperationSpec, ParamSpec};
    use crate::outcome::Outcome;
    use command_core::parse_command_line;
    use pretty_assertions::assert_eq;

    fn catalogue() -> Catalogue {
        let set = OperationSet::new()
            .operation(
                OperationSpec::new("add", |_| Ok(Outcome::none()))
                    .describe("add two numbers")
                    .param(ParamSpec::of::<i64>().long("first").short('f').describe("first summand"))
                    .param(ParamSpec::of::<i64>().long("second").short('s').describe("second summand")),
            )
            .operation(
                OperationSpec::new("echo", |_| Ok(Outcome::none()))
                    .param(ParamSpec::of::<String>())
                    .param(ParamSpec::of::<String>().short('n')),
            )
            .alias("plus", "add", None);

        let mut catalogue = Catalogue::new();
        for target in set.operations(&BinderRegistry::default()).unwrap() {
            catalogue.insert(target).unwrap();
        }
        catalogue
    }

    #[test]
    fn test_overview_sorted_with_footer() {
        let help = CommandHelp::default();
        assert_eq!(
            help.overview(&catalogue()),
            "add\tadd two numbers\n\
             echo\tno description available\n\
             plus\tadd two numbers\n\
             \n\
             For detailed command description use: help <command>"
        );
    }

    #[test]
    fn test_overview_without_footer() {
        let help = CommandHelp::default()
            .with_footer(false)
            .with_placeholder("-");
        assert_eq!(
            help.overview(&catalogue()),
            "add\tadd two numbers\necho\t-\nplus\tadd two numbers"
        );
    }

    #[test]
    fn test_detail_with_described_parameters() {
        let help = CommandHelp::default();
        assert_eq!(
            help.detail("add", &catalogue()),
            "add\tadd two numbers\n\
             \n\
             usage: add <first> <second>\n\
             \n \
             -f, --first\tfirst summand\n \
             -s, --second\tsecond summand"
        );
    }

    #[test]
    fn test_detail_without_descriptions() {
        let help = CommandHelp::default();
        assert_eq!(
            help.detail("echo", &catalogue()),
            "echo\tno description available\n\nusage: echo [arg0] [n]"
        );
    }

    #[test]
    fn test_detail_mixed_descriptions() {
        let set = OperationSet::new().operation(
            OperationSpec::new("grep", |_| Ok(Outcome::none()))
                .param(ParamSpec::of::<String>())
                .param(
                    ParamSpec::of::<String>()
                        .long("pattern")
                        .short('n')
                        .describe("pattern to look for"),
                ),
        );
        let mut catalogue = Catalogue::new();
        for target in set.operations(&BinderRegistry::default()).unwrap() {
            catalogue.insert(target).unwrap();
        }

        assert_eq!(
            CommandHelp::default().detail("grep", &catalogue),
            "grep\tno description available\n\
             \n\
             usage: grep [arg0] [pattern]\n\
             \n \
             arg0\tno description available\n \
             -n, --pattern\tpattern to look for"
        );
        assert!(CommandHelp::default()
            .with_placeholder("-")
            .detail("grep", &catalogue)
            .ends_with(" arg0\t-\n -n, --pattern\tpattern to look for"));
    }

    #[test]
    fn test_detail_of_alias_uses_target_parameters() {
        let help = CommandHelp::default();
        let detail = help.detail("plus", &catalogue());
        assert!(detail.starts_with("plus\tadd two numbers"));
        assert!(detail.contains("usage: plus <first> <second>"));
    }

    #[test]
    fn test_detail_not_found() {
        let help = CommandHelp::default();
        assert_eq!(
            help.detail("nonexistent", &catalogue()),
            "help: nonexistent: command not found"
        );
    }

    #[test]
    fn test_request_classification() {
        let help = CommandHelp::default();
        let request = |line: &str| help.request(&parse_command_line(line).unwrap());

        assert_eq!(request("help"), Some(HelpRequest::Overview));
        assert_eq!(request("help add"), Some(HelpRequest::Detail("add".into())));
        assert_eq!(request("help --add"), Some(HelpRequest::Detail("add".into())));
        assert_eq!(request("add --help"), Some(HelpRequest::Detail("add".into())));
        assert_eq!(request("add --help -f 1"), None);
        assert_eq!(request("add 1 2"), None);
    }

    #[test]
    fn test_help_parameter_disabled() {
        let help = CommandHelp::default().with_parameter(None);
        assert_eq!(help.request(&parse_command_line("add --help").unwrap()), None);
    }

    #[test]
    fn test_custom_command_name() {
        let help = CommandHelp::new("man");
        assert_eq!(
            help.request(&parse_command_line("man add").unwrap()),
            Some(HelpRequest::Detail("add".into()))
        );
        assert!(help.overview(&Catalogue::new()).ends_with("use: man <command>"));
        assert_eq!(help.detail("x", &Catalogue::new()), "man: x: command not found");
    }
}
