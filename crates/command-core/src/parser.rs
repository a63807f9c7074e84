//! Command-line parser
//!
//! Translates raw input text into a pipeline of [`Command`]s.
//!
//! ## Grammar
//!
//! ```text
//! commandLine := command ('|' command)*
//! command     := commandName parameter*
//! parameter   := '--' identifier ('=' value)?
//!              | '-' letter value?
//!              | value
//! value       := '"' .*? '"' | run of non-whitespace, non-pipe, non-quote characters
//! ```
//!
//! Quoted content is taken verbatim with the quotes stripped. A short or long
//! option is only recognised when the character after the dashes is a letter,
//! so `sub -5 3` passes two positional values. A separated short-option value
//! is never itself an option: `ls -a -l` yields two unset flags.
//!
//! Parameters receive ascending indices in parse order. Stages are linked
//! right-to-left, so `a | b | c` yields `a` piped to `b` piped to `c`.

use nom::{
    branch::alt,
    bytes::complete::{tag, take_until, take_while, take_while1},
    character::complete::{char, multispace0, multispace1, satisfy},
    combinator::{all_consuming, cut, map, not, opt, recognize},
    error::{context, VerboseError, VerboseErrorKind},
    multi::many0,
    sequence::{delimited, pair, preceded, terminated, tuple},
    IResult,
};

use crate::command::{Command, CommandParameter};
use crate::error::SyntaxError;

type ParseResult<'a, T> = IResult<&'a str, T, VerboseError<&'a str>>;

// ============================================================================
// Public API
// ============================================================================

/// Stateless, re-entrant command-line parser.
///
/// Holds no state between calls; a single instance can be shared freely or a
/// new one constructed per call.
#[derive(Debug, Clone, Copy, Default)]
pub struct CommandLineParser;

impl CommandLineParser {
    pub fn new() -> Self {
        Self
    }

    /// Parse a command line into the head of its pipeline
    pub fn parse(&self, text: &str) -> Result<Command, SyntaxError> {
        parse_command_line(text)
    }
}

/// Parse a complete command line.
///
/// Returns the first stage; later stages hang off it as pipe targets.
pub fn parse_command_line(text: &str) -> Result<Command, SyntaxError> {
    match all_consuming(command_line)(text) {
        Ok((_, stages)) => Ok(link_stages(stages)),
        Err(nom::Err::Error(e)) | Err(nom::Err::Failure(e)) => Err(syntax_error(text, e)),
        Err(nom::Err::Incomplete(_)) => Err(SyntaxError::new(text.chars().count(), "incomplete input")),
    }
}

// ============================================================================
// Internal Parsers
// ============================================================================

/// Parameter as it appears on the line, before index assignment
enum RawParameter {
    Long(String, Option<String>),
    Short(char, Option<String>),
    Value(String),
}

struct Stage {
    name: String,
    parameters: Vec<RawParameter>,
}

fn command_line(input: &str) -> ParseResult<'_, Vec<Stage>> {
    let (input, _) = multispace0(input)?;
    let (input, first) = command(input)?;
    let (input, rest) = many0(preceded(
        delimited(multispace0, char('|'), multispace0),
        cut(command),
    ))(input)?;
    let (input, _) = multispace0(input)?;

    let mut stages = Vec::with_capacity(rest.len() + 1);
    stages.push(first);
    stages.extend(rest);
    Ok((input, stages))
}

fn command(input: &str) -> ParseResult<'_, Stage> {
    let (input, name) = context("command name", value)(input)?;
    let (input, parameters) = many0(preceded(multispace0, parameter))(input)?;
    Ok((
        input,
        Stage {
            name: name.to_string(),
            parameters,
        },
    ))
}

fn parameter(input: &str) -> ParseResult<'_, RawParameter> {
    alt((
        map(long_parameter, |(name, value)| RawParameter::Long(name, value)),
        map(short_parameter, |(c, value)| RawParameter::Short(c, value)),
        map(value, |v| RawParameter::Value(v.to_string())),
    ))(input)
}

// ============================================================================
// Options
// ============================================================================

/// `--name` or `--name=value`
fn long_parameter(input: &str) -> ParseResult<'_, (String, Option<String>)> {
    let (input, _) = tag("--")(input)?;
    let (input, name) = identifier(input)?;
    let (input, value) = opt(preceded(
        char('='),
        cut(context("parameter value", value)),
    ))(input)?;
    Ok((input, (name.to_string(), non_empty(value))))
}

/// `-c`, `-cvalue` or `-c value`
fn short_parameter(input: &str) -> ParseResult<'_, (char, Option<String>)> {
    let (input, _) = char('-')(input)?;
    let (input, short_name) = satisfy(char::is_alphabetic)(input)?;
    let (input, attached) = opt(value)(input)?;
    if attached.is_some() {
        return Ok((input, (short_name, non_empty(attached))));
    }
    let (input, separated) = opt(preceded(
        multispace1,
        preceded(not(option_start), value),
    ))(input)?;
    Ok((input, (short_name, non_empty(separated))))
}

/// Lookahead for `-x` or `--x`
fn option_start(input: &str) -> ParseResult<'_, &str> {
    recognize(tuple((char('-'), opt(char('-')), satisfy(char::is_alphabetic))))(input)
}

fn identifier(input: &str) -> ParseResult<'_, &str> {
    recognize(pair(
        satisfy(char::is_alphabetic),
        take_while(|c| is_word_char(c) && c != '='),
    ))(input)
}

/// Empty option values count as unset.
fn non_empty(value: Option<&str>) -> Option<String> {
    value.filter(|v| !v.is_empty()).map(str::to_string)
}

// ============================================================================
// Values
// ============================================================================

fn value(input: &str) -> ParseResult<'_, &str> {
    alt((quoted, unquoted))(input)
}

/// Content between double quotes, verbatim
fn quoted(input: &str) -> ParseResult<'_, &str> {
    context(
        "closing quote",
        preceded(char('"'), cut(terminated(take_until("\""), char('"')))),
    )(input)
}

fn unquoted(input: &str) -> ParseResult<'_, &str> {
    take_while1(is_word_char)(input)
}

fn is_word_char(c: char) -> bool {
    !c.is_whitespace() && c != '|' && c != '"'
}

// ============================================================================
// Assembly
// ============================================================================

fn link_stages(stages: Vec<Stage>) -> Command {
    let mut commands = stages
        .into_iter()
        .map(|stage| (stage.name, index_parameters(stage.parameters)))
        .rev();

    // command_line always yields at least one stage
    let (name, parameters) = commands.next().unwrap_or_default();
    let mut head = Command::new(name, parameters);
    for (name, parameters) in commands {
        head = Command::piped(name, parameters, head);
    }
    head
}

fn index_parameters(raw: Vec<RawParameter>) -> Vec<CommandParameter> {
    raw.into_iter()
        .enumerate()
        .map(|(index, parameter)| match parameter {
            RawParameter::Long(name, value) => CommandParameter::long(index, name, value),
            RawParameter::Short(c, value) => CommandParameter::short(index, c, value),
            RawParameter::Value(value) => CommandParameter::positional(index, value),
        })
        .collect()
}

fn syntax_error(text: &str, error: VerboseError<&str>) -> SyntaxError {
    let labelled = error.errors.iter().find_map(|(rest, kind)| match kind {
        VerboseErrorKind::Context(label) => Some((*rest, *label)),
        _ => None,
    });

    let (rest, message) = match labelled {
        Some((rest, label)) => (rest, format!("expected {} but found {}", label, describe(rest))),
        None => {
            let rest = error.errors.first().map(|(rest, _)| *rest).unwrap_or("");
            (rest, format!("unexpected {}", describe(rest)))
        }
    };

    let offset = text.len().saturating_sub(rest.len());
    let position = text
        .get(..offset)
        .map(|consumed| consumed.chars().count())
        .unwrap_or(offset);
    SyntaxError::new(position, message)
}

fn describe(rest: &str) -> String {
    match rest.chars().next() {
        Some(c) => format!("'{}'", c),
        None => "end of input".to_string(),
    }
}
