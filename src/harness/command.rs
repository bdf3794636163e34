//! Parsing of harness command lines.

use crate::queue::SortStrategy;

/// One parsed harness command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Replace the current queue with a fresh empty one.
    New,
    /// Destroy the current queue, leaving none.
    Free,
    /// Insert `value` at the head `count` times.
    InsertHead { value: String, count: usize },
    /// Insert `value` at the tail `count` times.
    InsertTail { value: String, count: usize },
    /// Remove the head, optionally checking the removed text.
    RemoveHead { expected: Option<String> },
    /// Remove the head without reporting its text.
    RemoveHeadQuiet,
    /// Report the size, optionally checking it.
    Size { expected: Option<usize> },
    Reverse,
    Sort,
    Show,
    /// Change a harness setting.
    Set(Setting),
    Help,
    Quit,
}

/// Settings adjustable with `option NAME VALUE`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Setting {
    /// Removal buffer length, terminator excluded.
    Length(usize),
    /// Allocation fault period (0 disables).
    Malloc(u32),
    /// Sort algorithm.
    Strategy(SortStrategy),
    /// Echo commands.
    Echo(bool),
    /// Show the queue after mutating commands.
    Show(bool),
}

/// Errors produced while parsing a command line.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("unknown command '{0}'")]
    UnknownCommand(String),

    #[error("{command}: missing {argument}")]
    MissingArgument {
        command: &'static str,
        argument: &'static str,
    },

    #[error("{command}: too many arguments")]
    TooManyArguments { command: &'static str },

    #[error("{command}: invalid number '{value}'")]
    InvalidNumber { command: &'static str, value: String },

    #[error("unknown option '{0}'")]
    UnknownOption(String),

    #[error("option {name}: invalid value '{value}'")]
    InvalidOptionValue { name: &'static str, value: String },
}

/// Help text listing every command.
pub const HELP: &str = "\
Commands:
  new                 Create a new, empty queue (destroys the current one)
  free                Destroy the current queue
  ih STR [N]          Insert STR at head N times (default 1)
  it STR [N]          Insert STR at tail N times (default 1)
  rh [STR]            Remove head, checking it equals STR if given
  rhq                 Remove head without reporting the value
  size [N]            Report queue size, checking it equals N if given
  reverse             Reverse the queue in place
  sort                Sort the queue in ascending order
  show                Print the queue contents
  option NAME VALUE   Set length, malloc, strategy, echo or show
  help                Show this text
  quit                Stop processing commands";

/// Parse one input line.
///
/// Returns `Ok(None)` for blank lines and `#` comments.
///
/// # Errors
///
/// Returns a [`ParseError`] for unknown commands and malformed arguments.
pub fn parse(line: &str) -> Result<Option<Command>, ParseError> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }

    let mut words = line.split_whitespace();
    let Some(name) = words.next() else {
        return Ok(None);
    };
    let args: Vec<&str> = words.collect();

    let command = match name {
        "new" => no_args("new", &args, Command::New)?,
        "free" => no_args("free", &args, Command::Free)?,
        "ih" => {
            let (value, count) = insert_args("ih", &args)?;
            Command::InsertHead { value, count }
        }
        "it" => {
            let (value, count) = insert_args("it", &args)?;
            Command::InsertTail { value, count }
        }
        "rh" => Command::RemoveHead {
            expected: optional_arg("rh", &args)?.map(str::to_string),
        },
        "rhq" => no_args("rhq", &args, Command::RemoveHeadQuiet)?,
        "size" => Command::Size {
            expected: optional_arg("size", &args)?
                .map(|value| number("size", value))
                .transpose()?,
        },
        "reverse" => no_args("reverse", &args, Command::Reverse)?,
        "sort" => no_args("sort", &args, Command::Sort)?,
        "show" => no_args("show", &args, Command::Show)?,
        "option" => Command::Set(setting(&args)?),
        "help" => no_args("help", &args, Command::Help)?,
        "quit" => no_args("quit", &args, Command::Quit)?,
        other => return Err(ParseError::UnknownCommand(other.to_string())),
    };

    Ok(Some(command))
}

fn no_args(command: &'static str, args: &[&str], parsed: Command) -> Result<Command, ParseError> {
    if args.is_empty() {
        Ok(parsed)
    } else {
        Err(ParseError::TooManyArguments { command })
    }
}

fn optional_arg<'a>(command: &'static str, args: &[&'a str]) -> Result<Option<&'a str>, ParseError> {
    match args {
        [] => Ok(None),
        [value] => Ok(Some(*value)),
        _ => Err(ParseError::TooManyArguments { command }),
    }
}

fn insert_args(command: &'static str, args: &[&str]) -> Result<(String, usize), ParseError> {
    match args {
        [] => Err(ParseError::MissingArgument {
            command,
            argument: "string",
        }),
        [value] => Ok(((*value).to_string(), 1)),
        [value, count] => Ok(((*value).to_string(), number(command, count)?)),
        _ => Err(ParseError::TooManyArguments { command }),
    }
}

fn number<T: std::str::FromStr>(command: &'static str, value: &str) -> Result<T, ParseError> {
    value.parse().map_err(|_| ParseError::InvalidNumber {
        command,
        value: value.to_string(),
    })
}

fn flag(name: &'static str, value: &str) -> Result<bool, ParseError> {
    match value {
        "1" | "on" | "true" => Ok(true),
        "0" | "off" | "false" => Ok(false),
        _ => Err(ParseError::InvalidOptionValue {
            name,
            value: value.to_string(),
        }),
    }
}

fn setting(args: &[&str]) -> Result<Setting, ParseError> {
    let [name, value] = args else {
        return Err(match args.len() {
            0 => ParseError::MissingArgument {
                command: "option",
                argument: "name",
            },
            1 => ParseError::MissingArgument {
                command: "option",
                argument: "value",
            },
            _ => ParseError::TooManyArguments { command: "option" },
        });
    };

    let invalid = |name: &'static str| ParseError::InvalidOptionValue {
        name,
        value: (*value).to_string(),
    };

    match *name {
        "length" => value.parse().map(Setting::Length).map_err(|_| invalid("length")),
        "malloc" => value.parse().map(Setting::Malloc).map_err(|_| invalid("malloc")),
        "strategy" => value
            .parse()
            .map(Setting::Strategy)
            .map_err(|_| invalid("strategy")),
        "echo" => flag("echo", value).map(Setting::Echo),
        "show" => flag("show", value).map(Setting::Show),
        other => Err(ParseError::UnknownOption(other.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_and_comment_lines() {
        assert_eq!(parse(""), Ok(None));
        assert_eq!(parse("   "), Ok(None));
        assert_eq!(parse("# setup"), Ok(None));
    }

    #[test]
    fn test_insert_commands() {
        assert_eq!(
            parse("ih dolphin"),
            Ok(Some(Command::InsertHead {
                value: "dolphin".to_string(),
                count: 1
            }))
        );
        assert_eq!(
            parse("  it gerbil 30 "),
            Ok(Some(Command::InsertTail {
                value: "gerbil".to_string(),
                count: 30
            }))
        );
    }

    #[test]
    fn test_insert_errors() {
        assert_eq!(
            parse("ih"),
            Err(ParseError::MissingArgument {
                command: "ih",
                argument: "string"
            })
        );
        assert_eq!(
            parse("it x many"),
            Err(ParseError::InvalidNumber {
                command: "it",
                value: "many".to_string()
            })
        );
        assert_eq!(
            parse("ih a 1 2"),
            Err(ParseError::TooManyArguments { command: "ih" })
        );
    }

    #[test]
    fn test_remove_and_size() {
        assert_eq!(parse("rh"), Ok(Some(Command::RemoveHead { expected: None })));
        assert_eq!(
            parse("rh bear"),
            Ok(Some(Command::RemoveHead {
                expected: Some("bear".to_string())
            }))
        );
        assert_eq!(parse("rhq"), Ok(Some(Command::RemoveHeadQuiet)));
        assert_eq!(parse("size 4"), Ok(Some(Command::Size { expected: Some(4) })));
        assert!(parse("size -1").is_err());
    }

    #[test]
    fn test_plain_commands() {
        assert_eq!(parse("new"), Ok(Some(Command::New)));
        assert_eq!(parse("free"), Ok(Some(Command::Free)));
        assert_eq!(parse("reverse"), Ok(Some(Command::Reverse)));
        assert_eq!(parse("sort"), Ok(Some(Command::Sort)));
        assert_eq!(parse("show"), Ok(Some(Command::Show)));
        assert_eq!(parse("quit"), Ok(Some(Command::Quit)));
        assert_eq!(
            parse("sort now"),
            Err(ParseError::TooManyArguments { command: "sort" })
        );
    }

    #[test]
    fn test_options() {
        assert_eq!(
            parse("option length 2"),
            Ok(Some(Command::Set(Setting::Length(2))))
        );
        assert_eq!(
            parse("option malloc 7"),
            Ok(Some(Command::Set(Setting::Malloc(7))))
        );
        assert_eq!(
            parse("option strategy swap"),
            Ok(Some(Command::Set(Setting::Strategy(
                SortStrategy::AdjacentSwap
            ))))
        );
        assert_eq!(
            parse("option echo on"),
            Ok(Some(Command::Set(Setting::Echo(true))))
        );
        assert_eq!(
            parse("option fast 1"),
            Err(ParseError::UnknownOption("fast".to_string()))
        );
        assert_eq!(
            parse("option echo maybe"),
            Err(ParseError::InvalidOptionValue {
                name: "echo",
                value: "maybe".to_string()
            })
        );
        assert!(parse("option length").is_err());
    }

    #[test]
    fn test_unknown_command() {
        assert_eq!(
            parse("push x"),
            Err(ParseError::UnknownCommand("push".to_string()))
        );
    }

    #[test]
    fn test_error_messages() {
        let err = parse("ih").unwrap_err();
        assert_eq!(err.to_string(), "ih: missing string");
    }
}
