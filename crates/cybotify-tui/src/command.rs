//! The `:` command line of the detail view.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Raw sort value; validated by the session.
    Sort(String),
    Filter(String),
    Clear,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    #[error("empty command")]
    Empty,
    #[error("unknown command: {0}")]
    Unknown(String),
    #[error("{0} needs an argument")]
    MissingArgument(&'static str),
}

pub fn parse(line: &str) -> Result<Command, CommandError> {
    let line = line.trim();
    let (verb, rest) = match line.split_once(char::is_whitespace) {
        Some((verb, rest)) => (verb, rest.trim()),
        None => (line, ""),
    };
    match verb {
        "" => Err(CommandError::Empty),
        "sort" if rest.is_empty() => Err(CommandError::MissingArgument("sort")),
        "sort" => Ok(Command::Sort(rest.to_string())),
        // Filter text keeps its inner spacing.
        "filter" => Ok(Command::Filter(rest.to_string())),
        "clear" => Ok(Command::Clear),
        other => Err(CommandError::Unknown(other.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_commands() {
        assert_eq!(parse("sort alphabetical"), Ok(Command::Sort("alphabetical".into())));
        assert_eq!(parse("  filter night  drive "), Ok(Command::Filter("night  drive".into())));
        assert_eq!(parse("filter"), Ok(Command::Filter(String::new())));
        assert_eq!(parse("clear"), Ok(Command::Clear));
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(parse("   "), Err(CommandError::Empty));
        assert_eq!(parse("sort"), Err(CommandError::MissingArgument("sort")));
        assert_eq!(parse("play 3"), Err(CommandError::Unknown("play".into())));
    }

    #[test]
    fn test_sort_value_is_passed_through_unvalidated() {
        assert_eq!(parse("sort chronological"), Ok(Command::Sort("chronological".into())));
    }
}
