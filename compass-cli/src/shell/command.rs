//! Shell command parsing.

use std::path::PathBuf;
use std::str::FromStr;

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    #[error("unknown command '{0}', type 'help' for a list")]
    Unknown(String),
    #[error("usage: {0}")]
    Usage(&'static str),
    #[error("'{0}' is not a number")]
    NotANumber(String),
}

/// One line of shell input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    List,
    Open(String),
    Search(String),
    Clear,
    Sort(String),
    Page(usize),
    Next,
    Prev,
    Size(usize),
    New,
    Set { field: String, value: String },
    Template(PathBuf),
    Step(String),
    Submit,
    Cancel,
    Help,
    Quit,
}

pub const HELP: &str = "\
Frameworks:
  list                    reload the framework list
  open <id|route>         open a framework (id or /framework/<id>)
Table:
  search <text>           filter rows
  clear                   clear the filter
  sort <key>              sort by id, category or description (again to reverse)
  page <n> | next | prev  change page
  size <n>                rows per page
New framework:
  new                     open the wizard
  set <field> <value>     set name, shortName or description
  template <path>         read control items from a csv/json file
  step <action>           next, prev, reset, complete or go:N
  submit                  create the framework
  cancel                  close the wizard
Other:
  help                    show this text
  quit                    exit";

impl FromStr for Command {
    type Err = CommandError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim();
        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim()),
            None => (line, ""),
        };

        let required = |usage: &'static str| {
            if rest.is_empty() {
                Err(CommandError::Usage(usage))
            } else {
                Ok(rest.to_string())
            }
        };

        match word.to_ascii_lowercase().as_str() {
            "list" | "ls" => Ok(Command::List),
            "open" => required("open <id>").map(Command::Open),
            "search" | "find" => required("search <text>").map(Command::Search),
            "clear" => Ok(Command::Clear),
            "sort" => required("sort <key>").map(Command::Sort),
            "page" => number(&required("page <n>")?).map(Command::Page),
            "next" | "n" => Ok(Command::Next),
            "prev" | "p" => Ok(Command::Prev),
            "size" => number(&required("size <n>")?).map(Command::Size),
            "new" => Ok(Command::New),
            "set" => {
                let args = required("set <field> <value>")?;
                let (field, value) = args
                    .split_once(char::is_whitespace)
                    .ok_or(CommandError::Usage("set <field> <value>"))?;
                Ok(Command::Set {
                    field: field.to_string(),
                    value: value.trim().to_string(),
                })
            }
            "template" => required("template <path>").map(|p| Command::Template(PathBuf::from(p))),
            "step" => required("step <action>").map(Command::Step),
            "submit" => Ok(Command::Submit),
            "cancel" => Ok(Command::Cancel),
            "help" | "?" => Ok(Command::Help),
            "quit" | "exit" | "q" => Ok(Command::Quit),
            _ => Err(CommandError::Unknown(word.to_string())),
        }
    }
}

fn number(text: &str) -> Result<usize, CommandError> {
    text.parse()
        .map_err(|_| CommandError::NotANumber(text.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_commands() {
        assert_eq!("list".parse::<Command>(), Ok(Command::List));
        assert_eq!("open iso 27001".parse::<Command>(), Ok(Command::Open("iso 27001".into())));
        assert_eq!("  SEARCH  access ".parse::<Command>(), Ok(Command::Search("access".into())));
        assert_eq!("page 3".parse::<Command>(), Ok(Command::Page(3)));
        assert_eq!("step go:2".parse::<Command>(), Ok(Command::Step("go:2".into())));
        assert_eq!(
            "set name SOC 2 Type II".parse::<Command>(),
            Ok(Command::Set {
                field: "name".into(),
                value: "SOC 2 Type II".into()
            })
        );
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!("open".parse::<Command>(), Err(CommandError::Usage("open <id>")));
        assert_eq!(
            "page two".parse::<Command>(),
            Err(CommandError::NotANumber("two".into()))
        );
        assert_eq!(
            "set name".parse::<Command>(),
            Err(CommandError::Usage("set <field> <value>"))
        );
        assert_eq!(
            "launch".parse::<Command>(),
            Err(CommandError::Unknown("launch".into()))
        );
    }
}
