//! Operator command parsing.

use std::path::PathBuf;

use uploader_core::AttachSource;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OperatorCommand {
    ListAthletes { filter: String },
    ListRaces,
    SelectAthlete { id: String },
    SelectRace { id: String },
    Attach { path: PathBuf, source: AttachSource },
    Save,
    Clear,
    Status,
    Help,
    Quit,
}

pub const HELP: &str = "\
commands:
  athletes [filter]   list athletes, optionally filtered by name or id
  races               list races
  select <athlete-id> choose the athlete
  race <race-id>      choose the race
  drop <path>         attach a photo as if dropped on the photo area
  pick <path>         attach a photo through the file picker
  save                save the attached photo
  clear               reset everything
  status              show the current state
  help                show this help
  quit                exit";

/// Parses one input line. Blank lines yield `Ok(None)`.
pub fn parse_line(line: &str) -> Result<Option<OperatorCommand>, String> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }

    let (verb, rest) = match line.split_once(char::is_whitespace) {
        Some((verb, rest)) => (verb, rest.trim()),
        None => (line, ""),
    };

    let command = match verb.to_ascii_lowercase().as_str() {
        "athletes" | "ls" => OperatorCommand::ListAthletes {
            filter: rest.to_string(),
        },
        "races" => OperatorCommand::ListRaces,
        "select" | "athlete" => OperatorCommand::SelectAthlete {
            id: required(verb, rest, "athlete id")?,
        },
        "race" => OperatorCommand::SelectRace {
            id: required(verb, rest, "race id")?,
        },
        "drop" => OperatorCommand::Attach {
            path: PathBuf::from(required(verb, rest, "file path")?),
            source: AttachSource::DragAndDrop,
        },
        "pick" | "attach" => OperatorCommand::Attach {
            path: PathBuf::from(required(verb, rest, "file path")?),
            source: AttachSource::FilePicker,
        },
        "save" => OperatorCommand::Save,
        "clear" | "reset" => OperatorCommand::Clear,
        "status" => OperatorCommand::Status,
        "help" | "?" => OperatorCommand::Help,
        "quit" | "exit" => OperatorCommand::Quit,
        other => return Err(format!("unknown command '{other}'; try 'help'")),
    };
    Ok(Some(command))
}

fn required(verb: &str, rest: &str, what: &str) -> Result<String, String> {
    if rest.is_empty() {
        Err(format!("'{verb}' needs a {what}"))
    } else {
        Ok(rest.to_string())
    }
}
