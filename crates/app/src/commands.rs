//! Slash commands typed at the prompt.

use std::path::PathBuf;

pub const HELP: &str = "\
Commands:
  <text>                 send a message
  /preview [n]           open segment n of the last reply (no n: reopen the last edit)
  /edit <file>           replace the open preview's code with a file's contents
  /sync                  keep local edits as the new baseline
  /reset                 discard local edits
  /close                 close the preview
  /attach <path>         attach a file to the next message
  /new                   start a new chat
  /history               list saved chats
  /load <id>             resume a saved chat
  /delete <id>           delete a saved chat
  /pin <id>              pin or unpin a saved chat
  /rename <id> <title>   rename a saved chat
  /export <file>         write this chat as an HTML page
  /help                  show this help
  /quit                  exit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Send(String),
    Preview(Option<usize>),
    Edit(PathBuf),
    Sync,
    Reset,
    Close,
    Attach(PathBuf),
    New,
    History,
    Load(String),
    Delete(String),
    Pin(String),
    Rename { id: String, title: String },
    Export(PathBuf),
    Help,
    Quit,
}

fn required<'a>(arg: &'a str, usage: &str) -> Result<&'a str, String> {
    if arg.is_empty() {
        Err(format!("usage: {usage}"))
    } else {
        Ok(arg)
    }
}

/// Parse one input line. `Ok(None)` for a blank line.
pub fn parse(line: &str) -> Result<Option<Command>, String> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    let Some(rest) = line.strip_prefix('/') else {
        return Ok(Some(Command::Send(line.to_string())));
    };

    let (name, arg) = match rest.split_once(char::is_whitespace) {
        Some((name, arg)) => (name, arg.trim()),
        None => (rest, ""),
    };

    let command = match name {
        "preview" | "p" => {
            if arg.is_empty() {
                Command::Preview(None)
            } else {
                let n = arg
                    .parse::<usize>()
                    .map_err(|_| format!("not a segment number: {arg}"))?;
                Command::Preview(Some(n))
            }
        }
        "edit" => Command::Edit(required(arg, "/edit <file>")?.into()),
        "sync" => Command::Sync,
        "reset" => Command::Reset,
        "close" => Command::Close,
        "attach" => Command::Attach(required(arg, "/attach <path>")?.into()),
        "new" => Command::New,
        "history" | "h" => Command::History,
        "load" => Command::Load(required(arg, "/load <id>")?.to_string()),
        "delete" => Command::Delete(required(arg, "/delete <id>")?.to_string()),
        "pin" => Command::Pin(required(arg, "/pin <id>")?.to_string()),
        "rename" => {
            let usage = "/rename <id> <title>";
            let (id, title) = required(arg, usage)?
                .split_once(char::is_whitespace)
                .ok_or_else(|| format!("usage: {usage}"))?;
            Command::Rename {
                id: id.to_string(),
                title: title.trim().to_string(),
            }
        }
        "export" => Command::Export(required(arg, "/export <file>")?.into()),
        "help" | "?" => Command::Help,
        "quit" | "exit" | "q" => Command::Quit,
        other => return Err(format!("unknown command /{other} (try /help)")),
    };
    Ok(Some(command))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text_is_sent() {
        assert_eq!(
            parse("  make it blue ").unwrap(),
            Some(Command::Send("make it blue".into()))
        );
        assert_eq!(parse("   ").unwrap(), None);
    }

    #[test]
    fn test_preview_numbers() {
        assert_eq!(parse("/preview 2").unwrap(), Some(Command::Preview(Some(2))));
        assert_eq!(parse("/preview").unwrap(), Some(Command::Preview(None)));
        assert!(parse("/preview two").is_err());
    }

    #[test]
    fn test_rename_keeps_spaces_in_title() {
        assert_eq!(
            parse("/rename abc My landing page").unwrap(),
            Some(Command::Rename {
                id: "abc".into(),
                title: "My landing page".into()
            })
        );
        assert!(parse("/rename abc").is_err());
    }

    #[test]
    fn test_missing_arguments() {
        assert_eq!(parse("/attach").unwrap_err(), "usage: /attach <path>");
        assert!(parse("/load").is_err());
    }

    #[test]
    fn test_unknown_command() {
        assert!(parse("/frobnicate").unwrap_err().contains("unknown command"));
    }

    #[test]
    fn test_paths() {
        assert_eq!(
            parse("/edit ./page.html").unwrap(),
            Some(Command::Edit(PathBuf::from("./page.html")))
        );
    }
}
