//! Commands typed at the studio prompt.
//!
//! Lines starting with `/` are commands; anything else is a prompt for the
//! active conversation.

use std::path::PathBuf;

use aifactory_core::Mode;

use crate::error::{Result, StudioError};

/// One parsed input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Send a prompt to the active conversation.
    Send(String),
    /// Send pending attachments without a prompt.
    SendAttachments,
    /// Open a project file.
    Open(String),
    /// Close a file, or the active one.
    Close(Option<String>),
    /// Make an open file active.
    Switch(String),
    /// Show the global conversation.
    Global,
    /// List open files.
    Tabs,
    /// List project files from the last status.
    Files,
    /// Replace the active file's content with a local file.
    Edit(PathBuf),
    /// Save the active file.
    Save,
    /// Set the `target_file` of the active conversation.
    Target(String),
    /// Export the active conversation to the clipboard or a local file.
    Copy(Option<PathBuf>),
    /// Attach a local file to the next prompt.
    Attach(PathBuf),
    /// Drop pending attachments.
    Detach,
    /// Switch Planning/Act.
    SetMode(Mode),
    /// Show or switch the model.
    Model(Option<String>),
    /// List available models.
    Models,
    /// Refresh and show backend status.
    Status,
    /// Apply the latest pending change in the active conversation.
    Apply,
    /// Discard the latest pending change in the active conversation.
    Discard,
    /// Print the active conversation.
    Show,
    /// Print the activity log.
    Log,
    /// Print help.
    Help,
    /// Exit.
    Quit,
}

/// Help text for the prompt.
pub const HELP: &str = "\
Type a message to send it to the active conversation.

  /open <path>      open a project file and its conversation
  /close [path]     close a file (default: active)
  /switch <path>    make an open file active
  /global           show the global conversation
  /tabs             list open files
  /files            list project files
  /edit <local>     replace the active file's content with a local file
  /save             save the active file
  /target <path>    set the file the agent should write to
  /copy [local]     copy the conversation (to a file if given)
  /attach <local>   attach a local file or image to the next message
  /detach           drop pending attachments
  /send             send pending attachments without a message
  /mode <planning|act>
  /model [id]       show or switch the model
  /models           list available models
  /status           refresh backend status
  /apply            apply the latest proposed change
  /discard          discard the latest proposed change
  /show             print the active conversation
  /log              print the activity log
  /quit";

fn required(name: &str, arg: &str) -> Result<String> {
    if arg.is_empty() {
        Err(StudioError::InvalidCommand(format!("/{name} needs an argument")))
    } else {
        Ok(arg.to_string())
    }
}

impl Command {
    /// Parse an input line. Returns `None` for blank lines.
    ///
    /// # Errors
    ///
    /// Returns [`StudioError::InvalidCommand`] for unknown commands and
    /// missing arguments.
    pub fn parse(line: &str) -> Result<Option<Self>> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(None);
        }

        let Some(rest) = line.strip_prefix('/') else {
            return Ok(Some(Self::Send(line.to_string())));
        };

        let (name, arg) = rest
            .split_once(char::is_whitespace)
            .map_or((rest, ""), |(n, a)| (n, a.trim()));

        let command = match name {
            "open" => Self::Open(required(name, arg)?),
            "close" => Self::Close((!arg.is_empty()).then(|| arg.to_string())),
            "switch" => Self::Switch(required(name, arg)?),
            "global" => Self::Global,
            "tabs" => Self::Tabs,
            "files" => Self::Files,
            "edit" => Self::Edit(required(name, arg)?.into()),
            "save" => Self::Save,
            "target" => Self::Target(required(name, arg)?),
            "copy" => Self::Copy((!arg.is_empty()).then(|| PathBuf::from(arg))),
            "attach" => Self::Attach(required(name, arg)?.into()),
            "detach" => Self::Detach,
            "send" => Self::SendAttachments,
            "mode" => Self::SetMode(required(name, arg)?.parse().map_err(
                |e: aifactory_core::CoreError| StudioError::InvalidCommand(e.to_string()),
            )?),
            "model" => Self::Model((!arg.is_empty()).then(|| arg.to_string())),
            "models" => Self::Models,
            "status" => Self::Status,
            "apply" => Self::Apply,
            "discard" => Self::Discard,
            "show" => Self::Show,
            "log" => Self::Log,
            "help" | "?" => Self::Help,
            "quit" | "exit" | "q" => Self::Quit,
            other => {
                return Err(StudioError::InvalidCommand(format!("unknown command /{other}")));
            }
        };

        Ok(Some(command))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_text_is_a_prompt() {
        assert_eq!(
            Command::parse("  fix the bug  ").unwrap(),
            Some(Command::Send("fix the bug".to_string()))
        );
        assert_eq!(Command::parse("   ").unwrap(), None);
    }

    #[test]
    fn commands_with_arguments() {
        assert_eq!(
            Command::parse(r"/open src\main.py").unwrap(),
            Some(Command::Open(r"src\main.py".to_string()))
        );
        assert_eq!(Command::parse("/close").unwrap(), Some(Command::Close(None)));
        assert_eq!(
            Command::parse("/mode act").unwrap(),
            Some(Command::SetMode(Mode::Act))
        );
        assert_eq!(
            Command::parse("/attach ./shot.png").unwrap(),
            Some(Command::Attach(PathBuf::from("./shot.png")))
        );
        assert_eq!(
            Command::parse("/target src/out.py").unwrap(),
            Some(Command::Target("src/out.py".to_string()))
        );
        assert_eq!(Command::parse("/copy").unwrap(), Some(Command::Copy(None)));
        assert_eq!(
            Command::parse("/copy chat.md").unwrap(),
            Some(Command::Copy(Some(PathBuf::from("chat.md"))))
        );
    }

    #[test]
    fn bad_commands_are_rejected() {
        assert!(matches!(
            Command::parse("/target"),
            Err(StudioError::InvalidCommand(_))
        ));
        assert!(matches!(
            Command::parse("/open"),
            Err(StudioError::InvalidCommand(_))
        ));
        assert!(matches!(
            Command::parse("/mode sideways"),
            Err(StudioError::InvalidCommand(_))
        ));
        assert!(matches!(
            Command::parse("/frobnicate"),
            Err(StudioError::InvalidCommand(_))
        ));
    }
}
