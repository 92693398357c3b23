use std::path::PathBuf;

use thiserror::Error;

use parlor_types::models::{FileId, MessageId};

/// One line of terminal input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Plain text goes through the composer
    Say(String),
    Edit(MessageId, String),
    Delete(MessageId),
    React(MessageId, String),
    /// Open or close the reaction picker for a message
    Picker(MessageId),
    Pick(MessageId, String),
    DeleteFile(FileId),
    Upload(PathBuf),
    /// Clipboard paste: mime type plus the file holding the bytes
    Paste(String, PathBuf),
    Theme,
    Away,
    Back,
    Quit,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommandError {
    #[error("unknown command /{0}")]
    Unknown(String),
    #[error("usage: {0}")]
    Usage(&'static str),
}

fn id<T: std::str::FromStr>(arg: Option<&str>, usage: &'static str) -> Result<T, CommandError> {
    arg.and_then(|a| a.parse().ok())
        .ok_or(CommandError::Usage(usage))
}

fn rest(arg: Option<&str>, usage: &'static str) -> Result<String, CommandError> {
    arg.map(str::trim)
        .filter(|a| !a.is_empty())
        .map(str::to_string)
        .ok_or(CommandError::Usage(usage))
}

pub fn parse(line: &str) -> Result<Command, CommandError> {
    let Some(body) = line.strip_prefix('/') else {
        return Ok(Command::Say(line.to_string()));
    };

    let (name, args) = body.split_once(' ').unwrap_or((body, ""));
    let mut parts = args.trim().splitn(2, ' ');
    let first = parts.next().filter(|p| !p.is_empty());
    let second = parts.next();

    match name {
        "edit" => {
            const USAGE: &str = "/edit <message id> <text>";
            Ok(Command::Edit(id(first, USAGE)?, rest(second, USAGE)?))
        }
        "delete" => Ok(Command::Delete(id(first, "/delete <message id>")?)),
        "react" => {
            const USAGE: &str = "/react <message id> <emoji>";
            Ok(Command::React(id(first, USAGE)?, rest(second, USAGE)?))
        }
        "picker" => Ok(Command::Picker(id(first, "/picker <message id>")?)),
        "pick" => {
            const USAGE: &str = "/pick <message id> <emoji>";
            Ok(Command::Pick(id(first, USAGE)?, rest(second, USAGE)?))
        }
        "delfile" => Ok(Command::DeleteFile(id(first, "/delfile <file id>")?)),
        "upload" => Ok(Command::Upload(rest(Some(args), "/upload <path>")?.into())),
        "paste" => {
            const USAGE: &str = "/paste <mime type> <path>";
            let mime = first.ok_or(CommandError::Usage(USAGE))?;
            Ok(Command::Paste(mime.to_string(), rest(second, USAGE)?.into()))
        }
        "theme" => Ok(Command::Theme),
        "away" => Ok(Command::Away),
        "back" => Ok(Command::Back),
        "quit" => Ok(Command::Quit),
        other => Err(CommandError::Unknown(other.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_text_is_said() {
        assert_eq!(parse("hello /there"), Ok(Command::Say("hello /there".into())));
    }

    #[test]
    fn parses_arguments() {
        assert_eq!(
            parse("/edit 42 fixed typo"),
            Ok(Command::Edit(42, "fixed typo".into()))
        );
        assert_eq!(parse("/react 7 👍"), Ok(Command::React(7, "👍".into())));
        assert_eq!(
            parse("/upload my photos/cat.png"),
            Ok(Command::Upload("my photos/cat.png".into()))
        );
        assert_eq!(
            parse("/paste image/png /tmp/clip.png"),
            Ok(Command::Paste("image/png".into(), "/tmp/clip.png".into()))
        );
        assert_eq!(parse("/theme"), Ok(Command::Theme));
    }

    #[test]
    fn rejects_bad_input() {
        assert_eq!(
            parse("/delete abc"),
            Err(CommandError::Usage("/delete <message id>"))
        );
        assert_eq!(
            parse("/edit 3"),
            Err(CommandError::Usage("/edit <message id> <text>"))
        );
        assert_eq!(parse("/shout hi"), Err(CommandError::Unknown("shout".into())));
    }
}
