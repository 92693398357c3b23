use std::str::FromStr;

use thiserror::Error;

/// Emojis offered by the reaction picker, in display order.
pub const REACTION_EMOJIS: [&str; 5] = ["👍", "❤️", "😂", "😮", "😢"];

/// Document title while nothing is unseen.
pub const BASE_TITLE: &str = "Chat App";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("unknown edit mode '{0}' (expected 'inline' or 'prompt')")]
    EditMode(String),
    #[error("unknown reaction policy '{0}' (expected 'sparse' or 'all')")]
    ReactionPolicy(String),
}

/// How the author edits their own message.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum EditMode {
    /// Content becomes editable in place with explicit save/cancel.
    #[default]
    Inline,
    /// A modal text prompt seeded with the current content.
    Prompt,
}

impl FromStr for EditMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "inline" => Ok(Self::Inline),
            "prompt" => Ok(Self::Prompt),
            other => Err(ConfigError::EditMode(other.to_string())),
        }
    }
}

/// Which reaction buttons a message shows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ReactionPolicy {
    /// Only emojis with at least one reaction, plus a picker.
    #[default]
    Sparse,
    /// All picker emojis with counts, zero included.
    AllFixed,
}

impl FromStr for ReactionPolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sparse" => Ok(Self::Sparse),
            "all" | "all_fixed" | "fixed" => Ok(Self::AllFixed),
            other => Err(ConfigError::ReactionPolicy(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ViewConfig {
    pub edit_mode: EditMode,
    pub reaction_policy: ReactionPolicy,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_policies() {
        assert_eq!("Prompt".parse::<EditMode>(), Ok(EditMode::Prompt));
        assert_eq!(" all ".parse::<ReactionPolicy>(), Ok(ReactionPolicy::AllFixed));
        assert_eq!(
            "modal".parse::<EditMode>(),
            Err(ConfigError::EditMode("modal".into()))
        );
    }
}
