use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use tracing::warn;

pub type UserId = i64;
pub type MessageId = i64;
pub type FileId = i64;

/// A chat message as the server broadcasts it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: MessageId,
    pub user_id: UserId,
    pub username: String,
    pub content: String,
    #[serde(with = "crate::time::lenient")]
    pub timestamp: DateTime<Utc>,
    #[serde(default, with = "crate::time::lenient_opt")]
    pub edited_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub reactions: Reactions,
    #[serde(default)]
    pub is_admin: bool,
}

/// Media kind of an uploaded file. Archives travel as `"file"` on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FileKind {
    #[serde(rename = "image")]
    Image,
    #[serde(rename = "file")]
    Archive,
}

impl FileKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Image => "image",
            Self::Archive => "file",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileAttachment {
    pub id: FileId,
    pub user_id: UserId,
    pub username: String,
    /// Name under which the server stored the upload.
    pub filename: String,
    pub original_filename: String,
    pub file_type: FileKind,
    pub file_size: u64,
    #[serde(with = "crate::time::lenient")]
    pub upload_time: DateTime<Utc>,
    #[serde(default)]
    pub is_admin: bool,
}

// -- Reactions --

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReactionGroup {
    pub emoji: String,
    pub user_ids: BTreeSet<UserId>,
}

impl ReactionGroup {
    pub fn count(&self) -> usize {
        self.user_ids.len()
    }
}

/// Emoji -> reacting users for one message, in first-reaction order.
///
/// The server sends this either as a JSON object or as a string holding one.
/// Anything unparseable decodes to an empty set rather than an error.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Reactions {
    groups: Vec<ReactionGroup>,
}

impl Reactions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_value(value: &Value) -> Self {
        match value {
            Value::Null => Self::default(),
            Value::Object(map) => {
                let mut reactions = Self::default();
                for (emoji, users) in map {
                    let Value::Array(users) = users else {
                        warn!("Ignoring reaction '{}' with non-array users", emoji);
                        continue;
                    };
                    let user_ids: BTreeSet<UserId> = users.iter().filter_map(parse_user_id).collect();
                    if user_ids.is_empty() {
                        continue;
                    }
                    match reactions.groups.iter_mut().find(|g| g.emoji == *emoji) {
                        Some(group) => group.user_ids.extend(user_ids),
                        None => reactions.groups.push(ReactionGroup {
                            emoji: emoji.clone(),
                            user_ids,
                        }),
                    }
                }
                reactions
            }
            Value::String(raw) if raw.trim().is_empty() => Self::default(),
            Value::String(raw) => match serde_json::from_str::<Value>(raw) {
                Ok(inner @ (Value::Object(_) | Value::Null)) => Self::from_value(&inner),
                Ok(_) | Err(_) => {
                    warn!("Unparseable reaction payload, treating as empty");
                    Self::default()
                }
            },
            _ => {
                warn!("Unexpected reaction payload type, treating as empty");
                Self::default()
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn groups(&self) -> impl Iterator<Item = &ReactionGroup> {
        self.groups.iter()
    }

    pub fn get(&self, emoji: &str) -> Option<&ReactionGroup> {
        self.groups.iter().find(|g| g.emoji == emoji)
    }

    pub fn count(&self, emoji: &str) -> usize {
        self.get(emoji).map_or(0, ReactionGroup::count)
    }

    pub fn reacted(&self, emoji: &str, user_id: UserId) -> bool {
        self.get(emoji).is_some_and(|g| g.user_ids.contains(&user_id))
    }

    /// Toggle a user's reaction: removes it if present, adds it otherwise.
    /// Returns true when the reaction was added.
    pub fn toggle(&mut self, emoji: &str, user_id: UserId) -> bool {
        if let Some(pos) = self.groups.iter().position(|g| g.emoji == emoji) {
            let group = &mut self.groups[pos];
            if group.user_ids.remove(&user_id) {
                if group.user_ids.is_empty() {
                    self.groups.remove(pos);
                }
                return false;
            }
            group.user_ids.insert(user_id);
            return true;
        }

        self.groups.push(ReactionGroup {
            emoji: emoji.to_string(),
            user_ids: BTreeSet::from([user_id]),
        });
        true
    }
}

fn parse_user_id(value: &Value) -> Option<UserId> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

impl Serialize for Reactions {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.groups.len()))?;
        for group in &self.groups {
            let users: Vec<String> = group.user_ids.iter().map(|id| id.to_string()).collect();
            map.serialize_entry(&group.emoji, &users)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Reactions {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Ok(Self::from_value(&value))
    }
}
