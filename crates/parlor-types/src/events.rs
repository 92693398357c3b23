use serde::{Deserialize, Serialize};

use crate::models::{FileAttachment, FileId, FileKind, Message, MessageId, Reactions, UserId};

/// Events pushed FROM the server over the real-time channel.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum ServerEvent {
    /// A message was posted
    NewMessage(Message),

    /// A file was uploaded
    NewFile(FileAttachment),

    /// A message was removed by its author or an admin
    MessageDeleted { message_id: MessageId },

    /// A message's content changed; carries the full updated message
    MessageEdited(Message),

    /// A file was removed
    FileDeleted { file_id: FileId },

    /// The reaction set of a message changed
    ReactionUpdated {
        message_id: MessageId,
        #[serde(default)]
        reactions: Reactions,
    },

    /// A user started or stopped typing
    UserTyping {
        user_id: UserId,
        username: String,
        is_typing: bool,
    },

    /// A user connected to the channel
    UserConnected { username: String },

    /// A user left the channel
    UserDisconnected { username: String },
}

impl ServerEvent {
    pub fn name(&self) -> &'static str {
        match self {
            Self::NewMessage(_) => "new_message",
            Self::NewFile(_) => "new_file",
            Self::MessageDeleted { .. } => "message_deleted",
            Self::MessageEdited(_) => "message_edited",
            Self::FileDeleted { .. } => "file_deleted",
            Self::ReactionUpdated { .. } => "reaction_updated",
            Self::UserTyping { .. } => "user_typing",
            Self::UserConnected { .. } => "user_connected",
            Self::UserDisconnected { .. } => "user_disconnected",
        }
    }
}

/// Intents sent FROM the client TO the server. None of them is applied
/// locally; the view changes only when the server re-broadcasts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum ClientIntent {
    SendMessage { message: String },

    EditMessage { message_id: MessageId, content: String },

    DeleteMessage { message_id: MessageId },

    /// Toggles the sender's reaction; the server decides add vs remove
    AddReaction { message_id: MessageId, emoji: String },

    DeleteFile { file_id: FileId },

    Typing { is_typing: bool },

    /// `file` is a `data:<mime>;base64,<payload>` URL
    UploadFile {
        file: String,
        filename: String,
        file_type: FileKind,
    },
}

impl ClientIntent {
    pub fn name(&self) -> &'static str {
        match self {
            Self::SendMessage { .. } => "send_message",
            Self::EditMessage { .. } => "edit_message",
            Self::DeleteMessage { .. } => "delete_message",
            Self::AddReaction { .. } => "add_reaction",
            Self::DeleteFile { .. } => "delete_file",
            Self::Typing { .. } => "typing",
            Self::UploadFile { .. } => "upload_file",
        }
    }
}

/// Server acknowledgement for an `upload_file` intent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadAck {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Anything the server can put on the socket.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Frame {
    Event(ServerEvent),
    UploadAck(UploadAck),
}

pub fn parse_frame(text: &str) -> Result<Frame, serde_json::Error> {
    serde_json::from_str(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn intents_use_event_names_as_tags() {
        let intent = ClientIntent::EditMessage {
            message_id: 9,
            content: "fixed".into(),
        };
        assert_eq!(
            serde_json::to_value(&intent).unwrap(),
            json!({"type": "edit_message", "data": {"message_id": 9, "content": "fixed"}})
        );
        assert_eq!(intent.name(), "edit_message");

        let typing = serde_json::to_value(ClientIntent::Typing { is_typing: false }).unwrap();
        assert_eq!(typing, json!({"type": "typing", "data": {"is_typing": false}}));
    }

    #[test]
    fn decodes_reaction_update_with_object_payload() {
        let frame = parse_frame(
            r#"{"type":"reaction_updated","data":{"message_id":3,"reactions":{"👍":["1","2"]}}}"#,
        )
        .unwrap();
        match frame {
            Frame::Event(ServerEvent::ReactionUpdated { message_id, reactions }) => {
                assert_eq!(message_id, 3);
                assert_eq!(reactions.count("👍"), 2);
            }
            other => panic!("unexpected frame: {:?}", other),
        }
    }

    #[test]
    fn decodes_new_file() {
        let frame = parse_frame(
            &json!({
                "type": "new_file",
                "data": {
                    "id": 11,
                    "user_id": 2,
                    "username": "Bob",
                    "filename": "ab12.zip",
                    "original_filename": "notes.zip",
                    "file_type": "file",
                    "file_size": 2048,
                    "upload_time": "2024-05-05T12:00:00"
                }
            })
            .to_string(),
        )
        .unwrap();
        let Frame::Event(ServerEvent::NewFile(file)) = frame else {
            panic!("expected new_file");
        };
        assert_eq!(file.file_type, FileKind::Archive);
        assert_eq!(file.original_filename, "notes.zip");
    }

    #[test]
    fn upload_ack_is_its_own_frame() {
        let frame = parse_frame(r#"{"success":false,"message":"disk full"}"#).unwrap();
        match frame {
            Frame::UploadAck(ack) => {
                assert!(!ack.success);
                assert_eq!(ack.message.as_deref(), Some("disk full"));
            }
            other => panic!("unexpected frame: {:?}", other),
        }
    }

    #[test]
    fn unknown_event_is_an_error() {
        assert!(parse_frame(r#"{"type":"teleport","data":{}}"#).is_err());
    }
}
