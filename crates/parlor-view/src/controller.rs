use std::time::Instant;

use thiserror::Error;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use parlor_types::events::{ClientIntent, UploadAck};
use parlor_types::models::{FileId, MessageId, UserId};

use crate::config::{EditMode, ViewConfig};
use crate::dialogs::Dialogs;
use crate::document::ChatDocument;
use crate::render;
use crate::state::ViewState;
use crate::theme::{Theme, ThemeStore};
use crate::typing::TypingDebounce;
use crate::upload::{PendingUpload, UploadError, paste_filename};

const CONFIRM_DELETE_MESSAGE: &str = "Are you sure you want to delete this message?";
const CONFIRM_DELETE_FILE: &str = "Are you sure you want to delete this file?";
const PROMPT_EDIT: &str = "Edit message:";

/// Local user actions the controller understands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserAction {
    /// Composer text replaced
    SetInput(String),
    /// Any key other than Enter pressed in the composer
    Keystroke,
    /// Enter or the send button
    Send,
    BeginEdit(MessageId),
    EditDraft(MessageId, String),
    SaveEdit(MessageId),
    CancelEdit(MessageId),
    DeleteMessage(MessageId),
    /// Click on an existing reaction button
    ToggleReaction(MessageId, String),
    /// Click on the "add reaction" button
    TogglePicker(MessageId),
    PickReaction(MessageId, String),
    /// Click anywhere outside a reaction bar
    ClickOutside,
    DeleteFile(FileId),
    ToggleTheme,
    VisibilityChanged(bool),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ActionError {
    #[error("message {0} is not in view")]
    UnknownMessage(MessageId),
    #[error("file {0} is not in view")]
    UnknownFile(FileId),
    #[error("message {0} was written by someone else")]
    NotAuthor(MessageId),
    #[error("file {0} was uploaded by someone else")]
    NotUploader(FileId),
    #[error(transparent)]
    Upload(#[from] UploadError),
}

/// Owns the view projection and forwards user intent to the server.
///
/// Intents go out on an unbounded channel; the transport drains it.
pub struct ChatController<D, S> {
    pub(crate) config: ViewConfig,
    pub(crate) state: ViewState,
    pub(crate) document: ChatDocument,
    pub(crate) typing: TypingDebounce,
    pub(crate) input: String,
    pub(crate) intents: mpsc::UnboundedSender<ClientIntent>,
    pub(crate) dialogs: D,
    pub(crate) theme_store: S,
}

impl<D: Dialogs, S: ThemeStore> ChatController<D, S> {
    pub fn new(
        viewer: UserId,
        config: ViewConfig,
        dialogs: D,
        theme_store: S,
        intents: mpsc::UnboundedSender<ClientIntent>,
    ) -> Self {
        let theme = match theme_store.load() {
            Ok(theme) => theme.unwrap_or_default(),
            Err(e) => {
                warn!("Failed to load theme preference: {}", e);
                Theme::default()
            }
        };

        Self {
            config,
            state: ViewState::new(viewer, theme),
            document: ChatDocument::new(),
            typing: TypingDebounce::default(),
            input: String::new(),
            intents,
            dialogs,
            theme_store,
        }
    }

    pub fn config(&self) -> &ViewConfig {
        &self.config
    }

    pub fn state(&self) -> ViewState {
        self.state
    }

    pub fn document(&self) -> &ChatDocument {
        &self.document
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn is_typing(&self) -> bool {
        self.typing.is_active()
    }

    pub fn typing_deadline(&self) -> Option<Instant> {
        self.typing.deadline()
    }

    pub fn dialogs(&self) -> &D {
        &self.dialogs
    }

    pub fn dialogs_mut(&mut self) -> &mut D {
        &mut self.dialogs
    }

    pub fn render_page(&self) -> String {
        render::render_page(&self.document, &self.state, &self.config)
    }

    pub fn render_message(&self, id: MessageId) -> Option<String> {
        self.document
            .message(id)
            .map(|node| render::render_message(node, &self.state, &self.config))
    }

    pub(crate) fn emit(&self, intent: ClientIntent) {
        debug!("Dispatching {}", intent.name());
        if self.intents.send(intent).is_err() {
            warn!("Intent channel closed, dropping intent");
        }
    }

    /// Map one user action to its effect. Validation failures that the
    /// user should see are also shown through [`Dialogs::alert`].
    pub fn dispatch(&mut self, action: UserAction, now: Instant) -> Result<(), ActionError> {
        match action {
            UserAction::SetInput(text) => self.input = text,
            UserAction::Keystroke => self.keystroke(now),
            UserAction::Send => self.send(),
            UserAction::BeginEdit(id) => self.begin_edit(id)?,
            UserAction::EditDraft(id, text) => {
                let node = self
                    .document
                    .message_mut(id)
                    .ok_or(ActionError::UnknownMessage(id))?;
                if let Some(draft) = node.draft.as_mut() {
                    *draft = text;
                }
            }
            UserAction::SaveEdit(id) => self.save_edit(id)?,
            UserAction::CancelEdit(id) => {
                let node = self
                    .document
                    .message_mut(id)
                    .ok_or(ActionError::UnknownMessage(id))?;
                node.draft = None;
                if self.state.editing == Some(id) {
                    self.state = self.state.with_editing(None);
                }
            }
            UserAction::DeleteMessage(id) => {
                self.own_message(id)?;
                if self.dialogs.confirm(CONFIRM_DELETE_MESSAGE) {
                    self.emit(ClientIntent::DeleteMessage { message_id: id });
                }
            }
            UserAction::ToggleReaction(id, emoji) => {
                self.document
                    .message(id)
                    .ok_or(ActionError::UnknownMessage(id))?;
                self.emit(ClientIntent::AddReaction {
                    message_id: id,
                    emoji,
                });
            }
            UserAction::TogglePicker(id) => {
                let open = !self
                    .document
                    .message(id)
                    .ok_or(ActionError::UnknownMessage(id))?
                    .picker_open;
                self.document.close_pickers(None);
                if let Some(node) = self.document.message_mut(id) {
                    node.picker_open = open;
                }
            }
            UserAction::PickReaction(id, emoji) => {
                let node = self
                    .document
                    .message_mut(id)
                    .ok_or(ActionError::UnknownMessage(id))?;
                node.picker_open = false;
                self.emit(ClientIntent::AddReaction {
                    message_id: id,
                    emoji,
                });
            }
            UserAction::ClickOutside => self.document.close_pickers(None),
            UserAction::DeleteFile(id) => {
                let file = self.document.file(id).ok_or(ActionError::UnknownFile(id))?;
                if !self.state.is_own(file.user_id) {
                    return Err(ActionError::NotUploader(id));
                }
                if self.dialogs.confirm(CONFIRM_DELETE_FILE) {
                    self.emit(ClientIntent::DeleteFile { file_id: id });
                }
            }
            UserAction::ToggleTheme => {
                let theme = self.state.theme.toggled();
                self.state = self.state.with_theme(theme);
                if let Err(e) = self.theme_store.save(theme) {
                    warn!("Failed to persist theme preference: {}", e);
                }
            }
            UserAction::VisibilityChanged(visible) => {
                self.state = self.state.with_visibility(visible);
            }
        }
        Ok(())
    }

    /// Drive timers; call periodically from the event loop.
    pub fn tick(&mut self, now: Instant) {
        if let Some(is_typing) = self.typing.poll(now) {
            self.emit(ClientIntent::Typing { is_typing });
        }
    }

    fn keystroke(&mut self, now: Instant) {
        if let Some(is_typing) = self.typing.keystroke(now) {
            self.emit(ClientIntent::Typing { is_typing });
        }
    }

    fn stop_typing(&mut self) {
        if let Some(is_typing) = self.typing.stop() {
            self.emit(ClientIntent::Typing { is_typing });
        }
    }

    fn send(&mut self) {
        let message = self.input.trim();
        if message.is_empty() {
            return;
        }
        self.emit(ClientIntent::SendMessage {
            message: message.to_string(),
        });
        self.input.clear();
        self.stop_typing();
    }

    fn own_message(&self, id: MessageId) -> Result<(), ActionError> {
        let node = self
            .document
            .message(id)
            .ok_or(ActionError::UnknownMessage(id))?;
        if !self.state.is_own(node.message.user_id) {
            return Err(ActionError::NotAuthor(id));
        }
        Ok(())
    }

    fn begin_edit(&mut self, id: MessageId) -> Result<(), ActionError> {
        self.own_message(id)?;

        match self.config.edit_mode {
            EditMode::Inline => {
                if let Some(previous) = self.state.editing.filter(|p| *p != id) {
                    if let Some(node) = self.document.message_mut(previous) {
                        node.draft = None;
                    }
                }
                if let Some(node) = self.document.message_mut(id) {
                    node.draft = Some(node.original_content.clone());
                }
                self.state = self.state.with_editing(Some(id));
            }
            EditMode::Prompt => {
                let current = self
                    .document
                    .message(id)
                    .map(|node| node.message.content.clone())
                    .unwrap_or_default();
                let Some(answer) = self.dialogs.prompt(PROMPT_EDIT, &current) else {
                    return Ok(());
                };
                let content = answer.trim();
                if !content.is_empty() {
                    self.emit(ClientIntent::EditMessage {
                        message_id: id,
                        content: content.to_string(),
                    });
                }
            }
        }
        Ok(())
    }

    fn save_edit(&mut self, id: MessageId) -> Result<(), ActionError> {
        let node = self
            .document
            .message_mut(id)
            .ok_or(ActionError::UnknownMessage(id))?;
        let Some(content) = node.draft.as_deref().map(str::trim).filter(|c| !c.is_empty()) else {
            return Ok(());
        };
        let intent = ClientIntent::EditMessage {
            message_id: id,
            content: content.to_string(),
        };
        node.draft = None;
        if self.state.editing == Some(id) {
            self.state = self.state.with_editing(None);
        }
        self.emit(intent);
        Ok(())
    }

    // -- Uploads --

    /// Validate a picked file before reading it. Rejections are alerted.
    pub fn begin_upload(&mut self, filename: &str, size: u64) -> Option<PendingUpload> {
        match PendingUpload::new(filename, size) {
            Ok(pending) => Some(pending),
            Err(e) => {
                self.dialogs.alert(&e.to_string());
                None
            }
        }
    }

    /// Validate a pasted clipboard item. Non-image items are ignored.
    pub fn begin_paste(&mut self, mime: &str, size: u64) -> Option<PendingUpload> {
        let filename = paste_filename(mime)?;
        let mut pending = self.begin_upload(&filename, size)?;
        pending.mime = mime.trim().to_string();
        Some(pending)
    }

    /// The file contents have been read; send them.
    pub fn complete_upload(&mut self, pending: PendingUpload, bytes: &[u8]) {
        match pending.into_intent(bytes) {
            Ok(intent) => self.emit(intent),
            Err(e) => self.dialogs.alert(&e.to_string()),
        }
    }

    pub fn upload_ack(&mut self, ack: UploadAck) {
        if !ack.success {
            let reason = ack.message.unwrap_or_default();
            warn!("Upload rejected by server: {}", reason);
            self.dialogs.alert(&format!("Upload failed: {}", reason));
        }
    }
}
