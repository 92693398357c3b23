use tracing::{debug, info};

use parlor_types::events::ServerEvent;

use crate::controller::ChatController;
use crate::dialogs::Dialogs;
use crate::theme::ThemeStore;

impl<D: Dialogs, S: ThemeStore> ChatController<D, S> {
    /// Apply one server-confirmed event to the view, in arrival order.
    /// Events about ids that are not in view are ignored.
    pub fn reconcile(&mut self, event: ServerEvent) {
        debug!("Reconciling {}", event.name());

        match event {
            ServerEvent::NewMessage(message) => {
                let author = message.user_id;
                self.document.append_message(message);
                self.document.scroll_to_bottom();
                self.state = self.state.with_arrival(author);
            }
            ServerEvent::NewFile(file) => {
                let uploader = file.user_id;
                self.document.append_file(file);
                self.document.scroll_to_bottom();
                self.state = self.state.with_arrival(uploader);
            }
            ServerEvent::MessageDeleted { message_id } => {
                if !self.document.remove_message(message_id) {
                    debug!("Deleted message {} was not in view", message_id);
                }
                if self.state.editing == Some(message_id) {
                    self.state = self.state.with_editing(None);
                }
            }
            ServerEvent::MessageEdited(message) => {
                // Update in place so other messages keep their edit state.
                let Some(node) = self.document.message_mut(message.id) else {
                    debug!("Edited message {} was not in view", message.id);
                    return;
                };
                node.original_content = message.content.clone();
                node.message.content = message.content;
                node.message.edited_at = message.edited_at;
                node.draft = None;
                if self.state.editing == Some(message.id) {
                    self.state = self.state.with_editing(None);
                }
            }
            ServerEvent::FileDeleted { file_id } => {
                if !self.document.remove_file(file_id) {
                    debug!("Deleted file {} was not in view", file_id);
                }
            }
            ServerEvent::ReactionUpdated {
                message_id,
                reactions,
            } => {
                if let Some(node) = self.document.message_mut(message_id) {
                    node.message.reactions = reactions;
                    node.picker_open = false;
                }
            }
            ServerEvent::UserTyping {
                user_id,
                username,
                is_typing,
            } => {
                if self.state.is_own(user_id) {
                    return;
                }
                self.document
                    .set_typing_user(is_typing.then_some(username));
            }
            ServerEvent::UserConnected { username } => info!("{} connected", username),
            ServerEvent::UserDisconnected { username } => info!("{} disconnected", username),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Instant;

    use chrono::Utc;
    use parlor_types::events::ClientIntent;
    use parlor_types::models::{FileAttachment, FileKind, Reactions};

    use crate::config::ViewConfig;
    use crate::controller::UserAction;
    use crate::controller::tests::{controller, drain, message};

    use super::*;

    #[test]
    fn new_message_raises_unseen_only_when_hidden() {
        let (mut c, _rx) = controller(ViewConfig::default());
        c.reconcile(ServerEvent::NewMessage(message(1, 2, "visible")));
        assert!(!c.state().has_unseen);
        assert!(c.document().is_scrolled_to_bottom());

        c.dispatch(UserAction::VisibilityChanged(false), Instant::now()).unwrap();
        c.reconcile(ServerEvent::NewMessage(message(2, 1, "mine")));
        assert!(!c.state().has_unseen);

        c.reconcile(ServerEvent::NewMessage(message(3, 2, "theirs")));
        assert!(c.state().has_unseen);
        assert!(c.render_page().contains("🔴 New messages - Chat App"));

        c.dispatch(UserAction::VisibilityChanged(true), Instant::now()).unwrap();
        assert!(!c.state().has_unseen);
    }

    #[test]
    fn deleting_unknown_ids_is_a_no_op() {
        let (mut c, _rx) = controller(ViewConfig::default());
        c.reconcile(ServerEvent::NewMessage(message(1, 2, "keep")));
        let before = c.render_page();

        c.reconcile(ServerEvent::MessageDeleted { message_id: 99 });
        c.reconcile(ServerEvent::FileDeleted { file_id: 1 });
        assert_eq!(c.render_page(), before);

        c.reconcile(ServerEvent::MessageDeleted { message_id: 1 });
        assert!(c.document().is_empty());
    }

    #[test]
    fn edit_updates_in_place_and_keeps_other_edit_state() {
        let (mut c, _rx) = controller(ViewConfig::default());
        let now = Instant::now();
        c.reconcile(ServerEvent::NewMessage(message(1, 1, "first")));
        c.reconcile(ServerEvent::NewMessage(message(2, 1, "second")));
        c.dispatch(UserAction::BeginEdit(2), now).unwrap();
        c.dispatch(UserAction::EditDraft(2, "second, revised".into()), now).unwrap();

        let mut edited = message(1, 1, "first <b>fixed</b>");
        edited.edited_at = Some(Utc::now());
        c.reconcile(ServerEvent::MessageEdited(edited));

        let first = c.document().message(1).unwrap();
        assert_eq!(first.message.content, "first <b>fixed</b>");
        assert_eq!(first.original_content, "first <b>fixed</b>");
        assert_eq!(
            c.document().message(2).unwrap().draft.as_deref(),
            Some("second, revised")
        );
        assert_eq!(c.state().editing, Some(2));

        let html = c.render_message(1).unwrap();
        assert!(html.contains("first &lt;b&gt;fixed&lt;/b&gt; <span class=\"edited-label\">(edited)</span>"));
    }

    #[test]
    fn repeated_new_message_keeps_draft() {
        let (mut c, mut rx) = controller(ViewConfig::default());
        let now = Instant::now();
        c.reconcile(ServerEvent::NewMessage(message(3, 1, "mine")));
        c.dispatch(UserAction::BeginEdit(3), now).unwrap();
        c.dispatch(UserAction::EditDraft(3, "mine, better".into()), now).unwrap();

        c.reconcile(ServerEvent::NewMessage(message(3, 1, "mine")));

        let node = c.document().message(3).unwrap();
        assert!(node.is_editing());
        assert_eq!(node.draft.as_deref(), Some("mine, better"));
        assert_eq!(c.state().editing, Some(3));
        assert_eq!(c.document().len(), 1);

        c.dispatch(UserAction::SaveEdit(3), now).unwrap();
        assert_eq!(
            drain(&mut rx),
            vec![ClientIntent::EditMessage {
                message_id: 3,
                content: "mine, better".into()
            }]
        );
    }

    #[test]
    fn edit_event_ends_edit_mode_on_that_message() {
        let (mut c, _rx) = controller(ViewConfig::default());
        c.reconcile(ServerEvent::NewMessage(message(5, 1, "a")));
        c.dispatch(UserAction::BeginEdit(5), Instant::now()).unwrap();

        let mut edited = message(5, 1, "b");
        edited.edited_at = Some(Utc::now());
        c.reconcile(ServerEvent::MessageEdited(edited));

        assert!(!c.document().message(5).unwrap().is_editing());
        assert_eq!(c.state().editing, None);
    }

    #[test]
    fn reaction_update_replaces_bar() {
        let (mut c, mut rx) = controller(ViewConfig::default());
        c.reconcile(ServerEvent::NewMessage(message(4, 2, "react to me")));
        c.dispatch(UserAction::TogglePicker(4), Instant::now()).unwrap();

        let mut reactions = Reactions::new();
        reactions.toggle("👍", 1);
        c.reconcile(ServerEvent::ReactionUpdated {
            message_id: 4,
            reactions,
        });

        let node = c.document().message(4).unwrap();
        assert!(!node.picker_open);
        assert!(node.message.reactions.reacted("👍", 1));
        assert!(c.render_message(4).unwrap().contains("btn-reaction active"));
        assert!(drain(&mut rx).is_empty());
    }

    #[test]
    fn typing_indicator_ignores_self() {
        let (mut c, _rx) = controller(ViewConfig::default());
        c.reconcile(ServerEvent::UserTyping {
            user_id: 1,
            username: "me".into(),
            is_typing: true,
        });
        assert_eq!(c.document().typing_user(), None);

        c.reconcile(ServerEvent::UserTyping {
            user_id: 2,
            username: "Bob".into(),
            is_typing: true,
        });
        assert_eq!(c.document().typing_user(), Some("Bob"));

        c.reconcile(ServerEvent::UserTyping {
            user_id: 2,
            username: "Bob".into(),
            is_typing: false,
        });
        assert_eq!(c.document().typing_user(), None);
    }

    #[test]
    fn files_append_and_delete() {
        let (mut c, _rx) = controller(ViewConfig::default());
        c.reconcile(ServerEvent::NewFile(FileAttachment {
            id: 1,
            user_id: 1,
            username: "me".into(),
            filename: "x.png".into(),
            original_filename: "cat.png".into(),
            file_type: FileKind::Image,
            file_size: 10,
            upload_time: Utc::now(),
            is_admin: false,
        }));
        assert!(c.document().file(1).is_some());
        assert!(c.render_page().contains(r#"data-file-id="1""#));

        c.reconcile(ServerEvent::FileDeleted { file_id: 1 });
        assert!(c.document().file(1).is_none());
    }
}
