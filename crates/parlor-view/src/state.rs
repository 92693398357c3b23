use parlor_types::models::{MessageId, UserId};

use crate::config::BASE_TITLE;
use crate::theme::Theme;

/// Snapshot of the transient UI state the renderer reads.
///
/// Every transition returns a new snapshot; nothing mutates in place.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewState {
    pub viewer: UserId,
    pub theme: Theme,
    pub page_visible: bool,
    pub has_unseen: bool,
    /// Message currently in inline edit mode, if any.
    pub editing: Option<MessageId>,
}

impl ViewState {
    pub fn new(viewer: UserId, theme: Theme) -> Self {
        Self {
            viewer,
            theme,
            page_visible: true,
            has_unseen: false,
            editing: None,
        }
    }

    pub fn is_own(&self, user_id: UserId) -> bool {
        self.viewer == user_id
    }

    pub fn with_theme(self, theme: Theme) -> Self {
        Self { theme, ..self }
    }

    /// Becoming visible clears the unseen flag.
    pub fn with_visibility(self, page_visible: bool) -> Self {
        Self {
            page_visible,
            has_unseen: self.has_unseen && !page_visible,
            ..self
        }
    }

    /// Record an arriving item; only someone else's item raises the flag,
    /// and only while the page is hidden.
    pub fn with_arrival(self, author: UserId) -> Self {
        if self.page_visible || self.is_own(author) {
            return self;
        }
        Self {
            has_unseen: true,
            ..self
        }
    }

    pub fn with_editing(self, editing: Option<MessageId>) -> Self {
        Self { editing, ..self }
    }

    pub fn title(&self) -> String {
        if self.has_unseen && !self.page_visible {
            format!("🔴 New messages - {}", BASE_TITLE)
        } else {
            BASE_TITLE.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unseen_flag_follows_visibility() {
        let state = ViewState::new(1, Theme::Light);
        assert_eq!(state.with_arrival(2), state);

        let hidden = state.with_visibility(false);
        assert_eq!(hidden.with_arrival(1), hidden);

        let flagged = hidden.with_arrival(2);
        assert!(flagged.has_unseen);
        assert_eq!(flagged.title(), "🔴 New messages - Chat App");

        let back = flagged.with_visibility(true);
        assert!(!back.has_unseen);
        assert_eq!(back.title(), "Chat App");
    }
}
