use parlor_types::models::{FileAttachment, FileId, Message, MessageId};

/// Rendered projection of one message.
#[derive(Debug, Clone)]
pub struct MessageNode {
    pub message: Message,
    /// Content to restore when an inline edit is cancelled.
    pub original_content: String,
    /// In-progress inline edit text; `Some` while in edit mode.
    pub draft: Option<String>,
    pub picker_open: bool,
}

impl MessageNode {
    fn new(message: Message) -> Self {
        Self {
            original_content: message.content.clone(),
            message,
            draft: None,
            picker_open: false,
        }
    }

    pub fn is_editing(&self) -> bool {
        self.draft.is_some()
    }
}

#[derive(Debug, Clone)]
pub enum Entry {
    Message(MessageNode),
    File(FileAttachment),
}

/// The message list, keyed by message id or file id, in arrival order.
#[derive(Debug, Default)]
pub struct ChatDocument {
    entries: Vec<Entry>,
    typing_user: Option<String>,
    scrolled_len: usize,
}

impl ChatDocument {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Append a message. A message already in view is refreshed in place;
    /// its edit draft and picker survive.
    pub fn append_message(&mut self, message: Message) {
        match self.message_mut(message.id) {
            Some(node) => {
                node.original_content = message.content.clone();
                node.message = message;
            }
            None => self.entries.push(Entry::Message(MessageNode::new(message))),
        }
    }

    pub fn append_file(&mut self, file: FileAttachment) {
        match self.file_index(file.id) {
            Some(idx) => self.entries[idx] = Entry::File(file),
            None => self.entries.push(Entry::File(file)),
        }
    }

    pub fn message(&self, id: MessageId) -> Option<&MessageNode> {
        self.entries.iter().find_map(|e| match e {
            Entry::Message(node) if node.message.id == id => Some(node),
            _ => None,
        })
    }

    pub fn message_mut(&mut self, id: MessageId) -> Option<&mut MessageNode> {
        self.entries.iter_mut().find_map(|e| match e {
            Entry::Message(node) if node.message.id == id => Some(node),
            _ => None,
        })
    }

    pub fn file(&self, id: FileId) -> Option<&FileAttachment> {
        self.file_index(id).and_then(|idx| match &self.entries[idx] {
            Entry::File(file) => Some(file),
            Entry::Message(_) => None,
        })
    }

    fn file_index(&self, id: FileId) -> Option<usize> {
        self.entries
            .iter()
            .position(|e| matches!(e, Entry::File(f) if f.id == id))
    }

    /// Returns false when nothing with that id is in view.
    pub fn remove_message(&mut self, id: MessageId) -> bool {
        let before = self.entries.len();
        self.entries
            .retain(|e| !matches!(e, Entry::Message(node) if node.message.id == id));
        self.entries.len() != before
    }

    pub fn remove_file(&mut self, id: FileId) -> bool {
        match self.file_index(id) {
            Some(idx) => {
                self.entries.remove(idx);
                true
            }
            None => false,
        }
    }

    /// Close every reaction picker except the one on `keep`.
    pub fn close_pickers(&mut self, keep: Option<MessageId>) {
        for entry in &mut self.entries {
            if let Entry::Message(node) = entry {
                if Some(node.message.id) != keep {
                    node.picker_open = false;
                }
            }
        }
    }

    pub fn typing_user(&self) -> Option<&str> {
        self.typing_user.as_deref()
    }

    pub fn set_typing_user(&mut self, user: Option<String>) {
        self.typing_user = user;
    }

    pub fn scroll_to_bottom(&mut self) {
        self.scrolled_len = self.entries.len();
    }

    /// True when the last entry has been scrolled into view.
    pub fn is_scrolled_to_bottom(&self) -> bool {
        self.scrolled_len == self.entries.len()
    }
}
