//! HTML fragments for the chat view. All user-supplied text goes through
//! [`escape`] before it reaches markup.

use std::fmt::Write;

use chrono::{DateTime, FixedOffset, Utc};
use parlor_types::html::escape;
use parlor_types::models::{FileAttachment, FileKind, MessageId, Reactions};

use crate::config::{EditMode, REACTION_EMOJIS, ReactionPolicy, ViewConfig};
use crate::document::{ChatDocument, Entry, MessageNode};
use crate::state::ViewState;

const JST_OFFSET_SECS: i32 = 9 * 3600;
const EDITED_LABEL: &str = r#"<span class="edited-label">(edited)</span>"#;

/// `HH:MM` in Japan Standard Time. Presentation only.
pub fn format_jst(ts: &DateTime<Utc>) -> String {
    match FixedOffset::east_opt(JST_OFFSET_SECS) {
        Some(jst) => ts.with_timezone(&jst).format("%H:%M").to_string(),
        None => ts.format("%H:%M").to_string(),
    }
}

/// Size in kilobytes with one decimal, e.g. `2.0 KB`.
pub fn human_size(bytes: u64) -> String {
    format!("{:.1} KB", bytes as f64 / 1024.0)
}

fn side_class(state: &ViewState, author: i64) -> &'static str {
    if state.is_own(author) {
        "message-right"
    } else {
        "message-left"
    }
}

pub fn render_message(node: &MessageNode, state: &ViewState, config: &ViewConfig) -> String {
    let message = &node.message;
    let is_owner = state.is_own(message.user_id);
    let editing = is_owner && config.edit_mode == EditMode::Inline && node.is_editing();

    let mut html = String::new();
    let _ = write!(
        html,
        r#"<div class="message {}" data-message-id="{}"><div class="message-content">"#,
        side_class(state, message.user_id),
        message.id
    );
    let _ = write!(
        html,
        r#"<div class="message-author">{}</div>"#,
        escape(&message.username)
    );

    if editing {
        let _ = write!(
            html,
            r#"<div class="message-text editing" contenteditable="true" data-original-content="{}">{}</div>"#,
            escape(&node.original_content),
            escape(node.draft.as_deref().unwrap_or_default())
        );
    } else {
        let label = if message.edited_at.is_some() {
            format!(" {}", EDITED_LABEL)
        } else {
            String::new()
        };
        let _ = write!(
            html,
            r#"<div class="message-text" data-original-content="{}">{}{}</div>"#,
            escape(&node.original_content),
            escape(&message.content),
            label
        );
    }

    if is_owner && config.edit_mode == EditMode::Inline {
        let _ = write!(
            html,
            r#"<div class="edit-actions" style="display:{};"><button class="btn-edit-save">Save</button><button class="btn-edit-cancel">Cancel</button></div>"#,
            if editing { "flex" } else { "none" }
        );
    }

    html.push_str(&render_reaction_bar(
        message.id,
        &message.reactions,
        node.picker_open,
        state,
        config.reaction_policy,
    ));

    let _ = write!(
        html,
        r#"<div class="message-footer"><div class="message-time">{}</div>"#,
        format_jst(&message.timestamp)
    );
    if is_owner {
        let _ = write!(
            html,
            r#"<div class="message-actions" style="display:{};"><button class="btn-icon edit-msg" data-id="{id}" title="Edit"><i class="bi bi-pencil"></i></button><button class="btn-icon delete-msg" data-id="{id}" title="Delete"><i class="bi bi-trash"></i></button></div>"#,
            if editing { "none" } else { "flex" },
            id = message.id
        );
    }
    html.push_str("</div></div></div>");
    html
}

fn reaction_button(html: &mut String, emoji: &str, count: usize, active: bool) {
    let _ = write!(
        html,
        r#"<button class="btn-reaction{}" data-emoji="{e}">{e} {}</button>"#,
        if active { " active" } else { "" },
        count,
        e = escape(emoji)
    );
}

pub fn render_reaction_bar(
    message_id: MessageId,
    reactions: &Reactions,
    picker_open: bool,
    state: &ViewState,
    policy: ReactionPolicy,
) -> String {
    let mut html = format!(r#"<div class="reactions" data-message-id="{}">"#, message_id);

    match policy {
        ReactionPolicy::Sparse => {
            for group in reactions.groups() {
                reaction_button(
                    &mut html,
                    &group.emoji,
                    group.count(),
                    group.user_ids.contains(&state.viewer),
                );
            }
            html.push_str(r#"<button class="btn-add-reaction" title="Add reaction">➕</button>"#);
            let _ = write!(
                html,
                r#"<div class="reaction-picker" style="display:{};">"#,
                if picker_open { "flex" } else { "none" }
            );
            for emoji in REACTION_EMOJIS {
                let _ = write!(
                    html,
                    r#"<button class="btn-reaction-pick" data-emoji="{e}">{e}</button>"#,
                    e = emoji
                );
            }
            html.push_str("</div>");
        }
        ReactionPolicy::AllFixed => {
            for emoji in REACTION_EMOJIS {
                reaction_button(
                    &mut html,
                    emoji,
                    reactions.count(emoji),
                    reactions.reacted(emoji, state.viewer),
                );
            }
            // Free-form emojis from other clients still get counted.
            for group in reactions.groups().filter(|g| !REACTION_EMOJIS.iter().any(|e| *e == g.emoji)) {
                reaction_button(
                    &mut html,
                    &group.emoji,
                    group.count(),
                    group.user_ids.contains(&state.viewer),
                );
            }
        }
    }

    html.push_str("</div>");
    html
}

pub fn render_file(file: &FileAttachment, state: &ViewState) -> String {
    let mut html = String::new();
    let _ = write!(
        html,
        r#"<div class="message {}" data-file-id="{}"><div class="message-content">"#,
        side_class(state, file.user_id),
        file.id
    );
    let _ = write!(
        html,
        r#"<div class="message-author">{}</div>"#,
        escape(&file.username)
    );

    let href = format!("/uploads/{}", escape(&file.filename));
    let name = escape(&file.original_filename);
    match file.file_type {
        FileKind::Image => {
            let _ = write!(
                html,
                r#"<div class="message-file"><a href="{href}" target="_blank"><img src="{href}" alt="{name}" class="uploaded-image"></a><div class="file-name">{name}</div></div>"#
            );
        }
        FileKind::Archive => {
            let _ = write!(
                html,
                r#"<div class="message-file"><a href="{href}" download="{name}" class="file-download"><i class="bi bi-file-earmark-zip"></i><span>{name}</span><small>({})</small></a></div>"#,
                human_size(file.file_size)
            );
        }
    }

    let _ = write!(
        html,
        r#"<div class="message-footer"><div class="message-time">{}</div>"#,
        format_jst(&file.upload_time)
    );
    if state.is_own(file.user_id) {
        let _ = write!(
            html,
            r#"<button class="btn-icon delete-file" data-id="{}" title="Delete"><i class="bi bi-trash"></i></button>"#,
            file.id
        );
    }
    html.push_str("</div></div></div>");
    html
}

pub fn render_typing_indicator(typing_user: Option<&str>) -> String {
    match typing_user {
        Some(user) => format!(
            r#"<div id="typing-indicator" style="display:block;"><span class="typing-user">{}</span> is typing...</div>"#,
            escape(user)
        ),
        None => r#"<div id="typing-indicator" style="display:none;"><span class="typing-user"></span> is typing...</div>"#.to_string(),
    }
}

/// The whole page as a standalone HTML document.
pub fn render_page(doc: &ChatDocument, state: &ViewState, config: &ViewConfig) -> String {
    let mut html = String::new();
    let _ = write!(
        html,
        r#"<!DOCTYPE html><html data-theme="{}"><head><meta charset="utf-8"><title id="page-title">{}</title></head><body>"#,
        state.theme.as_str(),
        escape(&state.title())
    );
    let _ = write!(
        html,
        r#"<button id="theme-toggle"><i id="theme-icon" class="{}"></i></button>"#,
        state.theme.icon_class()
    );
    html.push_str(r#"<div id="messages-area">"#);
    for entry in doc.entries() {
        match entry {
            Entry::Message(node) => html.push_str(&render_message(node, state, config)),
            Entry::File(file) => html.push_str(&render_file(file, state)),
        }
    }
    html.push_str("</div>");
    html.push_str(&render_typing_indicator(doc.typing_user()));
    html.push_str("</body></html>");
    html
}
