use std::fmt::Write;
use std::time::{Duration, Instant};

use tracing::{info, warn};

use parlor_types::api::UpdateUserRequest;
use parlor_types::html::escape;
use parlor_types::models::UserId;

use crate::error::AdminError;
use crate::updater::UserUpdater;

/// How long a banner stays up unless dismissed.
pub const BANNER_TTL: Duration = Duration::from_secs(3);

const GENERIC_FAILURE: &str = "An error occurred while updating!";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BannerKind {
    Success,
    Danger,
}

impl BannerKind {
    fn css(&self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Danger => "danger",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Banner {
    pub id: u64,
    pub kind: BannerKind,
    pub message: String,
    pub expires_at: Instant,
}

#[derive(Debug, Clone)]
pub struct UserRow {
    pub user_id: UserId,
    /// Username as shown when not editing.
    pub username: String,
    /// Contents of the inline text input.
    pub input: String,
    pub editing: bool,
    original: String,
}

#[derive(Debug, Clone, Default)]
pub struct PasswordModal {
    pub target: Option<UserId>,
    pub new_password: String,
    pub confirm_password: String,
}

impl PasswordModal {
    pub fn is_open(&self) -> bool {
        self.target.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    Updated,
    /// The server answered `success: false` with this reason.
    Rejected(String),
    /// The request never produced an answer.
    Failed,
}

/// Row-level edit state for the user table plus its password dialog and
/// notification banners (newest first).
#[derive(Debug, Default)]
pub struct AdminPanel {
    rows: Vec<UserRow>,
    modal: PasswordModal,
    banners: Vec<Banner>,
    next_banner_id: u64,
}

impl AdminPanel {
    pub fn new(users: impl IntoIterator<Item = (UserId, String)>) -> Self {
        let rows = users
            .into_iter()
            .map(|(user_id, username)| UserRow {
                user_id,
                input: username.clone(),
                original: username.clone(),
                username,
                editing: false,
            })
            .collect();
        Self {
            rows,
            ..Self::default()
        }
    }

    pub fn row(&self, user_id: UserId) -> Option<&UserRow> {
        self.rows.iter().find(|r| r.user_id == user_id)
    }

    fn row_mut(&mut self, user_id: UserId) -> Result<&mut UserRow, AdminError> {
        self.rows
            .iter_mut()
            .find(|r| r.user_id == user_id)
            .ok_or(AdminError::UnknownUser(user_id))
    }

    pub fn modal(&self) -> &PasswordModal {
        &self.modal
    }

    pub fn banners(&self) -> &[Banner] {
        &self.banners
    }

    pub fn begin_edit(&mut self, user_id: UserId) -> Result<(), AdminError> {
        let row = self.row_mut(user_id)?;
        row.original = row.username.clone();
        row.input = row.username.clone();
        row.editing = true;
        Ok(())
    }

    pub fn set_input(&mut self, user_id: UserId, text: &str) -> Result<(), AdminError> {
        self.row_mut(user_id)?.input = text.to_string();
        Ok(())
    }

    /// Restore the original username and leave edit mode. No request is made.
    pub fn cancel(&mut self, user_id: UserId) -> Result<(), AdminError> {
        let row = self.row_mut(user_id)?;
        row.input = row.original.clone();
        row.editing = false;
        Ok(())
    }

    /// Open the password dialog for this row.
    pub fn request_save(&mut self, user_id: UserId) -> Result<(), AdminError> {
        self.row_mut(user_id)?;
        self.modal.target = Some(user_id);
        Ok(())
    }

    pub fn set_passwords(&mut self, new_password: &str, confirm_password: &str) {
        self.modal.new_password = new_password.to_string();
        self.modal.confirm_password = confirm_password.to_string();
    }

    /// Closing the dialog always clears both password fields.
    pub fn close_modal(&mut self) {
        self.modal = PasswordModal::default();
    }

    /// Validate the open dialog into a request. Nothing is sent.
    pub fn build_request(&self) -> Result<(UserId, UpdateUserRequest), AdminError> {
        let user_id = self.modal.target.ok_or(AdminError::ModalClosed)?;
        let row = self.row(user_id).ok_or(AdminError::UnknownUser(user_id))?;

        let username = row.input.trim();
        if username.is_empty() {
            return Err(AdminError::EmptyUsername);
        }

        let password = &self.modal.new_password;
        if !password.is_empty() && *password != self.modal.confirm_password {
            return Err(AdminError::PasswordMismatch);
        }

        Ok((
            user_id,
            UpdateUserRequest {
                username: username.to_string(),
                password: (!password.is_empty()).then(|| password.clone()),
            },
        ))
    }

    /// Validate, send, and apply the result. Validation failures are
    /// returned as errors and leave the dialog open; everything after the
    /// request is sent is reported through a banner.
    pub async fn submit<U: UserUpdater>(
        &mut self,
        updater: &U,
        now: Instant,
    ) -> Result<SubmitOutcome, AdminError> {
        let (user_id, request) = self.build_request()?;
        info!("Updating user {}", user_id);

        match updater.update_user(user_id, &request).await {
            Ok(resp) if resp.success => {
                let row = self.row_mut(user_id)?;
                row.username = request.username.clone();
                row.input = request.username.clone();
                row.original = request.username;
                row.editing = false;
                self.close_modal();
                self.push_banner(BannerKind::Success, resp.message, now);
                Ok(SubmitOutcome::Updated)
            }
            Ok(resp) => {
                self.push_banner(BannerKind::Danger, resp.message.clone(), now);
                Ok(SubmitOutcome::Rejected(resp.message))
            }
            Err(e) => {
                warn!("Updating user {} failed: {}", user_id, e);
                self.push_banner(BannerKind::Danger, GENERIC_FAILURE.to_string(), now);
                Ok(SubmitOutcome::Failed)
            }
        }
    }

    fn push_banner(&mut self, kind: BannerKind, message: String, now: Instant) {
        self.next_banner_id += 1;
        self.banners.insert(
            0,
            Banner {
                id: self.next_banner_id,
                kind,
                message,
                expires_at: now + BANNER_TTL,
            },
        );
    }

    pub fn expire_banners(&mut self, now: Instant) {
        self.banners.retain(|b| b.expires_at > now);
    }

    pub fn dismiss_banner(&mut self, id: u64) -> bool {
        let before = self.banners.len();
        self.banners.retain(|b| b.id != id);
        self.banners.len() != before
    }

    pub fn render_row(&self, user_id: UserId) -> Option<String> {
        let row = self.row(user_id)?;
        let hidden = |hide: bool| if hide { " d-none" } else { "" };

        let mut html = String::new();
        let _ = write!(
            html,
            r#"<tr id="user-row-{id}"><td><span class="username-display{}">{}</span><input type="text" class="username-input{}" value="{}"></td>"#,
            hidden(row.editing),
            escape(&row.username),
            hidden(!row.editing),
            escape(&row.input),
            id = row.user_id
        );
        let _ = write!(
            html,
            r#"<td><button class="edit-btn{}" data-user-id="{id}">Edit</button><button class="save-btn{}" data-user-id="{id}">Save</button><button class="cancel-btn{}" data-user-id="{id}">Cancel</button></td></tr>"#,
            hidden(row.editing),
            hidden(!row.editing),
            hidden(!row.editing),
            id = row.user_id
        );
        Some(html)
    }

    pub fn render_banners(&self) -> String {
        self.banners
            .iter()
            .map(|b| {
                format!(
                    r#"<div class="alert alert-{} alert-dismissible fade show">{}<button type="button" class="btn-close" data-bs-dismiss="alert"></button></div>"#,
                    b.kind.css(),
                    escape(&b.message)
                )
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use parlor_types::api::UpdateUserResponse;

    use super::*;

    /// Records requests and answers from a fixed script.
    struct FakeUpdater {
        answer: Result<UpdateUserResponse, AdminError>,
        calls: Mutex<Vec<(UserId, UpdateUserRequest)>>,
    }

    impl FakeUpdater {
        fn answering(success: bool, message: &str) -> Self {
            Self {
                answer: Ok(UpdateUserResponse {
                    success,
                    message: message.into(),
                }),
                calls: Mutex::new(Vec::new()),
            }
        }

        fn failing() -> Self {
            Self {
                answer: Err(AdminError::Request("connection refused".into())),
                calls: Mutex::new(Vec::new()),
            }
        }

        fn calls(&self) -> Vec<(UserId, UpdateUserRequest)> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl UserUpdater for FakeUpdater {
        async fn update_user(
            &self,
            user_id: UserId,
            request: &UpdateUserRequest,
        ) -> Result<UpdateUserResponse, AdminError> {
            self.calls.lock().unwrap().push((user_id, request.clone()));
            self.answer.clone()
        }
    }

    fn panel() -> AdminPanel {
        AdminPanel::new([(2, "bob".to_string()), (3, "carol".to_string())])
    }

    #[test]
    fn cancel_restores_username() {
        let mut panel = panel();
        panel.begin_edit(2).unwrap();
        panel.set_input(2, "robert").unwrap();
        assert!(panel.render_row(2).unwrap().contains(r#"class="username-display d-none""#));

        panel.cancel(2).unwrap();
        let row = panel.row(2).unwrap();
        assert_eq!(row.input, "bob");
        assert_eq!(row.username, "bob");
        assert!(!row.editing);
        assert!(panel.render_row(2).unwrap().contains(r#"class="edit-btn""#));
    }

    #[test]
    fn validation_rejects_blank_and_mismatch() {
        let mut panel = panel();
        assert_eq!(panel.build_request(), Err(AdminError::ModalClosed));

        panel.begin_edit(2).unwrap();
        panel.set_input(2, "   ").unwrap();
        panel.request_save(2).unwrap();
        assert_eq!(panel.build_request(), Err(AdminError::EmptyUsername));

        panel.set_input(2, "robert").unwrap();
        panel.set_passwords("secret", "secreT");
        assert_eq!(panel.build_request(), Err(AdminError::PasswordMismatch));

        panel.set_passwords("", "ignored");
        assert_eq!(
            panel.build_request(),
            Ok((
                2,
                UpdateUserRequest {
                    username: "robert".into(),
                    password: None
                }
            ))
        );
    }

    #[tokio::test]
    async fn validation_failure_sends_nothing() {
        let updater = FakeUpdater::answering(true, "ok");
        let mut panel = panel();
        panel.begin_edit(3).unwrap();
        panel.request_save(3).unwrap();
        panel.set_passwords("a", "b");

        let result = panel.submit(&updater, Instant::now()).await;
        assert_eq!(result, Err(AdminError::PasswordMismatch));
        assert!(updater.calls().is_empty());
        assert!(panel.modal().is_open());
        assert!(panel.banners().is_empty());
    }

    #[tokio::test]
    async fn successful_update_applies_and_banners() {
        let updater = FakeUpdater::answering(true, "Update successful");
        let mut panel = panel();
        let now = Instant::now();

        panel.begin_edit(2).unwrap();
        panel.set_input(2, " robert ").unwrap();
        panel.request_save(2).unwrap();
        panel.set_passwords("pw123456", "pw123456");

        let outcome = panel.submit(&updater, now).await.unwrap();
        assert_eq!(outcome, SubmitOutcome::Updated);
        assert_eq!(
            updater.calls(),
            vec![(
                2,
                UpdateUserRequest {
                    username: "robert".into(),
                    password: Some("pw123456".into())
                }
            )]
        );

        let row = panel.row(2).unwrap();
        assert_eq!(row.username, "robert");
        assert!(!row.editing);
        assert!(!panel.modal().is_open());
        assert!(panel.modal().new_password.is_empty());
        assert_eq!(panel.banners()[0].kind, BannerKind::Success);
        assert!(panel.render_banners().contains("alert-success"));

        panel.expire_banners(now + Duration::from_millis(2999));
        assert_eq!(panel.banners().len(), 1);
        panel.expire_banners(now + BANNER_TTL);
        assert!(panel.banners().is_empty());
    }

    #[tokio::test]
    async fn rejection_keeps_edit_mode() {
        let updater = FakeUpdater::answering(false, "<b>Username already exists</b>");
        let mut panel = panel();
        panel.begin_edit(2).unwrap();
        panel.set_input(2, "carol").unwrap();
        panel.request_save(2).unwrap();

        let outcome = panel.submit(&updater, Instant::now()).await.unwrap();
        assert_eq!(
            outcome,
            SubmitOutcome::Rejected("<b>Username already exists</b>".into())
        );
        assert!(panel.row(2).unwrap().editing);
        assert_eq!(panel.row(2).unwrap().username, "bob");

        let html = panel.render_banners();
        assert!(html.contains("alert-danger"));
        assert!(html.contains("&lt;b&gt;Username already exists&lt;/b&gt;"));
    }

    #[tokio::test]
    async fn transport_failure_shows_generic_banner() {
        let updater = FakeUpdater::failing();
        let mut panel = panel();
        panel.begin_edit(3).unwrap();
        panel.request_save(3).unwrap();

        let outcome = panel.submit(&updater, Instant::now()).await.unwrap();
        assert_eq!(outcome, SubmitOutcome::Failed);
        assert_eq!(panel.banners()[0].message, GENERIC_FAILURE);

        let id = panel.banners()[0].id;
        assert!(panel.dismiss_banner(id));
        assert!(!panel.dismiss_banner(id));
    }

    #[test]
    fn newest_banner_first() {
        let mut panel = panel();
        let now = Instant::now();
        panel.push_banner(BannerKind::Success, "first".into(), now);
        panel.push_banner(BannerKind::Danger, "second".into(), now);
        assert_eq!(panel.banners()[0].message, "second");
    }
}
