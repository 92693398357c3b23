use std::time::Instant;

use anyhow::{Context, bail};
use tracing::info;

use parlor_admin::{AdminPanel, HttpUserUpdater, SubmitOutcome};
use parlor_types::models::UserId;

use crate::config::AdminConfig;

const USAGE: &str = "parlor admin <user id> <current username> <new username> [new password]";

/// Rename a user (and optionally reset their password) through the same
/// edit, dialog, submit sequence the admin page uses.
pub async fn run(config: AdminConfig, args: &[String]) -> anyhow::Result<()> {
    let [user_id, current, new_name, rest @ ..] = args else {
        bail!("usage: {}", USAGE);
    };
    let user_id: UserId = user_id.parse().context("user id must be an integer")?;
    let password = rest.first().map(String::as_str).unwrap_or("");

    let updater = HttpUserUpdater::new(&config.base_url, config.session_cookie.as_deref())?;
    let mut panel = AdminPanel::new([(user_id, current.clone())]);

    panel.begin_edit(user_id)?;
    panel.set_input(user_id, new_name)?;
    panel.request_save(user_id)?;
    panel.set_passwords(password, password);

    info!("Submitting update for user {} to {}", user_id, config.base_url);
    let outcome = panel.submit(&updater, Instant::now()).await?;
    for banner in panel.banners() {
        println!("[{:?}] {}", banner.kind, banner.message);
    }

    match outcome {
        SubmitOutcome::Updated => Ok(()),
        SubmitOutcome::Rejected(reason) => bail!("update rejected: {}", reason),
        SubmitOutcome::Failed => bail!("update failed"),
    }
}
