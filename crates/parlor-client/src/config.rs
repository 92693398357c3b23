use std::path::PathBuf;

use anyhow::Context;

use parlor_types::models::UserId;
use parlor_view::ViewConfig;

/// Chat session settings, read from the environment.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub gateway_url: String,
    pub user_id: UserId,
    pub username: String,
    pub theme_path: PathBuf,
    /// Where to write the rendered page after every change, if anywhere.
    pub render_path: Option<PathBuf>,
    pub session_cookie: Option<String>,
    pub view: ViewConfig,
}

impl ClientConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let gateway_url = std::env::var("PARLOR_GATEWAY_URL")
            .unwrap_or_else(|_| "ws://127.0.0.1:5000/gateway".into());
        let user_id: UserId = std::env::var("PARLOR_USER_ID")
            .context("PARLOR_USER_ID must be set")?
            .parse()
            .context("PARLOR_USER_ID must be an integer")?;
        let username = std::env::var("PARLOR_USERNAME").unwrap_or_else(|_| "me".into());
        let theme_path = std::env::var("PARLOR_THEME_PATH")
            .unwrap_or_else(|_| "parlor-theme.json".into())
            .into();
        let render_path = std::env::var("PARLOR_RENDER_PATH").ok().map(PathBuf::from);
        let session_cookie = std::env::var("PARLOR_SESSION_COOKIE").ok();

        let edit_mode = std::env::var("PARLOR_EDIT_MODE")
            .unwrap_or_else(|_| "inline".into())
            .parse()?;
        let reaction_policy = std::env::var("PARLOR_REACTION_POLICY")
            .unwrap_or_else(|_| "sparse".into())
            .parse()?;

        Ok(Self {
            gateway_url,
            user_id,
            username,
            theme_path,
            render_path,
            session_cookie,
            view: ViewConfig {
                edit_mode,
                reaction_policy,
            },
        })
    }
}

#[derive(Debug, Clone)]
pub struct AdminConfig {
    pub base_url: String,
    pub session_cookie: Option<String>,
}

impl AdminConfig {
    pub fn from_env() -> Self {
        Self {
            base_url: std::env::var("PARLOR_ADMIN_URL")
                .unwrap_or_else(|_| "http://127.0.0.1:5000".into()),
            session_cookie: std::env::var("PARLOR_SESSION_COOKIE").ok(),
        }
    }
}
