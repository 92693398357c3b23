//! Inline editor for the admin user table.

pub mod error;
pub mod panel;
pub mod updater;

pub use error::AdminError;
pub use panel::{AdminPanel, Banner, BannerKind, SubmitOutcome};
pub use updater::{HttpUserUpdater, UserUpdater};
