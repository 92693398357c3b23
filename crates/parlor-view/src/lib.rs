//! Chat view controller: renders server-pushed chat events into a keyed
//! view projection and turns local user actions into outbound intents.

pub mod config;
pub mod controller;
pub mod dialogs;
pub mod document;
mod reconcile;
pub mod render;
pub mod state;
pub mod theme;
pub mod typing;
pub mod upload;

pub use config::{EditMode, ReactionPolicy, ViewConfig};
pub use controller::{ActionError, ChatController, UserAction};
pub use dialogs::{Dialogs, ScriptedDialogs};
pub use theme::{FileThemeStore, MemoryThemeStore, Theme, ThemeStore};
