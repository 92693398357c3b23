use std::fs;
use std::path::PathBuf;
use std::str::FromStr;

use serde_json::{Map, Value};
use thiserror::Error;

/// Storage key the theme preference lives under.
pub const THEME_KEY: &str = "chat-theme";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn toggled(self) -> Self {
        match self {
            Self::Light => Self::Dark,
            Self::Dark => Self::Light,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
        }
    }

    /// Icon offered by the toggle: the sun switches back to light.
    pub fn icon_class(&self) -> &'static str {
        match self {
            Self::Light => "bi bi-moon-stars",
            Self::Dark => "bi bi-sun",
        }
    }
}

impl FromStr for Theme {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "light" => Ok(Self::Light),
            "dark" => Ok(Self::Dark),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Error)]
pub enum ThemeStoreError {
    #[error("theme store I/O: {0}")]
    Io(#[from] std::io::Error),
    #[error("theme store is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Persistence for the theme preference, the only state that outlives a session.
pub trait ThemeStore {
    fn load(&self) -> Result<Option<Theme>, ThemeStoreError>;
    fn save(&mut self, theme: Theme) -> Result<(), ThemeStoreError>;
}

#[derive(Debug, Default)]
pub struct MemoryThemeStore {
    theme: Option<Theme>,
}

impl MemoryThemeStore {
    pub fn with_theme(theme: Theme) -> Self {
        Self { theme: Some(theme) }
    }
}

impl ThemeStore for MemoryThemeStore {
    fn load(&self) -> Result<Option<Theme>, ThemeStoreError> {
        Ok(self.theme)
    }

    fn save(&mut self, theme: Theme) -> Result<(), ThemeStoreError> {
        self.theme = Some(theme);
        Ok(())
    }
}

/// Key/value JSON file standing in for browser local storage.
/// Other keys in the file are preserved on save.
#[derive(Debug, Clone)]
pub struct FileThemeStore {
    path: PathBuf,
}

impl FileThemeStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn read_map(&self) -> Result<Map<String, Value>, ThemeStoreError> {
        match fs::read_to_string(&self.path) {
            Ok(raw) if raw.trim().is_empty() => Ok(Map::new()),
            Ok(raw) => Ok(serde_json::from_str(&raw)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Map::new()),
            Err(e) => Err(e.into()),
        }
    }
}

impl ThemeStore for FileThemeStore {
    fn load(&self) -> Result<Option<Theme>, ThemeStoreError> {
        let map = self.read_map()?;
        Ok(map
            .get(THEME_KEY)
            .and_then(Value::as_str)
            .and_then(|s| s.parse().ok()))
    }

    fn save(&mut self, theme: Theme) -> Result<(), ThemeStoreError> {
        // A corrupt file is reported rather than overwritten.
        let mut map = self.read_map()?;
        map.insert(THEME_KEY.to_string(), Value::from(theme.as_str()));
        fs::write(&self.path, serde_json::to_string_pretty(&map)?)?;
        Ok(())
    }
}
