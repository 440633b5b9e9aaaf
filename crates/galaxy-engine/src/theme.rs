//! Persisted light/dark theme preference of the page hosting the galaxy.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use serde::{Deserialize, Serialize};
use crate::error::GalaxyError;

/// Storage key the preference is saved under.
pub const THEME_STORAGE_KEY: &str = "portfolio-theme";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Dark,
    Light,
}

impl Theme {
    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Dark => "dark",
            Theme::Light => "light",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Theme::Dark => Theme::Light,
            Theme::Light => Theme::Dark,
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Theme {
    type Err = GalaxyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "dark" => Ok(Theme::Dark),
            "light" => Ok(Theme::Light),
            other => Err(GalaxyError::Storage(format!("unknown theme {:?}", other))),
        }
    }
}

/// Key/value string storage (browser `localStorage` in production).
pub trait ThemeStorage {
    fn read(&self, key: &str) -> Result<Option<String>, GalaxyError>;
    fn write(&mut self, key: &str, value: &str) -> Result<(), GalaxyError>;
}

/// In-memory storage.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    values: HashMap<String, String>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ThemeStorage for MemoryStorage {
    fn read(&self, key: &str) -> Result<Option<String>, GalaxyError> {
        Ok(self.values.get(key).cloned())
    }

    fn write(&mut self, key: &str, value: &str) -> Result<(), GalaxyError> {
        self.values.insert(key.to_owned(), value.to_owned());
        Ok(())
    }
}

/// The current theme, loaded from and saved to a `ThemeStorage`.
pub struct ThemePreference<S: ThemeStorage> {
    storage: S,
    current: Theme,
}

impl<S: ThemeStorage> ThemePreference<S> {
    /// Read the stored theme. Missing, unreadable or unknown values fall back to dark.
    pub fn load(storage: S) -> Self {
        let current = match storage.read(THEME_STORAGE_KEY) {
            Ok(Some(value)) => value.parse().unwrap_or_else(|err| {
                log::warn!("ignoring stored theme: {}", err);
                Theme::default()
            }),
            Ok(None) => Theme::default(),
            Err(err) => {
                log::warn!("theme storage unavailable: {}", err);
                Theme::default()
            }
        };
        Self { storage, current }
    }

    pub fn current(&self) -> Theme {
        self.current
    }

    /// Change the theme and persist it. The in-memory value changes even if saving fails.
    pub fn set(&mut self, theme: Theme) -> Result<(), GalaxyError> {
        self.current = theme;
        self.storage.write(THEME_STORAGE_KEY, theme.as_str())
    }

    /// Flip between dark and light, returning the new theme.
    pub fn toggle(&mut self) -> Result<Theme, GalaxyError> {
        let next = self.current.toggled();
        self.set(next)?;
        Ok(next)
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }
}
