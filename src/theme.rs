use anyhow::Result;
use std::path::{Path, PathBuf};

use crate::config::Preferences;

/// The persisted display-theme preference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Theme {
    Light,
    Dark,
    #[default]
    Auto,
}

impl Theme {
    pub fn all() -> [Theme; 3] {
        [Theme::Light, Theme::Dark, Theme::Auto]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
            Theme::Auto => "auto",
        }
    }

    pub fn from_str(s: &str) -> Option<Theme> {
        match s {
            "light" => Some(Theme::Light),
            "dark" => Some(Theme::Dark),
            "auto" => Some(Theme::Auto),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Theme::Light => "Light",
            Theme::Dark => "Dark",
            Theme::Auto => "Auto",
        }
    }

    /// Resolve the effective display mode: `Auto` mirrors the system
    /// setting, the other two are fixed.
    pub fn effective_dark(&self, system_is_dark: bool) -> bool {
        match self {
            Theme::Auto => system_is_dark,
            Theme::Dark => true,
            Theme::Light => false,
        }
    }
}

/// Single process-wide owner of the theme preference.
///
/// The in-memory value is authoritative for the running process: setters
/// update it synchronously and persist in the background, and persistence
/// failures never roll it back. Constructed once and handed to every
/// consumer rather than reached through a global.
pub struct ThemeStore {
    theme: Theme,
    path: PathBuf,
}

impl ThemeStore {
    /// Load the saved preference. Any read or parse problem, or an
    /// unknown literal, is treated as "no saved value" and leaves `Auto`.
    pub fn load(path: PathBuf) -> Self {
        let theme = Preferences::load(&path)
            .ok()
            .and_then(|prefs| prefs.theme)
            .and_then(|s| Theme::from_str(&s))
            .unwrap_or_default();

        Self { theme, path }
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    /// Update the in-memory value immediately and persist it on a
    /// background task. The write is fire-and-forget; a failed write
    /// leaves the running process on the new value.
    pub fn set_theme(&mut self, theme: Theme) {
        self.theme = theme;

        let path = self.path.clone();
        tokio::task::spawn_blocking(move || {
            let _ = persist_theme(&path, theme);
        });
    }

    pub fn effective_dark(&self, system_is_dark: bool) -> bool {
        self.theme.effective_dark(system_is_dark)
    }
}

pub(crate) fn persist_theme(path: &Path, theme: Theme) -> Result<()> {
    let mut prefs = Preferences::load(path).unwrap_or_default();
    prefs.theme = Some(theme.as_str().to_string());
    prefs.save(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_effective_mode_truth_table() {
        assert!(Theme::Auto.effective_dark(true));
        assert!(!Theme::Auto.effective_dark(false));
        assert!(Theme::Dark.effective_dark(false));
        assert!(Theme::Dark.effective_dark(true));
        assert!(!Theme::Light.effective_dark(true));
        assert!(!Theme::Light.effective_dark(false));
    }

    #[test]
    fn test_literal_round_trip() {
        for theme in Theme::all() {
            assert_eq!(Theme::from_str(theme.as_str()), Some(theme));
        }
        assert_eq!(Theme::from_str("solarized"), None);
    }

    #[test]
    fn test_load_missing_file_defaults_to_auto() {
        let dir = tempfile::tempdir().unwrap();
        let store = ThemeStore::load(dir.path().join("config.json"));
        assert_eq!(store.theme(), Theme::Auto);
    }

    #[test]
    fn test_load_garbage_defaults_to_auto() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"theme":"mauve"}"#).unwrap();
        assert_eq!(ThemeStore::load(path).theme(), Theme::Auto);
    }

    #[test]
    fn test_persist_then_fresh_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        persist_theme(&path, Theme::Dark).unwrap();

        // Simulates a process restart.
        let store = ThemeStore::load(path);
        assert_eq!(store.theme(), Theme::Dark);
    }

    #[test]
    fn test_persist_keeps_other_preferences() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        let prefs = Preferences {
            theme: Some("light".to_string()),
        };
        prefs.save(&path).unwrap();

        persist_theme(&path, Theme::Dark).unwrap();
        let loaded = Preferences::load(&path).unwrap();
        assert_eq!(loaded.theme.as_deref(), Some("dark"));
    }

    #[tokio::test]
    async fn test_set_theme_write_reaches_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        let mut store = ThemeStore::load(path.clone());
        store.set_theme(Theme::Dark);

        // The persist runs on a background task; give it a moment.
        let mut persisted = Theme::Auto;
        for _ in 0..100 {
            persisted = ThemeStore::load(path.clone()).theme();
            if persisted == Theme::Dark {
                break;
            }
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        }
        assert_eq!(persisted, Theme::Dark);
    }

    #[tokio::test]
    async fn test_set_theme_updates_memory_synchronously() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = ThemeStore::load(dir.path().join("config.json"));

        store.set_theme(Theme::Dark);
        assert_eq!(store.theme(), Theme::Dark);
        assert!(store.effective_dark(false));
    }
}
