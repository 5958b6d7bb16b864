//! Autopilot settings and their JSON persistence
//!
//! # File Location
//!
//! Settings are read from `settings.json` in the user's configuration
//! directory (e.g. `~/.config/board-autopilot/settings.json` on Linux) unless
//! an explicit path is given on the command line.
//!
//! # Error Handling
//!
//! - Missing file: defaults
//! - Unreadable or invalid file at the default location: warning, defaults
//! - Unreadable or invalid file at an explicit path: error
//!
//! Every field has a default, so a settings file only needs the values it
//! changes.

use crate::browser::UiSelectors;
use crate::core::error::{CoreError, CoreResult};
use crate::input::InputTiming;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};

/// Settings filename
const SETTINGS_FILENAME: &str = "settings.json";

/// Page the bot plays on
pub const DEFAULT_URL: &str = "https://www.chess.com/play/computer";

/// Top-level settings for one run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AutopilotSettings {
    /// Page to open
    pub url: String,

    /// Engine subprocess and search settings
    pub engine: EngineSettings,

    /// Click settle delays
    pub timing: InputTiming,

    /// Browser launch settings
    pub browser: BrowserSettings,

    /// Page markup selectors
    pub selectors: UiSelectors,

    /// Upper bound on waiting for the opponent's reply
    ///
    /// `None` waits indefinitely.
    pub opponent_reply_timeout_secs: Option<u64>,
}

impl Default for AutopilotSettings {
    fn default() -> Self {
        Self {
            url: DEFAULT_URL.to_string(),
            engine: EngineSettings::default(),
            timing: InputTiming::default(),
            browser: BrowserSettings::default(),
            selectors: UiSelectors::default(),
            opponent_reply_timeout_secs: None,
        }
    }
}

impl AutopilotSettings {
    pub fn opponent_reply_timeout(&self) -> Option<Duration> {
        self.opponent_reply_timeout_secs.map(Duration::from_secs)
    }
}

/// UCI engine settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineSettings {
    /// Engine executable, looked up on `PATH` when bare
    pub path: PathBuf,

    /// Value of the `Threads` UCI option
    pub threads: usize,

    /// Fixed search depth per move
    pub depth: u32,

    /// Extra `setoption` pairs sent after `Threads`
    pub options: BTreeMap<String, String>,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            path: PathBuf::from("stockfish"),
            threads: num_cpus::get(),
            depth: 20,
            options: BTreeMap::new(),
        }
    }
}

/// Browser launch settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrowserSettings {
    pub headless: bool,

    /// Chrome/Chromium binary; autodetected when unset
    pub executable: Option<PathBuf>,

    pub maximized: bool,

    /// Interval between checks while waiting for an element
    pub poll_interval_ms: u64,
}

impl Default for BrowserSettings {
    fn default() -> Self {
        Self {
            headless: false,
            executable: None,
            maximized: true,
            poll_interval_ms: 100,
        }
    }
}

impl BrowserSettings {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

/// Resolve the default settings file path
///
/// Returns `settings.json` in the user's configuration directory, or in the
/// working directory if the platform has none.
pub fn default_settings_path() -> PathBuf {
    if let Some(proj_dirs) = ProjectDirs::from("com", "trilltino", "board-autopilot") {
        proj_dirs.config_dir().join(SETTINGS_FILENAME)
    } else {
        PathBuf::from(SETTINGS_FILENAME)
    }
}

/// Read settings from a specific file
pub fn load_settings_from(path: &Path) -> CoreResult<AutopilotSettings> {
    let contents = fs::read_to_string(path).map_err(|source| CoreError::SettingsIo {
        path: path.to_path_buf(),
        source,
    })?;
    let settings = serde_json::from_str(&contents)?;
    info!("[SETTINGS] Loaded settings from {:?}", path);
    Ok(settings)
}

/// Load settings for this run
///
/// An explicit path must exist and parse. Without one, the default location
/// is tried and any problem there falls back to defaults.
pub fn load_settings(explicit: Option<&Path>) -> CoreResult<AutopilotSettings> {
    match explicit {
        Some(path) => load_settings_from(path),
        None => Ok(load_settings_or_default(&default_settings_path())),
    }
}

/// Read settings from `path`, using defaults if it is missing or broken
pub fn load_settings_or_default(path: &Path) -> AutopilotSettings {
    if !path.exists() {
        info!(
            "[SETTINGS] No settings file found at {:?}. Using defaults.",
            path
        );
        return AutopilotSettings::default();
    }

    match load_settings_from(path) {
        Ok(settings) => settings,
        Err(e) => {
            warn!("[SETTINGS] {}. Using defaults.", e);
            AutopilotSettings::default()
        }
    }
}

/// Write settings as pretty JSON, creating the parent directory if needed
pub fn save_settings(settings: &AutopilotSettings, path: &Path) -> CoreResult<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent).map_err(|source| CoreError::SettingsIo {
                path: parent.to_path_buf(),
                source,
            })?;
        }
    }

    let json = serde_json::to_string_pretty(settings)?;
    fs::write(path, json).map_err(|source| CoreError::SettingsIo {
        path: path.to_path_buf(),
        source,
    })?;
    info!("[SETTINGS] Saved settings to {:?}", path);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = AutopilotSettings::default();
        assert_eq!(settings.url, DEFAULT_URL);
        assert_eq!(settings.engine.depth, 20);
        assert_eq!(settings.engine.path, PathBuf::from("stockfish"));
        assert!(settings.engine.threads >= 1);
        assert_eq!(settings.timing.select_settle_ms, 50);
        assert_eq!(settings.timing.promotion_settle_ms, 500);
        assert_eq!(settings.timing.commit_settle_ms, 100);
        assert!(!settings.browser.headless);
        assert_eq!(settings.opponent_reply_timeout(), None);
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let settings: AutopilotSettings = serde_json::from_str(
            r#"{
                "engine": { "depth": 12, "options": { "Hash": "256" } },
                "opponent_reply_timeout_secs": 90
            }"#,
        )
        .unwrap();

        assert_eq!(settings.engine.depth, 12);
        assert_eq!(settings.engine.options.get("Hash").map(String::as_str), Some("256"));
        assert_eq!(settings.engine.path, PathBuf::from("stockfish"));
        assert_eq!(settings.opponent_reply_timeout(), Some(Duration::from_secs(90)));
        assert_eq!(settings.url, DEFAULT_URL);
    }

    #[test]
    fn test_invalid_json_is_error() {
        let parsed = serde_json::from_str::<AutopilotSettings>(r#"{"engine": {"depth": "deep"}}"#);
        assert!(parsed.is_err());
    }
}
