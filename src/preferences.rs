//! User preferences storage
//!
//! Handles saving and loading display preferences to a JSON file in the
//! platform configuration directory. These are the toggles from the
//! listen screen: emoji display, colored captions, dark mode, and the
//! recognition language.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{error, info};

/// Default recognition language
const DEFAULT_LANGUAGE: &str = "en-US";

/// User preferences
#[derive(Debug, Default, Serialize, Deserialize)]
pub(crate) struct Preferences {
    /// Show emotion emoji next to captions (defaults to true)
    pub show_emoticons: Option<bool>,
    /// Color captions by emotion (defaults to true)
    pub show_colours: Option<bool>,
    /// Dark background mode (true = dark, defaults to true)
    pub dark_mode: Option<bool>,
    /// Language tag for recognition (e.g. "en-US")
    pub language_code: Option<String>,
}

/// Get the preferences file path
fn preferences_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("Sono").join("preferences.json"))
}

/// Load preferences from disk
///
/// Returns default preferences if the file doesn't exist or can't be read
pub(crate) fn load_preferences() -> Preferences {
    let Some(path) = preferences_path() else {
        return Preferences::default();
    };

    if !path.exists() {
        return Preferences::default();
    }

    match fs::read_to_string(&path) {
        Ok(contents) => match serde_json::from_str(&contents) {
            Ok(prefs) => prefs,
            Err(e) => {
                error!("Failed to parse preferences: {}", e);
                Preferences::default()
            }
        },
        Err(e) => {
            error!("Failed to read preferences file: {}", e);
            Preferences::default()
        }
    }
}

/// Save preferences to disk
pub(crate) fn save_preferences(prefs: &Preferences) -> Result<(), PreferencesError> {
    let path = preferences_path().ok_or(PreferencesError::NoConfigDir)?;
    write_preferences(&path, prefs)?;
    info!("Saved preferences to: {:?}", path);
    Ok(())
}

fn write_preferences(path: &Path, prefs: &Preferences) -> Result<(), PreferencesError> {
    if let Some(parent) = path.parent() {
        if !parent.exists() {
            fs::create_dir_all(parent)?;
            info!("Created preferences directory: {:?}", parent);
        }
    }

    let json = serde_json::to_string_pretty(prefs)?;
    fs::write(path, json)?;
    Ok(())
}

/// Write a default preferences file if none exists yet
///
/// The file is the only way to flip the display toggles, so a fresh
/// install gets one with every field spelled out.
pub(crate) fn seed_preferences() -> Result<(), PreferencesError> {
    let path = preferences_path().ok_or(PreferencesError::NoConfigDir)?;
    if path.exists() {
        return Ok(());
    }
    save_preferences(&Preferences {
        show_emoticons: Some(true),
        show_colours: Some(true),
        dark_mode: Some(true),
        language_code: Some(DEFAULT_LANGUAGE.to_string()),
    })
}

/// Whether to show emotion emoji next to captions
pub(crate) fn get_show_emoticons() -> bool {
    load_preferences().show_emoticons.unwrap_or(true)
}

/// Whether to color captions by emotion
pub(crate) fn get_show_colours() -> bool {
    load_preferences().show_colours.unwrap_or(true)
}

/// Whether dark mode colors are in effect
pub(crate) fn get_dark_mode() -> bool {
    load_preferences().dark_mode.unwrap_or(true)
}

/// Get the recognition language tag, defaulting to "en-US"
pub(crate) fn get_language_code() -> String {
    load_preferences()
        .language_code
        .unwrap_or_else(|| DEFAULT_LANGUAGE.to_string())
}

/// Preferences errors
#[derive(Debug, thiserror::Error)]
pub(crate) enum PreferencesError {
    #[error("Could not find config directory")]
    NoConfigDir,

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}
