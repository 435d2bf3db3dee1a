use crate::config::{AppSettings, CrisisRegion, Personality};
use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AppSettingsPatch {
    pub match_threshold: Option<f32>,
    pub custom_match_confidence: Option<u8>,
    pub speak_confidence_min: Option<u8>,
    pub chat_model: Option<String>,
    pub personality: Option<Personality>,
    pub crisis_region: Option<CrisisRegion>,
    pub persist_chat: Option<bool>,
    pub auto_response: Option<bool>,
}

pub fn default_settings_path() -> PathBuf {
    let base = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
    base.join("mindmate").join("settings.json")
}

/// Loads saved settings, falling back to defaults for missing, unreadable or invalid files.
pub fn load_or_default(path: &Path) -> AppSettings {
    fs::read_to_string(path)
        .ok()
        .and_then(|contents| serde_json::from_str::<AppSettings>(&contents).ok())
        .filter(|settings| settings.validate().is_ok())
        .unwrap_or_default()
}

pub fn save(path: &Path, settings: &AppSettings) -> Result<(), String> {
    let parent = path
        .parent()
        .ok_or_else(|| "settings path has no parent directory".to_string())?;
    fs::create_dir_all(parent).map_err(io_to_string)?;
    let contents = serde_json::to_string_pretty(settings).map_err(|error| error.to_string())?;
    fs::write(path, contents).map_err(io_to_string)
}

/// Applies a patch and validates the result; invalid patches leave `settings` untouched.
pub fn apply_patch(
    settings: &AppSettings,
    patch: AppSettingsPatch,
) -> Result<AppSettings, ConfigError> {
    let updated = AppSettings {
        match_threshold: patch.match_threshold.unwrap_or(settings.match_threshold),
        custom_match_confidence: patch
            .custom_match_confidence
            .map(|value| value.min(100))
            .unwrap_or(settings.custom_match_confidence),
        speak_confidence_min: patch
            .speak_confidence_min
            .map(|value| value.min(100))
            .unwrap_or(settings.speak_confidence_min),
        chat_model: patch
            .chat_model
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
            .unwrap_or_else(|| settings.chat_model.clone()),
        personality: patch.personality.unwrap_or(settings.personality),
        crisis_region: patch.crisis_region.unwrap_or(settings.crisis_region),
        persist_chat: patch.persist_chat.unwrap_or(settings.persist_chat),
        auto_response: patch.auto_response.unwrap_or(settings.auto_response),
        ..settings.clone()
    };

    updated.validate()?;
    Ok(updated)
}

fn io_to_string(error: io::Error) -> String {
    error.to_string()
}
