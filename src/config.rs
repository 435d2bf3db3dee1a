use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::landmark::{COORDS_PER_LANDMARK, HAND_LANDMARK_COUNT};
use crate::matcher::{MatcherConfig, DEFAULT_MATCH_THRESHOLD};
use crate::recorder::{RecordingConfig, DEFAULT_RECORDING_DURATION_MS, DEFAULT_SAMPLE_INTERVAL_MS};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum Personality {
    #[default]
    Listener,
    Coach,
    Counselor,
}

impl Personality {
    pub fn id(self) -> &'static str {
        match self {
            Personality::Listener => "listener",
            Personality::Coach => "coach",
            Personality::Counselor => "counselor",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum CrisisRegion {
    #[default]
    India,
    Us,
    Uk,
    International,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AppSettings {
    #[serde(default = "default_match_threshold")]
    pub match_threshold: f32,
    #[serde(default = "default_landmark_count")]
    pub landmark_count: usize,
    #[serde(default = "default_custom_match_confidence")]
    pub custom_match_confidence: u8,
    #[serde(default = "default_speak_confidence_min")]
    pub speak_confidence_min: u8,
    #[serde(default = "default_speak_cooldown_ms")]
    pub speak_cooldown_ms: u64,
    #[serde(default = "default_recording_duration_ms")]
    pub recording_duration_ms: u64,
    #[serde(default = "default_sample_interval_ms")]
    pub sample_interval_ms: u64,
    #[serde(default = "default_chat_model")]
    pub chat_model: String,
    #[serde(default = "default_chat_max_tokens")]
    pub chat_max_tokens: u32,
    #[serde(default = "default_chat_temperature")]
    pub chat_temperature: f32,
    #[serde(default)]
    pub personality: Personality,
    #[serde(default)]
    pub crisis_region: CrisisRegion,
    #[serde(default)]
    pub persist_chat: bool,
    #[serde(default = "default_auto_response")]
    pub auto_response: bool,
}

fn default_match_threshold() -> f32 {
    DEFAULT_MATCH_THRESHOLD
}

fn default_landmark_count() -> usize {
    HAND_LANDMARK_COUNT
}

fn default_custom_match_confidence() -> u8 {
    85
}

fn default_speak_confidence_min() -> u8 {
    70
}

fn default_speak_cooldown_ms() -> u64 {
    2_000
}

fn default_recording_duration_ms() -> u64 {
    DEFAULT_RECORDING_DURATION_MS
}

fn default_sample_interval_ms() -> u64 {
    DEFAULT_SAMPLE_INTERVAL_MS
}

fn default_chat_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_chat_max_tokens() -> u32 {
    200
}

fn default_chat_temperature() -> f32 {
    0.7
}

fn default_auto_response() -> bool {
    true
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            match_threshold: default_match_threshold(),
            landmark_count: default_landmark_count(),
            custom_match_confidence: default_custom_match_confidence(),
            speak_confidence_min: default_speak_confidence_min(),
            speak_cooldown_ms: default_speak_cooldown_ms(),
            recording_duration_ms: default_recording_duration_ms(),
            sample_interval_ms: default_sample_interval_ms(),
            chat_model: default_chat_model(),
            chat_max_tokens: default_chat_max_tokens(),
            chat_temperature: default_chat_temperature(),
            personality: Personality::default(),
            crisis_region: CrisisRegion::default(),
            persist_chat: false,
            auto_response: default_auto_response(),
        }
    }
}

impl AppSettings {
    pub fn matcher_config(&self) -> MatcherConfig {
        MatcherConfig {
            threshold: self.match_threshold,
            vector_len: self.landmark_count * COORDS_PER_LANDMARK,
        }
    }

    pub fn recording_config(&self) -> RecordingConfig {
        RecordingConfig {
            duration_ms: self.recording_duration_ms,
            sample_interval_ms: self.sample_interval_ms,
            landmark_count: self.landmark_count,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.landmark_count == 0 {
            return Err(ConfigError::EmptyLandmarkCount);
        }
        self.matcher_config().validate()?;
        if self.recording_duration_ms == 0 {
            return Err(ConfigError::ZeroDuration {
                field: "recording_duration_ms",
            });
        }
        if self.sample_interval_ms == 0 {
            return Err(ConfigError::ZeroDuration {
                field: "sample_interval_ms",
            });
        }
        if !(0.0..=2.0).contains(&self.chat_temperature) {
            return Err(ConfigError::InvalidTemperature(self.chat_temperature));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_recognizer_tuning() {
        let settings = AppSettings::default();
        assert_eq!(settings.match_threshold, 0.15);
        assert_eq!(settings.landmark_count, 21);
        assert_eq!(settings.custom_match_confidence, 85);
        assert_eq!(settings.speak_confidence_min, 70);
        assert_eq!(settings.speak_cooldown_ms, 2_000);
        assert_eq!(settings.recording_duration_ms, 3_000);
        assert_eq!(settings.sample_interval_ms, 100);
        assert_eq!(settings.chat_model, "gpt-4o-mini");
        assert_eq!(settings.chat_max_tokens, 200);
        assert_eq!(settings.personality, Personality::Listener);
        assert_eq!(settings.crisis_region, CrisisRegion::India);
        assert!(!settings.persist_chat);
        assert!(settings.auto_response);
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn partial_payload_deserializes_with_defaults() {
        let json = r#"{
  "match_threshold": 0.2,
  "personality": "coach"
}"#;

        let parsed: AppSettings =
            serde_json::from_str(json).expect("partial settings payload should deserialize");
        assert_eq!(parsed.match_threshold, 0.2);
        assert_eq!(parsed.personality, Personality::Coach);
        assert_eq!(parsed.landmark_count, 21);
        assert_eq!(parsed.chat_temperature, 0.7);
        assert_eq!(parsed.crisis_region, CrisisRegion::India);
    }

    #[test]
    fn matcher_config_follows_landmark_count() {
        let settings = AppSettings {
            landmark_count: 5,
            ..AppSettings::default()
        };
        assert_eq!(settings.matcher_config().vector_len, 15);
        assert_eq!(settings.recording_config().landmark_count, 5);
    }

    #[test]
    fn validation_fails_fast_on_bad_values() {
        let zero_threshold = AppSettings {
            match_threshold: 0.0,
            ..AppSettings::default()
        };
        assert_eq!(
            zero_threshold.validate(),
            Err(ConfigError::InvalidThreshold(0.0))
        );

        let no_landmarks = AppSettings {
            landmark_count: 0,
            ..AppSettings::default()
        };
        assert_eq!(no_landmarks.validate(), Err(ConfigError::EmptyLandmarkCount));

        let hot = AppSettings {
            chat_temperature: 3.5,
            ..AppSettings::default()
        };
        assert_eq!(hot.validate(), Err(ConfigError::InvalidTemperature(3.5)));
    }
}
