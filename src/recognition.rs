use serde::Serialize;

use crate::auto_response::{
    follow_up_prompt, respond_to_gesture, wants_follow_up, AutoResponse, ConversationEntry,
    ConversationHistory, UserProfile,
};
use crate::classifier::{classify, BuiltinGesture};
use crate::config::AppSettings;
use crate::error::ConfigError;
use crate::landmark::{vectorize_hand, HandLandmark};
use crate::matcher::GestureMatcher;
use crate::template_store::GestureTemplate;

pub const NO_GESTURE_TEXT: &str = "No gesture detected";

/// Top category reported by the external gesture model for a frame.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelCategory {
    pub name: String,
    pub score: f32,
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RecognitionSource {
    Custom,
    Model,
    Builtin,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Recognition {
    pub name: String,
    pub confidence: u8,
    pub source: RecognitionSource,
    pub distance: Option<f32>,
}

impl Recognition {
    pub fn display_text(&self) -> String {
        format!("{} ({}%)", self.name, self.confidence)
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct FrameOutcome {
    pub recognition: Option<Recognition>,
    pub display_text: String,
    /// Gesture name to hand to text-to-speech this frame.
    pub announce: Option<String>,
    pub auto_response: Option<AutoResponse>,
    /// Message to send through the chat relay for a follow-up reply.
    pub follow_up: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecognizerConfig {
    pub landmark_count: usize,
    pub custom_match_confidence: u8,
    pub speak_confidence_min: u8,
    pub speak_cooldown_ms: u64,
    pub auto_response: bool,
}

impl RecognizerConfig {
    pub fn from_settings(settings: &AppSettings) -> Self {
        Self {
            landmark_count: settings.landmark_count,
            custom_match_confidence: settings.custom_match_confidence,
            speak_confidence_min: settings.speak_confidence_min,
            speak_cooldown_ms: settings.speak_cooldown_ms,
            auto_response: settings.auto_response,
        }
    }
}

fn score_to_confidence(score: f32) -> u8 {
    if !score.is_finite() {
        return 0;
    }
    (score.clamp(0.0, 1.0) * 100.0).round() as u8
}

/// Per-frame gesture recognition with speech gating.
///
/// Custom templates win over the external model, which wins over the built-in
/// finger-state rules.
pub struct GestureRecognizer {
    matcher: GestureMatcher,
    config: RecognizerConfig,
    last_spoken: Option<(String, u128)>,
    profile: Option<UserProfile>,
    history: ConversationHistory,
}

impl GestureRecognizer {
    pub fn new(settings: &AppSettings) -> Result<Self, ConfigError> {
        settings.validate()?;
        Ok(Self {
            matcher: GestureMatcher::new(settings.matcher_config())?,
            config: RecognizerConfig::from_settings(settings),
            last_spoken: None,
            profile: None,
            history: ConversationHistory::default(),
        })
    }

    /// Applies new settings while keeping speech state, profile and history.
    pub fn reconfigure(&mut self, settings: &AppSettings) -> Result<(), ConfigError> {
        settings.validate()?;
        self.matcher = GestureMatcher::new(settings.matcher_config())?;
        self.config = RecognizerConfig::from_settings(settings);
        Ok(())
    }

    pub fn set_profile(&mut self, profile: Option<UserProfile>) {
        self.profile = profile;
    }

    pub fn history(&self) -> &ConversationHistory {
        &self.history
    }

    pub fn recognize(
        &self,
        landmarks: Option<&[HandLandmark]>,
        category: Option<&ModelCategory>,
        templates: &[GestureTemplate],
    ) -> Option<Recognition> {
        if let Some(landmarks) = landmarks {
            let custom = vectorize_hand(landmarks, self.config.landmark_count)
                .ok()
                .and_then(|live| self.matcher.best_match(&live, templates));
            if let Some(found) = custom {
                return Some(Recognition {
                    name: found.name,
                    confidence: self.config.custom_match_confidence,
                    source: RecognitionSource::Custom,
                    distance: Some(found.distance),
                });
            }
        }

        if let Some(category) = category.filter(|category| !category.name.trim().is_empty()) {
            return Some(Recognition {
                name: category.name.clone(),
                confidence: score_to_confidence(category.score),
                source: RecognitionSource::Model,
                distance: None,
            });
        }

        landmarks
            .map(classify)
            .filter(|gesture| *gesture != BuiltinGesture::Unknown)
            .map(|gesture| Recognition {
                name: gesture.label().to_string(),
                confidence: self.config.custom_match_confidence,
                source: RecognitionSource::Builtin,
                distance: None,
            })
    }

    pub fn process_frame(
        &mut self,
        landmarks: Option<&[HandLandmark]>,
        category: Option<&ModelCategory>,
        templates: &[GestureTemplate],
        now_ms: u128,
    ) -> FrameOutcome {
        self.expire_last_spoken(now_ms);

        let Some(recognition) = self.recognize(landmarks, category, templates) else {
            return FrameOutcome {
                recognition: None,
                display_text: NO_GESTURE_TEXT.to_string(),
                announce: None,
                auto_response: None,
                follow_up: None,
            };
        };

        let display_text = recognition.display_text();
        let should_announce = recognition.confidence > self.config.speak_confidence_min
            && self
                .last_spoken
                .as_ref()
                .map(|(name, _)| name != &recognition.name)
                .unwrap_or(true);

        let mut outcome = FrameOutcome {
            recognition: None,
            display_text,
            announce: None,
            auto_response: None,
            follow_up: None,
        };

        if should_announce {
            self.last_spoken = Some((recognition.name.clone(), now_ms));
            outcome.announce = Some(recognition.name.clone());

            if let Some(reply) = self.auto_reply(&recognition.name, now_ms) {
                if wants_follow_up(&recognition.name) {
                    outcome.follow_up = Some(follow_up_prompt(&recognition.name, &reply.text));
                }
                outcome.auto_response = Some(reply);
            }
        }

        outcome.recognition = Some(recognition);
        outcome
    }

    fn auto_reply(&mut self, gesture: &str, now_ms: u128) -> Option<AutoResponse> {
        if !self.config.auto_response {
            return None;
        }
        let profile = self.profile.as_ref()?;
        let reply = respond_to_gesture(gesture, profile)?;
        self.history.push(ConversationEntry {
            gesture: gesture.to_string(),
            response: reply.text.clone(),
            timestamp_unix_ms: now_ms,
        });
        Some(reply)
    }

    fn expire_last_spoken(&mut self, now_ms: u128) {
        let expired = self
            .last_spoken
            .as_ref()
            .map(|(_, spoken_at)| {
                now_ms.saturating_sub(*spoken_at) >= u128::from(self.config.speak_cooldown_ms)
            })
            .unwrap_or(false);
        if expired {
            self.last_spoken = None;
        }
    }
}
