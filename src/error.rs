use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum ConfigError {
    #[error("match threshold must be a finite value greater than zero, got {0}")]
    InvalidThreshold(f32),

    #[error("vector length must be greater than zero")]
    EmptyVectorLength,

    #[error("landmark count must be greater than zero")]
    EmptyLandmarkCount,

    #[error("{field} must be greater than zero")]
    ZeroDuration { field: &'static str },

    #[error("chat temperature must be within 0.0..=2.0, got {0}")]
    InvalidTemperature(f32),
}

#[derive(Debug, Clone, Error, PartialEq)]
pub enum LandmarkError {
    #[error("expected {expected} landmarks, got {actual}")]
    CountMismatch { expected: usize, actual: usize },

    #[error("landmark {index} has a non-finite coordinate")]
    NonFinite { index: usize },
}

#[derive(Debug, Clone, Error, PartialEq)]
pub enum RecordError {
    #[error("gesture name is required")]
    EmptyName,

    #[error("no samples were captured")]
    NoSamples,

    #[error("sample {index} has length {actual}, expected {expected}")]
    RaggedSamples {
        index: usize,
        expected: usize,
        actual: usize,
    },
}

#[derive(Debug, Error)]
pub enum ChatError {
    #[error("Message is required")]
    EmptyMessage,

    #[error("API quota exceeded. Please check your OpenAI account.")]
    QuotaExceeded,

    #[error("Invalid API key. Please check your OPENAI_API_KEY.")]
    InvalidApiKey,

    #[error("chat backend returned no content")]
    EmptyCompletion,

    #[error("chat backend error: {0}")]
    Backend(String),

    #[error("serde error: {0}")]
    Serde(#[from] serde_json::Error),
}

impl ChatError {
    pub fn status_code(&self) -> u16 {
        match self {
            ChatError::EmptyMessage => 400,
            ChatError::QuotaExceeded => 429,
            ChatError::InvalidApiKey => 401,
            _ => 500,
        }
    }

    /// Text safe to show the user; internal failures collapse to a generic retry hint.
    pub fn public_message(&self) -> String {
        match self {
            ChatError::EmptyMessage | ChatError::QuotaExceeded | ChatError::InvalidApiKey => {
                self.to_string()
            }
            _ => "Failed to get AI response. Please try again.".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_chat_errors_to_status_codes() {
        assert_eq!(ChatError::EmptyMessage.status_code(), 400);
        assert_eq!(ChatError::QuotaExceeded.status_code(), 429);
        assert_eq!(ChatError::InvalidApiKey.status_code(), 401);
        assert_eq!(ChatError::Backend("boom".to_string()).status_code(), 500);
    }

    #[test]
    fn hides_internal_failure_details() {
        let error = ChatError::Backend("connection reset".to_string());
        assert_eq!(
            error.public_message(),
            "Failed to get AI response. Please try again."
        );
        assert_eq!(ChatError::EmptyMessage.public_message(), "Message is required");
    }
}
