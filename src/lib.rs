pub mod app;
pub mod auto_response;
pub mod chat;
pub mod chat_log;
pub mod classifier;
pub mod config;
pub mod crisis;
pub mod error;
pub mod landmark;
pub mod matcher;
pub mod recognition;
pub mod recorder;
pub mod runtime_log;
pub mod sentiment;
pub mod settings_store;
pub mod template_store;

pub use app::{AppPaths, MindMate};
pub use config::AppSettings;
pub use error::{ChatError, ConfigError, LandmarkError, RecordError};
pub use landmark::{vectorize, vectorize_hand, HandLandmark, LandmarkVector};
pub use matcher::{euclidean_distance, match_gesture, GestureMatcher, MatcherConfig};
pub use recorder::{record_template, RecordingSession};
pub use template_store::{GestureTemplate, TemplateLibrary, TemplateStore};
