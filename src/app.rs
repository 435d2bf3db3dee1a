use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use crate::auto_response::UserProfile;
use crate::chat::{ChatBackend, ChatRelay, ChatReply};
use crate::chat_log::{default_chat_log_path, JsonLinesChatLog};
use crate::config::AppSettings;
use crate::error::ChatError;
use crate::landmark::HandLandmark;
use crate::recognition::{FrameOutcome, GestureRecognizer, ModelCategory};
use crate::recorder::RecordingSession;
use crate::runtime_log::{self as log_store, RuntimeLog, RuntimeLogEntry};
use crate::sentiment::{detect_sentiment, SentimentResult};
use crate::settings_store::{self, AppSettingsPatch};
use crate::template_store::{
    default_templates_path, GestureTemplate, JsonFileTemplateStore, TemplateLibrary,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppPaths {
    pub settings: PathBuf,
    pub templates: PathBuf,
    pub runtime_log: PathBuf,
    pub chat_log: PathBuf,
}

impl Default for AppPaths {
    fn default() -> Self {
        Self {
            settings: settings_store::default_settings_path(),
            templates: default_templates_path(),
            runtime_log: log_store::default_log_path(),
            chat_log: default_chat_log_path(),
        }
    }
}

impl AppPaths {
    pub fn in_dir(dir: &Path) -> Self {
        Self {
            settings: dir.join("settings.json"),
            templates: dir.join("gestures.json"),
            runtime_log: dir.join("runtime.log"),
            chat_log: dir.join("chat.jsonl"),
        }
    }
}

/// Everything the companion shell needs, wired to on-disk state.
pub struct MindMate<B: ChatBackend> {
    settings_path: PathBuf,
    settings: Mutex<AppSettings>,
    library: TemplateLibrary<JsonFileTemplateStore>,
    recognizer: Mutex<GestureRecognizer>,
    relay: ChatRelay<B>,
    log: RuntimeLog,
}

impl<B: ChatBackend> MindMate<B> {
    pub fn open(paths: AppPaths, backend: B) -> Result<Self, String> {
        let log = RuntimeLog::new(paths.runtime_log);
        let settings = settings_store::load_or_default(&paths.settings);
        log.info("app.start", "application startup");

        let store = JsonFileTemplateStore::new(paths.templates);
        if let Some(aside) = store.set_aside_corrupt()? {
            log.warn(
                "template.corrupt",
                &format!("unreadable gestures file moved to {}", aside.display()),
            );
        }
        let library = TemplateLibrary::open(store)?;
        let recognizer = GestureRecognizer::new(&settings).map_err(|error| error.to_string())?;
        let relay = ChatRelay::new(backend, settings.clone(), log.clone())
            .with_chat_log(Box::new(JsonLinesChatLog::new(paths.chat_log)));

        let template_count = library.snapshot()?.len();
        log.info(
            "template.load",
            &format!("loaded {template_count} custom gestures"),
        );

        Ok(Self {
            settings_path: paths.settings,
            settings: Mutex::new(settings),
            library,
            recognizer: Mutex::new(recognizer),
            relay,
            log,
        })
    }

    pub fn settings(&self) -> Result<AppSettings, String> {
        self.settings
            .lock()
            .map(|settings| settings.clone())
            .map_err(|_| "failed to acquire settings state".to_string())
    }

    pub fn update_settings(&self, patch: AppSettingsPatch) -> Result<AppSettings, String> {
        let mut settings = self
            .settings
            .lock()
            .map_err(|_| "failed to acquire settings state".to_string())?;
        let updated = settings_store::apply_patch(&settings, patch).map_err(|error| {
            self.log.warn("settings.rejected", &error.to_string());
            error.to_string()
        })?;
        settings_store::save(&self.settings_path, &updated)?;

        self.recognizer
            .lock()
            .map_err(|_| "failed to acquire recognizer state".to_string())?
            .reconfigure(&updated)
            .map_err(|error| error.to_string())?;
        self.relay
            .set_settings(updated.clone())
            .map_err(|error| error.to_string())?;

        *settings = updated.clone();
        self.log.info("settings.update", "updated runtime settings");
        Ok(updated)
    }

    pub fn templates(&self) -> Result<Arc<Vec<GestureTemplate>>, String> {
        self.library.snapshot()
    }

    pub fn start_recording(&self, name: &str, now_ms: u128) -> Result<RecordingSession, String> {
        let config = self.settings()?.recording_config();
        RecordingSession::start(name, config, now_ms).map_err(|error| error.to_string())
    }

    /// Finishes a recording and publishes its template; `None` when nothing was captured.
    pub fn save_recording(
        &self,
        session: RecordingSession,
        now_ms: u128,
    ) -> Result<Option<GestureTemplate>, String> {
        let name = session.name().to_string();
        let Some(template) = session.finish(now_ms) else {
            self.log.warn(
                "template.empty",
                &format!("no hand frames captured for gesture {name:?}"),
            );
            return Ok(None);
        };

        self.library.add(template.clone())?;
        self.log.info(
            "template.save",
            &format!(
                "recorded gesture {:?} from {} samples",
                template.name, template.sample_count
            ),
        );
        Ok(Some(template))
    }

    pub fn delete_template(&self, index: usize) -> Result<GestureTemplate, String> {
        let removed = self.library.delete(index)?;
        self.log.info(
            "template.delete",
            &format!("deleted gesture {:?}", removed.name),
        );
        Ok(removed)
    }

    pub fn set_profile(&self, profile: Option<UserProfile>) -> Result<(), String> {
        self.recognizer
            .lock()
            .map_err(|_| "failed to acquire recognizer state".to_string())?
            .set_profile(profile);
        Ok(())
    }

    pub fn process_frame(
        &self,
        landmarks: Option<&[HandLandmark]>,
        category: Option<&ModelCategory>,
        now_ms: u128,
    ) -> Result<FrameOutcome, String> {
        let templates = self.library.snapshot()?;
        let mut recognizer = self
            .recognizer
            .lock()
            .map_err(|_| "failed to acquire recognizer state".to_string())?;
        Ok(recognizer.process_frame(landmarks, category, &templates, now_ms))
    }

    pub fn chat(&self, message: &str) -> Result<ChatReply, ChatError> {
        self.relay.handle(message)
    }

    pub fn wellness_check(&self, text: &str) -> SentimentResult {
        let result = detect_sentiment(text);
        if let Some(keyword) = result.detected_keyword {
            self.log.info(
                "sentiment.negative",
                &format!("negative keyword {keyword:?} detected"),
            );
        }
        result
    }

    pub fn runtime_logs(&self, limit: Option<usize>) -> Result<Vec<RuntimeLogEntry>, String> {
        let normalized_limit = limit.unwrap_or(40).clamp(1, 200);
        match self.log.path() {
            Some(path) => log_store::read_recent(path, normalized_limit),
            None => Ok(Vec::new()),
        }
    }
}
