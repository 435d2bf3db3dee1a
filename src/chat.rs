use serde::{Deserialize, Serialize};
use std::sync::Mutex;

use crate::chat_log::{ChatLog, ChatRole, NewChatMessage};
use crate::config::{AppSettings, Personality};
use crate::crisis::{crisis_response, find_crisis_keyword, CrisisResponse};
use crate::error::ChatError;
use crate::runtime_log::{current_unix_ms, RuntimeLog};

pub const SYSTEM_PROMPT: &str = "You are MindMate, an empathetic AI companion designed to provide comfort, support, and understanding.
Your responses should be:
- Kind, warm, and compassionate
- Non-judgmental and validating
- Supportive and encouraging
- Brief but meaningful (2-4 sentences)
- Focused on emotional support and active listening

Remember: You're here to listen, validate feelings, and offer gentle encouragement.";

pub const DEFAULT_COMPLETIONS_URL: &str = "https://api.openai.com/v1/chat/completions";
pub const API_KEY_ENV_NAME: &str = "OPENAI_API_KEY";

pub fn personality_prompt(personality: Personality) -> &'static str {
    match personality {
        Personality::Listener => "You are a gentle, patient listener who validates emotions without judgment. Speak softly and compassionately.",
        Personality::Coach => "You are an encouraging coach who motivates and empowers. Provide actionable advice with enthusiasm.",
        Personality::Counselor => "You are a calm counselor who provides balanced wisdom. Offer thoughtful perspectives and coping strategies.",
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatTurn {
    pub role: ChatRole,
    pub content: String,
}

/// Body of an OpenAI-compatible chat-completion call.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatTurn>,
    pub max_tokens: u32,
    pub temperature: f32,
}

impl ChatRequest {
    pub fn new(settings: &AppSettings, message: &str) -> Self {
        let system = format!(
            "{}\n\n{}",
            personality_prompt(settings.personality),
            SYSTEM_PROMPT
        );
        Self {
            model: settings.chat_model.clone(),
            messages: vec![
                ChatTurn {
                    role: ChatRole::System,
                    content: system,
                },
                ChatTurn {
                    role: ChatRole::User,
                    content: message.to_string(),
                },
            ],
            max_tokens: settings.chat_max_tokens,
            temperature: settings.chat_temperature,
        }
    }
}

pub trait ChatBackend: Send + Sync {
    fn complete(&self, request: &ChatRequest) -> Result<String, ChatError>;

    fn backend_label(&self) -> &'static str {
        "unknown"
    }
}

#[derive(Debug, Clone)]
pub struct StubChatBackend {
    pub reply: String,
}

impl Default for StubChatBackend {
    fn default() -> Self {
        Self {
            reply: "I'm here with you. Tell me more about how you're feeling.".to_string(),
        }
    }
}

impl ChatBackend for StubChatBackend {
    fn complete(&self, _request: &ChatRequest) -> Result<String, ChatError> {
        Ok(self.reply.clone())
    }

    fn backend_label(&self) -> &'static str {
        "stub"
    }
}

#[derive(Debug, Deserialize)]
struct CompletionMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CompletionChoice {
    message: CompletionMessage,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    choices: Vec<CompletionChoice>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    code: Option<String>,
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorEnvelope {
    error: ApiErrorBody,
}

/// Extracts the first choice's text from a successful completion body.
pub fn parse_completion(body: &str) -> Result<String, ChatError> {
    let response = serde_json::from_str::<CompletionResponse>(body)?;
    response
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .filter(|content| !content.trim().is_empty())
        .ok_or(ChatError::EmptyCompletion)
}

/// Maps a failed API response onto the errors the app distinguishes.
pub fn error_from_api(status: u16, body: &str) -> ChatError {
    let parsed = serde_json::from_str::<ApiErrorEnvelope>(body).ok();
    let code = parsed
        .as_ref()
        .and_then(|envelope| envelope.error.code.as_deref());

    match (status, code) {
        (_, Some("insufficient_quota")) => ChatError::QuotaExceeded,
        (_, Some("invalid_api_key")) | (401, _) => ChatError::InvalidApiKey,
        _ => {
            let message = parsed
                .as_ref()
                .and_then(|envelope| envelope.error.message.clone())
                .unwrap_or_else(|| format!("HTTP {status}"));
            ChatError::Backend(message)
        }
    }
}

#[cfg(feature = "remote-chat")]
pub struct OpenAiChatBackend {
    client: reqwest::blocking::Client,
    endpoint: String,
    api_key: String,
}

#[cfg(feature = "remote-chat")]
impl OpenAiChatBackend {
    pub fn new(api_key: String, endpoint: String) -> Self {
        let client = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .unwrap_or_else(|_| reqwest::blocking::Client::new());
        Self {
            client,
            endpoint,
            api_key,
        }
    }

    pub fn from_env() -> Result<Self, ChatError> {
        let api_key = std::env::var(API_KEY_ENV_NAME)
            .ok()
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
            .ok_or(ChatError::InvalidApiKey)?;
        Ok(Self::new(api_key, DEFAULT_COMPLETIONS_URL.to_string()))
    }
}

#[cfg(feature = "remote-chat")]
impl ChatBackend for OpenAiChatBackend {
    fn complete(&self, request: &ChatRequest) -> Result<String, ChatError> {
        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(request)
            .send()
            .map_err(|error| ChatError::Backend(error.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .map_err(|error| ChatError::Backend(error.to_string()))?;

        if status.is_success() {
            parse_completion(&body)
        } else {
            Err(error_from_api(status.as_u16(), &body))
        }
    }

    fn backend_label(&self) -> &'static str {
        "openai"
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ChatReply {
    pub response: String,
    pub timestamp_unix_ms: u128,
    pub crisis: Option<CrisisResponse>,
}

/// Forwards user messages to a chat backend and optionally records the exchange.
///
/// Settings sit behind their own lock and are copied per message, so a slow
/// backend call never holds up a settings update.
pub struct ChatRelay<B: ChatBackend> {
    backend: B,
    settings: Mutex<AppSettings>,
    log: RuntimeLog,
    chat_log: Option<Box<dyn ChatLog>>,
    session_id: Mutex<Option<u64>>,
}

impl<B: ChatBackend> ChatRelay<B> {
    pub fn new(backend: B, settings: AppSettings, log: RuntimeLog) -> Self {
        Self {
            backend,
            settings: Mutex::new(settings),
            log,
            chat_log: None,
            session_id: Mutex::new(None),
        }
    }

    pub fn with_chat_log(mut self, chat_log: Box<dyn ChatLog>) -> Self {
        self.chat_log = Some(chat_log);
        self
    }

    pub fn set_settings(&self, settings: AppSettings) -> Result<(), ChatError> {
        let mut current = self
            .settings
            .lock()
            .map_err(|_| ChatError::Backend("failed to acquire chat settings".to_string()))?;
        *current = settings;
        Ok(())
    }

    fn current_settings(&self) -> Result<AppSettings, ChatError> {
        self.settings
            .lock()
            .map(|settings| settings.clone())
            .map_err(|_| ChatError::Backend("failed to acquire chat settings".to_string()))
    }

    pub fn session_id(&self) -> Option<u64> {
        self.session_id.lock().ok().and_then(|session| *session)
    }

    pub fn handle(&self, message: &str) -> Result<ChatReply, ChatError> {
        let message = message.trim();
        if message.is_empty() {
            return Err(ChatError::EmptyMessage);
        }

        let settings = self.current_settings()?;
        let crisis_keyword = find_crisis_keyword(message);
        if let Some(keyword) = crisis_keyword {
            self.log.warn(
                "crisis.detected",
                &format!("crisis phrase {keyword:?} in user message"),
            );
        }

        let request = ChatRequest::new(&settings, message);
        let response = match self.backend.complete(&request) {
            Ok(response) => response,
            Err(error) => {
                self.log.error(
                    "chat.error",
                    &format!("{} backend failed: {error}", self.backend.backend_label()),
                );
                return Err(error);
            }
        };

        if settings.persist_chat {
            if let Err(error) =
                self.persist(&settings, message, &response, crisis_keyword.is_some())
            {
                self.log.warn("chat.persist", &error);
            }
        }

        self.log.info(
            "chat.reply",
            &format!("reply length={} via {}", response.len(), self.backend.backend_label()),
        );

        Ok(ChatReply {
            response,
            timestamp_unix_ms: current_unix_ms().unwrap_or(0),
            crisis: crisis_keyword.map(|_| crisis_response(settings.crisis_region)),
        })
    }

    fn persist(
        &self,
        settings: &AppSettings,
        message: &str,
        response: &str,
        has_crisis: bool,
    ) -> Result<(), String> {
        let Some(chat_log) = &self.chat_log else {
            return Ok(());
        };

        let mut session = self
            .session_id
            .lock()
            .map_err(|_| "failed to acquire chat session".to_string())?;
        let session_id = match *session {
            Some(id) => id,
            None => {
                let created = chat_log.create_session(None, settings.personality)?;
                *session = Some(created.id);
                created.id
            }
        };

        chat_log.append_message(NewChatMessage {
            session_id,
            role: ChatRole::User,
            content: message.to_string(),
            has_crisis,
        })?;
        chat_log.append_message(NewChatMessage {
            session_id,
            role: ChatRole::Assistant,
            content: response.to_string(),
            has_crisis: false,
        })?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat_log::MemoryChatLog;
    use crate::runtime_log::{read_recent, temp_path, LogLevel};

    struct FailingBackend;

    impl ChatBackend for FailingBackend {
        fn complete(&self, _request: &ChatRequest) -> Result<String, ChatError> {
            Err(ChatError::QuotaExceeded)
        }
    }

    struct EchoBackend;

    impl ChatBackend for EchoBackend {
        fn complete(&self, request: &ChatRequest) -> Result<String, ChatError> {
            serde_json::to_string(request).map_err(ChatError::from)
        }
    }

    fn relay<B: ChatBackend>(backend: B, settings: AppSettings) -> ChatRelay<B> {
        ChatRelay::new(backend, settings, RuntimeLog::disabled())
    }

    #[test]
    fn request_carries_fixed_prompt_and_limits() {
        let request = ChatRequest::new(&AppSettings::default(), "hello");
        assert_eq!(request.model, "gpt-4o-mini");
        assert_eq!(request.max_tokens, 200);
        assert_eq!(request.messages.len(), 2);
        assert_eq!(request.messages[0].role, ChatRole::System);
        assert!(request.messages[0].content.contains("You are MindMate"));
        assert!(request.messages[0].content.contains("gentle, patient listener"));
        assert_eq!(request.messages[1].content, "hello");
    }

    #[test]
    fn request_serializes_openai_shape() {
        let request = ChatRequest::new(&AppSettings::default(), "hi");
        let value = serde_json::to_value(&request).expect("request should serialize");
        assert_eq!(value["messages"][0]["role"], "system");
        assert_eq!(value["messages"][1]["role"], "user");
        assert_eq!(value["max_tokens"], 200);
    }

    #[test]
    fn empty_message_is_rejected_before_backend() {
        let relay = relay(FailingBackend, AppSettings::default());
        let error = relay.handle("   ").expect_err("blank message should fail");
        assert_eq!(error.status_code(), 400);
    }

    #[test]
    fn returns_backend_text_with_trimmed_message() {
        let relay = relay(EchoBackend, AppSettings::default());
        let reply = relay.handle("  how are you  ").expect("reply should succeed");
        assert!(reply.response.contains("\"content\":\"how are you\""));
        assert!(reply.crisis.is_none());
    }

    #[test]
    fn crisis_messages_attach_regional_response() {
        let relay = relay(StubChatBackend::default(), AppSettings::default());
        let reply = relay
            .handle("I feel like a burden to everyone")
            .expect("reply should succeed");
        let crisis = reply.crisis.expect("crisis response should attach");
        assert_eq!(crisis.emergency_contact.number, "9152987821");
    }

    #[test]
    fn backend_errors_propagate_and_are_logged() {
        let path = temp_path("chat", "errors", "log");
        let relay = ChatRelay::new(
            FailingBackend,
            AppSettings::default(),
            RuntimeLog::new(path.clone()),
        );
        let error = relay.handle("hello").expect_err("backend should fail");
        assert_eq!(error.status_code(), 429);

        let entries = read_recent(&path, 5).expect("log should read");
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].level, LogLevel::Error);
        assert_eq!(entries[0].event, "chat.error");

        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn persists_exchange_when_enabled() {
        let settings = AppSettings {
            persist_chat: true,
            ..AppSettings::default()
        };
        let relay = relay(StubChatBackend::default(), settings)
            .with_chat_log(Box::new(MemoryChatLog::default()));

        relay.handle("first").expect("reply should succeed");
        relay.handle("I want to die").expect("reply should succeed");

        let session_id = relay.session_id().expect("session should be created");
        let stored = relay
            .chat_log
            .as_ref()
            .expect("chat log configured")
            .messages_for_session(session_id)
            .expect("messages should list");
        assert_eq!(stored.len(), 4);
        assert_eq!(stored[0].role, ChatRole::User);
        assert_eq!(stored[1].role, ChatRole::Assistant);
        assert!(!stored[0].has_crisis);
        assert!(stored[2].has_crisis);
    }

    #[test]
    fn settings_update_applies_through_shared_reference() {
        let relay = relay(EchoBackend, AppSettings::default());
        relay
            .set_settings(AppSettings {
                chat_model: "gpt-4o".to_string(),
                ..AppSettings::default()
            })
            .expect("settings should update");
        let reply = relay.handle("hi").expect("reply should succeed");
        assert!(reply.response.contains("\"model\":\"gpt-4o\""));
    }

    #[test]
    fn skips_persistence_when_disabled() {
        let relay = relay(StubChatBackend::default(), AppSettings::default())
            .with_chat_log(Box::new(MemoryChatLog::default()));
        relay.handle("hello").expect("reply should succeed");
        assert!(relay.session_id().is_none());
    }

    #[test]
    fn parses_first_choice_content() {
        let body = r#"{"choices":[{"message":{"role":"assistant","content":"Take a breath."}}]}"#;
        assert_eq!(
            parse_completion(body).expect("body should parse"),
            "Take a breath."
        );
        assert!(matches!(
            parse_completion(r#"{"choices":[]}"#),
            Err(ChatError::EmptyCompletion)
        ));
    }

    #[test]
    fn maps_api_error_codes() {
        let quota = r#"{"error":{"code":"insufficient_quota","message":"quota"}}"#;
        assert!(matches!(error_from_api(429, quota), ChatError::QuotaExceeded));

        let bad_key = r#"{"error":{"code":"invalid_api_key","message":"bad key"}}"#;
        assert!(matches!(error_from_api(401, bad_key), ChatError::InvalidApiKey));

        match error_from_api(503, "upstream unavailable") {
            ChatError::Backend(message) => assert_eq!(message, "HTTP 503"),
            other => panic!("unexpected error {other:?}"),
        }
    }
}
