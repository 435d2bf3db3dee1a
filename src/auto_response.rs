use serde::{Deserialize, Serialize};

pub const DEFAULT_HISTORY_LIMIT: usize = 20;

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserProfile {
    pub name: Option<String>,
    pub greeting: Option<String>,
    pub introduction: Option<String>,
    pub about: Option<String>,
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ResponseKind {
    Hello,
    Introduce,
    Greeting,
    Thanks,
    Help,
}

impl ResponseKind {
    const ORDERED: [ResponseKind; 5] = [
        ResponseKind::Hello,
        ResponseKind::Introduce,
        ResponseKind::Greeting,
        ResponseKind::Thanks,
        ResponseKind::Help,
    ];

    fn key(self) -> &'static str {
        match self {
            ResponseKind::Hello => "hello",
            ResponseKind::Introduce => "introduce",
            ResponseKind::Greeting => "greeting",
            ResponseKind::Thanks => "thanks",
            ResponseKind::Help => "help",
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct AutoResponse {
    pub kind: ResponseKind,
    pub text: String,
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty())
}

fn reply_text(kind: ResponseKind, profile: &UserProfile) -> String {
    let name = non_blank(&profile.name);
    match kind {
        ResponseKind::Hello => non_blank(&profile.greeting)
            .map(str::to_string)
            .unwrap_or_else(|| {
                format!(
                    "Hello! My name is {}. Nice to meet you!",
                    name.unwrap_or("there")
                )
            }),
        ResponseKind::Introduce => non_blank(&profile.introduction)
            .map(str::to_string)
            .unwrap_or_else(|| {
                format!(
                    "My name is {}. {}",
                    name.unwrap_or("unknown"),
                    non_blank(&profile.about).unwrap_or("Pleased to meet you!")
                )
            }),
        ResponseKind::Greeting => non_blank(&profile.greeting)
            .unwrap_or("Hello! How are you?")
            .to_string(),
        ResponseKind::Thanks => "You're welcome! Happy to help.".to_string(),
        ResponseKind::Help => "I'm here to assist. What do you need?".to_string(),
    }
}

/// Picks the spoken reply for a recognized gesture name, if any key occurs in it.
pub fn respond_to_gesture(gesture: &str, profile: &UserProfile) -> Option<AutoResponse> {
    let lowered = gesture.to_lowercase();
    ResponseKind::ORDERED
        .into_iter()
        .find(|kind| lowered.contains(kind.key()))
        .map(|kind| AutoResponse {
            kind,
            text: reply_text(kind, profile),
        })
}

/// Gestures named for an introduction or greeting also ask the chat relay for a
/// warm follow-up, whichever reply they matched first.
pub fn wants_follow_up(gesture: &str) -> bool {
    let lowered = gesture.to_lowercase();
    lowered.contains("introduce") || lowered.contains("greeting")
}

pub fn follow_up_prompt(gesture: &str, spoken: &str) -> String {
    format!(
        "The user just performed a sign language gesture: \"{gesture}\". I said: \"{spoken}\". \
Please provide a brief, warm follow-up response."
    )
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ConversationEntry {
    pub gesture: String,
    pub response: String,
    pub timestamp_unix_ms: u128,
}

/// Newest-first list of gesture replies, capped at `limit` entries.
#[derive(Debug, Clone, Serialize)]
pub struct ConversationHistory {
    entries: Vec<ConversationEntry>,
    limit: usize,
}

impl Default for ConversationHistory {
    fn default() -> Self {
        Self::with_limit(DEFAULT_HISTORY_LIMIT)
    }
}

impl ConversationHistory {
    pub fn with_limit(limit: usize) -> Self {
        Self {
            entries: Vec::new(),
            limit,
        }
    }

    pub fn push(&mut self, entry: ConversationEntry) {
        self.entries.insert(0, entry);
        self.entries.truncate(self.limit);
    }

    pub fn entries(&self) -> &[ConversationEntry] {
        &self.entries
    }
}
