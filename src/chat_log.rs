use serde::{Deserialize, Serialize};
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::config::Personality;
use crate::runtime_log::current_unix_ms;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ChatRole {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChatSession {
    pub id: u64,
    pub user_id: Option<String>,
    pub personality: Personality,
    pub created_at_unix_ms: u128,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChatMessage {
    pub id: u64,
    pub session_id: u64,
    pub role: ChatRole,
    pub content: String,
    pub timestamp_unix_ms: u128,
    pub has_crisis: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewChatMessage {
    pub session_id: u64,
    pub role: ChatRole,
    pub content: String,
    pub has_crisis: bool,
}

/// Append-only store of chat sessions and their messages.
pub trait ChatLog: Send + Sync {
    fn create_session(
        &self,
        user_id: Option<&str>,
        personality: Personality,
    ) -> Result<ChatSession, String>;

    /// Fails when `message.session_id` does not name an existing session.
    fn append_message(&self, message: NewChatMessage) -> Result<ChatMessage, String>;

    fn messages_for_session(&self, session_id: u64) -> Result<Vec<ChatMessage>, String>;
}

#[derive(Debug, Clone, Default)]
struct Tables {
    sessions: Vec<ChatSession>,
    messages: Vec<ChatMessage>,
}

impl Tables {
    fn next_session(&self, user_id: Option<&str>, personality: Personality) -> ChatSession {
        ChatSession {
            id: self.sessions.iter().map(|session| session.id).max().unwrap_or(0) + 1,
            user_id: user_id.map(str::to_string),
            personality,
            created_at_unix_ms: current_unix_ms().unwrap_or(0),
        }
    }

    fn next_message(&self, message: NewChatMessage) -> Result<ChatMessage, String> {
        if !self
            .sessions
            .iter()
            .any(|session| session.id == message.session_id)
        {
            return Err(format!("unknown chat session {}", message.session_id));
        }

        Ok(ChatMessage {
            id: self.messages.iter().map(|stored| stored.id).max().unwrap_or(0) + 1,
            session_id: message.session_id,
            role: message.role,
            content: message.content,
            timestamp_unix_ms: current_unix_ms().unwrap_or(0),
            has_crisis: message.has_crisis,
        })
    }

    fn messages_for(&self, session_id: u64) -> Vec<ChatMessage> {
        self.messages
            .iter()
            .filter(|message| message.session_id == session_id)
            .cloned()
            .collect()
    }
}

#[derive(Debug, Default)]
pub struct MemoryChatLog {
    tables: Mutex<Tables>,
}

impl ChatLog for MemoryChatLog {
    fn create_session(
        &self,
        user_id: Option<&str>,
        personality: Personality,
    ) -> Result<ChatSession, String> {
        let mut tables = self
            .tables
            .lock()
            .map_err(|_| "failed to acquire chat log".to_string())?;
        let session = tables.next_session(user_id, personality);
        tables.sessions.push(session.clone());
        Ok(session)
    }

    fn append_message(&self, message: NewChatMessage) -> Result<ChatMessage, String> {
        let mut tables = self
            .tables
            .lock()
            .map_err(|_| "failed to acquire chat log".to_string())?;
        let stored = tables.next_message(message)?;
        tables.messages.push(stored.clone());
        Ok(stored)
    }

    fn messages_for_session(&self, session_id: u64) -> Result<Vec<ChatMessage>, String> {
        self.tables
            .lock()
            .map(|tables| tables.messages_for(session_id))
            .map_err(|_| "failed to acquire chat log".to_string())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
enum LogRecord {
    Session(ChatSession),
    Message(ChatMessage),
}

pub fn default_chat_log_path() -> PathBuf {
    let base = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
    base.join("mindmate").join("chat.jsonl")
}

/// Chat log persisted as one JSON record per line.
///
/// The file is read once on first use; afterwards appends update the cached
/// tables and the file together.
#[derive(Debug)]
pub struct JsonLinesChatLog {
    path: PathBuf,
    tables: Mutex<Option<Tables>>,
}

impl JsonLinesChatLog {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            tables: Mutex::new(None),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_tables(&self) -> Result<Tables, String> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(error) if error.kind() == io::ErrorKind::NotFound => return Ok(Tables::default()),
            Err(error) => return Err(error.to_string()),
        };

        let mut tables = Tables::default();
        for line in contents.lines() {
            if line.trim().is_empty() {
                continue;
            }
            let Ok(record) = serde_json::from_str::<LogRecord>(line) else {
                continue;
            };
            match record {
                LogRecord::Session(session) => tables.sessions.push(session),
                LogRecord::Message(message) => tables.messages.push(message),
            }
        }
        Ok(tables)
    }

    fn with_tables<T>(
        &self,
        action: impl FnOnce(&mut Tables) -> Result<T, String>,
    ) -> Result<T, String> {
        let mut cached = self
            .tables
            .lock()
            .map_err(|_| "failed to acquire chat log".to_string())?;
        if cached.is_none() {
            *cached = Some(self.read_tables()?);
        }
        action(cached.get_or_insert_with(Tables::default))
    }

    fn append_record(&self, record: &LogRecord) -> Result<(), String> {
        let parent = self
            .path
            .parent()
            .ok_or_else(|| "chat log path has no parent directory".to_string())?;
        fs::create_dir_all(parent).map_err(io_to_string)?;

        let line = serde_json::to_string(record).map_err(|error| error.to_string())?;
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(io_to_string)?;
        writeln!(file, "{line}").map_err(io_to_string)
    }
}

impl ChatLog for JsonLinesChatLog {
    fn create_session(
        &self,
        user_id: Option<&str>,
        personality: Personality,
    ) -> Result<ChatSession, String> {
        self.with_tables(|tables| {
            let session = tables.next_session(user_id, personality);
            self.append_record(&LogRecord::Session(session.clone()))?;
            tables.sessions.push(session.clone());
            Ok(session)
        })
    }

    fn append_message(&self, message: NewChatMessage) -> Result<ChatMessage, String> {
        self.with_tables(|tables| {
            let stored = tables.next_message(message)?;
            self.append_record(&LogRecord::Message(stored.clone()))?;
            tables.messages.push(stored.clone());
            Ok(stored)
        })
    }

    fn messages_for_session(&self, session_id: u64) -> Result<Vec<ChatMessage>, String> {
        self.with_tables(|tables| Ok(tables.messages_for(session_id)))
    }
}

fn io_to_string(error: io::Error) -> String {
    error.to_string()
}
