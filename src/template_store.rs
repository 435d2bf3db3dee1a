use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use crate::landmark::LandmarkVector;
use crate::runtime_log::current_unix_ms;

/// A named, averaged landmark vector recorded by the user.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GestureTemplate {
    pub name: String,
    pub vector: LandmarkVector,
    pub sample_count: usize,
    pub created_at_unix_ms: u128,
}

pub trait TemplateStore: Send + Sync {
    fn load(&self) -> Result<Vec<GestureTemplate>, String>;

    fn save(&self, templates: &[GestureTemplate]) -> Result<(), String>;
}

pub fn default_templates_path() -> PathBuf {
    let base = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
    base.join("mindmate").join("gestures.json")
}

#[derive(Debug, Clone)]
pub struct JsonFileTemplateStore {
    path: PathBuf,
}

impl JsonFileTemplateStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Renames an unreadable templates file out of the way so the next save
    /// cannot overwrite the user's recordings. Returns where it was moved.
    pub fn set_aside_corrupt(&self) -> Result<Option<PathBuf>, String> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(error) if error.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(error) => return Err(error.to_string()),
        };
        if serde_json::from_str::<Vec<GestureTemplate>>(&contents).is_ok() {
            return Ok(None);
        }

        let stamp = current_unix_ms()?;
        let mut aside = self.path.clone().into_os_string();
        aside.push(format!(".corrupt-{stamp}"));
        let aside = PathBuf::from(aside);
        fs::rename(&self.path, &aside).map_err(io_to_string)?;
        Ok(Some(aside))
    }
}

impl TemplateStore for JsonFileTemplateStore {
    fn load(&self) -> Result<Vec<GestureTemplate>, String> {
        match fs::read_to_string(&self.path) {
            Ok(contents) => serde_json::from_str::<Vec<GestureTemplate>>(&contents)
                .map_err(|error| {
                    format!("templates file {} is corrupt: {error}", self.path.display())
                }),
            Err(error) if error.kind() == io::ErrorKind::NotFound => Ok(Vec::new()),
            Err(error) => Err(error.to_string()),
        }
    }

    fn save(&self, templates: &[GestureTemplate]) -> Result<(), String> {
        let parent = self
            .path
            .parent()
            .ok_or_else(|| "templates path has no parent directory".to_string())?;
        fs::create_dir_all(parent).map_err(io_to_string)?;
        let contents =
            serde_json::to_string_pretty(templates).map_err(|error| error.to_string())?;
        fs::write(&self.path, contents).map_err(io_to_string)
    }
}

#[derive(Debug, Default)]
pub struct MemoryTemplateStore {
    templates: Mutex<Vec<GestureTemplate>>,
}

impl MemoryTemplateStore {
    pub fn with_templates(templates: Vec<GestureTemplate>) -> Self {
        Self {
            templates: Mutex::new(templates),
        }
    }
}

impl TemplateStore for MemoryTemplateStore {
    fn load(&self) -> Result<Vec<GestureTemplate>, String> {
        self.templates
            .lock()
            .map(|templates| templates.clone())
            .map_err(|_| "failed to acquire template store".to_string())
    }

    fn save(&self, templates: &[GestureTemplate]) -> Result<(), String> {
        let mut stored = self
            .templates
            .lock()
            .map_err(|_| "failed to acquire template store".to_string())?;
        *stored = templates.to_vec();
        Ok(())
    }
}

/// Published view of the user's templates.
///
/// Writers build a new list, persist it, then swap the `Arc`. Readers keep the
/// snapshot they took for as long as they need it, so a match never observes a
/// half-written list.
pub struct TemplateLibrary<S: TemplateStore> {
    store: S,
    current: Mutex<Arc<Vec<GestureTemplate>>>,
}

impl<S: TemplateStore> TemplateLibrary<S> {
    pub fn open(store: S) -> Result<Self, String> {
        let templates = store.load()?;
        Ok(Self {
            store,
            current: Mutex::new(Arc::new(templates)),
        })
    }

    pub fn snapshot(&self) -> Result<Arc<Vec<GestureTemplate>>, String> {
        self.current
            .lock()
            .map(|current| Arc::clone(&current))
            .map_err(|_| "failed to acquire template library".to_string())
    }

    pub fn add(&self, template: GestureTemplate) -> Result<Arc<Vec<GestureTemplate>>, String> {
        let mut current = self
            .current
            .lock()
            .map_err(|_| "failed to acquire template library".to_string())?;
        let mut updated = current.as_ref().clone();
        updated.push(template);
        self.publish(&mut current, updated)
    }

    pub fn delete(&self, index: usize) -> Result<GestureTemplate, String> {
        let mut current = self
            .current
            .lock()
            .map_err(|_| "failed to acquire template library".to_string())?;
        if index >= current.len() {
            return Err(format!(
                "no gesture template at index {index} ({} stored)",
                current.len()
            ));
        }

        let mut updated = current.as_ref().clone();
        let removed = updated.remove(index);
        self.publish(&mut current, updated)?;
        Ok(removed)
    }

    fn publish(
        &self,
        current: &mut Arc<Vec<GestureTemplate>>,
        updated: Vec<GestureTemplate>,
    ) -> Result<Arc<Vec<GestureTemplate>>, String> {
        self.store.save(&updated)?;
        *current = Arc::new(updated);
        Ok(Arc::clone(current))
    }
}

fn io_to_string(error: io::Error) -> String {
    error.to_string()
}
