use std::fs;
use std::path::PathBuf;

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use anyhow::Result;

/// Launched application ids, most recent first, without duplicates.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
#[serde(transparent)]
pub struct RecencyList {
    ids: Vec<String>,
}

impl RecencyList {
    pub fn from_ids(ids: impl IntoIterator<Item = String>, cap: usize) -> Self {
        let mut list = Self::default();
        let ids: Vec<String> = ids.into_iter().collect();
        for id in ids.into_iter().rev() {
            list.record(id, cap);
        }
        list
    }

    /// Moves `id` to the front, dropping the oldest entries beyond `cap`.
    pub fn record(&mut self, id: impl Into<String>, cap: usize) {
        let id = id.into();
        self.ids.retain(|existing| *existing != id);
        self.ids.insert(0, id);
        self.ids.truncate(cap);
    }

    pub fn position(&self, id: &str) -> Option<usize> {
        self.ids.iter().position(|existing| existing == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.ids.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

/// On-disk shape of the history file.
#[derive(Serialize, Deserialize, Default)]
struct HistoryFile {
    #[serde(default)]
    recents: RecencyList,
    #[serde(default)]
    active_theme: Option<String>,
}

/// Recents and the committed theme, persisted as JSON.
/// A store without a path keeps everything in memory.
#[derive(Debug, Clone)]
pub struct History {
    path: Option<PathBuf>,
    cap: usize,
    pub recents: RecencyList,
    pub active_theme: Option<String>,
}

pub fn get_history_path() -> Option<PathBuf> {
    ProjectDirs::from("org", "keyrun", "keyrun")
        .map(|dirs| dirs.data_dir().join("history.json"))
}

impl History {
    pub fn in_memory(cap: usize) -> Self {
        Self {
            path: None,
            cap,
            recents: RecencyList::default(),
            active_theme: None,
        }
    }

    /// Loads from `path`; unreadable or corrupt files start empty.
    pub fn load(path: Option<PathBuf>, cap: usize) -> Self {
        let mut history = Self::in_memory(cap);
        if let Some(path) = &path {
            if let Ok(content) = fs::read_to_string(path) {
                match serde_json::from_str::<HistoryFile>(&content) {
                    Ok(file) => {
                        history.recents = RecencyList::from_ids(file.recents.ids, cap);
                        history.active_theme = file.active_theme;
                    }
                    Err(e) => log::warn!("ignoring corrupt history {:?}: {}", path, e),
                }
            }
        }
        history.path = path;
        history
    }

    pub fn save(&self) -> Result<()> {
        let Some(path) = &self.path else { return Ok(()) };
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let file = HistoryFile {
            recents: self.recents.clone(),
            active_theme: self.active_theme.clone(),
        };
        fs::write(path, serde_json::to_string_pretty(&file)?)?;
        Ok(())
    }

    pub fn record_launch(&mut self, id: &str) -> Result<()> {
        self.recents.record(id, self.cap);
        self.save()
    }

    pub fn set_active_theme(&mut self, name: &str) -> Result<()> {
        self.active_theme = Some(name.to_string());
        self.save()
    }
}
