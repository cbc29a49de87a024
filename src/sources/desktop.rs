use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Result;
use directories::BaseDirs;
use log::{debug, info};

use crate::model::AppEntry;
use crate::sources::Source;

pub struct DesktopSource {
    dirs: Vec<PathBuf>,
}

impl Default for DesktopSource {
    fn default() -> Self {
        Self::new()
    }
}

impl DesktopSource {
    /// User applications first so they shadow system ones with the same id.
    pub fn new() -> Self {
        let mut dirs = Vec::new();
        if let Some(base_dirs) = BaseDirs::new() {
            dirs.push(base_dirs.data_dir().join("applications"));
        }
        dirs.push(Path::new("/usr/share/applications").to_path_buf());
        dirs.push(Path::new("/usr/local/share/applications").to_path_buf());
        Self { dirs }
    }

    pub fn with_dirs(dirs: Vec<PathBuf>) -> Self {
        Self { dirs }
    }
}

impl Source for DesktopSource {
    fn scan(&self) -> Result<Vec<AppEntry>> {
        let mut entries = Vec::new();
        let mut seen_ids = HashSet::new();

        for dir in &self.dirs {
            if !dir.exists() {
                continue;
            }
            debug!("Scanning desktop files in {:?}", dir);
            let Ok(read_dir) = fs::read_dir(dir) else { continue };

            let mut paths: Vec<PathBuf> = read_dir
                .flatten()
                .map(|e| e.path())
                .filter(|p| p.extension().and_then(|s| s.to_str()) == Some("desktop"))
                .collect();
            paths.sort();

            for path in paths {
                let Some(file_name) = path.file_name().map(|s| s.to_os_string()) else { continue };
                if !seen_ids.insert(file_name) {
                    continue;
                }
                let Ok(content) = fs::read_to_string(&path) else { continue };
                if let Some(mut entry) = parse_desktop_file(&content) {
                    entry.id = path.to_string_lossy().to_string();
                    entries.push(entry);
                }
            }
        }

        entries.sort_by(|a, b| {
            a.name
                .to_lowercase()
                .cmp(&b.name.to_lowercase())
                .then_with(|| a.id.cmp(&b.id))
        });
        info!("DesktopSource: found {} entries", entries.len());
        Ok(entries)
    }
}

/// Parses the `[Desktop Entry]` group. Hidden and non-application
/// entries yield `None`. The returned id is empty.
pub fn parse_desktop_file(content: &str) -> Option<AppEntry> {
    let mut name = None;
    let mut exec = None;
    let mut terminal = false;
    let mut hidden = false;
    let mut icon = None;
    let mut kind = None;
    let mut is_desktop_entry = false;

    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') { continue; }

        if line == "[Desktop Entry]" {
            is_desktop_entry = true;
            continue;
        }

        if line.starts_with('[') {
            is_desktop_entry = false;
            continue;
        }

        if !is_desktop_entry { continue; }

        let Some((key, value)) = line.split_once('=') else { continue };
        let value = value.trim();
        match key.trim() {
            "Name" => name = Some(value.to_string()),
            "Exec" => exec = Some(value.to_string()),
            "Terminal" => terminal = value == "true",
            "NoDisplay" | "Hidden" => hidden |= value == "true",
            "Icon" if !value.is_empty() => icon = Some(value.to_string()),
            "Type" => kind = Some(value.to_string()),
            _ => {}
        }
    }

    if hidden || kind.as_deref().is_some_and(|k| k != "Application") {
        return None;
    }

    match (name, exec) {
        (Some(name), Some(exec)) if !exec.is_empty() => {
            let mut entry = AppEntry::new(String::new(), name, exec);
            entry.icon = icon;
            entry.terminal = terminal;
            Some(entry)
        }
        _ => None,
    }
}
