//! Storage utilities for the notecharter.
//!
//! File-browser state for the open/save dialogs plus the error type every
//! chart I/O path reports through.

use std::path::{Path, PathBuf};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("file not found: {0}")]
    NotFound(PathBuf),
}

pub type Result<T> = std::result::Result<T, StorageError>;

/// State behind the in-app open/save dialog windows.
///
/// Entries are refreshed eagerly: directories first, both halves sorted
/// case-insensitively, hidden files skipped, and plain files filtered to the
/// configured extensions.
#[derive(Debug, Clone)]
pub struct FileBrowser {
    pub current_dir: PathBuf,
    pub entries: Vec<FileEntry>,
    pub selected_index: Option<usize>,
    pub filter_extensions: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct FileEntry {
    pub name: String,
    pub path: PathBuf,
    pub is_directory: bool,
}

impl FileBrowser {
    pub fn new(start_dir: PathBuf) -> Self {
        let mut browser = Self {
            current_dir: start_dir,
            entries: Vec::new(),
            selected_index: None,
            filter_extensions: Vec::new(),
        };
        browser.refresh();
        browser
    }

    pub fn with_filter(mut self, extensions: Vec<String>) -> Self {
        self.filter_extensions = extensions;
        self.refresh();
        self
    }

    fn accepts(&self, path: &Path) -> bool {
        if self.filter_extensions.is_empty() {
            return true;
        }
        let ext = path
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
            .unwrap_or_default();
        self.filter_extensions.iter().any(|f| f.to_lowercase() == ext)
    }

    pub fn refresh(&mut self) {
        self.entries.clear();
        self.selected_index = None;

        if let Some(parent) = self.current_dir.parent() {
            self.entries.push(FileEntry {
                name: "..".to_string(),
                path: parent.to_path_buf(),
                is_directory: true,
            });
        }

        let mut dirs = Vec::new();
        let mut files = Vec::new();

        if let Ok(read_dir) = std::fs::read_dir(&self.current_dir) {
            for entry in read_dir.flatten() {
                let path = entry.path();
                let name = entry.file_name().to_string_lossy().to_string();

                if name.starts_with('.') {
                    continue;
                }

                let is_directory = path.is_dir();
                if !is_directory && !self.accepts(&path) {
                    continue;
                }

                let item = FileEntry { name, path, is_directory };
                if is_directory {
                    dirs.push(item);
                } else {
                    files.push(item);
                }
            }
        }

        dirs.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));
        files.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));

        self.entries.extend(dirs);
        self.entries.extend(files);
    }

    pub fn navigate_to(&mut self, path: PathBuf) {
        if path.is_dir() {
            self.current_dir = path;
            self.refresh();
        }
    }

    pub fn selected_entry(&self) -> Option<&FileEntry> {
        self.selected_index.and_then(|i| self.entries.get(i))
    }

    /// Directory a new file would be written into.
    pub fn save_directory(&self) -> PathBuf {
        self.current_dir.clone()
    }
}

/// Well-known chart directory (~/Charts). Created on first use; falls back
/// to the documents directory, then the working directory.
pub fn charts_dir() -> PathBuf {
    if let Some(dirs) = directories::UserDirs::new() {
        let charts = dirs.home_dir().join("Charts");
        if charts.is_dir() {
            return charts;
        }
        let _ = std::fs::create_dir_all(&charts);
        if charts.is_dir() {
            return charts;
        }
        if let Some(docs) = dirs.document_dir() {
            return docs.to_path_buf();
        }
    }
    PathBuf::from(".")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_matches_case_insensitively() {
        let browser = FileBrowser {
            current_dir: PathBuf::from("."),
            entries: Vec::new(),
            selected_index: None,
            filter_extensions: vec!["thapsteak".into()],
        };
        assert!(browser.accepts(Path::new("song.thapsteak")));
        assert!(browser.accepts(Path::new("SONG.THAPSTEAK")));
        assert!(!browser.accepts(Path::new("song.json")));
        assert!(!browser.accepts(Path::new("song")));
    }

    #[test]
    fn test_empty_filter_accepts_everything() {
        let browser = FileBrowser {
            current_dir: PathBuf::from("."),
            entries: Vec::new(),
            selected_index: None,
            filter_extensions: Vec::new(),
        };
        assert!(browser.accepts(Path::new("anything.xyz")));
        assert!(browser.accepts(Path::new("no_extension")));
    }
}
