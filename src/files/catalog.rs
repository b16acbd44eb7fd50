//! File catalog module
//!
//! The fixed, ordered list of files reported by the assistant and the
//! directory they are read from.

use crate::config::AssistantConfig;
use crate::logger;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tokio::fs;

/// Content reported for a file that cannot be read
pub const UNREADABLE: &str = "File not found or unreadable";

/// One file of the reply
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileEntry {
    pub name: String,
    pub content: String,
}

impl FileEntry {
    pub fn new(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
        }
    }

    pub fn unreadable(name: impl Into<String>) -> Self {
        Self::new(name, UNREADABLE)
    }
}

/// Ordered file list rooted at a base directory
#[derive(Debug, Clone)]
pub struct FileCatalog {
    dir: PathBuf,
    names: Vec<String>,
}

impl FileCatalog {
    pub fn new(dir: impl Into<PathBuf>, names: Vec<String>) -> Self {
        Self {
            dir: dir.into(),
            names,
        }
    }

    pub fn from_config(config: &AssistantConfig) -> Self {
        Self::new(&config.files_dir, config.files.clone())
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Read one file as text.
    ///
    /// Invalid UTF-8 sequences are replaced rather than failing the read.
    /// Returns `None` when the file is missing or cannot be read.
    pub async fn read(&self, name: &str) -> Option<String> {
        let path = self.dir.join(name);
        match fs::read(&path).await {
            Ok(bytes) => Some(String::from_utf8_lossy(&bytes).into_owned()),
            Err(e) => {
                logger::log_debug(&format!("Cannot read '{}': {e}", path.display()));
                None
            }
        }
    }

    /// Read every file in list order, pairing each name with its content
    pub async fn read_all(&self) -> Vec<(&str, Option<String>)> {
        let mut files = Vec::with_capacity(self.names.len());
        for name in &self.names {
            files.push((name.as_str(), self.read(name).await));
        }
        files
    }
}
