//! JSON store: a top-level array of `{"question", "answer"}` objects.
//!
//! The document is rewritten in full on every change.

use std::path::{Path, PathBuf};

use super::{read_optional, strip_bom, KnowledgeStore, StoreError, StoreFormat};
use crate::types::QaEntry;

#[derive(Debug, Clone)]
pub struct JsonStore {
    path: PathBuf,
}

impl JsonStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl KnowledgeStore for JsonStore {
    fn format(&self) -> StoreFormat {
        StoreFormat::Json
    }

    fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<Vec<QaEntry>, StoreError> {
        let Some(content) = read_optional(&self.path)? else {
            return Ok(Vec::new());
        };
        let content = strip_bom(&content);
        if content.trim().is_empty() {
            return Ok(Vec::new());
        }

        let entries: Vec<QaEntry> = serde_json::from_str(content)
            .map_err(|e| StoreError::corrupt(&self.path, e.to_string()))?;

        Ok(entries
            .into_iter()
            .map(|e| QaEntry::new(e.question().trim(), e.answer().trim()))
            .collect())
    }

    /// JSON has no cheap append; rewrite with the one entry added
    fn append(&self, entry: &QaEntry) -> Result<(), StoreError> {
        let mut entries = self.load()?;
        entries.push(entry.clone());
        self.rewrite(&entries)
    }

    fn rewrite(&self, entries: &[QaEntry]) -> Result<(), StoreError> {
        let json = serde_json::to_string_pretty(entries)
            .map_err(|e| StoreError::io(&self.path, std::io::Error::other(e)))?;
        std::fs::write(&self.path, json).map_err(|e| StoreError::io(&self.path, e))
    }
}
