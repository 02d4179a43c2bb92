//! Knowledge base persistence
//!
//! Three interchangeable file formats behind one [`KnowledgeStore`] trait:
//! - `;`-delimited CSV (append-friendly)
//! - `question:answer` text lines (append-friendly)
//! - a JSON array of objects (rewritten whole on every change)
//!
//! A missing file loads as an empty base. Structural corruption is reported,
//! never papered over with an empty result.

pub mod csv_store;
pub mod text_store;
pub mod json_store;

use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use crate::types::QaEntry;

pub use csv_store::CsvStore;
pub use text_store::TextStore;
pub use json_store::JsonStore;

/// Base file name inside the data directory
pub const STORE_STEM: &str = "questions";

/// Store errors
#[derive(Debug, Error)]
pub enum StoreError {
    /// Underlying file I/O failed
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file exists but cannot be parsed
    #[error("Corrupt knowledge base {path}: {message}")]
    Corrupt { path: PathBuf, message: String },

    /// The entry cannot be written in this format without losing data
    #[error("Cannot store entry in {format} format: {reason}")]
    Unrepresentable { format: StoreFormat, reason: String },

    /// No format matches the file
    #[error("Unsupported knowledge base format: {0}")]
    UnsupportedFormat(String),
}

impl StoreError {
    pub(crate) fn io(path: &Path, source: std::io::Error) -> Self {
        StoreError::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    pub(crate) fn corrupt(path: &Path, message: impl Into<String>) -> Self {
        StoreError::Corrupt {
            path: path.to_path_buf(),
            message: message.into(),
        }
    }
}

/// Backing file format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreFormat {
    Csv,
    Json,
    Text,
}

impl StoreFormat {
    /// Detection order inside a data directory
    pub const PREFERENCE: [StoreFormat; 3] = [StoreFormat::Csv, StoreFormat::Json, StoreFormat::Text];

    pub fn extension(self) -> &'static str {
        match self {
            StoreFormat::Csv => "csv",
            StoreFormat::Json => "json",
            StoreFormat::Text => "txt",
        }
    }

    /// Format implied by a file extension
    pub fn from_path(path: &Path) -> Result<Self, StoreError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .unwrap_or_default();
        ext.parse()
    }

    /// Whether new entries are appended instead of rewriting the file
    pub fn appends(self) -> bool {
        !matches!(self, StoreFormat::Json)
    }
}

impl std::fmt::Display for StoreFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreFormat::Csv => write!(f, "csv"),
            StoreFormat::Json => write!(f, "json"),
            StoreFormat::Text => write!(f, "text"),
        }
    }
}

impl std::str::FromStr for StoreFormat {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "csv" => Ok(StoreFormat::Csv),
            "json" => Ok(StoreFormat::Json),
            "txt" | "text" => Ok(StoreFormat::Text),
            other => Err(StoreError::UnsupportedFormat(other.to_string())),
        }
    }
}

/// Loader and persister for one backing file
#[cfg_attr(test, mockall::automock)]
pub trait KnowledgeStore {
    fn format(&self) -> StoreFormat;

    /// Backing file
    fn path(&self) -> &Path;

    /// Read every pair. A missing file yields an empty list.
    fn load(&self) -> Result<Vec<QaEntry>, StoreError>;

    /// Add one entry at the end of the file
    fn append(&self, entry: &QaEntry) -> Result<(), StoreError>;

    /// Replace the file with `entries`
    fn rewrite(&self, entries: &[QaEntry]) -> Result<(), StoreError>;

    /// Persist a newly learned `entry`; `all` already ends with it.
    ///
    /// Append-friendly formats append, the rest rewrite the whole document.
    fn persist(&self, entry: &QaEntry, all: &[QaEntry]) -> Result<(), StoreError> {
        if self.format().appends() {
            self.append(entry)
        } else {
            self.rewrite(all)
        }
    }
}

/// Open a store of `format` at `path`
pub fn open(format: StoreFormat, path: impl Into<PathBuf>) -> Box<dyn KnowledgeStore> {
    let path = path.into();
    match format {
        StoreFormat::Csv => Box::new(CsvStore::new(path)),
        StoreFormat::Json => Box::new(JsonStore::new(path)),
        StoreFormat::Text => Box::new(TextStore::new(path)),
    }
}

/// A store file picked inside a data directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Located {
    pub format: StoreFormat,
    pub path: PathBuf,
    /// The file did not exist and was seeded with defaults
    pub seeded: bool,
}

/// Path of the store file of `format` inside `dir`
pub fn store_path(dir: &Path, format: StoreFormat) -> PathBuf {
    dir.join(format!("{}.{}", STORE_STEM, format.extension()))
}

/// Find the existing store in `dir`, preferring CSV, then JSON, then text
pub fn detect(dir: &Path) -> Option<Located> {
    StoreFormat::PREFERENCE.iter().find_map(|format| {
        let path = store_path(dir, *format);
        path.is_file().then(|| Located {
            format: *format,
            path,
            seeded: false,
        })
    })
}

/// Locate the store in `dir`, creating one seeded with `defaults` when none exists
pub fn locate_or_seed(
    dir: &Path,
    fresh_format: StoreFormat,
    defaults: &[QaEntry],
) -> Result<Located, StoreError> {
    if let Some(found) = detect(dir) {
        return Ok(found);
    }

    std::fs::create_dir_all(dir).map_err(|e| StoreError::io(dir, e))?;
    let path = store_path(dir, fresh_format);
    open(fresh_format, path.clone()).rewrite(defaults)?;
    info!("Seeded new knowledge base at {} with {} entries", path.display(), defaults.len());

    Ok(Located {
        format: fresh_format,
        path,
        seeded: true,
    })
}

/// Strip a UTF-8 byte order mark; files written by some editors carry one
pub(crate) fn strip_bom(content: &str) -> &str {
    content.strip_prefix('\u{feff}').unwrap_or(content)
}

/// How an existing file ends, for append-only writers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum FileTail {
    /// Missing or zero-length
    Empty,
    /// Last byte is a line feed
    Terminated,
    /// Content without a final line feed
    Unterminated,
}

/// Inspect only the last byte; a missing or unreadable file counts as empty
pub(crate) fn file_tail(path: &Path) -> FileTail {
    let Ok(mut file) = File::open(path) else {
        return FileTail::Empty;
    };
    let len = match file.metadata() {
        Ok(meta) if meta.len() > 0 => meta.len(),
        _ => return FileTail::Empty,
    };

    let mut last = [0u8; 1];
    match file
        .seek(SeekFrom::Start(len - 1))
        .and_then(|_| file.read_exact(&mut last))
    {
        Ok(()) if last[0] == b'\n' => FileTail::Terminated,
        Ok(()) => FileTail::Unterminated,
        Err(_) => FileTail::Empty,
    }
}

/// Read a file, treating "not found" as absent
pub(crate) fn read_optional(path: &Path) -> Result<Option<String>, StoreError> {
    match std::fs::read(path) {
        Ok(bytes) => String::from_utf8(bytes)
            .map(Some)
            .map_err(|e| StoreError::corrupt(path, format!("invalid UTF-8: {}", e))),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(StoreError::io(path, e)),
    }
}
