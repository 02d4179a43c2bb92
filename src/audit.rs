//! Interaction audit trail
//!
//! Appends one tab-separated line per decision to a plain text log:
//! `YYYY-MM-DD HH:MM:SS<TAB>question: "…"<TAB>answer: "…"<TAB>similarity: 0.93`

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use tracing::debug;

/// Answer recorded when no stored answer was given
pub const NO_ANSWER: &str = "NO ANSWER";

/// Answer recorded when the user taught a new pair
pub const ADDED_BY_USER: &str = "(added by user)";

/// One audited decision
#[derive(Debug, Clone, PartialEq)]
pub struct AuditEvent {
    pub timestamp: DateTime<Local>,
    pub query: String,
    pub answer: String,
    pub similarity: f64,
}

impl AuditEvent {
    pub fn now(query: impl Into<String>, answer: impl Into<String>, similarity: f64) -> Self {
        Self {
            timestamp: Local::now(),
            query: query.into(),
            answer: answer.into(),
            similarity,
        }
    }

    /// Render as one log line, without the trailing newline
    pub fn to_line(&self) -> String {
        format!(
            "{}\tquestion: \"{}\"\tanswer: \"{}\"\tsimilarity: {:.2}",
            self.timestamp.format("%Y-%m-%d %H:%M:%S"),
            one_line(&self.query),
            one_line(&self.answer),
            self.similarity,
        )
    }
}

/// Keep each event on its own line
fn one_line(text: &str) -> String {
    text.replace(['\r', '\n'], " ")
}

/// Receives every decision the session makes
#[cfg_attr(test, mockall::automock)]
pub trait AuditSink {
    fn record(&self, event: &AuditEvent) -> Result<()>;
}

/// Audit log backed by an append-only text file
pub struct FileAuditLog {
    path: PathBuf,
}

impl FileAuditLog {
    /// Create with a custom file path
    pub fn with_path(path: PathBuf) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .context("Failed to create audit log directory")?;
        }
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Last `limit` lines of the log, oldest first
    pub fn tail(&self, limit: usize) -> Result<Vec<String>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let content = std::fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read {}", self.path.display()))?;
        let lines: Vec<&str> = content.lines().collect();
        let start = lines.len().saturating_sub(limit);
        Ok(lines[start..].iter().map(|l| l.to_string()).collect())
    }
}

impl AuditSink for FileAuditLog {
    fn record(&self, event: &AuditEvent) -> Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .with_context(|| format!("Failed to open {}", self.path.display()))?;
        writeln!(file, "{}", event.to_line())
            .with_context(|| format!("Failed to write {}", self.path.display()))?;
        debug!("Audited {:?} in {}", event.query, self.path.display());
        Ok(())
    }
}
