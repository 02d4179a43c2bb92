//! `;`-delimited CSV store
//!
//! One `question;answer` record per row with an optional header row. Rows
//! are appended as they are learned.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use super::{file_tail, read_optional, strip_bom, FileTail, KnowledgeStore, StoreError, StoreFormat};
use crate::types::QaEntry;

const DELIMITER: u8 = b';';
const HEADER: [&str; 2] = ["question", "answer"];

#[derive(Debug, Clone)]
pub struct CsvStore {
    path: PathBuf,
}

impl CsvStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn parse(&self, content: &str) -> Result<Vec<QaEntry>, StoreError> {
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(DELIMITER)
            .has_headers(false)
            .flexible(true)
            .from_reader(strip_bom(content).as_bytes());

        let mut entries = Vec::new();
        for (row, record) in reader.records().enumerate() {
            let record = record
                .map_err(|e| StoreError::corrupt(&self.path, format!("row {}: {}", row + 1, e)))?;

            let question = record.get(0).map(str::trim).unwrap_or_default();
            let answer = record.get(1).map(str::trim).unwrap_or_default();

            if row == 0 && is_header(question) {
                continue;
            }
            if question.is_empty() && answer.is_empty() {
                continue;
            }
            entries.push(QaEntry::new(question, answer));
        }
        Ok(entries)
    }

    fn writer(&self, append: bool, leading_newline: bool) -> Result<csv::Writer<File>, StoreError> {
        let mut file = OpenOptions::new()
            .create(true)
            .write(true)
            .append(append)
            .truncate(!append)
            .open(&self.path)
            .map_err(|e| StoreError::io(&self.path, e))?;

        if leading_newline {
            file.write_all(b"\n").map_err(|e| StoreError::io(&self.path, e))?;
        }

        Ok(csv::WriterBuilder::new()
            .delimiter(DELIMITER)
            .from_writer(file))
    }

    fn write_err(&self, e: csv::Error) -> StoreError {
        StoreError::io(&self.path, std::io::Error::other(e))
    }
}

/// First cell of a header row, in either of the two languages seen in the wild
fn is_header(first_cell: &str) -> bool {
    matches!(first_cell.to_lowercase().as_str(), "question" | "pregunta")
}

impl KnowledgeStore for CsvStore {
    fn format(&self) -> StoreFormat {
        StoreFormat::Csv
    }

    fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<Vec<QaEntry>, StoreError> {
        match read_optional(&self.path)? {
            Some(content) => self.parse(&content),
            None => Ok(Vec::new()),
        }
    }

    fn append(&self, entry: &QaEntry) -> Result<(), StoreError> {
        let tail = file_tail(&self.path);
        let needs_header = tail == FileTail::Empty;

        let mut writer = self.writer(true, tail == FileTail::Unterminated)?;
        if needs_header {
            writer.write_record(HEADER).map_err(|e| self.write_err(e))?;
        }
        writer
            .write_record([entry.question(), entry.answer()])
            .map_err(|e| self.write_err(e))?;
        writer.flush().map_err(|e| StoreError::io(&self.path, e))
    }

    fn rewrite(&self, entries: &[QaEntry]) -> Result<(), StoreError> {
        let mut writer = self.writer(false, false)?;
        writer.write_record(HEADER).map_err(|e| self.write_err(e))?;
        for entry in entries {
            writer
                .write_record([entry.question(), entry.answer()])
                .map_err(|e| self.write_err(e))?;
        }
        writer.flush().map_err(|e| StoreError::io(&self.path, e))
    }
}
