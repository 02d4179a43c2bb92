//! Line-delimited text store, one `question:answer` pair per line

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use super::{file_tail, read_optional, strip_bom, FileTail, KnowledgeStore, StoreError, StoreFormat};
use crate::types::QaEntry;

const SEPARATOR: char = ':';

#[derive(Debug, Clone)]
pub struct TextStore {
    path: PathBuf,
}

impl TextStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn parse(content: &str) -> Vec<QaEntry> {
        strip_bom(content)
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(|line| match line.split_once(SEPARATOR) {
                Some((question, answer)) => QaEntry::new(question.trim(), answer.trim()),
                None => QaEntry::new(line, ""),
            })
            .collect()
    }
}

/// Render one entry as a line, refusing what would not read back the same
fn render(entry: &QaEntry) -> Result<String, StoreError> {
    let unrepresentable = |reason: &str| StoreError::Unrepresentable {
        format: StoreFormat::Text,
        reason: reason.to_string(),
    };

    if entry.question().contains(SEPARATOR) {
        return Err(unrepresentable("question contains ':'"));
    }
    if [entry.question(), entry.answer()]
        .iter()
        .any(|field| field.contains(['\n', '\r']))
    {
        return Err(unrepresentable("line breaks are not allowed"));
    }
    Ok(format!("{}{}{}\n", entry.question(), SEPARATOR, entry.answer()))
}

impl KnowledgeStore for TextStore {
    fn format(&self) -> StoreFormat {
        StoreFormat::Text
    }

    fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<Vec<QaEntry>, StoreError> {
        Ok(read_optional(&self.path)?
            .map(|content| Self::parse(&content))
            .unwrap_or_default())
    }

    fn append(&self, entry: &QaEntry) -> Result<(), StoreError> {
        let mut line = render(entry)?;
        if file_tail(&self.path) == FileTail::Unterminated {
            line.insert(0, '\n');
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| StoreError::io(&self.path, e))?;
        file.write_all(line.as_bytes())
            .map_err(|e| StoreError::io(&self.path, e))
    }

    fn rewrite(&self, entries: &[QaEntry]) -> Result<(), StoreError> {
        let content = entries
            .iter()
            .map(render)
            .collect::<Result<String, StoreError>>()?;
        std::fs::write(&self.path, content).map_err(|e| StoreError::io(&self.path, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_in(dir: &tempfile::TempDir) -> TextStore {
        TextStore::new(dir.path().join("questions.txt"))
    }

    #[test]
    fn test_splits_on_first_colon() {
        let entries = TextStore::parse("\u{feff}Hora de salida: 15:00 local\n\n  sin respuesta  \n");
        assert_eq!(
            entries,
            vec![
                QaEntry::new("Hora de salida", "15:00 local"),
                QaEntry::new("sin respuesta", ""),
            ]
        );
    }

    #[test]
    fn test_append_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        assert!(store.load().unwrap().is_empty());

        store.append(&QaEntry::new("¿Qué es DRS?", "Un alerón: móvil")).unwrap();
        store.append(&QaEntry::new("Otra", "respuesta")).unwrap();

        assert_eq!(
            store.load().unwrap(),
            vec![
                QaEntry::new("¿Qué es DRS?", "Un alerón: móvil"),
                QaEntry::new("Otra", "respuesta"),
            ]
        );
    }

    #[test]
    fn test_refuses_lossy_entries() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);

        let err = store.append(&QaEntry::new("Time: when?", "now")).unwrap_err();
        assert!(matches!(err, StoreError::Unrepresentable { .. }));
        let err = store.append(&QaEntry::new("q", "two\nlines")).unwrap_err();
        assert!(matches!(err, StoreError::Unrepresentable { .. }));

        // Nothing was written
        assert!(!store.path().exists());
    }

    #[test]
    fn test_append_after_unterminated_last_line() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        std::fs::write(store.path(), "a:1").unwrap();
        store.append(&QaEntry::new("b", "2")).unwrap();
        assert_eq!(store.load().unwrap().len(), 2);
    }
}
