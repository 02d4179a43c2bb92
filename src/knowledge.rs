//! In-memory knowledge base
//!
//! An ordered, append-only list of question/answer pairs. Duplicate questions
//! are allowed; insertion order is preserved because the ranker breaks ties
//! by it.

use crate::types::QaEntry;

/// Pairs a fresh store is seeded with
pub fn default_entries() -> Vec<QaEntry> {
    vec![
        QaEntry::new(
            "¿Qué es un Gran Premio en Fórmula 1?",
            "Un Gran Premio es una carrera del campeonato de F1 que se celebra en diferentes países.",
        ),
        QaEntry::new(
            "¿Qué significa pole position?",
            "La pole position es la primera posición de largada obtenida por el piloto más rápido en clasificación.",
        ),
        QaEntry::new(
            "¿Cuántos puntos se otorgan al ganador de una carrera de F1?",
            "Al ganador se le otorgan 25 puntos en el campeonato.",
        ),
    ]
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KnowledgeBase {
    entries: Vec<QaEntry>,
}

impl KnowledgeBase {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entry at `index` (insertion position)
    pub fn get(&self, index: usize) -> Option<&QaEntry> {
        self.entries.get(index)
    }

    pub fn entries(&self) -> &[QaEntry] {
        &self.entries
    }

    pub fn iter(&self) -> std::slice::Iter<'_, QaEntry> {
        self.entries.iter()
    }

    /// Append an entry at the end. The only mutation the base supports.
    pub fn push(&mut self, entry: QaEntry) {
        self.entries.push(entry);
    }
}

impl From<Vec<QaEntry>> for KnowledgeBase {
    fn from(entries: Vec<QaEntry>) -> Self {
        Self { entries }
    }
}

impl FromIterator<QaEntry> for KnowledgeBase {
    fn from_iter<I: IntoIterator<Item = QaEntry>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a KnowledgeBase {
    type Item = &'a QaEntry;
    type IntoIter = std::slice::Iter<'a, QaEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
