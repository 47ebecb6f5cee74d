use std::path::Path;

use skillmentor_core::corpus::{write_corpus, CorpusLoader};
use skillmentor_core::{Document, DocumentId, Result};

/// Documents in index order; position `i` pairs with vector `i`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DocumentStore { docs: Vec<Document> }

impl DocumentStore {
    pub fn new(docs: Vec<Document>) -> Self { Self { docs } }

    pub fn len(&self) -> usize { self.docs.len() }
    pub fn is_empty(&self) -> bool { self.docs.is_empty() }
    pub fn get(&self, position: usize) -> Option<&Document> { self.docs.get(position) }
    pub fn ids(&self) -> impl Iterator<Item = &DocumentId> { self.docs.iter().map(|d| &d.id) }

    /// Persist in corpus format.
    pub fn save(&self, path: &Path) -> Result<()> { write_corpus(path, &self.docs) }

    /// Ids are recomputed from position and text while parsing.
    pub fn load(path: &Path) -> Result<Self> { Ok(Self::new(CorpusLoader::new().load_file(path)?)) }
}
