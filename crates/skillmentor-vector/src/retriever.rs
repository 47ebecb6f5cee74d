use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use std::path::Path;
use std::sync::{Arc, PoisonError, RwLock};
use tracing::{debug, error, info, warn};

use skillmentor_core::traits::Embedder;
use skillmentor_core::{Document, Error, Result};

use crate::index::VectorIndex;
use crate::store::DocumentStore;

pub const DEFAULT_BATCH_SIZE: usize = 32;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RetrievedDocument {
    pub document: Document,
    pub distance: f32,
}

#[derive(Debug)]
struct Snapshot {
    index: VectorIndex,
    store: DocumentStore,
}

/// Embeds a corpus, answers nearest-neighbour queries and persists both halves
/// of the index.
///
/// Readers clone the current snapshot and search without holding the lock, so
/// a rebuild or load never exposes a half-written index.
pub struct Retriever {
    embedder: Arc<dyn Embedder>,
    batch_size: usize,
    show_progress: bool,
    snapshot: RwLock<Option<Arc<Snapshot>>>,
}

impl Retriever {
    pub fn new(embedder: Arc<dyn Embedder>) -> Self {
        Self { embedder, batch_size: DEFAULT_BATCH_SIZE, show_progress: false, snapshot: RwLock::new(None) }
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self { self.batch_size = batch_size.max(1); self }

    pub fn with_progress(mut self, show: bool) -> Self { self.show_progress = show; self }

    /// Load a saved index when both files exist; otherwise start uninitialized.
    pub fn open(embedder: Arc<dyn Embedder>, index_path: &Path, documents_path: &Path) -> Self {
        let retriever = Self::new(embedder);
        if !index_path.exists() || !documents_path.exists() {
            info!(index = %index_path.display(), "no saved index; starting uninitialized");
            return retriever;
        }
        if let Err(e) = retriever.load(index_path, documents_path) {
            warn!(error = %e, "failed to load saved index; starting uninitialized");
        }
        retriever
    }

    pub fn is_ready(&self) -> bool { self.current().is_some() }

    pub fn len(&self) -> usize { self.current().map_or(0, |s| s.store.len()) }

    pub fn is_empty(&self) -> bool { self.len() == 0 }

    /// Embed `documents` and replace the current index. Returns the number of
    /// documents indexed. On failure the previous index stays in place.
    pub fn create_index(&self, documents: Vec<Document>) -> Result<usize> {
        let total = documents.len();
        let docs: Vec<Document> = documents
            .into_iter()
            .filter(|d| !d.text.trim().is_empty())
            .enumerate()
            .map(|(position, d)| d.at_position(position))
            .collect();
        if docs.len() < total { debug!(skipped = total - docs.len(), "skipped blank documents"); }

        let vectors = match self.embed_all(&docs) {
            Ok(v) => v,
            Err(e) => {
                error!(error = %e, "index build failed; keeping previous index");
                return Err(e);
            }
        };
        let entries = docs.iter().map(|d| d.id.clone()).zip(vectors).collect();
        let index = VectorIndex::build(entries)?;
        let count = docs.len();
        info!(documents = count, dim = index.dim(), "vector index built");
        self.swap(Snapshot { index, store: DocumentStore::new(docs) });
        Ok(count)
    }

    pub fn create_index_from_texts(&self, texts: &[String]) -> Result<usize> {
        let docs = texts.iter().enumerate().map(|(i, t)| Document::new(i, t, None)).collect();
        self.create_index(docs)
    }

    /// Texts of the `k` nearest documents.
    pub fn retrieve(&self, query: &str, k: usize) -> Result<Vec<String>> {
        Ok(self.retrieve_documents(query, k)?.into_iter().map(|r| r.document.text).collect())
    }

    /// The `k` nearest documents with their distances, closest first.
    ///
    /// Returns an empty list, never an error, when no index is loaded or the
    /// query cannot be embedded.
    pub fn retrieve_documents(&self, query: &str, k: usize) -> Result<Vec<RetrievedDocument>> {
        if k == 0 { return Err(Error::InvalidArgument("k must be at least 1".into())); }
        let Some(snapshot) = self.current() else {
            warn!("vector index not initialized; returning no documents");
            return Ok(Vec::new());
        };
        if snapshot.index.is_empty() { return Ok(Vec::new()); }

        let query_vec = match self.embedder.embed_batch(&[query.to_string()]) {
            Ok(mut v) if v.len() == 1 => v.remove(0),
            Ok(v) => {
                error!(vectors = v.len(), "embedder returned an unexpected number of vectors for the query");
                return Ok(Vec::new());
            }
            Err(e) => {
                error!(error = %e, "query embedding failed");
                return Ok(Vec::new());
            }
        };
        let neighbors = match snapshot.index.search(&query_vec, k) {
            Ok(n) => n,
            Err(e) => {
                error!(error = %e, "vector search failed");
                return Ok(Vec::new());
            }
        };
        debug!(k, hits = neighbors.len(), "retrieved documents");
        Ok(neighbors
            .into_iter()
            .filter_map(|n| snapshot.store.get(n.position).map(|doc| RetrievedDocument { document: doc.clone(), distance: n.distance }))
            .collect())
    }

    /// Write the vector index and its documents.
    pub fn save(&self, index_path: &Path, documents_path: &Path) -> Result<()> {
        let Some(snapshot) = self.current() else {
            return Err(Error::Storage("no index has been built".into()));
        };
        snapshot.store.save(documents_path)?;
        snapshot.index.save(index_path)?;
        info!(index = %index_path.display(), documents = %documents_path.display(), count = snapshot.store.len(), "index saved");
        Ok(())
    }

    /// Read both files, check that they describe the same documents in the
    /// same order, then replace the current index.
    pub fn load(&self, index_path: &Path, documents_path: &Path) -> Result<usize> {
        let index = VectorIndex::load(index_path)?;
        let store = DocumentStore::load(documents_path)?;
        if index.len() != store.len() {
            return Err(Error::Storage(format!(
                "index holds {} vectors but {} has {} documents",
                index.len(),
                documents_path.display(),
                store.len()
            )));
        }
        if let Some(position) = index.ids().iter().zip(store.ids()).position(|(a, b)| a != b) {
            return Err(Error::Storage(format!("index and documents diverge at position {}", position)));
        }
        if !index.is_empty() && index.dim() != self.embedder.dim() {
            return Err(Error::Storage(format!(
                "index dimension {} does not match embedder dimension {}",
                index.dim(),
                self.embedder.dim()
            )));
        }
        let count = store.len();
        info!(index = %index_path.display(), documents = count, dim = index.dim(), "index loaded");
        self.swap(Snapshot { index, store });
        Ok(count)
    }

    fn embed_all(&self, docs: &[Document]) -> Result<Vec<Vec<f32>>> {
        let pb = if self.show_progress { ProgressBar::new(docs.len() as u64) } else { ProgressBar::hidden() };
        if let Ok(style) = ProgressStyle::default_bar().template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} documents ({percent}%)") {
            pb.set_style(style.progress_chars("#>-"));
        }
        let mut out = Vec::with_capacity(docs.len());
        for chunk in docs.chunks(self.batch_size) {
            let texts: Vec<String> = chunk.iter().map(|d| d.text.clone()).collect();
            let vectors = self.embedder.embed_batch(&texts).map_err(|e| Error::Embedding(e.to_string()))?;
            if vectors.len() != texts.len() {
                return Err(Error::Embedding(format!("embedder returned {} vectors for {} texts", vectors.len(), texts.len())));
            }
            out.extend(vectors);
            pb.inc(chunk.len() as u64);
        }
        pb.finish_and_clear();
        Ok(out)
    }

    fn current(&self) -> Option<Arc<Snapshot>> {
        self.snapshot.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    fn swap(&self, snapshot: Snapshot) {
        *self.snapshot.write().unwrap_or_else(PoisonError::into_inner) = Some(Arc::new(snapshot));
    }
}
