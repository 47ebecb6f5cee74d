//! Exact nearest-neighbour retrieval over a small reference corpus.
//!
//! [`VectorIndex`] holds the vectors and persists them in a checksummed
//! binary file, [`DocumentStore`] holds the texts in corpus format, and
//! [`Retriever`] ties both to an embedder behind an atomically swapped
//! snapshot.

pub mod index;
pub mod retriever;
pub mod store;

pub use index::{Neighbor, VectorIndex};
pub use retriever::{RetrievedDocument, Retriever};
pub use store::DocumentStore;
