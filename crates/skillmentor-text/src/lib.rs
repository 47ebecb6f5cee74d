//! skillmentor-text
//!
//! Query text handling: tantivy-based keyword analysis and the normalized
//! query key used to recognise repeated questions.

pub mod analyzer;
pub mod query;

pub use analyzer::{KeywordAnalyzer, STOP_WORDS};
pub use query::{normalize_query, QueryKey};
