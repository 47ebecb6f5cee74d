//! Domain types used by the retrieval and advice crates.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// Opaque document identity, derived from the document's position in the
/// index and a digest of its text.
///
/// Recomputing the id of a reloaded corpus and comparing it with the ids stored
/// in a saved index is how positional alignment is verified.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DocumentId(String);

impl DocumentId {
    pub fn derive(position: usize, text: &str) -> Self {
        let digest = blake3::hash(text.as_bytes()).to_hex();
        Self(format!("{}:{}", position, &digest[..16]))
    }

    /// Wrap an id read back from storage without recomputing it.
    pub fn from_raw(raw: impl Into<String>) -> Self { Self(raw.into()) }

    pub fn as_str(&self) -> &str { &self.0 }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(&self.0) }
}

/// A reference passage.
///
/// - `id`: assigned at index-build time from position + text
/// - `text`: the passage, normalized so it survives a corpus-file round trip
/// - `category`: optional topic label carried from the corpus file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub id: DocumentId,
    pub text: String,
    pub category: Option<String>,
}

impl Document {
    pub fn new(position: usize, text: &str, category: Option<String>) -> Self {
        let text = crate::corpus::normalize_text(text);
        Self { id: DocumentId::derive(position, &text), text, category }
    }

    /// Same text and category, re-identified for a new position.
    pub fn at_position(self, position: usize) -> Self { Self::new(position, &self.text, self.category) }
}

/// Fixed set of advice topics a query can be routed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Pricing,
    Marketing,
    Sustainability,
    Production,
    General,
}

impl Category {
    /// Enumeration order; also the tie-break order when scores are equal.
    pub const ALL: [Category; 5] = [
        Category::Pricing,
        Category::Marketing,
        Category::Sustainability,
        Category::Production,
        Category::General,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pricing => "pricing",
            Self::Marketing => "marketing",
            Self::Sustainability => "sustainability",
            Self::Production => "production",
            Self::General => "general",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.pad(self.as_str()) }
}

impl FromStr for Category {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| Error::InvalidArgument(format!("unknown category '{}'", s)))
    }
}
