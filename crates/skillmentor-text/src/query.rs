use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::Hasher;
use twox_hash::XxHash64;

/// Lower-case, trim and collapse internal whitespace.
pub fn normalize_query(query: &str) -> String {
    query.split_whitespace().collect::<Vec<_>>().join(" ").to_lowercase()
}

/// Stable identity of a query after normalization; repeated questions that
/// differ only in case or spacing share a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct QueryKey(u64);

impl QueryKey {
    pub fn from_query(query: &str) -> Self {
        let mut hasher = XxHash64::with_seed(0);
        hasher.write(normalize_query(query).as_bytes());
        Self(hasher.finish())
    }

    /// Deterministic index into a collection of `len` items.
    pub fn pick(self, len: usize) -> usize {
        debug_assert!(len > 0, "pick from empty collection");
        (self.0 % len as u64) as usize
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{:016x}", self.0) }
}
