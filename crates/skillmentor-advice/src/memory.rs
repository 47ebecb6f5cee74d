use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, PoisonError};

use skillmentor_core::Category;
use skillmentor_text::QueryKey;

type Slot = Arc<Mutex<HashSet<usize>>>;

/// Advice indices already returned, per `(query key, category)`.
///
/// The outer lock only guards slot lookup; each slot has its own mutex so
/// unrelated queries never wait on each other.
#[derive(Debug, Default)]
pub struct AdviceMemory {
    slots: Mutex<HashMap<(QueryKey, Category), Slot>>,
}

impl AdviceMemory {
    pub fn new() -> Self { Self::default() }

    /// Run `f` on the used-set for `(key, category)` while holding its lock.
    pub fn with_used<R>(&self, key: QueryKey, category: Category, f: impl FnOnce(&mut HashSet<usize>) -> R) -> R {
        let slot = self.slot(key, category);
        let mut used = slot.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut used)
    }

    /// Sorted indices returned so far for `(key, category)`.
    pub fn used(&self, key: QueryKey, category: Category) -> Vec<usize> {
        let mut out: Vec<usize> = self.with_used(key, category, |used| used.iter().copied().collect());
        out.sort_unstable();
        out
    }

    /// Number of `(key, category)` pairs seen.
    pub fn len(&self) -> usize { self.slots.lock().unwrap_or_else(PoisonError::into_inner).len() }

    pub fn is_empty(&self) -> bool { self.len() == 0 }

    pub fn clear(&self) { self.slots.lock().unwrap_or_else(PoisonError::into_inner).clear(); }

    fn slot(&self, key: QueryKey, category: Category) -> Slot {
        let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(slots.entry((key, category)).or_default())
    }
}
