use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, PoisonError};
use tracing::debug;

use skillmentor_core::{Category, Result};
use skillmentor_text::QueryKey;

use crate::catalog::AdviceCatalog;
use crate::memory::AdviceMemory;

/// One entry of a category's advice pool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Advice {
    pub category: Category,
    pub index: usize,
    pub text: String,
    /// Set when the pool had been exhausted for this query and the rotation
    /// started over.
    pub rotation_reset: bool,
}

/// Picks advice for a category so that a repeated query sees every entry of
/// the pool once before any entry repeats.
pub struct AdviceSelector {
    catalog: Arc<AdviceCatalog>,
    memory: Arc<AdviceMemory>,
    rng: Mutex<StdRng>,
}

impl AdviceSelector {
    pub fn new(catalog: Arc<AdviceCatalog>, memory: Arc<AdviceMemory>, rng: StdRng) -> Result<Self> {
        catalog.validate()?;
        Ok(Self { catalog, memory, rng: Mutex::new(rng) })
    }

    pub fn with_seed(catalog: Arc<AdviceCatalog>, memory: Arc<AdviceMemory>, seed: u64) -> Result<Self> {
        Self::new(catalog, memory, StdRng::seed_from_u64(seed))
    }

    pub fn from_entropy(catalog: Arc<AdviceCatalog>, memory: Arc<AdviceMemory>) -> Result<Self> {
        Self::new(catalog, memory, StdRng::from_entropy())
    }

    pub fn catalog(&self) -> &Arc<AdviceCatalog> { &self.catalog }

    pub fn memory(&self) -> &Arc<AdviceMemory> { &self.memory }

    pub fn select(&self, category: Category, key: QueryKey) -> Advice {
        let pool = self.catalog.pool(category);
        self.memory.with_used(key, category, |used| {
            used.retain(|i| *i < pool.len());
            let rotation_reset = used.len() >= pool.len();
            if rotation_reset { used.clear(); }
            let available: Vec<usize> = (0..pool.len()).filter(|i| !used.contains(i)).collect();
            let index = {
                let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
                available.choose(&mut *rng).copied().unwrap_or(0)
            };
            used.insert(index);
            debug!(%category, %key, index, remaining = available.len() - 1, rotation_reset, "selected advice");
            Advice { category, index, text: pool[index].clone(), rotation_reset }
        })
    }
}
