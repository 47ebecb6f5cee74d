//! Text embedders for the retriever: a candle sentence encoder loaded from
//! local files, and a hashing embedder for tests and offline runs.

use anyhow::{Result, anyhow};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

use skillmentor_core::config::{expand_path, EmbeddingSettings};
use skillmentor_core::traits::Embedder;

pub mod hashing;
pub mod model;
pub mod pool;
pub mod tokenize;

pub use hashing::HashingEmbedder;
pub use model::TransformerEmbedder;
pub use pool::masked_mean_l2;

/// Pick the embedder described by `settings`.
///
/// `APP_USE_FAKE_EMBEDDINGS=1` forces the hashing embedder regardless of
/// configuration.
pub fn default_embedder(settings: &EmbeddingSettings) -> Result<Arc<dyn Embedder>> {
    let forced = std::env::var("APP_USE_FAKE_EMBEDDINGS").ok().map(|v| v == "1" || v.eq_ignore_ascii_case("true")).unwrap_or(false);
    if forced || settings.use_fake {
        info!(dim = settings.dim, "using hashing embedder");
        return Ok(Arc::new(HashingEmbedder::new(settings.dim)));
    }
    let model_dir = resolve_model_dir(settings.model_dir.as_deref())?;
    Ok(Arc::new(TransformerEmbedder::load(&model_dir, settings.max_len)?))
}

fn resolve_model_dir(configured: Option<&str>) -> Result<PathBuf> {
    if let Some(dir) = configured { let p = expand_path(dir); if p.exists() { return Ok(p); } }
    for var in ["APP_MODEL_DIR", "MODEL_DIR"] {
        if let Ok(dir) = std::env::var(var) { let p = PathBuf::from(&dir); if p.exists() { info!(var, dir = %p.display(), "model dir from env"); return Ok(p); } }
    }
    let local = Path::new("models/encoder"); if local.exists() { return Ok(local.to_path_buf()); }
    Err(anyhow!("Could not locate an embedding model directory (set embedding.model_dir or APP_MODEL_DIR)"))
}
