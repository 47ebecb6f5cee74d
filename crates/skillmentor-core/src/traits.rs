use async_trait::async_trait;

use crate::error::Result;

/// Maps text to fixed-length vectors. Implementations must be deterministic
/// for identical input within a process.
pub trait Embedder: Send + Sync {
    fn dim(&self) -> usize;
    fn max_len(&self) -> usize;
    fn embed_batch(&self, texts: &[String]) -> anyhow::Result<Vec<Vec<f32>>>;
}

/// Text generation service used to phrase advice from retrieved context.
///
/// Any error, including malformed output, makes the backend count as
/// unavailable for that call only.
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    fn name(&self) -> &str;
    async fn complete(&self, prompt: &str) -> Result<String>;
}
