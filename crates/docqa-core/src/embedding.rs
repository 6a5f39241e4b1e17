//! Embedding backend trait

use async_trait::async_trait;

use crate::Result;

/// Trait for embedding backends (e.g., OpenAI embeddings)
///
/// Implementations turn text into fixed-length vectors. Both calls fail when the
/// backend cannot be reached or rejects the credential; callers do not retry.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Embed a single piece of text, typically a user question
    async fn embed_query(&self, text: &str) -> Result<Vec<f32>>;

    /// Embed a batch of texts, returning vectors in input order
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;

    /// Identifier of the embedding model, recorded alongside persisted vectors
    fn embedding_model(&self) -> &str;
}
