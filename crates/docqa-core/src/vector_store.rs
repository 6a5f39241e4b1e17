//! Vector store trait and types

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::Result;

/// A chunk stored in the vector store together with its embedding
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VectorDocument {
    pub id: String,
    pub content: String,
    pub embedding: Vec<f32>,
    pub metadata: serde_json::Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f32>,
}

impl VectorDocument {
    /// Source path recorded in metadata
    pub fn source(&self) -> Option<&str> {
        self.metadata.get("file_path").and_then(|v| v.as_str())
    }
}

/// Search result from vector store
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResult {
    pub documents: Vec<VectorDocument>,
    pub total: usize,
}

/// Configuration for vector search
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    pub top_k: usize,
    pub score_threshold: Option<f32>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            top_k: 3,
            score_threshold: None,
        }
    }
}

/// Trait for vector stores
///
/// A store is filled once while an index is built, optionally persisted, and
/// only read afterwards. Implementations must tolerate concurrent readers.
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Add documents, replacing any record with the same id
    async fn add(&mut self, documents: Vec<VectorDocument>) -> Result<Vec<String>>;

    /// Search using a query embedding
    async fn search_by_vector(&self, vector: &[f32], config: &SearchConfig) -> Result<SearchResult>;

    /// Get the total number of documents
    async fn count(&self) -> Result<usize>;

    /// Write the store to a directory
    async fn persist(&self, dir: &Path) -> Result<()>;
}
