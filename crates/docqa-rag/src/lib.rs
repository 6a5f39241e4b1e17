//! Retrieval-augmented question answering for DocQA
//!
//! This crate reads a directory of documents, chunks and embeds them into a
//! persisted vector store, and answers questions against that store.

mod document_indexer;
mod engine;
mod index;
mod reader;
mod vector_store;

#[cfg(test)]
mod tests;

pub use document_indexer::{DocumentIndexer, IndexingConfig, IndexingResult};
pub use engine::{DEFAULT_TOP_K, RetrieverQueryEngine, build_context, build_prompt};
pub use index::{Index, IndexHandle, IndexProvider, IndexSettings};
pub use reader::DirectoryReader;
pub use vector_store::{LocalVectorStore, StoreManifest, cosine_similarity};

// Re-export core types for convenience
pub use docqa_core::{
    Document, EMPTY_QUESTION_REPLY, EmbeddingProvider, Error, LLMProvider, QueryEngine,
    QueryResponse, Result, SearchConfig, SearchResult, VectorDocument, VectorStore,
};
