//! Core traits and types for DocQA
//!
//! This crate defines the fundamental traits and types shared by the DocQA crates.
//! It provides capability-facing interfaces for chat models, embedding backends,
//! vector stores and query engines, so every seam can be swapped for a fake in tests.

pub mod document;
pub mod embedding;
pub mod error;
pub mod llm;
pub mod query;
pub mod vector_store;

pub use document::Document;
pub use embedding::EmbeddingProvider;
pub use error::{Error, Result};
pub use llm::{GenerationConfig, GenerationResult, LLMProvider};
pub use query::{QueryEngine, QueryResponse, EMPTY_QUESTION_REPLY};
pub use vector_store::{SearchConfig, SearchResult, VectorDocument, VectorStore};
