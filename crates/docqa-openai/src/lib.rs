//! OpenAI integration for DocQA
//!
//! This crate provides the OpenAI implementation of the LLMProvider and
//! EmbeddingProvider traits. Any endpoint speaking the same wire format works.

mod client;
mod config;


pub use client::OpenAIClient;
pub use config::OpenAIConfig;

// Re-export core types for convenience
pub use docqa_core::{
    EmbeddingProvider, Error, GenerationConfig, GenerationResult, LLMProvider, Result,
};
