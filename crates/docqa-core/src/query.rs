//! Query engine trait and types

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::{Result, VectorDocument};

/// Reply returned for blank questions, without contacting any backend
pub const EMPTY_QUESTION_REPLY: &str = "Please enter a valid question.";

/// Answer plus the chunks it was synthesized from
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryResponse {
    pub answer: String,
    pub source_nodes: Vec<VectorDocument>,
}

impl std::fmt::Display for QueryResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.answer)
    }
}

/// Trait for retrieval-augmented query engines
#[async_trait]
pub trait QueryEngine: Send + Sync {
    /// Retrieve similar chunks and synthesize an answer
    async fn query(&self, question: &str) -> Result<QueryResponse>;

    /// Answer a free-text question as plain text
    ///
    /// Blank input short-circuits to [`EMPTY_QUESTION_REPLY`].
    async fn answer_query(&self, question: &str) -> Result<String> {
        if question.trim().is_empty() {
            return Ok(EMPTY_QUESTION_REPLY.to_string());
        }
        let response = self.query(question).await?;
        Ok(response.to_string())
    }
}
