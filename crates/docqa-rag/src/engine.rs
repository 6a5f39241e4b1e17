//! Retrieval-augmented query engine

use async_trait::async_trait;
use std::sync::Arc;

use docqa_core::{LLMProvider, QueryEngine, QueryResponse, Result, VectorDocument};

use crate::index::Index;

/// Number of similar chunks handed to the model
pub const DEFAULT_TOP_K: usize = 3;

/// Render retrieved chunks as the context block of the prompt
pub fn build_context(documents: &[VectorDocument]) -> String {
    documents
        .iter()
        .map(|doc| match doc.source() {
            Some(source) => format!("file_path: {}\n\n{}", source, doc.content),
            None => doc.content.clone(),
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Fill the question-answering template
pub fn build_prompt(context: &str, question: &str) -> String {
    format!(
        "Context information is below.\n\
         ---------------------\n\
         {context}\n\
         ---------------------\n\
         Given the context information and not prior knowledge, answer the query.\n\
         Query: {question}\n\
         Answer: "
    )
}

/// Answers questions by retrieving similar chunks from an [`Index`] and asking an LLM
pub struct RetrieverQueryEngine {
    index: Index,
    llm: Arc<dyn LLMProvider>,
    top_k: usize,
}

impl RetrieverQueryEngine {
    pub fn new(index: Index, llm: Arc<dyn LLMProvider>) -> Self {
        Self {
            index,
            llm,
            top_k: DEFAULT_TOP_K,
        }
    }

    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    pub fn top_k(&self) -> usize {
        self.top_k
    }

    pub fn index(&self) -> &Index {
        &self.index
    }
}

#[async_trait]
impl QueryEngine for RetrieverQueryEngine {
    async fn query(&self, question: &str) -> Result<QueryResponse> {
        let source_nodes = self.index.retrieve(question, self.top_k).await?;
        tracing::debug!(retrieved = source_nodes.len(), "retrieved chunks");

        let prompt = build_prompt(&build_context(&source_nodes), question);
        let result = self.llm.generate(&prompt).await?;

        Ok(QueryResponse {
            answer: result.text,
            source_nodes,
        })
    }
}
