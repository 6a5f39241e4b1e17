//! Chunking and embedding of documents into a vector store

use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;

use docqa_core::{Document, EmbeddingProvider, Error, Result, VectorDocument, VectorStore};

/// Configuration for document indexing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexingConfig {
    /// Maximum chunk length in characters
    pub chunk_size: usize,
    /// Characters carried over from the end of the previous chunk
    pub chunk_overlap: usize,
    /// Texts per embedding request
    pub batch_size: usize,
}

impl Default for IndexingConfig {
    fn default() -> Self {
        Self {
            chunk_size: 1024,
            chunk_overlap: 20,
            batch_size: 100,
        }
    }
}

impl IndexingConfig {
    pub fn validate(&self) -> Result<()> {
        if self.chunk_size == 0 || self.batch_size == 0 {
            return Err(Error::InvalidInput(
                "chunk_size and batch_size must be greater than zero".to_string(),
            ));
        }
        if self.chunk_overlap >= self.chunk_size {
            return Err(Error::InvalidInput(format!(
                "chunk_overlap ({}) must be smaller than chunk_size ({})",
                self.chunk_overlap, self.chunk_size
            )));
        }
        Ok(())
    }
}

/// Result of an indexing run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexingResult {
    pub documents_indexed: usize,
    pub chunks_indexed: usize,
    pub embedding_requests: usize,
}

/// Splits documents into chunks and embeds them through an [`EmbeddingProvider`]
pub struct DocumentIndexer {
    embedder: Arc<dyn EmbeddingProvider>,
    config: IndexingConfig,
}

impl DocumentIndexer {
    /// Create a new indexer with default chunking
    pub fn new(embedder: Arc<dyn EmbeddingProvider>) -> Self {
        Self {
            embedder,
            config: IndexingConfig::default(),
        }
    }

    /// Create with custom configuration
    pub fn with_config(embedder: Arc<dyn EmbeddingProvider>, config: IndexingConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { embedder, config })
    }

    pub fn config(&self) -> &IndexingConfig {
        &self.config
    }

    /// Chunk, embed and add every document to the store
    ///
    /// The first embedding failure aborts the run; nothing is added to the
    /// store in that case.
    pub async fn index_documents<V>(&self, store: &mut V, documents: &[Document]) -> Result<IndexingResult>
    where
        V: VectorStore + ?Sized,
    {
        let mut pending = Vec::new();
        for document in documents {
            pending.extend(self.chunk_document(document));
        }

        let mut indexed = Vec::with_capacity(pending.len());
        let mut embedding_requests = 0;

        for batch in pending.chunks(self.config.batch_size) {
            let texts: Vec<String> = batch.iter().map(|c| c.content.clone()).collect();
            let vectors = self.embedder.embed_batch(&texts).await?;
            embedding_requests += 1;

            if vectors.len() != batch.len() {
                return Err(Error::Embedding(format!(
                    "Expected {} embeddings, got {}",
                    batch.len(),
                    vectors.len()
                )));
            }

            for (chunk, embedding) in batch.iter().zip(vectors) {
                let mut chunk = chunk.clone();
                chunk.embedding = embedding;
                indexed.push(chunk);
            }

            tracing::debug!(embedded = indexed.len(), total = pending.len(), "embedded batch");
        }

        let chunks_indexed = indexed.len();
        store.add(indexed).await?;

        Ok(IndexingResult {
            documents_indexed: documents.len(),
            chunks_indexed,
            embedding_requests,
        })
    }

    /// Split one document into chunk records without embeddings
    pub fn chunk_document(&self, document: &Document) -> Vec<VectorDocument> {
        let chunks = self.chunk_text(&document.text);
        let total = chunks.len();

        chunks
            .into_iter()
            .enumerate()
            .map(|(i, content)| {
                let mut metadata = match &document.metadata {
                    serde_json::Value::Object(map) => serde_json::Value::Object(map.clone()),
                    _ => json!({}),
                };
                metadata["file_path"] = json!(document.source);
                metadata["document_id"] = json!(document.id);
                metadata["chunk_index"] = json!(i);
                metadata["total_chunks"] = json!(total);

                VectorDocument {
                    id: format!("{}-{}", document.id, i),
                    content,
                    embedding: Vec::new(),
                    metadata,
                    score: None,
                }
            })
            .collect()
    }

    /// Split text into chunks of at most `chunk_size` characters
    pub fn chunk_text(&self, text: &str) -> Vec<String> {
        let text = text.trim();
        if text.is_empty() {
            return Vec::new();
        }
        if char_len(text) <= self.config.chunk_size {
            return vec![text.to_string()];
        }

        let mut pieces = Vec::new();
        for paragraph in text.split("\n\n") {
            let paragraph = paragraph.trim();
            if paragraph.is_empty() {
                continue;
            }
            for sentence in split_into_sentences(paragraph) {
                if char_len(&sentence) > self.config.chunk_size {
                    pieces.extend(hard_split(&sentence, self.config.chunk_size));
                } else {
                    pieces.push(sentence);
                }
            }
        }

        let mut chunks: Vec<String> = Vec::new();
        let mut current = String::new();

        for piece in pieces {
            if current.is_empty() {
                current = piece;
                continue;
            }

            if char_len(&current) + 1 + char_len(&piece) <= self.config.chunk_size {
                current.push(' ');
                current.push_str(&piece);
                continue;
            }

            let overlap = overlap_tail(&current, self.config.chunk_overlap);
            chunks.push(std::mem::take(&mut current));

            let overlap = overlap.trim();
            if !overlap.is_empty() && char_len(overlap) + 1 + char_len(&piece) <= self.config.chunk_size {
                current.push_str(overlap);
                current.push(' ');
            }
            current.push_str(&piece);
        }

        if !current.trim().is_empty() {
            chunks.push(current);
        }

        chunks
    }
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

/// Last `n` characters of `s`, starting on a word boundary
fn overlap_tail(s: &str, n: usize) -> String {
    let len = char_len(s);
    if n == 0 {
        return String::new();
    }
    if n >= len {
        return s.to_string();
    }

    let start = len - n;
    let tail: String = s.chars().skip(start).collect();
    let cut_mid_word = s
        .chars()
        .nth(start - 1)
        .map(|c| !c.is_whitespace())
        .unwrap_or(false);

    if !cut_mid_word {
        return tail;
    }
    match tail.find(char::is_whitespace) {
        Some(pos) => tail[pos..].trim_start().to_string(),
        None => String::new(),
    }
}

fn hard_split(s: &str, size: usize) -> Vec<String> {
    let chars: Vec<char> = s.chars().collect();
    chars.chunks(size).map(|c| c.iter().collect()).collect()
}

/// Sentence splitting that keeps abbreviations and decimals together
fn split_into_sentences(text: &str) -> Vec<String> {
    let mut sentences = Vec::new();
    let mut current_sentence = String::new();
    let chars: Vec<char> = text.chars().collect();

    for (i, &ch) in chars.iter().enumerate() {
        current_sentence.push(ch);

        if ch == '.' || ch == '!' || ch == '?' {
            let is_sentence_end = match chars.get(i + 1) {
                Some(next) => next.is_whitespace(),
                None => true,
            };

            if is_sentence_end && current_sentence.trim().len() > 10 {
                sentences.push(current_sentence.trim().to_string());
                current_sentence.clear();
            }
        }
    }

    if !current_sentence.trim().is_empty() {
        sentences.push(current_sentence.trim().to_string());
    }

    sentences
}
