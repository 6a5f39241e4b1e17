//! Index provider: load a persisted index or build one from documents

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;

use docqa_core::{
    EmbeddingProvider, LLMProvider, Result, SearchConfig, VectorDocument, VectorStore,
};

use crate::document_indexer::{DocumentIndexer, IndexingConfig, IndexingResult};
use crate::engine::RetrieverQueryEngine;
use crate::reader::DirectoryReader;
use crate::vector_store::LocalVectorStore;

/// Where documents come from and where the index lives
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexSettings {
    pub documents_dir: PathBuf,
    pub persist_dir: PathBuf,
    pub collection: String,
    pub recursive: bool,
    pub required_exts: Vec<String>,
    pub indexing: IndexingConfig,
}

impl Default for IndexSettings {
    fn default() -> Self {
        Self {
            documents_dir: PathBuf::from("documents"),
            persist_dir: PathBuf::from("chroma_db"),
            collection: "llama_docs".to_string(),
            recursive: false,
            required_exts: Vec::new(),
            indexing: IndexingConfig::default(),
        }
    }
}

/// A read-only vector index plus the embedder used to query it
#[derive(Clone)]
pub struct Index {
    store: Arc<LocalVectorStore>,
    embedder: Arc<dyn EmbeddingProvider>,
}

impl Index {
    pub fn new(store: LocalVectorStore, embedder: Arc<dyn EmbeddingProvider>) -> Self {
        Self {
            store: Arc::new(store),
            embedder,
        }
    }

    pub fn store(&self) -> &LocalVectorStore {
        &self.store
    }

    pub fn len(&self) -> usize {
        self.store.documents().len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.documents().is_empty()
    }

    /// Embed the question and return the `top_k` most similar chunks
    pub async fn retrieve(&self, question: &str, top_k: usize) -> Result<Vec<VectorDocument>> {
        let query_embedding = self.embedder.embed_query(question).await?;
        let config = SearchConfig {
            top_k,
            score_threshold: None,
        };
        let result = self.store.search_by_vector(&query_embedding, &config).await?;
        Ok(result.documents)
    }

    /// Wrap this index in a query engine that synthesizes answers with `llm`
    pub fn as_query_engine(&self, llm: Arc<dyn LLMProvider>, top_k: usize) -> RetrieverQueryEngine {
        RetrieverQueryEngine::new(self.clone(), llm).with_top_k(top_k)
    }
}

impl std::fmt::Debug for Index {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Index")
            .field("collection", &self.store.collection())
            .field("chunks", &self.len())
            .field("embedding_model", &self.embedder.embedding_model())
            .finish()
    }
}

/// Outcome of [`IndexProvider::get_index`]
#[derive(Debug)]
pub enum IndexHandle {
    /// Opened from the persist directory; no documents were read
    Loaded(Index),
    /// Built from the documents directory and persisted
    Built(Index, IndexingResult),
}

impl IndexHandle {
    pub fn index(&self) -> &Index {
        match self {
            IndexHandle::Loaded(index) | IndexHandle::Built(index, _) => index,
        }
    }

    pub fn into_index(self) -> Index {
        match self {
            IndexHandle::Loaded(index) | IndexHandle::Built(index, _) => index,
        }
    }

    pub fn was_built(&self) -> bool {
        matches!(self, IndexHandle::Built(..))
    }
}

/// Decides between loading the persisted index and building a new one
pub struct IndexProvider {
    settings: IndexSettings,
    embedder: Arc<dyn EmbeddingProvider>,
}

impl IndexProvider {
    pub fn new(settings: IndexSettings, embedder: Arc<dyn EmbeddingProvider>) -> Self {
        Self { settings, embedder }
    }

    pub fn settings(&self) -> &IndexSettings {
        &self.settings
    }

    /// Whether a persisted index directory is present
    pub fn is_persisted(&self) -> bool {
        self.settings.persist_dir.exists()
    }

    /// Load the persisted index if its directory exists, otherwise build and persist one
    ///
    /// A persisted index is never rebuilt here, even when the documents have
    /// changed since it was written.
    pub async fn get_index(&self) -> Result<IndexHandle> {
        if self.is_persisted() {
            tracing::info!(dir = %self.settings.persist_dir.display(), "loading index from storage");
            let index = self.load()?;
            return Ok(IndexHandle::Loaded(index));
        }

        tracing::info!(dir = %self.settings.documents_dir.display(), "creating new index from documents");
        let (index, result) = self.build().await?;
        Ok(IndexHandle::Built(index, result))
    }

    /// Build from the documents and replace any persisted index
    ///
    /// The existing index stays on disk until the new one is fully written,
    /// so a failed rebuild leaves it loadable.
    pub async fn rebuild(&self) -> Result<IndexHandle> {
        tracing::info!(dir = %self.settings.documents_dir.display(), "rebuilding index from documents");
        let (index, result) = self.build().await?;
        Ok(IndexHandle::Built(index, result))
    }

    fn load(&self) -> Result<Index> {
        let store = LocalVectorStore::load(&self.settings.persist_dir, &self.settings.collection)?;

        let configured = self.embedder.embedding_model();
        if let Some(stored) = store.embedding_model() {
            if stored != configured {
                tracing::warn!(
                    stored,
                    configured,
                    "index was built with a different embedding model; similarity scores may be meaningless"
                );
            }
        }

        tracing::info!(
            collection = %store.collection(),
            count = store.documents().len(),
            "index loaded"
        );
        Ok(Index::new(store, self.embedder.clone()))
    }

    async fn build(&self) -> Result<(Index, IndexingResult)> {
        let reader = DirectoryReader::new(&self.settings.documents_dir)
            .recursive(self.settings.recursive)
            .required_exts(&self.settings.required_exts);
        let documents = reader.load_data()?;

        let indexer = DocumentIndexer::with_config(self.embedder.clone(), self.settings.indexing.clone())?;
        let mut store = LocalVectorStore::new(self.settings.collection.clone())
            .with_embedding_model(self.embedder.embedding_model());

        let result = indexer.index_documents(&mut store, &documents).await?;
        store.persist(&self.settings.persist_dir).await?;

        tracing::info!(
            documents = result.documents_indexed,
            chunks = result.chunks_indexed,
            "index built"
        );
        Ok((Index::new(store, self.embedder.clone()), result))
    }
}
