//! Local vector store persisted as JSON files

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use docqa_core::{Error, Result, SearchConfig, SearchResult, VectorDocument, VectorStore};

const FORMAT_VERSION: u32 = 1;
const MANIFEST_FILE: &str = "manifest.json";
const COLLECTIONS_DIR: &str = "collections";

/// Summary written next to the collection data
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreManifest {
    pub format_version: u32,
    pub collection: String,
    pub embedding_model: Option<String>,
    pub dimension: usize,
    pub count: usize,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize)]
struct CollectionData {
    documents: Vec<VectorDocument>,
}

/// In-memory vector store with exact cosine search and directory persistence
///
/// Layout on disk:
///
/// ```text
/// <dir>/manifest.json
/// <dir>/collections/<collection>.json
/// ```
#[derive(Debug, Clone)]
pub struct LocalVectorStore {
    collection: String,
    embedding_model: Option<String>,
    documents: Vec<VectorDocument>,
}

impl LocalVectorStore {
    /// Create an empty store for a named collection
    pub fn new(collection: impl Into<String>) -> Self {
        Self {
            collection: collection.into(),
            embedding_model: None,
            documents: Vec::new(),
        }
    }

    /// Record which embedding model produced the vectors
    pub fn with_embedding_model(mut self, model: impl Into<String>) -> Self {
        self.embedding_model = Some(model.into());
        self
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    pub fn embedding_model(&self) -> Option<&str> {
        self.embedding_model.as_deref()
    }

    pub fn documents(&self) -> &[VectorDocument] {
        &self.documents
    }

    /// Dimension of stored embeddings, 0 when empty
    pub fn dimension(&self) -> usize {
        self.documents.first().map(|d| d.embedding.len()).unwrap_or(0)
    }

    pub fn manifest_path(dir: &Path) -> PathBuf {
        dir.join(MANIFEST_FILE)
    }

    pub fn collection_path(dir: &Path, collection: &str) -> PathBuf {
        dir.join(COLLECTIONS_DIR).join(format!("{}.json", collection))
    }

    /// Open a persisted collection
    ///
    /// Fails with [`Error::Storage`] when the manifest or the collection is
    /// missing, unreadable, or inconsistent.
    pub fn load(dir: &Path, collection: &str) -> Result<Self> {
        let manifest_path = Self::manifest_path(dir);
        let manifest: StoreManifest = read_json(&manifest_path)?;

        if manifest.format_version != FORMAT_VERSION {
            return Err(Error::Storage(format!(
                "unsupported index format version {} in {}",
                manifest.format_version,
                manifest_path.display()
            )));
        }

        let collection_path = Self::collection_path(dir, collection);
        if !collection_path.is_file() {
            return Err(Error::Storage(format!(
                "collection '{}' not found in {}",
                collection,
                dir.display()
            )));
        }
        let data: CollectionData = read_json(&collection_path)?;

        if manifest.collection == collection && manifest.count != data.documents.len() {
            return Err(Error::Storage(format!(
                "manifest lists {} records but collection '{}' holds {}",
                manifest.count,
                collection,
                data.documents.len()
            )));
        }

        Ok(Self {
            collection: collection.to_string(),
            embedding_model: manifest.embedding_model,
            documents: data.documents,
        })
    }

    fn manifest(&self) -> StoreManifest {
        StoreManifest {
            format_version: FORMAT_VERSION,
            collection: self.collection.clone(),
            embedding_model: self.embedding_model.clone(),
            dimension: self.dimension(),
            count: self.documents.len(),
            created_at: Utc::now(),
        }
    }

    fn write_files(&self, dir: &Path) -> Result<()> {
        fs::create_dir_all(dir.join(COLLECTIONS_DIR))?;

        let data = CollectionData {
            documents: self.documents.clone(),
        };
        fs::write(
            Self::collection_path(dir, &self.collection),
            serde_json::to_string(&data)?,
        )?;
        fs::write(
            Self::manifest_path(dir),
            serde_json::to_string_pretty(&self.manifest())?,
        )?;
        Ok(())
    }
}

fn read_json<T: for<'de> Deserialize<'de>>(path: &Path) -> Result<T> {
    let content = fs::read_to_string(path)
        .map_err(|e| Error::Storage(format!("cannot read {}: {}", path.display(), e)))?;
    serde_json::from_str(&content)
        .map_err(|e| Error::Storage(format!("corrupt {}: {}", path.display(), e)))
}

#[async_trait]
impl VectorStore for LocalVectorStore {
    async fn add(&mut self, documents: Vec<VectorDocument>) -> Result<Vec<String>> {
        let mut dimension = self.dimension();
        for doc in &documents {
            if doc.embedding.is_empty() {
                return Err(Error::VectorStore(format!("document '{}' has no embedding", doc.id)));
            }
            if dimension == 0 {
                dimension = doc.embedding.len();
            } else if doc.embedding.len() != dimension {
                return Err(Error::VectorStore(format!(
                    "document '{}' has dimension {}, expected {}",
                    doc.id,
                    doc.embedding.len(),
                    dimension
                )));
            }
        }

        let mut ids = Vec::with_capacity(documents.len());
        for document in documents {
            self.documents.retain(|existing| existing.id != document.id);
            ids.push(document.id.clone());
            self.documents.push(document);
        }
        Ok(ids)
    }

    async fn search_by_vector(&self, vector: &[f32], config: &SearchConfig) -> Result<SearchResult> {
        let mut results: Vec<VectorDocument> = self
            .documents
            .iter()
            .map(|doc| {
                let mut scored = doc.clone();
                scored.score = Some(cosine_similarity(vector, &doc.embedding));
                scored
            })
            .filter(|doc| match config.score_threshold {
                Some(threshold) => doc.score.unwrap_or(0.0) >= threshold,
                None => true,
            })
            .collect();

        results.sort_by(|a, b| {
            b.score
                .unwrap_or(0.0)
                .partial_cmp(&a.score.unwrap_or(0.0))
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        results.truncate(config.top_k);

        let total = results.len();
        Ok(SearchResult {
            documents: results,
            total,
        })
    }

    async fn count(&self) -> Result<usize> {
        Ok(self.documents.len())
    }

    /// Write into a staging directory next to `dir`, then rename it into place
    async fn persist(&self, dir: &Path) -> Result<()> {
        let parent = match dir.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&parent)?;

        let staging = tempfile::Builder::new()
            .prefix(".docqa-staging-")
            .tempdir_in(&parent)?;
        self.write_files(staging.path())?;

        if dir.exists() {
            fs::remove_dir_all(dir)?;
        }
        fs::rename(staging.path(), dir)?;

        tracing::info!(
            dir = %dir.display(),
            collection = %self.collection,
            count = self.documents.len(),
            "persisted vector store"
        );
        Ok(())
    }
}

/// Cosine similarity between two vectors, 0 for mismatched or zero vectors
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }

    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot_product / (norm_a * norm_b)
}
