//! Source documents loaded from the ingestion directory

use serde::{Deserialize, Serialize};

/// A unit of source text read from disk
///
/// Documents are created once while an index is being built and are never
/// mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    pub text: String,
    pub source: String,
    pub metadata: serde_json::Value,
}

impl Document {
    /// Create a document with an id derived by the caller
    pub fn new(id: impl Into<String>, text: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            source: source.into(),
            metadata: serde_json::Value::Object(Default::default()),
        }
    }

    /// Attach metadata, replacing whatever was there
    pub fn with_metadata(mut self, metadata: serde_json::Value) -> Self {
        self.metadata = metadata;
        self
    }

    /// File name recorded in metadata, if the reader set one
    pub fn file_name(&self) -> Option<&str> {
        self.metadata.get("file_name").and_then(|v| v.as_str())
    }
}
