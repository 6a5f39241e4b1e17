//! Command-line flags and how they map onto crate settings

use clap::Parser;
use std::path::PathBuf;

use docqa_rag::{DEFAULT_TOP_K, IndexSettings, IndexingConfig};
use docqa_web::ServerConfig;

#[derive(Parser, Debug)]
#[command(name = "docqa")]
#[command(about = "Ask questions about a directory of documents", long_about = None)]
pub struct Cli {
    /// Directory of source documents, read only when no index is persisted
    #[arg(long, env = "DOCQA_DOCUMENTS_DIR", default_value = "documents")]
    pub documents_dir: PathBuf,

    /// Directory holding the persisted index
    #[arg(long, env = "DOCQA_PERSIST_DIR", default_value = "chroma_db")]
    pub persist_dir: PathBuf,

    /// Collection name inside the persisted index
    #[arg(long, env = "DOCQA_COLLECTION", default_value = "llama_docs")]
    pub collection: String,

    /// Descend into subdirectories of the documents directory
    #[arg(long)]
    pub recursive: bool,

    /// Only index files with these extensions (repeatable)
    #[arg(long = "ext", value_name = "EXT")]
    pub extensions: Vec<String>,

    /// Build the index again from the documents, replacing the persisted one
    #[arg(long)]
    pub rebuild: bool,

    /// Number of similar chunks passed to the model
    #[arg(long, default_value_t = DEFAULT_TOP_K)]
    pub top_k: usize,

    /// Answer one question, print it and exit instead of serving the form
    #[arg(short, long)]
    pub question: Option<String>,

    #[arg(long, env = "DOCQA_HOST", default_value = "127.0.0.1")]
    pub host: String,

    #[arg(long, env = "DOCQA_PORT", default_value_t = 7860)]
    pub port: u16,
}

impl Cli {
    pub fn index_settings(&self) -> IndexSettings {
        IndexSettings {
            documents_dir: self.documents_dir.clone(),
            persist_dir: self.persist_dir.clone(),
            collection: self.collection.clone(),
            recursive: self.recursive,
            required_exts: self.extensions.clone(),
            indexing: IndexingConfig::default(),
        }
    }

    pub fn server_config(&self) -> ServerConfig {
        ServerConfig {
            host: self.host.clone(),
            port: self.port,
        }
    }
}
