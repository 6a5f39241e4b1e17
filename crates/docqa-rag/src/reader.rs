//! Directory reader for the ingestion directory

use chrono::{DateTime, Utc};
use serde_json::json;
use std::io;
use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

use docqa_core::{Document, Error, Result};

/// Reads every visible file in a directory into [`Document`]s
#[derive(Debug, Clone)]
pub struct DirectoryReader {
    input_dir: PathBuf,
    recursive: bool,
    required_exts: Option<Vec<String>>,
}

impl DirectoryReader {
    pub fn new(input_dir: impl Into<PathBuf>) -> Self {
        Self {
            input_dir: input_dir.into(),
            recursive: false,
            required_exts: None,
        }
    }

    /// Also descend into subdirectories
    pub fn recursive(mut self, recursive: bool) -> Self {
        self.recursive = recursive;
        self
    }

    /// Only load files with one of these extensions (with or without the dot)
    pub fn required_exts<I, S>(mut self, exts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let exts: Vec<String> = exts
            .into_iter()
            .map(|e| e.as_ref().trim_start_matches('.').to_lowercase())
            .collect();
        self.required_exts = if exts.is_empty() { None } else { Some(exts) };
        self
    }

    pub fn input_dir(&self) -> &Path {
        &self.input_dir
    }

    /// List the files that would be loaded, in sorted order
    pub fn list_files(&self) -> Result<Vec<PathBuf>> {
        if !self.input_dir.is_dir() {
            return Err(Error::Io(io::Error::new(
                io::ErrorKind::NotFound,
                format!("Directory {} does not exist.", self.input_dir.display()),
            )));
        }

        let max_depth = if self.recursive { usize::MAX } else { 1 };
        let mut files = Vec::new();

        for entry in WalkDir::new(&self.input_dir)
            .max_depth(max_depth)
            .into_iter()
            .filter_entry(|e| e.depth() == 0 || !is_hidden(e))
        {
            let entry = entry.map_err(|e| Error::DocumentReader(e.to_string()))?;
            if !entry.file_type().is_file() {
                continue;
            }
            if !self.extension_allowed(entry.path()) {
                continue;
            }
            files.push(entry.into_path());
        }

        files.sort();
        Ok(files)
    }

    /// Load all documents, failing when the directory is missing or yields nothing
    pub fn load_data(&self) -> Result<Vec<Document>> {
        let files = self.list_files()?;
        let mut documents = Vec::with_capacity(files.len());

        for path in files {
            let bytes = std::fs::read(&path)?;
            let text = String::from_utf8_lossy(&bytes).into_owned();
            if text.trim().is_empty() {
                tracing::debug!(path = %path.display(), "skipping empty file");
                continue;
            }
            documents.push(Self::to_document(&path, text, bytes.len() as u64)?);
        }

        if documents.is_empty() {
            return Err(Error::Io(io::Error::new(
                io::ErrorKind::NotFound,
                format!("No files found in {}.", self.input_dir.display()),
            )));
        }

        tracing::info!(
            count = documents.len(),
            dir = %self.input_dir.display(),
            "loaded documents"
        );
        Ok(documents)
    }

    fn extension_allowed(&self, path: &Path) -> bool {
        match &self.required_exts {
            None => true,
            Some(exts) => path
                .extension()
                .and_then(|e| e.to_str())
                .map(|e| exts.iter().any(|allowed| allowed.eq_ignore_ascii_case(e)))
                .unwrap_or(false),
        }
    }

    fn to_document(path: &Path, text: String, size: u64) -> Result<Document> {
        let file_path = path.to_string_lossy().into_owned();
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let file_type = path
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
            .unwrap_or_default();
        let last_modified = std::fs::metadata(path)?
            .modified()
            .ok()
            .map(|t| DateTime::<Utc>::from(t).format("%Y-%m-%d").to_string());

        let id = format!("{:x}", md5::compute(file_path.as_bytes()));

        Ok(Document::new(id, text, file_path.clone()).with_metadata(json!({
            "file_path": file_path,
            "file_name": file_name,
            "file_type": file_type,
            "file_size": size,
            "last_modified_date": last_modified,
        })))
    }
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry
        .file_name()
        .to_str()
        .map(|s| s.starts_with('.'))
        .unwrap_or(false)
}
