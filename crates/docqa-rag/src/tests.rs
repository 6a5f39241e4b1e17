//! End-to-end tests for index building, reloading and querying

#[cfg(test)]
mod flow_tests {
    use crate::{
        EmbeddingProvider, Error, IndexHandle, IndexProvider, IndexSettings, LLMProvider,
        LocalVectorStore, QueryEngine, Result,
    };
    use async_trait::async_trait;
    use docqa_core::{GenerationConfig, GenerationResult};
    use insta::assert_yaml_snapshot;
    use std::fs;
    use std::path::Path;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tempfile::TempDir;

    const DIM: usize = 64;

    /// Bag-of-words embedder: each word bumps one bucket
    #[derive(Default)]
    struct BagOfWords {
        batch_calls: AtomicUsize,
        query_calls: AtomicUsize,
    }

    fn bag(text: &str) -> Vec<f32> {
        let mut v = vec![0.0; DIM];
        for word in text
            .to_lowercase()
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| w.len() > 3)
        {
            let bucket = word.bytes().fold(7usize, |acc, b| acc.wrapping_mul(31).wrapping_add(b as usize));
            v[bucket % DIM] += 1.0;
        }
        v[DIM - 1] += 0.01;
        v
    }

    #[async_trait]
    impl EmbeddingProvider for BagOfWords {
        async fn embed_query(&self, text: &str) -> Result<Vec<f32>> {
            self.query_calls.fetch_add(1, Ordering::SeqCst);
            Ok(bag(text))
        }

        async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
            self.batch_calls.fetch_add(1, Ordering::SeqCst);
            Ok(texts.iter().map(|t| bag(t)).collect())
        }

        fn embedding_model(&self) -> &str {
            "bag-of-words"
        }
    }

    /// Answers with the context it was given
    #[derive(Default)]
    struct ContextEcho {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl LLMProvider for ContextEcho {
        async fn generate(&self, prompt: &str) -> Result<GenerationResult> {
            self.generate_with_config(prompt, &GenerationConfig::default()).await
        }

        async fn generate_with_config(
            &self,
            prompt: &str,
            config: &GenerationConfig,
        ) -> Result<GenerationResult> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let context = prompt
                .split("---------------------\n")
                .nth(1)
                .unwrap_or_default()
                .lines()
                .filter(|l| !l.is_empty() && !l.starts_with("file_path:"))
                .collect::<Vec<_>>()
                .join(" ");
            Ok(GenerationResult {
                text: format!("According to the documents: {}", context),
                model_id: config.model_id.clone(),
                tokens_used: None,
            })
        }

        fn model_id(&self) -> &str {
            "context-echo"
        }
    }

    fn settings(root: &Path) -> IndexSettings {
        IndexSettings {
            documents_dir: root.join("documents"),
            persist_dir: root.join("chroma_db"),
            ..Default::default()
        }
    }

    fn write_docs(root: &Path, docs: &[(&str, &str)]) {
        let dir = root.join("documents");
        fs::create_dir_all(&dir).unwrap();
        for (name, text) in docs {
            fs::write(dir.join(name), text).unwrap();
        }
    }

    #[tokio::test]
    async fn test_capital_of_france() {
        let tmp = TempDir::new().unwrap();
        write_docs(tmp.path(), &[("france.txt", "Paris is the capital of France.")]);

        let embedder = Arc::new(BagOfWords::default());
        let provider = IndexProvider::new(settings(tmp.path()), embedder.clone());
        let handle = provider.get_index().await.unwrap();
        assert!(handle.was_built());

        let llm = Arc::new(ContextEcho::default());
        let engine = handle.into_index().as_query_engine(llm.clone(), 3);

        let answer = engine.answer_query("What is the capital of France?").await.unwrap();
        assert!(answer.contains("Paris"), "answer was: {}", answer);
        assert_eq!(llm.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_empty_question_never_reaches_backends() {
        let tmp = TempDir::new().unwrap();
        write_docs(tmp.path(), &[("france.txt", "Paris is the capital of France.")]);

        let embedder = Arc::new(BagOfWords::default());
        let index = IndexProvider::new(settings(tmp.path()), embedder.clone())
            .get_index()
            .await
            .unwrap()
            .into_index();
        let llm = Arc::new(ContextEcho::default());
        let engine = index.as_query_engine(llm.clone(), 3);

        assert_eq!(engine.answer_query("").await.unwrap(), "Please enter a valid question.");
        assert_eq!(engine.answer_query("  \t").await.unwrap(), "Please enter a valid question.");
        assert_eq!(embedder.query_calls.load(Ordering::SeqCst), 0);
        assert_eq!(llm.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_reload_skips_documents() {
        let tmp = TempDir::new().unwrap();
        write_docs(
            tmp.path(),
            &[
                ("france.txt", "Paris is the capital of France."),
                ("rust.md", "Rust guarantees memory safety without garbage collection."),
            ],
        );

        let first = Arc::new(BagOfWords::default());
        let built = IndexProvider::new(settings(tmp.path()), first.clone())
            .get_index()
            .await
            .unwrap();
        let built_answer = built
            .index()
            .as_query_engine(Arc::new(ContextEcho::default()), 3)
            .answer_query("What is the capital of France?")
            .await
            .unwrap();

        // The documents are gone; a reload must not notice.
        fs::remove_dir_all(tmp.path().join("documents")).unwrap();

        let second = Arc::new(BagOfWords::default());
        let reloaded = IndexProvider::new(settings(tmp.path()), second.clone())
            .get_index()
            .await
            .unwrap();
        assert!(matches!(reloaded, IndexHandle::Loaded(_)));
        assert_eq!(reloaded.index().len(), 2);
        assert_eq!(second.batch_calls.load(Ordering::SeqCst), 0);

        let reloaded_answer = reloaded
            .index()
            .as_query_engine(Arc::new(ContextEcho::default()), 3)
            .answer_query("What is the capital of France?")
            .await
            .unwrap();
        assert_eq!(built_answer, reloaded_answer);
    }

    #[tokio::test]
    async fn test_new_documents_are_not_picked_up() {
        let tmp = TempDir::new().unwrap();
        write_docs(tmp.path(), &[("france.txt", "Paris is the capital of France.")]);

        let embedder = Arc::new(BagOfWords::default());
        let provider = IndexProvider::new(settings(tmp.path()), embedder.clone());
        provider.get_index().await.unwrap();

        write_docs(tmp.path(), &[("italy.txt", "Rome is the capital of Italy.")]);
        let handle = provider.get_index().await.unwrap();
        assert!(!handle.was_built());
        assert_eq!(handle.index().len(), 1);

        let handle = provider.rebuild().await.unwrap();
        assert!(handle.was_built());
        assert_eq!(handle.index().len(), 2);

        let handle = provider.get_index().await.unwrap();
        assert!(!handle.was_built());
        assert_eq!(handle.index().len(), 2);
    }

    #[tokio::test]
    async fn test_failed_rebuild_keeps_persisted_index() {
        let tmp = TempDir::new().unwrap();
        write_docs(tmp.path(), &[("france.txt", "Paris is the capital of France.")]);

        let provider = IndexProvider::new(settings(tmp.path()), Arc::new(BagOfWords::default()));
        provider.get_index().await.unwrap();

        fs::remove_dir_all(tmp.path().join("documents")).unwrap();
        let err = provider.rebuild().await.unwrap_err();
        assert!(matches!(err, Error::Io(_)), "got {:?}", err);

        let handle = provider.get_index().await.unwrap();
        assert!(!handle.was_built());
        assert_eq!(handle.index().len(), 1);
    }

    #[tokio::test]
    async fn test_missing_documents_dir_fails_without_persisting() {
        let tmp = TempDir::new().unwrap();
        let provider = IndexProvider::new(settings(tmp.path()), Arc::new(BagOfWords::default()));

        let err = provider.get_index().await.unwrap_err();
        assert!(matches!(err, Error::Io(_)), "got {:?}", err);
        assert!(!tmp.path().join("chroma_db").exists());
    }

    #[tokio::test]
    async fn test_corrupt_persist_dir_is_storage_error() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir_all(tmp.path().join("chroma_db")).unwrap();

        let provider = IndexProvider::new(settings(tmp.path()), Arc::new(BagOfWords::default()));
        let err = provider.get_index().await.unwrap_err();
        assert!(matches!(err, Error::Storage(_)), "got {:?}", err);
    }

    #[tokio::test]
    async fn test_persisted_records_snapshot() {
        let tmp = TempDir::new().unwrap();
        write_docs(tmp.path(), &[("france.txt", "Paris is the capital of France.")]);

        let provider = IndexProvider::new(settings(tmp.path()), Arc::new(BagOfWords::default()));
        let handle = provider.get_index().await.unwrap();
        let IndexHandle::Built(_, result) = handle else {
            panic!("expected a fresh build");
        };
        assert_yaml_snapshot!(result, @r"
        documents_indexed: 1
        chunks_indexed: 1
        embedding_requests: 1
        ");

        let store = LocalVectorStore::load(&tmp.path().join("chroma_db"), "llama_docs").unwrap();
        let record = &store.documents()[0];
        assert_eq!(record.content, "Paris is the capital of France.");
        assert_eq!(record.metadata["file_name"], "france.txt");
        assert_eq!(record.metadata["chunk_index"], 0);
        assert_eq!(store.embedding_model(), Some("bag-of-words"));
    }
}
