//! OpenAI client implementation

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::time::Duration;
use tokio::time::timeout;

use docqa_core::{
    EmbeddingProvider, Error, GenerationConfig, GenerationResult, LLMProvider, Result,
};

use crate::config::OpenAIConfig;

/// OpenAI client for chat completions and embeddings
pub struct OpenAIClient {
    config: OpenAIConfig,
    client: Client,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
    usage: Option<ChatUsage>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct ChatUsage {
    total_tokens: u32,
}

#[derive(Serialize)]
struct EmbeddingsRequest<'a> {
    model: &'a str,
    input: &'a [String],
}

#[derive(Deserialize)]
struct EmbeddingsResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Deserialize)]
struct EmbeddingData {
    index: usize,
    embedding: Vec<f32>,
}

impl OpenAIClient {
    /// Create a new OpenAI client from configuration
    pub fn new(config: OpenAIConfig) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(limit) = config.timeout() {
            builder = builder.timeout(limit);
        }
        let client = builder.build().map_err(|e| Error::Network(e.to_string()))?;

        Ok(Self { config, client })
    }

    /// Create a new OpenAI client from environment variables
    pub fn from_env() -> Result<Self> {
        let config = OpenAIConfig::from_env()?;
        Self::new(config)
    }

    /// Set the chat model to use for generation
    pub fn with_model(mut self, model_id: impl Into<String>) -> Self {
        self.config.chat_model = model_id.into();
        self
    }

    /// Set the embedding model
    pub fn with_embedding_model(mut self, model_id: impl Into<String>) -> Self {
        self.config.embedding_model = model_id.into();
        self
    }

    pub fn config(&self) -> &OpenAIConfig {
        &self.config
    }

    fn api_key(&self) -> Result<&str> {
        self.config.api_key.as_deref().ok_or_else(|| {
            Error::Configuration("OPENAI_API_KEY environment variable not set".to_string())
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.config.base_url, path)
    }

    async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: for<'de> Deserialize<'de>,
    {
        let api_key = self.api_key()?;
        let url = self.endpoint(path);

        tracing::debug!(url = %url, "sending request");

        let response = self
            .client
            .post(&url)
            .header("Content-Type", "application/json")
            .bearer_auth(api_key)
            .json(body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    Error::Timeout(e.to_string())
                } else {
                    Error::Network(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(status_error(status, &error_text));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| Error::Serialization(e.to_string()))
    }
}

/// Map a non-success HTTP status onto the error taxonomy
pub(crate) fn status_error(status: StatusCode, body: &str) -> Error {
    let message = format!("OpenAI API request failed with status {}: {}", status, body);
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Error::Authentication(message),
        StatusCode::TOO_MANY_REQUESTS => Error::RateLimited(message),
        _ => Error::LLMProvider(message),
    }
}

async fn with_timeout<F, T>(limit: Option<Duration>, fut: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    match limit {
        Some(limit) => match timeout(limit, fut).await {
            Ok(result) => result,
            Err(_) => Err(Error::Timeout("Request timed out".to_string())),
        },
        None => fut.await,
    }
}

#[async_trait]
impl LLMProvider for OpenAIClient {
    async fn generate(&self, prompt: &str) -> Result<GenerationResult> {
        let config = GenerationConfig {
            model_id: self.config.chat_model.clone(),
            temperature: self.config.temperature,
            timeout: self.config.timeout(),
        };
        self.generate_with_config(prompt, &config).await
    }

    async fn generate_with_config(
        &self,
        prompt: &str,
        config: &GenerationConfig,
    ) -> Result<GenerationResult> {
        let request = ChatRequest {
            model: &config.model_id,
            messages: vec![ChatMessage { role: "user", content: prompt }],
            temperature: config.temperature,
        };

        let response: ChatResponse =
            with_timeout(config.timeout, self.post_json("chat/completions", &request)).await?;

        let text = response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| Error::LLMProvider("No choices returned from OpenAI API".to_string()))?;

        Ok(GenerationResult {
            text: text.trim().to_string(),
            model_id: config.model_id.clone(),
            tokens_used: response.usage.map(|u| u.total_tokens),
        })
    }

    fn model_id(&self) -> &str {
        &self.config.chat_model
    }
}

/// Restore input order; indices must be exactly `0..expected`
fn order_embeddings(mut data: Vec<EmbeddingData>, expected: usize) -> Result<Vec<Vec<f32>>> {
    if data.len() != expected {
        return Err(Error::Embedding(format!(
            "Expected {} embeddings, got {}",
            expected,
            data.len()
        )));
    }

    data.sort_by_key(|d| d.index);
    if let Some((position, d)) = data.iter().enumerate().find(|(i, d)| d.index != *i) {
        return Err(Error::Embedding(format!(
            "Embedding indices do not match inputs: expected index {}, got {}",
            position, d.index
        )));
    }
    Ok(data.into_iter().map(|d| d.embedding).collect())
}

#[async_trait]
impl EmbeddingProvider for OpenAIClient {
    async fn embed_query(&self, text: &str) -> Result<Vec<f32>> {
        let mut vectors = self.embed_batch(&[text.to_string()]).await?;
        vectors
            .pop()
            .ok_or_else(|| Error::Embedding("Empty embedding response".to_string()))
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let request = EmbeddingsRequest {
            model: &self.config.embedding_model,
            input: texts,
        };

        let response: EmbeddingsResponse =
            with_timeout(self.config.timeout(), self.post_json("embeddings", &request)).await?;

        order_embeddings(response.data, texts.len())
    }

    fn embedding_model(&self) -> &str {
        &self.config.embedding_model
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert!(matches!(
            status_error(StatusCode::UNAUTHORIZED, "bad key"),
            Error::Authentication(_)
        ));
        assert!(matches!(
            status_error(StatusCode::TOO_MANY_REQUESTS, "slow down"),
            Error::RateLimited(_)
        ));
        assert!(matches!(
            status_error(StatusCode::INTERNAL_SERVER_ERROR, "oops"),
            Error::LLMProvider(_)
        ));
    }

    #[tokio::test]
    async fn test_missing_key_fails_before_network() {
        let mut config = OpenAIConfig::new("unused");
        config.api_key = None;
        // Unroutable on purpose: the call must fail on the credential first.
        let config = config.with_base_url("http://127.0.0.1:9").unwrap();
        let client = OpenAIClient::new(config).unwrap();

        let err = client.generate("hello").await.unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));

        let err = client.embed_query("hello").await.unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));
    }

    #[tokio::test]
    async fn test_empty_batch_is_free() {
        let client = OpenAIClient::new(OpenAIConfig::new("unused")).unwrap();
        let vectors = client.embed_batch(&[]).await.unwrap();
        assert!(vectors.is_empty());
    }

    fn data(indices: &[usize]) -> Vec<EmbeddingData> {
        indices
            .iter()
            .map(|&index| EmbeddingData {
                index,
                embedding: vec![index as f32],
            })
            .collect()
    }

    #[test]
    fn test_order_embeddings_restores_input_order() {
        let vectors = order_embeddings(data(&[2, 0, 1]), 3).unwrap();
        assert_eq!(vectors, vec![vec![0.0], vec![1.0], vec![2.0]]);
    }

    #[test]
    fn test_order_embeddings_rejects_bad_indices() {
        let err = order_embeddings(data(&[0, 0, 2]), 3).unwrap_err();
        assert!(matches!(err, Error::Embedding(_)), "got {:?}", err);

        let err = order_embeddings(data(&[0, 1, 3]), 3).unwrap_err();
        assert!(matches!(err, Error::Embedding(_)), "got {:?}", err);

        let err = order_embeddings(data(&[0, 1]), 3).unwrap_err();
        assert!(matches!(err, Error::Embedding(_)), "got {:?}", err);
    }
}
