//! Clients for an OpenAI-compatible embeddings and chat completions API.

use async_trait::async_trait;
use outfitx_core::{EmbeddingProvider, Error, LanguageModel, Result, Vector};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::time::Duration;
use tracing::debug;

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_EMBEDDING_MODEL: &str = "text-embedding-3-small";
pub const DEFAULT_CHAT_MODEL: &str = "gpt-4o-mini";

const SYSTEM_PROMPT: &str = "You are a precise shopping assistant.";
const CHAT_TEMPERATURE: f32 = 0.2;

#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    /// Checked on every call; a missing key is a configuration error at first use
    pub api_key: Option<String>,
    pub base_url: String,
    pub embedding_model: String,
    pub chat_model: String,
    pub request_timeout: Duration,
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            embedding_model: DEFAULT_EMBEDDING_MODEL.to_string(),
            chat_model: DEFAULT_CHAT_MODEL.to_string(),
            request_timeout: Duration::from_secs(30),
        }
    }
}

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a str,
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    #[serde(default)]
    data: Vec<EmbeddingData>,
}

#[derive(Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Deserialize)]
struct ChatMessage {
    #[serde(default)]
    content: String,
}

/// One HTTP client serving both the embedding and the chat capability
#[derive(Clone)]
pub struct OpenAiClient {
    http: reqwest::Client,
    config: OpenAiConfig,
}

impl OpenAiClient {
    pub fn new(config: OpenAiConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| Error::Configuration(format!("failed to build HTTP client: {}", e)))?;
        Ok(Self { http, config })
    }

    pub fn config(&self) -> &OpenAiConfig {
        &self.config
    }

    fn api_key(&self) -> Result<&str> {
        self.config
            .api_key
            .as_deref()
            .filter(|k| !k.is_empty())
            .ok_or_else(|| Error::Configuration("OPENAI_API_KEY not set".to_string()))
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.config.base_url.trim_end_matches('/'), path)
    }

    async fn post<B, R>(&self, path: &str, body: &B) -> Result<R>
    where
        B: Serialize + ?Sized,
        R: for<'de> Deserialize<'de>,
    {
        let key = self.api_key()?;
        let response = self
            .http
            .post(self.endpoint(path))
            .bearer_auth(key)
            .json(body)
            .send()
            .await
            .map_err(|e| Error::Upstream(format!("openai request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let raw = response.text().await.unwrap_or_default();
            return Err(Error::Upstream(format!("openai error ({}): {}", status, raw)));
        }

        response
            .json::<R>()
            .await
            .map_err(|e| Error::Upstream(format!("openai response not understood: {}", e)))
    }
}

#[async_trait]
impl EmbeddingProvider for OpenAiClient {
    async fn embed(&self, text: &str) -> Result<Vector> {
        let request = EmbeddingRequest {
            model: &self.config.embedding_model,
            input: text,
        };
        let parsed: EmbeddingResponse = self.post("embeddings", &request).await?;

        let embedding = parsed
            .data
            .into_iter()
            .next()
            .map(|d| d.embedding)
            .filter(|e| !e.is_empty())
            .ok_or_else(|| Error::Upstream("no embedding returned".to_string()))?;
        debug!(dim = embedding.len(), "embedding received");
        Ok(Vector::new(embedding))
    }
}

#[async_trait]
impl LanguageModel for OpenAiClient {
    async fn generate(&self, prompt: &str) -> Result<String> {
        let request = json!({
            "model": self.config.chat_model,
            "temperature": CHAT_TEMPERATURE,
            "messages": [
                {"role": "system", "content": SYSTEM_PROMPT},
                {"role": "user", "content": prompt},
            ],
        });
        let parsed: ChatResponse = self.post("chat/completions", &request).await?;

        parsed
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| Error::Upstream("no completion returned".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_key_is_configuration_error() {
        let client = OpenAiClient::new(OpenAiConfig::default()).unwrap();

        let err = client.embed("smart_casual top").await.unwrap_err();
        assert!(matches!(err, Error::Configuration(ref m) if m.contains("OPENAI_API_KEY")));

        let err = client.generate("hello").await.unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));
    }

    #[test]
    fn test_empty_key_counts_as_missing() {
        let client = OpenAiClient::new(OpenAiConfig {
            api_key: Some(String::new()),
            ..Default::default()
        })
        .unwrap();
        assert!(client.api_key().is_err());
    }

    #[test]
    fn test_endpoint_joins_base_url() {
        let client = OpenAiClient::new(OpenAiConfig {
            base_url: "http://localhost:8080/v1/".to_string(),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(client.endpoint("embeddings"), "http://localhost:8080/v1/embeddings");
    }

    #[test]
    fn test_response_shapes() {
        let parsed: EmbeddingResponse =
            serde_json::from_str(r#"{"data":[{"embedding":[0.1,0.2]}],"model":"m"}"#).unwrap();
        assert_eq!(parsed.data[0].embedding, vec![0.1, 0.2]);

        let parsed: ChatResponse =
            serde_json::from_str(r#"{"choices":[{"message":{"role":"assistant","content":"[\"a\"]"}}]}"#)
                .unwrap();
        assert_eq!(parsed.choices[0].message.content, "[\"a\"]");
    }
}
