//! Language-model backends behind the [`TextCompletion`] capability.
//!
//! One backend is built from [`Settings`] at start-up and handed to the components
//! that generate prose. The rule engine never touches it.

use crate::config::{LlmProvider, Settings};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde_json::{Value, json};

const OPENAI_ENDPOINT: &str = "https://api.openai.com/v1/chat/completions";
const ANTHROPIC_ENDPOINT: &str = "https://api.anthropic.com/v1/messages";
const ANTHROPIC_VERSION: &str = "2023-06-01";
const ANTHROPIC_MAX_TOKENS: u32 = 2048;

#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("{provider} API key is not configured")]
    MissingApiKey { provider: &'static str },

    #[error("LLM request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("LLM backend returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Malformed LLM response: {0}")]
    MalformedResponse(String),
}

/// Turns a prompt into free text.
#[async_trait]
pub trait TextCompletion: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, LlmError>;
}

/// Calls the model and falls back to a fixed text on any failure.
pub async fn generate_or(
    llm: &dyn TextCompletion,
    prompt: &str,
    fallback: &str,
    context: &str,
) -> String {
    match llm.generate(prompt).await {
        Ok(text) => text,
        Err(e) => {
            tracing::warn!(context = context, error = %e, "LLM unavailable, using fallback text");
            fallback.to_string()
        }
    }
}

/// Builds the backend selected by `LLM_PROVIDER`.
pub fn from_settings(settings: &Settings, client: Client) -> Box<dyn TextCompletion> {
    match settings.llm_provider {
        LlmProvider::Ollama => Box::new(OllamaClient::new(
            client,
            &settings.ollama_base_url,
            &settings.ollama_model,
        )),
        LlmProvider::OpenAi => Box::new(OpenAiClient::new(
            client,
            settings.openai_api_key.clone(),
            &settings.openai_model,
        )),
        LlmProvider::Anthropic => Box::new(AnthropicClient::new(
            client,
            settings.anthropic_api_key.clone(),
            &settings.anthropic_model,
        )),
    }
}

async fn send_json(request: RequestBuilder) -> Result<Value, LlmError> {
    let response = request.send().await?;
    let status = response.status();

    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(LlmError::Status {
            status: status.as_u16(),
            body: body.chars().take(500).collect(),
        });
    }

    response
        .json::<Value>()
        .await
        .map_err(|e| LlmError::MalformedResponse(e.to_string()))
}

fn non_empty(text: String, field: &str) -> Result<String, LlmError> {
    if text.trim().is_empty() {
        Err(LlmError::MalformedResponse(format!("empty {}", field)))
    } else {
        Ok(text)
    }
}

fn require_key(key: &Option<String>, provider: &'static str) -> Result<String, LlmError> {
    key.as_ref()
        .filter(|k| !k.trim().is_empty())
        .cloned()
        .ok_or(LlmError::MissingApiKey { provider })
}

/// Local Ollama server, `POST {base}/api/generate` without streaming.
pub struct OllamaClient {
    client: Client,
    endpoint: String,
    model: String,
}

impl OllamaClient {
    pub fn new(client: Client, base_url: &str, model: &str) -> Self {
        Self {
            client,
            endpoint: format!("{}/api/generate", base_url.trim_end_matches('/')),
            model: model.to_string(),
        }
    }
}

#[async_trait]
impl TextCompletion for OllamaClient {
    async fn generate(&self, prompt: &str) -> Result<String, LlmError> {
        let body = json!({
            "model": self.model,
            "prompt": prompt,
            "stream": false,
            "options": { "temperature": 0 }
        });

        let result = send_json(self.client.post(&self.endpoint).json(&body)).await?;
        let text = result["response"]
            .as_str()
            .ok_or_else(|| LlmError::MalformedResponse("missing `response` field".to_string()))?
            .to_string();

        non_empty(text, "response")
    }
}

pub struct OpenAiClient {
    client: Client,
    endpoint: String,
    api_key: Option<String>,
    model: String,
}

impl OpenAiClient {
    pub fn new(client: Client, api_key: Option<String>, model: &str) -> Self {
        Self {
            client,
            endpoint: OPENAI_ENDPOINT.to_string(),
            api_key,
            model: model.to_string(),
        }
    }

    pub fn with_endpoint(mut self, endpoint: &str) -> Self {
        self.endpoint = endpoint.to_string();
        self
    }
}

#[async_trait]
impl TextCompletion for OpenAiClient {
    async fn generate(&self, prompt: &str) -> Result<String, LlmError> {
        let api_key = require_key(&self.api_key, "OpenAI")?;
        let body = json!({
            "model": self.model,
            "temperature": 0,
            "messages": [{ "role": "user", "content": prompt }]
        });

        let result = send_json(
            self.client
                .post(&self.endpoint)
                .bearer_auth(api_key)
                .json(&body),
        )
        .await?;

        let text = result["choices"][0]["message"]["content"]
            .as_str()
            .ok_or_else(|| {
                LlmError::MalformedResponse("missing `choices[0].message.content`".to_string())
            })?
            .to_string();

        non_empty(text, "message content")
    }
}

pub struct AnthropicClient {
    client: Client,
    endpoint: String,
    api_key: Option<String>,
    model: String,
}

impl AnthropicClient {
    pub fn new(client: Client, api_key: Option<String>, model: &str) -> Self {
        Self {
            client,
            endpoint: ANTHROPIC_ENDPOINT.to_string(),
            api_key,
            model: model.to_string(),
        }
    }

    pub fn with_endpoint(mut self, endpoint: &str) -> Self {
        self.endpoint = endpoint.to_string();
        self
    }
}

#[async_trait]
impl TextCompletion for AnthropicClient {
    async fn generate(&self, prompt: &str) -> Result<String, LlmError> {
        let api_key = require_key(&self.api_key, "Anthropic")?;
        let body = json!({
            "model": self.model,
            "max_tokens": ANTHROPIC_MAX_TOKENS,
            "temperature": 0,
            "messages": [{ "role": "user", "content": prompt }]
        });

        let result = send_json(
            self.client
                .post(&self.endpoint)
                .header("x-api-key", api_key)
                .header("anthropic-version", ANTHROPIC_VERSION)
                .json(&body),
        )
        .await?;

        let blocks = result["content"]
            .as_array()
            .ok_or_else(|| LlmError::MalformedResponse("missing `content` blocks".to_string()))?;

        // Text blocks only; tool-use and other block kinds carry no prose.
        let text = blocks
            .iter()
            .filter(|block| block["type"] == "text")
            .filter_map(|block| block["text"].as_str())
            .collect::<String>();

        non_empty(text, "content")
    }
}
