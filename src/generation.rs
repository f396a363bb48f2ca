//! Answer generation backed by an external LLM.
//!
//! The [`Generator`] trait is the only thing the chat service knows about
//! the outside model. Every failure comes back as a [`GenerationError`],
//! which the chat service turns into a retrieval-only answer.
//!
//! # Providers
//!
//! - **`gemini`**: Google Gemini `generateContent` API. Requires the API key
//!   environment variable named by `[generation].api_key_env`.
//! - **`disabled`**: no generator; the server runs retrieval-only.
//!
//! Calls are made once with a request timeout; there is no retry.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

use crate::config::GenerationConfig;

const GEMINI_API_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Text shown to the model in place of an empty context.
const NO_CONTEXT: &str = "No information available";

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("generation request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("generation API error {status}: {body}")]
    Status { status: u16, body: String },
    #[error("invalid generation response: {0}")]
    InvalidResponse(String),
    #[error("generation response contained no text")]
    Empty,
}

/// Produces a reply for a fully rendered prompt.
#[async_trait]
pub trait Generator: Send + Sync {
    /// Model identifier, for logs and health output.
    fn model_name(&self) -> &str;

    async fn generate(&self, prompt: &str) -> Result<String, GenerationError>;
}

/// Fill `{context}` and `{query}` in the prompt template.
///
/// Placeholders are filled in a single pass over the template, so
/// placeholder-like text inside the query or context is left as is.
pub fn build_prompt(template: &str, query: &str, context: &str) -> String {
    let context = if context.is_empty() {
        NO_CONTEXT
    } else {
        context
    };

    let mut prompt = String::with_capacity(template.len() + query.len() + context.len());
    let mut rest = template;
    while let Some(start) = rest.find('{') {
        prompt.push_str(&rest[..start]);
        let tail = &rest[start..];
        if let Some(after) = tail.strip_prefix("{context}") {
            prompt.push_str(context);
            rest = after;
        } else if let Some(after) = tail.strip_prefix("{query}") {
            prompt.push_str(query);
            rest = after;
        } else {
            prompt.push('{');
            rest = &tail[1..];
        }
    }
    prompt.push_str(rest);
    prompt
}

/// Build the configured generator, or `None` for retrieval-only mode.
///
/// A missing API key is not an error: it is logged and generation is
/// switched off.
pub fn create_generator(config: &GenerationConfig) -> Option<Arc<dyn Generator>> {
    if !config.is_enabled() {
        tracing::info!("Generation disabled, running in retrieval-only mode");
        return None;
    }

    let api_key = match std::env::var(&config.api_key_env) {
        Ok(key) if !key.trim().is_empty() => key,
        _ => {
            tracing::warn!(
                "{} not found, falling back to retrieval-only mode",
                config.api_key_env
            );
            return None;
        }
    };

    match GeminiGenerator::new(api_key, config) {
        Ok(generator) => {
            tracing::info!(model = %generator.model, "Gemini generator initialized");
            Some(Arc::new(generator))
        }
        Err(e) => {
            tracing::error!("Error initializing Gemini: {}", e);
            tracing::warn!("Falling back to retrieval-only mode");
            None
        }
    }
}

// ============ Gemini ============

/// Google Gemini client for single-turn text generation.
#[derive(Debug, Clone)]
pub struct GeminiGenerator {
    http: Client,
    api_key: String,
    base_url: String,
    model: String,
    temperature: f32,
    max_output_tokens: u32,
}

impl GeminiGenerator {
    pub fn new(api_key: impl Into<String>, config: &GenerationConfig) -> Result<Self, GenerationError> {
        let http = Client::builder()
            .user_agent(concat!("faq-harness/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            api_key: api_key.into(),
            base_url: GEMINI_API_URL.to_string(),
            model: config.model.clone(),
            temperature: config.temperature,
            max_output_tokens: config.max_output_tokens,
        })
    }

    /// Point the client at a different API root (e.g. a local mock).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn request_body(&self, prompt: &str) -> GeminiRequest {
        GeminiRequest {
            contents: vec![Content {
                role: "user".to_string(),
                parts: vec![Part {
                    text: prompt.to_string(),
                }],
            }],
            generation_config: GeminiGenerationConfig {
                temperature: self.temperature,
                max_output_tokens: self.max_output_tokens,
            },
        }
    }
}

#[async_trait]
impl Generator for GeminiGenerator {
    fn model_name(&self) -> &str {
        &self.model
    }

    async fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
        let url = format!("{}/models/{}:generateContent", self.base_url, self.model);

        let response = self
            .http
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&self.request_body(prompt))
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            return Err(GenerationError::Status {
                status: status.as_u16(),
                body: text,
            });
        }

        parse_gemini_response(&text)
    }
}

/// Extract the first candidate's text, trimmed.
fn parse_gemini_response(body: &str) -> Result<String, GenerationError> {
    let response: GeminiResponse = serde_json::from_str(body)
        .map_err(|e| GenerationError::InvalidResponse(e.to_string()))?;

    let text: String = response
        .candidates
        .first()
        .and_then(|c| c.content.as_ref())
        .map(|c| c.parts.iter().map(|p| p.text.as_str()).collect())
        .unwrap_or_default();

    let text = text.trim();
    if text.is_empty() {
        return Err(GenerationError::Empty);
    }
    Ok(text.to_string())
}

#[derive(Debug, Serialize)]
struct GeminiRequest {
    contents: Vec<Content>,
    #[serde(rename = "generationConfig")]
    generation_config: GeminiGenerationConfig,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(default)]
    role: String,
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Serialize)]
struct GeminiGenerationConfig {
    temperature: f32,
    #[serde(rename = "maxOutputTokens")]
    max_output_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}
