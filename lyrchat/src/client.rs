//! HTTP client for the chat-completion backend
//!
//! The backend speaks the OpenAI-compatible chat-completion protocol:
//! `POST {base}/chat/completions` for answers and `GET {base}/models` as an
//! availability probe.
//!
//! # Example
//!
//! ```no_run
//! use lyrchat::{ChatBackend, ChatClient};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = ChatClient::builder()
//!         .base_url("https://api.openai.com/v1")
//!         .api_key("sk-...")
//!         .model("gpt-4o")
//!         .build()?;
//!
//!     if client.is_available().await {
//!         let answer = client.complete("You answer with lyrics.", "你好吗？").await?;
//!         println!("{:?}", answer);
//!     }
//!     Ok(())
//! }
//! ```

use crate::error::{ChatError, Result};
use crate::models::{ChatMessage, ChatRequest, ChatResponse};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, warn};

/// Default request timeout (30 seconds)
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Default completion token limit
pub const DEFAULT_MAX_TOKENS: u32 = 500;

/// Default sampling temperature
pub const DEFAULT_TEMPERATURE: f64 = 0.7;

/// Capability interface for the language-model backend
///
/// One production implementation ([`ChatClient`]) plus substitutable test
/// doubles in the crates that orchestrate calls.
#[async_trait]
pub trait ChatBackend: Send + Sync {
    /// Sends a system prompt and a user question, returning the first
    /// choice's content. `Ok(None)` means the call succeeded transport-wise
    /// but produced no usable content.
    async fn complete(&self, system_prompt: &str, question: &str) -> Result<Option<String>>;

    /// Probes the backend; `true` when `GET {base}/models` answers 2xx
    async fn is_available(&self) -> bool;
}

/// Production chat backend client
#[derive(Debug, Clone)]
pub struct ChatClient {
    client: Client,
    base_url: String,
    api_key: String,
    model: String,
    max_tokens: u32,
    temperature: f64,
}

impl ChatClient {
    /// Create a builder for configuring the client
    pub fn builder() -> ChatClientBuilder {
        ChatClientBuilder::default()
    }

    /// The configured model name
    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl ChatBackend for ChatClient {
    async fn complete(&self, system_prompt: &str, question: &str) -> Result<Option<String>> {
        let url = format!("{}/chat/completions", self.base_url);
        let body = ChatRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage::system(system_prompt),
                ChatMessage::user(question),
            ],
            max_tokens: self.max_tokens,
            temperature: self.temperature,
        };

        debug!(model=%self.model, "Sending chat completion request");

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ChatError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: ChatResponse = response.json().await?;
        Ok(parsed.into_content())
    }

    async fn is_available(&self) -> bool {
        let url = format!("{}/models", self.base_url);
        match self.client.get(&url).bearer_auth(&self.api_key).send().await {
            Ok(response) => response.status().is_success(),
            Err(e) => {
                warn!("Chat backend unavailable: {}", e);
                false
            }
        }
    }
}

/// Builder for [`ChatClient`]
#[derive(Debug, Clone)]
pub struct ChatClientBuilder {
    base_url: String,
    api_key: String,
    model: String,
    timeout: Duration,
    max_tokens: u32,
    temperature: f64,
    proxy: Option<(String, u16)>,
}

impl Default for ChatClientBuilder {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            api_key: String::new(),
            model: "gpt-4o".to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            max_tokens: DEFAULT_MAX_TOKENS,
            temperature: DEFAULT_TEMPERATURE,
            proxy: None,
        }
    }
}

impl ChatClientBuilder {
    /// Base URL of the backend, without trailing slash
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = api_key.into();
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn temperature(mut self, temperature: f64) -> Self {
        self.temperature = temperature;
        self
    }

    /// Routes outbound requests through an HTTP proxy
    pub fn proxy(mut self, host: impl Into<String>, port: u16) -> Self {
        self.proxy = Some((host.into(), port));
        self
    }

    pub fn build(self) -> Result<ChatClient> {
        let mut builder = Client::builder().timeout(self.timeout);
        if let Some((host, port)) = &self.proxy {
            let proxy = reqwest::Proxy::all(format!("http://{}:{}", host, port))?;
            builder = builder.proxy(proxy);
        }
        let client = builder.build()?;

        Ok(ChatClient {
            client,
            base_url: self.base_url.trim_end_matches('/').to_string(),
            api_key: self.api_key,
            model: self.model,
            max_tokens: self.max_tokens,
            temperature: self.temperature,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_client(base_url: &str) -> ChatClient {
        ChatClient::builder()
            .base_url(base_url)
            .api_key("test-key")
            .model("test-model")
            .timeout(Duration::from_secs(5))
            .build()
            .expect("Failed to build client")
    }

    #[tokio::test]
    async fn complete_returns_content() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/chat/completions")
            .match_header("authorization", "Bearer test-key")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"choices":[{"message":{"content":"敢问路在何方--许镜清《敢问路在何方》"}}]}"#)
            .create_async()
            .await;

        let client = test_client(&server.url());
        let answer = client.complete("prompt", "question").await.unwrap();
        assert_eq!(
            answer,
            Some("敢问路在何方--许镜清《敢问路在何方》".to_string())
        );
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn complete_without_choices_yields_none() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/chat/completions")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"choices":[]}"#)
            .create_async()
            .await;

        let client = test_client(&server.url());
        let answer = client.complete("prompt", "question").await.unwrap();
        assert!(answer.is_none());
    }

    #[tokio::test]
    async fn complete_surfaces_api_errors() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/chat/completions")
            .with_status(429)
            .with_body("rate limited")
            .create_async()
            .await;

        let client = test_client(&server.url());
        let err = client.complete("prompt", "question").await.unwrap_err();
        match err {
            ChatError::Api { status, .. } => assert_eq!(status, 429),
            other => panic!("Unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn availability_probe() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/models")
            .match_header("authorization", "Bearer test-key")
            .with_status(200)
            .with_body(r#"{"data":[]}"#)
            .create_async()
            .await;

        let client = test_client(&server.url());
        assert!(client.is_available().await);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn availability_probe_failure() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/models")
            .with_status(500)
            .create_async()
            .await;

        let client = test_client(&server.url());
        assert!(!client.is_available().await);
    }
}
