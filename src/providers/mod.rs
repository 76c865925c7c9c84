/*!
 * Provider implementations for the external translation capability.
 *
 * Each client speaks one LLM chat API:
 * - Ollama: Local LLM server
 * - OpenAI: OpenAI API, also used for OpenAI-compatible servers like LM Studio
 * - Anthropic: Anthropic Messages API
 * - Mock: in-process provider for tests and dry runs
 */

use async_trait::async_trait;
use reqwest::RequestBuilder;
use serde::de::DeserializeOwned;
use std::fmt::Debug;
use url::Url;

use crate::errors::ProviderError;

/// Common trait for all LLM providers
///
/// This trait defines the interface that all provider implementations must follow,
/// allowing them to be used interchangeably in the translation service.
#[async_trait]
pub trait Provider: Send + Sync + Debug {
    /// The request type for this provider
    type Request: Send + Sync;

    /// The response type for this provider
    type Response: Send + Sync;

    /// Complete a request using this provider
    ///
    /// # Arguments
    /// * `request` - The request to complete
    ///
    /// # Returns
    /// * `Result<Self::Response, ProviderError>` - The response from the provider or an error
    async fn complete(&self, request: Self::Request) -> Result<Self::Response, ProviderError>;

    /// Extract text from the provider response
    fn extract_text(response: &Self::Response) -> String;
}

/// Resolve `path` below a configured base endpoint.
///
/// The base keeps all of its path segments (`https://host/v1` + `chat/completions`
/// gives `https://host/v1/chat/completions`); a missing scheme defaults to http.
pub fn endpoint_url(base: &str, path: &str) -> Result<Url, ProviderError> {
    let trimmed = base.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        return Err(ProviderError::RequestFailed("Endpoint cannot be empty".to_string()));
    }

    let with_scheme = if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        format!("{}/", trimmed)
    } else {
        format!("http://{}/", trimmed)
    };

    Url::parse(&with_scheme)
        .and_then(|url| url.join(path.trim_start_matches('/')))
        .map_err(|e| ProviderError::RequestFailed(format!("Invalid endpoint '{}': {}", base, e)))
}

/// Send a prepared request and decode a JSON body, mapping failures onto [`ProviderError`]
pub(crate) async fn send_json<T: DeserializeOwned>(request: RequestBuilder, provider: &str) -> Result<T, ProviderError> {
    let response = request.send().await.map_err(ProviderError::from_transport)?;

    let status = response.status();
    if !status.is_success() {
        let error_text = response
            .text()
            .await
            .unwrap_or_else(|_| "Failed to get error response text".to_string());
        return Err(ProviderError::from_status(
            status.as_u16(),
            format!("{} API error: {}", provider, error_text),
        ));
    }

    let body = response.text().await.map_err(ProviderError::from_transport)?;
    serde_json::from_str::<T>(&body).map_err(|e| {
        let preview: String = body.chars().take(200).collect();
        ProviderError::ParseError(format!("{} response: {} (body starts with: {})", provider, e, preview))
    })
}

pub mod ollama;
pub mod openai;
pub mod anthropic;
pub mod mock;
