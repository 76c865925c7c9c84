/*!
 * Core translation service implementation.
 *
 * This module contains the [`Translator`] seam used by the batch layer and the
 * [`TranslationService`] that fulfils it with one of the configured AI providers.
 */

use anyhow::Result;
use async_trait::async_trait;
use log::{debug, warn};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::app_config::{TranslationConfig, TranslationProvider as ConfigTranslationProvider};
use crate::errors::{ProviderError, TranslationError};
use crate::language_utils;
use crate::providers::anthropic::{Anthropic, AnthropicRequest};
use crate::providers::mock::{MockProvider, MockRequest};
use crate::providers::ollama::{ChatRequest, Ollama};
use crate::providers::openai::{OpenAI, OpenAIRequest};
use crate::providers::Provider;
use super::prompts;

/// Upper bound on generated tokens for providers that require one
const DEFAULT_MAX_TOKENS: u32 = 4096;

/// Anything that can turn an ordered batch of texts into translated texts.
///
/// The result may hold fewer or more items than the input; the batch layer
/// is responsible for aligning it.
#[async_trait]
pub trait Translator: Send + Sync {
    /// Translate a batch of texts, keeping their order
    async fn translate_batch(&self, texts: &[String]) -> Result<Vec<String>, TranslationError>;
}

/// Translation provider implementation variants
#[derive(Debug)]
enum TranslationProviderImpl {
    /// Ollama LLM service
    Ollama {
        /// Client instance
        client: Ollama,
    },

    /// OpenAI API service
    OpenAI {
        /// Client instance
        client: OpenAI,
    },

    /// LM Studio local server (OpenAI-compatible)
    LMStudio {
        /// Client instance (OpenAI-compatible)
        client: OpenAI,
    },

    /// Anthropic API service
    Anthropic {
        /// Client instance
        client: Anthropic,
    },

    /// In-process mock
    Mock {
        /// Client instance
        client: MockProvider,
    },
}

/// Main translation service for subtitle translation
#[derive(Debug)]
pub struct TranslationService {
    /// Provider implementation
    provider: TranslationProviderImpl,

    /// Configuration for the translation service
    pub config: TranslationConfig,

    /// System prompt with the language names filled in
    system_prompt: String,

    /// Once set, no further request or retry is started
    cancel_flag: Option<Arc<AtomicBool>>,
}

impl TranslationService {
    /// Create a new translation service for the configured provider
    pub fn new(config: TranslationConfig, source_language: &str, target_language: &str) -> Result<Self> {
        let timeout_secs = config.get_timeout_secs();
        let provider = match config.provider {
            ConfigTranslationProvider::Ollama => TranslationProviderImpl::Ollama {
                client: Ollama::new(config.get_endpoint(), timeout_secs),
            },
            ConfigTranslationProvider::OpenAI => TranslationProviderImpl::OpenAI {
                client: OpenAI::new(config.get_api_key(), config.get_endpoint(), timeout_secs),
            },
            ConfigTranslationProvider::LMStudio => TranslationProviderImpl::LMStudio {
                client: OpenAI::new(config.get_api_key(), config.get_endpoint(), timeout_secs),
            },
            ConfigTranslationProvider::Anthropic => TranslationProviderImpl::Anthropic {
                client: Anthropic::new(config.get_api_key(), config.get_endpoint(), timeout_secs),
            },
        };

        Self::with_provider(provider, config, source_language, target_language)
    }

    /// Create a translation service backed by an in-process mock provider
    pub fn with_mock(
        client: MockProvider,
        config: TranslationConfig,
        source_language: &str,
        target_language: &str,
    ) -> Result<Self> {
        Self::with_provider(TranslationProviderImpl::Mock { client }, config, source_language, target_language)
    }

    fn with_provider(
        provider: TranslationProviderImpl,
        config: TranslationConfig,
        source_language: &str,
        target_language: &str,
    ) -> Result<Self> {
        let source_name = language_utils::get_language_name(source_language)?;
        let target_name = language_utils::get_language_name(target_language)?;
        let system_prompt = prompts::render_system_prompt(&config.common.system_prompt, &source_name, &target_name);

        Ok(Self {
            provider,
            config,
            system_prompt,
            cancel_flag: None,
        })
    }

    /// Stop retrying once `flag` is set
    pub fn with_cancel_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel_flag = Some(flag);
        self
    }

    fn is_cancelled(&self) -> bool {
        self.cancel_flag
            .as_ref()
            .map_or(false, |flag| flag.load(Ordering::SeqCst))
    }

    /// The rendered system prompt sent with every request
    pub fn system_prompt(&self) -> &str {
        &self.system_prompt
    }

    /// Access the mock provider when the service is backed by one
    pub fn mock_provider(&self) -> Option<&MockProvider> {
        match &self.provider {
            TranslationProviderImpl::Mock { client } => Some(client),
            _ => None,
        }
    }

    /// Send one numbered user message and return the raw reply text
    async fn complete_once(&self, user_message: &str) -> Result<String, ProviderError> {
        let model = self.config.get_model();
        let temperature = self.config.common.temperature;

        match &self.provider {
            TranslationProviderImpl::Ollama { client } => {
                let request = ChatRequest::new(model)
                    .add_message("system", &self.system_prompt)
                    .add_message("user", user_message)
                    .temperature(temperature);
                let response = client.complete(request).await?;
                Ok(Ollama::extract_text(&response))
            }
            TranslationProviderImpl::OpenAI { client } | TranslationProviderImpl::LMStudio { client } => {
                let request = OpenAIRequest::new(model)
                    .add_message("system", &self.system_prompt)
                    .add_message("user", user_message)
                    .temperature(temperature)
                    .max_tokens(DEFAULT_MAX_TOKENS);
                let response = client.complete(request).await?;
                Ok(OpenAI::extract_text(&response))
            }
            TranslationProviderImpl::Anthropic { client } => {
                let request = AnthropicRequest::new(model, DEFAULT_MAX_TOKENS)
                    .system(&self.system_prompt)
                    .add_message("user", user_message)
                    .temperature(temperature);
                let response = client.complete(request).await?;
                Ok(Anthropic::extract_text(&response))
            }
            TranslationProviderImpl::Mock { client } => {
                let request = MockRequest {
                    system: self.system_prompt.clone(),
                    prompt: user_message.to_string(),
                };
                let response = client.complete(request).await?;
                Ok(MockProvider::extract_text(&response))
            }
        }
    }

    /// Backoff before retry number `attempt` (0-based), doubling each time
    fn backoff_for(&self, attempt: u32) -> Duration {
        let base = self.config.common.retry_backoff_ms;
        Duration::from_millis(base.saturating_mul(1u64 << attempt.min(16)))
    }
}

#[async_trait]
impl Translator for TranslationService {
    async fn translate_batch(&self, texts: &[String]) -> Result<Vec<String>, TranslationError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let user_message = prompts::build_numbered_request(texts);
        let retry_count = self.config.common.retry_count;
        let mut attempt = 0;

        loop {
            if self.is_cancelled() {
                return Err(TranslationError::Cancelled);
            }

            let start_time = Instant::now();
            match self.complete_once(&user_message).await {
                Ok(reply) => {
                    debug!(
                        "{} answered {} entries in {:?}",
                        self.config.provider.display_name(),
                        texts.len(),
                        start_time.elapsed()
                    );
                    if reply.trim().is_empty() {
                        return Err(TranslationError::EmptyResponse);
                    }
                    return Ok(prompts::parse_numbered_response(&reply));
                }
                Err(e) if e.is_retryable() && attempt < retry_count => {
                    if self.is_cancelled() {
                        debug!("Not retrying after cancellation: {}", e);
                        return Err(TranslationError::Cancelled);
                    }
                    let backoff = self.backoff_for(attempt);
                    warn!(
                        "Request to {} failed ({}), retrying in {:?} ({}/{})",
                        self.config.provider.display_name(),
                        e,
                        backoff,
                        attempt + 1,
                        retry_count
                    );
                    tokio::time::sleep(backoff).await;
                    attempt += 1;
                }
                Err(e) => return Err(e.into()),
            }
        }
    }
}

#[async_trait]
impl<T: Translator + ?Sized> Translator for &T {
    async fn translate_batch(&self, texts: &[String]) -> Result<Vec<String>, TranslationError> {
        (**self).translate_batch(texts).await
    }
}

#[async_trait]
impl<T: Translator + ?Sized> Translator for std::sync::Arc<T> {
    async fn translate_batch(&self, texts: &[String]) -> Result<Vec<String>, TranslationError> {
        (**self).translate_batch(texts).await
    }
}
