use std::time::Duration;
use async_trait::async_trait;
use serde::{Serialize, Deserialize};
use reqwest::Client;
use log::{debug, error};

use crate::errors::ProviderError;
use super::{TranslateOptions, Translator};

/// DeepL free-tier endpoint
pub const DEEPL_FREE_ENDPOINT: &str = "https://api-free.deepl.com/v2/translate";

// @const: Targets for which DeepL accepts a formality setting
const FORMALITY_LANGUAGES: &[&str] = &["DE", "FR", "IT", "ES", "NL", "PL", "PT-PT", "PT-BR", "RU", "JA"];

/// DeepL client
pub struct DeepL {
    /// HTTP client for API requests
    client: Client,
    /// API key for authentication
    api_key: String,
    /// Translate endpoint URL
    endpoint: String,
    /// Request timeout in seconds
    timeout_secs: u64,
}

/// DeepL translate request body
#[derive(Debug, Serialize)]
pub struct DeepLRequest<'a> {
    text: Vec<&'a str>,
    target_lang: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    source_lang: Option<String>,
    /// Sentence splitting stays off, the merged sentences are authoritative
    split_sentences: &'static str,
    preserve_formatting: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    formality: Option<String>,
}

/// DeepL translate response body
#[derive(Debug, Deserialize)]
pub struct DeepLResponse {
    pub translations: Vec<DeepLTranslation>,
}

#[derive(Debug, Deserialize)]
pub struct DeepLTranslation {
    pub text: String,
    #[serde(default)]
    pub detected_source_language: Option<String>,
}

impl<'a> DeepLRequest<'a> {
    /// Build the request body for non-empty `texts`
    pub fn build(texts: Vec<&'a str>, options: &TranslateOptions) -> Self {
        let target_lang = options.target_language.trim().to_uppercase();
        let source_lang = options
            .source_language
            .as_deref()
            .map(|s| s.trim().to_uppercase())
            .filter(|s| !s.is_empty() && s != "AUTO" && s != "UNKNOWN")
            .map(|s| s.split('-').next().unwrap_or_default().to_string());
        let formality = options
            .formality
            .as_deref()
            .filter(|f| *f != "default" && FORMALITY_LANGUAGES.contains(&target_lang.as_str()))
            .map(str::to_string);

        Self {
            text: texts,
            target_lang,
            source_lang,
            split_sentences: "0",
            preserve_formatting: options.preserve_formatting,
            formality,
        }
    }
}

impl std::fmt::Debug for DeepL {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeepL")
            .field("endpoint", &self.endpoint)
            .field("timeout_secs", &self.timeout_secs)
            .finish_non_exhaustive()
    }
}

impl DeepL {
    /// Create a new DeepL client. An empty endpoint means the free-tier endpoint.
    pub fn new(api_key: impl Into<String>, endpoint: impl Into<String>, timeout_secs: u64) -> Self {
        let endpoint = endpoint.into();
        Self {
            client: Client::builder()
                .timeout(Duration::from_secs(timeout_secs))
                .build()
                .unwrap_or_default(),
            api_key: api_key.into(),
            endpoint: if endpoint.is_empty() { DEEPL_FREE_ENDPOINT.to_string() } else { endpoint },
            timeout_secs,
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn request(&self, body: &DeepLRequest<'_>) -> Result<DeepLResponse, ProviderError> {
        if self.api_key.trim().is_empty() {
            return Err(ProviderError::AuthenticationError(
                "DeepL API key required, set translation.api_key or DEEPL_API_KEY".to_string(),
            ));
        }

        let response = self.client.post(&self.endpoint)
            .header("Authorization", format!("DeepL-Auth-Key {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ProviderError::Timeout(self.timeout_secs)
                } else {
                    ProviderError::RequestFailed(format!("Failed to send request to DeepL API: {}", e))
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await
                .unwrap_or_else(|_| "Failed to get error response text".to_string());
            error!("DeepL API error ({}): {}", status, error_text);
            return Err(match status.as_u16() {
                401 | 403 => ProviderError::AuthenticationError(format!("DeepL API Error {}: {}", status.as_u16(), error_text)),
                code => ProviderError::ApiError { status_code: code, message: error_text },
            });
        }

        response.json::<DeepLResponse>().await
            .map_err(|e| ProviderError::ParseError(format!("Failed to parse DeepL API response: {}", e)))
    }
}

#[async_trait]
impl Translator for DeepL {
    async fn translate(&self, texts: &[String], options: &TranslateOptions) -> Result<Vec<String>, ProviderError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        // Empty inputs are not sent; their slots stay empty
        let positions: Vec<usize> = texts.iter()
            .enumerate()
            .filter(|(_, t)| !t.trim().is_empty())
            .map(|(i, _)| i)
            .collect();
        let mut translated = vec![String::new(); texts.len()];
        if positions.is_empty() {
            return Ok(translated);
        }

        let body = DeepLRequest::build(positions.iter().map(|&i| texts[i].as_str()).collect(), options);
        let response = self.request(&body).await?;

        if response.translations.len() != positions.len() {
            return Err(ProviderError::ResponseMismatch {
                expected: positions.len(),
                received: response.translations.len(),
            });
        }

        for (position, translation) in positions.into_iter().zip(response.translations) {
            if let Some(detected) = &translation.detected_source_language {
                debug!("DeepL detected source language {} for text {}", detected, position);
            }
            translated[position] = translation.text;
        }

        Ok(translated)
    }

    async fn test_connection(&self) -> Result<(), ProviderError> {
        let options = TranslateOptions::new("TR");
        let result = self.translate(&["Hello".to_string()], &options).await?;
        debug!("DeepL connection test: 'Hello' -> '{}'", result.first().map(String::as_str).unwrap_or_default());
        Ok(())
    }

    fn name(&self) -> &str {
        "DeepL"
    }
}
