//! OCR Service
//!
//! Orchestrates OCR providers. Built once at startup and shared by every
//! session.

use std::sync::Arc;

use image::DynamicImage;

use super::{
    provider::{OcrProviderTrait, OllamaProvider, TesseractProvider},
    types::{OcrError, OcrFragment, OcrProvider},
};
use crate::config::OcrConfig;

/// OCR service trying providers in configured order
pub struct OcrService {
    providers: Vec<Arc<dyn OcrProviderTrait>>,
    languages: Vec<String>,
}

impl OcrService {
    /// Create the service from configuration
    pub fn new(config: &OcrConfig) -> Self {
        let providers: Vec<Arc<dyn OcrProviderTrait>> = config
            .providers
            .iter()
            .map(|provider| -> Arc<dyn OcrProviderTrait> {
                match provider {
                    OcrProvider::Tesseract => {
                        Arc::new(TesseractProvider::new(&config.tesseract_cmd))
                    }
                    OcrProvider::Ollama => Arc::new(OllamaProvider::new(
                        &config.ollama_url,
                        &config.ollama_model,
                    )),
                }
            })
            .collect();

        Self::with_providers(providers, config.languages.clone())
    }

    /// Create the service from explicit providers
    pub fn with_providers(providers: Vec<Arc<dyn OcrProviderTrait>>, languages: Vec<String>) -> Self {
        Self {
            providers,
            languages,
        }
    }

    /// Recognition languages
    pub fn languages(&self) -> &[String] {
        &self.languages
    }

    /// Configured providers, in order
    pub fn configured_providers(&self) -> Vec<OcrProvider> {
        self.providers.iter().map(|p| p.provider_type()).collect()
    }

    /// Get available providers
    pub async fn available_providers(&self) -> Vec<OcrProvider> {
        let mut available = Vec::new();
        for provider in &self.providers {
            if provider.is_available().await {
                available.push(provider.provider_type());
            }
        }
        available
    }

    /// Read the text regions of an image with the first provider that succeeds
    pub async fn read_text(&self, image: &DynamicImage) -> Result<Vec<OcrFragment>, OcrError> {
        let mut last_error = None;

        for provider in &self.providers {
            if !provider.is_available().await {
                tracing::debug!("OCR provider {:?} is not available", provider.provider_type());
                continue;
            }

            match provider.read_text(image, &self.languages).await {
                Ok(fragments) => {
                    tracing::debug!(
                        provider = ?provider.provider_type(),
                        fragments = fragments.len(),
                        "OCR complete"
                    );
                    return Ok(fragments);
                }
                Err(e) => {
                    tracing::warn!(
                        "OCR provider {:?} failed: {}, trying next",
                        provider.provider_type(),
                        e
                    );
                    last_error = Some(e);
                }
            }
        }

        Err(last_error.unwrap_or_else(|| {
            OcrError::ProviderNotAvailable("No OCR providers available".to_string())
        }))
    }
}
