//! Text extraction
//!
//! Best-effort wrapper over the OCR service: recognition failures become an
//! empty text plus a user-facing message, never an error.

use std::sync::Arc;

use image::DynamicImage;
use serde::Serialize;

use super::service::OcrService;
use super::types::OcrFragment;

/// Outcome of one extraction attempt
#[derive(Debug, Clone, Default, Serialize)]
pub struct Extraction {
    /// Fragment texts joined by single spaces
    pub text: String,
    /// Fragments as returned by the engine
    pub fragments: Vec<OcrFragment>,
    /// User-facing error message when recognition failed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Extraction {
    pub fn is_failure(&self) -> bool {
        self.error.is_some()
    }
}

/// Converts decoded images into text using the shared OCR service
#[derive(Clone)]
pub struct TextExtractor {
    ocr: Arc<OcrService>,
}

impl TextExtractor {
    pub fn new(ocr: Arc<OcrService>) -> Self {
        Self { ocr }
    }

    /// The underlying OCR service
    pub fn ocr(&self) -> &OcrService {
        &self.ocr
    }

    /// Extract the text of an image
    pub async fn extract(&self, image: &DynamicImage) -> Extraction {
        match self.ocr.read_text(image).await {
            Ok(fragments) => Extraction {
                text: join_fragments(&fragments),
                fragments,
                error: None,
            },
            Err(e) => {
                tracing::warn!("Text extraction failed: {}", e);
                Extraction {
                    text: String::new(),
                    fragments: Vec::new(),
                    error: Some(format!("Error during text extraction: {}", e)),
                }
            }
        }
    }
}

/// Concatenate fragment texts in engine order, separated by single spaces
pub fn join_fragments(fragments: &[OcrFragment]) -> String {
    fragments
        .iter()
        .map(|f| f.text.as_str())
        .collect::<Vec<_>>()
        .join(" ")
}
