//! OCR Types
//!
//! Defines the fragments returned by OCR engines and the errors they raise.

use serde::{Deserialize, Serialize};

/// OCR provider type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OcrProvider {
    /// Tesseract OCR (local CLI)
    Tesseract,
    /// Ollama vision model (local LLM)
    Ollama,
}

impl Default for OcrProvider {
    fn default() -> Self {
        Self::Tesseract
    }
}

/// Pixel-based bounding box of a recognized region
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Region {
    pub left: u32,
    pub top: u32,
    pub width: u32,
    pub height: u32,
}

impl Region {
    /// Smallest region covering both `self` and `other`
    pub fn union(&self, other: &Region) -> Region {
        let left = self.left.min(other.left);
        let top = self.top.min(other.top);
        let right = (self.left + self.width).max(other.left + other.width);
        let bottom = (self.top + self.height).max(other.top + other.height);
        Region {
            left,
            top,
            width: right - left,
            height: bottom - top,
        }
    }
}

/// One recognized text region
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OcrFragment {
    /// Bounding box in image pixels
    pub region: Region,
    /// Recognized text
    pub text: String,
    /// Confidence score (0-100)
    pub confidence: f32,
}

impl OcrFragment {
    pub fn new(region: Region, text: impl Into<String>, confidence: f32) -> Self {
        Self {
            region,
            text: text.into(),
            confidence,
        }
    }
}

/// OCR error types
#[derive(Debug, thiserror::Error)]
pub enum OcrError {
    #[error("OCR provider not available: {0}")]
    ProviderNotAvailable(String),

    #[error("Failed to prepare image: {0}")]
    ImageEncodingError(String),

    #[error("OCR processing failed: {0}")]
    ProcessingError(String),

    #[error("API error: {0}")]
    ApiError(String),
}

/// Map ISO 639-1 codes to Tesseract's traineddata names. Unknown codes pass
/// through so `OCR_LANGUAGES=deu` works as-is.
pub fn tesseract_language(code: &str) -> &str {
    match code {
        "en" => "eng",
        "hi" => "hin",
        "fr" => "fra",
        "de" => "deu",
        "es" => "spa",
        "it" => "ita",
        "pt" => "por",
        "ru" => "rus",
        "ja" => "jpn",
        "zh" => "chi_sim",
        "ar" => "ara",
        "bn" => "ben",
        other => other,
    }
}

/// Human-readable language name used in prompts
pub fn language_name(code: &str) -> &str {
    match code {
        "en" => "English",
        "hi" => "Hindi",
        "fr" => "French",
        "de" => "German",
        "es" => "Spanish",
        "it" => "Italian",
        "pt" => "Portuguese",
        "ru" => "Russian",
        "ja" => "Japanese",
        "zh" => "Chinese",
        "ar" => "Arabic",
        "bn" => "Bengali",
        other => other,
    }
}
