//! OCR Module
//!
//! Turns decoded images into text through an external recognizer.
//!
//! Supports multiple backends:
//! - Tesseract (local CLI, requires installation)
//! - Ollama vision models (local LLM)
//!
//! ## Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use text_scanner::config::Config;
//! use text_scanner::ocr::{OcrService, TextExtractor};
//!
//! let config = Config::default();
//! let extractor = TextExtractor::new(Arc::new(OcrService::new(&config.ocr)));
//!
//! let extraction = extractor.extract(&image).await;
//! println!("{}", extraction.text);
//! ```

mod extractor;
mod provider;
mod service;
mod types;

pub use extractor::{join_fragments, Extraction, TextExtractor};
pub use provider::{parse_tsv, OcrProviderTrait, OllamaProvider, TesseractProvider};
pub use service::OcrService;
pub use types::{language_name, tesseract_language, OcrError, OcrFragment, OcrProvider, Region};

#[cfg(test)]
pub(crate) use provider::MockProvider;
