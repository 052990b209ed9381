//! Interaction controller
//!
//! Applies user actions to a session:
//!
//! ```text
//! Idle --upload--> Extracted --search--> Searched
//!                     ^                     |
//!                     +-------upload--------+
//! ```
//!
//! Uploads always land in `Extracted`, even when OCR fails (the stored text is
//! then empty). Uploads that cannot be decoded leave the session untouched.
//! The keyword is never reset by an upload.

use serde::Serialize;

use crate::export::{ExportDocument, ExportPayload};
use crate::highlight::{count_matches, highlight};
use crate::imaging::{decode_upload, ImageError};
use crate::ocr::{Extraction, TextExtractor};
use crate::session::{Phase, Session};

/// Result of a successful upload
#[derive(Debug, Clone, Serialize)]
pub struct UploadOutcome {
    pub file_name: String,
    pub width: u32,
    pub height: u32,
    /// `data:` URI of the uploaded image
    #[serde(skip)]
    pub preview: String,
    pub extraction: Extraction,
}

/// Result of a search
#[derive(Debug, Clone, Serialize)]
pub struct SearchOutcome {
    pub keyword: String,
    /// Extracted text with matches wrapped in markup
    pub highlighted: String,
    pub matches: usize,
}

/// User-facing message for an upload that could not be processed
pub fn upload_error_message(error: impl std::fmt::Display) -> String {
    format!("An error occurred while processing the image: {}", error)
}

/// Drives sessions through upload, search and export
#[derive(Clone)]
pub struct Controller {
    extractor: TextExtractor,
}

impl Controller {
    pub fn new(extractor: TextExtractor) -> Self {
        Self { extractor }
    }

    pub fn extractor(&self) -> &TextExtractor {
        &self.extractor
    }

    /// Decode an upload, extract its text and store it in the session
    pub async fn upload(
        &self,
        session: &mut Session,
        file_name: &str,
        bytes: &[u8],
    ) -> Result<UploadOutcome, ImageError> {
        let upload = decode_upload(file_name, bytes).map_err(|e| {
            tracing::warn!(session_id = %session.id, file_name = %file_name, "Upload rejected: {}", e);
            e
        })?;

        let extraction = self.extractor.extract(&upload.image).await;

        session.extracted_text = extraction.text.clone();
        session.phase = Phase::Extracted;

        tracing::info!(
            session_id = %session.id,
            file_name = %file_name,
            fragments = extraction.fragments.len(),
            chars = extraction.text.chars().count(),
            failed = extraction.is_failure(),
            "Image processed"
        );

        Ok(UploadOutcome {
            file_name: upload.file_name,
            width: upload.image.width(),
            height: upload.image.height(),
            preview: upload.preview,
            extraction,
        })
    }

    /// Replace the session keyword
    pub fn set_keyword(&self, session: &mut Session, keyword: impl Into<String>) {
        session.keyword = keyword.into();
    }

    /// Highlight the current keyword in the stored text
    pub fn search(&self, session: &mut Session) -> SearchOutcome {
        let outcome = SearchOutcome {
            keyword: session.keyword.clone(),
            highlighted: highlight(&session.extracted_text, &session.keyword),
            matches: count_matches(&session.extracted_text, &session.keyword),
        };

        // Nothing to search before the first upload
        if session.phase != Phase::Idle {
            session.phase = Phase::Searched;
        }

        tracing::debug!(
            session_id = %session.id,
            matches = outcome.matches,
            "Search complete"
        );
        outcome
    }

    /// Build the JSON download, or `None` when there is no text yet
    pub fn export(&self, session: &Session) -> Result<Option<ExportDocument>, serde_json::Error> {
        if !session.can_export() {
            return Ok(None);
        }
        ExportPayload::new(session.extracted_text.clone())
            .into_document()
            .map(Some)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::export::ExportPayload;
    use crate::highlight::{HIGHLIGHT_CLOSE, HIGHLIGHT_OPEN};
    use crate::imaging::png_bytes;
    use crate::ocr::{MockProvider, OcrProviderTrait, OcrService};

    fn controller(provider: MockProvider) -> Controller {
        let provider: Arc<dyn OcrProviderTrait> = Arc::new(provider);
        let service = OcrService::with_providers(vec![provider], vec!["en".to_string()]);
        Controller::new(TextExtractor::new(Arc::new(service)))
    }

    #[tokio::test]
    async fn test_invoice_end_to_end() {
        let controller = controller(MockProvider::with_texts(&["INVOICE", "2024"]));
        let mut session = Session::new();

        let outcome = controller
            .upload(&mut session, "invoice.png", &png_bytes(10, 10))
            .await
            .unwrap();
        assert_eq!(outcome.extraction.text, "INVOICE 2024");
        assert_eq!(session.extracted_text, "INVOICE 2024");
        assert_eq!(session.phase, Phase::Extracted);

        controller.set_keyword(&mut session, "invoice");
        let search = controller.search(&mut session);

        assert_eq!(
            search.highlighted,
            format!("{}INVOICE{} 2024", HIGHLIGHT_OPEN, HIGHLIGHT_CLOSE)
        );
        assert_eq!(search.matches, 1);
        assert_eq!(session.phase, Phase::Searched);
        // Searching never changes the stored text
        assert_eq!(session.extracted_text, "INVOICE 2024");
    }

    #[tokio::test]
    async fn test_extraction_failure_still_moves_forward() {
        let controller = controller(MockProvider::failing("engine crashed"));
        let mut session = Session::new();
        session.extracted_text = "previous".to_string();

        let outcome = controller
            .upload(&mut session, "scan.jpg", &png_bytes(4, 4))
            .await
            .unwrap();

        assert!(outcome.extraction.is_failure());
        assert_eq!(session.extracted_text, "");
        assert_eq!(session.phase, Phase::Extracted);
        assert!(controller.export(&session).unwrap().is_none());
    }

    #[tokio::test]
    async fn test_decode_failure_leaves_session_untouched() {
        let controller = controller(MockProvider::with_texts(&["ignored"]));
        let mut session = Session::new();
        session.extracted_text = "kept".to_string();
        session.keyword = "ke".to_string();
        session.phase = Phase::Searched;

        let err = controller
            .upload(&mut session, "scan.png", b"garbage")
            .await
            .unwrap_err();
        assert!(upload_error_message(&err).starts_with("An error occurred while processing the image:"));

        let err = controller
            .upload(&mut session, "scan.bmp", &png_bytes(4, 4))
            .await
            .unwrap_err();
        assert!(matches!(err, ImageError::UnsupportedType(_)));

        assert_eq!(session.extracted_text, "kept");
        assert_eq!(session.keyword, "ke");
        assert_eq!(session.phase, Phase::Searched);
    }

    #[tokio::test]
    async fn test_new_upload_keeps_keyword_and_resets_phase() {
        let controller = controller(MockProvider::with_texts(&["Total", "due"]));
        let mut session = Session::new();

        controller
            .upload(&mut session, "a.png", &png_bytes(4, 4))
            .await
            .unwrap();
        controller.set_keyword(&mut session, "due");
        controller.search(&mut session);
        assert_eq!(session.phase, Phase::Searched);

        controller
            .upload(&mut session, "b.png", &png_bytes(4, 4))
            .await
            .unwrap();
        assert_eq!(session.phase, Phase::Extracted);
        assert_eq!(session.keyword, "due");
    }

    #[test]
    fn test_search_before_upload_stays_idle() {
        let controller = controller(MockProvider::with_texts(&[]));
        let mut session = Session::new();
        controller.set_keyword(&mut session, "anything");

        let search = controller.search(&mut session);

        assert_eq!(search.highlighted, "");
        assert_eq!(search.matches, 0);
        assert_eq!(session.phase, Phase::Idle);
    }

    #[test]
    fn test_export_available_in_any_phase_with_text() {
        let controller = controller(MockProvider::with_texts(&[]));
        let mut session = Session::new();
        assert!(controller.export(&session).unwrap().is_none());

        session.extracted_text = "hello世界".to_string();
        for phase in [Phase::Idle, Phase::Extracted, Phase::Searched] {
            session.phase = phase;
            let document = controller.export(&session).unwrap().unwrap();
            let payload: ExportPayload = serde_json::from_str(&document.body).unwrap();
            assert_eq!(payload.extracted_text, "hello世界");
        }
    }
}
