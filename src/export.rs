//! JSON export of extracted text

use serde::{Deserialize, Serialize};

/// Download file name
pub const EXPORT_FILE_NAME: &str = "extracted_text.json";

/// Download MIME type
pub const EXPORT_MIME_TYPE: &str = "application/json";

/// The exported JSON document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportPayload {
    pub extracted_text: String,
}

/// A ready-to-download export
#[derive(Debug, Clone)]
pub struct ExportDocument {
    pub file_name: &'static str,
    pub mime_type: &'static str,
    /// UTF-8 JSON body
    pub body: String,
}

impl ExportPayload {
    pub fn new(extracted_text: impl Into<String>) -> Self {
        Self {
            extracted_text: extracted_text.into(),
        }
    }

    /// Serialize as compact JSON. Non-ASCII characters are written as-is.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn into_document(self) -> Result<ExportDocument, serde_json::Error> {
        Ok(ExportDocument {
            file_name: EXPORT_FILE_NAME,
            mime_type: EXPORT_MIME_TYPE,
            body: self.to_json()?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_shape() {
        let json = ExportPayload::new("INVOICE 2024").to_json().unwrap();
        assert_eq!(json, r#"{"extracted_text":"INVOICE 2024"}"#);
    }

    #[test]
    fn test_non_ascii_preserved() {
        let json = ExportPayload::new("hello世界").to_json().unwrap();
        assert!(json.contains("hello世界"));
        assert!(!json.contains("\\u"));

        let parsed: ExportPayload = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.extracted_text, "hello世界");
    }

    #[test]
    fn test_special_characters_escaped_as_json() {
        let text = "line \"one\"\nline <two>";
        let document = ExportPayload::new(text).into_document().unwrap();

        assert_eq!(document.file_name, "extracted_text.json");
        assert_eq!(document.mime_type, "application/json");
        let value: serde_json::Value = serde_json::from_str(&document.body).unwrap();
        assert_eq!(value["extracted_text"], text);
    }
}
