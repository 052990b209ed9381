//! Session page rendering
//!
//! Plain text (extracted text, keyword, messages) is escaped. The highlighted
//! view is inserted as-is so its markup renders.

use std::fmt::Write;

use html_escape::{encode_double_quoted_attribute, encode_text};
use uuid::Uuid;

use crate::imaging::ACCEPTED_EXTENSIONS;
use crate::session::{Phase, Session};

pub const PAGE_TITLE: &str = "Text Scanner and Generator";

/// Everything one render of the session page shows
#[derive(Debug, Default)]
pub struct PageView {
    pub session_id: Uuid,
    pub phase: Phase,
    pub extracted_text: String,
    pub keyword: String,
    pub can_export: bool,
    /// `data:` URI of an image uploaded in this interaction
    pub preview: Option<String>,
    /// Highlighted text when this interaction was a search
    pub highlighted: Option<String>,
    pub errors: Vec<String>,
}

impl PageView {
    pub fn from_session(session: &Session) -> Self {
        Self {
            session_id: session.id,
            phase: session.phase,
            extracted_text: session.extracted_text.clone(),
            keyword: session.keyword.clone(),
            can_export: session.can_export(),
            ..Default::default()
        }
    }

    pub fn with_preview(mut self, preview: String) -> Self {
        self.preview = Some(preview);
        self
    }

    pub fn with_highlighted(mut self, highlighted: String) -> Self {
        self.highlighted = Some(highlighted);
        self
    }

    pub fn with_error(mut self, error: String) -> Self {
        self.errors.push(error);
        self
    }
}

const STYLE: &str = "body{font-family:sans-serif;max-width:48rem;margin:2rem auto;padding:0 1rem}\
.error{background:#fdecea;color:#611a15;padding:.75rem;border-radius:4px;margin:.5rem 0}\
textarea{width:100%;height:200px}\
img{max-width:100%}\
.highlighted{border:1px solid #ddd;padding:.75rem;white-space:pre-wrap}";

/// Render the full page
pub fn render_page(view: &PageView) -> String {
    let base = format!("/s/{}", view.session_id);
    let accept = ACCEPTED_EXTENSIONS
        .iter()
        .map(|ext| format!(".{}", ext))
        .collect::<Vec<_>>()
        .join(",");

    let mut html = String::with_capacity(4096);
    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n");
    let _ = writeln!(html, "<title>{}</title>", PAGE_TITLE);
    let _ = writeln!(html, "<style>{}</style>\n</head>\n<body>", STYLE);
    let _ = writeln!(html, "<h1>{}</h1>", PAGE_TITLE);

    for error in &view.errors {
        let _ = writeln!(html, "<div class=\"error\">{}</div>", encode_text(error));
    }

    let _ = writeln!(
        html,
        "<form method=\"post\" action=\"{}/upload\" enctype=\"multipart/form-data\">\n\
         <label>Upload an image <input type=\"file\" name=\"image\" accept=\"{}\" required></label>\n\
         <button type=\"submit\">Upload</button>\n</form>",
        base, accept
    );

    if let Some(preview) = &view.preview {
        let _ = writeln!(
            html,
            "<figure><img src=\"{}\" alt=\"Uploaded Image\"><figcaption>Uploaded Image</figcaption></figure>",
            encode_double_quoted_attribute(preview)
        );
    }

    if view.phase != Phase::Idle {
        let _ = writeln!(
            html,
            "<label>Extracted Text<textarea readonly>{}</textarea></label>",
            encode_text(&view.extracted_text)
        );

        let _ = writeln!(
            html,
            "<form method=\"post\" action=\"{}/search\">\n\
             <label>Enter a keyword <input type=\"text\" name=\"keyword\" value=\"{}\"></label>\n\
             <button type=\"submit\">Search</button>\n</form>",
            base,
            encode_double_quoted_attribute(&view.keyword)
        );

        if let Some(highlighted) = &view.highlighted {
            let _ = writeln!(html, "<div class=\"highlighted\">{}</div>", highlighted);
        }
    }

    if view.can_export {
        let _ = writeln!(
            html,
            "<p><a href=\"{}/download\" download=\"{}\">Download Text as JSON</a></p>",
            base,
            crate::export::EXPORT_FILE_NAME
        );
    }

    html.push_str("</body>\n</html>\n");
    html
}
