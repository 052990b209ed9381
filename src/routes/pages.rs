//! Interactive page routes
//!
//! Every interaction re-renders the whole session page:
//! - GET /                  - Start a session, redirect to its page
//! - GET /s/:id             - Render the session page
//! - POST /s/:id/upload     - Upload an image (multipart field `image`)
//! - POST /s/:id/search     - Store the keyword and highlight it
//! - GET /s/:id/download    - Download the extracted text as JSON
//!
//! Unknown or expired sessions are sent back to `/` for a fresh one.

use axum::{
    extract::{Multipart, Path, State},
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
    Form, Router,
};
use serde::Deserialize;

use super::{download_response, read_image_field};
use crate::controller::upload_error_message;
use crate::error::{AppError, Result};
use crate::html::{render_page, PageView};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(start_session))
        .route("/s/:session_id", get(show_page))
        .route("/s/:session_id/upload", post(upload_image))
        .route("/s/:session_id/search", post(search))
        .route("/s/:session_id/download", get(download))
}

fn restart() -> Response {
    Redirect::to("/").into_response()
}

/// GET /
async fn start_session(State(state): State<AppState>) -> Redirect {
    let id = state.sessions().create().await;
    Redirect::to(&format!("/s/{}", id))
}

/// GET /s/:session_id
async fn show_page(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Response {
    let Some(session) = state.sessions().lock_by_str(&session_id).await else {
        return restart();
    };

    Html(render_page(&PageView::from_session(&session))).into_response()
}

/// POST /s/:session_id/upload
async fn upload_image(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    multipart: Multipart,
) -> Response {
    let Some(mut session) = state.sessions().lock_by_str(&session_id).await else {
        return restart();
    };

    // Unreadable bodies (too large, truncated, no image field) are shown on
    // the page like any other upload failure
    let (file_name, bytes) = match read_image_field(multipart).await {
        Ok(field) => field,
        Err(e) => {
            tracing::warn!(session_id = %session.id, "Upload could not be read: {}", e);
            let view = PageView::from_session(&session).with_error(upload_error_message(&e));
            return Html(render_page(&view)).into_response();
        }
    };

    let view = match state
        .controller()
        .upload(&mut session, &file_name, &bytes)
        .await
    {
        Ok(outcome) => {
            let view = PageView::from_session(&session).with_preview(outcome.preview);
            match outcome.extraction.error {
                Some(error) => view.with_error(error),
                None => view,
            }
        }
        Err(e) => PageView::from_session(&session).with_error(upload_error_message(&e)),
    };

    Html(render_page(&view)).into_response()
}

#[derive(Debug, Deserialize)]
struct SearchForm {
    #[serde(default)]
    keyword: String,
}

/// POST /s/:session_id/search
async fn search(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    Form(form): Form<SearchForm>,
) -> Response {
    let Some(mut session) = state.sessions().lock_by_str(&session_id).await else {
        return restart();
    };

    let controller = state.controller();
    controller.set_keyword(&mut session, form.keyword);
    let outcome = controller.search(&mut session);

    let view = PageView::from_session(&session).with_highlighted(outcome.highlighted);
    Html(render_page(&view)).into_response()
}

/// GET /s/:session_id/download
async fn download(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<Response> {
    let Some(session) = state.sessions().lock_by_str(&session_id).await else {
        return Ok(restart());
    };

    match state.controller().export(&session)? {
        Some(document) => Ok(download_response(document)),
        None => Err(AppError::Conflict("No extracted text to download".to_string())),
    }
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use axum_test::TestServer;

    use crate::imaging::png_bytes;
    use crate::ocr::MockProvider;
    use crate::routes::app;
    use crate::config::Config;
    use crate::routes::tests::{multipart_body, multipart_field_body};
    use crate::state::test_support::{state_with, state_with_config};

    fn server(provider: MockProvider) -> TestServer {
        TestServer::new(app(state_with(provider))).unwrap()
    }

    async fn new_session(server: &TestServer) -> String {
        let response = server.get("/").await;
        response.assert_status(StatusCode::SEE_OTHER);
        let location = response.header("location");
        location.to_str().unwrap().to_string()
    }

    async fn upload(server: &TestServer, page: &str, file_name: &str, bytes: &[u8]) -> String {
        let (content_type, body) = multipart_body(file_name, bytes);
        let response = server
            .post(&format!("{}/upload", page))
            .content_type(&content_type)
            .bytes(body.into())
            .await;
        response.assert_status_ok();
        response.text()
    }

    #[tokio::test]
    async fn test_start_session_redirects_to_page() {
        let server = server(MockProvider::with_texts(&[]));
        let page = new_session(&server).await;
        assert!(page.starts_with("/s/"));

        let response = server.get(&page).await;
        response.assert_status_ok();
        assert!(response.text().contains("Text Scanner and Generator"));
    }

    #[tokio::test]
    async fn test_unknown_session_restarts() {
        let server = server(MockProvider::with_texts(&[]));
        let response = server.get("/s/not-a-session").await;
        response.assert_status(StatusCode::SEE_OTHER);
    }

    #[tokio::test]
    async fn test_upload_search_download_flow() {
        let server = server(MockProvider::with_texts(&["INVOICE", "2024"]));
        let page = new_session(&server).await;

        let html = upload(&server, &page, "invoice.png", &png_bytes(8, 8)).await;
        assert!(html.contains("INVOICE 2024"));
        assert!(html.contains("data:image/png;base64,"));
        assert!(html.contains("Download Text as JSON"));

        let response = server
            .post(&format!("{}/search", page))
            .form(&[("keyword", "invoice")])
            .await;
        response.assert_status_ok();
        assert!(response
            .text()
            .contains(r#"<span style="color:red; font-weight:bold;">INVOICE</span> 2024"#));

        let response = server.get(&format!("{}/download", page)).await;
        response.assert_status_ok();
        assert_eq!(response.header("content-type"), "application/json");
        assert_eq!(
            response.header("content-disposition"),
            "attachment; filename=\"extracted_text.json\""
        );
        assert_eq!(response.text(), r#"{"extracted_text":"INVOICE 2024"}"#);
    }

    #[tokio::test]
    async fn test_extraction_failure_shows_error() {
        let server = server(MockProvider::failing("engine crashed"));
        let page = new_session(&server).await;

        let html = upload(&server, &page, "scan.png", &png_bytes(8, 8)).await;
        assert!(html.contains("Error during text extraction"));
        assert!(!html.contains("Download Text as JSON"));

        let response = server.get(&format!("{}/download", page)).await;
        response.assert_status(StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn test_bad_upload_shows_error() {
        let server = server(MockProvider::with_texts(&["unused"]));
        let page = new_session(&server).await;

        let html = upload(&server, &page, "notes.txt", b"plain text").await;
        assert!(html.contains("An error occurred while processing the image"));
        assert!(!html.contains("Extracted Text"));
    }

    #[tokio::test]
    async fn test_oversized_upload_shows_error() {
        let mut config = Config::default();
        config.server.max_upload_bytes = 1024;
        let server = TestServer::new(app(state_with_config(
            MockProvider::with_texts(&["unused"]),
            config,
        )))
        .unwrap();
        let page = new_session(&server).await;

        let html = upload(&server, &page, "large.png", &vec![0x89; 4096]).await;
        assert!(html.contains("An error occurred while processing the image"));
        assert!(!html.contains("Extracted Text"));

        // The session is still usable afterwards
        let html = upload(&server, &page, "small.png", &png_bytes(4, 4)).await;
        assert!(html.contains("unused"));
    }

    #[tokio::test]
    async fn test_missing_image_field_shows_error() {
        let server = server(MockProvider::with_texts(&["unused"]));
        let page = new_session(&server).await;

        let (content_type, body) = multipart_field_body("document", "scan.png", &png_bytes(4, 4));
        let response = server
            .post(&format!("{}/upload", page))
            .content_type(&content_type)
            .bytes(body.into())
            .await;
        response.assert_status_ok();

        let html = response.text();
        assert!(html.contains("An error occurred while processing the image"));
        assert!(!html.contains("Extracted Text"));
    }
}
