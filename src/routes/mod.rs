//! Route modules for Text Scanner

use axum::{
    body::Bytes,
    extract::{DefaultBodyLimit, Multipart},
    http::header,
    response::{IntoResponse, Response},
    Router,
};

use crate::error::{AppError, Result};
use crate::export::ExportDocument;
use crate::state::AppState;

pub mod health;
pub mod pages;
pub mod sessions;

/// Multipart field carrying the image
pub const IMAGE_FIELD: &str = "image";

/// Build the application router (without transport layers)
pub fn app(state: AppState) -> Router {
    let body_limit = state.config().server.max_upload_bytes;

    Router::new()
        .merge(health::router())
        .merge(pages::router())
        .nest("/api/v1", sessions::router())
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}

/// Read the uploaded image's file name and bytes from a multipart body
pub(crate) async fn read_image_field(mut multipart: Multipart) -> Result<(String, Bytes)> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(IMAGE_FIELD) {
            continue;
        }
        let file_name = field.file_name().unwrap_or_default().to_string();
        let bytes = field.bytes().await?;
        return Ok((file_name, bytes));
    }

    Err(AppError::BadRequest(format!(
        "Missing multipart field '{}'",
        IMAGE_FIELD
    )))
}

/// Turn an export into a file download
pub(crate) fn download_response(document: ExportDocument) -> Response {
    (
        [
            (header::CONTENT_TYPE, document.mime_type.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", document.file_name),
            ),
        ],
        document.body,
    )
        .into_response()
}
