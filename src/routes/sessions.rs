//! Session API routes
//!
//! JSON counterpart of the interactive page.
//!
//! Endpoints:
//! - POST /api/v1/sessions - Start a session
//! - GET /api/v1/sessions/:id - Session snapshot
//! - DELETE /api/v1/sessions/:id - End a session
//! - POST /api/v1/sessions/:id/image - Upload an image and extract its text
//! - PUT /api/v1/sessions/:id/keyword - Set the search keyword
//! - POST /api/v1/sessions/:id/search - Highlight the keyword
//! - GET /api/v1/sessions/:id/export - Download the extracted text as JSON
//! - GET /api/v1/ocr/providers - Configured and available OCR providers

use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::sync::OwnedMutexGuard;
use uuid::Uuid;

use super::{download_response, read_image_field};
use crate::controller::{SearchOutcome, UploadOutcome};
use crate::error::{AppError, Result};
use crate::ocr::OcrProvider;
use crate::session::{Session, SessionSnapshot};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/sessions", post(create_session))
        .route("/sessions/:session_id", get(get_session).delete(delete_session))
        .route("/sessions/:session_id/image", post(upload_image))
        .route("/sessions/:session_id/keyword", put(set_keyword))
        .route("/sessions/:session_id/search", post(search))
        .route("/sessions/:session_id/export", get(export))
        .route("/ocr/providers", get(list_providers))
}

async fn lock_session(state: &AppState, id: Uuid) -> Result<OwnedMutexGuard<Session>> {
    state
        .sessions()
        .lock(id)
        .await
        .ok_or_else(|| AppError::session_not_found(id))
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CreateSessionResponse {
    pub id: Uuid,
}

/// POST /api/v1/sessions
async fn create_session(State(state): State<AppState>) -> (StatusCode, Json<CreateSessionResponse>) {
    let id = state.sessions().create().await;
    (StatusCode::CREATED, Json(CreateSessionResponse { id }))
}

/// GET /api/v1/sessions/:session_id
async fn get_session(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> Result<Json<SessionSnapshot>> {
    let session = lock_session(&state, session_id).await?;
    Ok(Json(session.snapshot()))
}

/// DELETE /api/v1/sessions/:session_id
async fn delete_session(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> Result<StatusCode> {
    if state.sessions().remove(session_id).await {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::session_not_found(session_id))
    }
}

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub session: SessionSnapshot,
    pub upload: UploadOutcome,
}

/// POST /api/v1/sessions/:session_id/image
///
/// A failed recognition still succeeds here: the extraction carries the
/// error message and the stored text is empty.
async fn upload_image(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
    multipart: Multipart,
) -> Result<Json<UploadResponse>> {
    let mut session = lock_session(&state, session_id).await?;
    let (file_name, bytes) = read_image_field(multipart).await?;

    let upload = state
        .controller()
        .upload(&mut session, &file_name, &bytes)
        .await?;

    Ok(Json(UploadResponse {
        session: session.snapshot(),
        upload,
    }))
}

#[derive(Debug, Deserialize)]
pub struct KeywordRequest {
    pub keyword: String,
}

/// PUT /api/v1/sessions/:session_id/keyword
async fn set_keyword(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
    Json(request): Json<KeywordRequest>,
) -> Result<Json<SessionSnapshot>> {
    let mut session = lock_session(&state, session_id).await?;
    state.controller().set_keyword(&mut session, request.keyword);
    Ok(Json(session.snapshot()))
}

#[derive(Debug, Default, Deserialize)]
pub struct SearchRequest {
    /// Replaces the stored keyword before searching
    #[serde(default)]
    pub keyword: Option<String>,
}

/// POST /api/v1/sessions/:session_id/search
///
/// The body is optional; without one the stored keyword is used.
async fn search(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
    request: Option<Json<SearchRequest>>,
) -> Result<Json<SearchOutcome>> {
    let mut session = lock_session(&state, session_id).await?;
    let controller = state.controller();

    if let Some(keyword) = request.and_then(|Json(r)| r.keyword) {
        controller.set_keyword(&mut session, keyword);
    }

    Ok(Json(controller.search(&mut session)))
}

/// GET /api/v1/sessions/:session_id/export
async fn export(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> Result<Response> {
    let session = lock_session(&state, session_id).await?;

    match state.controller().export(&session)? {
        Some(document) => Ok(download_response(document)),
        None => Err(AppError::Conflict("No extracted text to export".to_string())),
    }
}

#[derive(Debug, Serialize)]
pub struct ProvidersResponse {
    pub configured: Vec<OcrProvider>,
    pub available: Vec<OcrProvider>,
    pub languages: Vec<String>,
}

/// GET /api/v1/ocr/providers
async fn list_providers(State(state): State<AppState>) -> impl IntoResponse {
    let ocr = state.ocr();
    Json(ProvidersResponse {
        configured: ocr.configured_providers(),
        available: ocr.available_providers().await,
        languages: ocr.languages().to_vec(),
    })
}
