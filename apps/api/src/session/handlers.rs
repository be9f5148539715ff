//! Axum route handlers for the editing session API.

use std::collections::HashMap;

use axum::{
    body::Bytes,
    extract::{Multipart, Path, State},
    http::header,
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::documents::{extract_text, DOCX_MIME};
use crate::errors::AppError;
use crate::models::resume::ListKind;
use crate::resume::docx_export::render_docx;
use crate::resume::export::{export_file_name, render_text};
use crate::resume::store::ScalarField;
use crate::resume::template::TemplateId;
use crate::session::{extract_into_session, SessionExtraction, SessionSnapshot};
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct SessionExtractRequest {
    pub raw_text: String,
}

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    /// Text pulled out of the document; it becomes the new raw input.
    pub raw_text: String,
    #[serde(flatten)]
    pub extraction: SessionExtraction,
}

#[derive(Debug, Deserialize)]
pub struct FieldUpdate {
    pub field: String,
    pub value: String,
}

#[derive(Debug, Deserialize)]
pub struct TextBody {
    pub text: String,
}

#[derive(Debug, Deserialize)]
pub struct PhotoBody {
    pub photo: String,
}

#[derive(Debug, Deserialize)]
pub struct TemplateBody {
    pub template: String,
}

#[derive(Debug, Serialize)]
pub struct EntryAdded {
    pub id: String,
    pub session: SessionSnapshot,
}

#[derive(Debug, Serialize)]
pub struct EntryChanged {
    /// False when the id (or field) did not exist; the session is unchanged.
    pub changed: bool,
    pub session: SessionSnapshot,
}

fn parse_list(list: &str) -> Result<ListKind, AppError> {
    list.parse::<ListKind>().map_err(AppError::NotFound)
}

fn parse_defaults(body: &[u8]) -> Result<HashMap<String, String>, AppError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(HashMap::new());
    }
    serde_json::from_slice(body)
        .map_err(|e| AppError::Validation(format!("Invalid entry defaults: {e}")))
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// GET /api/v1/session
pub async fn handle_get_session(State(state): State<AppState>) -> Json<SessionSnapshot> {
    Json(state.session.lock().await.snapshot())
}

/// POST /api/v1/session/extract
///
/// Extracts raw text into the session. A response that was superseded by a
/// newer request comes back with `outcome: "stale"` and changes nothing.
pub async fn handle_session_extract(
    State(state): State<AppState>,
    Json(request): Json<SessionExtractRequest>,
) -> Result<Json<SessionExtraction>, AppError> {
    let result =
        extract_into_session(&state.session, state.generator.as_ref(), &request.raw_text).await?;
    Ok(Json(result))
}

/// POST /api/v1/session/upload
///
/// Multipart upload of a PDF or DOCX (`file` field). The document text is
/// extracted and then run through the same extraction as pasted text.
pub async fn handle_upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, AppError> {
    let mut upload = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Invalid multipart body: {e}")))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let mime = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::Validation(format!("Failed to read upload: {e}")))?;
        upload = Some((bytes, mime));
        break;
    }

    let (bytes, mime) =
        upload.ok_or_else(|| AppError::Validation("Missing 'file' field".to_string()))?;
    info!("Received {} byte upload ({mime})", bytes.len());

    let raw_text = tokio::task::spawn_blocking(move || extract_text(&bytes, &mime))
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Text extraction task failed: {e}")))??;

    let extraction =
        extract_into_session(&state.session, state.generator.as_ref(), &raw_text).await?;

    Ok(Json(UploadResponse {
        raw_text,
        extraction,
    }))
}

/// PUT /api/v1/session/fields
pub async fn handle_set_field(
    State(state): State<AppState>,
    Json(request): Json<FieldUpdate>,
) -> Result<Json<SessionSnapshot>, AppError> {
    let field = request
        .field
        .parse::<ScalarField>()
        .map_err(AppError::Validation)?;
    let mut session = state.session.lock().await;
    session.store_mut().set_scalar_field(field, request.value);
    Ok(Json(session.snapshot()))
}

/// PUT /api/v1/session/objective
pub async fn handle_set_objective(
    State(state): State<AppState>,
    Json(request): Json<TextBody>,
) -> Json<SessionSnapshot> {
    let mut session = state.session.lock().await;
    session.store_mut().set_objective(request.text);
    Json(session.snapshot())
}

/// PUT /api/v1/session/skills
///
/// One skill per line; blank lines are dropped.
pub async fn handle_set_skills(
    State(state): State<AppState>,
    Json(request): Json<TextBody>,
) -> Json<SessionSnapshot> {
    let mut session = state.session.lock().await;
    session.store_mut().set_skills_from_block(&request.text);
    Json(session.snapshot())
}

/// POST /api/v1/session/:list
///
/// Optional JSON body of `{field: value}` defaults for the new entry. An empty
/// body means no defaults; a body that is not such an object is rejected.
pub async fn handle_add_entry(
    State(state): State<AppState>,
    Path(list): Path<String>,
    body: Bytes,
) -> Result<Json<EntryAdded>, AppError> {
    let kind = parse_list(&list)?;
    let defaults = parse_defaults(&body)?;
    let mut session = state.session.lock().await;
    let id = session.store_mut().add_entry(kind, defaults);
    Ok(Json(EntryAdded {
        id,
        session: session.snapshot(),
    }))
}

/// PATCH /api/v1/session/:list/:id
pub async fn handle_update_entry(
    State(state): State<AppState>,
    Path((list, id)): Path<(String, String)>,
    Json(request): Json<FieldUpdate>,
) -> Result<Json<EntryChanged>, AppError> {
    let kind = parse_list(&list)?;
    let mut session = state.session.lock().await;
    let changed = session
        .store_mut()
        .update_entry(kind, &id, &request.field, request.value);
    Ok(Json(EntryChanged {
        changed,
        session: session.snapshot(),
    }))
}

/// DELETE /api/v1/session/:list/:id
pub async fn handle_remove_entry(
    State(state): State<AppState>,
    Path((list, id)): Path<(String, String)>,
) -> Result<Json<EntryChanged>, AppError> {
    let kind = parse_list(&list)?;
    let mut session = state.session.lock().await;
    let changed = session.store_mut().remove_entry(kind, &id);
    Ok(Json(EntryChanged {
        changed,
        session: session.snapshot(),
    }))
}

/// PUT /api/v1/session/photo
pub async fn handle_set_photo(
    State(state): State<AppState>,
    Json(request): Json<PhotoBody>,
) -> Result<Json<SessionSnapshot>, AppError> {
    if request.photo.trim().is_empty() {
        return Err(AppError::Validation("photo cannot be empty".to_string()));
    }
    let mut session = state.session.lock().await;
    session.store_mut().set_photo(Some(request.photo));
    Ok(Json(session.snapshot()))
}

/// DELETE /api/v1/session/photo
pub async fn handle_remove_photo(State(state): State<AppState>) -> Json<SessionSnapshot> {
    let mut session = state.session.lock().await;
    session.store_mut().set_photo(None);
    Json(session.snapshot())
}

/// PUT /api/v1/session/template
pub async fn handle_select_template(
    State(state): State<AppState>,
    Json(request): Json<TemplateBody>,
) -> Result<Json<SessionSnapshot>, AppError> {
    let template = request
        .template
        .parse::<TemplateId>()
        .map_err(AppError::Validation)?;
    let mut session = state.session.lock().await;
    session.select_template(template);
    Ok(Json(session.snapshot()))
}

/// POST /api/v1/session/reset
pub async fn handle_reset(State(state): State<AppState>) -> Json<SessionSnapshot> {
    let mut session = state.session.lock().await;
    session.reset();
    info!("Session reset");
    Json(session.snapshot())
}

/// GET /api/v1/session/export
///
/// Markdown rendition of the current record as a file download.
pub async fn handle_export(State(state): State<AppState>) -> impl IntoResponse {
    let session = state.session.lock().await;
    let record = session.store().record();
    let body = render_text(record, session.template());
    (
        [
            (header::CONTENT_TYPE, "text/markdown; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, attachment(&export_file_name(record, "md"))),
        ],
        body,
    )
}

/// GET /api/v1/session/export.docx
pub async fn handle_export_docx(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let record = state.session.lock().await.store().record().clone();
    let file_name = export_file_name(&record, "docx");
    let bytes = render_docx(&record)?;
    info!("Exported {file_name} ({} bytes)", bytes.len());
    Ok((
        [
            (header::CONTENT_TYPE, DOCX_MIME.to_string()),
            (header::CONTENT_DISPOSITION, attachment(&file_name)),
        ],
        bytes,
    ))
}

fn attachment(file_name: &str) -> String {
    let safe: String = file_name
        .chars()
        .map(|c| if c.is_ascii_graphic() && c != '"' { c } else { '_' })
        .collect();
    format!("attachment; filename=\"{safe}\"")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_defaults() {
        assert!(parse_defaults(b"").unwrap().is_empty());
        assert!(parse_defaults(b" \n").unwrap().is_empty());

        let defaults = parse_defaults(br#"{"title": "Cook"}"#).unwrap();
        assert_eq!(defaults.get("title").map(String::as_str), Some("Cook"));

        let malformed: [&[u8]; 3] = [b"{\"title\": ", b"[1, 2]", b"{\"title\": 5}"];
        for bad in malformed {
            assert!(matches!(parse_defaults(bad), Err(AppError::Validation(_))));
        }
    }
}
