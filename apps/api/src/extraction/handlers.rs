//! Axum route handlers for stateless extraction.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::extraction::pipeline::extract_resume;
use crate::models::resume::ResumeRecord;
use crate::resume::template::TemplateId;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ExtractRequest {
    pub raw_text: String,
}

#[derive(Debug, Serialize)]
pub struct ExtractResponse {
    pub record: ResumeRecord,
    pub suggested_template: Option<TemplateId>,
}

/// POST /api/v1/resumes/extract
///
/// Turns raw resume text into a normalized record without touching the session.
pub async fn handle_extract(
    State(state): State<AppState>,
    Json(request): Json<ExtractRequest>,
) -> Result<Json<ExtractResponse>, AppError> {
    let extraction = extract_resume(state.generator.as_ref(), &request.raw_text).await?;
    Ok(Json(ExtractResponse {
        record: extraction.record,
        suggested_template: extraction.suggested_template,
    }))
}
