//! Extraction pipeline: raw text -> generation backend -> normalizer, plus the
//! template heuristic evaluated on the same raw text.

use serde::Serialize;
use tracing::{info, warn};

use crate::errors::AppError;
use crate::extraction::prompts::EXTRACTION_SYSTEM;
use crate::llm_client::prompts::with_json_only;
use crate::llm_client::StructuredGenerator;
use crate::models::resume::ResumeRecord;
use crate::resume::normalize::normalize;
use crate::resume::schema::response_schema;
use crate::resume::template::{suggest_template, TemplateId};

/// Result of one successful extraction.
#[derive(Debug, Clone, Serialize)]
pub struct Extraction {
    pub record: ResumeRecord,
    /// Advisory only; `None` means keep the current template.
    pub suggested_template: Option<TemplateId>,
}

/// Rejects empty or whitespace-only input before any backend call.
pub fn require_text(raw_text: &str) -> Result<&str, AppError> {
    if raw_text.trim().is_empty() {
        return Err(AppError::EmptyInput);
    }
    Ok(raw_text)
}

/// Runs one extraction. Exactly one backend request; no retry.
pub async fn extract_resume(
    generator: &dyn StructuredGenerator,
    raw_text: &str,
) -> Result<Extraction, AppError> {
    let raw_text = require_text(raw_text)?;

    let system = with_json_only(EXTRACTION_SYSTEM);
    let schema = response_schema();

    info!("Requesting resume extraction for {} chars of input", raw_text.len());
    let raw_response = generator
        .generate(&system, raw_text, &schema)
        .await
        .map_err(|e| {
            warn!("Resume extraction backend call failed: {e}");
            AppError::from(e)
        })?;

    let record = normalize(&raw_response)?;
    let suggested_template = suggest_template(raw_text);

    info!(
        "Extracted resume: {} experience, {} education, {} skills, {} references",
        record.experience.len(),
        record.education.len(),
        record.skills.len(),
        record.references.len()
    );

    Ok(Extraction {
        record,
        suggested_template,
    })
}
