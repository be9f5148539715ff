//! Editing session: the record store plus the chosen presentation template.
//!
//! There is one session per process. Editing operations are synchronous; the
//! only asynchronous writer is an extraction, guarded by a request token so a
//! slow, superseded response can never overwrite a newer one.

use serde::Serialize;
use tokio::sync::Mutex;
use tracing::info;

use crate::errors::AppError;
use crate::extraction::pipeline::{extract_resume, require_text, Extraction};
use crate::llm_client::StructuredGenerator;
use crate::models::resume::ResumeRecord;
use crate::resume::store::{ReplaceOutcome, RequestToken, ResumeStore, StoreError};
use crate::resume::template::TemplateId;

pub mod handlers;

#[derive(Debug, Clone, Default)]
pub struct ResumeSession {
    store: ResumeStore,
    template: TemplateId,
}

/// What clients see of the session.
#[derive(Debug, Clone, Serialize)]
pub struct SessionSnapshot {
    pub record: ResumeRecord,
    pub template: TemplateId,
}

#[derive(Debug, Clone, Serialize)]
pub struct SessionExtraction {
    pub token: u64,
    pub outcome: ReplaceOutcome,
    pub session: SessionSnapshot,
}

impl ResumeSession {
    pub fn store(&self) -> &ResumeStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut ResumeStore {
        &mut self.store
    }

    pub fn template(&self) -> TemplateId {
        self.template
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            record: self.store.record().clone(),
            template: self.template,
        }
    }

    pub fn begin_extraction(&mut self) -> RequestToken {
        self.store.issue_token()
    }

    /// Applies an extraction if `token` is still current. The template
    /// suggestion is adopted only when the record was applied, and then it
    /// overrides any earlier explicit choice.
    pub fn complete_extraction(
        &mut self,
        token: RequestToken,
        extraction: Extraction,
    ) -> Result<ReplaceOutcome, StoreError> {
        let outcome = self.store.replace_if_current(token, extraction.record)?;
        if outcome == ReplaceOutcome::Applied {
            if let Some(template) = extraction.suggested_template {
                info!("Template heuristic selected '{template}'");
                self.template = template;
            }
        }
        Ok(outcome)
    }

    /// Explicit user choice; stands until the next applied extraction.
    pub fn select_template(&mut self, template: TemplateId) {
        self.template = template;
    }

    pub fn reset(&mut self) {
        self.store.reset();
        self.template = TemplateId::default();
    }
}

/// Runs one extraction against the shared session.
///
/// The lock is held only to issue the token and to apply the result, never
/// across the backend call, so a newer request can start while an older one
/// is still in flight. Failures leave the record unchanged.
pub async fn extract_into_session(
    session: &Mutex<ResumeSession>,
    generator: &dyn StructuredGenerator,
    raw_text: &str,
) -> Result<SessionExtraction, AppError> {
    let raw_text = require_text(raw_text)?;
    let token = session.lock().await.begin_extraction();
    info!("Extraction {token} started");

    let result = extract_resume(generator, raw_text).await;

    let mut session = session.lock().await;
    let extraction = match result {
        Ok(extraction) => extraction,
        Err(e) => {
            if !session.store().is_current(token) {
                info!("Extraction {token} failed after being superseded");
            }
            return Err(e);
        }
    };

    let outcome = session.complete_extraction(token, extraction)?;
    Ok(SessionExtraction {
        token: token.value(),
        outcome,
        session: session.snapshot(),
    })
}
