pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, patch, post, put},
    Router,
};

use crate::extraction::handlers as extraction;
use crate::session::handlers as session;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let body_limit = state.config.max_upload_bytes;

    Router::new()
        .route("/health", get(health::health_handler))
        // Stateless extraction
        .route("/api/v1/resumes/extract", post(extraction::handle_extract))
        // Editing session
        .route("/api/v1/session", get(session::handle_get_session))
        .route(
            "/api/v1/session/extract",
            post(session::handle_session_extract),
        )
        .route("/api/v1/session/upload", post(session::handle_upload))
        .route("/api/v1/session/fields", put(session::handle_set_field))
        .route(
            "/api/v1/session/objective",
            put(session::handle_set_objective),
        )
        .route("/api/v1/session/skills", put(session::handle_set_skills))
        .route(
            "/api/v1/session/photo",
            put(session::handle_set_photo).delete(session::handle_remove_photo),
        )
        .route(
            "/api/v1/session/template",
            put(session::handle_select_template),
        )
        .route("/api/v1/session/reset", post(session::handle_reset))
        .route("/api/v1/session/export", get(session::handle_export))
        .route(
            "/api/v1/session/export.docx",
            get(session::handle_export_docx),
        )
        .route("/api/v1/session/:list", post(session::handle_add_entry))
        .route(
            "/api/v1/session/:list/:id",
            patch(session::handle_update_entry).delete(session::handle_remove_entry),
        )
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}
