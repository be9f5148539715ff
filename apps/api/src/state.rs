use std::sync::Arc;

use tokio::sync::Mutex;

use crate::config::Config;
use crate::llm_client::StructuredGenerator;
use crate::session::ResumeSession;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Pluggable generation backend. Default: GeminiClient.
    pub generator: Arc<dyn StructuredGenerator>,
    /// The single editing session this process hosts.
    pub session: Arc<Mutex<ResumeSession>>,
}

impl AppState {
    pub fn new(config: Config, generator: Arc<dyn StructuredGenerator>) -> Self {
        Self {
            config,
            generator,
            session: Arc::new(Mutex::new(ResumeSession::default())),
        }
    }
}
