//! Test doubles for the generation backend, plus document fixtures.

use std::collections::VecDeque;
use std::io::{Cursor, Write};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::oneshot;

use crate::llm_client::{LlmError, StructuredGenerator};

type Request = (String, String, Value);

/// Replies with queued results in call order and records each request.
pub struct StubGenerator {
    replies: Mutex<VecDeque<Result<String, LlmError>>>,
    requests: Mutex<Vec<Request>>,
    calls: AtomicUsize,
}

impl StubGenerator {
    pub fn replying(replies: Vec<Result<String, LlmError>>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            requests: Mutex::new(Vec::new()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_request(&self) -> Option<Request> {
        self.requests.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl StructuredGenerator for StubGenerator {
    async fn generate(
        &self,
        system: &str,
        prompt: &str,
        schema: &Value,
    ) -> Result<String, LlmError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests
            .lock()
            .unwrap()
            .push((system.to_string(), prompt.to_string(), schema.clone()));
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Err(LlmError::EmptyContent))
    }
}

/// Each call waits on its own gate, so a test decides when and in which
/// order responses arrive.
pub struct GatedGenerator {
    gates: Mutex<VecDeque<oneshot::Receiver<String>>>,
}

impl GatedGenerator {
    /// Returns the generator and the senders, one per expected call, in call order.
    pub fn with_gates(count: usize) -> (Self, Vec<oneshot::Sender<String>>) {
        let (senders, receivers): (Vec<_>, VecDeque<_>) =
            (0..count).map(|_| oneshot::channel()).unzip();
        (
            Self {
                gates: Mutex::new(receivers),
            },
            senders,
        )
    }
}

#[async_trait]
impl StructuredGenerator for GatedGenerator {
    async fn generate(
        &self,
        _system: &str,
        _prompt: &str,
        _schema: &Value,
    ) -> Result<String, LlmError> {
        let gate = self.gates.lock().unwrap().pop_front();
        match gate {
            Some(rx) => rx.await.map_err(|_| LlmError::EmptyContent),
            None => Err(LlmError::EmptyContent),
        }
    }
}

/// Packs `document_xml` as `word/document.xml` in a minimal zip container.
pub fn build_docx(document_xml: &str) -> Vec<u8> {
    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
    let options = zip::write::SimpleFileOptions::default()
        .compression_method(zip::CompressionMethod::Stored);
    writer.start_file("[Content_Types].xml", options.clone()).unwrap();
    writer.write_all(b"<Types/>").unwrap();
    writer.start_file("word/document.xml", options).unwrap();
    writer.write_all(document_xml.as_bytes()).unwrap();
    writer.finish().unwrap().into_inner()
}
