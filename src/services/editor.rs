//! Editor launcher adapter

use serde::Serialize;
use std::sync::Mutex;
use tracing::info;

use crate::services::EditorLauncher;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "editor", content = "id", rename_all = "snake_case")]
pub enum EditorRequest {
    Chapter(String),
    Codex(String),
}

/// Logs and records editor requests. The host decides what to open.
#[derive(Default)]
pub struct LogEditorLauncher {
    requests: Mutex<Vec<EditorRequest>>,
}

impl LogEditorLauncher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn requests(&self) -> Vec<EditorRequest> {
        self.requests.lock().map(|r| r.clone()).unwrap_or_default()
    }

    fn record(&self, request: EditorRequest) {
        info!("Editor requested: {:?}", request);
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(request);
        }
    }
}

impl EditorLauncher for LogEditorLauncher {
    fn open_chapter_editor(&self, chapter_id: &str) {
        self.record(EditorRequest::Chapter(chapter_id.to_string()));
    }

    fn open_codex_editor(&self, entry_id: &str) {
        self.record(EditorRequest::Codex(entry_id.to_string()));
    }
}
