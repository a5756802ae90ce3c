//! Layout stores

use std::path::PathBuf;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::debug;

use crate::error::StoreError;
use crate::services::{LayoutStore, StoreFuture};
use crate::wm::session::LayoutSnapshot;

/// JSON files under `<data_dir>/folio/layouts/<document>.json`
pub struct FileLayoutStore {
    root: PathBuf,
}

impl FileLayoutStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Store rooted in the user's data directory
    pub fn in_data_dir() -> Option<Self> {
        dirs::data_dir().map(|dir| Self::new(dir.join("folio").join("layouts")))
    }

    fn path_for(&self, document_id: &str) -> PathBuf {
        let safe: String = document_id
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
            .collect();
        self.root.join(format!("{safe}.json"))
    }
}

impl LayoutStore for FileLayoutStore {
    fn save_layout<'a>(&'a self, document_id: &'a str, snapshot: &'a LayoutSnapshot) -> StoreFuture<'a> {
        Box::pin(async move {
            let data = serde_json::to_vec_pretty(snapshot)?;
            tokio::fs::create_dir_all(&self.root).await?;
            let path = self.path_for(document_id);
            tokio::fs::write(&path, data).await?;
            debug!("Layout written to {:?}", path);
            Ok(())
        })
    }

    fn initial_snapshot(&self, document_id: &str) -> Option<String> {
        std::fs::read_to_string(self.path_for(document_id)).ok()
    }
}

/// Keeps every write in memory
#[derive(Default)]
pub struct MemoryLayoutStore {
    initial: Option<String>,
    saved: Mutex<Vec<(String, LayoutSnapshot)>>,
    failing: AtomicBool,
}

impl MemoryLayoutStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_initial(initial: impl Into<String>) -> Self {
        Self {
            initial: Some(initial.into()),
            ..Self::default()
        }
    }

    /// Make subsequent writes fail
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn saves(&self) -> Vec<(String, LayoutSnapshot)> {
        self.saved.lock().map(|s| s.clone()).unwrap_or_default()
    }
}

impl LayoutStore for MemoryLayoutStore {
    fn save_layout<'a>(&'a self, document_id: &'a str, snapshot: &'a LayoutSnapshot) -> StoreFuture<'a> {
        Box::pin(async move {
            if self.failing.load(Ordering::SeqCst) {
                return Err(StoreError::Unavailable("memory store set to fail".into()));
            }
            let mut saved = self
                .saved
                .lock()
                .map_err(|_| StoreError::Unavailable("memory store poisoned".into()))?;
            saved.push((document_id.to_string(), snapshot.clone()));
            Ok(())
        })
    }

    fn initial_snapshot(&self, _document_id: &str) -> Option<String> {
        self.initial.clone()
    }
}
