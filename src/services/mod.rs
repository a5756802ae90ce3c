//! Collaborator contracts
//!
//! The workspace never renders content, stores layouts or edits text itself.
//! It talks to these collaborators through the traits below; bundled
//! adapters live in the submodules.

pub mod content;
pub mod editor;
pub mod store;

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::error::{ContentError, StoreError};
use crate::shared::WindowKind;
use crate::wm::session::LayoutSnapshot;

pub use content::{DirectoryContentProvider, MapContentProvider};
pub use editor::{EditorRequest, LogEditorLauncher};
pub use store::{FileLayoutStore, MemoryLayoutStore};

/// Future returned by a layout write
pub type StoreFuture<'a> = Pin<Box<dyn Future<Output = Result<(), StoreError>> + Send + 'a>>;

/// Supplies window markup. Reads must be idempotent.
pub trait ContentProvider: Send + Sync {
    /// `key` is the chapter or entry id, or the window id for outline/codex
    fn html_for(&self, kind: WindowKind, key: &str) -> Result<String, ContentError>;
}

/// Key-value layout persistence, best effort
pub trait LayoutStore: Send + Sync {
    fn save_layout<'a>(&'a self, document_id: &'a str, snapshot: &'a LayoutSnapshot) -> StoreFuture<'a>;

    /// Raw persisted blob handed over at load time, if any
    fn initial_snapshot(&self, document_id: &str) -> Option<String>;
}

/// Opens dedicated editors; fire and forget
pub trait EditorLauncher: Send + Sync {
    fn open_chapter_editor(&self, chapter_id: &str);
    fn open_codex_editor(&self, entry_id: &str);
}

/// Collaborator handles owned by a workspace
#[derive(Clone)]
pub struct Services {
    pub content: Arc<dyn ContentProvider>,
    pub store: Arc<dyn LayoutStore>,
    pub editors: Arc<dyn EditorLauncher>,
}

impl Services {
    pub fn new(
        content: Arc<dyn ContentProvider>,
        store: Arc<dyn LayoutStore>,
        editors: Arc<dyn EditorLauncher>,
    ) -> Self {
        Self { content, store, editors }
    }
}
