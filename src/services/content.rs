//! Content providers

use std::collections::HashMap;
use std::path::PathBuf;
use tracing::debug;

use crate::error::ContentError;
use crate::services::ContentProvider;
use crate::shared::WindowKind;

/// Reads window markup from a project directory:
/// `outline.html`, `codex.html`, `chapters/<id>.html`, `codex/<id>.html`
pub struct DirectoryContentProvider {
    root: PathBuf,
}

impl DirectoryContentProvider {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn path_for(&self, kind: WindowKind, key: &str) -> Option<PathBuf> {
        match kind {
            WindowKind::Outline => Some(self.root.join("outline.html")),
            WindowKind::Codex => Some(self.root.join("codex.html")),
            WindowKind::Chapter => Some(self.root.join("chapters").join(format!("{key}.html"))),
            WindowKind::CodexEntry => Some(self.root.join("codex").join(format!("{key}.html"))),
            WindowKind::Custom => None,
        }
    }
}

impl ContentProvider for DirectoryContentProvider {
    fn html_for(&self, kind: WindowKind, key: &str) -> Result<String, ContentError> {
        if !self.root.is_dir() {
            return Err(ContentError::Unavailable(self.root.display().to_string()));
        }
        let path = self
            .path_for(kind, key)
            .ok_or_else(|| ContentError::NotFound(key.to_string()))?;
        if !path.exists() {
            return Err(ContentError::NotFound(path.display().to_string()));
        }
        debug!("Reading content from {:?}", path);
        Ok(std::fs::read_to_string(path)?)
    }
}

/// In-memory provider keyed by kind and key
#[derive(Default)]
pub struct MapContentProvider {
    entries: HashMap<(WindowKind, String), String>,
}

impl MapContentProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, kind: WindowKind, key: &str, html: &str) -> Self {
        self.insert(kind, key, html);
        self
    }

    pub fn insert(&mut self, kind: WindowKind, key: &str, html: &str) {
        self.entries.insert((kind, key.to_string()), html.to_string());
    }
}

impl ContentProvider for MapContentProvider {
    fn html_for(&self, kind: WindowKind, key: &str) -> Result<String, ContentError> {
        self.entries
            .get(&(kind, key.to_string()))
            .cloned()
            .ok_or_else(|| ContentError::NotFound(key.to_string()))
    }
}
