//! Shared window state value types
//!
//! Plain geometry and identity types used by every part of the workspace.
//! All geometry is stored in canvas space; screen space is derived through
//! the viewport.

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;

/// Fixed id of the outline window
pub const OUTLINE_WINDOW_ID: &str = "outline-window";

/// Fixed id of the codex window
pub const CODEX_WINDOW_ID: &str = "codex-window";

/// Id prefix for codex entry windows
pub const CODEX_ENTRY_PREFIX: &str = "codex-entry-";

/// Id prefix for chapter windows
pub const CHAPTER_PREFIX: &str = "chapter-";

/// Window geometry in canvas-space units
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    /// Smallest rect containing both rects
    pub fn union(&self, other: &Rect) -> Rect {
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        Rect {
            x,
            y,
            width: self.right().max(other.right()) - x,
            height: self.bottom().max(other.bottom()) - y,
        }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.width.is_finite() && self.height.is_finite()
    }
}

/// Display mode of a window. Exactly one holds at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WindowMode {
    #[default]
    Normal,
    Minimized,
    Maximized,
}

/// What a window shows, derived from its id
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WindowKind {
    Outline,
    Codex,
    CodexEntry,
    Chapter,
    Custom,
}

/// Stable window key, unique among open windows
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WindowId(String);

impl WindowId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn kind(&self) -> WindowKind {
        match self.0.as_str() {
            OUTLINE_WINDOW_ID => WindowKind::Outline,
            CODEX_WINDOW_ID => WindowKind::Codex,
            id if id.starts_with(CODEX_ENTRY_PREFIX) => WindowKind::CodexEntry,
            id if id.starts_with(CHAPTER_PREFIX) => WindowKind::Chapter,
            _ => WindowKind::Custom,
        }
    }

    /// The document key behind the window (entry or chapter id), if any
    pub fn content_key(&self) -> Option<&str> {
        match self.kind() {
            WindowKind::CodexEntry => self.0.strip_prefix(CODEX_ENTRY_PREFIX),
            WindowKind::Chapter => self.0.strip_prefix(CHAPTER_PREFIX),
            _ => None,
        }
    }

    pub fn for_chapter(chapter_id: &str) -> Self {
        Self(format!("{CHAPTER_PREFIX}{chapter_id}"))
    }

    pub fn for_codex_entry(entry_id: &str) -> Self {
        Self(format!("{CODEX_ENTRY_PREFIX}{entry_id}"))
    }
}

impl fmt::Display for WindowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for WindowId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for WindowId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for WindowId {
    fn from(id: String) -> Self {
        Self(id)
    }
}
