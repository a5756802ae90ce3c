use crate::shared::{Rect, WindowId, WindowKind, WindowMode};

/// Workspace window state
/// The single source of truth for a window; the rendered view is derived from it.
#[derive(Debug, Clone, PartialEq)]
pub struct WindowState {
    pub id: WindowId,

    pub title: String,

    /// Opaque icon markup reference
    pub icon: String,

    /// Rendered body markup
    pub content: String,

    /// Current geometry in canvas space
    pub rect: Rect,

    /// Last known non-maximized geometry (restore target)
    pub original_rect: Rect,

    pub mode: WindowMode,

    pub z_index: u32,

    /// Close button shown in the chrome; `close` itself always succeeds
    pub closable: bool,

    /// Keys of auxiliary UI bound to this window (editor links, overlays)
    pub satellites: Vec<String>,
}

impl WindowState {
    pub fn from_spec(id: WindowId, spec: WindowSpec) -> Self {
        Self {
            id,
            title: spec.title,
            icon: spec.icon,
            content: spec.content,
            rect: spec.rect,
            original_rect: spec.rect,
            mode: WindowMode::Normal,
            z_index: 0,
            closable: spec.closable,
            satellites: Vec::new(),
        }
    }

    pub fn kind(&self) -> WindowKind {
        self.id.kind()
    }

    pub fn is_minimized(&self) -> bool {
        self.mode == WindowMode::Minimized
    }

    pub fn is_maximized(&self) -> bool {
        self.mode == WindowMode::Maximized
    }
}

/// Open request for a window
#[derive(Debug, Clone, PartialEq)]
pub struct WindowSpec {
    /// Minted from a counter when absent
    pub id: Option<WindowId>,
    pub title: String,
    pub icon: String,
    pub content: String,
    pub rect: Rect,
    pub closable: bool,
}

impl WindowSpec {
    pub fn new(title: impl Into<String>, rect: Rect) -> Self {
        Self {
            id: None,
            title: title.into(),
            icon: String::new(),
            content: String::new(),
            rect,
            closable: true,
        }
    }

    pub fn with_id(mut self, id: impl Into<WindowId>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = icon.into();
        self
    }

    pub fn content(mut self, content: impl Into<String>) -> Self {
        self.content = content.into();
        self
    }

    pub fn closable(mut self, closable: bool) -> Self {
        self.closable = closable;
        self
    }
}
