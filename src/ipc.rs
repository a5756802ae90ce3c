//! Folio IPC Protocol
//!
//! Line-delimited JSON between the workspace engine and its host. The host
//! sends one [`Command`] per line; the engine answers with the
//! [`WorkspaceEvent`]s each command produced, one per line.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::document::DocumentStructure;
use crate::shared::Rect;
use crate::wm::{WindowSpec, Workspace, WorkspaceEvent};

fn default_true() -> bool {
    true
}

// ============================================================================
// Host → Engine Commands
// ============================================================================

/// Commands sent from the host to the workspace
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Command {
    /// Open a window from an explicit spec
    Create {
        #[serde(default)]
        id: Option<String>,
        title: String,
        rect: Rect,
        #[serde(default)]
        icon: String,
        #[serde(default)]
        content: String,
        #[serde(default = "default_true")]
        closable: bool,
    },

    /// Open a document window by id, loading its content
    Open {
        id: String,
        #[serde(default)]
        title: Option<String>,
    },

    Close { id: String },
    Minimize { id: String },
    Restore { id: String },
    Maximize { id: String },
    ToggleMaximize { id: String },
    Reposition { id: String, rect: Rect },

    /// Click on a window
    Focus {
        id: String,
        #[serde(default)]
        shift: bool,
    },

    /// Click on empty canvas
    ClearFocus,

    CycleFocus {
        #[serde(default = "default_true")]
        forward: bool,
    },
    EndCycle,

    /// Pointer down on a window's title bar
    BeginDrag { id: String, x: f64, y: f64 },

    /// Pointer down on a window's resize handle
    BeginResize { id: String, x: f64, y: f64 },

    PointerMove { x: f64, y: f64 },
    PointerUp,

    DoubleClick {
        id: String,
        #[serde(default)]
        classes: Vec<String>,
    },

    ZoomTo { scale: f64 },
    ZoomBy {
        delta: f64,
        #[serde(default)]
        anchor: Option<(f64, f64)>,
    },
    ZoomIn,
    ZoomOut,
    ResetZoom,
    PanBy { dx: f64, dy: f64 },
    FitToView {
        #[serde(default)]
        padding: Option<f64>,
    },
    SetViewportSize { width: f64, height: f64 },

    /// Lay out by document structure; the loaded document when absent
    Arrange {
        #[serde(default)]
        structure: Option<DocumentStructure>,
    },

    ActivateTaskbarEntry { id: String },
    OpenEditor { id: String },
    AttachSatellite { id: String, key: String },

    /// Write the layout now
    Save,
}

impl Command {
    /// Parse one protocol line
    pub fn parse(line: &str) -> Result<Self> {
        serde_json::from_str(line.trim()).with_context(|| format!("Invalid command: {}", line.trim()))
    }
}

/// Encode an event as one protocol line
pub fn encode_event(event: &WorkspaceEvent) -> Result<String> {
    Ok(serde_json::to_string(event)?)
}

/// Apply a command to the workspace
pub async fn apply(ws: &mut Workspace, command: Command, document: &DocumentStructure) -> Result<()> {
    debug!("Applying {:?}", command);
    match command {
        Command::Create { id, title, rect, icon, content, closable } => {
            let mut spec = WindowSpec::new(title, rect).icon(icon).content(content).closable(closable);
            if let Some(id) = id {
                spec = spec.with_id(id);
            }
            ws.create(spec);
        }
        Command::Open { id, title } => {
            ws.open_content_window(&id, title.as_deref());
        }
        Command::Close { id } => {
            ws.close(&id);
        }
        Command::Minimize { id } => {
            ws.minimize(&id);
        }
        Command::Restore { id } => {
            ws.restore(&id);
        }
        Command::Maximize { id } => {
            ws.maximize(&id);
        }
        Command::ToggleMaximize { id } => {
            ws.toggle_maximize(&id);
        }
        Command::Reposition { id, rect } => {
            ws.reposition(&id, rect);
        }
        Command::Focus { id, shift } => {
            ws.focus(&id, shift);
        }
        Command::ClearFocus => ws.clear_focus(),
        Command::CycleFocus { forward } => {
            ws.cycle_focus(forward);
        }
        Command::EndCycle => ws.end_cycle(),
        Command::BeginDrag { id, x, y } => {
            if !ws.begin_drag(&id, x, y) {
                debug!("Drag of {} not started", id);
            }
        }
        Command::BeginResize { id, x, y } => {
            if !ws.begin_resize(&id, x, y) {
                debug!("Resize of {} not started", id);
            }
        }
        Command::PointerMove { x, y } => ws.pointer_move(x, y),
        Command::PointerUp => ws.end_pointer_session(),
        Command::DoubleClick { id, classes } => {
            ws.double_click(&id, &classes);
        }
        Command::ZoomTo { scale } => {
            ws.zoom_to(scale, true);
        }
        Command::ZoomBy { delta, anchor } => {
            ws.zoom_by(delta, anchor);
        }
        Command::ZoomIn => {
            ws.zoom_in();
        }
        Command::ZoomOut => {
            ws.zoom_out();
        }
        Command::ResetZoom => {
            ws.reset_zoom();
        }
        Command::PanBy { dx, dy } => ws.pan_by(dx, dy),
        Command::FitToView { padding } => {
            ws.fit_to_view(padding);
        }
        Command::SetViewportSize { width, height } => ws.set_viewport_size(width, height),
        Command::Arrange { structure } => ws.arrange(structure.as_ref().unwrap_or(document)),
        Command::ActivateTaskbarEntry { id } => {
            ws.activate_taskbar_entry(&id);
        }
        Command::OpenEditor { id } => {
            if !ws.open_editor(&id) {
                warn!("No editor for {}", id);
            }
        }
        Command::AttachSatellite { id, key } => {
            ws.attach_satellite(&id, key);
        }
        Command::Save => ws
            .flush_save()
            .await
            .with_context(|| format!("Failed to save layout of {}", ws.document_id()))?,
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wm::test_support::harness;

    #[test]
    fn test_parse_with_defaults() {
        let cmd = Command::parse(r#"{"type":"Focus","id":"chapter-7"}"#).unwrap();
        assert_eq!(cmd, Command::Focus { id: "chapter-7".into(), shift: false });

        let cmd = Command::parse(r#" {"type":"CycleFocus"} "#).unwrap();
        assert_eq!(cmd, Command::CycleFocus { forward: true });

        let cmd = Command::parse(
            r#"{"type":"Create","title":"Notes","rect":{"x":1,"y":2,"width":300,"height":200}}"#,
        )
        .unwrap();
        match cmd {
            Command::Create { id, closable, rect, .. } => {
                assert!(id.is_none());
                assert!(closable);
                assert_eq!(rect, Rect::new(1.0, 2.0, 300.0, 200.0));
            }
            other => panic!("Unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(Command::parse("not json").is_err());
        assert!(Command::parse(r#"{"type":"Teleport"}"#).is_err());
        assert!(Command::parse(r#"{"type":"Close"}"#).is_err());
    }

    #[test]
    fn test_event_encoding_is_tagged() {
        let event = WorkspaceEvent::WindowClosed { id: "chapter-7".into() };
        let line = encode_event(&event).unwrap();
        let value: serde_json::Value = serde_json::from_str(&line).unwrap();
        assert_eq!(value["type"], "WindowClosed");
        assert_eq!(value["id"], "chapter-7");
    }

    #[tokio::test]
    async fn test_apply_command_sequence() {
        let mut h = harness();
        let doc = DocumentStructure::default();
        let lines = [
            r#"{"type":"Open","id":"chapter-7"}"#,
            r#"{"type":"Open","id":"outline-window","title":"Plot"}"#,
            r#"{"type":"Minimize","id":"chapter-7"}"#,
            r#"{"type":"ZoomTo","scale":0.5}"#,
        ];
        for line in lines {
            apply(&mut h.workspace, Command::parse(line).unwrap(), &doc).await.unwrap();
        }

        let ws = &h.workspace;
        assert!(ws.window("chapter-7").unwrap().is_minimized());
        assert_eq!(ws.window("outline-window").unwrap().title, "Plot");
        assert_eq!(ws.viewport().scale(), 0.5);

        let events = h.workspace.drain_events();
        assert!(events.iter().any(|e| matches!(e, WorkspaceEvent::WindowOpened { id, .. } if id.as_str() == "chapter-7")));
        assert!(h.workspace.drain_events().is_empty());
    }

    #[tokio::test]
    async fn test_create_reports_closable_flag() {
        let mut h = harness();
        let doc = DocumentStructure::default();
        let line = r#"{"type":"Create","id":"pinned","title":"Pinned","closable":false,
            "rect":{"x":0,"y":0,"width":300,"height":200}}"#;
        apply(&mut h.workspace, Command::parse(line).unwrap(), &doc).await.unwrap();

        let events = h.workspace.drain_events();
        let opened = events
            .iter()
            .find(|e| matches!(e, WorkspaceEvent::WindowOpened { id, .. } if id.as_str() == "pinned"))
            .unwrap();
        assert!(matches!(opened, WorkspaceEvent::WindowOpened { closable: false, .. }));
        assert!(!h.workspace.window("pinned").unwrap().closable);

        let line = encode_event(opened).unwrap();
        let value: serde_json::Value = serde_json::from_str(&line).unwrap();
        assert_eq!(value["closable"], false);
        assert!(h.workspace.drain_events().is_empty());
    }

    #[tokio::test]
    async fn test_save_command_reports_store_failure() {
        let mut h = harness();
        let doc = DocumentStructure::default();
        h.store.set_failing(true);
        assert!(apply(&mut h.workspace, Command::Save, &doc).await.is_err());
        h.store.set_failing(false);
        assert!(apply(&mut h.workspace, Command::Save, &doc).await.is_ok());
        assert_eq!(h.store.saves().len(), 1);
    }
}
