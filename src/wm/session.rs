//! Session Module
//!
//! Layout persistence. Every mutation requests a save; requests are
//! coalesced by a debouncer and the snapshot is taken synchronously when
//! requested, so the write always reflects the latest in-memory state.
//! Writes are best effort: failures are logged and never retried.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::error::StoreError;
use crate::shared::scheduler::Debouncer;
use crate::shared::{Rect, WindowId, WindowMode};
use crate::wm::registry::DEFAULT_WINDOWS;
use crate::wm::stacking::Z_INDEX_CEILING;
use crate::wm::{WindowSpec, WindowState, Workspace, WorkspaceEvent};

/// Persisted layout of one document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutSnapshot {
    #[serde(default)]
    pub windows: Vec<PersistedWindow>,
    #[serde(default)]
    pub canvas: Option<PersistedCanvas>,
}

/// One window; the rect is the restore geometry, not the maximized one
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PersistedWindow {
    pub id: String,
    pub title: String,
    pub icon: String,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub z_index: u32,
    pub is_minimized: bool,
    pub is_maximized: bool,
}

impl PersistedWindow {
    fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedCanvas {
    pub scale: f64,
    pub pan_x: f64,
    pub pan_y: f64,
}

/// Session manager
pub struct SessionManager {
    /// Pending debounced write
    pub debouncer: Debouncer,

    /// Set while a layout is being restored; saves are suppressed
    pub restoring: bool,
}

impl SessionManager {
    pub fn new(debounce: Duration) -> Self {
        Self {
            debouncer: Debouncer::new(debounce),
            restoring: false,
        }
    }
}

impl Workspace {
    /// Capture the current layout
    pub fn snapshot(&self) -> LayoutSnapshot {
        let windows = self
            .stacking_order()
            .iter()
            .filter_map(|id| self.windows.get(id))
            .map(|w| {
                // Normal windows persist where they are now
                let rect = match w.mode {
                    WindowMode::Normal => w.rect,
                    _ => w.original_rect,
                };
                PersistedWindow {
                    id: w.id.to_string(),
                    title: w.title.clone(),
                    icon: w.icon.clone(),
                    x: rect.x,
                    y: rect.y,
                    width: rect.width,
                    height: rect.height,
                    z_index: w.z_index,
                    is_minimized: w.is_minimized(),
                    is_maximized: w.is_maximized(),
                }
            })
            .collect();

        LayoutSnapshot {
            windows,
            canvas: Some(PersistedCanvas {
                scale: self.viewport.scale(),
                pan_x: self.viewport.pan_x,
                pan_y: self.viewport.pan_y,
            }),
        }
    }

    /// Queue a debounced layout write
    pub fn request_save(&mut self) {
        if self.session.restoring {
            return;
        }
        let snapshot = self.snapshot();
        let store = self.services.store.clone();
        let document_id = self.document_id.clone();
        self.session.debouncer.schedule(async move {
            match store.save_layout(&document_id, &snapshot).await {
                Ok(()) => debug!("Saved layout of {} ({} windows)", document_id, snapshot.windows.len()),
                Err(e) => warn!("Failed to save layout of {}: {}", document_id, e),
            }
        });
    }

    pub fn save_pending(&self) -> bool {
        self.session.debouncer.is_pending()
    }

    /// Write now, dropping any pending debounced write
    pub async fn flush_save(&mut self) -> Result<(), StoreError> {
        self.session.debouncer.cancel();
        let snapshot = self.snapshot();
        self.services.store.save_layout(&self.document_id, &snapshot).await
    }

    /// Restore the layout handed over by the store at startup
    pub fn load_state(&mut self) -> usize {
        let raw = self.services.store.initial_snapshot(&self.document_id);
        self.restore_from(raw.as_deref())
    }

    /// Restore from a persisted blob. Missing or malformed data yields the
    /// default layout. Returns the number of windows restored.
    pub fn restore_from(&mut self, raw: Option<&str>) -> usize {
        let snapshot = match raw.map(|s| serde_json::from_str::<LayoutSnapshot>(s)) {
            Some(Ok(snapshot)) => snapshot,
            Some(Err(e)) => {
                warn!("Ignoring malformed layout for {}: {}", self.document_id, e);
                LayoutSnapshot::default()
            }
            None => LayoutSnapshot::default(),
        };

        self.session.restoring = true;
        let mut persisted: Vec<_> = snapshot
            .windows
            .into_iter()
            .filter(|p| {
                let rect = p.rect();
                let valid = !p.id.is_empty() && rect.is_finite() && rect.width > 0.0 && rect.height > 0.0;
                if !valid {
                    warn!("Skipping persisted window {:?} with invalid geometry", p.id);
                }
                valid
            })
            .collect();
        // Ascending z so later windows land on top
        persisted.sort_by_key(|p| p.z_index);
        if persisted.last().is_some_and(|p| p.z_index > Z_INDEX_CEILING) {
            warn!("Renumbering persisted z-indexes of {}", self.document_id);
            for (z, p) in (1..).zip(persisted.iter_mut()) {
                p.z_index = z;
            }
        }

        let mut restored = Vec::with_capacity(persisted.len());
        for p in &persisted {
            let id = WindowId::new(p.id.as_str());
            if self.windows.contains_key(&id) {
                continue;
            }
            let content = self.fetch_content(&id);
            let spec = WindowSpec::new(p.title.as_str(), p.rect())
                .with_id(id.clone())
                .icon(p.icon.as_str())
                .content(content);
            let mut window = WindowState::from_spec(id.clone(), spec);
            window.z_index = p.z_index;
            self.emit(WorkspaceEvent::WindowOpened {
                id: id.clone(),
                title: window.title.clone(),
                rect: window.rect,
                z_index: window.z_index,
                closable: window.closable,
            });
            self.windows.insert(id.clone(), window);
            restored.push((id, p.is_minimized, p.is_maximized));
        }

        for (id, minimized, maximized) in &restored {
            // Minimized wins when both flags are set
            let changed = if *minimized {
                self.apply_minimize(id.as_str())
            } else if *maximized {
                self.apply_maximize(id.as_str())
            } else {
                false
            };
            if changed {
                self.emit_mode(id);
                self.emit_geometry(id);
            }
        }

        let restored_max = persisted
            .iter()
            .filter(|p| restored.iter().any(|(id, _, _)| id.as_str() == p.id))
            .map(|p| p.z_index)
            .max();
        self.stacking.reset_after_restore(restored_max);

        if restored.is_empty() {
            self.open_default_windows();
        } else if let Some(top) = self.topmost_visible() {
            self.focus.selection.clear();
            self.focus.selection.insert(top.clone());
            self.focus.record_history(&top);
            self.focus.active = Some(top);
            self.emit_selection();
        }

        match snapshot.canvas {
            Some(canvas) if self.viewport.set_transform(canvas.scale, canvas.pan_x, canvas.pan_y) => {
                self.emit_viewport(false);
            }
            _ => {
                self.fit_to_view(None);
            }
        }

        self.session.restoring = false;
        self.refresh_taskbar();
        info!("Restored {} window(s) for {}", restored.len(), self.document_id);
        restored.len()
    }

    /// Seed a fresh document with the outline and codex windows, skipping
    /// any whose content is not available
    fn open_default_windows(&mut self) {
        for id in DEFAULT_WINDOWS {
            let window_id = WindowId::from(id);
            match self.services.content.html_for(window_id.kind(), id) {
                Ok(_) => {
                    self.open_content_window(id, None);
                }
                Err(e) => debug!("Default window {} unavailable: {}", id, e),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::{MapContentProvider, MemoryLayoutStore};
    use crate::wm::test_support::{content, harness, harness_with, spec};

    const TWO_WINDOWS: &str = r#"{
        "windows": [
            {"id": "chapter-7", "title": "Seven", "icon": "", "x": 700, "y": 100, "width": 400, "height": 400,
             "zIndex": 7, "isMinimized": false, "isMaximized": false},
            {"id": "outline-window", "title": "Outline", "icon": "", "x": 100, "y": 100, "width": 500, "height": 600,
             "zIndex": 3, "isMinimized": false, "isMaximized": false}
        ],
        "canvas": {"scale": 0.8, "panX": -20, "panY": 15}
    }"#;

    #[tokio::test(start_paused = true)]
    async fn test_burst_of_mutations_writes_once() {
        let mut h = harness();
        let ws = &mut h.workspace;
        ws.create(spec("a", 100.0, 100.0, 300.0, 300.0));
        ws.create(spec("b", 500.0, 100.0, 300.0, 300.0));
        ws.focus("a", false);
        ws.pan_by(10.0, 0.0);
        assert!(ws.save_pending());

        tokio::time::sleep(Duration::from_millis(1100)).await;
        tokio::task::yield_now().await;

        let saves = h.store.saves();
        assert_eq!(saves.len(), 1);
        let (document, snapshot) = &saves[0];
        assert_eq!(document, "novel");
        assert_eq!(snapshot.windows.len(), 2);
        assert_eq!(snapshot.canvas.unwrap().pan_x, 10.0);
        // Bottom to top
        assert_eq!(snapshot.windows[1].id, "a");
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_write_is_only_logged() {
        let mut h = harness();
        h.store.set_failing(true);
        let ws = &mut h.workspace;
        ws.create(spec("a", 100.0, 100.0, 300.0, 300.0));

        tokio::time::sleep(Duration::from_millis(1100)).await;
        tokio::task::yield_now().await;
        assert!(h.store.saves().is_empty());
        assert!(ws.contains("a"));

        assert!(ws.flush_save().await.is_err());
        h.store.set_failing(false);
        assert!(ws.flush_save().await.is_ok());
        assert_eq!(h.store.saves().len(), 1);
    }

    #[tokio::test]
    async fn test_restore_recomputes_highest_z() {
        let mut h = harness_with(MemoryLayoutStore::with_initial(TWO_WINDOWS), content());
        let ws = &mut h.workspace;
        assert_eq!(ws.load_state(), 2);

        assert_eq!(ws.highest_z_index(), 8);
        let order = ws.stacking_order();
        assert_eq!(order.last().map(|id| id.as_str()), Some("chapter-7"));
        assert_eq!(ws.window("outline-window").unwrap().z_index, 3);
        assert_eq!(ws.active_window().map(|id| id.as_str()), Some("chapter-7"));
        assert_eq!(ws.window("chapter-7").unwrap().content, "<p>chapter seven</p>");

        // Persisted transform is applied verbatim
        assert_eq!(ws.viewport().scale(), 0.8);
        assert_eq!(ws.viewport().pan_x, -20.0);
        assert_eq!(ws.viewport().pan_y, 15.0);

        // Restoring does not write back
        assert!(!ws.save_pending());
        ws.focus("outline-window", false);
        assert_eq!(ws.window("outline-window").unwrap().z_index, 9);
    }

    #[tokio::test]
    async fn test_malformed_layout_falls_back_to_defaults() {
        let mut h = harness_with(MemoryLayoutStore::with_initial("{not json"), content());
        let ws = &mut h.workspace;
        assert_eq!(ws.load_state(), 0);
        assert!(ws.contains("outline-window"));
        assert!(ws.contains("codex-window"));
        assert_eq!(ws.window_count(), 2);
    }

    #[tokio::test]
    async fn test_defaults_skip_unavailable_content() {
        let provider = MapContentProvider::new().with(
            crate::shared::WindowKind::Outline,
            "outline-window",
            "<ol></ol>",
        );
        let mut h = harness_with(MemoryLayoutStore::new(), provider);
        let ws = &mut h.workspace;
        ws.load_state();
        assert!(ws.contains("outline-window"));
        assert!(!ws.contains("codex-window"));
    }

    #[tokio::test]
    async fn test_content_failure_keeps_window_with_placeholder() {
        let raw = r#"{"windows": [{"id": "chapter-404", "title": "Lost", "x": 0, "y": 0,
            "width": 300, "height": 200, "zIndex": 12}]}"#;
        let mut h = harness();
        let ws = &mut h.workspace;
        assert_eq!(ws.restore_from(Some(raw)), 1);
        let window = ws.window("chapter-404").unwrap();
        assert!(window.content.contains("window-load-error"));
        assert_eq!(ws.highest_z_index(), 13);
    }

    #[tokio::test]
    async fn test_restore_without_canvas_fits_view() {
        let raw = r#"{"windows": [{"id": "note", "title": "Note", "x": 0, "y": 0,
            "width": 400, "height": 300, "zIndex": 1}]}"#;
        let mut h = harness();
        let ws = &mut h.workspace;
        ws.set_viewport_size(800.0, 600.0);
        ws.restore_from(Some(raw));
        assert!((ws.viewport().scale() - 1.2).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_restore_reapplies_window_modes() {
        let raw = r#"{"windows": [
            {"id": "a", "title": "A", "x": 100, "y": 100, "width": 300, "height": 300, "zIndex": 1, "isMinimized": true},
            {"id": "b", "title": "B", "x": 200, "y": 200, "width": 300, "height": 300, "zIndex": 2, "isMaximized": true},
            {"id": "c", "title": "C", "x": 300, "y": 300, "width": 300, "height": 300, "zIndex": 3,
             "isMinimized": true, "isMaximized": true},
            {"id": "bad", "title": "Bad", "x": 0, "y": 0, "width": -5, "height": 300, "zIndex": 9}
        ], "canvas": {"scale": 1.0, "panX": 0, "panY": 0}}"#;
        let mut h = harness();
        let ws = &mut h.workspace;
        assert_eq!(ws.restore_from(Some(raw)), 3);

        assert!(ws.window("a").unwrap().is_minimized());
        assert!(ws.window("c").unwrap().is_minimized());
        let b = ws.window("b").unwrap();
        assert!(b.is_maximized());
        assert_eq!(b.rect.width, 1440.0);
        assert_eq!(b.original_rect, Rect::new(200.0, 200.0, 300.0, 300.0));
        assert!(!ws.contains("bad"));
        assert_eq!(ws.active_window().map(|id| id.as_str()), Some("b"));

        // Snapshots persist restore geometry and both flags
        let snapshot = ws.snapshot();
        let b = snapshot.windows.iter().find(|w| w.id == "b").unwrap();
        assert_eq!((b.x, b.y, b.width, b.height), (200.0, 200.0, 300.0, 300.0));
        assert!(b.is_maximized);
        assert_eq!(ws.highest_z_index(), 4);
    }

    #[tokio::test]
    async fn test_huge_persisted_z_is_renumbered() {
        let raw = r#"{"windows": [
            {"id": "top", "title": "Top", "x": 0, "y": 0, "width": 300, "height": 200, "zIndex": 4294967295},
            {"id": "low", "title": "Low", "x": 400, "y": 0, "width": 300, "height": 200, "zIndex": 5}
        ]}"#;
        let mut h = harness();
        let ws = &mut h.workspace;
        assert_eq!(ws.restore_from(Some(raw)), 2);
        assert_eq!(ws.window("low").unwrap().z_index, 1);
        assert_eq!(ws.window("top").unwrap().z_index, 2);
        assert_eq!(ws.highest_z_index(), 3);

        ws.focus("low", false);
        assert_eq!(ws.window("low").unwrap().z_index, 4);
    }

    #[tokio::test]
    async fn test_restore_over_open_windows_keeps_z_increasing() {
        let mut h = harness();
        let ws = &mut h.workspace;
        for i in 0..5 {
            ws.create(spec(&format!("w{}", i), 100.0 * i as f64, 0.0, 300.0, 200.0));
        }
        let before = ws.highest_z_index();

        let raw = r#"{"windows": [{"id": "late", "title": "Late", "x": 0, "y": 400,
            "width": 300, "height": 200, "zIndex": 2}]}"#;
        assert_eq!(ws.restore_from(Some(raw)), 1);
        assert_eq!(ws.highest_z_index(), before);

        ws.focus("w0", false);
        assert!(ws.window("w0").unwrap().z_index > before);
    }

    #[tokio::test]
    async fn test_second_restore_does_not_lower_counter() {
        let mut h = harness();
        let ws = &mut h.workspace;
        ws.restore_from(Some(TWO_WINDOWS));
        assert_eq!(ws.highest_z_index(), 8);

        let raw = r#"{"windows": [{"id": "note", "title": "Note", "x": 0, "y": 0,
            "width": 300, "height": 200, "zIndex": 1}]}"#;
        ws.restore_from(Some(raw));
        assert_eq!(ws.highest_z_index(), 8);
    }

    #[test]
    fn test_snapshot_schema_is_camel_case() {
        let snapshot = LayoutSnapshot {
            windows: vec![PersistedWindow { id: "a".into(), z_index: 4, is_minimized: true, ..Default::default() }],
            canvas: Some(PersistedCanvas { scale: 1.0, pan_x: 2.0, pan_y: 3.0 }),
        };
        let value = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(value["windows"][0]["zIndex"], 4);
        assert_eq!(value["windows"][0]["isMinimized"], true);
        assert_eq!(value["canvas"]["panX"], 2.0);
    }
}
