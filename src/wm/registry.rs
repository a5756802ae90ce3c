//! Registry Module
//!
//! Window lifecycle: create, close, minimize, restore, maximize and
//! reposition. Every operation is a no-op on an unknown id and returns
//! whether anything changed.

use std::time::Duration;
use tracing::{debug, info, warn};

use crate::error::ContentError;
use crate::shared::{CODEX_WINDOW_ID, OUTLINE_WINDOW_ID, Rect, WindowId, WindowKind, WindowMode};
use crate::wm::{Wake, WindowSpec, WindowState, Workspace, WorkspaceEvent};

/// Offset between consecutively opened content windows
const CASCADE_STEP: f64 = 30.0;

/// Inline markup shown in place of content that failed to load
pub fn error_placeholder(id: &WindowId, error: &ContentError) -> String {
    format!(r#"<div class="window-load-error">Could not load {id}: {error}</div>"#)
}

impl Workspace {
    /// Open a window. Opening an id that is already open focuses it instead.
    pub fn create(&mut self, spec: WindowSpec) -> WindowId {
        let id = match spec.id.clone() {
            Some(id) => id,
            None => self.mint_window_id(),
        };

        if self.windows.contains_key(&id) {
            debug!("Window {} already open, focusing", id);
            if self.window(id.as_str()).is_some_and(|w| w.is_minimized()) {
                self.restore(id.as_str());
            } else {
                self.focus(id.as_str(), false);
            }
            return id;
        }

        let window = WindowState::from_spec(id.clone(), spec);
        info!("Opening window {} ({:?})", id, window.kind());
        self.emit(WorkspaceEvent::WindowOpened {
            id: id.clone(),
            title: window.title.clone(),
            rect: window.rect,
            z_index: window.z_index,
            closable: window.closable,
        });
        self.windows.insert(id.clone(), window);

        self.focus(id.as_str(), false);
        self.commit();
        id
    }

    /// Open a document window by id, fetching its markup from the content
    /// provider. A failed fetch still opens the window with a placeholder.
    pub fn open_content_window(&mut self, id: &str, title: Option<&str>) -> WindowId {
        let id = WindowId::from(id);
        if self.windows.contains_key(&id) {
            return self.create(WindowSpec::new(String::new(), Rect::default()).with_id(id));
        }

        let kind = id.kind();
        let content = self.fetch_content(&id);
        let [width, height] = self.config.windows.default_size(kind);
        let [x, y] = self.config.windows.default_origin;
        let cascade = (self.windows.len() % 10) as f64 * CASCADE_STEP;

        let title = title
            .map(str::to_string)
            .unwrap_or_else(|| default_title(&id));
        let spec = WindowSpec::new(title, Rect::new(x + cascade, y + cascade, width, height))
            .with_id(id)
            .icon(default_icon(kind))
            .content(content);
        self.create(spec)
    }

    /// Close a window and drop every derived reference to it
    pub fn close(&mut self, id: &str) -> bool {
        let Some(window) = self.windows.remove(id) else {
            return false;
        };
        let id = window.id;
        info!("Closing window {}", id);

        self.focus.forget(&id);
        self.cycle.forget(&id);
        self.forget_pointer_target(&id);

        self.emit(WorkspaceEvent::WindowClosed { id: id.clone() });
        if !window.satellites.is_empty() {
            self.emit(WorkspaceEvent::SatellitesDetached {
                id: id.clone(),
                satellites: window.satellites,
            });
        }
        self.emit_selection();
        self.commit();
        true
    }

    pub fn minimize(&mut self, id: &str) -> bool {
        if !self.apply_minimize(id) {
            return false;
        }
        let id = WindowId::from(id);
        self.focus.deselect(&id);
        self.cycle.forget(&id);
        self.emit_mode(&id);
        self.emit_selection();
        self.commit();
        true
    }

    pub fn restore(&mut self, id: &str) -> bool {
        let Some(window) = self.windows.get_mut(id) else {
            return false;
        };
        if !window.is_minimized() {
            return false;
        }
        window.mode = WindowMode::Normal;
        window.rect = window.original_rect;
        let id = window.id.clone();
        debug!("Restored {}", id);

        self.emit_mode(&id);
        self.emit_geometry(&id);
        self.focus(id.as_str(), false);
        self.commit();
        true
    }

    /// Maximize, or return a maximized window to its cached geometry
    pub fn toggle_maximize(&mut self, id: &str) -> bool {
        let Some(window) = self.windows.get_mut(id) else {
            return false;
        };
        let id = window.id.clone();

        if window.is_maximized() {
            window.mode = WindowMode::Normal;
            window.rect = window.original_rect;
            debug!("Unmaximized {}", id);
        } else {
            self.apply_maximize(id.as_str());
            self.schedule_settle(&id);
        }

        self.emit_mode(&id);
        self.emit_geometry(&id);
        self.focus(id.as_str(), false);
        self.commit();
        true
    }

    pub fn maximize(&mut self, id: &str) -> bool {
        match self.windows.get(id) {
            Some(window) if !window.is_maximized() => self.toggle_maximize(id),
            _ => false,
        }
    }

    /// Place a window at an exact rect in normal mode
    pub fn reposition(&mut self, id: &str, rect: Rect) -> bool {
        let Some(window) = self.windows.get_mut(id) else {
            return false;
        };
        let mode_changed = window.mode != WindowMode::Normal;
        window.mode = WindowMode::Normal;
        window.rect = rect;
        window.original_rect = rect;
        let id = window.id.clone();

        if mode_changed {
            self.emit_mode(&id);
        }
        self.emit_geometry(&id);
        self.focus(id.as_str(), false);
        self.commit();
        true
    }

    /// Bind auxiliary UI to a window; reported when the window closes
    pub fn attach_satellite(&mut self, id: &str, key: impl Into<String>) -> bool {
        let Some(window) = self.windows.get_mut(id) else {
            return false;
        };
        let key = key.into();
        if !window.satellites.contains(&key) {
            window.satellites.push(key);
        }
        true
    }

    /// Ask the editor launcher for a dedicated editor
    pub fn open_editor(&mut self, id: &str) -> bool {
        let id = WindowId::from(id);
        let Some(key) = id.content_key() else {
            return false;
        };
        match id.kind() {
            WindowKind::Chapter => self.services.editors.open_chapter_editor(key),
            WindowKind::CodexEntry => self.services.editors.open_codex_editor(key),
            _ => return false,
        }
        self.emit(WorkspaceEvent::EditorRequested { id });
        true
    }

    /// Minimize without focus or persistence side effects
    pub(crate) fn apply_minimize(&mut self, id: &str) -> bool {
        let Some(window) = self.windows.get_mut(id) else {
            return false;
        };
        match window.mode {
            WindowMode::Minimized => return false,
            WindowMode::Normal => window.original_rect = window.rect,
            // The cached pre-maximize rect is already the restore target
            WindowMode::Maximized => window.rect = window.original_rect,
        }
        window.mode = WindowMode::Minimized;
        debug!("Minimized {}", window.id);
        true
    }

    /// Maximize without focus or persistence side effects
    pub(crate) fn apply_maximize(&mut self, id: &str) -> bool {
        let Some(window) = self.windows.get_mut(id) else {
            return false;
        };
        match window.mode {
            WindowMode::Maximized => return false,
            WindowMode::Normal => window.original_rect = window.rect,
            WindowMode::Minimized => {}
        }

        let limits = &self.config.windows;
        let width = (self.viewport.width * limits.maximize_fraction).min(limits.max_width);
        let height = (self.viewport.height * limits.maximize_fraction).min(limits.max_height);
        let x = window.rect.x.min(self.viewport.canvas_width - width).max(0.0);
        let y = window.rect.y.min(self.viewport.canvas_height - height).max(0.0);
        window.rect = Rect::new(x, y, width, height);
        window.mode = WindowMode::Maximized;
        debug!("Maximized {} to {}x{}", window.id, width, height);

        // Absolute sizing needs scale 1
        if self.viewport.zoom_to(1.0) {
            self.emit_viewport(true);
        }
        true
    }

    pub(crate) fn fetch_content(&self, id: &WindowId) -> String {
        let key = id.content_key().unwrap_or(id.as_str());
        match self.services.content.html_for(id.kind(), key) {
            Ok(html) => html,
            Err(e) => {
                warn!("Failed to load content for {}: {}", id, e);
                error_placeholder(id, &e)
            }
        }
    }

    fn mint_window_id(&mut self) -> WindowId {
        loop {
            self.next_window_number += 1;
            let id = WindowId::new(format!("window-{}", self.next_window_number));
            if !self.windows.contains_key(&id) {
                return id;
            }
        }
    }

    /// Scroll a maximized window into view once its transition is over
    fn schedule_settle(&mut self, id: &WindowId) {
        if let Some(previous) = self.settle_task.take() {
            previous.abort();
        }
        let delay = Duration::from_millis(self.config.windows.maximize_transition_ms);
        let wake_tx = self.wake_tx.clone();
        let id = id.clone();
        self.settle_task = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = wake_tx.send(Wake::MaximizeSettled(id));
        }));
    }
}

fn default_title(id: &WindowId) -> String {
    match id.kind() {
        WindowKind::Outline => "Outline".to_string(),
        WindowKind::Codex => "Codex".to_string(),
        WindowKind::Chapter => format!("Chapter {}", id.content_key().unwrap_or_default()),
        WindowKind::CodexEntry => id.content_key().unwrap_or_default().to_string(),
        WindowKind::Custom => id.to_string(),
    }
}

fn default_icon(kind: WindowKind) -> &'static str {
    match kind {
        WindowKind::Outline => "icon-outline",
        WindowKind::Codex => "icon-codex",
        WindowKind::CodexEntry => "icon-codex-entry",
        WindowKind::Chapter => "icon-chapter",
        WindowKind::Custom => "icon-window",
    }
}

/// Windows created when nothing was persisted
pub(crate) const DEFAULT_WINDOWS: [&str; 2] = [OUTLINE_WINDOW_ID, CODEX_WINDOW_ID];

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wm::test_support::{harness, spec};

    #[tokio::test]
    async fn test_create_close_counts_and_idempotent_open() {
        let mut h = harness();
        let ws = &mut h.workspace;
        ws.create(spec("a", 0.0, 0.0, 300.0, 200.0));
        ws.create(spec("b", 0.0, 0.0, 300.0, 200.0));
        ws.create(spec("a", 50.0, 50.0, 10.0, 10.0));
        assert_eq!(ws.window_count(), 2);
        // Re-opening focused the existing window without touching its geometry
        assert_eq!(ws.active_window().map(|w| w.as_str()), Some("a"));
        assert_eq!(ws.window("a").unwrap().rect, Rect::new(0.0, 0.0, 300.0, 200.0));

        assert!(ws.close("a"));
        assert!(!ws.close("a"));
        assert_eq!(ws.window_count(), 1);
    }

    #[tokio::test]
    async fn test_minted_ids_are_unique() {
        let mut h = harness();
        let ws = &mut h.workspace;
        let first = ws.create(WindowSpec::new("one", Rect::new(0.0, 0.0, 100.0, 100.0)));
        let second = ws.create(WindowSpec::new("two", Rect::new(0.0, 0.0, 100.0, 100.0)));
        assert_ne!(first, second);
        assert_eq!(ws.window_count(), 2);
    }

    #[tokio::test]
    async fn test_close_clears_selection_and_active() {
        let mut h = harness();
        let ws = &mut h.workspace;
        ws.create(spec("a", 0.0, 0.0, 300.0, 200.0));
        ws.attach_satellite("a", "pov-editor");
        ws.drain_events();

        ws.close("a");
        assert_eq!(ws.active_window(), None);
        assert!(!ws.is_selected("a"));
        let events = ws.drain_events();
        assert!(events.contains(&WorkspaceEvent::SatellitesDetached {
            id: WindowId::from("a"),
            satellites: vec!["pov-editor".to_string()],
        }));
    }

    #[tokio::test]
    async fn test_minimize_restore_roundtrip() {
        let mut h = harness();
        let ws = &mut h.workspace;
        ws.create(spec("a", 120.0, 80.0, 300.0, 200.0));
        let before = ws.window("a").unwrap().rect;

        assert!(ws.minimize("a"));
        assert!(!ws.minimize("a"));
        assert_eq!(ws.active_window(), None);
        assert!(!ws.is_selected("a"));

        assert!(ws.restore("a"));
        assert!(!ws.restore("a"));
        let window = ws.window("a").unwrap();
        assert_eq!(window.rect, before);
        assert_eq!(window.original_rect, before);
        assert_eq!(window.mode, WindowMode::Normal);
        assert_eq!(ws.active_window().map(|w| w.as_str()), Some("a"));
    }

    #[tokio::test]
    async fn test_maximize_roundtrip_and_scale() {
        let mut h = harness();
        let ws = &mut h.workspace;
        ws.create(spec("a", 120.0, 80.0, 300.0, 200.0));
        ws.zoom_to(0.5, false);
        let before = ws.window("a").unwrap().rect;

        assert!(ws.toggle_maximize("a"));
        let window = ws.window("a").unwrap();
        assert!(window.is_maximized());
        // 90% of 1600x1000 is under the 1600x1200 cap
        assert_eq!((window.rect.width, window.rect.height), (1440.0, 900.0));
        assert_eq!(ws.viewport().scale(), 1.0);

        assert!(ws.toggle_maximize("a"));
        assert_eq!(ws.window("a").unwrap().rect, before);
        assert_eq!(ws.window("a").unwrap().mode, WindowMode::Normal);
    }

    #[tokio::test]
    async fn test_minimizing_maximized_window_restores_to_cached_rect() {
        let mut h = harness();
        let ws = &mut h.workspace;
        ws.create(spec("a", 120.0, 80.0, 300.0, 200.0));
        ws.toggle_maximize("a");
        ws.minimize("a");
        ws.restore("a");
        let window = ws.window("a").unwrap();
        assert_eq!(window.mode, WindowMode::Normal);
        assert_eq!(window.rect, Rect::new(120.0, 80.0, 300.0, 200.0));
    }

    #[tokio::test(start_paused = true)]
    async fn test_maximize_schedules_scroll_into_view() {
        let mut h = harness();
        let ws = &mut h.workspace;
        ws.create(spec("a", 100.0, 100.0, 300.0, 200.0));
        ws.pan_by(-400.0, 0.0);
        ws.toggle_maximize("a");

        let wake = h.wakes.recv().await.unwrap();
        assert_eq!(wake, Wake::MaximizeSettled(WindowId::from("a")));
        ws.handle_wake(wake);
        let screen = ws.viewport().rect_to_screen(&ws.window("a").unwrap().rect);
        assert!(screen.x >= 25.0 - 15.0);
    }

    #[tokio::test]
    async fn test_reposition_clears_minimized_and_maximized() {
        let mut h = harness();
        let ws = &mut h.workspace;
        ws.create(spec("a", 0.0, 0.0, 300.0, 200.0));
        ws.minimize("a");
        let target = Rect::new(400.0, 300.0, 500.0, 500.0);
        assert!(ws.reposition("a", target));
        let window = ws.window("a").unwrap();
        assert_eq!(window.mode, WindowMode::Normal);
        assert_eq!(window.rect, target);
        assert_eq!(window.original_rect, target);

        ws.toggle_maximize("a");
        ws.reposition("a", target);
        assert_eq!(ws.window("a").unwrap().mode, WindowMode::Normal);
    }

    #[tokio::test]
    async fn test_open_content_window_uses_placeholder_on_failure() {
        let mut h = harness();
        let ws = &mut h.workspace;
        let ok = ws.open_content_window("chapter-7", None);
        let missing = ws.open_content_window("chapter-99", Some("Lost"));

        assert_eq!(ws.window(ok.as_str()).unwrap().content, "<p>chapter seven</p>");
        let lost = ws.window(missing.as_str()).unwrap();
        assert!(lost.content.contains("window-load-error"));
        assert_eq!(lost.title, "Lost");
        assert_eq!(ws.window_count(), 2);
    }

    #[tokio::test]
    async fn test_open_editor_by_kind() {
        let mut h = harness();
        assert!(h.workspace.open_editor("chapter-7"));
        assert!(h.workspace.open_editor("codex-entry-ann"));
        assert!(!h.workspace.open_editor("outline-window"));
        assert_eq!(h.editors.requests().len(), 2);
    }

    #[tokio::test]
    async fn test_unknown_ids_are_noops() {
        let mut h = harness();
        let ws = &mut h.workspace;
        assert!(!ws.close("ghost"));
        assert!(!ws.minimize("ghost"));
        assert!(!ws.restore("ghost"));
        assert!(!ws.toggle_maximize("ghost"));
        assert!(!ws.reposition("ghost", Rect::default()));
        assert!(!ws.attach_satellite("ghost", "x"));
    }
}
