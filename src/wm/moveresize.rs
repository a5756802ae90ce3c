//! MoveResize Module
//!
//! Pointer sessions for moving and resizing windows. Only one session runs
//! at a time (global pointer capture):
//!
//! ```text
//! Idle -> Dragging -> Idle
//! Idle -> Resizing -> Idle
//! ```
//!
//! A drag moves every selected window, each keeping its canvas-space offset
//! from the pointer. Near a viewport edge the auto-pan loop moves the canvas
//! under the dragged windows, which stay pinned under the cursor.

use std::time::Duration;
use tracing::debug;

use crate::shared::{Rect, WindowId};
use crate::wm::autopan::{PanDirection, PanLoop, edge_direction};
use crate::wm::{Workspace, WorkspaceEvent};

/// Drag in progress
#[derive(Debug, Clone)]
pub struct DragSession {
    /// Pointer offset from each dragged window's origin, in canvas units
    pub offsets: Vec<(WindowId, f64, f64)>,

    /// Last pointer position in screen space
    pub pointer: (f64, f64),

    /// Current auto-pan direction
    pub pan_direction: PanDirection,
}

/// Resize in progress
#[derive(Debug, Clone)]
pub struct ResizeSession {
    pub window: WindowId,

    /// Pointer position at start (screen space)
    pub start_pointer: (f64, f64),

    /// Window size at start (canvas units)
    pub start_size: (f64, f64),
}

#[derive(Debug, Clone)]
pub enum PointerSession {
    Drag(DragSession),
    Resize(ResizeSession),
}

/// Move/resize manager
pub struct MoveResizeManager {
    /// Current session
    pub session: Option<PointerSession>,

    /// Edge auto-pan loop, bound to the drag session
    pub pan_loop: PanLoop,
}

impl MoveResizeManager {
    pub fn new() -> Self {
        Self {
            session: None,
            pan_loop: PanLoop::new(),
        }
    }

    pub fn is_active(&self) -> bool {
        self.session.is_some()
    }
}

impl Default for MoveResizeManager {
    fn default() -> Self {
        Self::new()
    }
}

impl Workspace {
    pub fn is_dragging(&self) -> bool {
        matches!(self.moveresize.session, Some(PointerSession::Drag(_)))
    }

    pub fn is_resizing(&self) -> bool {
        matches!(self.moveresize.session, Some(PointerSession::Resize(_)))
    }

    pub fn is_auto_panning(&self) -> bool {
        self.moveresize.pan_loop.is_running()
    }

    /// Start moving the selection by grabbing window `id` at a screen point
    pub fn begin_drag(&mut self, id: &str, px: f64, py: f64) -> bool {
        if self.moveresize.is_active() || !self.focus.selection.contains(id) {
            return false;
        }

        let (cx, cy) = self.viewport.screen_to_canvas(px, py);
        let offsets: Vec<_> = self
            .focus
            .selection
            .iter()
            .filter_map(|sel| self.windows.get(sel))
            .filter(|w| !w.is_minimized())
            .map(|w| (w.id.clone(), cx - w.rect.x, cy - w.rect.y))
            .collect();
        if offsets.is_empty() {
            return false;
        }

        debug!("Starting drag of {} window(s)", offsets.len());
        self.moveresize.session = Some(PointerSession::Drag(DragSession {
            offsets,
            pointer: (px, py),
            pan_direction: PanDirection::NONE,
        }));
        true
    }

    /// Start resizing window `id` from its handle. Only that window resizes.
    pub fn begin_resize(&mut self, id: &str, px: f64, py: f64) -> bool {
        if self.moveresize.is_active() {
            return false;
        }
        let Some(window) = self.windows.get(id) else {
            return false;
        };
        if window.is_minimized() || window.is_maximized() {
            return false;
        }

        debug!("Starting resize of {}", window.id);
        self.moveresize.session = Some(PointerSession::Resize(ResizeSession {
            window: window.id.clone(),
            start_pointer: (px, py),
            start_size: (window.rect.width, window.rect.height),
        }));
        true
    }

    /// Pointer moved during a session
    pub fn pointer_move(&mut self, px: f64, py: f64) {
        match &mut self.moveresize.session {
            Some(PointerSession::Drag(drag)) => {
                drag.pointer = (px, py);
                let direction = edge_direction(&self.viewport, px, py, self.config.drag.edge_margin);
                drag.pan_direction = direction;
                self.apply_drag();
                self.update_pan_loop(direction);
            }
            Some(PointerSession::Resize(_)) => self.apply_resize(px, py),
            None => {}
        }
    }

    /// Pointer released: commit geometry and release capture
    pub fn end_pointer_session(&mut self) {
        let Some(session) = self.moveresize.session.take() else {
            return;
        };
        self.moveresize.pan_loop.stop();

        match session {
            PointerSession::Drag(drag) => {
                for (id, _, _) in &drag.offsets {
                    if let Some(window) = self.windows.get_mut(id) {
                        if !window.is_maximized() {
                            window.original_rect.x = window.rect.x;
                            window.original_rect.y = window.rect.y;
                        }
                    }
                }
                debug!("Drag finished");
            }
            PointerSession::Resize(resize) => {
                if let Some(window) = self.windows.get_mut(&resize.window) {
                    if !window.is_maximized() {
                        window.original_rect.width = window.rect.width;
                        window.original_rect.height = window.rect.height;
                    }
                }
                debug!("Resize of {} finished", resize.window);
            }
        }
        self.request_save();
    }

    /// Double-click on a window body: reset zoom and bring the window into
    /// view, unless the hit target is an interactive child
    pub fn double_click(&mut self, id: &str, target_classes: &[String]) -> bool {
        if !self.windows.contains_key(id) {
            return false;
        }
        let denylist = &self.config.interaction.double_click_denylist;
        if target_classes.iter().any(|c| denylist.contains(c)) {
            debug!("Double-click on interactive child of {} ignored", id);
            return false;
        }
        self.zoom_to(1.0, true);
        self.scroll_into_view(id);
        true
    }

    /// One frame of auto-pan
    pub(crate) fn auto_pan_frame(&mut self) {
        let direction = match &self.moveresize.session {
            Some(PointerSession::Drag(drag)) => drag.pan_direction,
            _ => PanDirection::NONE,
        };
        if direction.is_none() {
            self.moveresize.pan_loop.stop();
            return;
        }

        let step = self.config.drag.pan_step;
        self.viewport.pan_by(-direction.x * step, -direction.y * step);
        self.emit_viewport(false);
        self.apply_drag();
    }

    /// Drop a closed window from the pointer session
    pub(crate) fn forget_pointer_target(&mut self, id: &WindowId) {
        match &mut self.moveresize.session {
            Some(PointerSession::Drag(drag)) => {
                drag.offsets.retain(|(w, _, _)| w != id);
                if drag.offsets.is_empty() {
                    self.moveresize.session = None;
                    self.moveresize.pan_loop.stop();
                }
            }
            Some(PointerSession::Resize(resize)) if &resize.window == id => {
                self.moveresize.session = None;
            }
            _ => {}
        }
    }

    /// Move dragged windows so the pointer keeps its offset inside each
    fn apply_drag(&mut self) {
        let Some(PointerSession::Drag(drag)) = &self.moveresize.session else {
            return;
        };
        let (cx, cy) = self.viewport.screen_to_canvas(drag.pointer.0, drag.pointer.1);
        let canvas = (self.viewport.canvas_width, self.viewport.canvas_height);

        let mut moved = Vec::with_capacity(drag.offsets.len());
        for (id, ox, oy) in &drag.offsets {
            let Some(window) = self.windows.get_mut(id) else {
                continue;
            };
            let x = clamp_origin(cx - ox, window.rect.width, canvas.0);
            let y = clamp_origin(cy - oy, window.rect.height, canvas.1);
            if x != window.rect.x || y != window.rect.y {
                window.rect.x = x;
                window.rect.y = y;
                moved.push((id.clone(), window.rect));
            }
        }
        for (id, rect) in moved {
            self.emit(WorkspaceEvent::WindowGeometryChanged { id, rect });
        }
    }

    fn apply_resize(&mut self, px: f64, py: f64) {
        let Some(PointerSession::Resize(resize)) = &self.moveresize.session else {
            return;
        };
        let Some(window) = self.windows.get_mut(&resize.window) else {
            return;
        };

        let scale = self.viewport.scale();
        let limits = &self.config.windows;
        let width = resize.start_size.0 + (px - resize.start_pointer.0) / scale;
        let height = resize.start_size.1 + (py - resize.start_pointer.1) / scale;

        let max_width = (self.viewport.width / scale)
            .min(limits.max_width)
            .min(self.viewport.canvas_width - window.rect.x);
        let max_height = (self.viewport.height / scale)
            .min(limits.max_height)
            .min(self.viewport.canvas_height - window.rect.y);

        let rect = Rect::new(
            window.rect.x,
            window.rect.y,
            clamp_size(width, limits.min_width, max_width),
            clamp_size(height, limits.min_height, max_height),
        );
        if rect == window.rect {
            return;
        }
        window.rect = rect;
        let id = window.id.clone();
        self.emit(WorkspaceEvent::WindowGeometryChanged { id, rect });
    }

    fn update_pan_loop(&mut self, direction: PanDirection) {
        if direction.is_none() {
            self.moveresize.pan_loop.stop();
        } else {
            let interval = Duration::from_millis(self.config.drag.frame_interval_ms);
            self.moveresize.pan_loop.start(interval, self.wake_tx.clone());
        }
    }
}

/// Keep a window of `size` inside `[0, extent]`
fn clamp_origin(origin: f64, size: f64, extent: f64) -> f64 {
    origin.min(extent - size).max(0.0)
}

/// Floor wins when the ceiling is below it
fn clamp_size(size: f64, min: f64, max: f64) -> f64 {
    size.min(max).max(min.min(max.max(0.0)))
}
