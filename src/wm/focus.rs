//! Focus Module
//!
//! Active window, multi-selection and scroll-into-view.
//!
//! Selection and the active window hold window ids by value. Ids can go
//! stale between an event being queued and handled, so every lookup goes
//! through the window map and a missing id is a no-op.

use std::collections::{BTreeSet, VecDeque};
use tracing::debug;

use crate::shared::WindowId;
use crate::wm::{Workspace, WorkspaceEvent};

/// Focus manager
pub struct FocusManager {
    /// Window receiving interactivity emphasis
    pub active: Option<WindowId>,

    /// Windows moved together by a drag
    pub selection: BTreeSet<WindowId>,

    /// Most recently focused first (for cycling)
    pub focus_history: VecDeque<WindowId>,

    /// Maximum history size
    pub max_history_size: usize,
}

impl FocusManager {
    pub fn new() -> Self {
        Self {
            active: None,
            selection: BTreeSet::new(),
            focus_history: VecDeque::new(),
            max_history_size: 20,
        }
    }

    pub fn is_selected(&self, id: &WindowId) -> bool {
        self.selection.contains(id)
    }

    /// Drop `id` from the selection; the active window goes with it
    pub fn deselect(&mut self, id: &WindowId) -> bool {
        let removed = self.selection.remove(id);
        if self.active.as_ref() == Some(id) {
            self.active = None;
            return true;
        }
        removed
    }

    /// Remove every reference to a closed window
    pub fn forget(&mut self, id: &WindowId) {
        self.deselect(id);
        self.focus_history.retain(|w| w != id);
    }

    pub fn clear(&mut self) -> bool {
        let changed = self.active.is_some() || !self.selection.is_empty();
        self.active = None;
        self.selection.clear();
        changed
    }

    pub(crate) fn record_history(&mut self, id: &WindowId) {
        self.focus_history.retain(|w| w != id);
        self.focus_history.push_front(id.clone());
        while self.focus_history.len() > self.max_history_size {
            self.focus_history.pop_back();
        }
    }
}

impl Default for FocusManager {
    fn default() -> Self {
        Self::new()
    }
}

impl Workspace {
    pub fn active_window(&self) -> Option<&WindowId> {
        self.focus.active.as_ref()
    }

    pub fn selection(&self) -> impl Iterator<Item = &WindowId> {
        self.focus.selection.iter()
    }

    pub fn is_selected(&self, id: &str) -> bool {
        self.focus.selection.contains(id)
    }

    /// Click on a window.
    ///
    /// Without shift: select only this window (unless it is already part of
    /// the selection), raise it, make it active and scroll it into view.
    /// With shift: toggle it in the selection. Shift-deselecting the active
    /// window also clears the active window.
    pub fn focus(&mut self, id: &str, shift: bool) -> bool {
        let Some(window) = self.windows.get(id) else {
            return false;
        };
        if window.is_minimized() {
            return false;
        }
        let id = window.id.clone();

        if !shift && self.focus.active.as_ref() == Some(&id) {
            return false;
        }

        if shift {
            if self.focus.is_selected(&id) {
                self.focus.deselect(&id);
                debug!("Deselected {}", id);
                self.emit_selection();
                self.refresh_taskbar();
                return true;
            }
            self.focus.selection.insert(id.clone());
        } else if !self.focus.is_selected(&id) {
            self.focus.selection.clear();
            self.focus.selection.insert(id.clone());
        }

        let z_index = self.stacking.raise();
        if let Some(window) = self.windows.get_mut(&id) {
            window.z_index = z_index;
        }
        self.focus.active = Some(id.clone());
        self.focus.record_history(&id);
        debug!("Focused {} (z={})", id, z_index);

        self.emit(WorkspaceEvent::WindowFocused { id: id.clone(), z_index });
        self.emit_selection();

        if !shift {
            self.scroll_into_view(id.as_str());
        }
        self.commit();
        true
    }

    /// Click on empty canvas. Z-order is untouched.
    pub fn clear_focus(&mut self) {
        if self.focus.clear() {
            debug!("Cleared focus and selection");
            self.emit_selection();
            self.refresh_taskbar();
        }
    }

    /// Pan just enough to bring a window inside the padded viewport.
    /// The left/top edge wins for windows larger than the viewport.
    pub fn scroll_into_view(&mut self, id: &str) -> bool {
        let Some(window) = self.windows.get(id) else {
            return false;
        };
        if window.is_minimized() {
            return false;
        }

        let padding = self.config.focus.scroll_padding;
        let tolerance = self.config.focus.scroll_tolerance;
        let screen = self.viewport.rect_to_screen(&window.rect);

        let dx = scroll_delta(screen.x, screen.width, self.viewport.width, padding);
        let dy = scroll_delta(screen.y, screen.height, self.viewport.height, padding);
        let dx = if dx.abs() > tolerance { dx } else { 0.0 };
        let dy = if dy.abs() > tolerance { dy } else { 0.0 };

        if dx == 0.0 && dy == 0.0 {
            return false;
        }
        debug!("Scrolling {} into view by ({:.1}, {:.1})", id, dx, dy);
        self.viewport.pan_by(dx, dy);
        self.emit_viewport(true);
        true
    }

    pub(crate) fn emit_selection(&mut self) {
        let event = WorkspaceEvent::SelectionChanged {
            active: self.focus.active.clone(),
            selected: self.focus.selection.iter().cloned().collect(),
        };
        self.emit(event);
    }
}

/// Pan needed along one axis to bring `[start, start + size]` inside
/// `[padding, extent - padding]`
fn scroll_delta(start: f64, size: f64, extent: f64, padding: f64) -> f64 {
    if start < padding {
        padding - start
    } else if start + size > extent - padding && size <= extent - 2.0 * padding {
        (extent - padding) - (start + size)
    } else {
        0.0
    }
}
