//! Zoom Module
//!
//! Workspace-level pan/zoom operations. The transform itself lives in
//! `canvas::Viewport`; these wrappers add events and persistence.

use tracing::debug;

use crate::wm::Workspace;

impl Workspace {
    pub fn screen_to_canvas(&self, px: f64, py: f64) -> (f64, f64) {
        self.viewport.screen_to_canvas(px, py)
    }

    pub fn canvas_to_screen(&self, cx: f64, cy: f64) -> (f64, f64) {
        self.viewport.canvas_to_screen(cx, cy)
    }

    /// Zoom to an absolute scale around the viewport centre
    pub fn zoom_to(&mut self, target: f64, animated: bool) -> bool {
        if !self.viewport.zoom_to(target) {
            return false;
        }
        self.emit_viewport(animated);
        self.request_save();
        true
    }

    /// Zoom by a step, keeping the canvas point under `anchor` in place
    pub fn zoom_by(&mut self, delta: f64, anchor: Option<(f64, f64)>) -> bool {
        if !self.viewport.zoom_by(delta, anchor) {
            return false;
        }
        self.emit_viewport(false);
        self.request_save();
        true
    }

    pub fn zoom_in(&mut self) -> bool {
        self.zoom_by(self.config.canvas.zoom_step, None)
    }

    pub fn zoom_out(&mut self) -> bool {
        self.zoom_by(-self.config.canvas.zoom_step, None)
    }

    pub fn reset_zoom(&mut self) -> bool {
        self.zoom_to(1.0, true)
    }

    pub fn pan_by(&mut self, dx: f64, dy: f64) {
        if dx == 0.0 && dy == 0.0 {
            return;
        }
        self.viewport.pan_by(dx, dy);
        self.emit_viewport(false);
        self.request_save();
    }

    /// Fit every non-minimized window into view. No-op without windows.
    pub fn fit_to_view(&mut self, padding: Option<f64>) -> bool {
        let padding = padding.unwrap_or(self.config.canvas.fit_padding);
        let rects: Vec<_> = self
            .windows
            .values()
            .filter(|w| !w.is_minimized())
            .map(|w| w.rect)
            .collect();
        if !self.viewport.fit_to_view(rects, padding) {
            debug!("Nothing to fit");
            return false;
        }
        self.emit_viewport(true);
        self.request_save();
        true
    }
}
