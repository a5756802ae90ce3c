//! Viewport Module
//!
//! Pan/zoom state of the canvas and conversions between screen space and
//! canvas space. The affine map is `screen = canvas * scale + pan`.

use tracing::debug;

use crate::shared::Rect;

/// Smallest allowed scale
pub const MIN_SCALE: f64 = 0.1;

/// Largest allowed scale
pub const MAX_SCALE: f64 = 1.5;

pub fn clamp_scale(scale: f64) -> f64 {
    scale.clamp(MIN_SCALE, MAX_SCALE)
}

/// Canvas transform plus the fixed sizes it maps between
#[derive(Debug, Clone, PartialEq)]
pub struct Viewport {
    scale: f64,
    pub pan_x: f64,
    pub pan_y: f64,
    /// Visible area in screen pixels
    pub width: f64,
    pub height: f64,
    /// Canvas bounds in canvas units
    pub canvas_width: f64,
    pub canvas_height: f64,
}

impl Viewport {
    pub fn new(width: f64, height: f64, canvas_width: f64, canvas_height: f64) -> Self {
        Self {
            scale: 1.0,
            pan_x: 0.0,
            pan_y: 0.0,
            width,
            height,
            canvas_width,
            canvas_height,
        }
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn center(&self) -> (f64, f64) {
        (self.width / 2.0, self.height / 2.0)
    }

    pub fn screen_to_canvas(&self, px: f64, py: f64) -> (f64, f64) {
        ((px - self.pan_x) / self.scale, (py - self.pan_y) / self.scale)
    }

    pub fn canvas_to_screen(&self, cx: f64, cy: f64) -> (f64, f64) {
        (cx * self.scale + self.pan_x, cy * self.scale + self.pan_y)
    }

    /// Project a canvas rect into screen space
    pub fn rect_to_screen(&self, rect: &Rect) -> Rect {
        let (x, y) = self.canvas_to_screen(rect.x, rect.y);
        Rect::new(x, y, rect.width * self.scale, rect.height * self.scale)
    }

    /// Rescale while keeping the canvas point under `anchor` fixed on screen
    pub fn set_scale_around(&mut self, target: f64, anchor: (f64, f64)) -> bool {
        if !target.is_finite() {
            return false;
        }
        let new_scale = clamp_scale(target);
        if new_scale == self.scale {
            return false;
        }

        let (ax, ay) = anchor;
        let (cx, cy) = self.screen_to_canvas(ax, ay);
        self.scale = new_scale;
        self.pan_x = ax - cx * new_scale;
        self.pan_y = ay - cy * new_scale;

        debug!("Viewport scale {:.3} (pan {:.1}, {:.1})", self.scale, self.pan_x, self.pan_y);
        true
    }

    /// Zoom to an absolute scale around the viewport centre
    pub fn zoom_to(&mut self, target: f64) -> bool {
        let center = self.center();
        self.set_scale_around(target, center)
    }

    /// Zoom by a relative step around `anchor` (viewport centre if absent)
    pub fn zoom_by(&mut self, delta: f64, anchor: Option<(f64, f64)>) -> bool {
        let anchor = anchor.unwrap_or_else(|| self.center());
        self.set_scale_around(self.scale + delta, anchor)
    }

    pub fn pan_by(&mut self, dx: f64, dy: f64) {
        self.pan_x += dx;
        self.pan_y += dy;
    }

    /// Apply a stored transform verbatim (scale is still clamped)
    pub fn set_transform(&mut self, scale: f64, pan_x: f64, pan_y: f64) -> bool {
        if !(scale.is_finite() && pan_x.is_finite() && pan_y.is_finite()) {
            return false;
        }
        self.scale = clamp_scale(scale);
        self.pan_x = pan_x;
        self.pan_y = pan_y;
        true
    }

    /// Scale and centre so every rect is visible with `padding` around the
    /// bounding box. Returns false when there is nothing sensible to fit.
    pub fn fit_to_view<I>(&mut self, rects: I, padding: f64) -> bool
    where
        I: IntoIterator<Item = Rect>,
    {
        let Some(bounds) = rects.into_iter().reduce(|acc, r| acc.union(&r)) else {
            return false;
        };
        if !bounds.is_finite() || bounds.width <= 0.0 || bounds.height <= 0.0 {
            return false;
        }

        let fit_x = self.width / (bounds.width + 2.0 * padding);
        let fit_y = self.height / (bounds.height + 2.0 * padding);
        let scale = clamp_scale(MAX_SCALE.min(fit_x).min(fit_y));
        if !scale.is_finite() {
            return false;
        }

        self.scale = scale;
        self.pan_x = (self.width - bounds.width * scale) / 2.0 - bounds.x * scale;
        self.pan_y = (self.height - bounds.height * scale) / 2.0 - bounds.y * scale;

        debug!("Fit {} x {} into view at scale {:.3}", bounds.width, bounds.height, scale);
        true
    }
}
