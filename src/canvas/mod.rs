//! Canvas Module
//!
//! Geometry and transform state of the pannable, zoomable canvas.

pub mod viewport;

pub use viewport::{MAX_SCALE, MIN_SCALE, Viewport};
