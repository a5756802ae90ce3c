//! Folio - canvas workspace engine
//!
//! Windowing and viewport engine for a novel-writing workspace: draggable,
//! resizable document windows on a pannable, zoomable canvas, with focus
//! and multi-selection, a taskbar and debounced layout persistence.

pub mod canvas;
pub mod config;
pub mod document;
pub mod error;
pub mod ipc;
pub mod services;
pub mod shared;
pub mod shell;
pub mod wm;

pub use canvas::Viewport;
pub use config::Config;
pub use document::DocumentStructure;
pub use services::Services;
pub use shared::{Rect, WindowId, WindowKind, WindowMode};
pub use wm::{Wake, WindowSpec, WindowState, Workspace, WorkspaceEvent};
