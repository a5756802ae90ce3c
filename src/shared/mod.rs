//! Shared value types and scheduling helpers

pub mod scheduler;
pub mod window_state;

pub use window_state::{
    CHAPTER_PREFIX, CODEX_ENTRY_PREFIX, CODEX_WINDOW_ID, OUTLINE_WINDOW_ID, Rect, WindowId, WindowKind, WindowMode,
};
