//! Shell UI Module
//!
//! Workspace chrome derived from window state. Currently the taskbar.

pub mod panel;

pub use panel::{ReconcileReport, Taskbar, TaskbarEntry, TaskbarNode};
