//! Window Manager Module
//!
//! The workspace session context: every window, the canvas viewport, focus
//! and selection, the pointer session and the persistence bridge, owned by
//! one `Workspace` and mutated only by its owner.

pub mod autopan;
pub mod cycle;
pub mod focus;
pub mod moveresize;
pub mod placement;
pub mod registry;
pub mod session;
pub mod stacking;
pub mod window;
pub mod zoom;

use serde::Serialize;
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::canvas::Viewport;
use crate::config::Config;
use crate::services::Services;
use crate::shared::{Rect, WindowId, WindowMode};
use crate::shell::panel::{Taskbar, TaskbarEntry};

pub use window::{WindowSpec, WindowState};

use cycle::CycleManager;
use focus::FocusManager;
use moveresize::MoveResizeManager;
use session::SessionManager;
use stacking::StackingManager;

/// Wake-ups produced by background timers, fed back through
/// [`Workspace::handle_wake`] by the owner's event loop
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Wake {
    /// One frame of the edge auto-pan loop
    AutoPanFrame,
    /// A maximize transition finished
    MaximizeSettled(WindowId),
}

/// Changes the renderer projects onto its view
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum WorkspaceEvent {
    /// `closable` only decides whether the chrome shows a close button
    WindowOpened { id: WindowId, title: String, rect: Rect, z_index: u32, closable: bool },
    WindowClosed { id: WindowId },
    WindowFocused { id: WindowId, z_index: u32 },
    WindowGeometryChanged { id: WindowId, rect: Rect },
    WindowStateChanged { id: WindowId, mode: WindowMode },
    SelectionChanged { active: Option<WindowId>, selected: Vec<WindowId> },
    ViewportChanged { scale: f64, pan_x: f64, pan_y: f64, animated: bool },
    SatellitesDetached { id: WindowId, satellites: Vec<String> },
    TaskbarChanged { entries: Vec<TaskbarEntry> },
    EditorRequested { id: WindowId },
}

pub struct Workspace {
    pub(crate) config: Config,
    pub(crate) document_id: String,
    pub(crate) windows: HashMap<WindowId, WindowState>,
    pub(crate) viewport: Viewport,
    pub(crate) focus: FocusManager,
    pub(crate) stacking: StackingManager,
    pub(crate) cycle: CycleManager,
    pub(crate) moveresize: MoveResizeManager,
    pub(crate) session: SessionManager,
    pub(crate) taskbar: Taskbar,
    pub(crate) services: Services,
    pub(crate) wake_tx: UnboundedSender<Wake>,
    pub(crate) events: Vec<WorkspaceEvent>,
    /// Counter for minted window ids
    pub(crate) next_window_number: u64,
    /// Deferred scroll-into-view after maximize
    pub(crate) settle_task: Option<JoinHandle<()>>,
}

impl Workspace {
    /// Create an empty workspace for one document
    pub fn new(
        config: Config,
        document_id: impl Into<String>,
        viewport_size: (f64, f64),
        services: Services,
    ) -> (Self, UnboundedReceiver<Wake>) {
        let (wake_tx, wake_rx) = mpsc::unbounded_channel();
        let document_id = document_id.into();
        info!(
            "Workspace for document {} ({}x{} viewport)",
            document_id, viewport_size.0, viewport_size.1
        );

        let viewport = Viewport::new(
            viewport_size.0,
            viewport_size.1,
            config.canvas.width,
            config.canvas.height,
        );
        let debounce = Duration::from_millis(config.persistence.debounce_ms);

        let workspace = Self {
            config,
            document_id,
            windows: HashMap::new(),
            viewport,
            focus: FocusManager::new(),
            stacking: StackingManager::new(),
            cycle: CycleManager::new(),
            moveresize: MoveResizeManager::new(),
            session: SessionManager::new(debounce),
            taskbar: Taskbar::new(),
            services,
            wake_tx,
            events: Vec::new(),
            next_window_number: 0,
            settle_task: None,
        };
        (workspace, wake_rx)
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn document_id(&self) -> &str {
        &self.document_id
    }

    pub fn window(&self, id: &str) -> Option<&WindowState> {
        self.windows.get(id)
    }

    pub fn windows(&self) -> impl Iterator<Item = &WindowState> {
        self.windows.values()
    }

    pub fn window_count(&self) -> usize {
        self.windows.len()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.windows.contains_key(id)
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn taskbar(&self) -> &Taskbar {
        &self.taskbar
    }

    /// Take all events produced since the last drain
    pub fn drain_events(&mut self) -> Vec<WorkspaceEvent> {
        std::mem::take(&mut self.events)
    }

    /// Dispatch a timer wake-up
    pub fn handle_wake(&mut self, wake: Wake) {
        match wake {
            Wake::AutoPanFrame => self.auto_pan_frame(),
            Wake::MaximizeSettled(id) => {
                self.settle_task = None;
                if self.window(id.as_str()).is_some_and(|w| w.is_maximized()) {
                    debug!("Maximize settled for {}", id);
                    self.scroll_into_view(id.as_str());
                }
            }
        }
    }

    /// Screen size changed
    pub fn set_viewport_size(&mut self, width: f64, height: f64) {
        self.viewport.width = width;
        self.viewport.height = height;
        self.emit_viewport(false);
    }

    pub(crate) fn emit(&mut self, event: WorkspaceEvent) {
        self.events.push(event);
    }

    pub(crate) fn emit_viewport(&mut self, animated: bool) {
        let event = WorkspaceEvent::ViewportChanged {
            scale: self.viewport.scale(),
            pan_x: self.viewport.pan_x,
            pan_y: self.viewport.pan_y,
            animated,
        };
        self.emit(event);
    }

    pub(crate) fn emit_geometry(&mut self, id: &WindowId) {
        if let Some(rect) = self.windows.get(id).map(|w| w.rect) {
            self.emit(WorkspaceEvent::WindowGeometryChanged { id: id.clone(), rect });
        }
    }

    pub(crate) fn emit_mode(&mut self, id: &WindowId) {
        if let Some(mode) = self.windows.get(id).map(|w| w.mode) {
            self.emit(WorkspaceEvent::WindowStateChanged { id: id.clone(), mode });
        }
    }

    /// Rebuild derived views and queue a layout write
    pub(crate) fn commit(&mut self) {
        self.refresh_taskbar();
        self.request_save();
    }

    /// Reconcile the taskbar against the current window set
    pub(crate) fn refresh_taskbar(&mut self) {
        let desired = crate::shell::panel::desired_entries(
            self.windows.values(),
            self.focus.active.as_ref(),
        );
        let report = self.taskbar.reconcile(desired);
        if !report.is_unchanged() {
            debug!("Taskbar reconciled: {:?}", report);
            let entries = self.taskbar.entries();
            self.emit(WorkspaceEvent::TaskbarChanged { entries });
        }
    }
}
