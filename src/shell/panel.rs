//! Taskbar panel
//!
//! The taskbar lists minimized windows plus the pinned outline and codex
//! windows while they are open. The desired list is a pure function of the
//! window set; reconciling it against the displayed nodes reuses the node
//! of every id that is still present so unchanged buttons keep their
//! identity.

use serde::Serialize;
use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};
use tracing::debug;

use crate::shared::{CODEX_WINDOW_ID, OUTLINE_WINDOW_ID, WindowId};
use crate::wm::{WindowState, Workspace};

/// Always listed while open, in this order, ahead of everything else
pub const PINNED_WINDOWS: [&str; 2] = [OUTLINE_WINDOW_ID, CODEX_WINDOW_ID];

/// One taskbar button
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaskbarEntry {
    pub id: WindowId,
    pub title: String,
    pub icon: String,
    pub active: bool,
    pub minimized: bool,
}

/// A displayed button. `node_id` is stable for as long as the entry stays
/// in the list.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskbarNode {
    pub node_id: u64,
    pub entry: TaskbarEntry,
}

/// What a reconcile pass changed
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    pub created: usize,
    pub removed: usize,
    pub updated: usize,
    pub moved: usize,
}

impl ReconcileReport {
    pub fn is_unchanged(&self) -> bool {
        *self == Self::default()
    }
}

fn pin_rank(id: &WindowId) -> Option<usize> {
    PINNED_WINDOWS.iter().position(|p| *p == id.as_str())
}

/// Case-insensitive first; titles differing only in case put lowercase
/// first, as locale collation does
fn title_order(a: &str, b: &str) -> Ordering {
    a.to_lowercase().cmp(&b.to_lowercase()).then_with(|| b.cmp(a))
}

fn entry_order(a: &TaskbarEntry, b: &TaskbarEntry) -> Ordering {
    match (pin_rank(&a.id), pin_rank(&b.id)) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => title_order(&a.title, &b.title).then_with(|| a.id.cmp(&b.id)),
    }
}

/// Sorted entries for the current window set
pub fn desired_entries<'a>(
    windows: impl IntoIterator<Item = &'a WindowState>,
    active: Option<&WindowId>,
) -> Vec<TaskbarEntry> {
    // Keyed by id so a pinned window that is also minimized appears once
    let mut by_id: BTreeMap<&WindowId, TaskbarEntry> = BTreeMap::new();
    for window in windows {
        if !window.is_minimized() && pin_rank(&window.id).is_none() {
            continue;
        }
        by_id.insert(
            &window.id,
            TaskbarEntry {
                id: window.id.clone(),
                title: window.title.clone(),
                icon: window.icon.clone(),
                active: active == Some(&window.id),
                minimized: window.is_minimized(),
            },
        );
    }
    let mut entries: Vec<_> = by_id.into_values().collect();
    entries.sort_by(entry_order);
    entries
}

/// Displayed taskbar buttons
pub struct Taskbar {
    nodes: Vec<TaskbarNode>,
    next_node_id: u64,
}

impl Taskbar {
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            next_node_id: 1,
        }
    }

    pub fn nodes(&self) -> &[TaskbarNode] {
        &self.nodes
    }

    pub fn entries(&self) -> Vec<TaskbarEntry> {
        self.nodes.iter().map(|n| n.entry.clone()).collect()
    }

    /// Patch the displayed nodes to match `desired`
    pub fn reconcile(&mut self, desired: Vec<TaskbarEntry>) -> ReconcileReport {
        let mut report = ReconcileReport::default();
        let mut existing: HashMap<WindowId, (usize, TaskbarNode)> = self
            .nodes
            .drain(..)
            .enumerate()
            .map(|(index, n)| (n.entry.id.clone(), (index, n)))
            .collect();

        let mut nodes = Vec::with_capacity(desired.len());
        // Previous display index of each reused node, in new order
        let mut reused = Vec::new();
        for entry in desired {
            match existing.remove(&entry.id) {
                Some((index, mut node)) => {
                    if node.entry != entry {
                        node.entry = entry;
                        report.updated += 1;
                    }
                    reused.push(index);
                    nodes.push(node);
                }
                None => {
                    let node_id = self.next_node_id;
                    self.next_node_id += 1;
                    debug!("Taskbar node {} created for {}", node_id, entry.id);
                    nodes.push(TaskbarNode { node_id, entry });
                    report.created += 1;
                }
            }
        }
        report.removed = existing.len();

        // Reused nodes out of their previous relative order
        let mut previous = reused.clone();
        previous.sort_unstable();
        report.moved = reused.iter().zip(&previous).filter(|(a, b)| a != b).count();

        self.nodes = nodes;
        report
    }
}

impl Default for Taskbar {
    fn default() -> Self {
        Self::new()
    }
}

impl Workspace {
    /// Taskbar button click: bring a minimized window back, otherwise focus
    pub fn activate_taskbar_entry(&mut self, id: &str) -> bool {
        match self.windows.get(id) {
            Some(window) if window.is_minimized() => self.restore(id),
            Some(_) => self.focus(id, false),
            None => false,
        }
    }
}
