//! Cycle Module
//!
//! Keyboard window cycling. The list is snapshotted when a cycle starts,
//! most recently focused first, so repeated steps walk a stable order.

use tracing::debug;

use crate::shared::WindowId;
use crate::wm::Workspace;

/// Cycle manager
pub struct CycleManager {
    /// Current cycle list
    pub cycle_list: Vec<WindowId>,

    /// Current cycle index
    pub cycle_index: usize,

    /// Is cycling active?
    pub active: bool,
}

impl CycleManager {
    pub fn new() -> Self {
        Self {
            cycle_list: Vec::new(),
            cycle_index: 0,
            active: false,
        }
    }

    /// Finish cycling
    pub fn finish_cycle(&mut self) {
        self.active = false;
        self.cycle_list.clear();
        self.cycle_index = 0;
    }

    /// Remove a closed or minimized window from the running cycle
    pub fn forget(&mut self, id: &WindowId) {
        let Some(pos) = self.cycle_list.iter().position(|w| w == id) else {
            return;
        };
        self.cycle_list.remove(pos);
        if self.cycle_list.is_empty() {
            self.finish_cycle();
        } else if pos < self.cycle_index || self.cycle_index >= self.cycle_list.len() {
            self.cycle_index = self.cycle_index.saturating_sub(1);
        }
    }
}

impl Default for CycleManager {
    fn default() -> Self {
        Self::new()
    }
}

impl Workspace {
    /// Step focus to the next (or previous) window in the cycle, starting a
    /// cycle if none is running
    pub fn cycle_focus(&mut self, forward: bool) -> Option<WindowId> {
        if !self.cycle.active {
            self.start_cycle();
        }
        let len = self.cycle.cycle_list.len();
        if len < 2 {
            self.cycle.finish_cycle();
            return None;
        }

        let index = if forward {
            (self.cycle.cycle_index + 1) % len
        } else {
            (self.cycle.cycle_index + len - 1) % len
        };
        self.cycle.cycle_index = index;
        let target = self.cycle.cycle_list[index].clone();
        debug!("Cycling focus to {}", target);
        self.focus(target.as_str(), false);
        Some(target)
    }

    pub fn end_cycle(&mut self) {
        self.cycle.finish_cycle();
    }

    pub fn is_cycling(&self) -> bool {
        self.cycle.active
    }

    fn start_cycle(&mut self) {
        // Focus history first, then untouched windows from the top of the stack
        let mut list: Vec<WindowId> = self
            .focus
            .focus_history
            .iter()
            .filter(|id| self.windows.get(*id).is_some_and(|w| !w.is_minimized()))
            .cloned()
            .collect();
        let mut rest: Vec<_> = self
            .windows
            .values()
            .filter(|w| !w.is_minimized() && !list.contains(&w.id))
            .collect();
        rest.sort_by(|a, b| b.z_index.cmp(&a.z_index).then_with(|| a.id.cmp(&b.id)));
        list.extend(rest.into_iter().map(|w| w.id.clone()));

        self.cycle.cycle_index = self
            .focus
            .active
            .as_ref()
            .and_then(|active| list.iter().position(|w| w == active))
            .unwrap_or(0);
        self.cycle.cycle_list = list;
        self.cycle.active = true;
    }
}
