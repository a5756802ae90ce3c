//! Stacking Module
//!
//! Z-order bookkeeping. Every raise hands out a fresh z-index that is
//! strictly greater than any index handed out before in the session.

use tracing::debug;

use crate::shared::WindowId;
use crate::wm::Workspace;

/// Highest index before any window was focused or restored
pub const BASE_Z_INDEX: u32 = 10;

/// Restored indexes above this are renumbered
pub const Z_INDEX_CEILING: u32 = u32::MAX / 2;

/// Stacking manager
pub struct StackingManager {
    /// Highest z-index assigned so far
    highest_z_index: u32,

    /// Nothing raised or restored yet
    fresh: bool,
}

impl StackingManager {
    pub fn new() -> Self {
        Self {
            highest_z_index: BASE_Z_INDEX,
            fresh: true,
        }
    }

    /// Allocate the next z-index
    pub fn raise(&mut self) -> u32 {
        self.fresh = false;
        self.highest_z_index = self.highest_z_index.saturating_add(1);
        self.highest_z_index
    }

    pub fn highest_z_index(&self) -> u32 {
        self.highest_z_index
    }

    /// Continue numbering above the restored windows. The first restore of a
    /// session may lower the counter; later ones never do.
    pub fn reset_after_restore(&mut self, restored_max: Option<u32>) {
        let above_restored = restored_max.map(|max| max.saturating_add(1));
        let next = if self.fresh {
            above_restored.unwrap_or(BASE_Z_INDEX)
        } else {
            above_restored.map_or(self.highest_z_index, |z| z.max(self.highest_z_index))
        };
        debug!("Highest z-index {} -> {}", self.highest_z_index, next);
        self.highest_z_index = next;
        self.fresh = false;
    }
}

impl Default for StackingManager {
    fn default() -> Self {
        Self::new()
    }
}

impl Workspace {
    pub fn highest_z_index(&self) -> u32 {
        self.stacking.highest_z_index()
    }

    /// Window ids from bottom to top
    pub fn stacking_order(&self) -> Vec<WindowId> {
        let mut ordered: Vec<_> = self.windows.values().collect();
        ordered.sort_by(|a, b| a.z_index.cmp(&b.z_index).then_with(|| a.id.cmp(&b.id)));
        ordered.into_iter().map(|w| w.id.clone()).collect()
    }

    /// Topmost window that is not minimized
    pub fn topmost_visible(&self) -> Option<WindowId> {
        self.windows
            .values()
            .filter(|w| !w.is_minimized())
            .max_by(|a, b| a.z_index.cmp(&b.z_index).then_with(|| b.id.cmp(&a.id)))
            .map(|w| w.id.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raise_is_strictly_increasing() {
        let mut stacking = StackingManager::new();
        let mut last = stacking.highest_z_index();
        for _ in 0..50 {
            let z = stacking.raise();
            assert!(z > last);
            last = z;
        }
    }

    #[test]
    fn test_restore_reset() {
        let mut stacking = StackingManager::new();
        stacking.reset_after_restore(Some(7));
        assert_eq!(stacking.highest_z_index(), 8);
        assert_eq!(stacking.raise(), 9);

        // Later restores never move the counter back
        stacking.reset_after_restore(None);
        assert_eq!(stacking.highest_z_index(), 9);
        stacking.reset_after_restore(Some(20));
        assert_eq!(stacking.highest_z_index(), 21);
    }

    #[test]
    fn test_first_restore_without_windows_keeps_base() {
        let mut stacking = StackingManager::new();
        stacking.reset_after_restore(None);
        assert_eq!(stacking.highest_z_index(), BASE_Z_INDEX);
    }

    #[test]
    fn test_counter_saturates_at_ceiling() {
        let mut stacking = StackingManager::new();
        stacking.reset_after_restore(Some(u32::MAX));
        assert_eq!(stacking.highest_z_index(), u32::MAX);
        assert_eq!(stacking.raise(), u32::MAX);
    }
}
