//! Auto-pan Module
//!
//! Edge-triggered canvas panning while a drag is in progress. The loop is a
//! repeating timer task owned by the drag session: at most one runs at a
//! time, and it is aborted when the pointer leaves the edge margins or the
//! session ends.

use std::time::Duration;
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::debug;

use crate::canvas::Viewport;
use crate::wm::Wake;

/// Direction of travel per axis: -1, 0 or 1
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PanDirection {
    pub x: f64,
    pub y: f64,
}

impl PanDirection {
    pub const NONE: PanDirection = PanDirection { x: 0.0, y: 0.0 };

    pub fn is_none(&self) -> bool {
        self.x == 0.0 && self.y == 0.0
    }
}

/// Which edges the pointer is within `margin` of
pub fn edge_direction(viewport: &Viewport, px: f64, py: f64, margin: f64) -> PanDirection {
    let axis = |p: f64, extent: f64| {
        if p < margin {
            -1.0
        } else if p > extent - margin {
            1.0
        } else {
            0.0
        }
    };
    PanDirection {
        x: axis(px, viewport.width),
        y: axis(py, viewport.height),
    }
}

/// Repeating frame task
pub struct PanLoop {
    handle: Option<JoinHandle<()>>,
}

impl PanLoop {
    pub fn new() -> Self {
        Self { handle: None }
    }

    /// Start sending frame wake-ups. Idempotent.
    pub fn start(&mut self, interval: Duration, wake_tx: UnboundedSender<Wake>) {
        if self.is_running() {
            return;
        }
        debug!("Auto-pan loop started");
        self.handle = Some(tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            // First tick completes immediately
            ticker.tick().await;
            loop {
                ticker.tick().await;
                if wake_tx.send(Wake::AutoPanFrame).is_err() {
                    break;
                }
            }
        }));
    }

    /// Stop the loop. Idempotent.
    pub fn stop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
            debug!("Auto-pan loop stopped");
        }
    }

    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }
}

impl Default for PanLoop {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for PanLoop {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    #[test]
    fn test_edge_direction() {
        let vp = Viewport::new(800.0, 600.0, 5000.0, 5000.0);
        assert_eq!(edge_direction(&vp, 400.0, 300.0, 50.0), PanDirection::NONE);
        assert_eq!(edge_direction(&vp, 10.0, 300.0, 50.0), PanDirection { x: -1.0, y: 0.0 });
        assert_eq!(edge_direction(&vp, 790.0, 590.0, 50.0), PanDirection { x: 1.0, y: 1.0 });
        assert_eq!(edge_direction(&vp, 400.0, 20.0, 50.0), PanDirection { x: 0.0, y: -1.0 });
    }

    #[tokio::test(start_paused = true)]
    async fn test_loop_ticks_until_stopped() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut pan_loop = PanLoop::new();
        pan_loop.start(Duration::from_millis(16), tx.clone());
        pan_loop.start(Duration::from_millis(16), tx);
        assert!(pan_loop.is_running());

        assert_eq!(rx.recv().await, Some(Wake::AutoPanFrame));
        assert_eq!(rx.recv().await, Some(Wake::AutoPanFrame));

        pan_loop.stop();
        pan_loop.stop();
        assert!(!pan_loop.is_running());
        tokio::time::sleep(Duration::from_millis(100)).await;
        // Only frames already queued before the abort can remain
        let mut leftover = 0;
        while rx.try_recv().is_ok() {
            leftover += 1;
        }
        assert!(leftover <= 1);
    }
}
