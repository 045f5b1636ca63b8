//! Coalesces many small change events into one repaint per visible tile per frame (§4.8).
//!
//! The scheduler itself only tracks *which* tiles are pending; firing the debounce timer and
//! actually replaying a tile into its canvas is the caller's job (the host drives the event
//! loop, this crate has no timer of its own to drive with).

use std::collections::HashSet;
use std::time::Duration;

use web_time::Instant;

use crate::tile_key::TileKey;

/// The debounce window a redraw request resets on every enqueue (§4.8, §5).
pub const FRAME_QUANTUM: Duration = Duration::from_millis(16);

/// Accumulates pending tile keys and reports when the debounce window has elapsed.
pub struct RedrawScheduler {
    pending: HashSet<TileKey>,
    deadline: Option<Instant>,
}

impl Default for RedrawScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl RedrawScheduler {
    /// Creates an empty scheduler.
    pub fn new() -> Self {
        Self {
            pending: HashSet::new(),
            deadline: None,
        }
    }

    /// Enqueues `key` for redraw, resetting the debounce timer.
    pub fn enqueue(&mut self, key: TileKey) {
        self.pending.insert(key);
        self.deadline = Some(Instant::now() + FRAME_QUANTUM);
    }

    /// Enqueues every tile in `visible`, as the special `"all"` scope does.
    pub fn enqueue_all(&mut self, visible: impl IntoIterator<Item = TileKey>) {
        for key in visible {
            self.pending.insert(key);
        }
        self.deadline = Some(Instant::now() + FRAME_QUANTUM);
    }

    /// True once the debounce window has elapsed since the most recent enqueue.
    pub fn is_due(&self) -> bool {
        match self.deadline {
            Some(deadline) => Instant::now() >= deadline,
            None => false,
        }
    }

    /// Drains and returns every pending tile key, clearing the timer. Called once `is_due()`.
    pub fn drain(&mut self) -> Vec<TileKey> {
        self.deadline = None;
        self.pending.drain().collect()
    }

    /// True if nothing is pending.
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread::sleep;

    #[test]
    fn repeated_enqueues_of_the_same_tile_coalesce_to_one_entry() {
        let mut scheduler = RedrawScheduler::new();
        let key = TileKey::new(1, 0, 0);
        for _ in 0..10 {
            scheduler.enqueue(key);
        }
        let drained = scheduler.drain();
        assert_eq!(drained, vec![key]);
    }

    #[test]
    fn not_due_until_the_frame_quantum_elapses() {
        let mut scheduler = RedrawScheduler::new();
        scheduler.enqueue(TileKey::new(1, 0, 0));
        assert!(!scheduler.is_due());
        sleep(FRAME_QUANTUM + Duration::from_millis(5));
        assert!(scheduler.is_due());
    }

    #[test]
    fn enqueue_all_fills_the_queue_with_every_visible_tile() {
        let mut scheduler = RedrawScheduler::new();
        let visible = vec![TileKey::new(1, 0, 0), TileKey::new(1, 1, 0)];
        scheduler.enqueue_all(visible.clone());
        let mut drained = scheduler.drain();
        drained.sort_by_key(|k| k.x);
        assert_eq!(drained, visible);
    }

    #[test]
    fn draining_clears_the_pending_set() {
        let mut scheduler = RedrawScheduler::new();
        scheduler.enqueue(TileKey::new(1, 0, 0));
        scheduler.drain();
        assert!(scheduler.is_empty());
        assert!(!scheduler.is_due());
    }
}
