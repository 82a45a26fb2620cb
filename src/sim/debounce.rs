//! Collision debounce
//!
//! The physics broad-phase can report the same ball-vs-brick contact more
//! than once within a frame (sub-frame re-resolution). Each brick therefore
//! gets a short lockout window after an accepted hit. The side table is
//! bounded: once it grows past a threshold, entries older than a second are
//! pruned.

use std::collections::HashMap;

use crate::consts::{DEBOUNCE_PRUNE_THRESHOLD, DEBOUNCE_STALE_MS, DEBOUNCE_WINDOW_MS};

use super::brick::BrickId;

/// Per-brick last-hit tracking with a fixed acceptance window
#[derive(Debug)]
pub struct HitDebounce {
    last_hit: HashMap<BrickId, u64>,
    window_ms: u64,
}

impl Default for HitDebounce {
    fn default() -> Self {
        Self::new(DEBOUNCE_WINDOW_MS)
    }
}

impl HitDebounce {
    pub fn new(window_ms: u64) -> Self {
        Self {
            last_hit: HashMap::new(),
            window_ms,
        }
    }

    /// Returns true if a hit on `id` at `now_ms` should be processed, and
    /// records it. A hit inside the window is swallowed without updating
    /// the timestamp, so a rapid stream can't starve itself forever.
    pub fn accept(&mut self, id: BrickId, now_ms: u64) -> bool {
        if let Some(&last) = self.last_hit.get(&id) {
            if now_ms.saturating_sub(last) < self.window_ms {
                return false;
            }
        }
        self.last_hit.insert(id, now_ms);
        if self.last_hit.len() > DEBOUNCE_PRUNE_THRESHOLD {
            self.prune(now_ms);
        }
        true
    }

    /// Forget a destroyed brick immediately
    pub fn forget(&mut self, id: BrickId) {
        self.last_hit.remove(&id);
    }

    fn prune(&mut self, now_ms: u64) {
        self.last_hit
            .retain(|_, &mut last| now_ms.saturating_sub(last) <= DEBOUNCE_STALE_MS);
    }

    #[cfg(test)]
    fn tracked(&self) -> usize {
        self.last_hit.len()
    }
}
