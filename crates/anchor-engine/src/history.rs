//! Append-only correction history, capped per object.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use anchor_core::types::geometry::Vec3;

/// One applied correction. Never mutated after the append.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrectionEvent {
    /// Unix millis at application time.
    pub timestamp: u64,
    /// Measured drift that triggered the correction, in meters.
    pub drift_magnitude: f64,
    /// The nudge that was applied to the live pose.
    pub correction_vector: Vec3,
    pub success: bool,
}

/// Per-object ordered event log. Oldest events rotate out past the cap so
/// a long-running session cannot grow without bound.
#[derive(Debug, Clone)]
pub struct CorrectionHistory {
    events: VecDeque<CorrectionEvent>,
    cap: usize,
}

impl CorrectionHistory {
    pub fn new(cap: usize) -> Self {
        Self {
            events: VecDeque::with_capacity(cap.min(64)),
            cap: cap.max(1),
        }
    }

    pub fn push(&mut self, event: CorrectionEvent) {
        if self.events.len() == self.cap {
            self.events.pop_front();
        }
        self.events.push_back(event);
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &CorrectionEvent> {
        self.events.iter()
    }

    /// Snapshot of the stored events, oldest first.
    pub fn to_vec(&self) -> Vec<CorrectionEvent> {
        self.events.iter().cloned().collect()
    }
}
