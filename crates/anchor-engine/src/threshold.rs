//! Adaptive drift threshold.
//!
//! Maps the tracker's coarse quality classification to the drift tolerance
//! the monitor compares against. Degraded tracking widens the tolerance
//! rather than disabling correction: the engine degrades, never halts.

use tracing::debug;

use anchor_core::constants::{
    DRIFT_THRESHOLD_LIMITED_M, DRIFT_THRESHOLD_NORMAL_M, DRIFT_THRESHOLD_UNAVAILABLE_M,
};
use anchor_core::types::tracking::TrackingQuality;

/// Drift tolerance for a given tracking quality, in meters.
pub fn threshold_for(quality: TrackingQuality) -> f64 {
    match quality {
        TrackingQuality::Normal => DRIFT_THRESHOLD_NORMAL_M,
        TrackingQuality::Limited => DRIFT_THRESHOLD_LIMITED_M,
        TrackingQuality::Unavailable => DRIFT_THRESHOLD_UNAVAILABLE_M,
    }
}

/// Holds the current threshold; written on quality updates, read by the
/// drift monitor each tick. Invariant: the threshold is always positive.
#[derive(Debug, Clone)]
pub struct ThresholdController {
    quality: TrackingQuality,
    current: f64,
}

impl ThresholdController {
    pub fn new() -> Self {
        Self {
            quality: TrackingQuality::Normal,
            current: DRIFT_THRESHOLD_NORMAL_M,
        }
    }

    /// Apply a quality update; returns the (possibly unchanged) threshold.
    pub fn update(&mut self, quality: TrackingQuality) -> f64 {
        if quality != self.quality {
            let next = threshold_for(quality);
            debug!(
                from = ?self.quality,
                to = ?quality,
                threshold_m = next,
                "drift threshold adjusted"
            );
            self.quality = quality;
            self.current = next;
        }
        self.current
    }

    /// Current drift tolerance in meters.
    pub fn threshold(&self) -> f64 {
        self.current
    }

    /// Quality the current threshold was derived from.
    pub fn quality(&self) -> TrackingQuality {
        self.quality
    }
}

impl Default for ThresholdController {
    fn default() -> Self {
        Self::new()
    }
}
