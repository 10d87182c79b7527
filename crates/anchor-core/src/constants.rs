//! Engine-wide constants. Config values fall back to these defaults.

/// Drift tolerance while tracking is nominal, in meters.
pub const DRIFT_THRESHOLD_NORMAL_M: f64 = 0.05;
/// Drift tolerance while tracking is limited, in meters.
pub const DRIFT_THRESHOLD_LIMITED_M: f64 = 0.15;
/// Drift tolerance while tracking is unavailable, in meters.
/// Wide on purpose: correction keeps running, it just fires less often.
pub const DRIFT_THRESHOLD_UNAVAILABLE_M: f64 = 0.50;

/// Upper bound on a single correction step, in meters.
/// Corrections are incremental nudges, never a visible teleport.
pub const MAX_CORRECTION_STEP_M: f64 = 0.01;
/// Steps below this are rounding noise; no event is recorded for them.
pub const CORRECTION_EPSILON_M: f64 = 0.001;
/// Fraction of the measured drift corrected per monitor tick.
pub const CORRECTION_GAIN: f64 = 0.1;

/// Default radius for reference network queries, in meters.
pub const DEFAULT_NETWORK_RADIUS_M: f64 = 3.0;
/// Features closer than this to the network center are self-reference noise.
pub const MIN_REFERENCE_DISTANCE_M: f64 = 0.1;

/// Base stability attributed to the anchor itself when scoring a network.
pub const BASE_SELF_STABILITY: f64 = 1.0;
/// Score assigned to a network with zero discovered references.
/// Low confidence, not the false certainty naive division would give.
pub const SPARSE_NETWORK_SCORE: f64 = 0.5;

/// Default drift monitor cadence, in milliseconds.
pub const MONITOR_INTERVAL_MS: u64 = 2_000;
/// Default network refresh cadence, in milliseconds.
pub const NETWORK_INTERVAL_MS: u64 = 5_000;

/// Default cap on stored correction events per object (oldest dropped first).
pub const HISTORY_CAP: usize = 256;

/// Environment quality factor caps and weights.
pub const ENV_ANCHOR_CAP: f64 = 10.0;
pub const ENV_ANCHOR_WEIGHT: f64 = 0.4;
pub const ENV_PLANE_CAP: f64 = 5.0;
pub const ENV_PLANE_WEIGHT: f64 = 0.3;
pub const ENV_POINT_CAP: f64 = 500.0;
pub const ENV_POINT_WEIGHT: f64 = 0.3;
