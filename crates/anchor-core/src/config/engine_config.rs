//! Stability engine configuration.
//!
//! All fields are optional; `effective_*()` accessors carry the documented
//! defaults from `constants`. Loadable from a TOML table embedded in the
//! host app's config file.

use serde::{Deserialize, Serialize};

use crate::constants;
use crate::errors::AnchorError;

/// Tunables for the drift correction engine.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct EngineConfig {
    /// Drift monitor cadence in milliseconds. Default: 2000.
    pub monitor_interval_ms: Option<u64>,
    /// Network refresh cadence in milliseconds. Default: 5000.
    pub network_interval_ms: Option<u64>,
    /// Reference network query radius in meters. Default: 3.0.
    pub network_radius: Option<f64>,
    /// Upper bound on a single correction step in meters. Default: 0.01.
    pub max_correction_step: Option<f64>,
    /// Fraction of measured drift corrected per tick. Default: 0.1.
    pub correction_gain: Option<f64>,
    /// Steps below this (meters) are dropped as rounding noise. Default: 0.001.
    pub correction_epsilon: Option<f64>,
    /// Stored correction events per object before rotation. Default: 256.
    pub history_cap: Option<usize>,
}

impl EngineConfig {
    /// Returns the effective monitor cadence, defaulting to 2 s.
    pub fn effective_monitor_interval_ms(&self) -> u64 {
        self.monitor_interval_ms
            .unwrap_or(constants::MONITOR_INTERVAL_MS)
    }

    /// Returns the effective network refresh cadence, defaulting to 5 s.
    pub fn effective_network_interval_ms(&self) -> u64 {
        self.network_interval_ms
            .unwrap_or(constants::NETWORK_INTERVAL_MS)
    }

    /// Returns the effective network radius, defaulting to 3 m.
    pub fn effective_network_radius(&self) -> f64 {
        self.network_radius
            .unwrap_or(constants::DEFAULT_NETWORK_RADIUS_M)
    }

    /// Returns the effective max correction step, defaulting to 1 cm.
    pub fn effective_max_correction_step(&self) -> f64 {
        self.max_correction_step
            .unwrap_or(constants::MAX_CORRECTION_STEP_M)
    }

    /// Returns the effective correction gain, defaulting to 0.1.
    pub fn effective_correction_gain(&self) -> f64 {
        self.correction_gain.unwrap_or(constants::CORRECTION_GAIN)
    }

    /// Returns the effective correction epsilon, defaulting to 1 mm.
    pub fn effective_correction_epsilon(&self) -> f64 {
        self.correction_epsilon
            .unwrap_or(constants::CORRECTION_EPSILON_M)
    }

    /// Returns the effective per-object history cap, defaulting to 256.
    pub fn effective_history_cap(&self) -> usize {
        self.history_cap.unwrap_or(constants::HISTORY_CAP)
    }

    /// Parse from a TOML string.
    pub fn from_toml_str(raw: &str) -> Result<Self, AnchorError> {
        let config: Self = toml::from_str(raw).map_err(|e| AnchorError::InvalidConfig {
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values that would break the engine's invariants.
    pub fn validate(&self) -> Result<(), AnchorError> {
        if let Some(r) = self.network_radius {
            if !r.is_finite() || r <= constants::MIN_REFERENCE_DISTANCE_M {
                return Err(AnchorError::InvalidConfig {
                    message: format!("network_radius must be finite and > 0.1, got {r}"),
                });
            }
        }
        if let Some(s) = self.max_correction_step {
            if !s.is_finite() || s <= 0.0 {
                return Err(AnchorError::InvalidConfig {
                    message: format!("max_correction_step must be finite and > 0, got {s}"),
                });
            }
        }
        if let Some(g) = self.correction_gain {
            if !g.is_finite() || g <= 0.0 || g > 1.0 {
                return Err(AnchorError::InvalidConfig {
                    message: format!("correction_gain must be in (0, 1], got {g}"),
                });
            }
        }
        if self.monitor_interval_ms == Some(0) || self.network_interval_ms == Some(0) {
            return Err(AnchorError::InvalidConfig {
                message: "tick intervals must be non-zero".to_string(),
            });
        }
        Ok(())
    }
}
