//! Engine errors.
//!
//! Only registration-time failures are surfaced to callers. Geometric edge
//! cases inside a tick (missing pose, non-finite feature, zero-length
//! correction) are recovered locally with documented fallbacks.

use super::error_code::{self, AnchorErrorCode};

/// Errors surfaced across the engine's public boundary.
#[derive(Debug, thiserror::Error)]
pub enum AnchorError {
    #[error("No tracking session: pose source cannot resolve a valid transform")]
    NoTrackingSession,

    /// Not raised by the engine itself, which reports unknown ids as `None`
    /// or a skipped tick. Host-app adapters that need a hard failure for a
    /// bad id map that `None` onto this variant.
    #[error("Unknown object: {id}")]
    UnknownObject { id: String },

    /// For host-app adapters validating transforms before they reach the
    /// engine; internally malformed geometry folds into `NoTrackingSession`
    /// at registration and zero pose validity inside a tick.
    #[error("Invalid geometry: {details}")]
    InvalidGeometry { details: String },

    #[error("Invalid engine config: {message}")]
    InvalidConfig { message: String },
}

impl AnchorErrorCode for AnchorError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::NoTrackingSession => error_code::NO_TRACKING_SESSION,
            Self::UnknownObject { .. } => error_code::UNKNOWN_OBJECT,
            Self::InvalidGeometry { .. } => error_code::INVALID_GEOMETRY,
            Self::InvalidConfig { .. } => error_code::INVALID_CONFIG,
        }
    }
}
