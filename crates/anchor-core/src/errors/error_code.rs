//! Stable error codes, kept independent of the Display messages so that
//! host-app telemetry can match on them across releases.

/// Every engine error maps to a stable, machine-readable code.
pub trait AnchorErrorCode {
    fn error_code(&self) -> &'static str;
}

pub const NO_TRACKING_SESSION: &str = "ANCHOR_NO_TRACKING_SESSION";
pub const UNKNOWN_OBJECT: &str = "ANCHOR_UNKNOWN_OBJECT";
pub const INVALID_GEOMETRY: &str = "ANCHOR_INVALID_GEOMETRY";
pub const INVALID_CONFIG: &str = "ANCHOR_INVALID_CONFIG";
