//! # anchor-core
//!
//! Foundation crate for the Anchorlock spatial anchor stability engine.
//! Defines the math and domain types, the `PoseSource` boundary trait,
//! errors, config, tracing bootstrap, and constants.
//! The engine crate depends on this; this depends on no engine code.

pub mod config;
pub mod constants;
pub mod errors;
pub mod tracing;
pub mod traits;
pub mod types;

// Re-export the most commonly used types at the crate root.
pub use config::EngineConfig;
pub use errors::error_code::AnchorErrorCode;
pub use errors::AnchorError;
pub use traits::PoseSource;
pub use types::collections::{FxHashMap, FxHashSet};
pub use types::geometry::{Mat4, Transform, Vec3};
pub use types::identifiers::{FeatureHandle, ObjectId};
pub use types::tracking::{Feature, FeatureKind, TrackingQuality};
