//! # anchor-engine
//!
//! Spatial anchor stability and drift correction engine.
//!
//! Keeps virtual objects visually locked to real-world positions while the
//! underlying tracker re-estimates and drifts. Per object it captures a
//! baseline pose, scores a weighted network of nearby reference features,
//! and applies small bounded corrections back toward the baseline whenever
//! measured drift exceeds an adaptive, tracking-quality-driven threshold.
//!
//! The engine owns all state behind an id-keyed map; callers hold only
//! `ObjectId`s. Two recurring ticks drive it: a drift monitor (default 2 s)
//! and a slower network refresh (default 5 s).

pub mod baseline;
pub mod engine;
pub mod history;
pub mod monitor;
pub mod network;
pub mod scheduler;
pub mod scoring;
pub mod threshold;

pub use baseline::AnchorBaseline;
pub use engine::{DiagnosticsSnapshot, StabilityEngine};
pub use history::{CorrectionEvent, CorrectionHistory};
pub use network::{ReferenceAnchor, StabilizationNetwork};
pub use threshold::ThresholdController;
