//! End-to-end tests for the stability engine against a fake pose source.
//!
//! Covers registration/unregistration atomicity, adaptive thresholds,
//! bounded correction, multi-anchor seeding, convergence, and diagnostics.

use std::sync::{Arc, Mutex};

use anchor_core::types::geometry::{Mat4, Transform, Vec3};
use anchor_core::types::identifiers::{FeatureHandle, ObjectId};
use anchor_core::types::tracking::{Feature, FeatureKind, TrackingQuality};
use anchor_core::{AnchorError, EngineConfig, FxHashMap, PoseSource};
use anchor_engine::StabilityEngine;

/// Scriptable in-memory pose source.
struct FakePoseSource {
    poses: Mutex<FxHashMap<ObjectId, Transform>>,
    features: Mutex<Vec<Feature>>,
    quality: Mutex<TrackingQuality>,
}

impl FakePoseSource {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            poses: Mutex::new(FxHashMap::default()),
            features: Mutex::new(Vec::new()),
            quality: Mutex::new(TrackingQuality::Normal),
        })
    }

    fn set_pose(&self, id: &str, position: Vec3) {
        self.poses
            .lock()
            .unwrap()
            .insert(ObjectId::from(id), Transform::from_translation(position));
    }

    fn clear_pose(&self, id: &str) {
        self.poses.lock().unwrap().remove(&ObjectId::from(id));
    }

    fn set_quality(&self, quality: TrackingQuality) {
        *self.quality.lock().unwrap() = quality;
    }

    fn add_feature(&self, kind: FeatureKind, position: Vec3, handle: u64) {
        self.features.lock().unwrap().push(Feature {
            kind,
            transform: Mat4::new_translation(&position),
            handle: FeatureHandle(handle),
        });
    }
}

impl PoseSource for FakePoseSource {
    fn current_pose(&self, id: &ObjectId) -> Option<Transform> {
        self.poses.lock().unwrap().get(id).copied()
    }

    fn nearby_features(&self, center: &Vec3, radius: f64) -> Vec<Feature> {
        self.features
            .lock()
            .unwrap()
            .iter()
            .filter(|f| {
                let p = Vec3::new(f.transform[(0, 3)], f.transform[(1, 3)], f.transform[(2, 3)]);
                (p - center).norm() <= radius
            })
            .cloned()
            .collect()
    }

    fn tracking_quality(&self) -> TrackingQuality {
        *self.quality.lock().unwrap()
    }
}

fn engine_with(source: &Arc<FakePoseSource>) -> StabilityEngine {
    StabilityEngine::with_defaults(Arc::clone(source) as Arc<dyn PoseSource>)
}

// ============================================================
// Registration & baselines
// ============================================================

#[test]
fn registration_captures_baseline_and_counts_active() {
    let source = FakePoseSource::new();
    source.add_feature(FeatureKind::Plane, Vec3::new(1.0, 0.0, 0.0), 1);
    let engine = engine_with(&source);

    let baseline = engine
        .register_object("chest-1", &Transform::from_translation(Vec3::zeros()))
        .unwrap();
    assert_eq!(baseline.initial_position, Vec3::zeros());
    assert_eq!(baseline.reference_snapshot.len(), 1);
    assert!(baseline.environment_quality > 0.0);
    assert_eq!(engine.diagnostics_snapshot().active_count, 1);
}

#[test]
fn registration_fails_without_tracking_session() {
    let source = FakePoseSource::new();
    source.set_quality(TrackingQuality::Unavailable);
    let engine = engine_with(&source);

    let err = engine
        .register_object("chest-1", &Transform::default())
        .unwrap_err();
    assert!(matches!(err, AnchorError::NoTrackingSession));
    assert_eq!(engine.diagnostics_snapshot().active_count, 0);
}

#[test]
fn reregistration_overwrites_baseline() {
    let source = FakePoseSource::new();
    let engine = engine_with(&source);

    engine
        .register_object("chest-1", &Transform::from_translation(Vec3::zeros()))
        .unwrap();
    let rebaselined = engine
        .register_object(
            "chest-1",
            &Transform::from_translation(Vec3::new(2.0, 0.0, 0.0)),
        )
        .unwrap();

    assert_eq!(rebaselined.initial_position, Vec3::new(2.0, 0.0, 0.0));
    assert_eq!(engine.diagnostics_snapshot().active_count, 1);
}

#[test]
fn register_then_unregister_leaves_nothing_behind() {
    let source = FakePoseSource::new();
    let engine = engine_with(&source);
    let id = ObjectId::from("chest-1");

    engine
        .register_object("chest-1", &Transform::default())
        .unwrap();
    assert_eq!(engine.diagnostics_snapshot().active_count, 1);

    engine.unregister_object(&id);
    let snapshot = engine.diagnostics_snapshot();
    assert_eq!(snapshot.active_count, 0);
    assert!(engine.current_stability_score(&id).is_none());
    assert!(engine.network_snapshot(&id).is_none());
    assert!(engine.correction_history(&id).is_empty());
}

#[test]
fn unregistering_unknown_id_is_a_noop() {
    let source = FakePoseSource::new();
    let engine = engine_with(&source);
    engine.unregister_object(&ObjectId::from("ghost"));
    assert_eq!(engine.diagnostics_snapshot().active_count, 0);
}

// ============================================================
// Adaptive threshold
// ============================================================

#[test]
fn threshold_follows_tracking_quality() {
    let source = FakePoseSource::new();
    let engine = engine_with(&source);
    assert_eq!(engine.current_drift_threshold(), 0.05);

    source.set_quality(TrackingQuality::Limited);
    engine.run_monitor_tick();
    assert_eq!(engine.current_drift_threshold(), 0.15);

    source.set_quality(TrackingQuality::Unavailable);
    engine.run_monitor_tick();
    assert_eq!(engine.current_drift_threshold(), 0.50);

    source.set_quality(TrackingQuality::Normal);
    engine.run_monitor_tick();
    assert_eq!(engine.current_drift_threshold(), 0.05);
}

#[test]
fn limited_tracking_tolerates_drift_normal_corrects() {
    let source = FakePoseSource::new();
    let engine = engine_with(&source);
    let id = ObjectId::from("chest-1");

    engine
        .register_object("chest-1", &Transform::from_translation(Vec3::zeros()))
        .unwrap();
    source.set_pose("chest-1", Vec3::new(0.0, 0.06, 0.0));

    source.set_quality(TrackingQuality::Limited);
    engine.run_monitor_tick();
    assert_eq!(engine.diagnostics_snapshot().drift_events_detected, 0);
    assert!(engine.correction_history(&id).is_empty());

    source.set_quality(TrackingQuality::Normal);
    engine.run_monitor_tick();
    assert_eq!(engine.diagnostics_snapshot().drift_events_detected, 1);
    assert_eq!(engine.correction_history(&id).len(), 1);
}

// ============================================================
// Drift correction
// ============================================================

#[test]
fn drift_above_threshold_corrects_toward_baseline() {
    let source = FakePoseSource::new();
    let engine = engine_with(&source);
    let id = ObjectId::from("chest-1");

    engine
        .register_object("chest-1", &Transform::from_translation(Vec3::zeros()))
        .unwrap();
    source.set_pose("chest-1", Vec3::new(0.0, 0.06, 0.0));

    engine.run_monitor_tick();

    let history = engine.correction_history(&id);
    assert_eq!(history.len(), 1);
    let event = &history[0];
    assert!((event.drift_magnitude - 0.06).abs() < 1e-9);
    assert!(event.success);

    // Direction is straight down toward the baseline, step under the cap.
    let step = event.correction_vector;
    assert_eq!(step.x, 0.0);
    assert_eq!(step.z, 0.0);
    assert!(step.y < 0.0);
    assert!(step.norm() <= 0.01 + 1e-12);
    assert!((step.y + 0.006).abs() < 1e-9);

    // The corrected live position moved toward the baseline.
    let live = engine.live_position(&id).unwrap();
    assert!((live.y - 0.054).abs() < 1e-9);
}

#[test]
fn no_event_when_live_matches_baseline() {
    let source = FakePoseSource::new();
    let engine = engine_with(&source);
    let id = ObjectId::from("chest-1");

    engine
        .register_object("chest-1", &Transform::from_translation(Vec3::zeros()))
        .unwrap();
    source.set_pose("chest-1", Vec3::zeros());

    for _ in 0..5 {
        engine.run_monitor_tick();
    }
    assert!(engine.correction_history(&id).is_empty());
    assert_eq!(engine.diagnostics_snapshot().drift_events_detected, 0);
}

#[test]
fn missing_pose_is_skipped_and_retried() {
    let source = FakePoseSource::new();
    let engine = engine_with(&source);
    let id = ObjectId::from("chest-1");

    engine
        .register_object("chest-1", &Transform::from_translation(Vec3::zeros()))
        .unwrap();
    source.clear_pose("chest-1");
    engine.run_monitor_tick();
    assert!(engine.correction_history(&id).is_empty());

    // Pose comes back on a later tick; correction resumes.
    source.set_pose("chest-1", Vec3::new(0.2, 0.0, 0.0));
    engine.run_monitor_tick();
    assert_eq!(engine.correction_history(&id).len(), 1);
}

#[test]
fn corrections_converge_without_overshoot() {
    let source = FakePoseSource::new();
    let engine = engine_with(&source);
    let id = ObjectId::from("chest-1");

    engine
        .register_object("chest-1", &Transform::from_translation(Vec3::zeros()))
        .unwrap();
    // Tracker settles 0.2 m off the baseline and stays there.
    source.set_pose("chest-1", Vec3::new(0.2, 0.0, 0.0));

    let mut previous = engine.live_position(&id).unwrap().norm();
    for _ in 0..40 {
        engine.run_monitor_tick();
        let remaining = engine.live_position(&id).unwrap().norm();
        if remaining > 0.05 {
            assert!(remaining < previous, "drift must strictly decrease");
        }
        assert!(remaining <= previous + 1e-12, "must never overshoot");
        previous = remaining;
    }

    // Converged below the Normal threshold and corrections ceased.
    assert!(previous <= 0.05 + 1e-9);
    let events_at_convergence = engine.correction_history(&id).len();
    engine.run_monitor_tick();
    engine.run_monitor_tick();
    assert_eq!(engine.correction_history(&id).len(), events_at_convergence);
}

#[test]
fn every_stored_correction_is_bounded() {
    let source = FakePoseSource::new();
    let engine = engine_with(&source);
    let id = ObjectId::from("chest-1");

    engine
        .register_object("chest-1", &Transform::from_translation(Vec3::zeros()))
        .unwrap();
    source.set_pose("chest-1", Vec3::new(3.0, -1.0, 2.0));
    for _ in 0..10 {
        engine.run_monitor_tick();
    }

    let history = engine.correction_history(&id);
    assert_eq!(history.len(), 10);
    for event in &history {
        assert!(event.correction_vector.norm() <= 0.01 + 1e-12);
    }
}

#[test]
fn history_rotates_past_cap_but_totals_keep_counting() {
    let source = FakePoseSource::new();
    let config = EngineConfig {
        history_cap: Some(4),
        ..Default::default()
    };
    let engine = StabilityEngine::new(Arc::clone(&source) as Arc<dyn PoseSource>, config);
    let id = ObjectId::from("chest-1");

    engine
        .register_object("chest-1", &Transform::from_translation(Vec3::zeros()))
        .unwrap();
    source.set_pose("chest-1", Vec3::new(10.0, 0.0, 0.0));
    for _ in 0..9 {
        engine.run_monitor_tick();
    }

    assert_eq!(engine.correction_history(&id).len(), 4);
    let snapshot = engine.diagnostics_snapshot();
    assert_eq!(snapshot.total_corrections, 9);
    assert_eq!(snapshot.drift_events_detected, 9);
}

// ============================================================
// Networks & scoring
// ============================================================

#[test]
fn zero_reference_network_scores_half() {
    let source = FakePoseSource::new();
    let engine = engine_with(&source);
    let id = ObjectId::from("chest-1");

    engine
        .register_object("chest-1", &Transform::from_translation(Vec3::zeros()))
        .unwrap();
    assert_eq!(engine.current_stability_score(&id), Some(0.5));
}

#[test]
fn multi_anchor_network_seeds_exactly_requested_anchors() {
    let source = FakePoseSource::new();
    let engine = engine_with(&source);
    let id = ObjectId::from("chest-1");

    engine
        .register_object("chest-1", &Transform::from_translation(Vec3::zeros()))
        .unwrap();
    engine.create_multi_anchor_network("chest-1", &Vec3::zeros(), 0.5, 4);

    let network = engine.network_snapshot(&id).unwrap();
    assert_eq!(network.reference_anchors.len(), 4);
    for anchor in &network.reference_anchors {
        assert!(anchor.weight > 0.0);
        assert!((anchor.distance - 0.5).abs() < 1e-9);
    }
    let score = engine.current_stability_score(&id).unwrap();
    assert!(score > 0.5 && score <= 1.0);
}

#[test]
fn multi_anchor_network_requires_a_registered_object() {
    let source = FakePoseSource::new();
    let engine = engine_with(&source);
    let id = ObjectId::from("ghost");

    engine.create_multi_anchor_network("ghost", &Vec3::zeros(), 0.5, 4);

    // No baseline, no network: the per-object maps stay in lockstep and
    // the overall score only ever aggregates registered objects.
    assert!(engine.network_snapshot(&id).is_none());
    assert!(engine.current_stability_score(&id).is_none());
    let snapshot = engine.diagnostics_snapshot();
    assert_eq!(snapshot.active_count, 0);
    assert_eq!(snapshot.overall_stability_score, 0.0);
}

#[test]
fn network_tick_rebuilds_from_corrected_position() {
    let source = FakePoseSource::new();
    source.add_feature(FeatureKind::Geo, Vec3::new(1.0, 0.0, 0.0), 1);
    source.add_feature(FeatureKind::Plane, Vec3::new(0.0, 0.0, 1.5), 2);
    let engine = engine_with(&source);
    let id = ObjectId::from("chest-1");

    engine
        .register_object("chest-1", &Transform::from_translation(Vec3::zeros()))
        .unwrap();
    source.set_pose("chest-1", Vec3::new(0.02, 0.0, 0.0));
    engine.run_network_tick();

    let network = engine.network_snapshot(&id).unwrap();
    assert_eq!(network.center_position, Vec3::new(0.02, 0.0, 0.0));
    assert_eq!(network.reference_anchors.len(), 2);
    // Geo reference outranks the plane.
    assert_eq!(network.reference_anchors[0].handle, FeatureHandle(1));
    let snapshot = engine.diagnostics_snapshot();
    assert!(snapshot.overall_stability_score > 0.0);
}

#[test]
fn overall_score_is_mean_of_active_networks() {
    let source = FakePoseSource::new();
    let engine = engine_with(&source);

    // Two objects with no references: each network scores 0.5.
    engine
        .register_object("a", &Transform::from_translation(Vec3::zeros()))
        .unwrap();
    engine
        .register_object("b", &Transform::from_translation(Vec3::new(5.0, 0.0, 0.0)))
        .unwrap();

    let snapshot = engine.diagnostics_snapshot();
    assert!((snapshot.overall_stability_score - 0.5).abs() < 1e-12);

    engine.unregister_object(&ObjectId::from("a"));
    engine.unregister_object(&ObjectId::from("b"));
    assert_eq!(engine.diagnostics_snapshot().overall_stability_score, 0.0);
}

#[test]
fn unregister_recomputes_overall_from_survivors() {
    let source = FakePoseSource::new();
    let engine = engine_with(&source);

    engine
        .register_object("a", &Transform::from_translation(Vec3::zeros()))
        .unwrap();
    engine
        .register_object("b", &Transform::from_translation(Vec3::new(5.0, 0.0, 0.0)))
        .unwrap();
    // Seed "a" so its network outscores the sparse 0.5 of "b".
    engine.create_multi_anchor_network("a", &Vec3::zeros(), 0.5, 4);
    assert!(engine.diagnostics_snapshot().overall_stability_score > 0.5);

    engine.unregister_object(&ObjectId::from("a"));
    let snapshot = engine.diagnostics_snapshot();
    assert_eq!(snapshot.active_count, 1);
    assert!((snapshot.overall_stability_score - 0.5).abs() < 1e-12);
}

// ============================================================
// Lifecycle
// ============================================================

#[test]
fn started_engine_corrects_on_its_own_and_stops_cleanly() {
    let source = FakePoseSource::new();
    let config = EngineConfig {
        monitor_interval_ms: Some(5),
        network_interval_ms: Some(10),
        ..Default::default()
    };
    let engine = StabilityEngine::new(Arc::clone(&source) as Arc<dyn PoseSource>, config);
    let id = ObjectId::from("chest-1");

    engine
        .register_object("chest-1", &Transform::from_translation(Vec3::zeros()))
        .unwrap();
    source.set_pose("chest-1", Vec3::new(0.5, 0.0, 0.0));

    engine.start();
    std::thread::sleep(std::time::Duration::from_millis(80));
    engine.shutdown();

    let corrected = engine.correction_history(&id).len();
    assert!(corrected > 0, "background monitor should have corrected");

    // No tick outlives shutdown.
    std::thread::sleep(std::time::Duration::from_millis(40));
    assert_eq!(engine.correction_history(&id).len(), corrected);
}

#[test]
fn shutdown_without_start_is_harmless() {
    let source = FakePoseSource::new();
    let engine = engine_with(&source);
    engine.shutdown();
    engine.shutdown();
}
