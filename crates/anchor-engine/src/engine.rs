//! Engine facade and lifecycle.
//!
//! Owns every piece of per-object state behind one lock (single-writer
//! discipline shared by the caller API and both tick threads) and exposes
//! the public surface the host application talks to. The rendering layer
//! holds only `ObjectId`s; nothing outside this module can reach engine
//! internals.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use serde::Serialize;
use tracing::{debug, info, trace};

use anchor_core::types::collections::FxHashMap;
use anchor_core::types::geometry::{Transform, Vec3};
use anchor_core::types::identifiers::ObjectId;
use anchor_core::{AnchorError, EngineConfig, PoseSource};

use crate::baseline::{capture_baseline, AnchorBaseline};
use crate::history::{CorrectionEvent, CorrectionHistory};
use crate::monitor::{correction_step, measure_drift};
use crate::network::{build_network, synthetic_ring, weigh_features, StabilizationNetwork};
use crate::scheduler::TickHandle;
use crate::scoring::{overall_score, stability_score};
use crate::threshold::ThresholdController;

/// Counters and aggregates exposed for diagnostics overlays.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DiagnosticsSnapshot {
    /// Objects currently holding a baseline.
    pub active_count: usize,
    /// Threshold breaches observed since engine creation.
    pub drift_events_detected: u64,
    /// Mean stability score across active networks; 0.0 with none.
    pub overall_stability_score: f64,
    /// Corrections applied since engine creation (history caps don't
    /// affect this count).
    pub total_corrections: u64,
}

impl DiagnosticsSnapshot {
    /// JSON rendering for debug overlays and log export.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| "{}".to_string())
    }
}

/// Everything the lock guards. The three id-keyed maps always agree on
/// membership; `correction_offsets` carries the accumulated nudges that
/// turn a raw tracker pose into the corrected live pose.
#[derive(Default)]
struct EngineState {
    baselines: FxHashMap<ObjectId, AnchorBaseline>,
    networks: FxHashMap<ObjectId, StabilizationNetwork>,
    histories: FxHashMap<ObjectId, CorrectionHistory>,
    correction_offsets: FxHashMap<ObjectId, Vec3>,
    threshold: ThresholdController,
    drift_events_detected: u64,
    total_corrections: u64,
    overall_stability_score: f64,
}

impl EngineState {
    fn refresh_overall(&mut self) {
        self.overall_stability_score =
            overall_score(self.networks.values().map(|n| n.stability_score));
    }
}

struct EngineInner {
    pose: Arc<dyn PoseSource>,
    config: EngineConfig,
    state: Mutex<EngineState>,
}

impl EngineInner {
    /// Ticks and caller reads must keep working even if another holder
    /// panicked; recover the guard on poisoning.
    fn lock_state(&self) -> MutexGuard<'_, EngineState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// The spatial anchor stability and drift correction engine.
///
/// One logical instance per tracking session. Construct with an injected
/// [`PoseSource`], call [`start`](Self::start) to run the periodic ticks, or
/// drive [`run_monitor_tick`](Self::run_monitor_tick) /
/// [`run_network_tick`](Self::run_network_tick) directly for deterministic
/// tests.
pub struct StabilityEngine {
    inner: Arc<EngineInner>,
    monitor_task: Mutex<Option<TickHandle>>,
    network_task: Mutex<Option<TickHandle>>,
}

impl StabilityEngine {
    pub fn new(pose: Arc<dyn PoseSource>, config: EngineConfig) -> Self {
        Self {
            inner: Arc::new(EngineInner {
                pose,
                config,
                state: Mutex::new(EngineState::default()),
            }),
            monitor_task: Mutex::new(None),
            network_task: Mutex::new(None),
        }
    }

    pub fn with_defaults(pose: Arc<dyn PoseSource>) -> Self {
        Self::new(pose, EngineConfig::default())
    }

    /// Spawn the drift-monitor and network-refresh tick threads.
    /// Calling again while running is a no-op.
    pub fn start(&self) {
        let mut monitor = self
            .monitor_task
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let mut network = self
            .network_task
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if monitor.is_some() {
            return;
        }

        let monitor_inner = Arc::clone(&self.inner);
        *monitor = Some(TickHandle::spawn(
            "anchor-drift-monitor",
            Duration::from_millis(self.inner.config.effective_monitor_interval_ms()),
            move || monitor_inner.monitor_tick(),
        ));

        let network_inner = Arc::clone(&self.inner);
        *network = Some(TickHandle::spawn(
            "anchor-network-refresh",
            Duration::from_millis(self.inner.config.effective_network_interval_ms()),
            move || network_inner.network_tick(),
        ));

        info!(
            monitor_interval_ms = self.inner.config.effective_monitor_interval_ms(),
            network_interval_ms = self.inner.config.effective_network_interval_ms(),
            "stability engine started"
        );
    }

    /// Stop both tick threads and wait for them to exit. Idempotent.
    pub fn shutdown(&self) {
        let handles = [
            self.monitor_task
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .take(),
            self.network_task
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .take(),
        ];
        let mut stopped = false;
        for handle in handles {
            if let Some(mut handle) = handle {
                handle.shutdown();
                stopped = true;
            }
        }
        if stopped {
            info!("stability engine stopped");
        }
    }

    /// Register an object for stabilization, capturing its baseline and an
    /// initial reference network. Re-registering an existing id overwrites
    /// the prior baseline (explicit re-baseline, not an error).
    pub fn register_object(
        &self,
        id: impl Into<ObjectId>,
        initial_transform: &Transform,
    ) -> Result<AnchorBaseline, AnchorError> {
        let id = id.into();
        let radius = self.inner.config.effective_network_radius();
        let now = now_millis();

        let baseline = capture_baseline(self.inner.pose.as_ref(), initial_transform, radius, now)?;

        let mut state = self.inner.lock_state();
        let score = stability_score(&baseline.reference_snapshot);
        if state.baselines.contains_key(&id) {
            info!(object = %id, "re-baselining existing object");
        }
        state.networks.insert(
            id.clone(),
            StabilizationNetwork {
                center_position: baseline.initial_position,
                reference_anchors: baseline.reference_snapshot.clone(),
                stability_score: score,
                last_updated: now,
                radius,
            },
        );
        state.histories.insert(
            id.clone(),
            CorrectionHistory::new(self.inner.config.effective_history_cap()),
        );
        state.correction_offsets.insert(id.clone(), Vec3::zeros());
        state.baselines.insert(id.clone(), baseline.clone());
        state.refresh_overall();
        info!(
            object = %id,
            references = baseline.reference_snapshot.len(),
            environment_quality = baseline.environment_quality,
            stability_score = score,
            "object registered"
        );
        Ok(baseline)
    }

    /// Drop all engine state for `id`. Atomic: a concurrent tick sees the
    /// object fully present or fully absent. Unknown ids are a no-op.
    pub fn unregister_object(&self, id: &ObjectId) {
        let mut state = self.inner.lock_state();
        let existed = state.baselines.remove(id).is_some();
        let had_network = state.networks.remove(id).is_some();
        state.histories.remove(id);
        state.correction_offsets.remove(id);
        if existed || had_network {
            state.refresh_overall();
        }
        if existed {
            info!(object = %id, "object unregistered");
        }
    }

    /// Stability score of one object's network, or `None` for unknown ids.
    pub fn current_stability_score(&self, id: &ObjectId) -> Option<f64> {
        let state = self.inner.lock_state();
        state.networks.get(id).map(|n| n.stability_score)
    }

    /// Corrected live position: the tracker's current pose plus every
    /// correction applied so far. `None` while the pose is unresolvable.
    pub fn live_position(&self, id: &ObjectId) -> Option<Vec3> {
        let pose = self.inner.pose.current_pose(id)?;
        if !pose.is_finite() {
            return None;
        }
        let state = self.inner.lock_state();
        let offset = state
            .correction_offsets
            .get(id)
            .copied()
            .unwrap_or_else(Vec3::zeros);
        Some(pose.position() + offset)
    }

    /// Seed `anchor_count` synthetic reference points on a circle of
    /// `radius` around `center` and rebuild the object's network from
    /// them plus whatever natural features are observable. Used where the
    /// environment is too sparse for a trustworthy natural network.
    ///
    /// Only registered objects get a network: the maps must agree on
    /// membership, so an unknown id is skipped (logged, not an error).
    pub fn create_multi_anchor_network(
        &self,
        id: impl Into<ObjectId>,
        center: &Vec3,
        radius: f64,
        anchor_count: u32,
    ) {
        let id = id.into();
        // Weigh within at least twice the ring radius so seeded anchors
        // never land on the zero-weight rim of their own query sphere.
        let coverage = self
            .inner
            .config
            .effective_network_radius()
            .max(radius * 2.0);

        let mut features = synthetic_ring(center, radius, anchor_count);
        features.extend(self.inner.pose.nearby_features(center, coverage));
        let references = weigh_features(&features, center, coverage);
        let score = stability_score(&references);

        let mut state = self.inner.lock_state();
        if !state.baselines.contains_key(&id) {
            debug!(object = %id, "multi-anchor network requested for unregistered object; skipped");
            return;
        }
        debug!(
            object = %id,
            seeded = anchor_count,
            references = references.len(),
            stability_score = score,
            "multi-anchor network created"
        );
        state.networks.insert(
            id,
            StabilizationNetwork {
                center_position: *center,
                reference_anchors: references,
                stability_score: score,
                last_updated: now_millis(),
                radius: coverage,
            },
        );
        state.refresh_overall();
    }

    /// Copy of an object's current stabilization network, or `None` for
    /// unknown ids. Diagnostics read; the live network is rebuilt each
    /// refresh tick.
    pub fn network_snapshot(&self, id: &ObjectId) -> Option<StabilizationNetwork> {
        let state = self.inner.lock_state();
        state.networks.get(id).cloned()
    }

    /// Stored correction events for `id`, oldest first. Empty for unknown ids.
    pub fn correction_history(&self, id: &ObjectId) -> Vec<CorrectionEvent> {
        let state = self.inner.lock_state();
        state
            .histories
            .get(id)
            .map(CorrectionHistory::to_vec)
            .unwrap_or_default()
    }

    /// Drift tolerance currently in force, in meters.
    pub fn current_drift_threshold(&self) -> f64 {
        self.inner.lock_state().threshold.threshold()
    }

    /// Counters and aggregates for diagnostics overlays.
    pub fn diagnostics_snapshot(&self) -> DiagnosticsSnapshot {
        let state = self.inner.lock_state();
        DiagnosticsSnapshot {
            active_count: state.baselines.len(),
            drift_events_detected: state.drift_events_detected,
            overall_stability_score: state.overall_stability_score,
            total_corrections: state.total_corrections,
        }
    }

    /// Run one drift-monitor pass. The scheduler calls this on its own
    /// thread; tests call it directly for determinism.
    pub fn run_monitor_tick(&self) {
        self.inner.monitor_tick();
    }

    /// Run one network-refresh pass. Same contract as
    /// [`run_monitor_tick`](Self::run_monitor_tick).
    pub fn run_network_tick(&self) {
        self.inner.network_tick();
    }
}

impl Drop for StabilityEngine {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl EngineInner {
    /// One drift-monitor pass: refresh the adaptive threshold, measure every
    /// baselined object against it, and nudge breaching objects back toward
    /// their baselines. Objects without a resolvable pose this tick are
    /// skipped and retried next tick.
    fn monitor_tick(&self) {
        let quality = self.pose.tracking_quality();
        let gain = self.config.effective_correction_gain();
        let max_step = self.config.effective_max_correction_step();
        let epsilon = self.config.effective_correction_epsilon();
        let history_cap = self.config.effective_history_cap();

        let mut state = self.lock_state();
        let threshold = state.threshold.update(quality);

        let ids: Vec<ObjectId> = state.baselines.keys().cloned().collect();
        let mut corrected = 0usize;
        let mut skipped = 0usize;

        for id in ids {
            let Some(live_pose) = self.pose.current_pose(&id) else {
                skipped += 1;
                continue;
            };
            if !live_pose.is_finite() {
                skipped += 1;
                continue;
            }
            let Some(baseline_position) = state.baselines.get(&id).map(|b| b.initial_position)
            else {
                continue;
            };
            let offset = state
                .correction_offsets
                .get(&id)
                .copied()
                .unwrap_or_else(Vec3::zeros);
            let live = live_pose.position() + offset;

            let sample = measure_drift(&live, &baseline_position);
            if sample.magnitude <= threshold {
                continue;
            }
            state.drift_events_detected += 1;

            let Some(step) = correction_step(&live, &baseline_position, gain, max_step, epsilon)
            else {
                continue;
            };
            *state
                .correction_offsets
                .entry(id.clone())
                .or_insert_with(Vec3::zeros) += step.vector;
            state
                .histories
                .entry(id.clone())
                .or_insert_with(|| CorrectionHistory::new(history_cap))
                .push(CorrectionEvent {
                    timestamp: now_millis(),
                    drift_magnitude: sample.magnitude,
                    correction_vector: step.vector,
                    success: true,
                });
            state.total_corrections += 1;
            corrected += 1;
            debug!(
                object = %id,
                drift_m = sample.magnitude,
                step_m = step.magnitude,
                threshold_m = threshold,
                "drift correction applied"
            );
        }

        trace!(corrected, skipped, threshold_m = threshold, "monitor tick");
    }

    /// One network-refresh pass: rebuild every active object's reference
    /// network from its current (possibly corrected) position and refresh
    /// the engine-wide average. Objects without a resolvable pose keep
    /// their previous network this tick.
    fn network_tick(&self) {
        let radius = self.config.effective_network_radius();

        let mut state = self.lock_state();
        let ids: Vec<ObjectId> = state.baselines.keys().cloned().collect();

        for id in ids {
            let center = match self.pose.current_pose(&id) {
                Some(pose) if pose.is_finite() => {
                    let offset = state
                        .correction_offsets
                        .get(&id)
                        .copied()
                        .unwrap_or_else(Vec3::zeros);
                    pose.position() + offset
                }
                _ => continue,
            };

            let references = build_network(self.pose.as_ref(), &center, radius);
            let score = stability_score(&references);
            state.networks.insert(
                id,
                StabilizationNetwork {
                    center_position: center,
                    reference_anchors: references,
                    stability_score: score,
                    last_updated: now_millis(),
                    radius,
                },
            );
        }

        state.refresh_overall();
        trace!(
            overall = state.overall_stability_score,
            networks = state.networks.len(),
            "network refresh tick"
        );
    }
}

fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
