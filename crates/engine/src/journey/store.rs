use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, trace};

use super::camera::{CameraDirector, OrbitCamera, OrbitConfig, TweenPurpose};
use super::debounce::{DebounceConfig, IgnoreReason, ScrollDebouncer, ScrollDecision, WheelEvent};
use super::deferred::{CommitOutcome, DeferredCommits};
use super::factors::{FactorId, FactorRegistry};
use super::reversal::ReversalStore;
use super::stage::{Stage, StageMachine, Transition};

pub const DEFAULT_POINT_BUDGET: usize = 6_000;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct JourneyConfig {
    pub debounce: DebounceConfig,
    pub orbit: OrbitConfig,
    /// Upper bound on particles a scene may generate.
    pub point_budget: usize,
}

impl Default for JourneyConfig {
    fn default() -> Self {
        Self {
            debounce: DebounceConfig::default(),
            orbit: OrbitConfig::default(),
            point_budget: DEFAULT_POINT_BUDGET,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ScrollOutcome {
    /// The event was classified as navigation; `None` when the move clamped.
    Navigated(Option<Transition>),
    Zoomed,
    Dropped(IgnoreReason),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct JourneyCounters {
    pub transitions: u64,
    pub dropped_wheel_events: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DetailPanel {
    pub factor: FactorId,
    pub title: &'static str,
    pub description: &'static str,
    pub influence: &'static str,
    pub reversed: bool,
    pub toggle_label: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JourneySnapshot {
    pub stage: Stage,
    pub stage_index: usize,
    pub exploded: bool,
    pub active_factor: Option<FactorId>,
    pub reversed: Vec<FactorId>,
    pub camera: OrbitCamera,
    pub camera_animating: bool,
    pub pending_commit: bool,
    pub generation: u64,
    pub counters: JourneyCounters,
    pub panel: Option<DetailPanel>,
}

/// Single writer for all journey state. Consumers get it injected by `&mut`.
#[derive(Debug, Clone)]
pub struct JourneyStore {
    config: JourneyConfig,
    registry: FactorRegistry,
    machine: StageMachine,
    reversal: ReversalStore,
    debouncer: ScrollDebouncer,
    camera: OrbitCamera,
    director: CameraDirector,
    deferred: DeferredCommits,
    counters: JourneyCounters,
}

impl Default for JourneyStore {
    fn default() -> Self {
        Self::new(JourneyConfig::default(), FactorRegistry::builtin())
    }
}

impl JourneyStore {
    pub fn new(config: JourneyConfig, registry: FactorRegistry) -> Self {
        Self {
            config,
            registry,
            machine: StageMachine::new(),
            reversal: ReversalStore::new(),
            debouncer: ScrollDebouncer::new(config.debounce),
            camera: OrbitCamera::default(),
            director: CameraDirector::new(),
            deferred: DeferredCommits::new(),
            counters: JourneyCounters::default(),
        }
    }

    pub fn config(&self) -> &JourneyConfig {
        &self.config
    }

    pub fn registry(&self) -> &FactorRegistry {
        &self.registry
    }

    pub fn stage(&self) -> Stage {
        self.machine.stage()
    }

    pub fn is_exploded(&self) -> bool {
        self.machine.is_exploded()
    }

    pub fn active_factor(&self) -> Option<FactorId> {
        self.machine.active_factor()
    }

    pub fn reversal(&self) -> &ReversalStore {
        &self.reversal
    }

    pub fn is_reversed(&self, id: FactorId) -> bool {
        self.reversal.is_reversed(id)
    }

    pub fn camera(&self) -> &OrbitCamera {
        &self.camera
    }

    pub fn counters(&self) -> JourneyCounters {
        self.counters
    }

    pub fn generation(&self) -> u64 {
        self.machine.generation()
    }

    pub fn is_camera_animating(&self) -> bool {
        self.director.is_animating()
    }

    pub fn orbit_enabled(&self) -> bool {
        self.machine.is_exploded() && self.machine.stage() >= Stage::Cosmos
    }

    pub fn handle_wheel(&mut self, event: WheelEvent, now: Instant) -> ScrollOutcome {
        let decision = self.debouncer.classify(event, self.machine.stage(), now);
        match decision {
            ScrollDecision::Advance => ScrollOutcome::Navigated(self.advance()),
            ScrollDecision::Retreat => ScrollOutcome::Navigated(self.retreat()),
            ScrollDecision::Ignored(reason) => {
                self.counters.dropped_wheel_events =
                    self.counters.dropped_wheel_events.saturating_add(1);
                trace!(delta_y = event.delta_y, reason = ?reason, "wheel_event_ignored");
                let zoomable = reason != IgnoreReason::Cooldown
                    && self.orbit_enabled()
                    && !self.director.is_animating();
                if zoomable {
                    self.camera.dolly(event.delta_y, &self.config.orbit);
                    ScrollOutcome::Zoomed
                } else {
                    ScrollOutcome::Dropped(reason)
                }
            }
        }
    }

    pub fn advance(&mut self) -> Option<Transition> {
        let transition = self.machine.advance()?;
        self.apply_transition(transition);
        Some(transition)
    }

    pub fn retreat(&mut self) -> Option<Transition> {
        let transition = self.machine.retreat()?;
        self.apply_transition(transition);
        Some(transition)
    }

    pub fn trigger_explosion(&mut self) -> Option<Transition> {
        let transition = self.machine.trigger_explosion()?;
        self.apply_transition(transition);
        Some(transition)
    }

    pub fn set_stage(&mut self, index: i64) -> Option<Transition> {
        let transition = self.machine.set_stage(index)?;
        self.apply_transition(transition);
        Some(transition)
    }

    pub fn set_active_factor(&mut self, id: FactorId) {
        self.machine.set_active_factor(id);
        debug!(factor = %id, registered = self.registry.lookup(id).is_some(), "factor_selected");
    }

    /// Selection by free-form key; unknown keys are ignored.
    pub fn select_factor_key(&mut self, key: &str) -> bool {
        match FactorId::from_key(key) {
            Some(id) => {
                self.set_active_factor(id);
                true
            }
            None => {
                debug!(key, "factor_key_unknown");
                false
            }
        }
    }

    /// Flips the active factor's polarity. No-op without an active factor.
    pub fn toggle_active(&mut self) -> Option<bool> {
        let id = self.machine.active_factor()?;
        let reversed = self.reversal.toggle(id);
        info!(factor = %id, reversed, "factor_toggled");
        Some(reversed)
    }

    /// Closes the panel; polarity flags are left as they are.
    pub fn clear_active(&mut self) {
        self.machine.clear_active_factor();
    }

    pub fn detail_panel(&self) -> Option<DetailPanel> {
        let id = self.machine.active_factor()?;
        let entry = self.registry.lookup(id)?;
        let reversed = self.reversal.is_reversed(id);
        Some(DetailPanel {
            factor: id,
            title: entry.displayed_name(reversed),
            description: entry.displayed_description(reversed),
            influence: entry.influence,
            reversed,
            toggle_label: format!("Enable {}", entry.displayed_name(!reversed)),
        })
    }

    pub fn rotate_camera(&mut self, dx_px: f32, dy_px: f32) {
        if !self.orbit_enabled() {
            return;
        }
        self.camera.rotate(dx_px, dy_px, &self.config.orbit);
    }

    /// Advances camera animation and fires any deferred commit whose animation completed.
    pub fn tick(&mut self, dt_seconds: f32) -> Option<Transition> {
        let completed = self.director.tick(dt_seconds, &mut self.camera)?;
        if completed != TweenPurpose::ExplosionPullback {
            return None;
        }

        match self.deferred.fire(&mut self.machine) {
            CommitOutcome::Applied(transition) => {
                self.apply_transition(transition);
                Some(transition)
            }
            CommitOutcome::Superseded | CommitOutcome::Nothing => None,
        }
    }

    /// Equivalent of a full reload: every piece of state returns to its initial value.
    pub fn restart_journey(&mut self) {
        info!(from = ?self.machine.stage(), "journey_restarted");
        *self = Self::new(self.config, self.registry.clone());
    }

    pub fn snapshot(&self) -> JourneySnapshot {
        JourneySnapshot {
            stage: self.machine.stage(),
            stage_index: self.machine.stage().index(),
            exploded: self.machine.is_exploded(),
            active_factor: self.machine.active_factor(),
            reversed: self.reversal.reversed_ids().collect(),
            camera: self.camera,
            camera_animating: self.director.is_animating(),
            pending_commit: self.deferred.pending().is_some(),
            generation: self.machine.generation(),
            counters: self.counters,
            panel: self.detail_panel(),
        }
    }

    fn apply_transition(&mut self, transition: Transition) {
        info!(
            from = ?transition.from,
            to = ?transition.to,
            ignited = transition.ignited,
            rearmed = transition.rearmed,
            generation = transition.generation,
            "stage_transition"
        );

        self.deferred.discard_stale(transition.generation);
        if transition.ignited && transition.to == Stage::Singularity {
            self.director.start_explosion_pullback(&self.camera);
            self.deferred.schedule(&self.machine, Stage::Cosmos);
        }

        if transition.stage_changed() {
            self.counters.transitions = self.counters.transitions.saturating_add(1);
            self.director
                .on_stage_changed(transition.from, transition.to, &mut self.camera);
        }
    }
}
