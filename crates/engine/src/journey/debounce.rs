use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use super::stage::Stage;

pub const DEFAULT_COARSE_THRESHOLD: f32 = 80.0;
pub const DEFAULT_FINE_THRESHOLD: f32 = 5.0;
pub const DEFAULT_COOLDOWN_MS: u64 = 1_200;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub ctrl: bool,
    pub meta: bool,
}

impl Modifiers {
    pub const NONE: Modifiers = Modifiers {
        ctrl: false,
        meta: false,
    };

    /// Ctrl/Cmd marks a pinch-zoom gesture rather than narrative navigation.
    pub fn is_zoom_gesture(self) -> bool {
        self.ctrl || self.meta
    }
}

/// Positive `delta_y` means scrolling down (forward).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WheelEvent {
    pub delta_y: f32,
    pub modifiers: Modifiers,
}

impl WheelEvent {
    pub fn new(delta_y: f32) -> Self {
        Self {
            delta_y,
            modifiers: Modifiers::NONE,
        }
    }

    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IgnoreReason {
    Modifier,
    BelowThreshold,
    Cooldown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollDecision {
    Advance,
    Retreat,
    Ignored(IgnoreReason),
}

impl ScrollDecision {
    pub fn is_navigation(self) -> bool {
        matches!(self, ScrollDecision::Advance | ScrollDecision::Retreat)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DebounceConfig {
    /// Applies from the Cosmos stage on, where small deltas belong to camera zoom.
    pub coarse_threshold: f32,
    pub fine_threshold: f32,
    pub cooldown_ms: u64,
}

impl Default for DebounceConfig {
    fn default() -> Self {
        Self {
            coarse_threshold: DEFAULT_COARSE_THRESHOLD,
            fine_threshold: DEFAULT_FINE_THRESHOLD,
            cooldown_ms: DEFAULT_COOLDOWN_MS,
        }
    }
}

impl DebounceConfig {
    pub fn threshold_for(&self, stage: Stage) -> f32 {
        if stage >= Stage::Cosmos {
            self.coarse_threshold
        } else {
            self.fine_threshold
        }
    }

    pub fn cooldown(&self) -> Duration {
        Duration::from_millis(self.cooldown_ms)
    }
}

/// Events inside the cooldown window are dropped, not queued.
#[derive(Debug, Clone)]
pub struct ScrollDebouncer {
    config: DebounceConfig,
    cooldown_until: Option<Instant>,
}

impl ScrollDebouncer {
    pub fn new(config: DebounceConfig) -> Self {
        Self {
            config,
            cooldown_until: None,
        }
    }

    pub fn config(&self) -> &DebounceConfig {
        &self.config
    }

    pub fn is_cooling_down(&self, now: Instant) -> bool {
        self.cooldown_until.is_some_and(|until| now < until)
    }

    pub fn classify(&mut self, event: WheelEvent, stage: Stage, now: Instant) -> ScrollDecision {
        if event.modifiers.is_zoom_gesture() {
            return ScrollDecision::Ignored(IgnoreReason::Modifier);
        }
        if !(event.delta_y.abs() > self.config.threshold_for(stage)) {
            return ScrollDecision::Ignored(IgnoreReason::BelowThreshold);
        }
        if self.is_cooling_down(now) {
            return ScrollDecision::Ignored(IgnoreReason::Cooldown);
        }

        self.cooldown_until = Some(now + self.config.cooldown());
        if event.delta_y > 0.0 {
            ScrollDecision::Advance
        } else {
            ScrollDecision::Retreat
        }
    }

    pub fn reset(&mut self) {
        self.cooldown_until = None;
    }
}

impl Default for ScrollDebouncer {
    fn default() -> Self {
        Self::new(DebounceConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn burst_of_large_scrolls_yields_one_transition() {
        let mut debouncer = ScrollDebouncer::default();
        let base = Instant::now();

        let accepted = (0..10)
            .map(|i| {
                debouncer.classify(
                    WheelEvent::new(200.0),
                    Stage::Cosmos,
                    base + Duration::from_millis(i * 10),
                )
            })
            .filter(|decision| decision.is_navigation())
            .count();

        assert_eq!(accepted, 1);
    }

    #[test]
    fn threshold_depends_on_stage() {
        let base = Instant::now();

        let mut cosmos = ScrollDebouncer::default();
        assert_eq!(
            cosmos.classify(WheelEvent::new(50.0), Stage::Cosmos, base),
            ScrollDecision::Ignored(IgnoreReason::BelowThreshold)
        );

        let mut singularity = ScrollDebouncer::default();
        assert_eq!(
            singularity.classify(WheelEvent::new(50.0), Stage::Singularity, base),
            ScrollDecision::Advance
        );
    }

    #[test]
    fn threshold_is_strict() {
        let mut debouncer = ScrollDebouncer::default();
        assert_eq!(
            debouncer.classify(WheelEvent::new(80.0), Stage::Nature, Instant::now()),
            ScrollDecision::Ignored(IgnoreReason::BelowThreshold)
        );
    }

    #[test]
    fn modifier_events_never_navigate_or_start_cooldown() {
        let mut debouncer = ScrollDebouncer::default();
        let now = Instant::now();
        let pinch = WheelEvent::new(500.0).with_modifiers(Modifiers {
            ctrl: true,
            meta: false,
        });

        assert_eq!(
            debouncer.classify(pinch, Stage::Cosmos, now),
            ScrollDecision::Ignored(IgnoreReason::Modifier)
        );
        assert!(!debouncer.is_cooling_down(now));
        assert_eq!(
            debouncer.classify(WheelEvent::new(-120.0), Stage::Cosmos, now),
            ScrollDecision::Retreat
        );
    }

    #[test]
    fn cooldown_lifts_after_window() {
        let mut debouncer = ScrollDebouncer::default();
        let base = Instant::now();

        assert!(debouncer
            .classify(WheelEvent::new(100.0), Stage::Cosmos, base)
            .is_navigation());
        assert_eq!(
            debouncer.classify(
                WheelEvent::new(100.0),
                Stage::Cosmos,
                base + Duration::from_millis(1_199)
            ),
            ScrollDecision::Ignored(IgnoreReason::Cooldown)
        );
        assert_eq!(
            debouncer.classify(
                WheelEvent::new(100.0),
                Stage::Cosmos,
                base + Duration::from_millis(1_200)
            ),
            ScrollDecision::Advance
        );
    }

    #[test]
    fn dropped_events_do_not_extend_cooldown() {
        let mut debouncer = ScrollDebouncer::default();
        let base = Instant::now();
        debouncer.classify(WheelEvent::new(100.0), Stage::Cosmos, base);
        debouncer.classify(
            WheelEvent::new(100.0),
            Stage::Cosmos,
            base + Duration::from_millis(1_000),
        );

        assert!(!debouncer.is_cooling_down(base + Duration::from_millis(1_200)));
    }

    #[test]
    fn nan_delta_is_ignored() {
        let mut debouncer = ScrollDebouncer::default();
        assert_eq!(
            debouncer.classify(WheelEvent::new(f32::NAN), Stage::Singularity, Instant::now()),
            ScrollDecision::Ignored(IgnoreReason::BelowThreshold)
        );
    }
}
