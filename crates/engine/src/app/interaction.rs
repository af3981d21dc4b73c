use tracing::{debug, info};

use crate::journey::{JourneyStore, ScrollOutcome, Stage};

use super::rendering::{Projector, Viewport};
use super::{InputAction, InputSnapshot, MarkerKind, SceneWorld};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct TickInputOutcome {
    pub navigated: u32,
    pub zoomed: u32,
    pub restarted: bool,
}

/// Feeds one tick of collected input into the journey store.
pub(crate) fn apply_tick_input(
    input: &InputSnapshot,
    journey: &mut JourneyStore,
    world: &SceneWorld,
    viewport: Viewport,
) -> TickInputOutcome {
    let mut outcome = TickInputOutcome::default();

    for (event, at) in input.wheel_events() {
        match journey.handle_wheel(*event, *at) {
            ScrollOutcome::Navigated(Some(_)) => outcome.navigated += 1,
            ScrollOutcome::Zoomed => outcome.zoomed += 1,
            ScrollOutcome::Navigated(None) | ScrollOutcome::Dropped(_) => {}
        }
    }

    let drag = input.drag_delta_px();
    if drag.x != 0.0 || drag.y != 0.0 {
        journey.rotate_camera(drag.x, drag.y);
    }

    if let Some(click) = input.click_position_px() {
        let projector = Projector::new(journey.camera(), viewport);
        match world.pick_marker(&projector, click) {
            Some(MarkerKind::Ignition) => {
                journey.trigger_explosion();
            }
            Some(MarkerKind::Factor(id)) => journey.set_active_factor(id),
            None if journey.stage() == Stage::Singularity && !journey.is_exploded() => {
                journey.trigger_explosion();
            }
            None => {
                if journey.active_factor().is_some() {
                    debug!("panel_closed_by_click");
                    journey.clear_active();
                }
            }
        }
    }

    if input.was_pressed(InputAction::ToggleReverse) {
        journey.toggle_active();
    }
    if input.was_pressed(InputAction::ClosePanel) {
        journey.clear_active();
    }
    if input.was_pressed(InputAction::RestartJourney) && journey.stage() == Stage::DEEPEST {
        journey.restart_journey();
        outcome.restarted = true;
        info!("journey_restart_requested");
    }

    outcome
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, Instant};

    use super::*;
    use crate::app::{SceneMarker, Vec2, Vec3};
    use crate::journey::{FactorId, WheelEvent};

    fn viewport() -> Viewport {
        Viewport {
            width: 800,
            height: 600,
        }
    }

    fn center() -> Vec2 {
        Vec2 { x: 400.0, y: 300.0 }
    }

    fn world_with(kind: MarkerKind) -> SceneWorld {
        let mut world = SceneWorld::default();
        world.push_marker(SceneMarker {
            kind,
            position: Vec3::ZERO,
            radius: 1.0,
            color: [255, 255, 255],
        });
        world
    }

    #[test]
    fn clicking_ignition_marker_explodes_singularity() {
        let mut journey = JourneyStore::default();
        let input = InputSnapshot::empty().with_click_at_px(Some(center()));

        apply_tick_input(&input, &mut journey, &world_with(MarkerKind::Ignition), viewport());

        assert!(journey.is_exploded());
        assert_eq!(journey.stage(), Stage::Singularity);
    }

    #[test]
    fn clicking_factor_marker_opens_panel_and_r_toggles_it() {
        let mut journey = JourneyStore::default();
        journey.set_stage(1);
        let world = world_with(MarkerKind::Factor(FactorId::Sun));

        let click = InputSnapshot::empty().with_click_at_px(Some(center()));
        apply_tick_input(&click, &mut journey, &world, viewport());
        assert_eq!(journey.active_factor(), Some(FactorId::Sun));

        let toggle = InputSnapshot::empty().with_action_pressed(InputAction::ToggleReverse);
        apply_tick_input(&toggle, &mut journey, &world, viewport());
        assert!(journey.is_reversed(FactorId::Sun));
    }

    #[test]
    fn clicking_empty_space_closes_the_panel() {
        let mut journey = JourneyStore::default();
        journey.set_stage(1);
        journey.set_active_factor(FactorId::Gravity);

        let input = InputSnapshot::empty().with_click_at_px(Some(Vec2 { x: 5.0, y: 5.0 }));
        apply_tick_input(&input, &mut journey, &world_with(MarkerKind::Factor(FactorId::Sun)), viewport());

        assert_eq!(journey.active_factor(), None);
    }

    #[test]
    fn escape_closes_panel_without_clearing_polarity() {
        let mut journey = JourneyStore::default();
        journey.set_stage(1);
        journey.set_active_factor(FactorId::Gravity);
        journey.toggle_active();

        let input = InputSnapshot::empty().with_action_pressed(InputAction::ClosePanel);
        apply_tick_input(&input, &mut journey, &SceneWorld::default(), viewport());

        assert_eq!(journey.active_factor(), None);
        assert!(journey.is_reversed(FactorId::Gravity));
    }

    #[test]
    fn wheel_events_drive_navigation() {
        let mut journey = JourneyStore::default();
        journey.trigger_explosion();
        let t0 = Instant::now();
        let input = InputSnapshot::empty()
            .with_wheel_event(WheelEvent::new(120.0), t0)
            .with_wheel_event(WheelEvent::new(120.0), t0 + Duration::from_millis(10));

        let outcome = apply_tick_input(&input, &mut journey, &SceneWorld::default(), viewport());

        assert_eq!(outcome.navigated, 1);
        assert_eq!(journey.stage(), Stage::Cosmos);
        assert_eq!(journey.counters().dropped_wheel_events, 1);
    }

    #[test]
    fn restart_only_applies_at_deepest_stage() {
        let mut journey = JourneyStore::default();
        journey.set_stage(2);
        let input = InputSnapshot::empty().with_action_pressed(InputAction::RestartJourney);

        let ignored = apply_tick_input(&input, &mut journey, &SceneWorld::default(), viewport());
        assert!(!ignored.restarted);
        assert_eq!(journey.stage(), Stage::Nature);

        journey.set_stage(4);
        let restarted = apply_tick_input(&input, &mut journey, &SceneWorld::default(), viewport());
        assert!(restarted.restarted);
        assert_eq!(journey.stage(), Stage::Singularity);
        assert!(!journey.is_exploded());
    }

    #[test]
    fn drag_is_ignored_before_the_cosmos() {
        let mut journey = JourneyStore::default();
        let before = *journey.camera();
        let input = InputSnapshot::empty().with_drag_delta_px(Vec2 { x: 40.0, y: 10.0 });

        apply_tick_input(&input, &mut journey, &SceneWorld::default(), viewport());

        assert_eq!(*journey.camera(), before);
    }
}
