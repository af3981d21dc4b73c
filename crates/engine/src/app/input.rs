use std::time::Instant;

use winit::event::{ElementState, MouseButton, MouseScrollDelta};
use winit::keyboard::{KeyCode, ModifiersState, PhysicalKey};

use crate::journey::{Modifiers, WheelEvent};

use super::scene::Vec2;

/// Pixels per wheel "line" for devices that report line deltas.
pub const LINE_DELTA_PX: f32 = 100.0;
const CLICK_DRAG_TOLERANCE_PX: f32 = 4.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputAction {
    ToggleReverse,
    ClosePanel,
    RestartJourney,
    ToggleOverlay,
}

const ACTION_COUNT: usize = 4;

/// Held state plus a press edge per action; an edge is reported once per press.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct ActionStates {
    down: [bool; ACTION_COUNT],
    pressed: [bool; ACTION_COUNT],
}

impl ActionStates {
    pub(crate) fn set(&mut self, action: InputAction, is_down: bool) {
        let index = action.index();
        if is_down && !self.down[index] {
            self.pressed[index] = true;
        }
        self.down[index] = is_down;
    }

    pub(crate) fn was_pressed(&self, action: InputAction) -> bool {
        self.pressed[action.index()]
    }

    pub(crate) fn take_pressed(&mut self, action: InputAction) -> bool {
        std::mem::take(&mut self.pressed[action.index()])
    }

    fn clear_edges(&mut self) {
        self.pressed = [false; ACTION_COUNT];
    }
}

impl InputAction {
    const fn index(self) -> usize {
        match self {
            InputAction::ToggleReverse => 0,
            InputAction::ClosePanel => 1,
            InputAction::RestartJourney => 2,
            InputAction::ToggleOverlay => 3,
        }
    }
}

pub(crate) fn action_for_key(key: PhysicalKey) -> Option<InputAction> {
    match key {
        PhysicalKey::Code(KeyCode::KeyR) => Some(InputAction::ToggleReverse),
        PhysicalKey::Code(KeyCode::Escape) | PhysicalKey::Code(KeyCode::Backspace) => {
            Some(InputAction::ClosePanel)
        }
        PhysicalKey::Code(KeyCode::Enter) | PhysicalKey::Code(KeyCode::NumpadEnter) => {
            Some(InputAction::RestartJourney)
        }
        PhysicalKey::Code(KeyCode::F3) => Some(InputAction::ToggleOverlay),
        _ => None,
    }
}

pub(crate) fn modifiers_from_state(state: ModifiersState) -> Modifiers {
    Modifiers {
        ctrl: state.control_key(),
        meta: state.super_key(),
    }
}

/// winit reports wheel-up as positive y; navigation wants scroll-down positive.
pub(crate) fn wheel_event_from_scroll_delta(
    delta: MouseScrollDelta,
    modifiers: Modifiers,
) -> Option<WheelEvent> {
    let delta_y = match delta {
        MouseScrollDelta::LineDelta(_, y) => -y * LINE_DELTA_PX,
        MouseScrollDelta::PixelDelta(position) => -(position.y as f32),
    };
    if delta_y == 0.0 || !delta_y.is_finite() {
        return None;
    }
    Some(WheelEvent::new(delta_y).with_modifiers(modifiers))
}

#[derive(Debug, Clone, Default)]
pub struct InputSnapshot {
    wheel_events: Vec<(WheelEvent, Instant)>,
    drag_delta_px: Vec2,
    click_position_px: Option<Vec2>,
    cursor_position_px: Option<Vec2>,
    actions: ActionStates,
    window_width: u32,
    window_height: u32,
}

impl InputSnapshot {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn with_wheel_event(mut self, event: WheelEvent, at: Instant) -> Self {
        self.wheel_events.push((event, at));
        self
    }

    pub fn with_drag_delta_px(mut self, drag_delta_px: Vec2) -> Self {
        self.drag_delta_px = drag_delta_px;
        self
    }

    pub fn with_click_at_px(mut self, click_position_px: Option<Vec2>) -> Self {
        self.click_position_px = click_position_px;
        self
    }

    pub fn with_action_pressed(mut self, action: InputAction) -> Self {
        self.actions.set(action, true);
        self
    }

    pub fn with_window_size(mut self, window_size: (u32, u32)) -> Self {
        self.window_width = window_size.0;
        self.window_height = window_size.1;
        self
    }

    pub fn wheel_events(&self) -> &[(WheelEvent, Instant)] {
        &self.wheel_events
    }

    pub fn drag_delta_px(&self) -> Vec2 {
        self.drag_delta_px
    }

    pub fn click_position_px(&self) -> Option<Vec2> {
        self.click_position_px
    }

    pub fn cursor_position_px(&self) -> Option<Vec2> {
        self.cursor_position_px
    }

    pub fn was_pressed(&self, action: InputAction) -> bool {
        self.actions.was_pressed(action)
    }

    pub fn window_size(&self) -> (u32, u32) {
        (self.window_width, self.window_height)
    }
}

/// Accumulates window events between simulation ticks.
#[derive(Debug, Default)]
pub(crate) struct InputCollector {
    modifiers: Modifiers,
    pending_wheel_events: Vec<(WheelEvent, Instant)>,
    actions: ActionStates,
    cursor_position_px: Option<Vec2>,
    left_mouse_is_down: bool,
    press_position_px: Option<Vec2>,
    dragged_beyond_tolerance: bool,
    pending_drag_px: Vec2,
    pending_click_px: Option<Vec2>,
    window_width: u32,
    window_height: u32,
}

impl InputCollector {
    pub(crate) fn new(window_width: u32, window_height: u32) -> Self {
        Self {
            window_width,
            window_height,
            ..Self::default()
        }
    }

    pub(crate) fn set_modifiers(&mut self, state: ModifiersState) {
        self.modifiers = modifiers_from_state(state);
    }

    pub(crate) fn handle_mouse_wheel(&mut self, delta: MouseScrollDelta, at: Instant) {
        if let Some(event) = wheel_event_from_scroll_delta(delta, self.modifiers) {
            self.pending_wheel_events.push((event, at));
        }
    }

    pub(crate) fn handle_key(&mut self, key: PhysicalKey, state: ElementState) {
        if let Some(action) = action_for_key(key) {
            self.actions.set(action, state == ElementState::Pressed);
        }
    }

    pub(crate) fn set_cursor_position_px(&mut self, x: f32, y: f32) {
        let next = Vec2 { x, y };
        if self.left_mouse_is_down {
            if let Some(previous) = self.cursor_position_px {
                self.pending_drag_px.x += next.x - previous.x;
                self.pending_drag_px.y += next.y - previous.y;
            }
            if let Some(press) = self.press_position_px {
                let dx = next.x - press.x;
                let dy = next.y - press.y;
                if dx * dx + dy * dy > CLICK_DRAG_TOLERANCE_PX * CLICK_DRAG_TOLERANCE_PX {
                    self.dragged_beyond_tolerance = true;
                }
            }
        }
        self.cursor_position_px = Some(next);
    }

    pub(crate) fn clear_cursor_position(&mut self) {
        self.cursor_position_px = None;
    }

    /// A click is a left press and release without dragging past the tolerance.
    pub(crate) fn handle_mouse_input(&mut self, button: MouseButton, state: ElementState) {
        if button != MouseButton::Left {
            return;
        }
        match state {
            ElementState::Pressed => {
                if !self.left_mouse_is_down {
                    self.press_position_px = self.cursor_position_px;
                    self.dragged_beyond_tolerance = false;
                }
                self.left_mouse_is_down = true;
            }
            ElementState::Released => {
                if self.left_mouse_is_down && !self.dragged_beyond_tolerance {
                    self.pending_click_px = self.press_position_px.or(self.cursor_position_px);
                }
                self.left_mouse_is_down = false;
                self.press_position_px = None;
            }
        }
    }

    pub(crate) fn set_window_size(&mut self, width: u32, height: u32) {
        self.window_width = width;
        self.window_height = height;
    }

    pub(crate) fn take_action_pressed(&mut self, action: InputAction) -> bool {
        self.actions.take_pressed(action)
    }

    pub(crate) fn snapshot_for_tick(&mut self) -> InputSnapshot {
        let snapshot = InputSnapshot {
            wheel_events: std::mem::take(&mut self.pending_wheel_events),
            drag_delta_px: std::mem::take(&mut self.pending_drag_px),
            click_position_px: self.pending_click_px.take(),
            cursor_position_px: self.cursor_position_px,
            actions: self.actions,
            window_width: self.window_width,
            window_height: self.window_height,
        };
        self.actions.clear_edges();
        snapshot
    }
}

#[cfg(test)]
mod tests {
    use winit::dpi::PhysicalPosition;

    use super::*;

    #[test]
    fn line_delta_is_scaled_and_sign_flipped() {
        let event = wheel_event_from_scroll_delta(MouseScrollDelta::LineDelta(0.0, -1.0), Modifiers::NONE)
            .expect("event");
        assert_eq!(event.delta_y, 100.0);

        let up = wheel_event_from_scroll_delta(MouseScrollDelta::LineDelta(0.0, 2.0), Modifiers::NONE)
            .expect("event");
        assert_eq!(up.delta_y, -200.0);
    }

    #[test]
    fn pixel_delta_passes_through_with_flipped_sign() {
        let event = wheel_event_from_scroll_delta(
            MouseScrollDelta::PixelDelta(PhysicalPosition::new(0.0, -42.0)),
            Modifiers::NONE,
        )
        .expect("event");
        assert_eq!(event.delta_y, 42.0);
    }

    #[test]
    fn zero_delta_produces_no_event() {
        assert!(wheel_event_from_scroll_delta(MouseScrollDelta::LineDelta(3.0, 0.0), Modifiers::NONE).is_none());
    }

    #[test]
    fn modifiers_are_attached_to_wheel_events() {
        let mut input = InputCollector::new(1280, 720);
        input.set_modifiers(ModifiersState::CONTROL);
        input.handle_mouse_wheel(MouseScrollDelta::LineDelta(0.0, -1.0), Instant::now());

        let snapshot = input.snapshot_for_tick();
        let (event, _) = snapshot.wheel_events()[0];
        assert!(event.modifiers.ctrl);
        assert!(!event.modifiers.meta);
    }

    #[test]
    fn super_key_maps_to_meta() {
        let modifiers = modifiers_from_state(ModifiersState::SUPER);
        assert!(modifiers.meta);
        assert!(!modifiers.ctrl);
    }

    #[test]
    fn wheel_events_are_drained_once() {
        let mut input = InputCollector::new(1280, 720);
        input.handle_mouse_wheel(MouseScrollDelta::LineDelta(0.0, -1.0), Instant::now());

        assert_eq!(input.snapshot_for_tick().wheel_events().len(), 1);
        assert!(input.snapshot_for_tick().wheel_events().is_empty());
    }

    #[test]
    fn key_press_is_edge_triggered_for_single_tick() {
        let mut input = InputCollector::new(1280, 720);
        input.handle_key(PhysicalKey::Code(KeyCode::KeyR), ElementState::Pressed);
        let first = input.snapshot_for_tick();
        input.handle_key(PhysicalKey::Code(KeyCode::KeyR), ElementState::Pressed);
        let second = input.snapshot_for_tick();
        input.handle_key(PhysicalKey::Code(KeyCode::KeyR), ElementState::Released);
        input.handle_key(PhysicalKey::Code(KeyCode::KeyR), ElementState::Pressed);
        let third = input.snapshot_for_tick();

        assert!(first.was_pressed(InputAction::ToggleReverse));
        assert!(!second.was_pressed(InputAction::ToggleReverse));
        assert!(third.was_pressed(InputAction::ToggleReverse));
    }

    #[test]
    fn escape_and_backspace_both_close_the_panel() {
        assert_eq!(
            action_for_key(PhysicalKey::Code(KeyCode::Escape)),
            Some(InputAction::ClosePanel)
        );
        assert_eq!(
            action_for_key(PhysicalKey::Code(KeyCode::Backspace)),
            Some(InputAction::ClosePanel)
        );
        assert_eq!(action_for_key(PhysicalKey::Code(KeyCode::KeyW)), None);
    }

    #[test]
    fn overlay_toggle_can_be_taken_outside_ticks() {
        let mut input = InputCollector::new(1280, 720);
        input.handle_key(PhysicalKey::Code(KeyCode::F3), ElementState::Pressed);

        assert!(input.take_action_pressed(InputAction::ToggleOverlay));
        assert!(!input.take_action_pressed(InputAction::ToggleOverlay));
    }

    #[test]
    fn press_and_release_in_place_is_a_click() {
        let mut input = InputCollector::new(1280, 720);
        input.set_cursor_position_px(100.0, 200.0);
        input.handle_mouse_input(MouseButton::Left, ElementState::Pressed);
        input.set_cursor_position_px(101.0, 201.0);
        input.handle_mouse_input(MouseButton::Left, ElementState::Released);

        let snapshot = input.snapshot_for_tick();
        let click = snapshot.click_position_px().expect("click");
        assert_eq!((click.x, click.y), (100.0, 200.0));
        assert!(input.snapshot_for_tick().click_position_px().is_none());
    }

    #[test]
    fn drag_accumulates_delta_and_suppresses_click() {
        let mut input = InputCollector::new(1280, 720);
        input.set_cursor_position_px(100.0, 100.0);
        input.handle_mouse_input(MouseButton::Left, ElementState::Pressed);
        input.set_cursor_position_px(130.0, 90.0);
        input.set_cursor_position_px(160.0, 80.0);
        input.handle_mouse_input(MouseButton::Left, ElementState::Released);

        let snapshot = input.snapshot_for_tick();
        assert!(snapshot.click_position_px().is_none());
        assert_eq!(snapshot.drag_delta_px(), Vec2 { x: 60.0, y: -20.0 });
    }

    #[test]
    fn cursor_motion_without_button_is_not_a_drag() {
        let mut input = InputCollector::new(1280, 720);
        input.set_cursor_position_px(0.0, 0.0);
        input.set_cursor_position_px(50.0, 50.0);

        assert_eq!(input.snapshot_for_tick().drag_delta_px(), Vec2::default());
    }
}
