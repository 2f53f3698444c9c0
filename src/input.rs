//! Keyboard and pointer input, reduced to per-tick intent.
//!
//! The window layer only records [`InputEvent`]s as they arrive. Once per tick
//! [`InputState::accumulate`] folds the whole batch, in arrival order, into a
//! [`FrameInput`], so handlers can never race each other over an axis.

use glam::Vec2;

/// Logical keys. The window layer decides which physical keys map here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Forward,
    Backward,
    Left,
    Right,
    Jump,
    Confirm,
    Back,
    Exit,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    Pressed(Key),
    Released(Key),
    /// Pointer position normalised to the window, both axes in [-1, 1], y up.
    PointerMoved { x: f32, y: f32 },
    /// Scroll wheel steps, positive away from the user.
    Scroll(f32),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    Forward,
    Side,
}

/// Tri-state value of one movement axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AxisValue {
    Negative,
    #[default]
    Neutral,
    Positive,
}

impl AxisValue {
    pub fn as_f32(self) -> f32 {
        match self {
            AxisValue::Negative => -1.0,
            AxisValue::Neutral => 0.0,
            AxisValue::Positive => 1.0,
        }
    }

    pub fn opposite(self) -> Self {
        match self {
            AxisValue::Negative => AxisValue::Positive,
            AxisValue::Neutral => AxisValue::Neutral,
            AxisValue::Positive => AxisValue::Negative,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MovementIntent {
    pub forward: AxisValue,
    pub side: AxisValue,
}

impl MovementIntent {
    pub fn get(&self, axis: Axis) -> AxisValue {
        match axis {
            Axis::Forward => self.forward,
            Axis::Side => self.side,
        }
    }

    pub fn set(&mut self, axis: Axis, value: AxisValue) {
        match axis {
            Axis::Forward => self.forward = value,
            Axis::Side => self.side = value,
        }
    }

    pub fn is_idle(&self) -> bool {
        self.forward == AxisValue::Neutral && self.side == AxisValue::Neutral
    }
}

/// Which axis a key drives and the value it drives it to.
pub fn binding(key: Key) -> Option<(Axis, AxisValue)> {
    match key {
        Key::Forward => Some((Axis::Forward, AxisValue::Positive)),
        Key::Backward => Some((Axis::Forward, AxisValue::Negative)),
        Key::Right => Some((Axis::Side, AxisValue::Positive)),
        Key::Left => Some((Axis::Side, AxisValue::Negative)),
        _ => None,
    }
}

/// Everything one tick needs from the input devices.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrameInput {
    pub intent: MovementIntent,
    pub jump: bool,
    pub exit: bool,
    /// Latest pointer position seen this tick, if it moved.
    pub pointer: Option<Vec2>,
    pub zoom_steps: f32,
    /// Key presses in arrival order, for menu navigation.
    pub pressed: Vec<Key>,
}

/// Persistent held-key state between ticks.
#[derive(Debug, Default, Clone)]
pub struct InputState {
    // --- Held keys ---
    move_fwd: bool,
    move_back: bool,
    move_left: bool,
    move_right: bool,

    intent: MovementIntent,
}

impl InputState {
    #[cfg(test)]
    pub fn intent(&self) -> MovementIntent {
        self.intent
    }

    pub fn accumulate(&mut self, events: &[InputEvent]) -> FrameInput {
        let mut frame = FrameInput::default();

        for event in events {
            match *event {
                InputEvent::Pressed(key) => {
                    self.set_held(key, true);
                    if let Some((axis, value)) = binding(key) {
                        self.intent.set(axis, value);
                    }
                    match key {
                        Key::Jump => frame.jump = true,
                        Key::Exit => frame.exit = true,
                        _ => {}
                    }
                    frame.pressed.push(key);
                }
                InputEvent::Released(key) => {
                    self.set_held(key, false);
                    if let Some((axis, value)) = binding(key) {
                        // only the key currently driving the axis may release it
                        if self.intent.get(axis) == value {
                            let fallback = if self.opposite_held(key) {
                                value.opposite()
                            } else {
                                AxisValue::Neutral
                            };
                            self.intent.set(axis, fallback);
                        }
                    }
                }
                InputEvent::PointerMoved { x, y } => frame.pointer = Some(Vec2::new(x, y)),
                InputEvent::Scroll(steps) => frame.zoom_steps += steps,
            }
        }

        frame.intent = self.intent;
        frame
    }

    /// Forgets held keys, e.g. when focus moves to a menu.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    fn set_held(&mut self, key: Key, down: bool) {
        match key {
            Key::Forward => self.move_fwd = down,
            Key::Backward => self.move_back = down,
            Key::Left => self.move_left = down,
            Key::Right => self.move_right = down,
            _ => {}
        }
    }

    fn opposite_held(&self, key: Key) -> bool {
        match key {
            Key::Forward => self.move_back,
            Key::Backward => self.move_fwd,
            Key::Left => self.move_right,
            Key::Right => self.move_left,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use InputEvent::{Pressed, Released};

    #[test]
    fn press_and_release_drive_axis() {
        let mut input = InputState::default();
        let f = input.accumulate(&[Pressed(Key::Forward)]);
        assert_eq!(f.intent.forward, AxisValue::Positive);
        let f = input.accumulate(&[Released(Key::Forward)]);
        assert_eq!(f.intent.forward, AxisValue::Neutral);
    }

    #[test]
    fn stale_release_does_not_clobber_active_direction() {
        let mut input = InputState::default();
        // left pressed, then right pressed: right wins
        input.accumulate(&[Pressed(Key::Left), Pressed(Key::Right)]);
        assert_eq!(input.intent().side, AxisValue::Positive);

        // releasing left must leave right in charge
        let f = input.accumulate(&[Released(Key::Left)]);
        assert_eq!(f.intent.side, AxisValue::Positive);
    }

    #[test]
    fn release_without_press_is_ignored() {
        let mut input = InputState::default();
        input.accumulate(&[Pressed(Key::Right)]);
        let f = input.accumulate(&[Released(Key::Left)]);
        assert_eq!(f.intent.side, AxisValue::Positive);
    }

    #[test]
    fn releasing_active_key_falls_back_to_held_opposite() {
        let mut input = InputState::default();
        input.accumulate(&[Pressed(Key::Forward), Pressed(Key::Backward)]);
        assert_eq!(input.intent().forward, AxisValue::Negative);
        let f = input.accumulate(&[Released(Key::Backward)]);
        assert_eq!(f.intent.forward, AxisValue::Positive);
        let f = input.accumulate(&[Released(Key::Forward)]);
        assert_eq!(f.intent.forward, AxisValue::Neutral);
    }

    #[test]
    fn repeated_presses_never_accumulate() {
        let mut input = InputState::default();
        let f = input.accumulate(&[
            Pressed(Key::Right),
            Pressed(Key::Right),
            Pressed(Key::Right),
        ]);
        assert_eq!(f.intent.side, AxisValue::Positive);
        assert_eq!(f.intent.side.as_f32(), 1.0);
    }

    #[test]
    fn axes_are_independent() {
        let mut input = InputState::default();
        let f = input.accumulate(&[Pressed(Key::Forward), Pressed(Key::Left)]);
        assert_eq!(f.intent.forward, AxisValue::Positive);
        assert_eq!(f.intent.side, AxisValue::Negative);
        let f = input.accumulate(&[Released(Key::Left)]);
        assert_eq!(f.intent.forward, AxisValue::Positive);
        assert_eq!(f.intent.side, AxisValue::Neutral);
    }

    #[test]
    fn one_shots_do_not_persist() {
        let mut input = InputState::default();
        let f = input.accumulate(&[Pressed(Key::Jump), InputEvent::Scroll(1.0), InputEvent::Scroll(2.0)]);
        assert!(f.jump);
        assert_eq!(f.zoom_steps, 3.0);
        assert_eq!(f.pressed, vec![Key::Jump]);

        let f = input.accumulate(&[]);
        assert!(!f.jump);
        assert_eq!(f.zoom_steps, 0.0);
        assert!(f.pressed.is_empty());
    }

    #[test]
    fn last_pointer_position_wins() {
        let mut input = InputState::default();
        let f = input.accumulate(&[
            InputEvent::PointerMoved { x: 0.1, y: 0.2 },
            InputEvent::PointerMoved { x: -0.3, y: 0.4 },
        ]);
        assert_eq!(f.pointer, Some(Vec2::new(-0.3, 0.4)));
    }

    #[test]
    fn exit_key_requests_exit() {
        let mut input = InputState::default();
        assert!(input.accumulate(&[Pressed(Key::Exit)]).exit);
    }

    #[test]
    fn reset_clears_intent() {
        let mut input = InputState::default();
        input.accumulate(&[Pressed(Key::Forward)]);
        input.reset();
        assert!(input.intent().is_idle());
    }
}
