use std::collections::HashSet;

use glam::Vec2;
use parking_lot::RwLock;

/// Identifier for a physical keyboard key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    Named(NamedKey),
    Character(char),
    Digit(u8),
}

impl KeyCode {
    pub const W: Self = Self::Character('W');
    pub const A: Self = Self::Character('A');
    pub const S: Self = Self::Character('S');
    pub const D: Self = Self::Character('D');
}

/// Keys without a printable character that the scene reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NamedKey {
    Escape,
    LeftShift,
    RightShift,
}

/// Keyboard and mouse state collected from window events between frames.
#[derive(Debug, Default)]
pub struct InputState {
    keys: RwLock<HashSet<KeyCode>>,
    mouse_delta: RwLock<Vec2>,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_key_down(&self, key: KeyCode) {
        self.keys.write().insert(key);
    }

    pub fn set_key_up(&self, key: KeyCode) {
        self.keys.write().remove(&key);
    }

    pub fn is_key_down(&self, key: KeyCode) -> bool {
        self.keys.read().contains(&key)
    }

    pub fn is_shift_down(&self) -> bool {
        let keys = self.keys.read();
        keys.contains(&KeyCode::Named(NamedKey::LeftShift))
            || keys.contains(&KeyCode::Named(NamedKey::RightShift))
    }

    /// Adds raw mouse motion; several events may arrive per frame.
    pub fn add_mouse_motion(&self, delta: Vec2) {
        *self.mouse_delta.write() += delta;
    }

    /// Returns the motion accumulated since the previous call and resets it.
    pub fn take_mouse_delta(&self) -> Vec2 {
        std::mem::take(&mut *self.mouse_delta.write())
    }

    /// Forgets held keys, e.g. when the window loses focus.
    pub fn release_all(&self) {
        self.keys.write().clear();
        *self.mouse_delta.write() = Vec2::ZERO;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn input_state_tracks_keys() {
        let state = InputState::new();
        state.set_key_down(KeyCode::W);
        assert!(state.is_key_down(KeyCode::W));
        state.set_key_up(KeyCode::W);
        assert!(!state.is_key_down(KeyCode::W));
    }

    #[test]
    fn either_shift_counts() {
        let state = InputState::new();
        assert!(!state.is_shift_down());
        state.set_key_down(KeyCode::Named(NamedKey::RightShift));
        assert!(state.is_shift_down());
    }

    #[test]
    fn mouse_motion_accumulates_until_taken() {
        let state = InputState::new();
        state.add_mouse_motion(Vec2::new(2.0, -1.0));
        state.add_mouse_motion(Vec2::new(3.0, 4.0));
        assert_eq!(state.take_mouse_delta(), Vec2::new(5.0, 3.0));
        assert_eq!(state.take_mouse_delta(), Vec2::ZERO);
    }

    #[test]
    fn release_all_clears_everything() {
        let state = InputState::new();
        state.set_key_down(KeyCode::Digit(1));
        state.add_mouse_motion(Vec2::ONE);
        state.release_all();
        assert!(!state.is_key_down(KeyCode::Digit(1)));
        assert_eq!(state.take_mouse_delta(), Vec2::ZERO);
    }
}
