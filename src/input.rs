//! Keyboard state
//!
//! Raw key events arrive whenever the platform delivers them; the simulation
//! only ever sees a [`TickInput`] snapshot. Held keys are level-triggered,
//! restart is edge-triggered (one press, one restart).

use std::collections::HashSet;

use crate::sim::TickInput;

/// Logical keys the game reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Left,
    Right,
    Up,
    Restart,
}

impl Key {
    /// Map a DOM `KeyboardEvent.code` to a game key
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "ArrowLeft" => Some(Key::Left),
            "ArrowRight" => Some(Key::Right),
            "ArrowUp" => Some(Key::Up),
            "KeyR" | "Space" | "Enter" => Some(Key::Restart),
            _ => None,
        }
    }
}

/// Input state manager
#[derive(Debug, Default)]
pub struct KeyboardState {
    /// Currently held keys
    pressed: HashSet<Key>,
    /// Keys pressed since the last consumed tick
    just_pressed: HashSet<Key>,
}

impl KeyboardState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Process a key-down event (auto-repeat downs do not re-arm the edge)
    pub fn key_down(&mut self, key: Key) {
        if self.pressed.insert(key) {
            self.just_pressed.insert(key);
        }
    }

    /// Process a key-up event
    pub fn key_up(&mut self, key: Key) {
        self.pressed.remove(&key);
    }

    /// Release everything (window lost focus)
    pub fn release_all(&mut self) {
        self.pressed.clear();
        self.just_pressed.clear();
    }

    pub fn is_pressed(&self, key: Key) -> bool {
        self.pressed.contains(&key)
    }

    pub fn is_just_pressed(&self, key: Key) -> bool {
        self.just_pressed.contains(&key)
    }

    /// Snapshot for the next simulation tick
    pub fn snapshot(&self) -> TickInput {
        TickInput {
            left: self.is_pressed(Key::Left),
            right: self.is_pressed(Key::Right),
            up: self.is_pressed(Key::Up),
            restart: self.is_just_pressed(Key::Restart),
        }
    }

    /// Clear edges once a tick has consumed them
    pub fn end_tick(&mut self) {
        self.just_pressed.clear();
    }
}
