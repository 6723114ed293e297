//! Input plumbing: timestamped presses and keyboard bindings
//!
//! Frontends translate whatever they receive (key events, scripted
//! characters) into [`ButtonPress`] values and queue them on an
//! [`InputSource`]. The session drains the source every frame, even while
//! paused, so stale presses never leak into the round that resumes.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::Millis;
use crate::game::ButtonName;

/// One button press, stamped with the driver's `now` at arrival
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ButtonPress {
    pub button: ButtonName,
    pub at: Millis,
}

/// Per-frame source of pending presses
pub trait InputSource {
    /// Hand over everything received since the last drain, oldest first.
    fn drain(&mut self) -> Vec<ButtonPress>;
}

/// Plain FIFO input source
#[derive(Default)]
pub struct PressQueue {
    pending: VecDeque<ButtonPress>,
}

impl PressQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, button: ButtonName, at: Millis) {
        self.pending.push_back(ButtonPress { button, at });
    }
}

impl InputSource for PressQueue {
    fn drain(&mut self) -> Vec<ButtonPress> {
        self.pending.drain(..).collect()
    }
}

/// Keyboard layout: WASD plus space, with an optional inverted mode that
/// swaps each direction for its opposite
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct KeyBindings {
    inverted: bool,
}

impl KeyBindings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn inverted(&self) -> bool {
        self.inverted
    }

    pub fn toggle_invert(&mut self) {
        self.inverted = !self.inverted;
    }

    /// Map one key to a button; `None` for unbound keys.
    pub fn button_for(&self, key: char) -> Option<ButtonName> {
        let button = match key.to_ascii_lowercase() {
            'w' => ButtonName::Up,
            's' => ButtonName::Down,
            'a' => ButtonName::Left,
            'd' => ButtonName::Right,
            ' ' => ButtonName::Action,
            _ => return None,
        };
        Some(if self.inverted { invert(button) } else { button })
    }
}

fn invert(button: ButtonName) -> ButtonName {
    match button {
        ButtonName::Up => ButtonName::Down,
        ButtonName::Down => ButtonName::Up,
        ButtonName::Left => ButtonName::Right,
        ButtonName::Right => ButtonName::Left,
        ButtonName::Action => ButtonName::Action,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_bindings() {
        let keys = KeyBindings::new();
        assert_eq!(keys.button_for('w'), Some(ButtonName::Up));
        assert_eq!(keys.button_for('s'), Some(ButtonName::Down));
        assert_eq!(keys.button_for('a'), Some(ButtonName::Left));
        assert_eq!(keys.button_for('d'), Some(ButtonName::Right));
        assert_eq!(keys.button_for(' '), Some(ButtonName::Action));
    }

    #[test]
    fn test_uppercase_keys_match() {
        let keys = KeyBindings::new();
        assert_eq!(keys.button_for('W'), Some(ButtonName::Up));
        assert_eq!(keys.button_for('D'), Some(ButtonName::Right));
    }

    #[test]
    fn test_unbound_key_is_none() {
        let keys = KeyBindings::new();
        assert_eq!(keys.button_for('q'), None);
        assert_eq!(keys.button_for('\n'), None);
    }

    #[test]
    fn test_inverted_swaps_directions() {
        let mut keys = KeyBindings::new();
        keys.toggle_invert();
        assert!(keys.inverted());
        assert_eq!(keys.button_for('w'), Some(ButtonName::Down));
        assert_eq!(keys.button_for('s'), Some(ButtonName::Up));
        assert_eq!(keys.button_for('a'), Some(ButtonName::Right));
        assert_eq!(keys.button_for('d'), Some(ButtonName::Left));
        assert_eq!(keys.button_for(' '), Some(ButtonName::Action));

        keys.toggle_invert();
        assert_eq!(keys.button_for('w'), Some(ButtonName::Up));
    }

    #[test]
    fn test_press_queue_drains_in_order() {
        let mut queue = PressQueue::new();
        queue.push(ButtonName::Up, 10);
        queue.push(ButtonName::Down, 20);

        let presses = queue.drain();
        assert_eq!(
            presses,
            vec![
                ButtonPress {
                    button: ButtonName::Up,
                    at: 10
                },
                ButtonPress {
                    button: ButtonName::Down,
                    at: 20
                },
            ]
        );
        assert!(queue.drain().is_empty());
    }
}
