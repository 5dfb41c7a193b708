use std::collections::HashSet;

use glam::Vec2;

/// Keys the viewer reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    Left,
    Right,
    Up,
    Down,
    PageUp,
    PageDown,
    Escape,
    Character(char),
}

impl KeyCode {
    /// Letters are stored upper case so `w` and `W` are the same key.
    pub fn character(ch: char) -> Self {
        Self::Character(ch.to_ascii_uppercase())
    }
}

/// Keys currently held down.
#[derive(Debug, Default, Clone)]
pub struct InputState {
    keys: HashSet<KeyCode>,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_key_down(&mut self, key: KeyCode) {
        self.keys.insert(key);
    }

    pub fn set_key_up(&mut self, key: KeyCode) {
        self.keys.remove(&key);
    }

    pub fn is_key_down(&self, key: KeyCode) -> bool {
        self.keys.contains(&key)
    }

    fn axis(&self, negative: [KeyCode; 2], positive: [KeyCode; 2]) -> f32 {
        let held = |keys: [KeyCode; 2]| keys.iter().any(|key| self.is_key_down(*key));
        match (held(negative), held(positive)) {
            (true, false) => -1.0,
            (false, true) => 1.0,
            _ => 0.0,
        }
    }

    /// Screen-space pan direction from the arrow keys and WASD.
    /// `x` points right and `y` points up.
    pub fn pan_direction(&self) -> Vec2 {
        Vec2::new(
            self.axis(
                [KeyCode::Left, KeyCode::Character('A')],
                [KeyCode::Right, KeyCode::Character('D')],
            ),
            self.axis(
                [KeyCode::Down, KeyCode::Character('S')],
                [KeyCode::Up, KeyCode::Character('W')],
            ),
        )
    }

    /// `+1` zooms out (more tiles visible), `-1` zooms in.
    pub fn zoom_delta(&self) -> f32 {
        self.axis(
            [KeyCode::PageUp, KeyCode::Character('E')],
            [KeyCode::PageDown, KeyCode::Character('Q')],
        )
    }
}
