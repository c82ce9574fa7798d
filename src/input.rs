use std::collections::HashSet;

/// Keys the hosts poll. Arrows drive the agent, the rest are host toggles.
#[derive(PartialEq, Eq, Hash, Clone, Copy, Debug)]
pub enum Key {
    Up,
    Down,
    Left,
    Right,
    ToggleManual,
    TogglePause,
}

/// Reports which keys are held right now.
pub trait KeyState {
    fn is_key_held(&self, key: Key) -> bool;
}

#[derive(Default)]
pub struct Input {
    current_pressed_keys: HashSet<Key>,
    previous_pressed_keys: HashSet<Key>,
}

impl Input {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update<I: IntoIterator<Item = Key>>(&mut self, pressed_keys: I) {
        std::mem::swap(&mut self.current_pressed_keys, &mut self.previous_pressed_keys);
        self.current_pressed_keys = pressed_keys.into_iter().collect();
    }

    #[cfg(feature = "sdl")]
    pub fn update_from_keyboard(&mut self, keyboard_state: &sdl2::keyboard::KeyboardState) {
        self.update(keyboard_state.pressed_scancodes().filter_map(key_from_scancode));
    }

    pub fn is_key_pressed(&self, key: Key) -> bool {
        self.current_pressed_keys.contains(&key)
    }

    pub fn is_key_down(&self, key: Key) -> bool {
        self.current_pressed_keys.contains(&key) && !self.previous_pressed_keys.contains(&key)
    }

    #[allow(dead_code)]
    pub fn is_key_up(&self, key: Key) -> bool {
        !self.current_pressed_keys.contains(&key) && self.previous_pressed_keys.contains(&key)
    }
}

impl KeyState for Input {
    fn is_key_held(&self, key: Key) -> bool {
        self.is_key_pressed(key)
    }
}

#[cfg(feature = "sdl")]
fn key_from_scancode(scancode: sdl2::keyboard::Scancode) -> Option<Key> {
    use sdl2::keyboard::Scancode;

    match scancode {
        Scancode::Up => Some(Key::Up),
        Scancode::Down => Some(Key::Down),
        Scancode::Left => Some(Key::Left),
        Scancode::Right => Some(Key::Right),
        Scancode::M => Some(Key::ToggleManual),
        Scancode::P => Some(Key::TogglePause),
        _ => None,
    }
}
