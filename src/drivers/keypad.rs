use crate::constants::hardware::KEY_COUNT;
use crate::drivers::Input;

/// In-memory keypad state. The host writes key transitions into it, the cpu
/// reads it through `Input`.
#[derive(Clone, Debug, Default)]
pub struct Keypad {
    keys: [bool; KEY_COUNT],
    last_pressed: Option<u8>,
}

impl Keypad {
    pub fn new() -> Keypad {
        Keypad::default()
    }

    pub fn key_down(&mut self, key: usize) {
        if key >= KEY_COUNT {
            return;
        }
        if !self.keys[key] {
            self.last_pressed = Some(key as u8);
        }
        self.keys[key] = true;
    }

    pub fn key_up(&mut self, key: usize) {
        if key < KEY_COUNT {
            self.keys[key] = false;
        }
    }

    pub fn release_all(&mut self) {
        self.keys = [false; KEY_COUNT];
    }
}

impl Input for Keypad {
    fn is_pressed(&self, key: u8) -> bool {
        self.keys.get(key as usize).copied().unwrap_or(false)
    }

    fn take_pressed(&mut self) -> Option<u8> {
        self.last_pressed.take()
    }
}
