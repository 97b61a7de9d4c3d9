use crate::error::Chip8Error;

pub const KEY_COUNT: usize = 16;

/// Held state of the sixteen hexadecimal keys.
///
/// Only the host writes it; the processor reads it for EX9E/EXA1 and is told
/// about press edges through [`crate::Chip8::key_down`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Keypad {
    held: [bool; KEY_COUNT],
}

impl Keypad {
    pub fn new() -> Keypad {
        Keypad::default()
    }

    /// Marks `key` as held. Returns true on a released-to-pressed edge.
    pub fn press(&mut self, key: u8) -> Result<bool, Chip8Error> {
        let slot = self.slot(key)?;
        let edge = !*slot;
        *slot = true;
        Ok(edge)
    }

    pub fn release(&mut self, key: u8) -> Result<(), Chip8Error> {
        *self.slot(key)? = false;
        Ok(())
    }

    /// Keys above 0xF are never held.
    pub fn is_held(&self, key: u8) -> bool {
        self.held.get(key as usize).copied().unwrap_or(false)
    }

    pub fn release_all(&mut self) {
        self.held = [false; KEY_COUNT];
    }

    fn slot(&mut self, key: u8) -> Result<&mut bool, Chip8Error> {
        self.held
            .get_mut(key as usize)
            .ok_or(Chip8Error::InvalidKey(key))
    }
}
