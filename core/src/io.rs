// Boundaries to the host's input and output devices.

use crate::display::Framebuffer;

/// A transition on one of the sixteen hexadecimal keys, as reported by the host.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum KeyEvent {
    Down(u8),
    Up(u8),
}

/// Turns the framebuffer into something visible.
///
/// The host calls `present` once per frame interval, typically only when
/// [`crate::Chip8::take_dirty`] reports a change. Implementations only read
/// the buffer.
pub trait Renderer {
    type Error;

    fn present(&mut self, framebuffer: &Framebuffer) -> Result<(), Self::Error>;
}
