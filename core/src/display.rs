use std::fmt;

use crate::color::Color;

pub const SCREEN_WIDTH: usize = 64;
pub const SCREEN_HEIGHT: usize = 32;
pub const SCREEN_PIXELS: usize = SCREEN_WIDTH * SCREEN_HEIGHT;

/// Monochrome 64x32 pixel grid, row-major (`y * 64 + x`).
///
/// Sprites are XORed against this buffer, never against a display device.
/// Backends read it through [`Framebuffer::pixel`], [`Framebuffer::render_into`]
/// or its `Display` text form.
#[derive(Clone, PartialEq, Eq)]
pub struct Framebuffer {
    pixels: [bool; SCREEN_PIXELS],
    dirty: bool,
}

impl Default for Framebuffer {
    fn default() -> Self {
        Framebuffer {
            pixels: [false; SCREEN_PIXELS],
            dirty: false,
        }
    }
}

impl Framebuffer {
    pub fn new() -> Framebuffer {
        Framebuffer::default()
    }

    pub fn clear(&mut self) {
        self.pixels.iter_mut().for_each(|p| *p = false);
        self.dirty = true;
    }

    /// XORs an 8-pixel-wide sprite at (x, y), one byte per row, MSB leftmost.
    ///
    /// The origin wraps modulo the screen size. Pixels falling past the right
    /// or bottom edge are clipped, or wrapped when `wrap` is set. Returns true
    /// when a lit pixel was turned off.
    pub fn draw_sprite(&mut self, x: u8, y: u8, sprite: &[u8], wrap: bool) -> bool {
        // Origin where we start to draw
        let ox = x as usize % SCREEN_WIDTH;
        let oy = y as usize % SCREEN_HEIGHT;

        let mut collision = false;

        for (row, data) in sprite.iter().enumerate() {
            let mut py = oy + row;
            if py >= SCREEN_HEIGHT {
                if !wrap {
                    break;
                }
                py %= SCREEN_HEIGHT;
            }

            for column in 0..8 {
                // Only set sprite bits touch the screen
                if data & (0x80 >> column) == 0 {
                    continue;
                }

                let mut px = ox + column;
                if px >= SCREEN_WIDTH {
                    if !wrap {
                        break;
                    }
                    px %= SCREEN_WIDTH;
                }

                let pixel = &mut self.pixels[py * SCREEN_WIDTH + px];
                collision |= *pixel;
                *pixel = !*pixel;
            }
        }

        self.dirty = true;
        collision
    }

    /// Lit state at (x, y). Out of range coordinates read as dark.
    pub fn pixel(&self, x: usize, y: usize) -> bool {
        x < SCREEN_WIDTH && y < SCREEN_HEIGHT && self.pixels[y * SCREEN_WIDTH + x]
    }

    pub fn pixels(&self) -> &[bool] {
        &self.pixels[..]
    }

    pub fn lit_count(&self) -> usize {
        self.pixels.iter().filter(|p| **p).count()
    }

    /// Returns whether the buffer changed since the last call, and resets it.
    pub fn take_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    /// Fills `out` (one entry per cell) with `fg` for lit cells and `bg` otherwise.
    pub fn render_into(&self, out: &mut [Color], fg: Color, bg: Color) {
        for (dst, lit) in out.iter_mut().zip(self.pixels.iter()) {
            *dst = if *lit { fg } else { bg };
        }
    }
}

impl fmt::Debug for Framebuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Framebuffer")
            .field("lit", &self.lit_count())
            .field("dirty", &self.dirty)
            .finish()
    }
}

/// 32 lines of 64 characters, `█` for lit pixels.
impl fmt::Display for Framebuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.pixels.chunks(SCREEN_WIDTH) {
            for lit in row {
                f.write_str(if *lit { "█" } else { " " })?;
            }
            f.write_str("\n")?;
        }
        Ok(())
    }
}
