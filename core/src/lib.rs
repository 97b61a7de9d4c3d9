pub use chip8::{
    Chip8, Chip8Builder, StepState, DEFAULT_FONT, FONT_START, MAX_ROM_SIZE, MEMORY_SIZE,
    PROGRAM_START,
};
pub use color::{Color, ColorParseError, DEFAULT_BACKGROUND_COLOR, DEFAULT_FOREGROUND_COLOR};
pub use display::{Framebuffer, SCREEN_HEIGHT, SCREEN_PIXELS, SCREEN_WIDTH};
pub use error::Chip8Error;
pub use instruction::{disassemble, Instruction, NOT_RECOGNIZED};
pub use io::{KeyEvent, Renderer};
pub use keypad::Keypad;
pub use quirks::{Chip8Mode, Quirks};

mod chip8;
mod color;
mod display;
mod error;
mod instruction;
mod io;
mod keypad;
mod quirks;
