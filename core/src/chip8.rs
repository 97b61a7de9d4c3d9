// CHIP-8 processor
//
// Useful links:
// * [Guide to making a CHIP-8 emulator](https://tobiasvl.github.io/blog/write-a-chip-8-emulator/)
// * [Cowgod's Chip-8 Technical Reference](http://devernay.free.fr/hacks/chip8/C8TECH10.HTM)
// * [high-level assembler for the Chip8 virtual machine](https://github.com/JohnEarnest/Octo/blob/gh-pages/js/emulator.js)
//

use log::{debug, info, trace};
use rand::{rngs::StdRng, RngCore, SeedableRng};

use crate::display::Framebuffer;
use crate::error::Chip8Error;
use crate::instruction::Instruction;
use crate::io::KeyEvent;
use crate::keypad::Keypad;
use crate::quirks::{Chip8Mode, Quirks};

pub const MEMORY_SIZE: usize = 0x1000;
/// Programs are loaded here and execution starts here.
pub const PROGRAM_START: u16 = 0x200;
pub const MAX_ROM_SIZE: usize = MEMORY_SIZE - PROGRAM_START as usize;
pub const FONT_START: u16 = 0x000;
pub const FONT_GLYPH_SIZE: u16 = 5;
pub const STACK_DEPTH: usize = 16;

/// Index of VF, the carry/borrow/collision flag register
const FLAG: usize = 0xF;

pub static DEFAULT_FONT: [u8; 80] = [
    0xF0, 0x90, 0x90, 0x90, 0xF0, // 0
    0x20, 0x60, 0x20, 0x20, 0x70, // 1
    0xF0, 0x10, 0xF0, 0x80, 0xF0, // 2
    0xF0, 0x10, 0xF0, 0x10, 0xF0, // 3
    0x90, 0x90, 0xF0, 0x10, 0x10, // 4
    0xF0, 0x80, 0xF0, 0x10, 0xF0, // 5
    0xF0, 0x80, 0xF0, 0x90, 0xF0, // 6
    0xF0, 0x10, 0x20, 0x40, 0x40, // 7
    0xF0, 0x90, 0xF0, 0x90, 0xF0, // 8
    0xF0, 0x90, 0xF0, 0x10, 0xF0, // 9
    0xF0, 0x90, 0xF0, 0x90, 0x90, // A
    0xE0, 0x90, 0xE0, 0x90, 0xE0, // B
    0xF0, 0x80, 0x80, 0x80, 0xF0, // C
    0xE0, 0x90, 0x90, 0x90, 0xE0, // D
    0xF0, 0x80, 0xF0, 0x80, 0xF0, // E
    0xF0, 0x80, 0xF0, 0x80, 0x80, // F
];

/// What the processor is doing once a `step` returns.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum StepState {
    Running,
    /// FX0A is suspended until the host reports a key press
    AwaitingKey,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum ExecState {
    Running,
    AwaitingKey { register: u8 },
}

#[derive(Debug, Default)]
pub struct Chip8Builder {
    /// ROM
    rom: Option<Vec<u8>>,
    /// Font sprite
    font: Option<Vec<u8>>,
    /// PRNG Seed
    rng_seed: Option<u64>,
    /// Quirks
    quirks: Quirks,
}

pub struct Chip8 {
    /// General purpose registers
    regs: [u8; 16],
    /// Index register
    index: u16,
    /// Program counter
    pc: u16,
    /// Call stack
    stack: [u16; STACK_DEPTH],
    /// Stack pointer
    sp: u8,
    /// Delay Timer
    delay_timer: u8,
    /// Sound Timer
    sound_timer: u8,
    /// Memory
    memory: Vec<u8>,
    /// Display: 64x32 pixels 1 bit monochrome
    display: Framebuffer,
    /// Held keys
    keypad: Keypad,
    /// Running or suspended on FX0A
    state: ExecState,
    /// Quirks
    quirks: Quirks,
    /// PRNG Generator
    rng: StdRng,
}

impl Chip8Builder {
    pub fn new() -> Chip8Builder {
        Chip8Builder::default()
    }

    pub fn with_rom(mut self, rom: Vec<u8>) -> Self {
        self.rom = Some(rom);
        self
    }

    pub fn with_font(mut self, font: Vec<u8>) -> Self {
        self.font = Some(font);
        self
    }

    pub fn with_rng_seed(mut self, seed: u64) -> Self {
        self.rng_seed = Some(seed);
        self
    }

    /// Replaces the quirk set with the preset for `mode`.
    pub fn with_mode(mut self, mode: Chip8Mode) -> Self {
        self.quirks = mode.quirks();
        self
    }

    pub fn with_quirks(mut self, quirks: Quirks) -> Self {
        self.quirks = quirks;
        self
    }

    pub fn build(&self) -> Result<Chip8, Chip8Error> {
        let rom = self.rom.as_ref().ok_or(Chip8Error::MissingRom)?;
        if rom.len() > MAX_ROM_SIZE {
            return Err(Chip8Error::RomTooLarge {
                size: rom.len(),
                max: MAX_ROM_SIZE,
            });
        }

        let font = match &self.font {
            Some(font) => &font[..],
            None => &DEFAULT_FONT[..],
        };
        if font.len() != DEFAULT_FONT.len() {
            return Err(Chip8Error::InvalidFont { size: font.len() });
        }

        // Create memory
        let mut memory = vec![0u8; MEMORY_SIZE];
        let font_start = FONT_START as usize;
        memory[font_start..font_start + font.len()].copy_from_slice(font);
        let rom_start = PROGRAM_START as usize;
        memory[rom_start..rom_start + rom.len()].copy_from_slice(rom);

        // Pseudo random number generator
        let rng = match self.rng_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        info!("Loaded {} byte ROM, quirks {:?}", rom.len(), self.quirks);

        Ok(Chip8 {
            regs: [0u8; 16],
            index: 0,
            pc: PROGRAM_START,
            stack: [0u16; STACK_DEPTH],
            sp: 0,
            delay_timer: 0,
            sound_timer: 0,
            memory,
            display: Framebuffer::new(),
            keypad: Keypad::new(),
            state: ExecState::Running,
            quirks: self.quirks,
            rng,
        })
    }
}

impl Chip8 {
    /// Executes one instruction.
    ///
    /// The word at PC is fetched and PC advanced by two before the instruction
    /// runs. While suspended on FX0A nothing is fetched and the call returns
    /// `StepState::AwaitingKey`. On error the instruction has had no effect
    /// apart from the PC advance.
    pub fn step(&mut self) -> Result<StepState, Chip8Error> {
        if let ExecState::AwaitingKey { .. } = self.state {
            return Ok(StepState::AwaitingKey);
        }

        let address = self.pc;
        let word = self.read_u16_be(address as usize)?;
        self.pc = self.pc.wrapping_add(2);

        let inst = Instruction::decode(word).ok_or(Chip8Error::UnknownOpcode {
            opcode: word,
            address,
        })?;
        trace!("0x{:03X}: {:04X} {}", address, word, inst);

        self.execute(inst, address)?;
        Ok(self.step_state())
    }

    /// Counts the delay and sound timers down by one, stopping at zero.
    pub fn tick(&mut self) {
        if self.delay_timer > 0 {
            self.delay_timer -= 1;
        }

        if self.sound_timer > 0 {
            self.sound_timer -= 1;
        }
    }

    /// Reports a key press. A press edge completes a pending FX0A.
    pub fn key_down(&mut self, key: u8) -> Result<(), Chip8Error> {
        let edge = self.keypad.press(key)?;

        if let (true, ExecState::AwaitingKey { register }) = (edge, self.state) {
            debug!("Key 0x{:X} stored in V{:X}, resuming", key, register);
            self.regs[register as usize] = key;
            self.state = ExecState::Running;
        }

        Ok(())
    }

    pub fn key_up(&mut self, key: u8) -> Result<(), Chip8Error> {
        self.keypad.release(key)
    }

    /// Drops every held key without completing a pending FX0A.
    pub fn release_keys(&mut self) {
        self.keypad.release_all();
    }

    pub fn handle_key(&mut self, event: KeyEvent) -> Result<(), Chip8Error> {
        match event {
            KeyEvent::Down(key) => self.key_down(key),
            KeyEvent::Up(key) => self.key_up(key),
        }
    }

    pub fn step_state(&self) -> StepState {
        match self.state {
            ExecState::Running => StepState::Running,
            ExecState::AwaitingKey { .. } => StepState::AwaitingKey,
        }
    }

    pub fn display(&self) -> &Framebuffer {
        &self.display
    }

    /// Whether the framebuffer changed since the last call.
    pub fn take_dirty(&mut self) -> bool {
        self.display.take_dirty()
    }

    pub fn keypad(&self) -> &Keypad {
        &self.keypad
    }

    pub fn pc(&self) -> u16 {
        self.pc
    }

    pub fn index(&self) -> u16 {
        self.index
    }

    pub fn registers(&self) -> &[u8; 16] {
        &self.regs
    }

    /// Return addresses, oldest first.
    pub fn stack(&self) -> &[u16] {
        &self.stack[..self.sp as usize]
    }

    pub fn delay_timer(&self) -> u8 {
        self.delay_timer
    }

    pub fn sound_timer(&self) -> u8 {
        self.sound_timer
    }

    /// The host should sound a tone while this holds.
    pub fn sound_active(&self) -> bool {
        self.sound_timer > 0
    }

    pub fn memory(&self) -> &[u8] {
        &self.memory[..]
    }

    pub fn quirks(&self) -> Quirks {
        self.quirks
    }

    fn execute(&mut self, inst: Instruction, address: u16) -> Result<(), Chip8Error> {
        use Instruction::*;

        match inst {
            Clear => self.display.clear(),
            Return => {
                self.pc = self.pop(address)?;
            }
            Jump { addr } => self.pc = addr,
            Call { addr } => {
                self.push(self.pc, address)?;
                self.pc = addr;
            }
            SkipEqImm { x, nn } => self.skip_if(self.reg(x) == nn),
            SkipNeqImm { x, nn } => self.skip_if(self.reg(x) != nn),
            SkipEqReg { x, y } => self.skip_if(self.reg(x) == self.reg(y)),
            SkipNeqReg { x, y } => self.skip_if(self.reg(x) != self.reg(y)),
            SetImm { x, nn } => self.set_reg(x, nn),
            AddImm { x, nn } => self.set_reg(x, self.reg(x).wrapping_add(nn)),
            Move { x, y } => self.set_reg(x, self.reg(y)),
            Or { x, y } => self.set_reg(x, self.reg(x) | self.reg(y)),
            And { x, y } => self.set_reg(x, self.reg(x) & self.reg(y)),
            Xor { x, y } => self.set_reg(x, self.reg(x) ^ self.reg(y)),
            AddReg { x, y } => {
                let (res, carry) = self.reg(x).overflowing_add(self.reg(y));
                self.set_reg_with_flag(x, res, carry);
            }
            Sub { x, y } => {
                let (res, borrow) = self.reg(x).overflowing_sub(self.reg(y));
                self.set_reg_with_flag(x, res, !borrow);
            }
            SubReverse { x, y } => {
                let (res, borrow) = self.reg(y).overflowing_sub(self.reg(x));
                self.set_reg_with_flag(x, res, !borrow);
            }
            ShiftRight { x, y } => {
                let src = self.shift_source(x, y);
                self.set_reg_with_flag(x, src >> 1, src & 0x01 != 0);
            }
            ShiftLeft { x, y } => {
                let src = self.shift_source(x, y);
                self.set_reg_with_flag(x, src << 1, src & 0x80 != 0);
            }
            SetIndex { addr } => self.index = addr,
            JumpOffset { addr } => {
                let offset = if self.quirks.contains(Quirks::JUMP_WITH_VX) {
                    self.reg((addr >> 8) as u8)
                } else {
                    self.reg(0x0)
                };
                self.pc = addr + offset as u16;
            }
            Random { x, nn } => {
                let n = self.rng.next_u32() as u8;
                self.set_reg(x, n & nn);
            }
            Draw { x, y, n } => {
                // Copy the sprite out so memory and display borrows don't overlap
                let mut sprite = [0u8; 15];
                let rows = n as usize;
                sprite[..rows].copy_from_slice(self.read_range(self.index as usize, rows)?);

                let (vx, vy) = (self.reg(x), self.reg(y));
                let wrap = self.quirks.contains(Quirks::WRAP_SPRITES);
                let collision = self.display.draw_sprite(vx, vy, &sprite[..rows], wrap);
                self.regs[FLAG] = collision as u8;
            }
            SkipKey { x } => self.skip_if(self.keypad.is_held(self.reg(x))),
            SkipNotKey { x } => self.skip_if(!self.keypad.is_held(self.reg(x))),
            GetDelay { x } => self.set_reg(x, self.delay_timer),
            WaitKey { x } => {
                debug!("V{:X} waiting for key press", x);
                self.state = ExecState::AwaitingKey { register: x };
            }
            SetDelay { x } => self.delay_timer = self.reg(x),
            SetSound { x } => self.sound_timer = self.reg(x),
            AddIndex { x } => self.index = self.index.wrapping_add(self.reg(x) as u16),
            FontChar { x } => {
                self.index = FONT_START + (self.reg(x) & 0x0F) as u16 * FONT_GLYPH_SIZE;
            }
            Bcd { x } => {
                let value = self.reg(x);
                let digits = [value / 100, (value / 10) % 10, value % 10];
                self.write_range(self.index as usize, &digits)?;
            }
            Store { x } => {
                let count = x as usize + 1;
                let regs = self.regs;
                self.write_range(self.index as usize, &regs[..count])?;

                if self.quirks.contains(Quirks::INCREMENT_INDEX) {
                    self.index = self.index.wrapping_add(count as u16);
                }
            }
            Load { x } => {
                let count = x as usize + 1;
                let mut regs = [0u8; 16];
                regs[..count].copy_from_slice(self.read_range(self.index as usize, count)?);
                self.regs[..count].copy_from_slice(&regs[..count]);

                if self.quirks.contains(Quirks::INCREMENT_INDEX) {
                    self.index = self.index.wrapping_add(count as u16);
                }
            }
        }

        Ok(())
    }

    fn reg(&self, x: u8) -> u8 {
        self.regs[(x & 0x0F) as usize]
    }

    fn set_reg(&mut self, x: u8, value: u8) {
        self.regs[(x & 0x0F) as usize] = value;
    }

    /// VF is written after VX, so the flag wins when X is F.
    fn set_reg_with_flag(&mut self, x: u8, value: u8, flag: bool) {
        self.set_reg(x, value);
        self.regs[FLAG] = flag as u8;
    }

    fn shift_source(&self, x: u8, y: u8) -> u8 {
        if self.quirks.contains(Quirks::SHIFT_IN_PLACE) {
            self.reg(x)
        } else {
            self.reg(y)
        }
    }

    fn skip_if(&mut self, cond: bool) {
        if cond {
            self.pc = self.pc.wrapping_add(2);
        }
    }

    fn push(&mut self, ret: u16, address: u16) -> Result<(), Chip8Error> {
        let slot = self
            .stack
            .get_mut(self.sp as usize)
            .ok_or(Chip8Error::StackOverflow { address })?;
        *slot = ret;
        self.sp += 1;
        Ok(())
    }

    fn pop(&mut self, address: u16) -> Result<u16, Chip8Error> {
        if self.sp == 0 {
            return Err(Chip8Error::StackUnderflow { address });
        }
        self.sp -= 1;
        Ok(self.stack[self.sp as usize])
    }

    fn read_u16_be(&self, addr: usize) -> Result<u16, Chip8Error> {
        let bytes = self.read_range(addr, 2)?;
        Ok(u16::from_be_bytes([bytes[0], bytes[1]]))
    }

    fn read_range(&self, addr: usize, len: usize) -> Result<&[u8], Chip8Error> {
        let end = addr + len;
        if end > MEMORY_SIZE {
            return Err(Chip8Error::MemoryOutOfBounds {
                address: addr.max(MEMORY_SIZE),
            });
        }
        Ok(&self.memory[addr..end])
    }

    /// Validates the whole range before writing any byte.
    fn write_range(&mut self, addr: usize, data: &[u8]) -> Result<(), Chip8Error> {
        let end = addr + data.len();
        if addr < PROGRAM_START as usize {
            return Err(Chip8Error::ProtectedWrite { address: addr });
        }
        if end > MEMORY_SIZE {
            return Err(Chip8Error::MemoryOutOfBounds {
                address: addr.max(MEMORY_SIZE),
            });
        }
        self.memory[addr..end].copy_from_slice(data);
        Ok(())
    }
}
