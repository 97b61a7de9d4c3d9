// Instruction decoding and the diagnostic text renderer.
//
// Decoding is pure: a 16-bit word maps to an `Instruction` variant carrying its
// operands, or to nothing when the bit pattern is not assigned. Execution lives
// in `chip8.rs` and only ever sees decoded variants.

use std::fmt;

/// Text produced for words that do not decode.
pub const NOT_RECOGNIZED: &str = "Instruction not recognized";

/// A decoded instruction. `x`/`y` are register indices, `nn` an 8-bit
/// immediate, `n` a 4-bit immediate and `addr` a 12-bit immediate.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Instruction {
    /// 00E0
    Clear,
    /// 00EE
    Return,
    /// 1NNN
    Jump { addr: u16 },
    /// 2NNN
    Call { addr: u16 },
    /// 3XNN
    SkipEqImm { x: u8, nn: u8 },
    /// 4XNN
    SkipNeqImm { x: u8, nn: u8 },
    /// 5XY0
    SkipEqReg { x: u8, y: u8 },
    /// 6XNN
    SetImm { x: u8, nn: u8 },
    /// 7XNN
    AddImm { x: u8, nn: u8 },
    /// 8XY0
    Move { x: u8, y: u8 },
    /// 8XY1
    Or { x: u8, y: u8 },
    /// 8XY2
    And { x: u8, y: u8 },
    /// 8XY3
    Xor { x: u8, y: u8 },
    /// 8XY4
    AddReg { x: u8, y: u8 },
    /// 8XY5
    Sub { x: u8, y: u8 },
    /// 8XY6
    ShiftRight { x: u8, y: u8 },
    /// 8XY7
    SubReverse { x: u8, y: u8 },
    /// 8XYE
    ShiftLeft { x: u8, y: u8 },
    /// 9XY0
    SkipNeqReg { x: u8, y: u8 },
    /// ANNN
    SetIndex { addr: u16 },
    /// BNNN
    JumpOffset { addr: u16 },
    /// CXNN
    Random { x: u8, nn: u8 },
    /// DXYN
    Draw { x: u8, y: u8, n: u8 },
    /// EX9E
    SkipKey { x: u8 },
    /// EXA1
    SkipNotKey { x: u8 },
    /// FX07
    GetDelay { x: u8 },
    /// FX0A
    WaitKey { x: u8 },
    /// FX15
    SetDelay { x: u8 },
    /// FX18
    SetSound { x: u8 },
    /// FX1E
    AddIndex { x: u8 },
    /// FX29
    FontChar { x: u8 },
    /// FX33
    Bcd { x: u8 },
    /// FX55
    Store { x: u8 },
    /// FX65
    Load { x: u8 },
}

impl Instruction {
    /// Decodes a big-endian instruction word.
    ///
    /// Returns `None` for unassigned patterns, including 5XYN/9XYN with a
    /// non-zero low nibble.
    pub fn decode(word: u16) -> Option<Instruction> {
        // Instruction split into nibbles(4bits) 1-4
        let n1 = ((word & 0xF000) >> 12) as u8;
        let x = ((word & 0x0F00) >> 8) as u8;
        let y = ((word & 0x00F0) >> 4) as u8;
        let n = (word & 0x000F) as u8;

        let nn = (word & 0x00FF) as u8;
        let addr = word & 0x0FFF;

        use Instruction::*;
        let inst = match (n1, x, y, n) {
            (0x0, 0x0, 0xE, 0x0) => Clear,
            (0x0, 0x0, 0xE, 0xE) => Return,
            (0x1, _, _, _) => Jump { addr },
            (0x2, _, _, _) => Call { addr },
            (0x3, _, _, _) => SkipEqImm { x, nn },
            (0x4, _, _, _) => SkipNeqImm { x, nn },
            (0x5, _, _, 0x0) => SkipEqReg { x, y },
            (0x6, _, _, _) => SetImm { x, nn },
            (0x7, _, _, _) => AddImm { x, nn },
            (0x8, _, _, 0x0) => Move { x, y },
            (0x8, _, _, 0x1) => Or { x, y },
            (0x8, _, _, 0x2) => And { x, y },
            (0x8, _, _, 0x3) => Xor { x, y },
            (0x8, _, _, 0x4) => AddReg { x, y },
            (0x8, _, _, 0x5) => Sub { x, y },
            (0x8, _, _, 0x6) => ShiftRight { x, y },
            (0x8, _, _, 0x7) => SubReverse { x, y },
            (0x8, _, _, 0xE) => ShiftLeft { x, y },
            (0x9, _, _, 0x0) => SkipNeqReg { x, y },
            (0xA, _, _, _) => SetIndex { addr },
            (0xB, _, _, _) => JumpOffset { addr },
            (0xC, _, _, _) => Random { x, nn },
            (0xD, _, _, _) => Draw { x, y, n },
            (0xE, _, 0x9, 0xE) => SkipKey { x },
            (0xE, _, 0xA, 0x1) => SkipNotKey { x },
            (0xF, _, 0x0, 0x7) => GetDelay { x },
            (0xF, _, 0x0, 0xA) => WaitKey { x },
            (0xF, _, 0x1, 0x5) => SetDelay { x },
            (0xF, _, 0x1, 0x8) => SetSound { x },
            (0xF, _, 0x1, 0xE) => AddIndex { x },
            (0xF, _, 0x2, 0x9) => FontChar { x },
            (0xF, _, 0x3, 0x3) => Bcd { x },
            (0xF, _, 0x5, 0x5) => Store { x },
            (0xF, _, 0x6, 0x5) => Load { x },
            _ => return None,
        };

        Some(inst)
    }
}

/// Renders the mnemonic and operands, without the leading word.
impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use Instruction::*;
        match *self {
            Clear => write!(f, "CLS"),
            Return => write!(f, "RTS"),
            Jump { addr } => write!(f, "JUMP 0x{:04X}", addr),
            Call { addr } => write!(f, "CALL 0x{:04X}", addr),
            SkipEqImm { x, nn } => write!(f, "SKIP.EQ V{:X}, {:02X}", x, nn),
            SkipNeqImm { x, nn } => write!(f, "SKIP.NEQ V{:X}, {:02X}", x, nn),
            SkipEqReg { x, y } => write!(f, "SKIP.EQ V{:X}, V{:X}", x, y),
            SetImm { x, nn } => write!(f, "MVI V{:X}, {:02X}", x, nn),
            AddImm { x, nn } => write!(f, "ADD V{:X}, {:02X}", x, nn),
            Move { x, y } => write!(f, "MOV V{:X}, V{:X}", x, y),
            Or { x, y } => write!(f, "OR V{:X}, V{:X}", x, y),
            And { x, y } => write!(f, "AND V{:X}, V{:X}", x, y),
            Xor { x, y } => write!(f, "XOR V{:X}, V{:X}", x, y),
            AddReg { x, y } => write!(f, "ADD. V{:X}, V{:X}", x, y),
            Sub { x, y } => write!(f, "SUB. V{:X}, V{:X}", x, y),
            ShiftRight { x, y } => write!(f, "SHR. V{:X}, V{:X}", x, y),
            SubReverse { x, y } => write!(f, "SUBB. V{:X}, V{:X}", x, y),
            ShiftLeft { x, y } => write!(f, "SHL. V{:X}, V{:X}", x, y),
            SkipNeqReg { x, y } => write!(f, "SKIP.NEQ V{:X}, V{:X}", x, y),
            SetIndex { addr } => write!(f, "MVI I 0x{:04X}", addr),
            JumpOffset { addr } => write!(f, "JUMP 0x{:04X}(V0)", addr),
            Random { x, nn } => write!(f, "RAND V{:X} 0x{:04X}", x, nn),
            Draw { x, y, n } => write!(f, "SPRITE V{:X}, V{:X}, {:X}", x, y, n),
            SkipKey { x } => write!(f, "SKIP.KEY V{:X}", x),
            SkipNotKey { x } => write!(f, "SKIP.NKEY V{:X}", x),
            GetDelay { x } => write!(f, "MOV V{:X} DELAY", x),
            WaitKey { x } => write!(f, "WAITKEY V{:X}", x),
            SetDelay { x } => write!(f, "MOV DELAY V{:X}", x),
            SetSound { x } => write!(f, "MOV SOUND V{:X}", x),
            AddIndex { x } => write!(f, "ADD I V{:X}", x),
            FontChar { x } => write!(f, "SPRITECHAR I V{:X}", x),
            Bcd { x } => write!(f, "MOVBCD V{:X}", x),
            Store { x } => write!(f, "STORE (I), V0-V{:X}", x),
            Load { x } => write!(f, "LOAD V0-V{:X}, (I)", x),
        }
    }
}

/// Diagnostic text for any word: `"%04X <MNEMONIC> <operands>"`, or
/// [`NOT_RECOGNIZED`].
pub fn disassemble(word: u16) -> String {
    match Instruction::decode(word) {
        Some(inst) => format!("{:04X} {}", word, inst),
        None => NOT_RECOGNIZED.to_string(),
    }
}
