use thiserror::Error;

/// Faults raised while building or stepping the machine.
///
/// Every fault is local to the `step` call that produced it. The host decides
/// whether to halt or to log and carry on.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum Chip8Error {
    #[error("Unknown opcode {opcode:#06X} at {address:#05X}")]
    UnknownOpcode { opcode: u16, address: u16 },

    #[error("Stack overflow: call at {address:#05X} exceeds 16 nested subroutines")]
    StackOverflow { address: u16 },

    #[error("Stack underflow: return at {address:#05X} with empty call stack")]
    StackUnderflow { address: u16 },

    #[error("Memory access out of bounds at address {address:#06X}")]
    MemoryOutOfBounds { address: usize },

    #[error("Write into reserved interpreter memory at address {address:#05X}")]
    ProtectedWrite { address: usize },

    #[error("ROM is too large ({size} bytes), max size is {max} bytes")]
    RomTooLarge { size: usize, max: usize },

    #[error("A ROM must be provided")]
    MissingRom,

    #[error("Font sprite must be 80 bytes, got {size}")]
    InvalidFont { size: usize },

    #[error("Invalid key 0x{0:X}, keys range from 0x0 to 0xF")]
    InvalidKey(u8),
}

impl Chip8Error {
    /// Faults a permissive host may log and step past.
    ///
    /// Only unknown opcodes qualify: the program counter has already moved on,
    /// so skipping them leaves the machine consistent.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Chip8Error::UnknownOpcode { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        let err = Chip8Error::UnknownOpcode { opcode: 0x5AB1, address: 0x200 };
        assert_eq!(err.to_string(), "Unknown opcode 0x5AB1 at 0x200");

        let err = Chip8Error::MemoryOutOfBounds { address: 0x1000 };
        assert_eq!(err.to_string(), "Memory access out of bounds at address 0x1000");
    }

    #[test]
    fn test_recoverable() {
        assert!(Chip8Error::UnknownOpcode { opcode: 0xFFFF, address: 0x200 }.is_recoverable());
        assert!(!Chip8Error::StackUnderflow { address: 0x200 }.is_recoverable());
        assert!(!Chip8Error::MemoryOutOfBounds { address: 0x1000 }.is_recoverable());
    }
}
