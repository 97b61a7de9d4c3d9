use bitflags::bitflags;

bitflags! {
    /// Behavioral switches for instructions historical interpreters disagree on.
    ///
    /// The empty set is the default machine: shifts read VY, BNNN adds V0,
    /// FX55/FX65 leave I untouched and sprites clip at the screen edges.
    #[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
    pub struct Quirks: u8 {
        /// 8XY6/8XYE shift VX in place, VY is ignored
        const SHIFT_IN_PLACE  = 0b0001;
        /// BXNN jumps to XNN plus VX instead of NNN plus V0
        const JUMP_WITH_VX    = 0b0010;
        /// FX55/FX65 leave I pointing past the last register transferred
        const INCREMENT_INDEX = 0b0100;
        /// Sprite pixels past the right or bottom edge wrap around
        const WRAP_SPRITES    = 0b1000;
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum Chip8Mode {
    #[default]
    CosmacVip,
    Chip48,
    SuperChip,
}

impl Chip8Mode {
    pub fn quirks(self) -> Quirks {
        match self {
            Chip8Mode::CosmacVip => Quirks::empty(),
            Chip8Mode::Chip48 | Chip8Mode::SuperChip => {
                Quirks::SHIFT_IN_PLACE | Quirks::JUMP_WITH_VX
            }
        }
    }
}
