use std::str::FromStr;

use bytemuck::{Pod, Zeroable};
use thiserror::Error;

pub const DEFAULT_BACKGROUND_COLOR: Color = Color::new(0, 0, 0);
pub const DEFAULT_FOREGROUND_COLOR: Color = Color::new(255, 255, 255);

/// One 32-bit pixel, laid out to match an RGBX8888 texture on little-endian hosts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Pod, Zeroable)]
#[repr(C, packed)]
pub struct Color {
    padding: u8,
    pub b: u8,
    pub g: u8,
    pub r: u8,
}

impl Color {
    pub const fn new(r: u8, g: u8, b: u8) -> Color {
        Color { r, g, b, padding: 0 }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("failed to parse hex color {0:?}, expected RRGGBB or 0xRRGGBB")]
pub struct ColorParseError(String);

impl FromStr for Color {
    type Err = ColorParseError;

    fn from_str(input: &str) -> Result<Color, ColorParseError> {
        let err = || ColorParseError(input.to_string());

        let s = input.strip_prefix("0x").unwrap_or(input);
        if s.len() != 6 || s.chars().any(|c| !c.is_ascii_hexdigit()) {
            return Err(err());
        }

        let channel = |range: std::ops::Range<usize>| {
            u8::from_str_radix(&s[range], 16).map_err(|_| err())
        };

        Ok(Color::new(channel(0..2)?, channel(2..4)?, channel(4..6)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse() {
        assert_eq!("0xAABBFF".parse::<Color>(), Ok(Color::new(0xAA, 0xBB, 0xFF)));
        assert_eq!("102030".parse::<Color>(), Ok(Color::new(0x10, 0x20, 0x30)));
    }

    #[test]
    fn test_parse_invalid() {
        assert!("0xAABB".parse::<Color>().is_err());
        assert!("GG0000".parse::<Color>().is_err());
        assert!("0x+1+2+3".parse::<Color>().is_err());
    }

    #[test]
    fn test_byte_layout() {
        let pixels = [Color::new(0x11, 0x22, 0x33)];
        let bytes: &[u8] = bytemuck::cast_slice(&pixels[..]);
        assert_eq!(bytes, &[0x00, 0x33, 0x22, 0x11]);
    }
}
