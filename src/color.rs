//! Color parsing and the foreground/background pair
//!
//! Colors arrive as `#RRGGBB` strings, get widened to the 16-bit channels
//! the protocol wants, and come back from the server as opaque pixel values.
//! Draws that render text always work from a [`ColorScheme`], a
//! {background, foreground} pair whose roles can be swapped for selection
//! highlighting.

use std::fmt;

/// An 8-bit-per-channel RGB triple parsed from a `#RRGGBB` string
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    /// Parse a color string: one marker byte, then exactly six hex digits.
    ///
    /// Anything shorter or non-hex yields `None`; there is no partial
    /// parse. Bytes past the sixth digit are ignored.
    pub fn parse(spec: &str) -> Option<Rgb> {
        let hex = spec.as_bytes().get(1..7)?;
        let channel = |i: usize| {
            let hi = (hex[i] as char).to_digit(16)?;
            let lo = (hex[i + 1] as char).to_digit(16)?;
            Some((hi * 16 + lo) as u8)
        };
        Some(Rgb {
            r: channel(0)?,
            g: channel(2)?,
            b: channel(4)?,
        })
    }

    /// Widen each channel to the 16-bit range the protocol expects,
    /// replicating the byte so 0xFF maps to 0xFFFF
    pub fn widen(self) -> (u16, u16, u16) {
        (
            self.r as u16 * 0x101,
            self.g as u16 * 0x101,
            self.b as u16 * 0x101,
        )
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// Background/foreground pixel pair for text cells
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColorScheme {
    pub bg: u32,
    pub fg: u32,
}

impl ColorScheme {
    pub fn new(bg: u32, fg: u32) -> Self {
        ColorScheme { bg, fg }
    }

    /// Effective foreground: the background pixel when inverted
    pub fn fg(&self, invert: bool) -> u32 {
        if invert {
            self.bg
        } else {
            self.fg
        }
    }

    /// Effective background: the foreground pixel when inverted
    pub fn bg(&self, invert: bool) -> u32 {
        if invert {
            self.fg
        } else {
            self.bg
        }
    }
}
