//! Brush and text styling shared between the shell and the sub-bars.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Error parsing a hex color string.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid hex color '{0}' (expected #RRGGBB)")]
pub struct ParseColorError(pub String);

/// An opaque RGB color written as `#RRGGBB`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct HexColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl HexColor {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Red, the default brush and text color.
    pub const RED: HexColor = HexColor::rgb(0xFF, 0x00, 0x00);
}

impl FromStr for HexColor {
    type Err = ParseColorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hex = s.trim();
        let digits = hex
            .strip_prefix('#')
            .filter(|d| d.len() == 6 && d.chars().all(|c| c.is_ascii_hexdigit()))
            .ok_or_else(|| ParseColorError(s.to_string()))?;
        let channel = |i: usize| {
            u8::from_str_radix(&digits[i..i + 2], 16).map_err(|_| ParseColorError(s.to_string()))
        };
        Ok(Self::rgb(channel(0)?, channel(2)?, channel(4)?))
    }
}

impl TryFrom<String> for HexColor {
    type Error = ParseColorError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<HexColor> for String {
    fn from(color: HexColor) -> Self {
        color.to_string()
    }
}

impl fmt::Display for HexColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

/// Positive brush size in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct BrushSize(u32);

impl BrushSize {
    pub const MIN: u32 = 1;
    pub const MAX: u32 = 64;

    /// Create a brush size, clamping into `MIN..=MAX`.
    pub fn new(px: u32) -> Self {
        Self(px.clamp(Self::MIN, Self::MAX))
    }

    pub fn get(self) -> u32 {
        self.0
    }
}

impl Default for BrushSize {
    fn default() -> Self {
        Self(5)
    }
}

/// Style applied to new freehand strokes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrushStyle {
    pub color: HexColor,
    pub size: BrushSize,
}

impl Default for BrushStyle {
    fn default() -> Self {
        Self {
            color: HexColor::RED,
            size: BrushSize::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex_color() {
        let color: HexColor = "#ff8000".parse().unwrap();
        assert_eq!(color, HexColor::rgb(255, 128, 0));
        assert_eq!(color.to_string(), "#FF8000");
    }

    #[test]
    fn test_parse_rejects_malformed() {
        assert!("ff8000".parse::<HexColor>().is_err());
        assert!("#ff80".parse::<HexColor>().is_err());
        assert!("#gg8000".parse::<HexColor>().is_err());
    }

    #[test]
    fn test_serde_as_string() {
        let json = serde_json::to_string(&HexColor::RED).unwrap();
        assert_eq!(json, "\"#FF0000\"");
        let back: HexColor = serde_json::from_str(&json).unwrap();
        assert_eq!(back, HexColor::RED);
        assert!(serde_json::from_str::<HexColor>("\"red\"").is_err());
    }

    #[test]
    fn test_brush_size_is_positive() {
        assert_eq!(BrushSize::new(0).get(), BrushSize::MIN);
        assert_eq!(BrushSize::new(1000).get(), BrushSize::MAX);
        assert_eq!(BrushStyle::default().size.get(), 5);
    }
}
