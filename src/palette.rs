use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::ProgramError;

/// RGBA color representation
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn opaque(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, 255)
    }

    pub fn is_opaque(self) -> bool {
        self.a == 255
    }

    /// Scales the alpha channel by `opacity` (clamped to `0.0..=1.0`).
    pub fn with_opacity(self, opacity: f32) -> Self {
        let opacity = if opacity.is_nan() {
            1.0
        } else {
            opacity.clamp(0.0, 1.0)
        };
        let alpha = (f32::from(self.a) * opacity).round() as u8;
        Self { a: alpha, ..self }
    }

    /// Composites `self` over an opaque `bottom` color.
    pub fn over(self, bottom: Rgba) -> Rgba {
        if self.a == 255 {
            return self;
        }
        let alpha = f32::from(self.a) / 255.0;
        let mix = |top: u8, under: u8| -> u8 {
            (f32::from(top) * alpha + f32::from(under) * (1.0 - alpha)).round() as u8
        };
        Rgba::opaque(
            mix(self.r, bottom.r),
            mix(self.g, bottom.g),
            mix(self.b, bottom.b),
        )
    }

    /// Parses `#rgb`, `#rgba`, `#rrggbb`, `#rrggbbaa` or a basic color name.
    pub fn parse(input: &str) -> Result<Self, ProgramError> {
        let trimmed = input.trim();
        if let Some(hex) = trimmed.strip_prefix('#') {
            return parse_hex(hex)
                .ok_or_else(|| ProgramError::config(format!("invalid hex color `{input}`")));
        }
        named_color(&trimmed.to_ascii_lowercase())
            .ok_or_else(|| ProgramError::config(format!("unknown color `{input}`")))
    }
}

impl FromStr for Rgba {
    type Err = ProgramError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Rgba {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)?;
        if self.a != 255 {
            write!(f, "{:02x}", self.a)?;
        }
        Ok(())
    }
}

impl Serialize for Rgba {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Rgba {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Rgba::parse(&raw).map_err(serde::de::Error::custom)
    }
}

fn parse_hex(hex: &str) -> Option<Rgba> {
    if !hex.is_ascii() {
        return None;
    }
    let nibble = |index: usize| u8::from_str_radix(&hex[index..index + 1], 16).ok();
    let byte = |index: usize| u8::from_str_radix(&hex[index..index + 2], 16).ok();

    match hex.len() {
        3 | 4 => {
            let expand = |value: u8| value * 17;
            let alpha = if hex.len() == 4 { expand(nibble(3)?) } else { 255 };
            Some(Rgba::new(
                expand(nibble(0)?),
                expand(nibble(1)?),
                expand(nibble(2)?),
                alpha,
            ))
        }
        6 | 8 => {
            let alpha = if hex.len() == 8 { byte(6)? } else { 255 };
            Some(Rgba::new(byte(0)?, byte(2)?, byte(4)?, alpha))
        }
        _ => None,
    }
}

fn named_color(name: &str) -> Option<Rgba> {
    let palette = Palette::default();
    let color = match name {
        "transparent" => Rgba::new(0, 0, 0, 0),
        "black" => palette.colors[0],
        "red" => palette.colors[1],
        "green" => palette.colors[2],
        "yellow" => palette.colors[3],
        "blue" => palette.colors[4],
        "magenta" | "fuchsia" => palette.colors[5],
        "cyan" | "aqua" => palette.colors[6],
        "white" => palette.colors[7],
        "gray" | "grey" => palette.colors[8],
        "silver" => Rgba::opaque(192, 192, 192),
        _ => return None,
    };
    Some(color)
}

/// Terminal color palette containing the 16 ANSI colors and default fg/bg
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Palette {
    /// ANSI colors 0-15
    pub colors: [Rgba; 16],
    /// Default foreground color
    pub foreground: Rgba,
    /// Default background color
    pub background: Rgba,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            // Standard xterm colors
            colors: [
                Rgba::opaque(0, 0, 0),       // 0: Black
                Rgba::opaque(205, 0, 0),     // 1: Red
                Rgba::opaque(0, 205, 0),     // 2: Green
                Rgba::opaque(205, 205, 0),   // 3: Yellow
                Rgba::opaque(0, 0, 238),     // 4: Blue
                Rgba::opaque(205, 0, 205),   // 5: Magenta
                Rgba::opaque(0, 205, 205),   // 6: Cyan
                Rgba::opaque(229, 229, 229), // 7: White
                Rgba::opaque(127, 127, 127), // 8: Bright Black (Gray)
                Rgba::opaque(255, 0, 0),     // 9: Bright Red
                Rgba::opaque(0, 255, 0),     // 10: Bright Green
                Rgba::opaque(255, 255, 0),   // 11: Bright Yellow
                Rgba::opaque(92, 92, 255),   // 12: Bright Blue
                Rgba::opaque(255, 0, 255),   // 13: Bright Magenta
                Rgba::opaque(0, 255, 255),   // 14: Bright Cyan
                Rgba::opaque(255, 255, 255), // 15: Bright White
            ],
            foreground: Rgba::opaque(229, 229, 229),
            background: Rgba::opaque(0, 0, 0),
        }
    }
}
