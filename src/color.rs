//! RGBA color type and matplotlib-style color specs.

use crate::error::{PlotError, Result};

/// RGBA color with 8-bit components.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

/// The "tab10" cycle, in order.
const TAB10: [(&str, Color); 10] = [
    ("blue", Color::rgb(0x1f, 0x77, 0xb4)),
    ("orange", Color::rgb(0xff, 0x7f, 0x0e)),
    ("green", Color::rgb(0x2c, 0xa0, 0x2c)),
    ("red", Color::rgb(0xd6, 0x27, 0x28)),
    ("purple", Color::rgb(0x94, 0x67, 0xbd)),
    ("brown", Color::rgb(0x8c, 0x56, 0x4b)),
    ("pink", Color::rgb(0xe3, 0x77, 0xc2)),
    ("gray", Color::rgb(0x7f, 0x7f, 0x7f)),
    ("olive", Color::rgb(0xbc, 0xbd, 0x22)),
    ("cyan", Color::rgb(0x17, 0xbe, 0xcf)),
];

const NAMED: &[(&str, Color)] = &[
    ("black", Color::BLACK),
    ("white", Color::WHITE),
    ("red", Color::rgb(255, 0, 0)),
    ("green", Color::rgb(0, 128, 0)),
    ("blue", Color::rgb(0, 0, 255)),
    ("cyan", Color::rgb(0, 255, 255)),
    ("magenta", Color::rgb(255, 0, 255)),
    ("yellow", Color::rgb(255, 255, 0)),
    ("orange", Color::rgb(255, 165, 0)),
    ("purple", Color::rgb(128, 0, 128)),
    ("brown", Color::rgb(165, 42, 42)),
    ("pink", Color::rgb(255, 192, 203)),
    ("gray", Color::rgb(128, 128, 128)),
    ("grey", Color::rgb(128, 128, 128)),
    ("lightgray", Color::rgb(211, 211, 211)),
    ("lightgrey", Color::rgb(211, 211, 211)),
    ("darkgray", Color::rgb(169, 169, 169)),
    ("darkgrey", Color::rgb(169, 169, 169)),
    ("olive", Color::rgb(128, 128, 0)),
    ("navy", Color::rgb(0, 0, 128)),
    ("teal", Color::rgb(0, 128, 128)),
    ("maroon", Color::rgb(128, 0, 0)),
    ("lime", Color::rgb(0, 255, 0)),
    ("gold", Color::rgb(255, 215, 0)),
    ("violet", Color::rgb(238, 130, 238)),
    ("indigo", Color::rgb(75, 0, 130)),
    ("darkgreen", Color::rgb(0, 100, 0)),
    ("darkblue", Color::rgb(0, 0, 139)),
    ("darkred", Color::rgb(139, 0, 0)),
    ("skyblue", Color::rgb(135, 206, 235)),
    ("steelblue", Color::rgb(70, 130, 180)),
    ("crimson", Color::rgb(220, 20, 60)),
    ("coral", Color::rgb(255, 127, 80)),
    ("salmon", Color::rgb(250, 128, 114)),
    ("tomato", Color::rgb(255, 99, 71)),
    ("turquoise", Color::rgb(64, 224, 208)),
];

impl Color {
    /// Create a new color with explicit RGBA components.
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Create an opaque color (alpha = 255).
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const WHITE: Color = Color::rgb(255, 255, 255);
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const LIGHT_GRAY: Color = Color::rgb(0xcc, 0xcc, 0xcc);

    /// Parse a matplotlib-style color spec.
    ///
    /// Accepts single-letter codes (`"r"`), cycle references (`"C3"`),
    /// `tab:` names, common color names and `#rgb` / `#rrggbb` / `#rrggbbaa`.
    pub fn parse(spec: &str) -> Result<Self> {
        let trimmed = spec.trim();
        let invalid = || PlotError::InvalidColor(spec.to_string());

        if let Some(hex) = trimmed.strip_prefix('#') {
            return parse_hex(hex).ok_or_else(invalid);
        }

        if let Some(color) = short_code(trimmed) {
            return Ok(color);
        }

        if let Some(index) = trimmed.strip_prefix('C').and_then(|n| n.parse::<usize>().ok()) {
            return Ok(ColorCycle::nth(index));
        }

        let lower = trimmed.to_ascii_lowercase();
        if let Some(name) = lower.strip_prefix("tab:") {
            return TAB10
                .iter()
                .find(|(n, _)| *n == name)
                .map(|(_, c)| *c)
                .ok_or_else(invalid);
        }

        NAMED
            .iter()
            .find(|(n, _)| *n == lower)
            .map(|(_, c)| *c)
            .ok_or_else(invalid)
    }

    /// Alpha-blend `self` over `below`.
    pub fn over(self, below: Color) -> Color {
        if self.a == 255 {
            return self;
        }
        let alpha = self.a as f32 / 255.0;
        let mix = |top: u8, bottom: u8| {
            (top as f32 * alpha + bottom as f32 * (1.0 - alpha)).round() as u8
        };
        Color::new(
            mix(self.r, below.r),
            mix(self.g, below.g),
            mix(self.b, below.b),
            255,
        )
    }
}

fn short_code(spec: &str) -> Option<Color> {
    let color = match spec {
        "b" => Color::rgb(0, 0, 255),
        "g" => Color::rgb(0, 128, 0),
        "r" => Color::rgb(255, 0, 0),
        "c" => Color::rgb(0, 191, 191),
        "m" => Color::rgb(191, 0, 191),
        "y" => Color::rgb(191, 191, 0),
        "k" => Color::BLACK,
        "w" => Color::WHITE,
        _ => return None,
    };
    Some(color)
}

fn parse_hex(hex: &str) -> Option<Color> {
    if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    let byte = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
    let nibble = |i: usize| u8::from_str_radix(&hex[i..i + 1], 16).ok().map(|v| v * 17);

    match hex.len() {
        3 => Some(Color::rgb(nibble(0)?, nibble(1)?, nibble(2)?)),
        6 => Some(Color::rgb(byte(0)?, byte(2)?, byte(4)?)),
        8 => Some(Color::new(byte(0)?, byte(2)?, byte(4)?, byte(6)?)),
        _ => None,
    }
}

/// Default colors handed out to unstyled points and curves.
#[derive(Debug, Default)]
pub struct ColorCycle {
    next: usize,
}

impl ColorCycle {
    pub fn nth(index: usize) -> Color {
        TAB10[index % TAB10.len()].1
    }

    pub fn next_color(&mut self) -> Color {
        let color = Self::nth(self.next);
        self.next += 1;
        color
    }
}
