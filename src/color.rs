// Simple color struct, created from an unsigned 32 representing RRGGBBAA.
// Palettes are fixed per theme, particles pick one entry at spawn time.

use crate::config::Theme;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const fn from_u32(num: u32) -> Color {
        let r = (num >> 24) as u8;
        let g = (num >> 16) as u8;
        let b = (num >> 8) as u8;
        let a = num as u8;

        Color { r, g, b, a }
    }

    // Mix two colors half and half, used for connection lines between
    // particles of different palette entries
    pub fn tint(&mut self, tint: Color) {
        let new_r = ((self.r as f64 + tint.r as f64) / 2.0) as u8;
        let new_g = ((self.g as f64 + tint.g as f64) / 2.0) as u8;
        let new_b = ((self.b as f64 + tint.b as f64) / 2.0) as u8;
        let new_a = ((self.a as f64 + tint.a as f64) / 2.0) as u8;

        self.r = new_r;
        self.g = new_g;
        self.b = new_b;
        self.a = new_a;
    }

    pub fn mixed(mut self, other: Color) -> Color {
        self.tint(other);
        self
    }

    /// CSS `rgba()` string with the given opacity multiplied into the alpha channel.
    pub fn to_css(&self, opacity: f64) -> String {
        let alpha = (self.a as f64 / 255.0) * opacity.clamp(0.0, 1.0);
        format!("rgba({}, {}, {}, {:.3})", self.r, self.g, self.b, alpha)
    }
}

pub const DARK_PALETTE: [Color; 4] = [
    Color::from_u32(0x64ffdaff),
    Color::from_u32(0x7c3aedff),
    Color::from_u32(0x3b82f6ff),
    Color::from_u32(0xec4899ff),
];

pub const LIGHT_PALETTE: [Color; 4] = [
    Color::from_u32(0x0d9488ff),
    Color::from_u32(0x6d28d9ff),
    Color::from_u32(0x2563ebff),
    Color::from_u32(0xdb2777ff),
];

pub fn palette(theme: Theme) -> &'static [Color] {
    match theme {
        Theme::Dark => &DARK_PALETTE,
        Theme::Light => &LIGHT_PALETTE,
    }
}

pub fn line_color(theme: Theme) -> Color {
    match theme {
        Theme::Dark => Color::from_u32(0x64ffdaff),
        Theme::Light => Color::from_u32(0x334155ff),
    }
}

pub fn cursor_color(theme: Theme) -> Color {
    match theme {
        Theme::Dark => Color::from_u32(0xe2e8f0ff),
        Theme::Light => Color::from_u32(0x0f172aff),
    }
}
