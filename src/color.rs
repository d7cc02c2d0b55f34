// src/color.rs

//! Defines color-related types (`NamedColor`, `Color`) and their conversion
//! to the RGBA8 pixels stored in a `Texture`.

use serde::{Deserialize, Serialize};

/// The fixed set of named colors the drawing commands refer to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NamedColor {
    Black,
    White,
    Red,
    Green,
    Blue,
}

impl NamedColor {
    /// Returns the `Color::Rgb` representation of this named color.
    pub fn to_rgb_color(&self) -> Color {
        match self {
            NamedColor::Black => Color::Rgb(0, 0, 0),
            NamedColor::White => Color::Rgb(255, 255, 255),
            NamedColor::Red => Color::Rgb(255, 0, 0),
            // Half-intensity green, as used for the `green` background.
            NamedColor::Green => Color::Rgb(0, 128, 0),
            NamedColor::Blue => Color::Rgb(0, 0, 255),
        }
    }
}

/// A color value that can be written into a texture.
///
/// `Rgb` colors are fully opaque. `Rgba` carries an explicit alpha, which is
/// stored as-is (fills replace pixels, they never blend).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Color {
    Named(NamedColor),
    Rgb(u8, u8, u8),
    Rgba(u8, u8, u8, u8),
}

impl Default for Color {
    fn default() -> Self {
        Color::Named(NamedColor::Black)
    }
}

impl From<NamedColor> for Color {
    fn from(named: NamedColor) -> Self {
        Color::Named(named)
    }
}

impl Color {
    /// Resolves this color to the four bytes written per pixel.
    pub fn to_rgba(self) -> [u8; 4] {
        match self {
            Color::Named(named) => named.to_rgb_color().to_rgba(),
            Color::Rgb(r, g, b) => [r, g, b, 0xFF],
            Color::Rgba(r, g, b, a) => [r, g, b, a],
        }
    }
}
