// src/painter/texture.rs
//! Texture - the software canvas every operation draws into.
//!
//! A texture is a fixed-size RGBA8 framebuffer stored row-major with 4 bytes
//! per pixel. Fills replace pixels, they never blend.

use crate::color::Color;

const BYTES_PER_PIXEL: usize = 4;

/// Dimensions of a texture in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Size {
    pub width: u32,
    pub height: u32,
}

impl Size {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }
}

/// A half-open pixel rectangle `[min, max)`.
///
/// Coordinates are signed and may lie outside the texture; drawing clips them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rect {
    pub min_x: i32,
    pub min_y: i32,
    pub max_x: i32,
    pub max_y: i32,
}

impl Rect {
    pub const fn new(min_x: i32, min_y: i32, max_x: i32, max_y: i32) -> Self {
        Self {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.min_x >= self.max_x || self.min_y >= self.max_y
    }

    /// Returns the overlap of two rectangles (possibly empty).
    pub fn intersect(&self, other: &Rect) -> Rect {
        Rect {
            min_x: self.min_x.max(other.min_x),
            min_y: self.min_y.max(other.min_y),
            max_x: self.max_x.min(other.max_x),
            max_y: self.max_y.min(other.max_y),
        }
    }
}

/// An owned RGBA8 framebuffer.
#[derive(Clone, PartialEq, Eq)]
pub struct Texture {
    size: Size,
    pixels: Box<[u8]>,
}

impl std::fmt::Debug for Texture {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Texture")
            .field("size", &self.size)
            .field("bytes", &self.pixels.len())
            .finish()
    }
}

impl Texture {
    /// Allocates a zero-filled (transparent black) texture.
    pub fn new(size: Size) -> Self {
        let pixels = vec![0u8; size.pixel_count() * BYTES_PER_PIXEL].into_boxed_slice();
        Self { size, pixels }
    }

    pub fn size(&self) -> Size {
        self.size
    }

    /// The full extent of the texture as a rectangle.
    pub fn bounds(&self) -> Rect {
        Rect::new(0, 0, self.size.width as i32, self.size.height as i32)
    }

    /// Fills `rect` with `color`, clipped to the texture bounds.
    pub fn fill(&mut self, rect: Rect, color: Color) {
        let clipped = rect.intersect(&self.bounds());
        if clipped.is_empty() {
            return;
        }

        let rgba = color.to_rgba();
        let stride = self.size.width as usize * BYTES_PER_PIXEL;
        let start = clipped.min_x as usize * BYTES_PER_PIXEL;
        let end = clipped.max_x as usize * BYTES_PER_PIXEL;

        for y in clipped.min_y as usize..clipped.max_y as usize {
            let row = &mut self.pixels[y * stride..(y + 1) * stride];
            for pixel in row[start..end].chunks_exact_mut(BYTES_PER_PIXEL) {
                pixel.copy_from_slice(&rgba);
            }
        }
    }

    /// Reads one pixel, or `None` when out of bounds.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.size.width || y >= self.size.height {
            return None;
        }
        let offset = (y as usize * self.size.width as usize + x as usize) * BYTES_PER_PIXEL;
        let mut rgba = [0u8; 4];
        rgba.copy_from_slice(&self.pixels[offset..offset + BYTES_PER_PIXEL]);
        Some(rgba)
    }

    /// Raw RGBA8 bytes, row-major.
    pub fn as_bytes(&self) -> &[u8] {
        &self.pixels
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::NamedColor;

    #[test]
    fn new_texture_is_transparent() {
        let texture = Texture::new(Size::new(4, 3));
        assert_eq!(texture.as_bytes().len(), 4 * 3 * 4);
        assert_eq!(texture.pixel(3, 2), Some([0, 0, 0, 0]));
        assert_eq!(texture.pixel(4, 0), None);
    }

    #[test]
    fn fill_is_clipped_to_bounds() {
        let mut texture = Texture::new(Size::new(10, 10));
        texture.fill(Rect::new(-5, 8, 3, 20), NamedColor::Red.into());

        assert_eq!(texture.pixel(0, 8), Some([255, 0, 0, 255]));
        assert_eq!(texture.pixel(2, 9), Some([255, 0, 0, 255]));
        assert_eq!(texture.pixel(3, 9), Some([0, 0, 0, 0]));
        assert_eq!(texture.pixel(0, 7), Some([0, 0, 0, 0]));
    }

    #[test]
    fn empty_and_offscreen_rects_are_noops() {
        let mut texture = Texture::new(Size::new(10, 10));
        let before = texture.clone();
        texture.fill(Rect::new(0, 0, 0, 0), NamedColor::White.into());
        texture.fill(Rect::new(20, 20, 30, 30), NamedColor::White.into());
        texture.fill(Rect::new(5, 5, 2, 8), NamedColor::White.into());
        assert_eq!(texture, before);
    }

    #[test]
    fn full_fill_covers_every_pixel() {
        let mut texture = Texture::new(Size::new(3, 2));
        let bounds = texture.bounds();
        texture.fill(bounds, NamedColor::Green.into());
        assert!(texture
            .as_bytes()
            .chunks_exact(4)
            .all(|px| px == [0, 128, 0, 255]));
    }
}
