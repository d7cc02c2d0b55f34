// src/painter/op.rs
//! Texture operations - the units of work the event loop applies.
//!
//! Every operation mutates a texture and reports whether the texture is now
//! ready to be displayed. All parameters (coordinates, colors) are captured
//! when the operation is built, so applying the same instance twice performs
//! the same mutation twice.

use crate::color::{Color, NamedColor};
use crate::painter::texture::{Rect, Texture};
use std::fmt;
use std::sync::Arc;

/// Half the thickness of each bar of a figure's cross, in pixels.
const FIGURE_ARM_HALF_WIDTH: i32 = 20;
/// Half the length of each bar of a figure's cross, in pixels.
const FIGURE_ARM_HALF_LENGTH: i32 = 100;

/// A unit of canvas mutation plus a readiness signal.
pub trait Operation: Send + Sync {
    /// Applies the operation and returns `true` if the texture is ready to be
    /// displayed.
    fn apply(&self, texture: &mut Texture) -> bool;
}

/// Operations travel through the queue as trait objects.
pub type BoxedOperation = Box<dyn Operation>;

impl<T: Operation + ?Sized> Operation for Box<T> {
    fn apply(&self, texture: &mut Texture) -> bool {
        (**self).apply(texture)
    }
}

impl<T: Operation + ?Sized> Operation for Arc<T> {
    fn apply(&self, texture: &mut Texture) -> bool {
        (**self).apply(texture)
    }
}

/// A pure mutation. Never marks the texture ready.
#[derive(Clone)]
pub struct TextureFn(Arc<dyn Fn(&mut Texture) + Send + Sync>);

impl TextureFn {
    pub fn new(f: impl Fn(&mut Texture) + Send + Sync + 'static) -> Self {
        Self(Arc::new(f))
    }
}

impl fmt::Debug for TextureFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("TextureFn")
    }
}

impl Operation for TextureFn {
    fn apply(&self, texture: &mut Texture) -> bool {
        (self.0)(texture);
        false
    }
}

/// An ordered batch of operations applied against the same texture.
///
/// Readiness is the OR of all members, and every member is applied even after
/// one of them has reported ready.
#[derive(Default)]
pub struct CompositeOperation(Vec<BoxedOperation>);

impl CompositeOperation {
    pub fn new(ops: Vec<BoxedOperation>) -> Self {
        Self(ops)
    }

    pub fn push(&mut self, op: impl Operation + 'static) {
        self.0.push(Box::new(op));
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<BoxedOperation>> for CompositeOperation {
    fn from(ops: Vec<BoxedOperation>) -> Self {
        Self(ops)
    }
}

impl Operation for CompositeOperation {
    fn apply(&self, texture: &mut Texture) -> bool {
        self.0
            .iter()
            .fold(false, |ready, op| op.apply(texture) || ready)
    }
}

/// Forces a publish without touching the texture.
#[derive(Debug, Clone, Copy, Default)]
pub struct MarkReady;

impl Operation for MarkReady {
    fn apply(&self, _texture: &mut Texture) -> bool {
        true
    }
}

/// Fills the whole texture with `color`.
pub fn fill_texture(color: Color) -> TextureFn {
    TextureFn::new(move |texture| {
        let bounds = texture.bounds();
        texture.fill(bounds, color);
    })
}

/// Fills `rect` with `color`.
pub fn draw_rectangle(rect: Rect, color: Color) -> TextureFn {
    TextureFn::new(move |texture| texture.fill(rect, color))
}

/// A cross-shaped marker placed on the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Figure {
    pub center_x: i32,
    pub center_y: i32,
    pub color: Color,
}

impl Figure {
    pub fn new(center_x: i32, center_y: i32) -> Self {
        Self {
            center_x,
            center_y,
            color: Color::Named(NamedColor::Blue),
        }
    }

    pub fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    /// Builds an operation drawing the figure at its current position.
    ///
    /// The position is copied, so moving the figure afterwards does not
    /// affect operations that were already built.
    pub fn draw(&self) -> TextureFn {
        let (vertical, horizontal) = self.bars();
        let color = self.color;
        TextureFn::new(move |texture| {
            texture.fill(vertical, color);
            texture.fill(horizontal, color);
        })
    }

    pub fn translate(&mut self, dx: i32, dy: i32) {
        self.center_x = self.center_x.saturating_add(dx);
        self.center_y = self.center_y.saturating_add(dy);
    }

    fn bars(&self) -> (Rect, Rect) {
        let (cx, cy) = (self.center_x, self.center_y);
        let vertical = Rect::new(
            cx.saturating_sub(FIGURE_ARM_HALF_WIDTH),
            cy.saturating_sub(FIGURE_ARM_HALF_LENGTH),
            cx.saturating_add(FIGURE_ARM_HALF_WIDTH),
            cy.saturating_add(FIGURE_ARM_HALF_LENGTH),
        );
        let horizontal = Rect::new(
            cx.saturating_sub(FIGURE_ARM_HALF_LENGTH),
            cy.saturating_sub(FIGURE_ARM_HALF_WIDTH),
            cx.saturating_add(FIGURE_ARM_HALF_LENGTH),
            cy.saturating_add(FIGURE_ARM_HALF_WIDTH),
        );
        (vertical, horizontal)
    }
}
