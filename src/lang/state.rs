// src/lang/state.rs

//! ArtboardState - the drawing accumulated between `update` commands.

use crate::color::{Color, NamedColor};
use crate::lang::commands::Command;
use crate::painter::{draw_rectangle, fill_texture, BoxedOperation, Figure, MarkReady, Rect};
use log::debug;
use serde::{Deserialize, Serialize};

/// Colors used when turning commands into operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Palette {
    pub white: Color,
    pub green: Color,
    pub reset: Color,
    pub rectangle: Color,
    pub figure: Color,
}

impl Default for Palette {
    fn default() -> Self {
        Palette {
            white: Color::Named(NamedColor::White),
            green: Color::Named(NamedColor::Green),
            reset: Color::Named(NamedColor::Black),
            rectangle: Color::Named(NamedColor::Red),
            figure: Color::Named(NamedColor::Blue),
        }
    }
}

/// Background, background rectangle, and placed figures.
///
/// Nothing is drawn until `refresh` turns the state into operations.
#[derive(Debug, Clone, Default)]
pub struct ArtboardState {
    palette: Palette,
    background: Option<Color>,
    rectangle: Option<Rect>,
    figures: Vec<Figure>,
}

impl ArtboardState {
    pub fn new(palette: Palette) -> Self {
        Self {
            palette,
            ..Self::default()
        }
    }

    pub fn background(&self) -> Option<Color> {
        self.background
    }

    pub fn rectangle(&self) -> Option<Rect> {
        self.rectangle
    }

    pub fn figures(&self) -> &[Figure] {
        &self.figures
    }

    /// Applies one command. Returns the operations it emits (only `Update`
    /// emits any).
    pub fn apply(&mut self, command: Command) -> Vec<BoxedOperation> {
        match command {
            Command::White => self.background = Some(self.palette.white),
            Command::Green => self.background = Some(self.palette.green),
            Command::BgRect { x1, y1, x2, y2 } => {
                self.rectangle = Some(Rect::new(x1, y1, x2, y2));
            }
            Command::Figure { x, y } => {
                self.figures
                    .push(Figure::new(x, y).with_color(self.palette.figure));
            }
            Command::Move { dx, dy } => {
                for figure in &mut self.figures {
                    figure.translate(dx, dy);
                }
            }
            Command::Update => return self.refresh(),
            Command::Reset => self.reset(),
        }
        Vec::new()
    }

    /// Clears to a blank (reset-colored) background with nothing on it.
    pub fn reset(&mut self) {
        self.background = Some(self.palette.reset);
        self.rectangle = None;
        self.figures.clear();
    }

    /// Builds the operations that draw the current state, ending with a
    /// publish.
    pub fn refresh(&self) -> Vec<BoxedOperation> {
        let mut ops: Vec<BoxedOperation> = Vec::with_capacity(self.figures.len() + 3);

        if let Some(color) = self.background {
            ops.push(Box::new(fill_texture(color)));
        }
        if let Some(rect) = self.rectangle {
            ops.push(Box::new(draw_rectangle(rect, self.palette.rectangle)));
        }
        for figure in &self.figures {
            ops.push(Box::new(figure.draw()));
        }
        ops.push(Box::new(MarkReady));

        debug!(
            "ArtboardState: refresh emitted {} operations ({} figures)",
            ops.len(),
            self.figures.len()
        );
        ops
    }
}
