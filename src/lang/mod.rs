// src/lang/mod.rs

//! Turns textual drawing commands into texture operations.
//!
//! A submission is parsed completely before the artboard is touched, so a
//! failing submission changes neither the artboard nor the queue.

mod commands;
mod state;

pub use commands::{convert_to_coordinates, parse_line, Command, ParseError};
pub use state::{ArtboardState, Palette};

use crate::painter::BoxedOperation;
use log::debug;
use std::io::BufRead;

/// Default factor from fractional command coordinates to pixels.
pub const DEFAULT_COORDINATE_SCALE: f64 = 800.0;

/// Parses command scripts and accumulates their effect on an artboard.
#[derive(Debug, Clone)]
pub struct CommandProcessor {
    artboard: ArtboardState,
    scale: f64,
}

impl Default for CommandProcessor {
    fn default() -> Self {
        Self::new(ArtboardState::default(), DEFAULT_COORDINATE_SCALE)
    }
}

impl CommandProcessor {
    pub fn new(artboard: ArtboardState, scale: f64) -> Self {
        Self { artboard, scale }
    }

    pub fn artboard(&self) -> &ArtboardState {
        &self.artboard
    }

    /// Parses every line of `input` into commands without side effects.
    pub fn parse_script(&self, input: impl BufRead) -> Result<Vec<Command>, ParseError> {
        let mut commands = Vec::new();
        for (index, line) in input.lines().enumerate() {
            let line = line?;
            commands.extend(parse_line(&line, index + 1, self.scale)?);
        }
        Ok(commands)
    }

    /// Parses `input` and, if all of it is valid, applies it to the artboard.
    ///
    /// Returns the operations emitted by `update` commands, in order.
    pub fn process_commands(
        &mut self,
        input: impl BufRead,
    ) -> Result<Vec<BoxedOperation>, ParseError> {
        let commands = self.parse_script(input)?;
        Ok(self.apply_commands(&commands))
    }

    /// Applies already parsed commands to the artboard.
    pub fn apply_commands(&mut self, commands: &[Command]) -> Vec<BoxedOperation> {
        let mut ops = Vec::new();
        for command in commands {
            ops.extend(self.artboard.apply(*command));
        }
        debug!(
            "CommandProcessor: {} commands produced {} operations",
            commands.len(),
            ops.len()
        );
        ops
    }

    /// Replaces the artboard, returning the previous one.
    pub fn replace_artboard(&mut self, artboard: ArtboardState) -> ArtboardState {
        std::mem::replace(&mut self.artboard, artboard)
    }

    /// Convenience wrapper over `process_commands` for in-memory text.
    pub fn process_str(&mut self, input: &str) -> Result<Vec<BoxedOperation>, ParseError> {
        self.process_commands(input.as_bytes())
    }
}
