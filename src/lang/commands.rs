// src/lang/commands.rs

//! The drawing command vocabulary and its line-oriented parser.
//!
//! One line may carry several commands separated by commas. Coordinates are
//! decimal fractions of the canvas and are scaled to pixels at parse time.

use log::trace;
use thiserror::Error;

/// A single parsed drawing command, with coordinates already in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Fill the background white.
    White,
    /// Fill the background green.
    Green,
    /// Background rectangle from (x1, y1) to (x2, y2).
    BgRect { x1: i32, y1: i32, x2: i32, y2: i32 },
    /// Place a figure centred at (x, y).
    Figure { x: i32, y: i32 },
    /// Translate every placed figure.
    Move { dx: i32, dy: i32 },
    /// Emit the accumulated drawing, followed by a publish.
    Update,
    /// Clear to a blank background.
    Reset,
}

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("line {line}: unrecognized command '{name}'")]
    UnknownCommand { line: usize, name: String },
    #[error("line {line}: {command} command expects {expected} arguments, got {found}")]
    ArgumentCount {
        line: usize,
        command: &'static str,
        expected: usize,
        found: usize,
    },
    #[error("line {line}: error parsing coordinate '{value}'")]
    InvalidCoordinate { line: usize, value: String },
    #[error("failed to read commands")]
    Io(#[from] std::io::Error),
}

/// Parses one line of input (1-based `line` is used for error reporting).
///
/// Blank lines and empty comma-separated segments yield no commands.
pub fn parse_line(text: &str, line: usize, scale: f64) -> Result<Vec<Command>, ParseError> {
    let mut commands = Vec::new();
    for segment in text.split(',') {
        let mut parts = segment.split_whitespace();
        let Some(name) = parts.next() else {
            continue;
        };
        let args: Vec<&str> = parts.collect();
        let command = parse_command(name, &args, line, scale)?;
        trace!("lang: line {}: parsed {:?}", line, command);
        commands.push(command);
    }
    Ok(commands)
}

fn parse_command(
    name: &str,
    args: &[&str],
    line: usize,
    scale: f64,
) -> Result<Command, ParseError> {
    let command = match name {
        "white" => {
            expect_args("white", args, 0, line)?;
            Command::White
        }
        "green" => {
            expect_args("green", args, 0, line)?;
            Command::Green
        }
        "bgrect" => {
            expect_args("bgrect", args, 4, line)?;
            let c = convert_to_coordinates(args, line, scale)?;
            Command::BgRect {
                x1: c[0],
                y1: c[1],
                x2: c[2],
                y2: c[3],
            }
        }
        "figure" => {
            expect_args("figure", args, 2, line)?;
            let c = convert_to_coordinates(args, line, scale)?;
            Command::Figure { x: c[0], y: c[1] }
        }
        "move" => {
            expect_args("move", args, 2, line)?;
            let c = convert_to_coordinates(args, line, scale)?;
            Command::Move { dx: c[0], dy: c[1] }
        }
        "update" => {
            expect_args("update", args, 0, line)?;
            Command::Update
        }
        "reset" => {
            expect_args("reset", args, 0, line)?;
            Command::Reset
        }
        _ => {
            return Err(ParseError::UnknownCommand {
                line,
                name: name.to_string(),
            })
        }
    };
    Ok(command)
}

fn expect_args(
    command: &'static str,
    args: &[&str],
    expected: usize,
    line: usize,
) -> Result<(), ParseError> {
    if args.len() != expected {
        return Err(ParseError::ArgumentCount {
            line,
            command,
            expected,
            found: args.len(),
        });
    }
    Ok(())
}

/// Scales fractional coordinates to pixels, truncating toward zero.
///
/// Values whose scaled pixel position does not fit in an `i32` are rejected.
pub fn convert_to_coordinates(
    args: &[&str],
    line: usize,
    scale: f64,
) -> Result<Vec<i32>, ParseError> {
    args.iter()
        .map(|arg| {
            arg.parse::<f64>()
                .ok()
                .map(|value| (value * scale).trunc())
                .filter(|pixels| {
                    pixels.is_finite()
                        && *pixels >= f64::from(i32::MIN)
                        && *pixels <= f64::from(i32::MAX)
                })
                .map(|pixels| pixels as i32)
                .ok_or_else(|| ParseError::InvalidCoordinate {
                    line,
                    value: arg.to_string(),
                })
        })
        .collect()
}
