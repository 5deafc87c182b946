//! Shared value types used across the world, snake, and protocol layers.
//!
//! These mirror `snakepit/datatypes.py`'s `Position`, `Vector`, `Char` and
//! `Draw` namedtuples from the original implementation this server
//! reimplements.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::constants::COLOR_NEUTRAL;

/// A cell coordinate. `0 <= x < width`, `0 <= y < height` for a valid
/// position; out-of-range positions are used to represent wall collisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// One of the four unit movement vectors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    pub fn opposite(self) -> Direction {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }

    pub fn delta(self) -> (i32, i32) {
        match self {
            Direction::Up => (0, -1),
            Direction::Down => (0, 1),
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
        }
    }

    pub fn random(rng: &mut impl Rng) -> Direction {
        *Direction::ALL.choose(rng).expect("ALL is non-empty")
    }

    /// Maps the default browser key codes (arrow keys) to a direction.
    pub fn from_key_code(code: i64) -> Option<Direction> {
        match code {
            37 => Some(Direction::Left),
            38 => Some(Direction::Up),
            39 => Some(Direction::Right),
            40 => Some(Direction::Down),
            _ => None,
        }
    }
}

/// A single grid cell: a display glyph plus a palette color.
/// Color `0` is reserved for the neutral/interface/stone color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Cell {
    pub ch: char,
    pub color: u8,
}

impl Cell {
    pub const VOID: Cell = Cell {
        ch: crate::constants::CH_VOID,
        color: COLOR_NEUTRAL,
    };

    pub fn new(ch: char, color: u8) -> Self {
        Self { ch, color }
    }
}

/// A single cell write scheduled within a frame. `Draw`s are what the
/// render buffer accumulates and what the `render` protocol message
/// carries to clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Draw {
    pub x: i32,
    pub y: i32,
    pub ch: char,
    pub color: u8,
}

impl Draw {
    pub fn new(pos: Position, ch: char, color: u8) -> Self {
        Self {
            x: pos.x,
            y: pos.y,
            ch,
            color,
        }
    }

    pub fn position(&self) -> Position {
        Position::new(self.x, self.y)
    }

    pub fn cell(&self) -> Cell {
        Cell::new(self.ch, self.color)
    }
}

/// Stable player identity. Allocated as a UUID-style string on first
/// handshake; reused across reconnects when the client supplies a
/// matching id.
pub type PlayerId = String;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opposite_is_involutive() {
        for d in Direction::ALL {
            assert_eq!(d.opposite().opposite(), d);
        }
    }

    #[test]
    fn key_codes_match_arrow_defaults() {
        assert_eq!(Direction::from_key_code(37), Some(Direction::Left));
        assert_eq!(Direction::from_key_code(38), Some(Direction::Up));
        assert_eq!(Direction::from_key_code(39), Some(Direction::Right));
        assert_eq!(Direction::from_key_code(40), Some(Direction::Down));
        assert_eq!(Direction::from_key_code(13), None);
    }
}
