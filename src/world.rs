//! The world grid (component A): a `width x height` buffer of [`Cell`]s.
//!
//! Grounded on `snakepit/world.py`'s `World(list)`, which stores rows
//! indexed `[y][x]` and exposes `reset()`/`show()`. The Rust version keeps
//! the same row-major addressing but flattens storage into a single `Vec`.

use crate::constants::CH_VOID;
use crate::types::{Cell, Position};

#[derive(Debug, Clone)]
pub struct World {
    width: i32,
    height: i32,
    cells: Vec<Cell>,
}

impl World {
    pub fn new(width: i32, height: i32) -> Self {
        assert!(width > 0 && height > 0, "world dimensions must be positive");
        Self {
            width,
            height,
            cells: vec![Cell::VOID; (width * height) as usize],
        }
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    fn index(&self, pos: Position) -> usize {
        debug_assert!(!self.is_invalid(pos), "position out of bounds: {pos:?}");
        (pos.y * self.width + pos.x) as usize
    }

    pub fn is_invalid(&self, pos: Position) -> bool {
        pos.x < 0 || pos.x >= self.width || pos.y < 0 || pos.y >= self.height
    }

    pub fn get(&self, pos: Position) -> Cell {
        self.cells[self.index(pos)]
    }

    pub fn set(&mut self, pos: Position, cell: Cell) {
        let idx = self.index(pos);
        self.cells[idx] = cell;
    }

    /// Sets every non-void cell back to the void cell.
    pub fn reset(&mut self) {
        for cell in self.cells.iter_mut() {
            if cell.ch != CH_VOID {
                *cell = Cell::VOID;
            }
        }
    }

    /// The full grid as nested `[char, color]` rows, for the `world`
    /// handshake payload.
    pub fn rows(&self) -> Vec<Vec<(char, u8)>> {
        (0..self.height)
            .map(|y| {
                (0..self.width)
                    .map(|x| {
                        let cell = self.get(Position::new(x, y));
                        (cell.ch, cell.color)
                    })
                    .collect()
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_world_is_all_void() {
        let world = World::new(4, 3);
        for y in 0..3 {
            for x in 0..4 {
                assert_eq!(world.get(Position::new(x, y)), Cell::VOID);
            }
        }
    }

    #[test]
    fn reset_clears_non_void_cells() {
        let mut world = World::new(4, 3);
        world.set(Position::new(1, 1), Cell::new('@', 2));
        world.reset();
        assert_eq!(world.get(Position::new(1, 1)), Cell::VOID);
    }

    #[test]
    fn invalid_positions_are_out_of_bounds() {
        let world = World::new(4, 3);
        assert!(world.is_invalid(Position::new(-1, 0)));
        assert!(world.is_invalid(Position::new(4, 0)));
        assert!(world.is_invalid(Position::new(0, 3)));
        assert!(!world.is_invalid(Position::new(0, 0)));
        assert!(!world.is_invalid(Position::new(3, 2)));
    }
}
