//! Food and obstacle spawning (component E): picking an empty cell and
//! laying down a digit or a stone.
//!
//! Grounded on `snakepit/game.py`'s `_spawn_digit`/`_spawn_stone`, which
//! roll a spawn-rate percentage once per frame (or spawn unconditionally
//! when forced, for a newborn snake's "birthday present") and then look
//! for an empty cell via a small number of random probes rather than a
//! full scan. The original's probe loop has a truthiness bug that treats
//! `x == 0` or `y == 0` as "no cell found"; this reimplementation carries
//! an explicit `Option<Position>` instead, so `(0, *)` and `(*, 0)` are
//! valid hits.

use rand::Rng;

use crate::constants::{CH_STONE, CH_VOID, COLOR_NEUTRAL, SPAWN_PICK_RETRIES};
use crate::types::{Draw, Position};
use crate::world::World;

/// Probes up to [`SPAWN_PICK_RETRIES`] random positions and returns the
/// first void one found, or `None` if every probe missed.
pub fn pick_empty_cell(world: &World, rng: &mut impl Rng) -> Option<Position> {
    for _ in 0..SPAWN_PICK_RETRIES {
        let pos = Position::new(rng.gen_range(0..world.width()), rng.gen_range(0..world.height()));
        if world.get(pos).ch == CH_VOID {
            return Some(pos);
        }
    }
    None
}

/// With probability `spawn_rate` percent, or unconditionally when `forced`,
/// places a digit in `digit_min..=digit_max` in a random color from the
/// full palette (`1..=num_colors`) on a random empty cell.
pub fn spawn_digit(
    world: &World,
    rng: &mut impl Rng,
    spawn_rate: u8,
    forced: bool,
    digit_min: u8,
    digit_max: u8,
    num_colors: u8,
) -> Option<Draw> {
    if !forced && !roll(rng, spawn_rate) {
        return None;
    }
    let pos = pick_empty_cell(world, rng)?;
    let digit = rng.gen_range(digit_min..=digit_max);
    let ch = char::from_digit(digit as u32, 10).expect("digit_max <= 9");
    let color = rng.gen_range(1..=num_colors.max(1));
    Some(Draw::new(pos, ch, color))
}

/// With probability `spawn_rate` percent, places a stone on a random empty
/// cell, in the neutral color.
pub fn spawn_stone(world: &World, rng: &mut impl Rng, spawn_rate: u8) -> Option<Draw> {
    if !roll(rng, spawn_rate) {
        return None;
    }
    let pos = pick_empty_cell(world, rng)?;
    Some(Draw::new(pos, CH_STONE, COLOR_NEUTRAL))
}

fn roll(rng: &mut impl Rng, percent: u8) -> bool {
    percent > 0 && rng.gen_range(0..100) < percent
}
