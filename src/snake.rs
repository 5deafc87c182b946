//! The snake (component B): an ordered body, its direction, and the growth
//! counter that makes the tail pause while digesting food.
//!
//! Grounded on `snakepit/snake.py`'s `Snake` class: `create()`/`render_new()`
//! for initial placement with retries, `render_move()` for the per-tick
//! body update, and `render_game_over()` for the dead-glyph repaint. The
//! direction-reversal guard follows `snakepit/player.py`'s `keypress()`.

use std::collections::VecDeque;

use rand::Rng;

use crate::constants::{
    CH_BODY, CH_DEAD_BODY, CH_DEAD_HEAD, CH_DEAD_TAIL, CH_HEAD, CH_TAIL, CH_VOID, COLOR_NEUTRAL,
};
use crate::types::{Direction, Draw, Position};
use crate::world::World;

/// A snake placement attempt exhausted its retry budget. Surfaced to the
/// tick engine as a `SnakeError`, per spec taxonomy.
#[derive(Debug, thiserror::Error)]
#[error("no placement for a new snake was found after exhausting all retries")]
pub struct NoPlacement;

#[derive(Debug, Clone)]
pub struct Snake {
    pub color: u8,
    /// Head first, tail last.
    pub body: VecDeque<Position>,
    /// The direction requested for the next move.
    pub direction: Option<Direction>,
    /// The direction actually taken on the last move.
    pub current_direction: Option<Direction>,
    /// Number of future ticks during which the tail must not move.
    pub grow: u32,
    /// Whether the previous tick grew (tail held in place).
    pub grew: bool,
    pub alive: bool,
}

impl Snake {
    pub fn new(color: u8) -> Self {
        Self {
            color,
            body: VecDeque::new(),
            direction: None,
            current_direction: None,
            grow: 0,
            grew: false,
            alive: true,
        }
    }

    pub fn head(&self) -> Option<Position> {
        self.body.front().copied()
    }

    fn reset(&mut self) {
        self.grow = 0;
        self.grew = false;
        self.body.clear();
        self.direction = None;
        self.current_direction = None;
    }

    /// One placement attempt: a random interior position and direction,
    /// laying down `init_length` cells from tail toward head. Fails if any
    /// target cell is non-void.
    fn try_place(
        &mut self,
        world: &World,
        rng: &mut impl Rng,
        min_distance_from_border: i32,
        init_length: usize,
    ) -> Result<Vec<Draw>, ()> {
        let distance = init_length as i32 + min_distance_from_border;
        if world.width() - distance < distance || world.height() - distance < distance {
            // Settings validation should have already ruled this out, but
            // guard against a degenerate call rather than panic on an
            // empty range.
            return Err(());
        }

        let x = rng.gen_range(distance..=(world.width() - distance));
        let y = rng.gen_range(distance..=(world.height() - distance));
        let direction = Direction::random(rng);
        self.direction = Some(direction);
        self.current_direction = Some(direction);

        let (dx, dy) = direction.delta();
        let mut draws = Vec::with_capacity(init_length);
        let mut pos = Position::new(x, y);

        for i in 0..init_length {
            if world.is_invalid(pos) || world.get(pos).ch != CH_VOID {
                return Err(());
            }

            let ch = if i == 0 {
                CH_TAIL
            } else if i == init_length - 1 {
                CH_HEAD
            } else {
                CH_BODY
            };

            self.body.push_front(pos);
            draws.push(Draw::new(pos, ch, self.color));
            pos = Position::new(pos.x + dx, pos.y + dy);
        }

        Ok(draws)
    }

    /// Attempts placement up to `retries` times, resetting between
    /// failures. Returns the Draws that paint the new snake.
    pub fn render_new(
        &mut self,
        world: &World,
        rng: &mut impl Rng,
        min_distance_from_border: i32,
        init_length: usize,
        retries: u32,
    ) -> Result<Vec<Draw>, NoPlacement> {
        debug_assert!(self.body.is_empty(), "render_new called on a placed snake");

        for _ in 0..retries.max(1) {
            match self.try_place(world, rng, min_distance_from_border, init_length) {
                Ok(draws) => return Ok(draws),
                Err(()) => self.reset(),
            }
        }

        Err(NoPlacement)
    }

    /// The position the head would occupy if it moved now.
    pub fn next_position(&self) -> Position {
        let head = self.head().expect("next_position requires a placed body");
        let direction = self.direction.expect("next_position requires a direction");
        let (dx, dy) = direction.delta();
        Position::new(head.x + dx, head.y + dy)
    }

    /// Advances the head into `next_position()` and, unless `grow` is
    /// pending, pops the tail. `ignore_tail` suppresses the VOID draw for
    /// the vacated tail cell (used when this same snake is about to
    /// re-enter that cell this same frame, i.e. an own-tail chase).
    pub fn move_snake(&mut self, ignore_tail: bool) -> Vec<Draw> {
        let mut draws = Vec::with_capacity(4);
        let new_head = self.next_position();
        self.body.push_front(new_head);
        draws.push(Draw::new(new_head, CH_HEAD, self.color));

        let old_head = self.body[1];
        draws.push(Draw::new(old_head, CH_BODY, self.color));

        self.current_direction = self.direction;

        if self.grow > 0 {
            self.grow -= 1;
            self.grew = true;
        } else {
            self.grew = false;
            let old_tail = self.body.pop_back().expect("body non-empty after push");
            if !ignore_tail {
                draws.push(Draw::new(old_tail, CH_VOID, COLOR_NEUTRAL));
            }
            let new_tail = *self.body.back().expect("body has at least one segment");
            draws.push(Draw::new(new_tail, CH_TAIL, self.color));
        }

        draws
    }

    /// Paints every body position with its dead-glyph equivalent.
    pub fn render_game_over(&self) -> Vec<Draw> {
        let len = self.body.len();
        self.body
            .iter()
            .enumerate()
            .map(|(i, &pos)| {
                let ch = if i == 0 {
                    CH_DEAD_HEAD
                } else if i == len - 1 {
                    CH_DEAD_TAIL
                } else {
                    CH_DEAD_BODY
                };
                Draw::new(pos, ch, COLOR_NEUTRAL)
            })
            .collect()
    }

    /// Applies the direction-reversal guard: a requested direction is only
    /// accepted once the snake has taken (or been placed with) an initial
    /// direction, and it must not be the exact reverse of `current_direction`.
    pub fn request_direction(&mut self, requested: Direction) {
        if let Some(current) = self.current_direction {
            if requested != current.opposite() {
                self.direction = Some(requested);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn rng() -> StdRng {
        StdRng::seed_from_u64(42)
    }

    #[test]
    fn placement_lays_down_tail_body_head_in_order() {
        let world = World::new(30, 30);
        let mut snake = Snake::new(3);
        let draws = snake
            .render_new(&world, &mut rng(), 2, 5, 10)
            .expect("plenty of room");

        assert_eq!(draws.len(), 5);
        assert_eq!(snake.body.len(), 5);
        assert!(snake.direction.is_some());
        assert_eq!(snake.current_direction, snake.direction);

        let tail_draw = draws.iter().find(|d| d.ch == CH_TAIL).unwrap();
        let head_draw = draws.iter().find(|d| d.ch == CH_HEAD).unwrap();
        assert_eq!(head_draw.position(), snake.head().unwrap());
        assert_eq!(tail_draw.position(), *snake.body.back().unwrap());
    }

    #[test]
    fn move_without_grow_pops_tail_and_paints_void() {
        let world = World::new(30, 30);
        let mut snake = Snake::new(1);
        snake.render_new(&world, &mut rng(), 2, 3, 10).unwrap();
        let old_tail = *snake.body.back().unwrap();

        let draws = snake.move_snake(false);

        assert_eq!(snake.body.len(), 3);
        assert!(draws.iter().any(|d| d.ch == CH_VOID && d.position() == old_tail));
        assert!(draws.iter().any(|d| d.ch == CH_TAIL));
        assert!(draws.iter().any(|d| d.ch == CH_HEAD));
    }

    #[test]
    fn move_with_grow_keeps_tail_in_place() {
        let world = World::new(30, 30);
        let mut snake = Snake::new(1);
        snake.render_new(&world, &mut rng(), 2, 3, 10).unwrap();
        snake.grow = 2;
        let before_len = snake.body.len();

        let draws = snake.move_snake(false);

        assert_eq!(snake.body.len(), before_len + 1);
        assert!(snake.grew);
        assert_eq!(snake.grow, 1);
        assert!(!draws.iter().any(|d| d.ch == CH_VOID));
    }

    #[test]
    fn ignore_tail_suppresses_void_draw() {
        let world = World::new(30, 30);
        let mut snake = Snake::new(1);
        snake.render_new(&world, &mut rng(), 2, 3, 10).unwrap();

        let draws = snake.move_snake(true);

        assert!(!draws.iter().any(|d| d.ch == CH_VOID));
    }

    #[test]
    fn reverse_direction_is_rejected() {
        let world = World::new(30, 30);
        let mut snake = Snake::new(1);
        snake.render_new(&world, &mut rng(), 2, 3, 10).unwrap();
        let current = snake.current_direction.unwrap();

        snake.request_direction(current.opposite());

        assert_eq!(snake.direction, Some(current));
    }

    #[test]
    fn perpendicular_direction_is_accepted() {
        let world = World::new(30, 30);
        let mut snake = Snake::new(1);
        snake.render_new(&world, &mut rng(), 2, 3, 10).unwrap();
        let current = snake.current_direction.unwrap();
        let perpendicular = Direction::ALL
            .into_iter()
            .find(|&d| d != current && d != current.opposite())
            .unwrap();

        snake.request_direction(perpendicular);

        assert_eq!(snake.direction, Some(perpendicular));
    }

    #[test]
    fn game_over_paints_dead_glyphs_with_neutral_color() {
        let world = World::new(30, 30);
        let mut snake = Snake::new(1);
        snake.render_new(&world, &mut rng(), 2, 3, 10).unwrap();

        let draws = snake.render_game_over();

        assert!(draws.iter().all(|d| d.color == COLOR_NEUTRAL));
        assert_eq!(draws[0].ch, CH_DEAD_HEAD);
        assert_eq!(draws.last().unwrap().ch, CH_DEAD_TAIL);
    }
}
