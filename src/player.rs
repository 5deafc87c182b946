//! A connected player: identity, score, outbound fan-out, and the snake
//! they currently control.
//!
//! Grounded on `snakepit/player.py`'s `Player`/`UserPlayer`, which bundle a
//! name, a color, a score and a `Snake` together and expose `keypress()`.
//! The connection bookkeeping (`sweep_closed`, `any_closed`) replaces the
//! explicit `Disconnected` control message the Python server needs, since a
//! closed `mpsc` sender is itself an observable "this socket is gone" signal.

use std::sync::Arc;

use rand::Rng;
use tokio::sync::mpsc;

use crate::snake::{NoPlacement, Snake};
use crate::types::{Direction, Draw, PlayerId};
use crate::world::World;

/// One outbound fan-out channel, paired with a per-connection task. Sending
/// is best-effort: a full or closed receiver just means that connection is
/// going away, which the next tick's sweep will notice.
pub type OutboundTx = mpsc::UnboundedSender<Arc<str>>;

#[derive(Debug)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub color: u8,
    pub score: i64,
    pub snake: Snake,
    connections: Vec<OutboundTx>,
}

impl Player {
    /// A freshly handshaked player has no snake yet: `alive()` must read
    /// `false` until `[MSG_JOIN]` assigns a color (`assign_color`), matching
    /// `player.py`'s `alive` being `False` while `snake is None`.
    pub fn new(id: PlayerId, name: String, color: u8) -> Self {
        let mut snake = Snake::new(color);
        snake.alive = false;
        Self {
            id,
            name,
            color,
            score: 0,
            snake,
            connections: Vec::new(),
        }
    }

    pub fn alive(&self) -> bool {
        self.snake.alive
    }

    pub fn direction(&self) -> Option<Direction> {
        self.snake.direction
    }

    pub fn keypress(&mut self, direction: Direction) {
        self.snake.request_direction(direction);
        tracing::debug!(player = %self.id, direction = ?direction, "changed direction");
    }

    /// Assigns a freshly allocated color and resets this player to an
    /// unplaced snake of that color. Called by `[MSG_JOIN]`; the snake is
    /// not rendered into the world yet (the tick engine's newborn step
    /// does that on the next frame).
    pub fn assign_color(&mut self, color: u8) {
        self.color = color;
        self.snake = Snake::new(color);
    }

    /// Places a fresh snake for this player, replacing any prior one.
    pub fn new_snake(
        &mut self,
        world: &World,
        rng: &mut impl Rng,
        min_distance_from_border: i32,
        init_length: usize,
        retries: u32,
    ) -> Result<Vec<Draw>, NoPlacement> {
        let mut snake = Snake::new(self.color);
        let draws = snake.render_new(world, rng, min_distance_from_border, init_length, retries)?;
        self.snake = snake;
        Ok(draws)
    }

    pub fn add_connection(&mut self, tx: OutboundTx) {
        self.connections.push(tx);
    }

    pub fn has_connections(&self) -> bool {
        !self.connections.is_empty()
    }

    /// True once every connection this player ever opened has closed.
    pub fn any_closed(&self) -> bool {
        self.connections.iter().any(|tx| tx.is_closed())
    }

    /// Drops senders whose receiver has gone away. Returns the number
    /// removed, for logging.
    pub fn sweep_closed(&mut self) -> usize {
        let before = self.connections.len();
        self.connections.retain(|tx| !tx.is_closed());
        before - self.connections.len()
    }

    /// Sends a pre-encoded payload to every live connection for this player.
    pub fn send(&self, payload: Arc<str>) {
        for tx in &self.connections {
            let _ = tx.send(payload.clone());
        }
    }

    /// Closes every connection, e.g. on a kicked/shutdown player.
    pub fn shutdown(&mut self) {
        self.connections.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_player_has_no_connections_and_is_not_closed() {
        let player = Player::new("p1".to_string(), "alice".to_string(), 1);
        assert!(!player.has_connections());
        assert!(!player.any_closed());
    }

    #[test]
    fn fresh_player_is_not_alive_until_a_color_is_assigned() {
        let mut player = Player::new("p1".to_string(), "alice".to_string(), 1);
        assert!(!player.alive());
        player.assign_color(2);
        assert!(player.alive());
    }

    #[test]
    fn sweep_removes_closed_senders_only() {
        let mut player = Player::new("p1".to_string(), "alice".to_string(), 1);
        let (tx_live, _rx_live) = mpsc::unbounded_channel();
        let (tx_dead, rx_dead) = mpsc::unbounded_channel();
        drop(rx_dead);
        player.add_connection(tx_live);
        player.add_connection(tx_dead);

        assert!(player.any_closed());
        let removed = player.sweep_closed();
        assert_eq!(removed, 1);
        assert!(!player.any_closed());
        assert!(player.has_connections());
    }

    #[test]
    fn shutdown_clears_all_connections() {
        let mut player = Player::new("p1".to_string(), "alice".to_string(), 1);
        let (tx, _rx) = mpsc::unbounded_channel();
        player.add_connection(tx);
        player.shutdown();
        assert!(!player.has_connections());
    }
}
