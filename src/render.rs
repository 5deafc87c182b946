//! The per-frame render buffer (component D): an insertion-ordered map from
//! position to the last [`Draw`] scheduled for it.
//!
//! Later writes win, which is what lets the tick engine schedule a kill's
//! victim-body repaint and then overwrite it with the killer's own move
//! without needing to reorder anything — `push` already implements
//! last-write-wins via `IndexMap::insert`.

use indexmap::IndexMap;

use crate::types::{Draw, Position};

#[derive(Debug, Default)]
pub struct RenderBuffer {
    pending: IndexMap<Position, Draw>,
}

impl RenderBuffer {
    pub fn new() -> Self {
        Self {
            pending: IndexMap::new(),
        }
    }

    pub fn push(&mut self, draw: Draw) {
        self.pending.insert(draw.position(), draw);
    }

    pub fn extend(&mut self, draws: impl IntoIterator<Item = Draw>) {
        for draw in draws {
            self.push(draw);
        }
    }

    pub fn get(&self, pos: Position) -> Option<Draw> {
        self.pending.get(&pos).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Removes and returns every pending draw, in insertion order.
    pub fn drain(&mut self) -> Vec<Draw> {
        self.pending.drain(..).map(|(_, draw)| draw).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn later_write_to_same_position_wins() {
        let mut buffer = RenderBuffer::new();
        buffer.push(Draw::new(Position::new(1, 1), '@', 2));
        buffer.push(Draw::new(Position::new(1, 1), '*', 3));

        let drained = buffer.drain();
        assert_eq!(drained.len(), 1);
        assert_eq!(drained[0].ch, '*');
        assert_eq!(drained[0].color, 3);
    }

    #[test]
    fn drain_preserves_first_write_order_for_distinct_positions() {
        let mut buffer = RenderBuffer::new();
        buffer.push(Draw::new(Position::new(0, 0), '@', 1));
        buffer.push(Draw::new(Position::new(5, 5), '#', 0));

        let drained = buffer.drain();
        assert_eq!(drained.len(), 2);
        assert_eq!(drained[0].position(), Position::new(0, 0));
        assert_eq!(drained[1].position(), Position::new(5, 5));
    }

    #[test]
    fn drain_empties_the_buffer() {
        let mut buffer = RenderBuffer::new();
        buffer.push(Draw::new(Position::new(0, 0), '@', 1));
        buffer.drain();
        assert!(buffer.is_empty());
    }
}
