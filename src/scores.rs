//! Persisted top-scores table (component H).
//!
//! Grounded on `snakepit/game.py`'s top-scores handling: scores are kept as
//! `(name, score)` pairs, a name's entry is replaced only by a strictly
//! higher score, the table is capped and sorted descending, and it is
//! flushed to disk as JSON after every change. The random per-read color
//! hint comes from the original's lobby screen, which recolors each name in
//! the list on every render rather than persisting a color with the score.

use std::fs;
use std::path::Path;

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::warn;
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ScoreEntry {
    pub name: String,
    pub score: i64,
}

/// A score entry plus a render-time-only color, used for the lobby's
/// top-scores display. Never persisted.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ScoreEntryWithHint {
    pub name: String,
    pub score: i64,
    pub color_hint: u8,
}

#[derive(Debug)]
pub struct TopScores {
    entries: Vec<ScoreEntry>,
    max_len: usize,
    path: String,
}

impl TopScores {
    /// Loads the table from `path`, tolerating a missing or corrupt file by
    /// starting from empty (the table is re-derived purely from play).
    pub fn load(path: &str, max_len: usize) -> Self {
        let entries = fs::read_to_string(path)
            .ok()
            .and_then(|raw| match serde_json::from_str::<Vec<(String, i64)>>(&raw) {
                Ok(pairs) => Some(
                    pairs
                        .into_iter()
                        .map(|(name, score)| ScoreEntry { name, score })
                        .collect(),
                ),
                Err(err) => {
                    warn!(path, %err, "could not parse top scores file, starting empty");
                    None
                }
            })
            .unwrap_or_default();

        let mut table = Self {
            entries,
            max_len,
            path: path.to_string(),
        };
        table.sort_and_truncate();
        table
    }

    fn sort_and_truncate(&mut self) {
        self.entries.sort_by(|a, b| b.score.cmp(&a.score));
        self.entries.truncate(self.max_len);
    }

    /// Records `score` for `name`, replacing its prior entry only if this
    /// score is strictly higher. Returns whether the table changed.
    pub fn update(&mut self, name: &str, score: i64) -> bool {
        if let Some(existing) = self.entries.iter_mut().find(|e| e.name == name) {
            if score <= existing.score {
                return false;
            }
            existing.score = score;
        } else {
            self.entries.push(ScoreEntry {
                name: name.to_string(),
                score,
            });
        }
        self.sort_and_truncate();
        true
    }

    pub fn persist(&self) {
        let pairs: Vec<(&str, i64)> = self
            .entries
            .iter()
            .map(|e| (e.name.as_str(), e.score))
            .collect();

        let Ok(json) = serde_json::to_string(&pairs) else {
            warn!("failed to serialize top scores");
            return;
        };

        if let Some(parent) = Path::new(&self.path).parent() {
            if let Err(err) = fs::create_dir_all(parent) {
                warn!(path = %self.path, %err, "failed to create top scores directory");
                return;
            }
        }

        if let Err(err) = fs::write(&self.path, json) {
            warn!(path = %self.path, %err, "failed to persist top scores");
        }
    }

    pub fn entries(&self) -> &[ScoreEntry] {
        &self.entries
    }

    /// The table with a fresh random color assigned to each entry, for
    /// display. `num_colors` excludes the reserved neutral color 0.
    pub fn with_color_hints(&self, rng: &mut impl Rng, num_colors: u8) -> Vec<ScoreEntryWithHint> {
        self.entries
            .iter()
            .map(|e| ScoreEntryWithHint {
                name: e.name.clone(),
                score: e.score,
                color_hint: rng.gen_range(1..=num_colors.max(1)),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn load_missing_file_starts_empty() {
        let table = TopScores::load("/nonexistent/path/top_scores.json", 10);
        assert!(table.entries().is_empty());
    }

    #[test]
    fn update_replaces_only_on_higher_score() {
        let mut table = TopScores::load("/nonexistent/path/top_scores.json", 10);
        assert!(table.update("alice", 100));
        assert!(!table.update("alice", 50));
        assert!(table.update("alice", 150));
        assert_eq!(table.entries()[0].score, 150);
    }

    #[test]
    fn table_is_capped_and_sorted_descending() {
        let mut table = TopScores::load("/nonexistent/path/top_scores.json", 2);
        table.update("a", 10);
        table.update("b", 30);
        table.update("c", 20);

        let scores: Vec<i64> = table.entries().iter().map(|e| e.score).collect();
        assert_eq!(scores, vec![30, 20]);
    }

    #[test]
    fn color_hints_are_in_range_and_never_neutral() {
        let mut table = TopScores::load("/nonexistent/path/top_scores.json", 10);
        table.update("alice", 100);
        let mut rng = StdRng::seed_from_u64(3);
        let hinted = table.with_color_hints(&mut rng, 6);
        assert_eq!(hinted.len(), 1);
        assert!(hinted[0].color_hint >= 1 && hinted[0].color_hint <= 6);
    }
}
