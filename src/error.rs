//! The error taxonomy for the game layer (component F and friends).
//!
//! Grounded on the teacher's `GameError` enum in `types.rs`, generalized to
//! the failure modes this server's tick engine and connection layer
//! actually produce, and on [`crate::config::ConfigError`] for the
//! startup-time configuration failures.

use thiserror::Error;

use crate::types::PlayerId;

#[derive(Debug, Error)]
pub enum GameError {
    #[error("player {0} is not known to this game")]
    UnknownPlayer(PlayerId),

    #[error("no color is free to assign to a new player")]
    NoColorAvailable,

    #[error("no placement was found for a new snake after exhausting retries")]
    NoSnakePlacement,

    #[error("malformed client message: {0}")]
    MalformedMessage(String),

    #[error("internal error: {0}")]
    Internal(String),
}

pub type GameResult<T> = Result<T, GameError>;
