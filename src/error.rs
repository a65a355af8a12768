//! Error types.
//!
//! Recoverable in-game events (illegal move, deck exhaustion) never reach
//! these types; they are handled inside the turn loop. What remains is
//! setup validation and the transcript I/O surface.

use crate::transcript::{MAX_PLAYERS, MAX_TEAMS};
use thiserror::Error;

/// Errors surfaced by game setup and orchestration.
#[derive(Debug, Error)]
pub enum GameError {
    /// Seat counts must divide into 2 or 3 teams.
    #[error("invalid player count {0}; must be 2, 3, 4, or 6")]
    InvalidPlayerCount(usize),

    /// Transcript recording or replay failed.
    #[error(transparent)]
    Transcript(#[from] TranscriptError),
}

/// Errors surfaced by the transcript codec.
#[derive(Debug, Error)]
pub enum TranscriptError {
    /// The stream ended in the middle of a record.
    #[error("transcript truncated mid-record")]
    Truncated,

    /// A record is structurally impossible: an unknown card value, a play
    /// of a card the seat does not hold, a coup fourre with no pending
    /// attack, or an out-of-range seat or team.
    #[error("corrupt transcript: {0}")]
    Corrupt(&'static str),

    /// The wire format reserves 2 bits for the target team.
    #[error("transcripts support at most {MAX_TEAMS} teams, game has {0}")]
    TooManyTeams(usize),

    /// The wire format reserves seat numbers 0-5.
    #[error("transcripts support at most {MAX_PLAYERS} players, game has {0}")]
    TooManyPlayers(usize),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
