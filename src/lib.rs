//! # mille
//!
//! A Mille Bornes rules engine with bit-exact transcript recording and
//! replay.
//!
//! ## Design Principles
//!
//! 1. **Engine-owned state**: The canonical [`Game`]/[`Team`]/[`Player`]
//!    state is owned exclusively by the engine. Drivers and transcript
//!    consumers only ever see owned snapshots ([`PlayerView`]) or shared
//!    references taken after the fact.
//!
//! 2. **One application routine**: Live play and transcript replay both
//!    push moves through `Game::handle_move`, so a replayed game lands on
//!    state and scores identical to the original run.
//!
//! 3. **Synchronous by construction**: Exactly one decision is in flight
//!    at a time. Driver calls are plain blocking calls; there is no
//!    concurrency to reason about.
//!
//! 4. **Deterministic given a seed**: The seeded RNG behind the shuffles
//!    is the engine's only randomness, which is what makes transcripts
//!    (which capture drawn cards, not the seed) sufficient for replay.
//!
//! ## Modules
//!
//! - `cards`: card values, categories, cross-references
//! - `deck`: the 110-card draw pile
//! - `rng`: seeded deterministic RNG
//! - `team`, `player`: mutable per-side and per-seat records
//! - `moves`: the move value type
//! - `state`: restricted per-player views and legality enumeration
//! - `driver`: the decision-making collaborator contract
//! - `game`: the turn state machine and scoring
//! - `transcript`: the binary record/replay codec
//! - `error`: setup and codec error types

pub mod cards;
pub mod deck;
pub mod driver;
pub mod error;
pub mod game;
pub mod moves;
pub mod player;
pub mod rng;
pub mod state;
pub mod team;
pub mod transcript;

// Re-export commonly used types
pub use crate::cards::{Card, CardType, ALL_CARDS};
pub use crate::deck::{Deck, COMPOSITION, DECK_SIZE, HAND_SIZE};
pub use crate::driver::{BasicDriver, Driver, RandomDriver};
pub use crate::error::{GameError, TranscriptError};
pub use crate::game::{Game, GameBuilder, GameOutcome, TurnEvent, POINTS_TO_WIN};
pub use crate::moves::{Move, MoveKind};
pub use crate::player::{Hand, Player};
pub use crate::rng::GameRng;
pub use crate::state::PlayerView;
pub use crate::team::Team;
pub use crate::transcript::{
    TranscriptConsumer, TranscriptReader, TranscriptWriter, MAX_PLAYERS, MAX_TEAMS,
};
