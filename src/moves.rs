//! Move representation.
//!
//! A move is an immutable value describing an intended action: discard a
//! card or play it, with a target team for attacks. Coup-fourre interrupts
//! travel through the same type so that live play, broadcasts, and the
//! transcript all share one vocabulary.

use crate::cards::Card;
use serde::{Deserialize, Serialize};
use std::fmt;

/// What a move does with its card.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MoveKind {
    Discard = 0,
    Play = 1,
}

/// A complete move.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Move {
    pub kind: MoveKind,
    pub card: Card,
    /// Target team number; attacks only.
    pub target: Option<usize>,
    /// Set on the synthetic safety play that voids an attack.
    pub coup_fourre: bool,
}

impl Move {
    /// Discard `card`.
    #[must_use]
    pub fn discard(card: Card) -> Self {
        Self {
            kind: MoveKind::Discard,
            card,
            target: None,
            coup_fourre: false,
        }
    }

    /// Play `card` for one's own team.
    #[must_use]
    pub fn play(card: Card) -> Self {
        Self {
            kind: MoveKind::Play,
            card,
            target: None,
            coup_fourre: false,
        }
    }

    /// Play an attack `card` against `target`.
    #[must_use]
    pub fn attack(card: Card, target: usize) -> Self {
        Self {
            kind: MoveKind::Play,
            card,
            target: Some(target),
            coup_fourre: false,
        }
    }

    /// Play a safety as a coup fourre.
    #[must_use]
    pub fn coup_fourre(safety: Card) -> Self {
        Self {
            kind: MoveKind::Play,
            card: safety,
            target: None,
            coup_fourre: true,
        }
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            MoveKind::Discard => write!(f, "discards {}", self.card)?,
            MoveKind::Play => write!(f, "plays {}", self.card)?,
        }
        if let Some(target) = self.target {
            write!(f, " on team {target}")?;
        }
        if self.coup_fourre {
            write!(f, " as a coup fourre!")?;
        }
        Ok(())
    }
}
