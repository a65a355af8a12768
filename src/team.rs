//! Per-team state.
//!
//! Teams are thin mutable records; all behavior lives in the engine and in
//! the legality enumeration. Hand-scoped fields are cleared by `reset()` at
//! the start of every hand, while `total_score` (and the seating) persists
//! for the whole game.

use crate::cards::Card;
use serde::{Deserialize, Serialize};
use std::fmt;

/// State of one team (one car).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    /// Team number; also its index in the engine's team list.
    pub number: usize,
    /// Seat numbers of the players on this team.
    pub seats: Vec<usize>,
    /// Points accumulated across hands.
    pub total_score: i32,

    // Hand-scoped state below; see `reset`.
    /// Distance traveled this hand.
    pub mileage: i32,
    /// Mileage cards played this hand.
    pub mileage_pile: Vec<Card>,
    /// Attacks received and remedies played, newest last.
    pub battle_pile: Vec<Card>,
    /// Safeties played this hand. At most one team ever holds each value.
    pub safeties: Vec<Card>,
    /// Safeties played as coup fourres this hand.
    pub coup_fourres: u32,
    /// Points scored this hand.
    pub hand_score: i32,
    /// Whether the team may play mileage.
    pub moving: bool,
    /// Whether a speed limit restricts mileage size (does not stop the car).
    pub speed_limit: bool,
    /// The remedy required before the team can move again, if any.
    pub need_remedy: Option<Card>,
    /// True until the team plays a 200-mile card.
    pub safe_trip: bool,
    /// 200-mile cards played this hand (never exceeds 2).
    pub two_hundreds_played: u8,
}

impl Team {
    /// Create a team with no seats assigned yet.
    #[must_use]
    pub fn new(number: usize) -> Self {
        let mut team = Self {
            number,
            seats: Vec::new(),
            total_score: 0,
            mileage: 0,
            mileage_pile: Vec::new(),
            battle_pile: Vec::new(),
            safeties: Vec::new(),
            coup_fourres: 0,
            hand_score: 0,
            moving: false,
            speed_limit: false,
            need_remedy: None,
            safe_trip: true,
            two_hundreds_played: 0,
        };
        team.reset();
        team
    }

    /// Clear hand-scoped state. A fresh team needs a Go (or Right of Way)
    /// before it can move.
    pub fn reset(&mut self) {
        self.mileage = 0;
        self.mileage_pile.clear();
        self.battle_pile.clear();
        self.safeties.clear();
        self.coup_fourres = 0;
        self.hand_score = 0;
        self.moving = false;
        self.speed_limit = false;
        self.need_remedy = Some(Card::Go);
        self.safe_trip = true;
        self.two_hundreds_played = 0;
    }

    /// Whether this team has played the given safety.
    #[must_use]
    pub fn has_safety(&self, safety: Card) -> bool {
        self.safeties.contains(&safety)
    }
}

impl fmt::Display for Team {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Team {}: {} miles", self.number, self.mileage)?;
        if let Some(remedy) = self.need_remedy {
            writeln!(f, "  Needs {remedy}")?;
        }
        if self.moving {
            writeln!(f, "  Moving")?;
        }
        if self.speed_limit {
            writeln!(f, "  Under a speed limit")?;
        }
        for safety in &self.safeties {
            writeln!(f, "  {safety}")?;
        }
        Ok(())
    }
}
