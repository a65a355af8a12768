//! Per-seat state.

use crate::cards::Card;
use crate::driver::Driver;
use smallvec::SmallVec;
use std::fmt;

/// A hand of cards. Six are dealt and at most one more is drawn per turn,
/// so hands stay on the stack.
pub type Hand = SmallVec<[Card; 8]>;

/// One seat at the table: a hand, a team, and (during live play) the bound
/// decision-making driver. Replayed games have no drivers.
pub struct Player {
    /// Seat number, fixed for the game.
    pub number: usize,
    /// Team number of this seat.
    pub team: usize,
    /// Cards currently held. Ordered; "first card" is well-defined for the
    /// forced-discard recovery path.
    pub hand: Hand,
    /// Display name; the bound driver's name, or the name recorded in the
    /// transcript header.
    pub name: String,
    pub(crate) driver: Option<Box<dyn Driver>>,
}

impl Player {
    /// Create a seat bound to a driver.
    #[must_use]
    pub fn new(number: usize, team: usize, driver: Box<dyn Driver>) -> Self {
        let name = driver.name().to_string();
        Self {
            number,
            team,
            hand: Hand::new(),
            name,
            driver: Some(driver),
        }
    }

    /// Create an unbound seat, as reconstructed from a transcript header.
    #[must_use]
    pub fn unbound(number: usize, team: usize, name: String) -> Self {
        Self {
            number,
            team,
            hand: Hand::new(),
            name,
            driver: None,
        }
    }

    /// Remove the first copy of `card` from the hand. Returns false if the
    /// card is not held.
    pub(crate) fn remove_from_hand(&mut self, card: Card) -> bool {
        if let Some(pos) = self.hand.iter().position(|&c| c == card) {
            self.hand.remove(pos);
            true
        } else {
            false
        }
    }
}

impl fmt::Display for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, player {} (team {})", self.name, self.number, self.team)
    }
}

impl fmt::Debug for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Player")
            .field("number", &self.number)
            .field("team", &self.team)
            .field("hand", &self.hand)
            .field("name", &self.name)
            .field("driver", &self.driver.is_some())
            .finish()
    }
}
