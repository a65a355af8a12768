//! The draw pile.
//!
//! A fresh deck always holds the same 110-card multiset; only the order
//! varies, by way of the engine's seeded RNG. Drawing from an empty deck
//! is a recoverable event (`None`), not an error: the engine turns it into
//! the "delayed action" hand-ending condition.

use crate::cards::Card;
use crate::rng::GameRng;
use smallvec::SmallVec;

/// Number of cards in a fresh deck.
pub const DECK_SIZE: usize = 110;

/// Cards dealt to each seat at the start of a hand.
pub const HAND_SIZE: usize = 6;

/// Number of copies of each card value in a fresh deck.
pub const COMPOSITION: [(Card, usize); 19] = [
    (Card::Mileage25, 10),
    (Card::Mileage50, 10),
    (Card::Mileage75, 10),
    (Card::Mileage100, 12),
    (Card::Mileage200, 4),
    (Card::SpareTire, 6),
    (Card::Gasoline, 6),
    (Card::Repairs, 6),
    (Card::Go, 14),
    (Card::EndOfLimit, 6),
    (Card::FlatTire, 3),
    (Card::OutOfGas, 3),
    (Card::Accident, 3),
    (Card::Stop, 5),
    (Card::SpeedLimit, 4),
    (Card::PunctureProof, 1),
    (Card::ExtraTank, 1),
    (Card::DrivingAce, 1),
    (Card::RightOfWay, 1),
];

/// The remaining draw pile. Top of the deck is the end of the vec.
#[derive(Clone, Debug)]
pub struct Deck {
    cards: Vec<Card>,
}

impl Deck {
    /// Build a full deck from the composition table and shuffle it.
    #[must_use]
    pub fn shuffled(rng: &mut GameRng) -> Self {
        let mut cards = Vec::with_capacity(DECK_SIZE);
        for (card, count) in COMPOSITION {
            for _ in 0..count {
                cards.push(card);
            }
        }
        rng.shuffle(&mut cards);
        Self { cards }
    }

    /// An exhausted deck. Replay reconstructs hands from the transcript
    /// and never draws.
    #[must_use]
    pub fn empty() -> Self {
        Self { cards: Vec::new() }
    }

    /// Draw the top card, or `None` if the deck is exhausted.
    pub fn draw(&mut self) -> Option<Card> {
        self.cards.pop()
    }

    /// Remove and return the top `count` cards for the opening deal.
    ///
    /// ## Panics
    ///
    /// Panics if fewer than `count` cards remain; the opening deal only
    /// ever runs against a fresh deck.
    pub fn deal(&mut self, count: usize) -> SmallVec<[Card; 8]> {
        assert!(count <= self.cards.len(), "deal from a short deck");
        let split = self.cards.len() - count;
        self.cards.split_off(split).into_iter().rev().collect()
    }

    /// Cards left in the draw pile.
    #[must_use]
    pub fn cards_left(&self) -> usize {
        self.cards.len()
    }
}
