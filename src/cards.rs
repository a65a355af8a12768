//! Card constants and classification.
//!
//! The full Mille Bornes deck uses nineteen distinct card values in four
//! categories. Cross-references between categories (which remedy clears
//! which attack, which safety blocks it) are total functions over their
//! category; calling one on a card of the wrong category is a caller bug
//! and panics rather than producing a game-rule outcome.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A card value. The discriminants are the wire encoding used by the
/// transcript format and must not be reordered.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(u8)]
pub enum Card {
    Mileage25 = 0,
    Mileage50 = 1,
    Mileage75 = 2,
    Mileage100 = 3,
    Mileage200 = 4,
    SpareTire = 5,
    Gasoline = 6,
    Repairs = 7,
    Go = 8,
    EndOfLimit = 9,
    FlatTire = 10,
    OutOfGas = 11,
    Accident = 12,
    Stop = 13,
    SpeedLimit = 14,
    PunctureProof = 15,
    ExtraTank = 16,
    DrivingAce = 17,
    RightOfWay = 18,
}

/// Card category.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CardType {
    Mileage,
    Remedy,
    Attack,
    Safety,
}

/// All card values, in wire order.
pub const ALL_CARDS: [Card; 19] = [
    Card::Mileage25,
    Card::Mileage50,
    Card::Mileage75,
    Card::Mileage100,
    Card::Mileage200,
    Card::SpareTire,
    Card::Gasoline,
    Card::Repairs,
    Card::Go,
    Card::EndOfLimit,
    Card::FlatTire,
    Card::OutOfGas,
    Card::Accident,
    Card::Stop,
    Card::SpeedLimit,
    Card::PunctureProof,
    Card::ExtraTank,
    Card::DrivingAce,
    Card::RightOfWay,
];

impl Card {
    /// Category of this card. Total over all nineteen values.
    #[must_use]
    pub fn card_type(self) -> CardType {
        match self as u8 {
            0..=4 => CardType::Mileage,
            5..=9 => CardType::Remedy,
            10..=14 => CardType::Attack,
            _ => CardType::Safety,
        }
    }

    /// Distance value of a mileage card.
    ///
    /// ## Panics
    ///
    /// Panics if this is not a mileage card.
    #[must_use]
    pub fn mileage_value(self) -> i32 {
        match self {
            Card::Mileage25 => 25,
            Card::Mileage50 => 50,
            Card::Mileage75 => 75,
            Card::Mileage100 => 100,
            Card::Mileage200 => 200,
            other => panic!("{other:?} is not a mileage card"),
        }
    }

    /// Whether this mileage card is playable under a speed limit.
    #[must_use]
    pub fn is_low_mileage(self) -> bool {
        matches!(self, Card::Mileage25 | Card::Mileage50)
    }

    /// The remedy that clears this attack.
    ///
    /// Speed Limit has no remedy cross-reference; it is lifted by End of
    /// Limit through a separate path and never sets `need_remedy`.
    ///
    /// ## Panics
    ///
    /// Panics for Speed Limit and for non-attack cards.
    #[must_use]
    pub fn remedy(self) -> Card {
        match self {
            Card::FlatTire => Card::SpareTire,
            Card::OutOfGas => Card::Gasoline,
            Card::Accident => Card::Repairs,
            Card::Stop => Card::Go,
            other => panic!("{other:?} has no matching remedy"),
        }
    }

    /// The safety that blocks this attack (and intercepts it as a coup
    /// fourre).
    ///
    /// ## Panics
    ///
    /// Panics for non-attack cards.
    #[must_use]
    pub fn blocking_safety(self) -> Card {
        match self {
            Card::FlatTire => Card::PunctureProof,
            Card::OutOfGas => Card::ExtraTank,
            Card::Accident => Card::DrivingAce,
            Card::Stop | Card::SpeedLimit => Card::RightOfWay,
            other => panic!("{other:?} is not an attack card"),
        }
    }

    /// The safety that grants the same benefit as this remedy.
    ///
    /// ## Panics
    ///
    /// Panics for non-remedy cards.
    #[must_use]
    pub fn matching_safety(self) -> Card {
        match self {
            Card::SpareTire => Card::PunctureProof,
            Card::Gasoline => Card::ExtraTank,
            Card::Repairs => Card::DrivingAce,
            Card::Go | Card::EndOfLimit => Card::RightOfWay,
            other => panic!("{other:?} is not a remedy card"),
        }
    }

    /// The attack this remedy fixes.
    ///
    /// ## Panics
    ///
    /// Panics for non-remedy cards.
    #[must_use]
    pub fn matching_attack(self) -> Card {
        match self {
            Card::SpareTire => Card::FlatTire,
            Card::Gasoline => Card::OutOfGas,
            Card::Repairs => Card::Accident,
            Card::Go => Card::Stop,
            Card::EndOfLimit => Card::SpeedLimit,
            other => panic!("{other:?} is not a remedy card"),
        }
    }

    /// Wire encoding (0–18).
    #[must_use]
    pub fn wire(self) -> u8 {
        self as u8
    }

    /// Decode a wire byte. Returns `None` for values outside 0–18.
    #[must_use]
    pub fn from_wire(byte: u8) -> Option<Card> {
        ALL_CARDS.get(byte as usize).copied()
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Card::Mileage25 => "25 Miles",
            Card::Mileage50 => "50 Miles",
            Card::Mileage75 => "75 Miles",
            Card::Mileage100 => "100 Miles",
            Card::Mileage200 => "200 Miles",
            Card::SpareTire => "Spare Tire",
            Card::Gasoline => "Gasoline",
            Card::Repairs => "Repairs",
            Card::Go => "Go",
            Card::EndOfLimit => "End of Limit",
            Card::FlatTire => "Flat Tire",
            Card::OutOfGas => "Out of Gas",
            Card::Accident => "Accident",
            Card::Stop => "Stop",
            Card::SpeedLimit => "Speed Limit",
            Card::PunctureProof => "Puncture Proof",
            Card::ExtraTank => "Extra Tank",
            Card::DrivingAce => "Driving Ace",
            Card::RightOfWay => "Right of Way",
        };
        f.write_str(label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_is_total() {
        let mut counts = [0usize; 4];
        for card in ALL_CARDS {
            match card.card_type() {
                CardType::Mileage => counts[0] += 1,
                CardType::Remedy => counts[1] += 1,
                CardType::Attack => counts[2] += 1,
                CardType::Safety => counts[3] += 1,
            }
        }
        assert_eq!(counts, [5, 5, 5, 4]);
    }

    #[test]
    fn test_mileage_values() {
        assert_eq!(Card::Mileage25.mileage_value(), 25);
        assert_eq!(Card::Mileage50.mileage_value(), 50);
        assert_eq!(Card::Mileage75.mileage_value(), 75);
        assert_eq!(Card::Mileage100.mileage_value(), 100);
        assert_eq!(Card::Mileage200.mileage_value(), 200);
    }

    #[test]
    #[should_panic(expected = "not a mileage card")]
    fn test_mileage_value_wrong_category() {
        Card::Go.mileage_value();
    }

    #[test]
    fn test_attack_cross_references() {
        assert_eq!(Card::FlatTire.remedy(), Card::SpareTire);
        assert_eq!(Card::OutOfGas.remedy(), Card::Gasoline);
        assert_eq!(Card::Accident.remedy(), Card::Repairs);
        assert_eq!(Card::Stop.remedy(), Card::Go);

        assert_eq!(Card::FlatTire.blocking_safety(), Card::PunctureProof);
        assert_eq!(Card::OutOfGas.blocking_safety(), Card::ExtraTank);
        assert_eq!(Card::Accident.blocking_safety(), Card::DrivingAce);
        assert_eq!(Card::Stop.blocking_safety(), Card::RightOfWay);
        assert_eq!(Card::SpeedLimit.blocking_safety(), Card::RightOfWay);
    }

    #[test]
    #[should_panic(expected = "has no matching remedy")]
    fn test_speed_limit_has_no_remedy() {
        Card::SpeedLimit.remedy();
    }

    #[test]
    fn test_remedy_cross_references() {
        for remedy in [Card::SpareTire, Card::Gasoline, Card::Repairs, Card::Go] {
            // remedy -> attack -> remedy is the identity
            assert_eq!(remedy.matching_attack().remedy(), remedy);
        }
        assert_eq!(Card::EndOfLimit.matching_attack(), Card::SpeedLimit);

        assert_eq!(Card::Go.matching_safety(), Card::RightOfWay);
        assert_eq!(Card::EndOfLimit.matching_safety(), Card::RightOfWay);
        assert_eq!(Card::SpareTire.matching_safety(), Card::PunctureProof);
    }

    #[test]
    #[should_panic(expected = "is not a remedy card")]
    fn test_matching_attack_wrong_category() {
        Card::Mileage25.matching_attack();
    }

    #[test]
    fn test_wire_round_trip() {
        for card in ALL_CARDS {
            assert_eq!(Card::from_wire(card.wire()), Some(card));
        }
        assert_eq!(Card::from_wire(19), None);
        assert_eq!(Card::from_wire(0xFF), None);
    }

    #[test]
    fn test_labels() {
        assert_eq!(Card::Mileage25.to_string(), "25 Miles");
        assert_eq!(Card::RightOfWay.to_string(), "Right of Way");
        assert_eq!(Card::EndOfLimit.to_string(), "End of Limit");
    }

    #[test]
    fn test_serde_round_trip() {
        for card in ALL_CARDS {
            let json = serde_json::to_string(&card).unwrap();
            let back: Card = serde_json::from_str(&json).unwrap();
            assert_eq!(card, back);
        }
    }
}
