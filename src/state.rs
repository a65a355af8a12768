//! Restricted per-player game state.
//!
//! ## PlayerView
//!
//! The engine never hands drivers a reference into its canonical state.
//! Each decision point gets a fresh `PlayerView`: an owned snapshot of the
//! acting player's hand, their own team, deep copies of every other team,
//! and the shared discard pile (a persistent vector, so the clone is
//! cheap). A driver can scribble on its view all it likes; nothing leaks
//! back.
//!
//! ## Legality
//!
//! `find_valid_plays` enumerates exactly the rules-legal move set, with no
//! duplicates, in deterministic order: hand order, then per-opponent in
//! team-number order for attacks.

use crate::cards::{Card, CardType};
use crate::moves::Move;
use crate::player::Hand;
use crate::team::Team;
use im::Vector;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// A frozen, per-decision snapshot of everything one player may see.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PlayerView {
    /// The acting player's hand.
    pub hand: Hand,
    /// The shared discard pile, oldest first.
    pub discard_pile: Vector<Card>,
    /// The acting player's team.
    pub us: Team,
    /// Every other team, in team-number order.
    pub opponents: Vec<Team>,
    /// The legal moves for this decision.
    pub valid_moves: Vec<Move>,
    /// Distance that completes the trip (700 or 1000).
    pub target: i32,
    /// Cards remaining in the draw pile.
    pub cards_left: usize,
}

impl PlayerView {
    /// Look up a team in the view by number.
    #[must_use]
    pub fn team(&self, number: usize) -> Option<&Team> {
        if self.us.number == number {
            return Some(&self.us);
        }
        self.opponents.iter().find(|t| t.number == number)
    }

    /// Enumerate the legal moves for this view.
    ///
    /// Returned set invariants: exactly the rules-legal moves, no
    /// duplicates (duplicate cards in hand yield one entry), deterministic
    /// order.
    #[must_use]
    pub fn find_valid_plays(&self) -> Vec<Move> {
        let mut moves = Vec::new();
        let mut seen: SmallVec<[Card; 8]> = SmallVec::new();

        for &card in &self.hand {
            if seen.contains(&card) {
                continue;
            }
            seen.push(card);

            // You can always discard
            moves.push(Move::discard(card));

            let card_type = card.card_type();
            let playable = Some(card) == self.us.need_remedy
                || (card == Card::EndOfLimit && self.us.speed_limit)
                || (self.us.moving
                    && card_type == CardType::Mileage
                    && (!self.us.speed_limit || card.is_low_mileage())
                    && (self.us.two_hundreds_played < 2 || card != Card::Mileage200)
                    && self.us.mileage + card.mileage_value() <= self.target)
                || card_type == CardType::Safety;

            if playable {
                moves.push(Move::play(card));
            } else if card_type == CardType::Attack {
                for opponent in &self.opponents {
                    let eligible = if card == Card::SpeedLimit {
                        !opponent.speed_limit && !opponent.has_safety(Card::RightOfWay)
                    } else {
                        opponent.moving && !opponent.has_safety(card.blocking_safety())
                    };
                    if eligible {
                        moves.push(Move::attack(card, opponent.number));
                    }
                }
            }
        }

        moves
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn view_with(hand: &[Card]) -> PlayerView {
        let mut us = Team::new(0);
        us.seats = vec![0];
        let mut opponent = Team::new(1);
        opponent.seats = vec![1];
        PlayerView {
            hand: hand.iter().copied().collect(),
            discard_pile: Vector::new(),
            us,
            opponents: vec![opponent],
            valid_moves: Vec::new(),
            target: 700,
            cards_left: 50,
        }
    }

    fn plays(view: &PlayerView) -> Vec<Move> {
        view.find_valid_plays()
            .into_iter()
            .filter(|m| m.kind == crate::moves::MoveKind::Play)
            .collect()
    }

    #[test]
    fn test_every_hand_card_is_discardable() {
        let view = view_with(&[Card::Mileage25, Card::Stop, Card::RightOfWay]);
        let moves = view.find_valid_plays();
        for &card in &view.hand {
            assert!(moves.contains(&Move::discard(card)));
        }
    }

    #[test]
    fn test_discards_come_only_from_hand() {
        let view = view_with(&[Card::Mileage25]);
        for mv in view.find_valid_plays() {
            assert!(view.hand.contains(&mv.card));
        }
    }

    #[test]
    fn test_duplicate_cards_yield_one_move() {
        let view = view_with(&[Card::Mileage25, Card::Mileage25, Card::Mileage25]);
        let moves = view.find_valid_plays();
        assert_eq!(moves.len(), 1); // one discard; team is stopped
        assert_eq!(moves[0], Move::discard(Card::Mileage25));
    }

    #[test]
    fn test_stopped_team_cannot_play_mileage() {
        let view = view_with(&[Card::Mileage100]);
        assert!(plays(&view).is_empty());
    }

    #[test]
    fn test_moving_team_plays_mileage() {
        let mut view = view_with(&[Card::Mileage100]);
        view.us.moving = true;
        view.us.need_remedy = None;
        assert_eq!(plays(&view), vec![Move::play(Card::Mileage100)]);
    }

    #[test]
    fn test_speed_limit_allows_only_low_mileage() {
        let mut view = view_with(&[Card::Mileage25, Card::Mileage50, Card::Mileage75, Card::Mileage100]);
        view.us.moving = true;
        view.us.need_remedy = None;
        view.us.speed_limit = true;
        assert_eq!(
            plays(&view),
            vec![Move::play(Card::Mileage25), Move::play(Card::Mileage50)]
        );
    }

    #[test]
    fn test_third_two_hundred_is_never_legal() {
        let mut view = view_with(&[Card::Mileage200]);
        view.us.moving = true;
        view.us.need_remedy = None;
        view.us.two_hundreds_played = 2;
        assert!(plays(&view).is_empty());

        view.us.two_hundreds_played = 1;
        assert_eq!(plays(&view), vec![Move::play(Card::Mileage200)]);
    }

    #[test]
    fn test_mileage_may_not_overshoot_target() {
        let mut view = view_with(&[Card::Mileage100, Card::Mileage25]);
        view.us.moving = true;
        view.us.need_remedy = None;
        view.us.mileage = 675;
        assert_eq!(plays(&view), vec![Move::play(Card::Mileage25)]);
    }

    #[test]
    fn test_remedy_must_match_need() {
        let mut view = view_with(&[Card::SpareTire, Card::Repairs]);
        view.us.need_remedy = Some(Card::Repairs);
        assert_eq!(plays(&view), vec![Move::play(Card::Repairs)]);
    }

    #[test]
    fn test_end_of_limit_requires_speed_limit() {
        let mut view = view_with(&[Card::EndOfLimit]);
        assert!(plays(&view).is_empty());

        view.us.speed_limit = true;
        assert_eq!(plays(&view), vec![Move::play(Card::EndOfLimit)]);
    }

    #[test]
    fn test_safety_is_always_legal() {
        let view = view_with(&[Card::DrivingAce]);
        assert_eq!(plays(&view), vec![Move::play(Card::DrivingAce)]);
    }

    #[test]
    fn test_attack_requires_moving_target() {
        let mut view = view_with(&[Card::Stop]);
        assert!(plays(&view).is_empty());

        view.opponents[0].moving = true;
        view.opponents[0].need_remedy = None;
        assert_eq!(plays(&view), vec![Move::attack(Card::Stop, 1)]);
    }

    #[test]
    fn test_attack_blocked_by_safety() {
        let mut view = view_with(&[Card::FlatTire]);
        view.opponents[0].moving = true;
        view.opponents[0].safeties.push(Card::PunctureProof);
        assert!(plays(&view).is_empty());
    }

    #[test]
    fn test_speed_limit_attack_eligibility() {
        let mut view = view_with(&[Card::SpeedLimit]);
        // Target need not be moving
        assert_eq!(plays(&view), vec![Move::attack(Card::SpeedLimit, 1)]);

        // But not if already limited
        view.opponents[0].speed_limit = true;
        assert!(plays(&view).is_empty());

        // Or protected by Right of Way
        view.opponents[0].speed_limit = false;
        view.opponents[0].safeties.push(Card::RightOfWay);
        assert!(plays(&view).is_empty());
    }

    #[test]
    fn test_attack_generates_one_move_per_eligible_opponent() {
        let mut view = view_with(&[Card::Stop]);
        let mut third = Team::new(2);
        third.seats = vec![2];
        third.moving = true;
        third.need_remedy = None;
        view.opponents[0].moving = true;
        view.opponents[0].need_remedy = None;
        view.opponents.push(third);

        assert_eq!(
            plays(&view),
            vec![Move::attack(Card::Stop, 1), Move::attack(Card::Stop, 2)]
        );
    }

    #[test]
    fn test_order_follows_hand_order() {
        let mut view = view_with(&[Card::Go, Card::Mileage50, Card::DrivingAce]);
        view.us.need_remedy = Some(Card::Go);
        let moves = view.find_valid_plays();
        assert_eq!(
            moves,
            vec![
                Move::discard(Card::Go),
                Move::play(Card::Go),
                Move::discard(Card::Mileage50),
                Move::discard(Card::DrivingAce),
                Move::play(Card::DrivingAce),
            ]
        );
    }

    #[test]
    fn test_team_lookup() {
        let view = view_with(&[]);
        assert_eq!(view.team(0).unwrap().number, 0);
        assert_eq!(view.team(1).unwrap().number, 1);
        assert!(view.team(5).is_none());
    }
}
