//! The decision-making collaborator contract.
//!
//! One `Driver` is bound per seat. The engine calls it at the three
//! decision points (move choice, coup-fourre interception, extension
//! declaration) and pushes passive notifications for everything else.
//! All calls are synchronous and block the turn loop; a driver only ever
//! receives owned [`PlayerView`] snapshots and can never reach the
//! engine's canonical state.
//!
//! Two reference implementations live here: [`BasicDriver`], a greedy
//! baseline, and [`RandomDriver`], a seeded uniform-random driver used by
//! the round-trip fuzz tests. Anything smarter belongs outside this crate.

use crate::cards::{Card, CardType};
use crate::moves::{Move, MoveKind};
use crate::rng::GameRng;
use crate::state::PlayerView;

/// Per-seat decision maker.
///
/// `choose_move` must return a member of `view.valid_moves`; the engine
/// substitutes a forced discard (with a warning) otherwise, so a buggy
/// driver degrades the game but never corrupts it.
pub trait Driver {
    /// Name used in transcripts, outcomes, and display.
    fn name(&self) -> &str;

    /// Pick a move from `view.valid_moves`.
    fn choose_move(&mut self, view: &PlayerView) -> Move;

    /// Intercept `attack` with a held safety? Asked only when this seat
    /// actually holds the matching safety.
    fn play_coup_fourre(&mut self, attack: Card, view: &PlayerView) -> bool {
        let _ = (attack, view);
        false
    }

    /// Continue past 700 to 1000 for extra points?
    fn go_for_extension(&mut self, view: &PlayerView) -> bool {
        let _ = view;
        false
    }

    /// The game is starting; `view` is the initial restricted snapshot.
    fn game_started(&mut self, view: &PlayerView) {
        let _ = view;
    }

    /// This seat drew `card`.
    fn card_drawn(&mut self, card: Card) {
        let _ = card;
    }

    /// Some seat (possibly this one) made a move. Hands stay hidden; only
    /// the seat and team numbers travel.
    fn move_played(&mut self, seat: usize, team: usize, mv: &Move) {
        let _ = (seat, team, mv);
    }

    /// The hand is over; `summary` is the human-readable score breakdown.
    fn hand_ended(&mut self, summary: &str) {
        let _ = summary;
    }

    /// The hand is over; structured scores, indexed by team number.
    fn hand_scores(&mut self, hand_scores: &[i32], total_scores: &[i32]) {
        let _ = (hand_scores, total_scores);
    }
}

/// About the dumbest driver that still plays a credible game: mileage if
/// possible, then attacks, remedies, safeties, and finally a discard.
#[derive(Clone, Copy, Debug, Default)]
pub struct BasicDriver;

impl BasicDriver {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Driver for BasicDriver {
    fn name(&self) -> &str {
        "BasicDriver"
    }

    fn choose_move(&mut self, view: &PlayerView) -> Move {
        let of_type = |t: CardType| {
            view.valid_moves
                .iter()
                .find(|m| m.kind == MoveKind::Play && m.card.card_type() == t)
                .copied()
        };

        of_type(CardType::Mileage)
            .or_else(|| of_type(CardType::Attack))
            .or_else(|| of_type(CardType::Remedy))
            .or_else(|| of_type(CardType::Safety))
            .unwrap_or_else(|| {
                *view
                    .valid_moves
                    .first()
                    .expect("discards make the legal set non-empty")
            })
    }

    fn play_coup_fourre(&mut self, _attack: Card, _view: &PlayerView) -> bool {
        true
    }

    fn go_for_extension(&mut self, _view: &PlayerView) -> bool {
        true
    }
}

/// Picks uniformly among the legal moves. Deterministic for a given seed;
/// the per-instance RNG keeps concurrent simulations independent.
#[derive(Clone, Debug)]
pub struct RandomDriver {
    rng: GameRng,
}

impl RandomDriver {
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            rng: GameRng::new(seed),
        }
    }
}

impl Driver for RandomDriver {
    fn name(&self) -> &str {
        "RandomDriver"
    }

    fn choose_move(&mut self, view: &PlayerView) -> Move {
        *self
            .rng
            .choose(&view.valid_moves)
            .expect("discards make the legal set non-empty")
    }

    fn play_coup_fourre(&mut self, _attack: Card, _view: &PlayerView) -> bool {
        self.rng.gen_bool(0.5)
    }

    fn go_for_extension(&mut self, _view: &PlayerView) -> bool {
        self.rng.gen_bool(0.5)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::team::Team;
    use im::Vector;

    fn view(valid_moves: Vec<Move>) -> PlayerView {
        PlayerView {
            hand: valid_moves.iter().map(|m| m.card).collect(),
            discard_pile: Vector::new(),
            us: Team::new(0),
            opponents: vec![Team::new(1)],
            valid_moves,
            target: 700,
            cards_left: 10,
        }
    }

    #[test]
    fn test_basic_driver_prefers_mileage() {
        let mut driver = BasicDriver::new();
        let chosen = driver.choose_move(&view(vec![
            Move::discard(Card::Stop),
            Move::attack(Card::Stop, 1),
            Move::play(Card::Mileage75),
        ]));
        assert_eq!(chosen, Move::play(Card::Mileage75));
    }

    #[test]
    fn test_basic_driver_attacks_when_stuck() {
        let mut driver = BasicDriver::new();
        let chosen = driver.choose_move(&view(vec![
            Move::discard(Card::Stop),
            Move::attack(Card::Stop, 1),
        ]));
        assert_eq!(chosen, Move::attack(Card::Stop, 1));
    }

    #[test]
    fn test_basic_driver_falls_back_to_discard() {
        let mut driver = BasicDriver::new();
        let chosen = driver.choose_move(&view(vec![Move::discard(Card::Mileage25)]));
        assert_eq!(chosen, Move::discard(Card::Mileage25));
    }

    #[test]
    fn test_random_driver_is_seed_deterministic() {
        let moves = vec![
            Move::discard(Card::Go),
            Move::play(Card::Go),
            Move::discard(Card::Mileage100),
        ];
        let mut a = RandomDriver::new(7);
        let mut b = RandomDriver::new(7);
        for _ in 0..20 {
            assert_eq!(a.choose_move(&view(moves.clone())), b.choose_move(&view(moves.clone())));
        }
    }

    #[test]
    fn test_random_driver_stays_legal() {
        let moves = vec![Move::discard(Card::Go), Move::play(Card::Go)];
        let mut driver = RandomDriver::new(3);
        for _ in 0..50 {
            assert!(moves.contains(&driver.choose_move(&view(moves.clone()))));
        }
    }
}
