//! Full-game integration tests: the engine playing complete games with
//! real drivers. Card conservation is asserted inside the engine on every
//! turn of a debug build, so every test here exercises it for free.

use mille::{
    BasicDriver, Card, Driver, Game, GameError, Move, PlayerView, POINTS_TO_WIN,
};

fn boxed<D: Driver + 'static>(driver: D) -> Box<dyn Driver> {
    Box::new(driver)
}

fn basic_game(count: usize, seed: u64) -> Game {
    Game::builder()
        .drivers((0..count).map(|_| boxed(BasicDriver::new())))
        .shuffle_seats(false)
        .build(seed)
        .unwrap()
}

#[test]
fn two_player_game_runs_to_completion() {
    let mut game = basic_game(2, 42);
    let outcome = game.play().unwrap();

    assert!(outcome.winning_team < 2);
    let winner = &game.teams()[outcome.winning_team];
    assert!(winner.total_score >= POINTS_TO_WIN);
    assert_eq!(outcome.wins_by_name.get("BasicDriver"), Some(&1));

    // The winning team is the highest scorer.
    for team in game.teams() {
        assert!(team.total_score <= winner.total_score);
    }
}

#[test]
fn three_player_game_forms_three_teams() {
    let mut game = basic_game(3, 7);
    assert_eq!(game.teams().len(), 3);
    let outcome = game.play().unwrap();
    assert!(game.teams()[outcome.winning_team].total_score >= POINTS_TO_WIN);
}

#[test]
fn four_player_game_races_to_1000() {
    let mut game = basic_game(4, 11);
    assert_eq!(game.target(), 1000);
    let outcome = game.play().unwrap();
    // Partners share the win: two seats, one name.
    assert_eq!(outcome.wins_by_name.get("BasicDriver"), Some(&2));
}

#[test]
fn six_player_game_pairs_seats_across_teams() {
    let mut game = basic_game(6, 5);
    assert_eq!(game.teams().len(), 3);
    for team in game.teams() {
        assert_eq!(team.seats.len(), 2);
    }
    game.play().unwrap();
}

#[test]
fn same_seed_reproduces_the_same_game() {
    let mut first = basic_game(2, 1234);
    let mut second = basic_game(2, 1234);

    let outcome_a = first.play().unwrap();
    let outcome_b = second.play().unwrap();

    assert_eq!(outcome_a.winning_team, outcome_b.winning_team);
    for (a, b) in first.teams().iter().zip(second.teams()) {
        assert_eq!(a.total_score, b.total_score);
    }
}

#[test]
fn reset_prepares_the_game_for_reuse() {
    let mut game = basic_game(2, 9);
    game.play().unwrap();
    assert!(game.teams().iter().any(|t| t.total_score > 0));

    game.reset();
    assert!(game.teams().iter().all(|t| t.total_score == 0));
    assert!(game.discard_pile().is_empty());
    assert_eq!(game.target(), 700);

    let outcome = game.play().unwrap();
    assert!(game.teams()[outcome.winning_team].total_score >= POINTS_TO_WIN);
}

/// A driver that never returns a legal move. The engine must substitute a
/// forced discard every turn and keep the game well-formed.
struct RogueDriver;

impl Driver for RogueDriver {
    fn name(&self) -> &str {
        "RogueDriver"
    }

    fn choose_move(&mut self, _view: &PlayerView) -> Move {
        // "Attacking" with a remedy is never in the legal set.
        Move::attack(Card::Go, 0)
    }
}

#[test]
fn illegal_moves_are_recovered_not_fatal() {
    let mut game = Game::builder()
        .driver(boxed(RogueDriver))
        .driver(boxed(BasicDriver::new()))
        .shuffle_seats(false)
        .build(21)
        .unwrap();

    let outcome = game.play().unwrap();
    // The rogue only ever discards, so the basic driver's team wins.
    assert_eq!(outcome.winning_team, 1);
    assert_eq!(outcome.wins_by_name.get("BasicDriver"), Some(&1));
    assert!(outcome.wins_by_name.get("RogueDriver").is_none());
}

#[test]
fn safety_uniqueness_holds_across_a_game() {
    // Each safety exists once, so at any hand's end at most one team can
    // hold it. The final hand's piles are still visible after play().
    let mut game = basic_game(2, 77);
    game.play().unwrap();

    for safety in [
        Card::PunctureProof,
        Card::ExtraTank,
        Card::DrivingAce,
        Card::RightOfWay,
    ] {
        let holders = game
            .teams()
            .iter()
            .filter(|t| t.safeties.contains(&safety))
            .count();
        assert!(holders <= 1, "{safety} held by {holders} teams");
    }
}

#[test]
fn invalid_player_counts_fail_at_setup() {
    for count in [0, 1, 5, 7, 8] {
        let result = Game::builder()
            .drivers((0..count).map(|_| boxed(BasicDriver::new())))
            .build(1);
        assert!(
            matches!(result, Err(GameError::InvalidPlayerCount(c)) if c == count),
            "count {count} should be rejected"
        );
    }
}
