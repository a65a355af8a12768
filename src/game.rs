//! The game engine: hands, turns, interrupts, and scoring.
//!
//! ## Turn state machine
//!
//! Each hand runs *dealing* → *turn-loop* → *hand-resolution*. The turn
//! loop draws for the current seat, asks its driver for a move, broadcasts
//! it, and applies it through [`Game::handle_move`] — the single
//! move-application routine shared with transcript replay, which is what
//! makes replayed games land on identical state and scores.
//!
//! ## Non-local turn order
//!
//! Two events break the normal rotation: a safety play grants an extra
//! turn, and a coup fourre hands the next turn to the interceptor.
//! `handle_move` reports these as a [`TurnEvent`] and [`next_seat`] maps
//! (event, seat) to the seat that acts next, so the redirections are one
//! auditable table rather than scattered pointer twiddling.
//!
//! ## Coup fourre
//!
//! An attack always lands first and is remembered as the pending attack.
//! Acceptance of the intercept then routes a synthetic coup-fourre move
//! through `handle_move`, which voids the pending attack (the attack card
//! goes to the discard pile, the victim's state is restored), plays the
//! safety, and redirects the turn. Live play asks the holding seat before
//! the attack is applied, exactly like the original rules; replay gets the
//! answer from the control record. Either way the same two applications
//! run in the same order.

use std::fmt::Write as _;
use std::io;

use im::Vector;
use rustc_hash::FxHashMap;
use tracing::{debug, warn};

use crate::cards::{Card, CardType};
use crate::deck::{Deck, HAND_SIZE};
use crate::driver::Driver;
use crate::error::{GameError, TranscriptError};
use crate::moves::{Move, MoveKind};
use crate::player::Player;
use crate::rng::GameRng;
use crate::state::PlayerView;
use crate::team::Team;
use crate::transcript::{TranscriptWriter, MAX_PLAYERS, MAX_TEAMS};

/// Total score at which the game ends.
pub const POINTS_TO_WIN: i32 = 5000;

/// What a move application means for turn order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TurnEvent {
    /// Normal rotation to the next seat.
    Advance,
    /// A safety play grants the acting seat another turn.
    ExtraTurn,
    /// A coup fourre hands the next turn to the interceptor.
    Interrupt { seat: usize },
    /// The trip is complete; the hand is over.
    TripComplete,
}

/// Transition table for turn order: which seat acts after `current`,
/// given the event its move produced and the seat that would follow under
/// normal rotation.
#[must_use]
pub fn next_seat(event: TurnEvent, current: usize, rotation: usize) -> usize {
    match event {
        TurnEvent::Advance => rotation,
        TurnEvent::ExtraTurn => current,
        TurnEvent::Interrupt { seat } => seat,
        TurnEvent::TripComplete => current,
    }
}

/// Result of a completed game.
#[derive(Clone, Debug)]
pub struct GameOutcome {
    /// The team with the highest total score (lowest team number on ties).
    pub winning_team: usize,
    /// Win counts keyed by driver name; a name fielding several seats on
    /// the winning team is counted once per seat.
    pub wins_by_name: FxHashMap<String, u32>,
}

/// Builder for a live game.
///
/// Seats are assigned to teams round-robin after an optional seating
/// shuffle, driven by the same seed as the deck shuffles.
pub struct GameBuilder {
    drivers: Vec<Box<dyn Driver>>,
    shuffle_seats: bool,
}

impl GameBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self {
            drivers: Vec::new(),
            shuffle_seats: true,
        }
    }

    /// Add one seat.
    #[must_use]
    pub fn driver(mut self, driver: Box<dyn Driver>) -> Self {
        self.drivers.push(driver);
        self
    }

    /// Add several seats.
    #[must_use]
    pub fn drivers(mut self, drivers: impl IntoIterator<Item = Box<dyn Driver>>) -> Self {
        self.drivers.extend(drivers);
        self
    }

    /// Whether to shuffle the seating order (default: true). Turn it off
    /// for reproducible seat assignment in tests.
    #[must_use]
    pub fn shuffle_seats(mut self, shuffle: bool) -> Self {
        self.shuffle_seats = shuffle;
        self
    }

    /// Validate the seat count and build the game.
    ///
    /// 2 or 4 players form 2 teams; 3 or 6 players form 3 teams. Any other
    /// count is rejected before a hand begins.
    pub fn build(self, seed: u64) -> Result<Game, GameError> {
        let count = self.drivers.len();
        let team_count = match count {
            2 | 4 => 2,
            3 | 6 => 3,
            _ => return Err(GameError::InvalidPlayerCount(count)),
        };

        let mut rng = GameRng::new(seed);
        let mut drivers = self.drivers;
        if self.shuffle_seats {
            rng.shuffle(&mut drivers);
        }

        let mut teams: Vec<Team> = (0..team_count).map(Team::new).collect();
        let mut players = Vec::with_capacity(count);
        for (seat, driver) in drivers.into_iter().enumerate() {
            let team = seat % team_count;
            teams[team].seats.push(seat);
            players.push(Player::new(seat, team, driver));
        }

        let (target, extension_possible) = initial_target(count);
        Ok(Game {
            players,
            teams,
            deck: Deck::empty(),
            discard_pile: Vector::new(),
            target,
            extension_possible,
            winner: None,
            trip_complete: false,
            delayed_action: false,
            extension: false,
            last_attack: None,
            rng,
            transcript: None,
        })
    }
}

impl Default for GameBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// 4-player games race straight to 1000 with no extension; everyone else
/// starts at 700 with the extension available once per game.
fn initial_target(player_count: usize) -> (i32, bool) {
    if player_count == 4 {
        (1000, false)
    } else {
        (700, true)
    }
}

/// Canonical game state, exclusively engine-owned. Drivers and transcript
/// consumers only ever see copies.
pub struct Game {
    pub(crate) players: Vec<Player>,
    pub(crate) teams: Vec<Team>,
    pub(crate) deck: Deck,
    pub(crate) discard_pile: Vector<Card>,
    pub(crate) target: i32,
    pub(crate) extension_possible: bool,

    // Hand-scoped flags, cleared by `reset_hand_state`.
    pub(crate) winner: Option<usize>,
    pub(crate) trip_complete: bool,
    pub(crate) delayed_action: bool,
    pub(crate) extension: bool,
    /// The most recently landed attack (victim team, card), voidable by an
    /// immediately following coup fourre.
    pub(crate) last_attack: Option<(usize, Card)>,

    rng: GameRng,
    transcript: Option<TranscriptWriter<Box<dyn io::Write>>>,
}

impl Game {
    /// Start building a live game.
    #[must_use]
    pub fn builder() -> GameBuilder {
        GameBuilder::new()
    }

    /// Reconstruct a game shell from transcript header data. No deck, no
    /// drivers; hands and draws come from the records.
    pub(crate) fn replay_shell(players: Vec<Player>, teams: Vec<Team>) -> Self {
        let (target, extension_possible) = initial_target(players.len());
        Self {
            players,
            teams,
            deck: Deck::empty(),
            discard_pile: Vector::new(),
            target,
            extension_possible,
            winner: None,
            trip_complete: false,
            delayed_action: false,
            extension: false,
            last_attack: None,
            rng: GameRng::new(0),
            transcript: None,
        }
    }

    // === Accessors ===

    #[must_use]
    pub fn players(&self) -> &[Player] {
        &self.players
    }

    #[must_use]
    pub fn teams(&self) -> &[Team] {
        &self.teams
    }

    /// Distance that completes the trip for the current hand.
    #[must_use]
    pub fn target(&self) -> i32 {
        self.target
    }

    /// The shared discard pile, oldest first.
    #[must_use]
    pub fn discard_pile(&self) -> &Vector<Card> {
        &self.discard_pile
    }

    /// Cards left in the draw pile (0 during replay).
    #[must_use]
    pub fn cards_left(&self) -> usize {
        self.deck.cards_left()
    }

    /// Whether the deck ran out during the current hand.
    #[must_use]
    pub fn delayed_action(&self) -> bool {
        self.delayed_action
    }

    /// Whether an extension was declared during the current hand.
    #[must_use]
    pub fn extension(&self) -> bool {
        self.extension
    }

    /// The team that completed the trip this hand, if any.
    #[must_use]
    pub fn winner(&self) -> Option<usize> {
        self.winner
    }

    pub(crate) fn pending_attack(&self) -> Option<(usize, Card)> {
        self.last_attack
    }

    // === Setup ===

    /// Attach a transcript writer. Everything `play` does from here on is
    /// recorded. Format limits (4 teams, 6 players) are enforced now,
    /// before any hand begins.
    pub fn record_to<W: io::Write + 'static>(&mut self, sink: W) -> Result<(), TranscriptError> {
        if self.teams.len() > MAX_TEAMS {
            return Err(TranscriptError::TooManyTeams(self.teams.len()));
        }
        if self.players.len() > MAX_PLAYERS {
            return Err(TranscriptError::TooManyPlayers(self.players.len()));
        }
        self.transcript = Some(TranscriptWriter::new(Box::new(sink)));
        Ok(())
    }

    /// Prepare this object for a fresh game with the same seats: totals
    /// zeroed, discard cleared, target and extension availability
    /// re-derived from the player count.
    pub fn reset(&mut self) {
        self.discard_pile.clear();
        let (target, extension_possible) = initial_target(self.players.len());
        self.target = target;
        self.extension_possible = extension_possible;
        for team in &mut self.teams {
            team.total_score = 0;
        }
    }

    // === Orchestration ===

    /// Run a complete game: hands until some team's total reaches
    /// [`POINTS_TO_WIN`].
    pub fn play(&mut self) -> Result<GameOutcome, GameError> {
        if let Some(writer) = self.transcript.as_mut() {
            writer.write_game_start(&self.players)?;
        }

        let mut winning_team = 0;
        let mut winning_score = 0;
        let mut first_hand = true;

        loop {
            self.play_hand(first_hand)?;
            first_hand = false;

            let mut game_over = false;
            for team in &self.teams {
                if team.total_score > winning_score {
                    winning_score = team.total_score;
                    winning_team = team.number;
                }
                if team.total_score >= POINTS_TO_WIN {
                    game_over = true;
                }
            }
            if game_over {
                break;
            }
        }

        if let Some(writer) = self.transcript.as_mut() {
            writer.write_game_end()?;
        }

        debug!(winning_team, winning_score, "game over");

        let mut wins_by_name: FxHashMap<String, u32> = FxHashMap::default();
        for &seat in &self.teams[winning_team].seats {
            *wins_by_name.entry(self.players[seat].name.clone()).or_insert(0) += 1;
        }
        Ok(GameOutcome {
            winning_team,
            wins_by_name,
        })
    }

    /// Play a single hand: deal, run the turn loop, then score.
    fn play_hand(&mut self, first_hand: bool) -> Result<(), GameError> {
        self.reset_hand_state();

        self.deck = Deck::shuffled(&mut self.rng);
        for seat in 0..self.players.len() {
            self.players[seat].hand = self.deck.deal(HAND_SIZE);
        }

        if let Some(writer) = self.transcript.as_mut() {
            writer.write_hand_start(&self.players)?;
        }

        if first_hand {
            for seat in 0..self.players.len() {
                let view = self.player_view(seat);
                if let Some(driver) = self.players[seat].driver.as_mut() {
                    driver.game_started(&view);
                }
            }
        }

        let seat_count = self.players.len();
        let mut current = 0;
        let mut rotation = 1 % seat_count;

        loop {
            #[cfg(debug_assertions)]
            self.assert_conservation();

            // 1. Draw, or flag the exhaustion.
            let drawn = self.deck.draw();
            match drawn {
                Some(card) => {
                    self.players[current].hand.push(card);
                    if let Some(driver) = self.players[current].driver.as_mut() {
                        driver.card_drawn(card);
                    }
                }
                None => self.delayed_action = true,
            }

            // 2. Out of cards: pass, or end the hand if everyone is.
            if self.players[current].hand.is_empty() {
                if self.players.iter().all(|p| p.hand.is_empty()) {
                    break;
                }
                current = rotation;
                rotation = (rotation + 1) % seat_count;
                continue;
            }

            // 3. Ask the driver; recover from illegal choices.
            let mut view = self.player_view(current);
            view.valid_moves = view.find_valid_plays();
            let chosen = self
                .driver_mut(current)
                .choose_move(&view);
            let mv = if view.valid_moves.contains(&chosen) {
                chosen
            } else {
                warn!(seat = current, play = %chosen, "invalid play; substituting a discard");
                Move::discard(self.players[current].hand[0])
            };
            debug!(seat = current, play = %mv, "move chosen");

            // The extension question is put to the driver before the move
            // applies: the stream wants the control record ahead of the
            // move record.
            let declared_extension = self.offer_extension(current, &mv);

            // 4. Record and broadcast, then 5. apply.
            if let Some(writer) = self.transcript.as_mut() {
                writer.write_move(current, drawn, &mv, declared_extension)?;
            }
            self.notify_players(current, &mv);

            // The interception question goes to the first seat on the
            // victim team holding the matching safety, while the attack is
            // still in the air.
            let interceptor = match (mv.kind, mv.card.card_type()) {
                (MoveKind::Play, CardType::Attack) => {
                    self.offer_coup_fourre(mv.card, mv.target.expect("attack moves carry a target"))
                }
                _ => None,
            };

            let mut event = self.handle_move(current, &mv, declared_extension);
            self.players[current].remove_from_hand(mv.card);

            if let Some(seat) = interceptor {
                event = self.apply_coup_fourre(seat, mv.card)?;
            }

            if event == TurnEvent::TripComplete {
                break;
            }

            // 6. Rotate, honoring any redirection.
            rotation = next_seat(event, current, rotation);
            current = rotation;
            rotation = (rotation + 1) % seat_count;
        }

        if let Some(writer) = self.transcript.as_mut() {
            writer.write_hand_end()?;
        }

        let summary = self.compute_hand_scores();
        let hand_scores: Vec<i32> = self.teams.iter().map(|t| t.hand_score).collect();
        let total_scores: Vec<i32> = self.teams.iter().map(|t| t.total_score).collect();
        for player in &mut self.players {
            if let Some(driver) = player.driver.as_mut() {
                driver.hand_ended(&summary);
                driver.hand_scores(&hand_scores, &total_scores);
            }
        }
        Ok(())
    }

    /// Clear hand-scoped state on the game and every team.
    pub(crate) fn reset_hand_state(&mut self) {
        self.winner = None;
        self.trip_complete = false;
        self.delayed_action = false;
        self.extension = false;
        self.last_attack = None;
        self.discard_pile.clear();
        for team in &mut self.teams {
            team.reset();
        }
    }

    // === Decisions ===

    fn driver_mut(&mut self, seat: usize) -> &mut dyn Driver {
        self.players[seat]
            .driver
            .as_deref_mut()
            .expect("live play requires bound drivers")
    }

    /// If this move would finish the trip and the extension is still on
    /// the table, ask the mover whether to declare it.
    fn offer_extension(&mut self, seat: usize, mv: &Move) -> bool {
        if !self.extension_possible
            || mv.kind != MoveKind::Play
            || mv.card.card_type() != CardType::Mileage
        {
            return false;
        }
        let team = &self.teams[self.players[seat].team];
        if team.mileage + mv.card.mileage_value() != self.target {
            return false;
        }

        // The driver decides with the finishing card already on the table.
        let mut view = self.player_view(seat);
        view.us.mileage += mv.card.mileage_value();
        view.us.mileage_pile.push(mv.card);
        if mv.card == Card::Mileage200 {
            view.us.safe_trip = false;
            view.us.two_hundreds_played += 1;
        }
        if let Some(pos) = view.hand.iter().position(|&c| c == mv.card) {
            view.hand.remove(pos);
        }
        self.driver_mut(seat).go_for_extension(&view)
    }

    /// Offer the interception. Only one copy of each safety exists, so the
    /// first holding seat on the victim team decides for everyone.
    fn offer_coup_fourre(&mut self, attack: Card, victim_team: usize) -> Option<usize> {
        let safety = attack.blocking_safety();
        let seats = self.teams[victim_team].seats.clone();
        for seat in seats {
            if self.players[seat].hand.contains(&safety) {
                let view = self.player_view(seat);
                let accepted = self.driver_mut(seat).play_coup_fourre(attack, &view);
                return accepted.then_some(seat);
            }
        }
        None
    }

    /// Resolve an accepted interception: synthesize the coup-fourre move,
    /// record and broadcast it, apply it, and draw the replacement card.
    fn apply_coup_fourre(&mut self, seat: usize, attack: Card) -> Result<TurnEvent, GameError> {
        let safety = attack.blocking_safety();
        let cf = Move::coup_fourre(safety);

        let replacement = self.deck.draw();
        if replacement.is_none() {
            self.delayed_action = true;
        }

        if let Some(writer) = self.transcript.as_mut() {
            writer.write_move(seat, replacement, &cf, false)?;
        }
        self.notify_players(seat, &cf);

        let event = self.handle_move(seat, &cf, false);
        let removed = self.players[seat].remove_from_hand(safety);
        debug_assert!(removed, "interceptor must hold the safety");

        if let Some(card) = replacement {
            self.players[seat].hand.push(card);
            if let Some(driver) = self.players[seat].driver.as_mut() {
                driver.card_drawn(card);
            }
        }
        Ok(event)
    }

    // === Move application ===

    /// Apply a move to the canonical state. This is the one routine both
    /// live play and transcript replay run, so the two can never drift.
    ///
    /// Hands and the deck are the callers' business; this routine owns the
    /// team piles, the discard pile, the hand-scoped flags, and the turn
    /// transition it returns.
    pub(crate) fn handle_move(&mut self, seat: usize, mv: &Move, declared_extension: bool) -> TurnEvent {
        let team_idx = self.players[seat].team;

        // A pending attack is only voidable by the record that directly
        // follows it.
        if !mv.coup_fourre {
            self.last_attack = None;
        }

        match mv.kind {
            MoveKind::Discard => {
                self.discard_pile.push_back(mv.card);
                TurnEvent::Advance
            }
            MoveKind::Play => match mv.card.card_type() {
                CardType::Mileage => {
                    let target = self.target;
                    let team = &mut self.teams[team_idx];
                    team.mileage += mv.card.mileage_value();
                    team.mileage_pile.push(mv.card);
                    if mv.card == Card::Mileage200 {
                        team.safe_trip = false;
                        team.two_hundreds_played += 1;
                    }
                    if team.mileage == target {
                        if declared_extension {
                            debug!(team = team_idx, "extension declared; racing to 1000");
                            self.extension = true;
                            self.extension_possible = false;
                            self.target = 1000;
                            TurnEvent::Advance
                        } else {
                            debug!(team = team_idx, "trip complete");
                            self.winner = Some(team_idx);
                            self.trip_complete = true;
                            TurnEvent::TripComplete
                        }
                    } else {
                        TurnEvent::Advance
                    }
                }
                CardType::Remedy => {
                    let team = &mut self.teams[team_idx];
                    team.battle_pile.push(mv.card);
                    if mv.card == Card::EndOfLimit {
                        team.speed_limit = false;
                    } else {
                        team.need_remedy = Some(Card::Go);
                    }
                    if mv.card == Card::Go || team.has_safety(Card::RightOfWay) {
                        team.need_remedy = None;
                        team.moving = true;
                    }
                    TurnEvent::Advance
                }
                CardType::Attack => {
                    let victim = mv.target.expect("attack moves carry a target");
                    let team = &mut self.teams[victim];
                    team.battle_pile.push(mv.card);
                    if mv.card == Card::SpeedLimit {
                        team.speed_limit = true;
                    } else {
                        team.moving = false;
                        team.need_remedy = Some(mv.card.remedy());
                    }
                    self.last_attack = Some((victim, mv.card));
                    TurnEvent::Advance
                }
                CardType::Safety => {
                    if mv.coup_fourre {
                        let (victim, attack) = self
                            .last_attack
                            .take()
                            .expect("coup fourre without a pending attack");
                        debug_assert_eq!(victim, team_idx);

                        // Void the attack: it never happened, except that
                        // the card is out of the game.
                        let team = &mut self.teams[team_idx];
                        let popped = team.battle_pile.pop();
                        debug_assert_eq!(popped, Some(attack));
                        if attack == Card::SpeedLimit {
                            team.speed_limit = false;
                        } else {
                            team.moving = true;
                            team.need_remedy = None;
                        }
                        team.coup_fourres += 1;
                        self.discard_pile.push_back(attack);

                        self.play_safety(team_idx, mv.card);
                        TurnEvent::Interrupt { seat }
                    } else {
                        self.play_safety(team_idx, mv.card);
                        TurnEvent::ExtraTurn
                    }
                }
            },
        }
    }

    /// Put a safety into play, clearing whatever it resolves.
    fn play_safety(&mut self, team_idx: usize, card: Card) {
        let team = &mut self.teams[team_idx];
        team.safeties.push(card);
        if card == Card::RightOfWay {
            team.speed_limit = false;
        }
        if team.need_remedy.map(|r| r.matching_safety()) == Some(card) {
            if card == Card::RightOfWay {
                team.need_remedy = None;
                team.moving = true;
            } else {
                team.need_remedy = Some(Card::Go);
            }
        }
    }

    // === Views and notifications ===

    /// Build the restricted snapshot for one seat. Own team and opponents
    /// are copies; the discard pile is a persistent vector shared
    /// structurally, so the whole snapshot is cheap.
    #[must_use]
    pub fn player_view(&self, seat: usize) -> PlayerView {
        let player = &self.players[seat];
        PlayerView {
            hand: player.hand.clone(),
            discard_pile: self.discard_pile.clone(),
            us: self.teams[player.team].clone(),
            opponents: self
                .teams
                .iter()
                .filter(|t| t.number != player.team)
                .cloned()
                .collect(),
            valid_moves: Vec::new(),
            target: self.target,
            cards_left: self.deck.cards_left(),
        }
    }

    /// Broadcast a move to every driver, mover included. Hands stay
    /// hidden; only the seat and team numbers travel.
    fn notify_players(&mut self, seat: usize, mv: &Move) {
        let team = self.players[seat].team;
        for player in &mut self.players {
            if let Some(driver) = player.driver.as_mut() {
                driver.move_played(seat, team, mv);
            }
        }
    }

    // === Scoring ===

    /// Compute per-team hand scores, fold them into the totals, and
    /// return the human-readable breakdown.
    pub(crate) fn compute_hand_scores(&mut self) -> String {
        let teams_with_mileage = self.teams.iter().filter(|t| t.mileage > 0).count();

        let mut summary = String::new();
        for team in &mut self.teams {
            let _ = writeln!(summary, "Team {}", team.number);

            team.hand_score = team.mileage;
            let _ = writeln!(summary, "  {} miles", team.mileage);

            team.hand_score += 100 * team.safeties.len() as i32;
            let _ = writeln!(
                summary,
                "  {} safeties = {}",
                team.safeties.len(),
                100 * team.safeties.len()
            );

            team.hand_score += 300 * team.coup_fourres as i32;
            let _ = writeln!(
                summary,
                "  {} coup fourres = {}",
                team.coup_fourres,
                300 * team.coup_fourres
            );

            if team.safeties.len() == 4 {
                team.hand_score += 700;
                let _ = writeln!(summary, "  All four safeties = 700");
            }

            if self.winner == Some(team.number) {
                team.hand_score += 400;
                let _ = writeln!(summary, "  Trip complete = 400");
                if self.delayed_action {
                    team.hand_score += 300;
                    let _ = writeln!(summary, "  Delayed action = 300");
                }
                if team.safe_trip {
                    team.hand_score += 300;
                    let _ = writeln!(summary, "  Safe trip = 300");
                }
                if self.extension {
                    team.hand_score += 200;
                    let _ = writeln!(summary, "  Extension = 200");
                }
                if teams_with_mileage == 1 {
                    team.hand_score += 500;
                    let _ = writeln!(summary, "  Shut out = 500");
                }
            }

            let _ = writeln!(summary, "  Total: {}", team.hand_score);
            team.total_score += team.hand_score;
        }
        summary
    }

    // === Invariants ===

    /// Within a live hand, every one of the 110 cards is in exactly one
    /// place.
    #[cfg(debug_assertions)]
    fn assert_conservation(&self) {
        let in_hands: usize = self.players.iter().map(|p| p.hand.len()).sum();
        let in_piles: usize = self
            .teams
            .iter()
            .map(|t| t.mileage_pile.len() + t.battle_pile.len() + t.safeties.len())
            .sum();
        let total = self.deck.cards_left() + in_hands + self.discard_pile.len() + in_piles;
        debug_assert_eq!(total, crate::deck::DECK_SIZE, "card conservation violated");
    }
}
