//! Persistent game transcriptions.
//!
//! ## Wire format
//!
//! A transcript is a series of games, big-endian throughout, no version
//! tag, no checksums:
//!
//! * Game header:
//!   * One byte: number of players.
//!   * For each player, in seat order: one byte team number, a 16-bit
//!     name length, then the name bytes.
//! * For each hand:
//!   * Six bytes per player: the opening hand, one card per byte — or six
//!     `0xFF` bytes (once, not once per player) meaning no more hands in
//!     this game.
//! * For each move in a hand, a 16-bit word:
//!   * Bits 0–2: seat of the moving player; 6 and 7 are special, below.
//!   * Bits 3–7: card drawn this turn; 31 means none was drawn (deck
//!     exhausted).
//!   * Bit 8: move kind, 0 = discard, 1 = play.
//!   * Bits 9–13: the card acted on.
//!   * Bits 14–15: target team (ignored for non-attacks).
//! * A seat value of 6 marks a control record: bit 3 set means the next
//!   record is a coup-fourre interrupt; bit 4 set means the player of the
//!   next record declares the extension on that move.
//! * A seat value of 7 ends the hand; all other bits are disregarded.
//!
//! The 3-bit seat and 2-bit team fields are what cap transcripts at 6
//! players and 4 teams.
//!
//! ## Writer and reader
//!
//! [`TranscriptWriter`] is append-only and single-writer; calls must
//! arrive in the order {game_start, [hand_start, move*, hand_end]*,
//! game_end} — out-of-order calls produce an unrecoverable stream.
//!
//! [`TranscriptReader`] rebuilds the game from the header and pushes each
//! record through [`Game::handle_move`], the same move-application routine
//! live play uses, so replayed state transitions and scores are identical
//! to the original run. It drives a [`TranscriptConsumer`] with the same
//! lifecycle a live game's drivers see, so downstream consumers (score
//! aggregators, leaderboards) work unmodified over either source.

use std::io;

use crate::cards::{Card, CardType};
use crate::deck::HAND_SIZE;
use crate::error::TranscriptError;
use crate::game::Game;
use crate::moves::{Move, MoveKind};
use crate::player::{Hand, Player};
use crate::team::Team;

/// Most teams a transcript can express (2-bit target field).
pub const MAX_TEAMS: usize = 4;
/// Most players a transcript can express (seat values 6 and 7 are
/// reserved).
pub const MAX_PLAYERS: usize = 6;

const PLAYER_MASK: u16 = 0b111;
const PLAYER_CONTROL: u16 = 6;
const PLAYER_HAND_OVER: u16 = 7;

const DRAWN_SHIFT: u16 = 3;
const DRAWN_MASK: u16 = 0b1_1111;
const NO_DRAW: u16 = 0b1_1111;

const KIND_SHIFT: u16 = 8;
const CARD_SHIFT: u16 = 9;
const CARD_MASK: u16 = 0b1_1111;
const TARGET_SHIFT: u16 = 14;
const TARGET_MASK: u16 = 0b11;

const CONTROL_COUP_FOURRE: u16 = 1 << 3;
const CONTROL_EXTENSION: u16 = 1 << 4;

const GAME_OVER_BYTE: u8 = 0xFF;

/// Pack one move record into its 16-bit word.
fn pack_move(seat: usize, drawn: Option<Card>, mv: &Move) -> u16 {
    let drawn_bits = drawn.map_or(NO_DRAW, |c| u16::from(c.wire()));
    seat as u16
        | (drawn_bits << DRAWN_SHIFT)
        | ((mv.kind as u16) << KIND_SHIFT)
        | (u16::from(mv.card.wire()) << CARD_SHIFT)
        | ((mv.target.unwrap_or(0) as u16) << TARGET_SHIFT)
}

/// The raw fields of a non-sentinel move word.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct RawMove {
    seat: u16,
    drawn: u16,
    kind: u16,
    card: u16,
    target: u16,
}

fn unpack_move(word: u16) -> RawMove {
    RawMove {
        seat: word & PLAYER_MASK,
        drawn: (word >> DRAWN_SHIFT) & DRAWN_MASK,
        kind: (word >> KIND_SHIFT) & 1,
        card: (word >> CARD_SHIFT) & CARD_MASK,
        target: (word >> TARGET_SHIFT) & TARGET_MASK,
    }
}

/// Append-only transcript encoder.
pub struct TranscriptWriter<W: io::Write> {
    sink: W,
}

impl<W: io::Write> TranscriptWriter<W> {
    #[must_use]
    pub fn new(sink: W) -> Self {
        Self { sink }
    }

    /// Write the game header: player count, then team and name per seat.
    pub fn write_game_start(&mut self, players: &[Player]) -> Result<(), TranscriptError> {
        let team_count = players.iter().map(|p| p.team + 1).max().unwrap_or(0);
        if team_count > MAX_TEAMS {
            return Err(TranscriptError::TooManyTeams(team_count));
        }
        if players.len() > MAX_PLAYERS {
            return Err(TranscriptError::TooManyPlayers(players.len()));
        }

        self.sink.write_all(&[players.len() as u8])?;
        for player in players {
            let name = player.name.as_bytes();
            debug_assert!(name.len() <= u16::MAX as usize);
            self.sink.write_all(&[player.team as u8])?;
            self.sink.write_all(&(name.len() as u16).to_be_bytes())?;
            self.sink.write_all(name)?;
        }
        Ok(())
    }

    /// Write each seat's opening hand, one byte per card.
    pub fn write_hand_start(&mut self, players: &[Player]) -> Result<(), TranscriptError> {
        for player in players {
            debug_assert_eq!(player.hand.len(), HAND_SIZE, "opening hands hold six cards");
            for &card in &player.hand {
                self.sink.write_all(&[card.wire()])?;
            }
        }
        Ok(())
    }

    /// Write one move record, preceded by a control record when the move
    /// is a coup fourre or declares the extension.
    pub fn write_move(
        &mut self,
        seat: usize,
        drawn: Option<Card>,
        mv: &Move,
        declared_extension: bool,
    ) -> Result<(), TranscriptError> {
        if mv.coup_fourre {
            self.sink
                .write_all(&(PLAYER_CONTROL | CONTROL_COUP_FOURRE).to_be_bytes())?;
        } else if declared_extension {
            self.sink
                .write_all(&(PLAYER_CONTROL | CONTROL_EXTENSION).to_be_bytes())?;
        }
        self.sink.write_all(&pack_move(seat, drawn, mv).to_be_bytes())?;
        Ok(())
    }

    /// Write the end-of-hand sentinel.
    pub fn write_hand_end(&mut self) -> Result<(), TranscriptError> {
        self.sink.write_all(&PLAYER_HAND_OVER.to_be_bytes())?;
        Ok(())
    }

    /// Write the game terminator. Must follow `write_hand_end`.
    pub fn write_game_end(&mut self) -> Result<(), TranscriptError> {
        self.sink.write_all(&[GAME_OVER_BYTE; HAND_SIZE])?;
        self.sink.flush()?;
        Ok(())
    }
}

/// Lifecycle callbacks driven by [`TranscriptReader::read`].
///
/// The passed [`Game`] is the replayed canonical state *after* the event;
/// consumers read it through the public accessors and never mutate it.
pub trait TranscriptConsumer {
    /// A game header was read; seats and teams are set up.
    fn game_started(&mut self, game: &Game) {
        let _ = game;
    }

    /// Opening hands were dealt from the transcript.
    fn hand_started(&mut self, game: &Game) {
        let _ = game;
    }

    /// A move was replayed through the engine.
    fn move_played(&mut self, game: &Game, seat: usize, drawn: Option<Card>, mv: &Move) {
        let _ = (game, seat, drawn, mv);
    }

    /// The hand ended and scores were computed.
    fn hand_ended(&mut self, game: &Game) {
        let _ = game;
    }

    /// The game terminator was read.
    fn game_ended(&mut self, game: &Game) {
        let _ = game;
    }
}

/// Transcript decoder and replayer.
pub struct TranscriptReader<R: io::Read> {
    source: R,
}

impl<R: io::Read> TranscriptReader<R> {
    #[must_use]
    pub fn new(source: R) -> Self {
        Self { source }
    }

    /// Replay every game in the stream, driving `consumer` with the same
    /// lifecycle live play broadcasts.
    pub fn read<C: TranscriptConsumer>(&mut self, consumer: &mut C) -> Result<(), TranscriptError> {
        while let Some(mut game) = self.read_game_header()? {
            consumer.game_started(&game);
            while self.read_hand_start(&mut game)? {
                consumer.hand_started(&game);
                while let Some((seat, drawn, mv)) = self.read_move(&mut game)? {
                    consumer.move_played(&game, seat, drawn, &mv);
                }
                game.compute_hand_scores();
                consumer.hand_ended(&game);
            }
            consumer.game_ended(&game);
        }
        Ok(())
    }

    /// Read a game header and build the replay shell, or return `None` at
    /// a clean end of stream.
    fn read_game_header(&mut self) -> Result<Option<Game>, TranscriptError> {
        let player_count = match self.read_byte_or_eof()? {
            Some(byte) => byte as usize,
            None => return Ok(None),
        };
        if player_count == 0 {
            return Err(TranscriptError::Corrupt("empty game header"));
        }
        if player_count > MAX_PLAYERS {
            return Err(TranscriptError::TooManyPlayers(player_count));
        }

        let mut players = Vec::with_capacity(player_count);
        for seat in 0..player_count {
            let mut header = [0u8; 3];
            self.read_exact(&mut header)?;
            let team = header[0] as usize;
            if team >= MAX_TEAMS {
                return Err(TranscriptError::Corrupt("team number out of range"));
            }
            let name_len = u16::from_be_bytes([header[1], header[2]]) as usize;
            let mut name = vec![0u8; name_len];
            self.read_exact(&mut name)?;
            let name = String::from_utf8(name)
                .map_err(|_| TranscriptError::Corrupt("player name is not UTF-8"))?;
            players.push(Player::unbound(seat, team, name));
        }

        // Teams are indexed by number everywhere, so the header's numbers
        // must form 0..team_count.
        let team_count = players.iter().map(|p| p.team + 1).max().unwrap_or(0);
        let mut teams: Vec<Team> = (0..team_count).map(Team::new).collect();
        for player in &players {
            teams[player.team].seats.push(player.number);
        }
        if teams.iter().any(|t| t.seats.is_empty()) {
            return Err(TranscriptError::Corrupt("team with no seats"));
        }

        Ok(Some(Game::replay_shell(players, teams)))
    }

    /// Deal the next hand from the stream. Returns false on the game
    /// terminator.
    fn read_hand_start(&mut self, game: &mut Game) -> Result<bool, TranscriptError> {
        game.reset_hand_state();
        for seat in 0..game.players().len() {
            let mut bytes = [0u8; HAND_SIZE];
            self.read_exact(&mut bytes)?;
            if bytes[0] == GAME_OVER_BYTE {
                return Ok(false);
            }
            let mut hand = Hand::new();
            for &byte in &bytes {
                hand.push(
                    Card::from_wire(byte)
                        .ok_or(TranscriptError::Corrupt("unknown card in deal"))?,
                );
            }
            game.players[seat].hand = hand;
        }
        Ok(true)
    }

    /// Read, validate, and apply the next move record. Returns `None` at
    /// the end-of-hand sentinel.
    #[allow(clippy::type_complexity)]
    fn read_move(
        &mut self,
        game: &mut Game,
    ) -> Result<Option<(usize, Option<Card>, Move)>, TranscriptError> {
        let mut coup_fourre = false;
        let mut declared_extension = false;

        loop {
            let word = self.read_u16()?;
            let player = word & PLAYER_MASK;

            if player == PLAYER_HAND_OVER {
                return Ok(None);
            }
            if player == PLAYER_CONTROL {
                if word & CONTROL_COUP_FOURRE != 0 {
                    coup_fourre = true;
                } else if word & CONTROL_EXTENSION != 0 {
                    declared_extension = true;
                } else {
                    return Err(TranscriptError::Corrupt("empty control record"));
                }
                continue;
            }

            let raw = unpack_move(word);
            let seat = raw.seat as usize;
            if seat >= game.players().len() {
                return Err(TranscriptError::Corrupt("seat out of range"));
            }

            let drawn = if raw.drawn == NO_DRAW {
                None
            } else {
                Some(
                    Card::from_wire(raw.drawn as u8)
                        .ok_or(TranscriptError::Corrupt("unknown drawn card"))?,
                )
            };
            let kind = if raw.kind == 1 {
                MoveKind::Play
            } else {
                MoveKind::Discard
            };
            let card = Card::from_wire(raw.card as u8)
                .ok_or(TranscriptError::Corrupt("unknown played card"))?;

            let target = if kind == MoveKind::Play && card.card_type() == CardType::Attack {
                let target = raw.target as usize;
                if target >= game.teams().len() {
                    return Err(TranscriptError::Corrupt("target team out of range"));
                }
                Some(target)
            } else {
                None
            };

            let mv = Move {
                kind,
                card,
                target,
                coup_fourre,
            };

            if coup_fourre {
                if card.card_type() != CardType::Safety {
                    return Err(TranscriptError::Corrupt("coup fourre of a non-safety"));
                }
                match game.pending_attack() {
                    Some((victim, _)) if victim == game.players()[seat].team => {}
                    _ => {
                        return Err(TranscriptError::Corrupt(
                            "coup fourre with no pending attack",
                        ))
                    }
                }
            }

            match drawn {
                Some(card) => game.players[seat].hand.push(card),
                None => game.delayed_action = true,
            }
            if !game.players[seat].remove_from_hand(card) {
                return Err(TranscriptError::Corrupt("played card not in hand"));
            }
            game.handle_move(seat, &mv, declared_extension);

            return Ok(Some((seat, drawn, mv)));
        }
    }

    // === Low-level reads ===

    /// Read one byte, or `None` at a clean end of stream.
    fn read_byte_or_eof(&mut self) -> Result<Option<u8>, TranscriptError> {
        let mut byte = [0u8; 1];
        loop {
            match self.source.read(&mut byte) {
                Ok(0) => return Ok(None),
                Ok(_) => return Ok(Some(byte[0])),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }
    }

    fn read_exact(&mut self, buf: &mut [u8]) -> Result<(), TranscriptError> {
        self.source.read_exact(buf).map_err(|e| {
            if e.kind() == io::ErrorKind::UnexpectedEof {
                TranscriptError::Truncated
            } else {
                TranscriptError::Io(e)
            }
        })
    }

    fn read_u16(&mut self) -> Result<u16, TranscriptError> {
        let mut bytes = [0u8; 2];
        self.read_exact(&mut bytes)?;
        Ok(u16::from_be_bytes(bytes))
    }
}
