// src/session.rs
use crate::board::{Board, Square};
use crate::error::{Refusal, SessionResult};
use crate::piece::Color;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

// --- Game Phase ---

#[derive(Debug, Serialize, Deserialize, Copy, Clone, PartialEq, Eq)]
pub enum Phase {
    /// Nobody has said start.
    NotStarted,
    /// One side is ready.
    AwaitingReady,
    InProgress,
    /// A winner is recorded. Clearing it resumes play.
    Concluded,
}

/// Outcome of a start request.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum StartState {
    Started,
    Waiting { white_ready: bool, black_ready: bool },
}

/// A move that went through.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayedMove {
    pub color: Color,
    pub src: Square,
    pub dst: Square,
    pub notation: String,
    /// Mover's accumulated clock after this move.
    pub elapsed: Duration,
}

/// Serializable snapshot of a session.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SessionSummary {
    pub phase: Phase,
    pub turn: Color,
    pub white: Option<String>,
    pub black: Option<String>,
    pub white_ready: bool,
    pub black_ready: bool,
    pub white_elapsed_ms: u64,
    pub black_elapsed_ms: u64,
    pub moves: Vec<String>,
    pub winner: Option<Color>,
    pub winner_name: Option<String>,
    pub allowed: bool,
    pub board: String,
}

fn millis(d: Duration) -> u64 {
    u64::try_from(d.as_millis()).unwrap_or(u64::MAX)
}

// --- Game Session ---

/// One channel's game: players, turn, clocks, history and outcome.
#[derive(Debug, Clone)]
pub struct GameSession {
    board: Board,
    white: Option<String>,
    black: Option<String>,
    white_ready: bool,
    black_ready: bool,
    started: bool,
    turn: Color,
    white_elapsed: Duration,
    black_elapsed: Duration,
    tick_from: Option<Instant>,
    /// Notation of every move played, oldest first.
    moves: Vec<String>,
    /// Board before each entry of `moves`.
    previous: Vec<Board>,
    winner: Option<Color>,
    allowed: bool,
}

impl Default for GameSession {
    fn default() -> Self { GameSession::new() }
}

impl GameSession {
    /// Fresh session on the starting board. Chess is not allowed until [`GameSession::set_allowed`].
    pub fn new() -> Self {
        GameSession {
            board: Board::starting(),
            white: None,
            black: None,
            white_ready: false,
            black_ready: false,
            started: false,
            turn: Color::White,
            white_elapsed: Duration::ZERO,
            black_elapsed: Duration::ZERO,
            tick_from: None,
            moves: Vec::new(),
            previous: Vec::new(),
            winner: None,
            allowed: false,
        }
    }

    // --- Accessors ---

    pub fn board(&self) -> &Board { &self.board }
    pub fn white(&self) -> Option<&str> { self.white.as_deref() }
    pub fn black(&self) -> Option<&str> { self.black.as_deref() }
    pub fn turn(&self) -> Color { self.turn }
    pub fn is_ready(&self, color: Color) -> bool {
        match color { Color::White => self.white_ready, Color::Black => self.black_ready }
    }
    pub fn elapsed(&self, color: Color) -> Duration {
        match color { Color::White => self.white_elapsed, Color::Black => self.black_elapsed }
    }
    pub fn moves(&self) -> &[String] { &self.moves }
    pub fn previous_boards(&self) -> &[Board] { &self.previous }
    pub fn winner(&self) -> Option<Color> { self.winner }
    pub fn is_allowed(&self) -> bool { self.allowed }

    pub fn player(&self, color: Color) -> Option<&str> {
        match color { Color::White => self.white(), Color::Black => self.black() }
    }

    /// Name of whoever claimed the winning side.
    pub fn winner_identity(&self) -> Option<&str> {
        self.winner.and_then(|c| self.player(c))
    }

    pub fn phase(&self) -> Phase {
        if self.winner.is_some() {
            Phase::Concluded
        } else if self.started {
            Phase::InProgress
        } else if self.white_ready || self.black_ready {
            Phase::AwaitingReady
        } else {
            Phase::NotStarted
        }
    }

    /// Board history entry `n` (0 is the board before the first move).
    pub fn board_at(&self, n: usize) -> SessionResult<&Board> {
        self.previous.get(n).ok_or_else(|| Refusal::NoSuchBoard(n).into())
    }

    fn plays(&self, user: &str, color: Color) -> bool {
        self.player(color) == Some(user)
    }

    fn ensure_allowed(&self) -> Result<(), Refusal> {
        if self.allowed { Ok(()) } else { Err(Refusal::NotAllowed) }
    }

    // --- Setup ---

    pub fn set_allowed(&mut self, allowed: bool) {
        debug!("chess allowed: {}", allowed);
        self.allowed = allowed;
    }

    /// Records `user` as the player of `color`. One user may hold both sides.
    pub fn claim_side(&mut self, user: &str, color: Color) -> SessionResult<()> {
        self.ensure_allowed()?;
        info!("{} claims {}", user, color);
        match color {
            Color::White => self.white = Some(user.to_string()),
            Color::Black => self.black = Some(user.to_string()),
        }
        Ok(())
    }

    pub fn start(&mut self, user: &str) -> SessionResult<StartState> {
        self.start_at(user, Instant::now())
    }

    /// Marks the user ready on every side they hold. The game starts, white to
    /// move with the clock running from `now`, once both sides are ready.
    pub fn start_at(&mut self, user: &str, now: Instant) -> SessionResult<StartState> {
        self.ensure_allowed()?;
        let (is_white, is_black) = (self.plays(user, Color::White), self.plays(user, Color::Black));
        if !is_white && !is_black {
            return Err(Refusal::NotAPlayer.into());
        }
        if self.started {
            return Ok(StartState::Started);
        }

        self.white_ready |= is_white;
        self.black_ready |= is_black;

        if self.white_ready && self.black_ready {
            self.started = true;
            self.turn = Color::White;
            self.tick_from = Some(now);
            info!("game started: {:?} (white) vs {:?} (black)", self.white, self.black);
            Ok(StartState::Started)
        } else {
            Ok(StartState::Waiting { white_ready: self.white_ready, black_ready: self.black_ready })
        }
    }

    // --- Moves ---

    /// Colour `user` may move right now, or why not.
    fn mover(&self, user: &str) -> Result<Color, Refusal> {
        self.ensure_allowed()?;
        if self.winner.is_some() {
            return Err(Refusal::GameOver);
        }
        if !self.started {
            return Err(Refusal::NotStarted);
        }
        if !self.plays(user, Color::White) && !self.plays(user, Color::Black) {
            return Err(Refusal::NotAPlayer);
        }
        if self.plays(user, self.turn) { Ok(self.turn) } else { Err(Refusal::NotYourTurn) }
    }

    pub fn submit_move(&mut self, user: &str, src: &str, dst: &str) -> SessionResult<PlayedMove> {
        self.submit_move_at(user, src, dst, Instant::now())
    }

    /// Plays `src -> dst` for the side on move. The board change itself is
    /// geometry-only; on any failure the session is left as it was.
    pub fn submit_move_at(&mut self, user: &str, src: &str, dst: &str, now: Instant) -> SessionResult<PlayedMove> {
        let color = self.mover(user)?;
        let src: Square = src.parse()?;
        let dst: Square = dst.parse()?;
        self.play(color, src, dst, now)
    }

    pub fn submit_notation(&mut self, user: &str, notation: &str) -> SessionResult<PlayedMove> {
        self.submit_notation_at(user, notation, Instant::now())
    }

    /// Resolves notation for the side on move, then plays it.
    pub fn submit_notation_at(&mut self, user: &str, notation: &str, now: Instant) -> SessionResult<PlayedMove> {
        let color = self.mover(user)?;
        let (src, dst) = self.board.algebraic(notation, color == Color::White)?;
        self.play(color, src, dst, now)
    }

    fn play(&mut self, color: Color, src: Square, dst: Square, now: Instant) -> SessionResult<PlayedMove> {
        let next = self.board.apply(src, dst)?;
        let notation = self.board
            .coords_to_algebraic(src, dst)
            .unwrap_or_else(|_| format!("{} {}", src, dst));

        self.previous.push(self.board);
        self.moves.push(notation.clone());
        self.board = next;

        let spent = self.tick_from.map_or(Duration::ZERO, |t| now.saturating_duration_since(t));
        let elapsed = match color {
            Color::White => { self.white_elapsed += spent; self.white_elapsed }
            Color::Black => { self.black_elapsed += spent; self.black_elapsed }
        };
        self.turn = color.opponent();
        self.tick_from = Some(now);

        debug!("{} plays {} ({} -> {}), {:?} on the clock", color, notation, src, dst, elapsed);
        Ok(PlayedMove { color, src, dst, notation, elapsed })
    }

    /// Restores the board from before the last move and hands the turn back to
    /// the side that made it. History entries and clocks stay as they are, so
    /// a second takeback restores the same board again.
    pub fn take_back(&mut self, user: &str) -> SessionResult<String> {
        self.ensure_allowed()?;
        if self.winner.is_some() {
            return Err(Refusal::GameOver.into());
        }
        let (Some(last_board), Some(last_move)) = (self.previous.last(), self.moves.last()) else {
            return Err(Refusal::NoHistoryToTakeBack.into());
        };

        let taker = self.turn.opponent();
        if !self.plays(user, taker) {
            if !self.plays(user, Color::White) && !self.plays(user, Color::Black) {
                return Err(Refusal::NotAPlayer.into());
            }
            return Err(Refusal::CannotTakeBack.into());
        }

        let taken = last_move.clone();
        self.board = *last_board;
        self.turn = taker;
        info!("{} takes back {}", taker, taken);
        Ok(taken)
    }

    /// Clears a single square without touching turn or history.
    pub fn knock_out(&mut self, coord: &str) -> SessionResult<()> {
        self.ensure_allowed()?;
        let index = self.board.position(coord)?;
        self.board = self.board.replace(None, index);
        debug!("knocked out {}", coord);
        Ok(())
    }

    // --- Outcome ---

    /// The resigning user's side loses. Someone holding both sides resigns for
    /// the side on move.
    pub fn resign(&mut self, user: &str) -> SessionResult<Color> {
        self.ensure_allowed()?;
        let loser = match (self.plays(user, Color::White), self.plays(user, Color::Black)) {
            (true, true) => self.turn,
            (true, false) => Color::White,
            (false, true) => Color::Black,
            (false, false) => return Err(Refusal::NotAPlayer.into()),
        };
        let winner = loser.opponent();
        info!("{} resigns, {} wins", user, winner);
        self.winner = Some(winner);
        Ok(winner)
    }

    pub fn declare_winner(&mut self, color: Color) -> SessionResult<()> {
        self.ensure_allowed()?;
        info!("{} declared winner", color);
        self.winner = Some(color);
        Ok(())
    }

    pub fn clear_winner(&mut self) -> SessionResult<()> {
        self.ensure_allowed()?;
        self.winner = None;
        Ok(())
    }

    pub fn summary(&self) -> SessionSummary {
        SessionSummary {
            phase: self.phase(),
            turn: self.turn,
            white: self.white.clone(),
            black: self.black.clone(),
            white_ready: self.white_ready,
            black_ready: self.black_ready,
            white_elapsed_ms: millis(self.white_elapsed),
            black_elapsed_ms: millis(self.black_elapsed),
            moves: self.moves.clone(),
            winner: self.winner,
            winner_name: self.winner_identity().map(str::to_string),
            allowed: self.allowed,
            board: self.board.layout(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ChessError, SessionError};
    use crate::piece::{Piece, PieceKind};
    use pretty_assertions::assert_eq;

    fn started(t0: Instant) -> GameSession {
        let mut game = GameSession::new();
        game.set_allowed(true);
        game.claim_side("alice", Color::White).unwrap();
        game.claim_side("bob", Color::Black).unwrap();
        game.start_at("alice", t0).unwrap();
        game.start_at("bob", t0).unwrap();
        game
    }

    #[test]
    fn everything_is_refused_until_allowed() {
        let mut game = GameSession::new();
        assert_eq!(game.claim_side("alice", Color::White), Err(Refusal::NotAllowed.into()));
        assert_eq!(game.declare_winner(Color::Black), Err(Refusal::NotAllowed.into()));
        assert_eq!(game.white(), None);
        assert_eq!(game.winner(), None);
    }

    #[test]
    fn phases_follow_readiness() {
        let t0 = Instant::now();
        let mut game = GameSession::new();
        game.set_allowed(true);
        assert_eq!(game.phase(), Phase::NotStarted);
        game.claim_side("alice", Color::White).unwrap();
        game.claim_side("bob", Color::Black).unwrap();

        assert_eq!(
            game.start_at("alice", t0).unwrap(),
            StartState::Waiting { white_ready: true, black_ready: false }
        );
        assert_eq!(game.phase(), Phase::AwaitingReady);
        assert_eq!(game.start_at("carol", t0), Err(Refusal::NotAPlayer.into()));

        assert_eq!(game.start_at("bob", t0).unwrap(), StartState::Started);
        assert_eq!(game.phase(), Phase::InProgress);
        assert_eq!(game.turn(), Color::White);
    }

    #[test]
    fn one_user_can_hold_both_sides() {
        let t0 = Instant::now();
        let mut game = GameSession::new();
        game.set_allowed(true);
        game.claim_side("solo", Color::White).unwrap();
        game.claim_side("solo", Color::Black).unwrap();
        assert_eq!(game.start_at("solo", t0).unwrap(), StartState::Started);

        game.submit_move_at("solo", "E2", "E4", t0).unwrap();
        game.submit_move_at("solo", "E7", "E5", t0).unwrap();
        assert_eq!(game.moves(), &["Pe4".to_string(), "Pe5".to_string()]);
    }

    #[test]
    fn moves_before_start_are_refused() {
        let mut game = GameSession::new();
        game.set_allowed(true);
        game.claim_side("alice", Color::White).unwrap();
        assert_eq!(game.submit_move("alice", "E2", "E4"), Err(Refusal::NotStarted.into()));
    }

    #[test]
    fn submit_records_history_and_clock() {
        let t0 = Instant::now();
        let mut game = started(t0);

        let played = game.submit_move_at("alice", "G1", "F3", t0 + Duration::from_secs(5)).unwrap();
        assert_eq!(played.notation, "Nf3");
        assert_eq!(played.color, Color::White);
        assert_eq!(played.elapsed, Duration::from_secs(5));

        game.submit_move_at("bob", "d7", "d5", t0 + Duration::from_secs(12)).unwrap();
        assert_eq!(game.elapsed(Color::Black), Duration::from_secs(7));
        assert_eq!(game.elapsed(Color::White), Duration::from_secs(5));
        assert_eq!(game.turn(), Color::White);
        assert_eq!(game.moves().len(), game.previous_boards().len());
        assert_eq!(game.board_at(0).unwrap(), &Board::starting());
        assert_eq!(game.board_at(5), Err(Refusal::NoSuchBoard(5).into()));
    }

    #[test]
    fn wrong_player_and_outsider_are_refused() {
        let t0 = Instant::now();
        let mut game = started(t0);
        let before = *game.board();

        assert_eq!(game.submit_move_at("bob", "E7", "E5", t0), Err(Refusal::NotYourTurn.into()));
        assert_eq!(game.submit_move_at("carol", "E2", "E4", t0), Err(Refusal::NotAPlayer.into()));
        assert_eq!(game.board(), &before);
        assert!(game.moves().is_empty());
    }

    #[test]
    fn geometry_errors_leave_state_alone() {
        let t0 = Instant::now();
        let mut game = started(t0);
        assert_eq!(
            game.submit_move_at("alice", "E4", "E5", t0),
            Err(SessionError::Chess(ChessError::NoPieceAtSource("E4".to_string())))
        );
        assert_eq!(
            game.submit_move_at("alice", "E2", "Q9", t0),
            Err(SessionError::Chess(ChessError::InvalidCoordinate("Q9".to_string())))
        );
        assert_eq!(game.turn(), Color::White);
        assert!(game.previous_boards().is_empty());
    }

    #[test]
    fn unnotatable_moves_are_recorded_by_coordinates() {
        let t0 = Instant::now();
        let mut game = started(t0);
        // Not a pseudo-legal knight move, but the board does not check legality.
        let played = game.submit_move_at("alice", "G1", "G3", t0).unwrap();
        assert_eq!(played.notation, "G1 G3");
    }

    #[test]
    fn notation_moves_use_the_side_on_move() {
        let t0 = Instant::now();
        let mut game = started(t0);
        game.submit_notation_at("alice", "Nf3", t0).unwrap();
        let played = game.submit_notation_at("bob", "Nf6", t0).unwrap();
        assert_eq!((played.src.to_string(), played.dst.to_string()), ("G8".to_string(), "F6".to_string()));
        assert_eq!(
            game.submit_notation_at("alice", "Qd4", t0),
            Err(SessionError::Chess(ChessError::NoMatchingMove("Qd4".to_string())))
        );
    }

    #[test]
    fn takeback_keeps_history_and_clocks() {
        let t0 = Instant::now();
        let mut game = started(t0);
        game.submit_move_at("alice", "E2", "E4", t0 + Duration::from_secs(3)).unwrap();

        assert_eq!(game.take_back("bob"), Err(Refusal::CannotTakeBack.into()));
        assert_eq!(game.take_back("carol"), Err(Refusal::NotAPlayer.into()));

        assert_eq!(game.take_back("alice").unwrap(), "Pe4");
        assert_eq!(game.board(), &Board::starting());
        assert_eq!(game.turn(), Color::White);
        assert_eq!(game.moves().len(), 1);
        assert_eq!(game.previous_boards().len(), 1);
        assert_eq!(game.elapsed(Color::White), Duration::from_secs(3));
    }

    #[test]
    fn takeback_without_history_is_refused() {
        let mut game = started(Instant::now());
        assert_eq!(game.take_back("alice"), Err(Refusal::NoHistoryToTakeBack.into()));
    }

    #[test]
    fn winner_blocks_moves_until_cleared() {
        let t0 = Instant::now();
        let mut game = started(t0);
        assert_eq!(game.resign("alice").unwrap(), Color::Black);
        assert_eq!(game.winner_identity(), Some("bob"));
        assert_eq!(game.phase(), Phase::Concluded);
        assert_eq!(game.submit_move_at("alice", "E2", "E4", t0), Err(Refusal::GameOver.into()));
        assert_eq!(game.take_back("alice"), Err(Refusal::GameOver.into()));

        game.clear_winner().unwrap();
        assert_eq!(game.phase(), Phase::InProgress);
        game.submit_move_at("alice", "E2", "E4", t0).unwrap();
    }

    #[test]
    fn declare_winner_ignores_turn_and_board() {
        let mut game = started(Instant::now());
        game.declare_winner(Color::Black).unwrap();
        assert_eq!(game.winner(), Some(Color::Black));
        assert_eq!(game.resign("carol"), Err(Refusal::NotAPlayer.into()));
    }

    #[test]
    fn knock_out_clears_one_square() {
        let mut game = started(Instant::now());
        game.knock_out("d7").unwrap();
        assert_eq!(game.board().piece_at("D7").unwrap(), None);
        assert_eq!(game.board().piece_at("E7").unwrap(), Some(Piece::new(PieceKind::Pawn, Color::Black)));
        assert!(game.moves().is_empty());
        assert!(game.knock_out("j1").is_err());
    }

    #[test]
    fn summary_clock_saturates() {
        assert_eq!(millis(Duration::from_millis(1500)), 1500);
        assert_eq!(millis(Duration::MAX), u64::MAX);
    }

    #[test]
    fn summary_reflects_state() {
        let t0 = Instant::now();
        let mut game = started(t0);
        game.submit_move_at("alice", "G1", "F3", t0 + Duration::from_millis(1500)).unwrap();
        let summary = game.summary();
        assert_eq!(summary.phase, Phase::InProgress);
        assert_eq!(summary.turn, Color::Black);
        assert_eq!(summary.white.as_deref(), Some("alice"));
        assert_eq!(summary.white_elapsed_ms, 1500);
        assert_eq!(summary.moves, vec!["Nf3".to_string()]);
        assert_eq!(summary.board, game.board().layout());
    }
}
