// src/notation.rs
use crate::board::{castle_rook, Board, Square};
use crate::error::{ChessError, ChessResult};
use crate::piece::{Color, Piece, PieceKind};
use lazy_static::lazy_static;
use regex::Regex;

pub const KINGSIDE_CASTLE: &str = "O-O";
pub const QUEENSIDE_CASTLE: &str = "O-O-O";

lazy_static! {
    /// Piece letter, optional source file, optional source rank, optional capture, destination.
    /// Unanchored: the first match inside the text is used.
    static ref ALGEBRAIC: Regex = Regex::new(r"([PBNRQK])([a-h])?([1-8])?(x)?([a-h][1-8])").unwrap();
}

/// Fixed king squares for the two castle spellings.
fn castle_coords(notation: &str, white: bool) -> Option<(Square, Square)> {
    let (from, to) = match (notation, white) {
        (KINGSIDE_CASTLE, true) => ("E1", "G1"),
        (QUEENSIDE_CASTLE, true) => ("E1", "C1"),
        (KINGSIDE_CASTLE, false) => ("E8", "G8"),
        (QUEENSIDE_CASTLE, false) => ("E8", "C8"),
        _ => return None,
    };
    Some((from.parse().ok()?, to.parse().ok()?))
}

impl Board {
    /// Resolves notation such as `Nf3`, `Rad1`, `Pe4` or `O-O` to a (source, destination)
    /// pair for the given side. Only source squares whose pseudo-legal moves reach the
    /// destination are considered; exactly one must remain.
    pub fn algebraic(&self, notation: &str, white: bool) -> ChessResult<(Square, Square)> {
        let notation = notation.trim();
        if let Some(coords) = castle_coords(notation, white) {
            return Ok(coords);
        }

        let caps = ALGEBRAIC
            .captures(notation)
            .ok_or_else(|| ChessError::InvalidNotation(notation.to_string()))?;

        let kind = caps.get(1)
            .and_then(|m| m.as_str().chars().next())
            .and_then(PieceKind::from_letter)
            .ok_or_else(|| ChessError::InvalidNotation(notation.to_string()))?;
        let src_file = caps.get(2).and_then(|m| m.as_str().bytes().next()).map(|b| b - b'a');
        let src_rank = caps.get(3).and_then(|m| m.as_str().bytes().next()).map(|b| b - b'0');
        let dst: Square = caps.get(5)
            .ok_or_else(|| ChessError::InvalidNotation(notation.to_string()))?
            .as_str()
            .parse()?;

        let color = if white { Color::White } else { Color::Black };
        let mut candidates = self.all(Piece::new(kind, color))
            .into_iter()
            .filter_map(Square::from_index)
            .filter(|sq| src_file.map_or(true, |f| sq.file() == f))
            .filter(|sq| src_rank.map_or(true, |r| sq.rank() == r))
            .filter(|sq| self.valid_moves(sq.index()).contains(&dst));

        let src = candidates.next().ok_or_else(|| ChessError::NoMatchingMove(notation.to_string()))?;
        if candidates.next().is_some() {
            return Err(ChessError::AmbiguousMove(notation.to_string()));
        }
        Ok((src, dst))
    }

    /// Shortest notation that resolves back to exactly `src -> dst`: piece and
    /// destination, then with the source file, then with file and rank.
    pub fn coords_to_algebraic(&self, src: Square, dst: Square) -> ChessResult<String> {
        let piece = self.at(src).ok_or_else(|| ChessError::NoPieceAtSource(src.to_string()))?;
        let white = piece.color == Color::White;

        if piece.kind == PieceKind::King && castle_rook(piece.color, src, dst).is_some() {
            let castle = if dst.file() > src.file() { KINGSIDE_CASTLE } else { QUEENSIDE_CASTLE };
            return Ok(castle.to_string());
        }

        let letter = piece.kind.letter();
        let capture = if self.at(dst).is_some() { "x" } else { "" };
        let target = dst.to_notation();

        let tries = [
            format!("{}{}{}", letter, capture, target),
            format!("{}{}{}{}", letter, src.file_char(), capture, target),
            format!("{}{}{}{}{}", letter, src.file_char(), src.rank(), capture, target),
        ];

        tries
            .into_iter()
            .find(|attempt| self.algebraic(attempt, white) == Ok((src, dst)))
            .ok_or_else(|| ChessError::NoDisambiguation(src.to_string(), dst.to_string()))
    }

    /// String-coordinate form of [`Board::coords_to_algebraic`].
    pub fn coords_to_algebraic_str(&self, src: &str, dst: &str) -> ChessResult<String> {
        self.coords_to_algebraic(src.parse()?, dst.parse()?)
    }
}
