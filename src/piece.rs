// src/piece.rs
use serde::{Deserialize, Serialize};
use std::fmt;

/// Marker used for an empty cell in layout text.
pub const EMPTY_CELL: char = '_';

#[derive(Debug, Serialize, Deserialize, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Color { White, Black }

impl Color {
    pub fn opponent(&self) -> Color {
        match self { Color::White => Color::Black, Color::Black => Color::White }
    }

    /// Rank a pawn of this color starts on.
    pub fn pawn_home_rank(&self) -> u8 {
        match self { Color::White => 2, Color::Black => 7 }
    }

    /// Rank a pawn of this color promotes on.
    pub fn last_rank(&self) -> u8 {
        match self { Color::White => 8, Color::Black => 1 }
    }

    /// +1 when this color's pawns move toward rank 8.
    pub fn forward(&self) -> i8 {
        match self { Color::White => 1, Color::Black => -1 }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Color::White => write!(f, "white"),
            Color::Black => write!(f, "black"),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Copy, Clone, PartialEq, Eq, Hash)]
pub enum PieceKind { Pawn, Knight, Bishop, Rook, Queen, King }

impl PieceKind {
    /// Uppercase letter used by notation, e.g. `N` for a knight.
    pub fn letter(&self) -> char {
        match self {
            PieceKind::Pawn => 'P', PieceKind::Knight => 'N', PieceKind::Bishop => 'B',
            PieceKind::Rook => 'R', PieceKind::Queen => 'Q', PieceKind::King => 'K',
        }
    }

    pub fn from_letter(c: char) -> Option<Self> {
        match c.to_ascii_uppercase() {
            'P' => Some(PieceKind::Pawn), 'N' => Some(PieceKind::Knight), 'B' => Some(PieceKind::Bishop),
            'R' => Some(PieceKind::Rook), 'Q' => Some(PieceKind::Queen), 'K' => Some(PieceKind::King),
            _ => None,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Copy, Clone, PartialEq, Eq, Hash)]
pub struct Piece {
    pub kind: PieceKind,
    pub color: Color,
}

impl Piece {
    pub const fn new(kind: PieceKind, color: Color) -> Self { Piece { kind, color } }

    /// Decodes a layout character. White pieces are lowercase, black pieces uppercase.
    pub fn from_char(c: char) -> Option<Self> {
        let color = if c.is_ascii_lowercase() { Color::White } else { Color::Black };
        PieceKind::from_letter(c).map(|kind| Piece::new(kind, color))
    }

    pub fn to_char(&self) -> char {
        let letter = self.kind.letter();
        match self.color {
            Color::White => letter.to_ascii_lowercase(),
            Color::Black => letter,
        }
    }

    pub fn is_opponent_of(&self, other: &Piece) -> bool {
        self.color != other.color
    }
}

impl fmt::Display for Piece {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_char())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn case_encodes_color() {
        assert_eq!(Piece::from_char('n'), Some(Piece::new(PieceKind::Knight, Color::White)));
        assert_eq!(Piece::from_char('N'), Some(Piece::new(PieceKind::Knight, Color::Black)));
        assert_eq!(Piece::from_char('x'), None);
        assert_eq!(Piece::from_char(EMPTY_CELL), None);
    }

    #[test]
    fn char_encoding_is_reversible() {
        for c in "pnbrqkPNBRQK".chars() {
            let piece = Piece::from_char(c).unwrap();
            assert_eq!(piece.to_char(), c);
        }
    }
}
