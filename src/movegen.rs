// src/movegen.rs
use crate::board::{Board, Square};
use crate::piece::{Color, Piece, PieceKind};

// --- Direction Tables ---

// Directions for sliding pieces
const DIRECTIONS: &[(i8, i8, bool)] = &[ // (df, dr, is_diagonal)
    ( 0,  1, false), ( 0, -1, false), ( 1,  0, false), (-1,  0, false), // Orthogonal
    ( 1,  1, true),  (-1,  1, true),  ( 1, -1, true),  (-1, -1, true),  // Diagonal
];

const KNIGHT_OFFSETS: [(i8, i8); 8] = [
    ( 1,  2), (-1,  2), ( 1, -2), (-1, -2),
    ( 2,  1), (-2,  1), ( 2, -1), (-2, -1),
];

const KING_OFFSETS: [(i8, i8); 8] = [
    (-1, -1), ( 0, -1), (-1,  0), ( 1,  1),
    ( 0,  1), ( 1,  0), (-1,  1), ( 1, -1),
];

/// Rank from which a pawn may take an adjacent enemy pawn sideways-forward.
fn sideways_capture_rank(color: Color) -> u8 {
    match color { Color::White => 5, Color::Black => 4 }
}

// --- Pseudo-Legal Move Generation ---

impl Board {
    /// Pseudo-legal destinations for the piece at `index`: geometry and occupancy only,
    /// no check detection and no castling. Empty cells have no destinations.
    pub fn valid_moves(&self, index: usize) -> Vec<Square> {
        let (Some(piece), Some(from)) = (self.get(index), Square::from_index(index)) else {
            return Vec::new();
        };

        let mut moves = Vec::with_capacity(28);
        match piece.kind {
            PieceKind::Pawn => self.pawn_moves(from, piece, &mut moves),
            PieceKind::Knight => self.step_moves(from, piece, &KNIGHT_OFFSETS, &mut moves),
            PieceKind::King => self.step_moves(from, piece, &KING_OFFSETS, &mut moves),
            PieceKind::Bishop => self.sliding_moves(from, piece, true, false, &mut moves),
            PieceKind::Rook => self.sliding_moves(from, piece, false, true, &mut moves),
            PieceKind::Queen => self.sliding_moves(from, piece, true, true, &mut moves),
        }
        moves
    }

    /// Indices holding exactly `piece`, ascending.
    pub fn all(&self, piece: Piece) -> Vec<usize> {
        self.cells()
            .iter()
            .enumerate()
            .filter(|(_, cell)| **cell == Some(piece))
            .map(|(i, _)| i)
            .collect()
    }

    fn is_empty(&self, sq: Square) -> bool {
        self.at(sq).is_none()
    }

    fn is_opponent(&self, sq: Square, mover: &Piece) -> bool {
        self.at(sq).is_some_and(|other| other.is_opponent_of(mover))
    }

    /// Pushes, double push from the home rank, diagonal captures and the
    /// rank-inferred sideways capture. The sideways capture does not know whether
    /// the neighbouring pawn has just made a double step, and does not look at
    /// what occupies the landing cell.
    fn pawn_moves(&self, from: Square, pawn: Piece, moves: &mut Vec<Square>) {
        if from.rank() == pawn.color.last_rank() { return; }
        let fwd = pawn.color.forward();

        if let Some(one) = from.offset(0, fwd) {
            if self.is_empty(one) {
                moves.push(one);
                if from.rank() == pawn.color.pawn_home_rank() {
                    if let Some(two) = from.offset(0, 2 * fwd) {
                        if self.is_empty(two) {
                            moves.push(two);
                        }
                    }
                }
            }
        }

        for df in [-1, 1] {
            if let Some(diag) = from.offset(df, fwd) {
                if self.is_opponent(diag, &pawn) {
                    moves.push(diag);
                }
            }
        }

        if from.rank() == sideways_capture_rank(pawn.color) {
            let enemy_pawn = Piece::new(PieceKind::Pawn, pawn.color.opponent());
            for df in [-1, 1] {
                let beside = from.offset(df, 0);
                let behind = from.offset(df, fwd);
                if let (Some(beside), Some(behind)) = (beside, behind) {
                    // Whatever stands on the landing cell; an enemy there was already added as a diagonal capture.
                    if self.at(beside) == Some(enemy_pawn) && !moves.contains(&behind) {
                        moves.push(behind);
                    }
                }
            }
        }
    }

    /// Knight and king: fixed offsets onto empty or enemy-held cells.
    fn step_moves(&self, from: Square, piece: Piece, offsets: &[(i8, i8)], moves: &mut Vec<Square>) {
        for &(df, dr) in offsets {
            if let Some(to) = from.offset(df, dr) {
                if self.is_empty(to) || self.is_opponent(to, &piece) {
                    moves.push(to);
                }
            }
        }
    }

    /// Rook, bishop and queen rays. A ray includes an enemy-held cell and stops there;
    /// an own piece stops it without being included.
    fn sliding_moves(&self, from: Square, piece: Piece, diagonals: bool, orthogonals: bool, moves: &mut Vec<Square>) {
        for &(df, dr, is_diagonal) in DIRECTIONS {
            if (diagonals && is_diagonal) || (orthogonals && !is_diagonal) {
                let mut current = from;
                while let Some(next) = current.offset(df, dr) {
                    match self.at(next) {
                        None => moves.push(next),
                        Some(other) => {
                            if other.is_opponent_of(&piece) { moves.push(next); }
                            break;
                        }
                    }
                    current = next;
                }
            }
        }
    }
}
