// src/board.rs
use crate::error::{ChessError, ChessResult};
use crate::piece::{Color, Piece, PieceKind, EMPTY_CELL};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// --- Constants ---

/// Canonical starting position. Row one is rank 8; lowercase (white) sits on ranks 1-2.
pub const STARTING_LAYOUT: &str = "
RNBQKBNR
PPPPPPPP
________
________
________
________
pppppppp
rnbqkbnr
";

const BACK_RANK: [PieceKind; 8] = [
    PieceKind::Rook, PieceKind::Knight, PieceKind::Bishop, PieceKind::Queen,
    PieceKind::King, PieceKind::Bishop, PieceKind::Knight, PieceKind::Rook,
];

/// Castling files as (king destination, rook home, rook destination). The king starts on E.
const CASTLES: [(u8, u8, u8); 2] = [(6, 7, 5), (2, 0, 3)];
const KING_HOME_FILE: u8 = 4;

// --- Square ---

/// A board coordinate. `file` is 0..8 (A..H), `rank` is 1..=8.
/// Serialized as its coordinate string (`"E4"`) and validated on the way back in.
#[derive(Debug, Serialize, Deserialize, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(try_from = "String", into = "String")]
pub struct Square {
    file: u8,
    rank: u8,
}

impl Square {
    pub fn new(file: u8, rank: u8) -> Option<Self> {
        if file < 8 && (1..=8).contains(&rank) { Some(Square { file, rank }) } else { None }
    }

    /// Index 0 is A8, index 63 is H1.
    pub fn from_index(index: usize) -> Option<Self> {
        if index >= 64 { return None; }
        Some(Square { file: (index % 8) as u8, rank: 8 - (index / 8) as u8 })
    }

    pub fn index(&self) -> usize {
        (8 - self.rank as usize) * 8 + self.file as usize
    }

    pub fn file(&self) -> u8 { self.file }
    pub fn rank(&self) -> u8 { self.rank }

    /// Lowercase file letter, as used by notation.
    pub fn file_char(&self) -> char { (b'a' + self.file) as char }

    /// Square `df` files right and `dr` ranks up, if it is still on the board.
    pub fn offset(&self, df: i8, dr: i8) -> Option<Square> {
        let file = self.file as i8 + df;
        let rank = self.rank as i8 + dr;
        if !(0..8).contains(&file) || !(1..=8).contains(&rank) { return None; }
        Some(Square { file: file as u8, rank: rank as u8 })
    }

    /// Lowercase form used in notation, e.g. `e4`.
    pub fn to_notation(&self) -> String {
        format!("{}{}", self.file_char(), self.rank)
    }
}

impl FromStr for Square {
    type Err = ChessError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = s.as_bytes();
        if bytes.len() != 2 {
            return Err(ChessError::InvalidCoordinate(s.to_string()));
        }
        let file = bytes[0].to_ascii_uppercase();
        let rank = bytes[1];
        if !(b'A'..=b'H').contains(&file) || !(b'1'..=b'8').contains(&rank) {
            return Err(ChessError::InvalidCoordinate(s.to_string()));
        }
        Ok(Square { file: file - b'A', rank: rank - b'0' })
    }
}

impl TryFrom<String> for Square {
    type Error = ChessError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<Square> for String {
    fn from(sq: Square) -> Self {
        sq.to_string()
    }
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", (b'A' + self.file) as char, self.rank)
    }
}

// --- Board ---

/// 64 cells, A8 first. Every mutation hands back a new board.
#[derive(Copy, Clone, PartialEq, Eq, Hash)]
pub struct Board {
    cells: [Option<Piece>; 64],
}

impl Board {
    pub fn empty() -> Self {
        Board { cells: [None; 64] }
    }

    pub fn starting() -> Self {
        let mut cells = [None; 64];
        for (file, kind) in BACK_RANK.iter().enumerate() {
            cells[file] = Some(Piece::new(*kind, Color::Black));
            cells[8 + file] = Some(Piece::new(PieceKind::Pawn, Color::Black));
            cells[48 + file] = Some(Piece::new(PieceKind::Pawn, Color::White));
            cells[56 + file] = Some(Piece::new(*kind, Color::White));
        }
        Board { cells }
    }

    /// Strips all whitespace from a human-written layout and decodes the 64 cells.
    pub fn normalize(raw: &str) -> ChessResult<Self> {
        let flat: Vec<char> = raw.chars().filter(|c| !c.is_whitespace()).collect();
        if flat.len() != 64 {
            return Err(ChessError::InvalidLayout(format!("expected 64 cells, found {}", flat.len())));
        }
        let mut cells = [None; 64];
        for (i, c) in flat.into_iter().enumerate() {
            cells[i] = match c {
                EMPTY_CELL => None,
                _ => Some(Piece::from_char(c).ok_or_else(|| {
                    ChessError::InvalidLayout(format!("unknown cell '{}' at index {}", c, i))
                })?),
            };
        }
        Ok(Board { cells })
    }

    /// Index of a coordinate such as `E4` (file is case-insensitive).
    pub fn position(&self, coord: &str) -> ChessResult<usize> {
        coord.parse::<Square>().map(|sq| sq.index())
    }

    pub fn piece_at(&self, coord: &str) -> ChessResult<Option<Piece>> {
        Ok(self.cells[self.position(coord)?])
    }

    pub fn get(&self, index: usize) -> Option<Piece> {
        self.cells.get(index).copied().flatten()
    }

    pub fn at(&self, square: Square) -> Option<Piece> {
        self.cells[square.index()]
    }

    pub fn cells(&self) -> &[Option<Piece>; 64] {
        &self.cells
    }

    /// New board with cell `index` set to `piece`. `index` must be below 64; release
    /// builds hand back an unchanged copy for anything else.
    pub fn replace(&self, piece: Option<Piece>, index: usize) -> Board {
        debug_assert!(index < 64, "cell index {} is off the board", index);
        let mut next = *self;
        if let Some(cell) = next.cells.get_mut(index) {
            *cell = piece;
        }
        next
    }

    /// Parses both coordinates and applies the move.
    pub fn move_piece(&self, src: &str, dst: &str) -> ChessResult<Board> {
        let src: Square = src.parse()?;
        let dst: Square = dst.parse()?;
        self.apply(src, dst)
    }

    /// Geometry-only move: no legality check. Handles castling rook relocation and
    /// queen promotion. Castling does not look at whether the king or rook moved
    /// before or whether the squares between them are empty.
    pub fn apply(&self, src: Square, dst: Square) -> ChessResult<Board> {
        let piece = self.at(src).ok_or_else(|| ChessError::NoPieceAtSource(src.to_string()))?;

        if piece.kind == PieceKind::King {
            if let Some((rook_from, rook_to)) = castle_rook(piece.color, src, dst) {
                let rook = Some(Piece::new(PieceKind::Rook, piece.color));
                return Ok(self
                    .replace(Some(piece), dst.index())
                    .replace(rook, rook_to.index())
                    .replace(None, src.index())
                    .replace(None, rook_from.index()));
            }
        }

        let landing = if piece.kind == PieceKind::Pawn && dst.rank() == piece.color.last_rank() {
            Piece::new(PieceKind::Queen, piece.color)
        } else {
            piece
        };

        Ok(self.replace(Some(landing), dst.index()).replace(None, src.index()))
    }

    /// Eight lines of layout text, rank 8 first.
    pub fn layout(&self) -> String {
        let mut out = String::with_capacity(72);
        for row in self.cells.chunks(8) {
            out.extend(row.iter().map(|cell| cell.map_or(EMPTY_CELL, |p| p.to_char())));
            out.push('\n');
        }
        out
    }
}

/// Rook squares for a king castling from its home square, if `src -> dst` is a castle.
pub(crate) fn castle_rook(color: Color, src: Square, dst: Square) -> Option<(Square, Square)> {
    let home_rank = color.opponent().last_rank();
    if src.file() != KING_HOME_FILE || src.rank() != home_rank || dst.rank() != home_rank {
        return None;
    }
    CASTLES.iter()
        .find(|(king_to, _, _)| *king_to == dst.file())
        .and_then(|(_, rook_from, rook_to)| Some((Square::new(*rook_from, home_rank)?, Square::new(*rook_to, home_rank)?)))
}

impl Default for Board {
    fn default() -> Self { Board::starting() }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.layout())
    }
}

impl fmt::Debug for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Board(")?;
        write!(f, "{}", self.layout())?;
        write!(f, ")")
    }
}
