// src/render.rs
use crate::board::Board;
use std::fmt::Write;

/// Turns a board into something a chat client can show. The returned string is an
/// opaque reference (a URL, a file name, or the picture itself).
pub trait BoardRenderer: Send + Sync {
    fn render(&self, board: &Board) -> anyhow::Result<String>;
}

/// Framed text diagram, rank 8 at the top.
#[derive(Debug, Default, Clone, Copy)]
pub struct TextRenderer;

impl BoardRenderer for TextRenderer {
    fn render(&self, board: &Board) -> anyhow::Result<String> {
        let mut out = String::new();
        writeln!(out, "  +-----------------+")?;
        for (row, cells) in board.cells().chunks(8).enumerate() {
            write!(out, "{} | ", 8 - row)?;
            for cell in cells {
                match cell {
                    Some(piece) => write!(out, "{} ", piece)?,
                    None => write!(out, ". ")?,
                }
            }
            writeln!(out, "|")?;
        }
        writeln!(out, "  +-----------------+")?;
        write!(out, "    a b c d e f g h")?;
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn starting_board_diagram() {
        let text = TextRenderer.render(&Board::starting()).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 11);
        assert_eq!(lines[1], "8 | R N B Q K B N R |");
        assert_eq!(lines[5], "4 | . . . . . . . . |");
        assert_eq!(lines[8], "1 | r n b q k b n r |");
        assert_eq!(lines[10], "    a b c d e f g h");
    }
}
