// src/error.rs
use thiserror::Error;

// --- Geometry / Parsing Errors ---

/// Malformed input or impossible geometry. Never retried; the receiver is left untouched.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ChessError {
    #[error("invalid coordinate '{0}': expected a file A-H followed by a rank 1-8")]
    InvalidCoordinate(String),
    #[error("invalid board layout: {0}")]
    InvalidLayout(String),
    #[error("no piece at {0}")]
    NoPieceAtSource(String),
    #[error("invalid notation: '{0}'")]
    InvalidNotation(String),
    #[error("ambiguous move: '{0}' matches more than one piece")]
    AmbiguousMove(String),
    #[error("no matching move for '{0}'")]
    NoMatchingMove(String),
    #[error("can't find a valid move described by {0} -> {1}")]
    NoDisambiguation(String, String),
}

// --- Game-Rule Refusals ---

/// A well-formed request the game rules turn down.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Refusal {
    #[error("chess is not allowed in this channel")]
    NotAllowed,
    #[error("the game has not started yet")]
    NotStarted,
    #[error("it's not your turn")]
    NotYourTurn,
    #[error("you are not playing in this game")]
    NotAPlayer,
    #[error("the game is over")]
    GameOver,
    #[error("there are no moves to take back")]
    NoHistoryToTakeBack,
    #[error("you can't take a move back")]
    CannotTakeBack,
    #[error("there is no previous board #{0}")]
    NoSuchBoard(usize),
}

/// Everything a session operation can fail with.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error(transparent)]
    Refused(#[from] Refusal),
    #[error(transparent)]
    Chess(#[from] ChessError),
}

impl SessionError {
    pub fn refusal(&self) -> Option<&Refusal> {
        match self {
            SessionError::Refused(r) => Some(r),
            SessionError::Chess(_) => None,
        }
    }
}

pub type ChessResult<T> = std::result::Result<T, ChessError>;
pub type SessionResult<T> = std::result::Result<T, SessionError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn refusal_only_for_refused_errors() {
        let refused: SessionError = Refusal::NotYourTurn.into();
        assert_eq!(refused.refusal(), Some(&Refusal::NotYourTurn));
        let chess: SessionError = ChessError::NoPieceAtSource("E4".to_string()).into();
        assert_eq!(chess.refusal(), None);
        assert_eq!(chess.to_string(), "no piece at E4");
    }
}
