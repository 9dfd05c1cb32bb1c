// src/lib.rs
//! Chess for chat channels: a 64-cell board, pseudo-legal move generation,
//! algebraic notation with disambiguation, and per-channel game sessions with
//! clocks, history and takebacks.
//!
//! Check and checkmate are never detected; players police that themselves.

pub mod board;
pub mod command;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod message;
pub mod movegen;
pub mod notation;
pub mod piece;
pub mod render;
pub mod session;
pub mod store;

pub use board::{Board, Square, STARTING_LAYOUT};
pub use config::Config;
pub use dispatch::Dispatcher;
pub use error::{ChessError, Refusal, SessionError};
pub use message::{Inbound, Outbound};
pub use piece::{Color, Piece, PieceKind};
pub use render::{BoardRenderer, TextRenderer};
pub use session::{GameSession, Phase, PlayedMove, SessionSummary, StartState};
pub use store::SessionStore;
