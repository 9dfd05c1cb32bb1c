// src/command.rs
use crate::piece::Color;
use lazy_static::lazy_static;
use regex::Regex;

/// What a chat message asks the bot to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Claim(Color),
    Start,
    MoveCoords(String, String),
    MoveNotation(String),
    TakeBack,
    History,
    ShowPrevious(usize),
    ShowBoard,
    Resign,
    KeepPlaying,
    DeclareWinner(Color),
    KnockOut(String),
    MoveGame(String),
    Status,
    Export,
    ConfirmReset,
    AskReset,
    Allow,
    Disallow,
    Help,
}

impl Command {
    /// Commands that still work in a channel where chess is not allowed.
    pub fn bypasses_allow(&self) -> bool {
        matches!(self, Command::Status | Command::Allow | Command::Help)
    }
}

lazy_static! {
    static ref CLAIM_BLACK: Regex = Regex::new(r"(?i)claim.*black").unwrap();
    static ref CLAIM_WHITE: Regex = Regex::new(r"(?i)claim.*white").unwrap();
    static ref START: Regex = Regex::new(r"(?i)start").unwrap();
    // Notation is case-sensitive: the piece letter is uppercase and squares lowercase.
    static ref NOTATION_MOVE: Regex =
        Regex::new(r"(?:^|\s)(O-O-O|O-O|[PBNRQK][a-h]?[1-8]?x?[a-h][1-8])(?:$|[\s+#!?])").unwrap();
    static ref COORD_MOVE: Regex = Regex::new(r"(?i)\b([a-h][1-8])\s?([a-h][1-8])\b").unwrap();
    static ref TAKE_BACK: Regex = Regex::new(r"(?i)take\s?back").unwrap();
    static ref HISTORY: Regex = Regex::new(r"(?i)chess.*history").unwrap();
    static ref PREVIOUS_BOARD: Regex = Regex::new(r"(?i)board\D*([0-9]+)").unwrap();
    static ref BOARD: Regex = Regex::new(r"(?i)chess.*board").unwrap();
    static ref RESIGN: Regex = Regex::new(r"(?i)i\s+resign").unwrap();
    static ref KEEP_PLAYING: Regex = Regex::new(r"(?i)keep.*playing").unwrap();
    static ref WINS: Regex = Regex::new(r"(?i)(black|white) wins?").unwrap();
    static ref KNOCK_OUT: Regex = Regex::new(r"(?i)knock.*out.*?([a-h][1-8])").unwrap();
    static ref MOVE_GAME: Regex = Regex::new(r"(?i)move.*game.*to\s+#?(\S+)").unwrap();
    static ref STATUS: Regex = Regex::new(r"(?i)yo.*chess.*bot|what.*up.*chess").unwrap();
    static ref EXPORT: Regex = Regex::new(r"(?i)chess.*(json|export)").unwrap();
    static ref CONFIRM_RESET: Regex = Regex::new(r"(?i)definitely.*reset").unwrap();
    static ref ASK_RESET: Regex = Regex::new(r"(?i)reset.*game").unwrap();
    static ref ALLOW: Regex = Regex::new(r"(?i)chess.*ok.*here").unwrap();
    static ref DISALLOW: Regex = Regex::new(r"(?i)no.*chess.*here").unwrap();
    static ref HELP: Regex = Regex::new(r"(?i)help.*me.*chessbot|chess help").unwrap();
}

fn capture(rx: &Regex, text: &str, group: usize) -> Option<String> {
    rx.captures(text).and_then(|c| c.get(group)).map(|m| m.as_str().to_string())
}

fn parse_color(word: &str) -> Color {
    if word.eq_ignore_ascii_case("white") { Color::White } else { Color::Black }
}

/// Recognizes a command anywhere in the text; the first rule that matches wins.
pub fn parse(text: &str) -> Option<Command> {
    if CLAIM_BLACK.is_match(text) {
        return Some(Command::Claim(Color::Black));
    }
    if CLAIM_WHITE.is_match(text) {
        return Some(Command::Claim(Color::White));
    }
    if START.is_match(text) {
        return Some(Command::Start);
    }
    if let Some(notation) = capture(&NOTATION_MOVE, text, 1) {
        return Some(Command::MoveNotation(notation));
    }
    if let Some(caps) = COORD_MOVE.captures(text) {
        return Some(Command::MoveCoords(caps[1].to_uppercase(), caps[2].to_uppercase()));
    }
    if TAKE_BACK.is_match(text) {
        return Some(Command::TakeBack);
    }
    if HISTORY.is_match(text) {
        return Some(Command::History);
    }
    if let Some(n) = capture(&PREVIOUS_BOARD, text, 1).and_then(|n| n.parse().ok()) {
        return Some(Command::ShowPrevious(n));
    }
    if BOARD.is_match(text) {
        return Some(Command::ShowBoard);
    }
    if RESIGN.is_match(text) {
        return Some(Command::Resign);
    }
    if KEEP_PLAYING.is_match(text) {
        return Some(Command::KeepPlaying);
    }
    if let Some(color) = capture(&WINS, text, 1) {
        return Some(Command::DeclareWinner(parse_color(&color)));
    }
    if let Some(square) = capture(&KNOCK_OUT, text, 1) {
        return Some(Command::KnockOut(square.to_uppercase()));
    }
    if let Some(channel) = capture(&MOVE_GAME, text, 1) {
        return Some(Command::MoveGame(channel));
    }
    if STATUS.is_match(text) {
        return Some(Command::Status);
    }
    if EXPORT.is_match(text) {
        return Some(Command::Export);
    }
    if CONFIRM_RESET.is_match(text) {
        return Some(Command::ConfirmReset);
    }
    if ASK_RESET.is_match(text) {
        return Some(Command::AskReset);
    }
    if ALLOW.is_match(text) {
        return Some(Command::Allow);
    }
    if DISALLOW.is_match(text) {
        return Some(Command::Disallow);
    }
    if HELP.is_match(text) {
        return Some(Command::Help);
    }
    None
}
