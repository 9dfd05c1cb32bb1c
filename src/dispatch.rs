// src/dispatch.rs
use crate::board::Board;
use crate::command::{self, Command};
use crate::config::Config;
use crate::error::{Refusal, SessionError};
use crate::message::{Inbound, Outbound};
use crate::piece::Color;
use crate::render::BoardRenderer;
use crate::session::{GameSession, PlayedMove, StartState};
use crate::store::SessionStore;
use log::{debug, warn};
use std::fmt::Write;
use std::time::Duration;

const HELP_TEXT: &str = "Here's what I know how to do (all commands case-insensitive):
_chess is ok here, thank you_: Allow chess events on this channel
_claim_ _white_ (or _black_): Take a side
_start_: Game starts once both players say this
_A1 B2_ or _a1b2_ or _Nf3_: Make a move. *Only minimal validation is done.*
_take back_: Take a move back
_knock out D4_: Remove the piece at D4 (say, after taking a pawn en passant)
_chess history_: See all previous moves
_board_ <num>: Display earlier board #<num>
_chess board_: Display the current board
_reset game_: Start over
_i resign_: Resign the game
_black_ (or _white_) _wins_: Declare a winner
_keep playing_: Un-declare a winner
_move game to #foo_: Move the game to another channel
_chess export_: Dump the game as JSON
_what's up chessbot_: Current status
_no chess here_: Don't listen for chess stuff on this channel";

// --- Helper to format Duration ---
fn format_duration(duration: Duration) -> String {
    let total_seconds = duration.as_secs();
    let minutes = total_seconds / 60;
    let seconds = total_seconds % 60;
    let display_millis = duration.as_millis() % 1000;
    format!("{:02}:{:02}.{:03}", minutes, seconds, display_millis)
}

fn side_name(color: Color) -> &'static str {
    match color { Color::White => "White", Color::Black => "Black" }
}

/// Routes chat messages to the channel's game and phrases the replies.
pub struct Dispatcher<R: BoardRenderer> {
    store: SessionStore,
    renderer: R,
    config: Config,
}

impl<R: BoardRenderer> Dispatcher<R> {
    pub fn new(config: Config, renderer: R) -> Self {
        Dispatcher { store: SessionStore::new(&config), renderer, config }
    }

    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    /// Handles one message. `None` means the bot stays quiet.
    pub fn handle(&self, msg: &Inbound) -> Option<Outbound> {
        if msg.user == self.config.bot_name {
            return None;
        }
        let command = command::parse(&msg.text)?;
        let channel = msg.channel.as_str();

        if !command.bypasses_allow() && !self.store.with_session(channel, |s| s.is_allowed()) {
            debug!("ignoring {:?} in #{}: chess not allowed", command, channel);
            return None;
        }
        debug!("#{} {}: {:?}", channel, msg.user, command);

        match command {
            Command::MoveGame(target) => {
                let target = target.trim_start_matches('#').to_string();
                self.store.transfer(channel, &target);
                Some(Outbound::text(
                    channel,
                    format!("Ok, I've moved this game to #{} and reset the game in this channel.", target),
                ))
            }
            Command::ConfirmReset => {
                self.store.reset(channel);
                Some(Outbound::text(channel, "OK. I've reset the game. New players should claim spots and start."))
            }
            other => self.store.with_session(channel, |game| self.apply(game, channel, &msg.user, other)),
        }
    }

    fn image(&self, board: &Board) -> Option<String> {
        match self.renderer.render(board) {
            Ok(image) => Some(image),
            Err(e) => {
                warn!("failed to render board: {:#}", e);
                None
            }
        }
    }

    fn apply(&self, game: &mut GameSession, channel: &str, user: &str, command: Command) -> Option<Outbound> {
        let reply = |text: String| Some(Outbound::text(channel, text));

        match command {
            Command::Claim(color) => match game.claim_side(user, color) {
                Ok(()) => reply(format!("Ok, the {} player is now {}", color, user)),
                Err(e) => reply(e.to_string()),
            },
            Command::Start => match game.start(user) {
                Ok(StartState::Started) => reply("I've started the game; white's clock is ticking.".to_string()),
                Ok(StartState::Waiting { white_ready, .. }) => {
                    let pending = if white_ready { Color::Black } else { Color::White };
                    reply(format!(
                        "{} ({}) must say start",
                        side_name(pending),
                        game.player(pending).unwrap_or("nobody yet")
                    ))
                }
                Err(e) => reply(e.to_string()),
            },
            Command::MoveCoords(src, dst) => {
                let result = game.submit_move(user, &src, &dst);
                self.move_reply(game, channel, user, result, "That's not a valid move")
            }
            Command::MoveNotation(notation) => {
                let result = game.submit_notation(user, &notation);
                self.move_reply(game, channel, user, result, "I can't understand that move")
            }
            Command::TakeBack => match game.take_back(user) {
                Ok(taken) => {
                    let color = game.turn();
                    Some(Outbound::with_image(
                        channel,
                        format!("{} ({}) takes back {}, {}'s move again", side_name(color), user, taken, color),
                        self.image(game.board()),
                    ))
                }
                Err(e) => reply(e.to_string()),
            },
            Command::History => {
                let mut out = String::from("All moves:\n");
                for (i, mv) in game.moves().iter().enumerate() {
                    let _ = writeln!(out, "_{}_. *{}*", i, mv);
                }
                reply(out)
            }
            Command::ShowPrevious(n) => match game.board_at(n) {
                Ok(board) => Some(Outbound::with_image(
                    channel,
                    format!("Previous board #{} (type 'chess board' for current board)", n),
                    self.image(board),
                )),
                Err(_) => reply(format!("I can't fetch previous board {}", n)),
            },
            Command::ShowBoard => {
                let turn = game.turn();
                Some(Outbound::with_image(
                    channel,
                    format!("The current board; it's {}'s ({}) move", turn, game.player(turn).unwrap_or("nobody")),
                    self.image(game.board()),
                ))
            }
            Command::Resign => match game.resign(user) {
                Ok(_) => reply(self.winner_text(game)),
                Err(e) => reply(e.to_string()),
            },
            Command::DeclareWinner(color) => match game.declare_winner(color) {
                Ok(()) => reply(self.winner_text(game)),
                Err(e) => reply(e.to_string()),
            },
            Command::KeepPlaying => match game.clear_winner() {
                Ok(()) => reply("Ok. I've forgotten who won, so you can keep making moves.".to_string()),
                Err(e) => reply(e.to_string()),
            },
            Command::KnockOut(square) => match game.knock_out(&square) {
                Ok(()) => reply(format!("Removed piece (if any) at {}.", square)),
                Err(e) => reply(e.to_string()),
            },
            Command::Status => reply(self.status_text(game)),
            Command::Export => match serde_json::to_string_pretty(&game.summary()) {
                Ok(json) => reply(json),
                Err(e) => {
                    warn!("failed to export game in #{}: {}", channel, e);
                    reply("I couldn't export this game.".to_string())
                }
            },
            Command::AskReset => reply("Are you sure? Say 'definitely reset' if you are.".to_string()),
            Command::Allow => {
                game.set_allowed(true);
                reply("Ok. I'll allow chess games here.".to_string())
            }
            Command::Disallow => {
                game.set_allowed(false);
                reply("Ok. I won't respond to chess events on this channel.".to_string())
            }
            Command::Help => reply(HELP_TEXT.to_string()),
            // Handled by `handle` because they replace whole sessions.
            Command::MoveGame(_) | Command::ConfirmReset => None,
        }
    }

    fn move_reply(
        &self,
        game: &GameSession,
        channel: &str,
        user: &str,
        result: Result<PlayedMove, SessionError>,
        invalid: &str,
    ) -> Option<Outbound> {
        match result {
            Ok(played) => Some(Outbound::with_image(
                channel,
                format!(
                    "{} ({}) moves {} ({} -> {}), {} has taken {} total",
                    side_name(played.color),
                    user,
                    played.notation,
                    played.src,
                    played.dst,
                    played.color,
                    format_duration(played.elapsed)
                ),
                self.image(game.board()),
            )),
            Err(e) => match e.refusal() {
                // Outsiders typing something that looks like a move are not talking to us.
                Some(Refusal::NotAPlayer) => None,
                Some(Refusal::GameOver) => Some(Outbound::text(
                    channel,
                    format!(
                        "{} has already won this game. Reset the game to make moves.",
                        game.winner_identity().unwrap_or("Somebody")
                    ),
                )),
                Some(refusal) => Some(Outbound::text(channel, format!("Sorry, {}.", refusal))),
                None => Some(Outbound::text(channel, format!("{}: {}", invalid, e))),
            },
        }
    }

    fn winner_text(&self, game: &GameSession) -> String {
        match (game.winner(), game.winner_identity()) {
            (Some(_), Some(name)) => format!("*{}* has won the game!", name),
            (Some(color), None) => format!("*{}* has won the game!", side_name(color)),
            (None, _) => "Nobody has won yet.".to_string(),
        }
    }

    fn status_text(&self, game: &GameSession) -> String {
        let mut msg = String::from("I'm OK.\n");
        if !game.is_allowed() {
            msg.push_str("Chess commands are NOT allowed here; say 'chess is ok here' to allow them\n");
        }
        if let Some(color) = game.winner() {
            let name = game.winner_identity().unwrap_or(side_name(color));
            let _ = writeln!(msg, "The current game is over, and *{}* won it. Say 'reset game' to start a new one", name);
        } else if !game.moves().is_empty() {
            let _ = writeln!(msg, "We're {} moves into the current game.", game.moves().len());
        }
        for color in [Color::White, Color::Black] {
            match game.player(color) {
                Some(name) => {
                    let _ = write!(msg, "*{}* is playing {}", name, color);
                    if game.is_ready(color) {
                        let _ = write!(msg, ", and is ready; {} elapsed", format_duration(game.elapsed(color)));
                    }
                    msg.push('\n');
                }
                None => {
                    let _ = writeln!(msg, "Nobody has claimed {}.", color);
                }
            }
        }
        msg
    }
}
