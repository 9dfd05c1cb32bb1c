// src/store.rs
use crate::config::Config;
use crate::session::GameSession;
use log::{debug, info};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

type SharedSession = Arc<Mutex<GameSession>>;

/// Channel id -> game. Each game sits behind its own lock so operations on one
/// channel are serialized without blocking the others.
#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: Mutex<HashMap<String, SharedSession>>,
    allow_by_default: bool,
}

// Session operations validate before mutating, so a poisoned lock still guards a consistent value.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl SessionStore {
    pub fn new(config: &Config) -> Self {
        SessionStore {
            sessions: Mutex::new(HashMap::new()),
            allow_by_default: config.allow_by_default,
        }
    }

    fn fresh_session(&self) -> GameSession {
        let mut session = GameSession::new();
        session.set_allowed(self.allow_by_default);
        session
    }

    /// Shared handle to the channel's session, creating it on first use.
    pub fn session(&self, channel: &str) -> SharedSession {
        let mut sessions = lock(&self.sessions);
        sessions
            .entry(channel.to_string())
            .or_insert_with(|| {
                debug!("new session for #{}", channel);
                Arc::new(Mutex::new(self.fresh_session()))
            })
            .clone()
    }

    /// Runs `f` with exclusive access to the channel's session.
    pub fn with_session<R>(&self, channel: &str, f: impl FnOnce(&mut GameSession) -> R) -> R {
        let session = self.session(channel);
        let mut guard = lock(&session);
        f(&mut guard)
    }

    /// Replaces the channel's game with a brand-new one and returns the old game.
    pub fn reset(&self, channel: &str) -> GameSession {
        let session = self.session(channel);
        let mut guard = lock(&session);
        info!("resetting game in #{}", channel);
        std::mem::replace(&mut *guard, self.fresh_session())
    }

    /// Moves the game in `from` to `to`, replacing whatever was there, and resets `from`.
    pub fn transfer(&self, from: &str, to: &str) {
        if from == to {
            return;
        }
        let game = self.reset(from);
        let target = self.session(to);
        *lock(&target) = game;
        info!("moved game from #{} to #{}", from, to);
    }

    /// Channels that currently hold a session, sorted.
    pub fn channels(&self) -> Vec<String> {
        let mut channels: Vec<String> = lock(&self.sessions).keys().cloned().collect();
        channels.sort();
        channels
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Board;
    use crate::piece::Color;
    use pretty_assertions::assert_eq;
    use std::thread;

    fn allowed_store() -> SessionStore {
        SessionStore::new(&Config { allow_by_default: true, ..Config::default() })
    }

    #[test]
    fn sessions_are_created_lazily_per_channel() {
        let store = allowed_store();
        assert!(store.channels().is_empty());
        store.with_session("general", |s| s.claim_side("alice", Color::White)).unwrap();
        store.with_session("random", |s| assert_eq!(s.white(), None));
        assert_eq!(store.channels(), vec!["general".to_string(), "random".to_string()]);
        store.with_session("general", |s| assert_eq!(s.white(), Some("alice")));
    }

    #[test]
    fn new_sessions_follow_the_configured_default() {
        let store = SessionStore::new(&Config::default());
        assert!(!store.with_session("general", |s| s.is_allowed()));
    }

    #[test]
    fn reset_installs_a_fresh_game() {
        let store = allowed_store();
        store.with_session("general", |s| {
            s.claim_side("alice", Color::White).unwrap();
            s.knock_out("E2").unwrap();
        });
        let old = store.reset("general");
        assert_eq!(old.white(), Some("alice"));
        store.with_session("general", |s| {
            assert_eq!(s.white(), None);
            assert_eq!(s.board(), &Board::starting());
        });
    }

    #[test]
    fn transfer_moves_the_game_and_resets_the_source() {
        let store = allowed_store();
        store.with_session("general", |s| s.claim_side("alice", Color::Black)).unwrap();
        store.transfer("general", "chess");
        store.with_session("chess", |s| assert_eq!(s.black(), Some("alice")));
        store.with_session("general", |s| assert_eq!(s.black(), None));

        store.transfer("chess", "chess");
        store.with_session("chess", |s| assert_eq!(s.black(), Some("alice")));
    }

    #[test]
    fn concurrent_moves_on_one_channel_are_serialized() {
        let store = Arc::new(allowed_store());
        store.with_session("general", |s| {
            s.claim_side("solo", Color::White).unwrap();
            s.claim_side("solo", Color::Black).unwrap();
            s.start("solo").unwrap();
        });

        let handles: Vec<_> = ["Nf3", "Nc3", "Pa3", "Ph3"]
            .into_iter()
            .map(|notation| {
                let store = Arc::clone(&store);
                thread::spawn(move || {
                    store.with_session("general", |s| {
                        let white = s.turn() == Color::White;
                        let shifted = if white { notation.to_string() } else { notation.replace('3', "6") };
                        s.submit_notation("solo", &shifted).is_ok()
                    })
                })
            })
            .collect();

        let played = handles.into_iter().filter_map(|h| h.join().ok()).filter(|ok| *ok).count();
        store.with_session("general", |s| {
            assert_eq!(played, 4);
            assert_eq!(s.moves().len(), 4);
            assert_eq!(s.previous_boards().len(), 4);
            assert_eq!(s.turn(), Color::White);
        });
    }
}
