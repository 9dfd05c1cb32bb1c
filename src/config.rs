// src/config.rs
use std::env;

// --- Constants ---
pub const DEFAULT_BOT_NAME: &str = "chessbot3000";
const BOT_NAME_VAR: &str = "CHESSBOT_NAME";
const ALLOW_BY_DEFAULT_VAR: &str = "CHESSBOT_ALLOW_BY_DEFAULT";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Messages from this user are the bot's own and are ignored.
    pub bot_name: String,
    /// Whether new and reset games accept chess commands without "chess is ok here".
    pub allow_by_default: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config { bot_name: DEFAULT_BOT_NAME.to_string(), allow_by_default: false }
    }
}

impl Config {
    /// Defaults overridden by `CHESSBOT_NAME` and `CHESSBOT_ALLOW_BY_DEFAULT`.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Config::default();
        if let Some(name) = lookup(BOT_NAME_VAR).filter(|n| !n.trim().is_empty()) {
            config.bot_name = name.trim().to_string();
        }
        if let Some(flag) = lookup(ALLOW_BY_DEFAULT_VAR) {
            config.allow_by_default = matches!(flag.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on");
        }
        config
    }
}
