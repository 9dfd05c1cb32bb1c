// src/message.rs
use serde::{Deserialize, Serialize};

/// A chat message addressed to the bot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Inbound {
    pub channel: String,
    pub user: String,
    pub text: String,
}

impl Inbound {
    pub fn new(channel: impl Into<String>, user: impl Into<String>, text: impl Into<String>) -> Self {
        Inbound { channel: channel.into(), user: user.into(), text: text.into() }
    }

    /// Parses a `<channel> <user> <text...>` line; `#` in front of the channel is dropped.
    pub fn from_line(line: &str) -> Option<Self> {
        let mut parts = line.trim().splitn(3, char::is_whitespace);
        let channel = parts.next()?.trim_start_matches('#');
        let user = parts.next()?;
        let text = parts.next()?.trim();
        if channel.is_empty() || user.is_empty() || text.is_empty() {
            return None;
        }
        Some(Inbound::new(channel, user, text))
    }
}

/// A reply for a channel, optionally with a rendered board attached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Outbound {
    pub channel: String,
    pub text: String,
    pub image: Option<String>,
}

impl Outbound {
    pub fn text(channel: &str, text: impl Into<String>) -> Self {
        Outbound { channel: channel.to_string(), text: text.into(), image: None }
    }

    pub fn with_image(channel: &str, text: impl Into<String>, image: Option<String>) -> Self {
        Outbound { channel: channel.to_string(), text: text.into(), image }
    }
}
