// src/main.rs
use channel_chess::{Config, Dispatcher, Inbound, TextRenderer};
use log::{info, warn};
use std::io::{self, BufRead, Write};

// --- Main Loop ---

/// Reads `<channel> <user> <text...>` lines from stdin and prints the bot's replies.
fn main() -> anyhow::Result<()> {
    env_logger::init();

    let config = Config::from_env();
    info!("starting as {}", config.bot_name);
    let dispatcher = Dispatcher::new(config, TextRenderer);

    println!("==============================");
    println!("|       Channel Chess        |");
    println!("==============================");
    println!("Enter lines as: <channel> <user> <message>   (e.g. general alice chess help)");

    let stdin = io::stdin();
    let mut stdout = io::stdout();
    for line in stdin.lock().lines() {
        let line = line?;
        if line.trim().is_empty() { continue; }

        let Some(msg) = Inbound::from_line(&line) else {
            warn!("can't parse input line: {}", line);
            println!("Input Error: expected <channel> <user> <message>");
            continue;
        };

        if let Some(reply) = dispatcher.handle(&msg) {
            writeln!(stdout, "[#{}] {}", reply.channel, reply.text)?;
            if let Some(image) = reply.image {
                writeln!(stdout, "{}", image)?;
            }
            stdout.flush()?;
        }
    }

    println!("\nEnd of input detected. Goodbye.");
    Ok(())
}
