use std::path::PathBuf;

use clap::Parser;

/// chatrelay: relays a Discord channel to an OpenAI chat model.
#[derive(Parser, Debug)]
#[command(name = "chatrelay", version, about)]
pub struct Args {
    /// Config file path override.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Log level override (debug, info, warn, error).
    #[arg(long)]
    pub log_level: Option<String>,

    /// Skip registering slash commands on startup.
    #[arg(long)]
    pub no_register_commands: bool,
}

pub fn parse() -> Args {
    Args::parse()
}
