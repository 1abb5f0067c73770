use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "sharebridge", about = "Replay share intents through the sharebridge client")]
pub struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/sharebridge.toml")]
    pub config: String,

    /// Replay script describing launch content and later share events
    #[arg(short, long)]
    pub script: PathBuf,

    /// How long to wait for each feed element, in milliseconds
    #[arg(long, default_value_t = 1000)]
    pub timeout_ms: u64,
}
