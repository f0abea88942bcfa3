use clap::Parser;
use simplelog::{ConfigBuilder, LevelFilter, WriteLogger};
use std::fs::File;

use parley::core::config;

#[derive(Parser)]
#[command(name = "parley", about = "Terminal chat client with a simulated assistant")]
struct Args {
    /// Milliseconds the simulated assistant waits before replying
    #[arg(long)]
    reply_delay_ms: Option<u64>,

    /// Seed for deterministic reply selection
    #[arg(long)]
    seed: Option<u64>,
}

#[tokio::main]
async fn main() -> std::io::Result<()> {
    let args = Args::parse();

    // Initialize file logger - writes to parley.log in current directory
    let log_config = ConfigBuilder::new().set_time_format_rfc3339().build();
    if let Ok(log_file) = File::create("parley.log") {
        let _ = WriteLogger::init(LevelFilter::Debug, log_config, log_file);
    }

    let file_config = match config::load_config() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load config: {e}");
            return Err(std::io::Error::other(e));
        }
    };
    let resolved = config::resolve(&file_config, args.reply_delay_ms, args.seed);

    log::info!(
        "Parley starting up (reply delay: {}ms, seed: {:?})",
        resolved.reply_delay_ms,
        resolved.seed
    );

    parley::tui::run(resolved)
}
