//! gbot CLI: run the GPT relay Telegram bot. Config from env (.env supported).

use anyhow::Result;
use clap::{Parser, Subcommand};
use gbot_cli::config::BotConfig;
use gbot_cli::runner::run_bot;

#[derive(Parser)]
#[command(name = "gbot")]
#[command(about = "GPT relay Telegram bot", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the bot (config from env; token can override TELEGRAM_BOT_TOKEN).
    Run {
        #[arg(short, long)]
        token: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run { token } => {
            let config = BotConfig::load(token)?;
            run_bot(config).await
        }
    }
}
