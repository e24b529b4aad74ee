//! lexidrill — vocabulary drill bot.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

mod commands;
mod handlers;

#[derive(Parser)]
#[command(
    name = "lexidrill",
    version,
    about = "Vocabulary drill bot with grammar-graded scoring"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the bot
    Run {
        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,

        /// Chat over stdin/stdout instead of Telegram
        #[arg(long)]
        console: bool,
    },

    /// Create a starter config and word list
    Init,

    /// Fetch and print a batch of drill words
    Words {
        /// Number of words to fetch (default: broadcast.words_per_session)
        #[arg(long)]
        count: Option<usize>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Grammar-check a sentence with the configured checker
    Grammar {
        /// Text to check
        text: String,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("lexidrill=info".parse().unwrap()),
        )
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Run { config, console } => commands::run::execute(config, console).await,
        Commands::Init => commands::init::execute(),
        Commands::Words { count, config } => commands::words::execute(count, config).await,
        Commands::Grammar { text, config } => commands::grammar::execute(text, config).await,
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
