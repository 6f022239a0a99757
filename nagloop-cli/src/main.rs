mod cli;

use anyhow::Result;
use clap::{Parser, Subcommand};
use cli::handlers::{self, Credentials};

#[derive(Parser)]
#[command(name = "nagloop")]
#[command(version)]
#[command(about = "Polls producers on their own cadence and posts their notices to chat rooms")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run every configured producer until interrupted
    ///
    /// Examples:
    ///   nagloop run
    ///   nagloop run --config ./nagloop.toml --dry-run
    Run {
        /// Path to configuration file
        #[arg(long, default_value = "~/.config/nagloop/config.toml")]
        config: String,

        #[command(flatten)]
        credentials: Credentials,

        /// Log posts instead of sending them
        #[arg(long)]
        dry_run: bool,
    },

    /// Post a single message through the configured sink
    Say {
        /// Message text
        message: String,

        /// Target room (repeatable)
        #[arg(short, long = "room", required = true)]
        rooms: Vec<String>,

        /// Path to configuration file
        #[arg(long, default_value = "~/.config/nagloop/config.toml")]
        config: String,

        #[command(flatten)]
        credentials: Credentials,

        /// Log the post instead of sending it
        #[arg(long)]
        dry_run: bool,
    },

    /// Write a default configuration file
    Config {
        /// Create the configuration file
        #[arg(long)]
        init: bool,

        /// Path to configuration file
        #[arg(long, default_value = "~/.config/nagloop/config.toml")]
        config_file: String,
    },

    /// Validate a configuration file
    Check {
        /// Path to configuration file
        #[arg(long, default_value = "~/.config/nagloop/config.toml")]
        config: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            config,
            credentials,
            dry_run,
        } => {
            handlers::handle_run(config, credentials, dry_run).await?;
        }
        Commands::Say {
            message,
            rooms,
            config,
            credentials,
            dry_run,
        } => {
            handlers::handle_say(message, rooms, config, credentials, dry_run).await?;
        }
        Commands::Config { init, config_file } => {
            if init {
                handlers::handle_config_init(config_file)?;
            } else {
                println!("Config command requires --init flag");
                println!("Usage: nagloop config --init [--config-file PATH]");
            }
        }
        Commands::Check { config } => {
            handlers::handle_check(config)?;
        }
    }

    Ok(())
}
