mod commands;
mod config;

use clap::{Parser, Subcommand};
use luckydraw_core::{DrawEngine, DrawError};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "luckydraw")]
#[command(about = "Prize-drawing session coordinator")]
#[command(version)]
struct Cli {
    /// Data directory for roster, prize and winner storage
    #[arg(short, long, global = true)]
    data_dir: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Roster management commands
    #[command(subcommand)]
    Roster(commands::RosterCommands),

    /// Prize tier commands
    #[command(subcommand)]
    Prizes(commands::PrizeCommands),

    /// Run one draw round on a fresh display session
    Draw(commands::DrawArgs),

    /// Winner history commands
    #[command(subcommand)]
    Winners(commands::WinnerCommands),

    /// Show engine status
    Status {
        /// Emit JSON instead of text
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(format!(
            "luckydraw={}",
            log_level
        )))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Get data directory
    let defaults = config::CliConfig::default();
    let data_dir = cli.data_dir.unwrap_or(defaults.data_dir);

    // Initialize the draw engine
    tracing::debug!("Using data directory {}", data_dir.display());
    let mut engine = DrawEngine::open(&data_dir)?;

    // Execute command
    let result = match cli.command {
        Commands::Roster(cmd) => commands::handle_roster_command(cmd, &mut engine),
        Commands::Prizes(cmd) => commands::handle_prize_command(cmd, &mut engine),
        Commands::Draw(args) => commands::handle_draw_command(args, &mut engine).await,
        Commands::Winners(cmd) => commands::handle_winner_command(cmd, &mut engine),
        Commands::Status { json } => commands::handle_status_command(json, &engine),
    };

    if let Err(e) = result {
        match e {
            DrawError::EmptyPool => {
                eprintln!("Error: no eligible participants remain");
                eprintln!("Load a new roster or reset the winner history first");
            }
            DrawError::UnknownTier(name) => {
                eprintln!("Error: unknown prize tier '{}'", name);
                eprintln!("Use 'luckydraw prizes show' to see configured tiers");
            }
            DrawError::DestinationExists(path) => {
                eprintln!("Error: refusing to overwrite {}", path.display());
            }
            _ => {
                eprintln!("Error: {}", e);
            }
        }
        std::process::exit(1);
    }

    Ok(())
}
