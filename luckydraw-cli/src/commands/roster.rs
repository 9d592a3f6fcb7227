use clap::Subcommand;
use comfy_table::{presets::UTF8_FULL, Table};
use luckydraw_core::{DrawEngine, Result};
use std::path::PathBuf;

#[derive(Subcommand)]
pub enum RosterCommands {
    /// Load participants from a text file (one name per line)
    Load {
        /// Roster file path
        file: PathBuf,
    },
    /// Show the current roster
    Show,
}

pub fn handle_roster_command(cmd: RosterCommands, engine: &mut DrawEngine) -> Result<()> {
    match cmd {
        RosterCommands::Load { file } => {
            let count = engine.load_roster_from(&file)?;
            println!("Loaded {} participants from {}", count, file.display());
        }

        RosterCommands::Show => {
            if engine.roster().is_empty() {
                println!("Roster is empty.");
                println!("Load one with: luckydraw roster load <file>");
                return Ok(());
            }

            let mut table = Table::new();
            table.load_preset(UTF8_FULL);
            table.set_header(vec!["#", "Name", "Status"]);

            for (i, name) in engine.roster().all().iter().enumerate() {
                let status = if engine.ledger().has_won(name) {
                    "Won"
                } else {
                    "Eligible"
                };
                table.add_row(vec![(i + 1).to_string(), name.clone(), status.to_string()]);
            }

            println!("{}", table);
            println!(
                "{} participants, {} still eligible",
                engine.roster().size(),
                engine.remaining_pool().len()
            );
        }
    }

    Ok(())
}
