use clap::Subcommand;
use comfy_table::{presets::UTF8_FULL, Table};
use dialoguer::Confirm;
use luckydraw_core::{DrawEngine, Result, TIMESTAMP_FORMAT};
use std::path::PathBuf;

#[derive(Subcommand)]
pub enum WinnerCommands {
    /// List all winner records
    List,
    /// Copy the winner ledger file to a destination (never overwrites)
    Export {
        /// Destination path
        dest: PathBuf,
    },
    /// Clear the winner history and restore default prize tiers
    Reset {
        /// Skip confirmation prompt
        #[arg(short, long)]
        force: bool,
    },
}

pub fn handle_winner_command(cmd: WinnerCommands, engine: &mut DrawEngine) -> Result<()> {
    match cmd {
        WinnerCommands::List => {
            if engine.ledger().count() == 0 {
                println!("No winners recorded yet.");
                return Ok(());
            }

            let mut table = Table::new();
            table.load_preset(UTF8_FULL);
            table.set_header(vec!["Prize", "Winner", "Time"]);

            for record in engine.ledger().records() {
                table.add_row(vec![
                    record.prize.clone(),
                    record.participant.clone(),
                    record.drawn_at.format(TIMESTAMP_FORMAT).to_string(),
                ]);
            }

            println!("{}", table);
            println!("{} records total.", engine.ledger().count());
        }

        WinnerCommands::Export { dest } => {
            engine.export_winners(&dest)?;
            println!("Winner ledger exported to {}", dest.display());
        }

        WinnerCommands::Reset { force } => {
            if !force {
                let confirm = Confirm::new()
                    .with_prompt(
                        "Clear all winner records and restore default prize tiers? This action cannot be undone.",
                    )
                    .default(false)
                    .interact()?;

                if !confirm {
                    println!("Reset cancelled.");
                    return Ok(());
                }
            }

            engine.reset();
            println!("Winner history cleared, default prize tiers restored.");
        }
    }

    Ok(())
}
