use clap::Subcommand;
use comfy_table::{presets::UTF8_FULL, Table};
use luckydraw_core::{DrawEngine, Result};
use std::path::PathBuf;

#[derive(Subcommand)]
pub enum PrizeCommands {
    /// Load prize tiers from a config file (Title=... and name=count lines)
    Load {
        /// Config file path
        file: PathBuf,
    },
    /// Show the configured prize tiers
    Show,
}

pub fn handle_prize_command(cmd: PrizeCommands, engine: &mut DrawEngine) -> Result<()> {
    match cmd {
        PrizeCommands::Load { file } => {
            engine.load_config_from(&file)?;
            println!(
                "Loaded {} prize tiers from {}",
                engine.config().tiers.len(),
                file.display()
            );
        }

        PrizeCommands::Show => {
            let config = engine.config();
            if config.tiers.is_empty() {
                println!("No prize tiers configured.");
                println!("Load some with: luckydraw prizes load <file>");
                return Ok(());
            }

            println!("{}", config.title());

            let mut table = Table::new();
            table.load_preset(UTF8_FULL);
            table.set_header(vec!["Prize", "Quota", "Drawn"]);

            for tier in &config.tiers {
                let drawn = engine
                    .ledger()
                    .records()
                    .iter()
                    .filter(|r| r.prize == tier.name)
                    .count();
                table.add_row(vec![
                    tier.name.clone(),
                    tier.quota.to_string(),
                    drawn.to_string(),
                ]);
            }

            println!("{}", table);
        }
    }

    Ok(())
}
