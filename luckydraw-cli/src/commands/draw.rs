use crate::config::CliConfig;
use clap::Args;
use comfy_table::{presets::UTF8_FULL, Table};
use luckydraw_core::{DrawEngine, Result, TIMESTAMP_FORMAT};
use std::io::Write;
use std::time::Duration;

#[derive(Args)]
pub struct DrawArgs {
    /// Prize tier to draw for (defaults to the first configured tier)
    #[arg(short, long)]
    pub tier: Option<String>,

    /// Commit immediately instead of rolling until Enter
    #[arg(long)]
    pub instant: bool,

    /// Rolling display refresh interval in milliseconds
    #[arg(long)]
    pub tick_ms: Option<u64>,
}

/// One invocation is one display session: open the screen, run a single
/// round, print the committed winners, close the screen.
pub async fn handle_draw_command(args: DrawArgs, engine: &mut DrawEngine) -> Result<()> {
    if let Some(tier) = &args.tier {
        engine.select_tier(tier)?;
    }

    let handle = engine.open_screen()?;
    let info = match engine.start_round() {
        Ok(info) => info,
        Err(e) => {
            // tear the screen session down before surfacing the guard failure
            engine.close_screen(handle)?;
            return Err(e);
        }
    };

    println!(
        "{} — drawing {} (quota {})",
        engine.title(),
        engine.selected_tier(),
        info.requested_quota
    );

    if !args.instant {
        roll_until_enter(engine, args.tick_ms.unwrap_or(CliConfig::default().tick_ms)).await;
    }

    let winners = engine.stop_round();
    engine.close_screen(handle)?;

    if winners.is_empty() {
        println!("No winners this round.");
        return Ok(());
    }

    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec!["Prize", "Winner", "Time"]);
    for record in &winners {
        table.add_row(vec![
            record.prize.clone(),
            record.participant.clone(),
            record.drawn_at.format(TIMESTAMP_FORMAT).to_string(),
        ]);
    }

    println!("{}", table);
    println!("{} winners committed.", winners.len());

    Ok(())
}

/// Cosmetic rolling display: re-sample a candidate name on every tick until
/// the user presses Enter. Skipping ticks changes nothing about the draw.
async fn roll_until_enter(engine: &DrawEngine, tick_ms: u64) {
    println!("Rolling... press Enter to stop.");

    let mut ticker = tokio::time::interval(Duration::from_millis(tick_ms.max(1)));
    let mut wait_enter = tokio::task::spawn_blocking(|| {
        let mut line = String::new();
        let _ = std::io::stdin().read_line(&mut line);
    });

    loop {
        tokio::select! {
            _ = &mut wait_enter => break,
            _ = ticker.tick() => {
                if let Some(name) = engine.rolling_pick() {
                    print!("\r  >>> {:<24}", name);
                    let _ = std::io::stdout().flush();
                }
            }
        }
    }
    println!();
}
