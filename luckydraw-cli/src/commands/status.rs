use luckydraw_core::{DrawEngine, Result};

pub fn handle_status_command(json: bool, engine: &DrawEngine) -> Result<()> {
    let info = engine.info();

    if json {
        println!("{}", serde_json::to_string_pretty(&info)?);
        return Ok(());
    }

    println!("{}", info.title);
    println!("  Phase: {:?}", info.phase);
    println!("  Screen open: {}", info.screen_open);
    println!("  Selected tier: {}", info.selected_tier);
    println!(
        "  Participants: {} ({} still eligible)",
        info.roster_size, info.remaining
    );
    println!("  Winners recorded: {}", info.winner_count);
    println!("  Prize tiers: {}", info.tiers.len());

    Ok(())
}
