//! luckydraw-core - draw-session engine for a single-session prize drawing
//!
//! This library holds a roster of participants and a set of prize tiers,
//! runs discrete draw rounds that select unique winners without replacement
//! across the cumulative history, and persists results incrementally so a
//! crash never corrupts earlier rounds.

pub mod config;
pub mod engine;
pub mod error;
pub mod ledger;
pub mod roster;
pub mod screen;
pub mod session;

pub use config::{DrawConfig, PrizeTier, DEFAULT_TITLE};
pub use engine::{DrawEngine, EngineInfo, CONFIG_FILE, LEDGER_FILE, ROSTER_FILE};
pub use error::{DrawError, Result};
pub use ledger::{WinnerLedger, WinnerRecord, TIMESTAMP_FORMAT};
pub use roster::RosterStore;
pub use screen::{ScreenHandle, ScreenLifecycleGuard};
pub use session::{DrawPhase, DrawSession, SessionInfo};

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_full_draw_cycle() {
        let temp_dir = tempdir().unwrap();
        let mut engine = DrawEngine::open(temp_dir.path()).unwrap();

        engine.select_tier("一等奖").unwrap();
        let handle = engine.open_screen().unwrap();
        engine.start_round().unwrap();
        let winners = engine.stop_round();

        // demo roster has 5 names, 一等奖 quota is 3
        assert_eq!(winners.len(), 3);
        assert!(winners.iter().all(|w| w.prize == "一等奖"));
        engine.close_screen(handle).unwrap();

        assert_eq!(engine.remaining_pool().len(), 2);
        assert!(temp_dir.path().join(LEDGER_FILE).exists());
    }
}
