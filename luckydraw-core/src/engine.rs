use crate::config::{DrawConfig, PrizeTier};
use crate::error::{DrawError, Result};
use crate::ledger::{WinnerLedger, WinnerRecord};
use crate::roster::RosterStore;
use crate::screen::{ScreenHandle, ScreenLifecycleGuard};
use crate::session::{DrawPhase, DrawSession, SessionInfo};
use rand::Rng;
use serde::Serialize;
use std::path::{Path, PathBuf};

pub const CONFIG_FILE: &str = "prizes.conf";
pub const ROSTER_FILE: &str = "roster.txt";
pub const LEDGER_FILE: &str = "winners.csv";

/// Snapshot of the whole engine for status displays.
#[derive(Debug, Clone, Serialize)]
pub struct EngineInfo {
    pub title: String,
    pub phase: DrawPhase,
    pub screen_open: bool,
    pub selected_tier: String,
    pub tiers: Vec<PrizeTier>,
    pub roster_size: usize,
    pub remaining: usize,
    pub winner_count: usize,
}

/// Coordinator owning the draw components and the on-disk layout.
///
/// All mutating operations are synchronous `&mut self` calls; the engine is
/// built for a single control thread. Persistence failures on the config and
/// roster files follow the same policy as the ledger: the in-memory state is
/// authoritative and the failure is only logged.
pub struct DrawEngine {
    data_dir: Option<PathBuf>,
    config: DrawConfig,
    roster: RosterStore,
    ledger: WinnerLedger,
    session: DrawSession,
    guard: ScreenLifecycleGuard,
    selected_tier: String,
    screen: Option<ScreenHandle>,
}

impl DrawEngine {
    /// Engine with demo seed data and no durable files.
    pub fn in_memory() -> Self {
        let config = DrawConfig::default();
        let mut roster = RosterStore::new();
        roster.replace_all(RosterStore::demo_roster());

        Self {
            data_dir: None,
            selected_tier: first_tier_name(&config),
            config,
            roster,
            ledger: WinnerLedger::new(),
            session: DrawSession::new(),
            guard: ScreenLifecycleGuard::new(),
            screen: None,
        }
    }

    /// Engine backed by `data_dir`, loading `prizes.conf`, `roster.txt` and
    /// `winners.csv` when present and seeding demo defaults otherwise.
    pub fn open(data_dir: impl Into<PathBuf>) -> Result<Self> {
        let data_dir = data_dir.into();
        std::fs::create_dir_all(&data_dir)?;

        let config_path = data_dir.join(CONFIG_FILE);
        let config = if config_path.exists() {
            DrawConfig::load(&config_path)?
        } else {
            DrawConfig::default()
        };

        let mut roster = RosterStore::new();
        let roster_path = data_dir.join(ROSTER_FILE);
        if roster_path.exists() {
            let text = std::fs::read_to_string(&roster_path)?;
            roster.replace_all(text.lines());
        } else {
            roster.replace_all(RosterStore::demo_roster());
        }

        let ledger = WinnerLedger::open(data_dir.join(LEDGER_FILE))?;

        Ok(Self {
            data_dir: Some(data_dir),
            selected_tier: first_tier_name(&config),
            config,
            roster,
            ledger,
            session: DrawSession::new(),
            guard: ScreenLifecycleGuard::new(),
            screen: None,
        })
    }

    pub fn title(&self) -> &str {
        self.config.title()
    }

    pub fn config(&self) -> &DrawConfig {
        &self.config
    }

    pub fn roster(&self) -> &RosterStore {
        &self.roster
    }

    pub fn ledger(&self) -> &WinnerLedger {
        &self.ledger
    }

    pub fn selected_tier(&self) -> &str {
        &self.selected_tier
    }

    pub fn session_info(&self) -> SessionInfo {
        self.session.info()
    }

    pub fn remaining_pool(&self) -> Vec<String> {
        self.ledger.remaining_pool(&self.roster)
    }

    pub fn can_start_round(&self) -> bool {
        self.session
            .can_start_round(&self.guard, &self.roster, &self.ledger)
    }

    pub fn info(&self) -> EngineInfo {
        EngineInfo {
            title: self.title().to_string(),
            phase: self.session.phase(),
            screen_open: self.guard.is_open(),
            selected_tier: self.selected_tier.clone(),
            tiers: self.config.tiers.clone(),
            roster_size: self.roster.size(),
            remaining: self.remaining_pool().len(),
            winner_count: self.ledger.count(),
        }
    }

    pub fn select_tier(&mut self, name: &str) -> Result<()> {
        if self.config.tier(name).is_none() {
            return Err(DrawError::UnknownTier(name.to_string()));
        }
        self.selected_tier = name.to_string();
        Ok(())
    }

    /// Open a new display session and return its handle.
    pub fn open_screen(&mut self) -> Result<ScreenHandle> {
        if self.guard.is_open() {
            return Err(DrawError::ScreenAlreadyOpen);
        }

        self.session.open_screen()?;
        self.guard.mark_opened();

        let handle = ScreenHandle::new();
        self.screen = Some(handle);
        Ok(handle)
    }

    /// Close the display session identified by `handle`. A handle from an
    /// earlier screen instance is rejected.
    pub fn close_screen(&mut self, handle: ScreenHandle) -> Result<SessionInfo> {
        match self.screen {
            Some(current) if current == handle => {
                let info = self.session.close_screen();
                self.guard.mark_closed();
                self.screen = None;
                Ok(info)
            }
            _ => Err(DrawError::StaleScreenHandle(handle.id())),
        }
    }

    /// Start a round with the selected tier's quota, captured now; the
    /// prize name itself is read again at stop time.
    pub fn start_round(&mut self) -> Result<SessionInfo> {
        let quota = match self.config.tier(&self.selected_tier) {
            Some(tier) => tier.quota,
            None => {
                tracing::warn!(
                    "Selected tier {} missing from config, quota falls back to 1",
                    self.selected_tier
                );
                1
            }
        };
        self.session
            .start_round(&self.guard, &self.roster, &self.ledger, quota)
    }

    /// Commit the round and return its winners. No-op (empty) outside
    /// `Drawing`.
    pub fn stop_round(&mut self) -> Vec<WinnerRecord> {
        let prize = self.selected_tier.clone();
        let info = self
            .session
            .stop_round(&self.roster, &mut self.ledger, &prize);
        info.current_round
    }

    /// Random candidate for the rolling display tick. Purely cosmetic;
    /// never mutates anything and may be skipped freely.
    pub fn rolling_pick(&self) -> Option<String> {
        let pool = self.remaining_pool();
        if pool.is_empty() {
            return None;
        }
        let idx = rand::thread_rng().gen_range(0..pool.len());
        pool.into_iter().nth(idx)
    }

    /// Replace the roster wholesale and re-save it. In-flight session state
    /// is untouched; eligibility is recomputed at stop time anyway.
    pub fn replace_roster<I, S>(&mut self, names: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.roster.replace_all(names);
        self.save_roster();
    }

    pub fn load_roster_from(&mut self, path: &Path) -> Result<usize> {
        let text = std::fs::read_to_string(path)?;
        self.replace_roster(text.lines());
        Ok(self.roster.size())
    }

    /// Replace the config wholesale and re-save it. A selected tier that no
    /// longer exists falls back to the first tier.
    pub fn replace_config(&mut self, config: DrawConfig) {
        self.config = config;
        if self.config.tier(&self.selected_tier).is_none() {
            self.selected_tier = first_tier_name(&self.config);
        }
        self.save_config();
    }

    pub fn load_config_from(&mut self, path: &Path) -> Result<()> {
        let config = DrawConfig::load(path)?;
        self.replace_config(config);
        Ok(())
    }

    pub fn export_winners(&self, dest: &Path) -> Result<()> {
        self.ledger.export_to(dest)
    }

    /// Full reset: wipe the winner history (and its file) and restore the
    /// default tiers and title. The roster is left alone.
    pub fn reset(&mut self) {
        self.ledger.clear();
        self.replace_config(DrawConfig::default());
        tracing::info!("Full reset: ledger cleared, default tiers restored");
    }

    fn save_roster(&self) {
        let Some(dir) = &self.data_dir else { return };
        let path = dir.join(ROSTER_FILE);
        let mut text = self.roster.all().join("\n");
        text.push('\n');
        if let Err(e) = std::fs::write(&path, text) {
            tracing::warn!("Failed to save roster to {}: {}", path.display(), e);
        }
    }

    fn save_config(&self) {
        let Some(dir) = &self.data_dir else { return };
        let path = dir.join(CONFIG_FILE);
        if let Err(e) = self.config.save(&path) {
            tracing::warn!("Failed to save config to {}: {}", path.display(), e);
        }
    }
}

fn first_tier_name(config: &DrawConfig) -> String {
    config
        .tiers
        .first()
        .map(|t| t.name.clone())
        .unwrap_or_default()
}
