use crate::error::{DrawError, Result};
use crate::ledger::{WinnerLedger, WinnerRecord};
use crate::roster::RosterStore;
use crate::screen::ScreenLifecycleGuard;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Lifecycle phase of one display-session's draw round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DrawPhase {
    Idle,
    Armed,
    Drawing,
    Stopped,
}

impl Default for DrawPhase {
    fn default() -> Self {
        DrawPhase::Idle
    }
}

/// Snapshot of the session after a (possibly attempted) transition.
///
/// Mutating operations return this instead of pushing change notifications;
/// a bound UI layer reads the new state and notifies itself.
#[derive(Debug, Clone, Serialize)]
pub struct SessionInfo {
    pub phase: DrawPhase,
    pub committed_this_screen: bool,
    pub requested_quota: u32,
    pub current_round: Vec<WinnerRecord>,
}

/// State machine governing one round's lifecycle: arming, sampling,
/// committing, aborting.
///
/// The session consumes the roster and ledger passed into each transition
/// rather than owning them; eligibility is evaluated lazily at stop time, so
/// roster or ledger changes between start and stop are tolerated.
#[derive(Debug, Default)]
pub struct DrawSession {
    phase: DrawPhase,
    committed_this_screen: bool,
    requested_quota: u32,
    current_round: Vec<WinnerRecord>,
}

impl DrawSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> DrawPhase {
        self.phase
    }

    pub fn has_committed_this_screen(&self) -> bool {
        self.committed_this_screen
    }

    pub fn current_round(&self) -> &[WinnerRecord] {
        &self.current_round
    }

    pub fn info(&self) -> SessionInfo {
        SessionInfo {
            phase: self.phase,
            committed_this_screen: self.committed_this_screen,
            requested_quota: self.requested_quota,
            current_round: self.current_round.clone(),
        }
    }

    /// Derived on demand, never cached: all `start_round` guards as one
    /// boolean.
    pub fn can_start_round(
        &self,
        guard: &ScreenLifecycleGuard,
        roster: &RosterStore,
        ledger: &WinnerLedger,
    ) -> bool {
        guard.is_open()
            && self.phase == DrawPhase::Armed
            && !self.committed_this_screen
            && !ledger.remaining_pool(roster).is_empty()
    }

    /// Arm a fresh screen session. Valid only from `Idle`; resets the
    /// commit latch and clears any leftover round.
    pub fn open_screen(&mut self) -> Result<SessionInfo> {
        if self.phase != DrawPhase::Idle {
            return Err(DrawError::invalid_state(format!(
                "cannot open a screen while {:?}",
                self.phase
            )));
        }

        self.phase = DrawPhase::Armed;
        self.committed_this_screen = false;
        self.requested_quota = 0;
        self.current_round.clear();

        tracing::info!("Screen session armed");
        Ok(self.info())
    }

    /// Begin a round. Requires an open screen, the `Armed` phase, an unused
    /// commit latch and a non-empty remaining pool; any guard failure makes
    /// no state change.
    pub fn start_round(
        &mut self,
        guard: &ScreenLifecycleGuard,
        roster: &RosterStore,
        ledger: &WinnerLedger,
        requested_quota: u32,
    ) -> Result<SessionInfo> {
        if !guard.is_open() {
            return Err(DrawError::ScreenNotOpen);
        }
        if self.committed_this_screen {
            return Err(DrawError::RoundAlreadyCommitted);
        }
        if self.phase != DrawPhase::Armed {
            return Err(DrawError::invalid_state(format!(
                "cannot start a round while {:?}",
                self.phase
            )));
        }
        if ledger.remaining_pool(roster).is_empty() {
            return Err(DrawError::EmptyPool);
        }

        self.phase = DrawPhase::Drawing;
        self.requested_quota = requested_quota;
        self.current_round.clear();

        tracing::info!("Round started, requested quota {}", requested_quota);
        Ok(self.info())
    }

    /// Commit the round: sample `min(requested_quota, pool)` winners without
    /// replacement from the remaining pool, append them to the ledger in one
    /// call, latch the commit flag and enter `Stopped`.
    ///
    /// No-op outside `Drawing`. The pool is recomputed here, not at start
    /// time, so results are uniform over the eligible set at stop time.
    pub fn stop_round(
        &mut self,
        roster: &RosterStore,
        ledger: &mut WinnerLedger,
        prize: &str,
    ) -> SessionInfo {
        if self.phase != DrawPhase::Drawing {
            return self.info();
        }

        let mut pool = ledger.remaining_pool(roster);
        let effective = (self.requested_quota as usize).min(pool.len());

        let mut rng = rand::thread_rng();
        let mut records = Vec::with_capacity(effective);
        for _ in 0..effective {
            let idx = rng.gen_range(0..pool.len());
            let name = pool.remove(idx);
            records.push(WinnerRecord::new(prize, name));
        }

        self.current_round = records.clone();
        ledger.append(records);
        self.committed_this_screen = true;
        self.phase = DrawPhase::Stopped;

        tracing::info!(
            "Round committed: {} winners for prize {}",
            self.current_round.len(),
            prize
        );
        self.info()
    }

    /// Tear down the screen session from any phase.
    ///
    /// A round still in `Drawing` is aborted: its winners are discarded with
    /// no ledger writes, and closing counts as having used the round.
    pub fn close_screen(&mut self) -> SessionInfo {
        if self.phase == DrawPhase::Drawing {
            tracing::warn!(
                "Screen closed mid-round, discarding {} uncommitted picks",
                self.current_round.len()
            );
            self.current_round.clear();
            self.committed_this_screen = true;
        }

        self.phase = DrawPhase::Idle;
        self.info()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn roster_of(names: &[&str]) -> RosterStore {
        let mut roster = RosterStore::new();
        roster.replace_all(names);
        roster
    }

    fn open_guard() -> ScreenLifecycleGuard {
        let mut guard = ScreenLifecycleGuard::new();
        guard.mark_opened();
        guard
    }

    #[test]
    fn start_requires_open_screen() {
        let guard = ScreenLifecycleGuard::new();
        let roster = roster_of(&["Alice"]);
        let ledger = WinnerLedger::new();
        let mut session = DrawSession::new();
        session.open_screen().unwrap();

        let err = session
            .start_round(&guard, &roster, &ledger, 1)
            .unwrap_err();
        assert!(matches!(err, DrawError::ScreenNotOpen));
        assert_eq!(session.phase(), DrawPhase::Armed);
        assert_eq!(ledger.count(), 0);
    }

    #[test]
    fn start_requires_nonempty_pool() {
        let guard = open_guard();
        let roster = roster_of(&["Alice"]);
        let mut ledger = WinnerLedger::new();
        ledger.append(vec![WinnerRecord::new("A", "Alice")]);

        let mut session = DrawSession::new();
        session.open_screen().unwrap();

        let err = session
            .start_round(&guard, &roster, &ledger, 1)
            .unwrap_err();
        assert!(matches!(err, DrawError::EmptyPool));
        assert_eq!(ledger.count(), 1);
    }

    #[test]
    fn stop_yields_min_of_quota_and_pool() {
        let guard = open_guard();
        let roster = roster_of(&["Alice", "Bob", "Carol"]);
        let mut ledger = WinnerLedger::new();
        let mut session = DrawSession::new();

        session.open_screen().unwrap();
        session.start_round(&guard, &roster, &ledger, 5).unwrap();
        let info = session.stop_round(&roster, &mut ledger, "一等奖");

        assert_eq!(info.phase, DrawPhase::Stopped);
        assert_eq!(info.current_round.len(), 3);
        assert_eq!(ledger.count(), 3);
    }

    #[test]
    fn commit_shrinks_pool_by_exactly_the_winners() {
        let guard = open_guard();
        let roster = roster_of(&["A", "B", "C", "D", "E"]);
        let mut ledger = WinnerLedger::new();
        let mut session = DrawSession::new();

        session.open_screen().unwrap();
        let before: HashSet<_> = ledger.remaining_pool(&roster).into_iter().collect();

        session.start_round(&guard, &roster, &ledger, 2).unwrap();
        let info = session.stop_round(&roster, &mut ledger, "prize");

        let won: HashSet<_> = info
            .current_round
            .iter()
            .map(|r| r.participant.clone())
            .collect();
        let after: HashSet<_> = ledger.remaining_pool(&roster).into_iter().collect();

        assert_eq!(won.len(), 2);
        assert_eq!(after, before.difference(&won).cloned().collect());
    }

    #[test]
    fn second_round_on_same_screen_is_blocked() {
        let guard = open_guard();
        let roster = roster_of(&["Alice", "Bob", "Carol"]);
        let mut ledger = WinnerLedger::new();
        let mut session = DrawSession::new();

        session.open_screen().unwrap();
        session.start_round(&guard, &roster, &ledger, 1).unwrap();
        session.stop_round(&roster, &mut ledger, "prize");

        let err = session
            .start_round(&guard, &roster, &ledger, 1)
            .unwrap_err();
        assert!(matches!(err, DrawError::RoundAlreadyCommitted));
        assert_eq!(ledger.count(), 1);
    }

    #[test]
    fn start_while_drawing_is_invalid() {
        let guard = open_guard();
        let roster = roster_of(&["Alice", "Bob"]);
        let ledger = WinnerLedger::new();
        let mut session = DrawSession::new();

        session.open_screen().unwrap();
        session.start_round(&guard, &roster, &ledger, 1).unwrap();

        let err = session
            .start_round(&guard, &roster, &ledger, 1)
            .unwrap_err();
        assert!(matches!(err, DrawError::InvalidState(_)));
        assert!(err.is_precondition());
    }

    #[test]
    fn close_while_drawing_writes_nothing() {
        let guard = open_guard();
        let roster = roster_of(&["Alice", "Bob"]);
        let mut ledger = WinnerLedger::new();
        ledger.append(vec![WinnerRecord::new("prior", "Zed")]);

        let mut session = DrawSession::new();
        session.open_screen().unwrap();
        session.start_round(&guard, &roster, &ledger, 2).unwrap();

        let info = session.close_screen();
        assert_eq!(info.phase, DrawPhase::Idle);
        assert!(info.committed_this_screen);
        assert!(info.current_round.is_empty());
        assert_eq!(ledger.count(), 1);
        assert!(ledger.has_won("Zed"));
    }

    #[test]
    fn stop_outside_drawing_is_noop() {
        let roster = roster_of(&["Alice"]);
        let mut ledger = WinnerLedger::new();
        let mut session = DrawSession::new();

        let info = session.stop_round(&roster, &mut ledger, "prize");
        assert_eq!(info.phase, DrawPhase::Idle);
        assert_eq!(ledger.count(), 0);
    }

    #[test]
    fn reopening_screen_resets_commit_latch() {
        let guard = open_guard();
        let roster = roster_of(&["Alice", "Bob", "Carol"]);
        let mut ledger = WinnerLedger::new();
        let mut session = DrawSession::new();

        session.open_screen().unwrap();
        session.start_round(&guard, &roster, &ledger, 1).unwrap();
        session.stop_round(&roster, &mut ledger, "prize");
        session.close_screen();

        session.open_screen().unwrap();
        assert!(!session.has_committed_this_screen());
        assert!(session.can_start_round(&guard, &roster, &ledger));
    }

    #[test]
    fn winners_stay_unique_across_rounds() {
        let guard = open_guard();
        let names = ["A", "B", "C", "D", "E", "F"];
        let roster = roster_of(&names);
        let mut ledger = WinnerLedger::new();
        let mut session = DrawSession::new();

        for _ in 0..3 {
            session.open_screen().unwrap();
            session.start_round(&guard, &roster, &ledger, 2).unwrap();
            session.stop_round(&roster, &mut ledger, "prize");
            session.close_screen();
        }

        let all: Vec<_> = ledger.records().iter().map(|r| &r.participant).collect();
        let unique: HashSet<_> = all.iter().collect();
        assert_eq!(all.len(), 6);
        assert_eq!(unique.len(), 6);
        assert!(ledger.remaining_pool(&roster).is_empty());

        session.open_screen().unwrap();
        let err = session
            .start_round(&guard, &roster, &ledger, 1)
            .unwrap_err();
        assert!(matches!(err, DrawError::EmptyPool));
    }

    #[test]
    fn duplicate_roster_names_become_jointly_ineligible() {
        let guard = open_guard();
        let roster = roster_of(&["Alice", "Alice"]);
        let mut ledger = WinnerLedger::new();
        let mut session = DrawSession::new();

        session.open_screen().unwrap();
        session.start_round(&guard, &roster, &ledger, 1).unwrap();
        session.stop_round(&roster, &mut ledger, "prize");

        // both roster entries share the name, so one win excludes both
        assert!(ledger.remaining_pool(&roster).is_empty());
    }
}
