use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Opaque handle to one opened display session.
///
/// Returned from `DrawEngine::open_screen` and passed back to
/// `close_screen`; a handle from a previous screen instance is rejected as
/// stale instead of silently acting on the wrong session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScreenHandle(Uuid);

impl ScreenHandle {
    pub(crate) fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn id(&self) -> Uuid {
        self.0
    }
}

/// Tracks whether a display session is currently open, independent of the
/// draw session's own phase.
///
/// Only one display session may exist at a time, and its open/close events
/// are the sole trigger for arming and disarming the draw session.
/// Re-showing an already-open screen never resets round state; truly
/// opening a new screen instance always does.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScreenLifecycleGuard {
    open: bool,
}

impl ScreenLifecycleGuard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn mark_opened(&mut self) {
        self.open = true;
    }

    pub fn mark_closed(&mut self) {
        self.open = false;
    }
}
