use std::path::PathBuf;
use thiserror::Error;
use uuid::Uuid;

pub type Result<T> = std::result::Result<T, DrawError>;

#[derive(Error, Debug)]
pub enum DrawError {
    #[error("no display screen is open")]
    ScreenNotOpen,

    #[error("a display screen is already open")]
    ScreenAlreadyOpen,

    #[error("stale screen handle: {0}")]
    StaleScreenHandle(Uuid),

    #[error("this screen session has already committed a round")]
    RoundAlreadyCommitted,

    #[error("no eligible participants remain")]
    EmptyPool,

    #[error("invalid session state: {0}")]
    InvalidState(String),

    #[error("unknown prize tier: {0}")]
    UnknownTier(String),

    #[error("export destination already exists: {}", .0.display())]
    DestinationExists(PathBuf),

    #[error("nothing to export: no winner records have been persisted")]
    NothingToExport,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Dialog error: {0}")]
    Dialog(String),
}

impl DrawError {
    pub fn invalid_state(msg: impl Into<String>) -> Self {
        Self::InvalidState(msg.into())
    }

    /// Guard failures a user can recover from by changing what they asked
    /// for, as opposed to IO-level faults.
    pub fn is_precondition(&self) -> bool {
        matches!(
            self,
            Self::ScreenNotOpen
                | Self::RoundAlreadyCommitted
                | Self::EmptyPool
                | Self::InvalidState(_)
        )
    }
}

// conversion from dialoguer::Error
impl From<dialoguer::Error> for DrawError {
    fn from(err: dialoguer::Error) -> Self {
        DrawError::Dialog(err.to_string())
    }
}
