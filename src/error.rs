//! Error types for layout I/O, settings, and player provisioning.
//!
//! Layout configuration problems and provisioning failures are not returned
//! as errors; they surface as [`LayoutWarning`](crate::layout::LayoutWarning)s
//! and [`ProvisionError`]s in an apply report.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::layout::{PawnClass, PlayerSlot};

#[derive(Debug, Error)]
pub enum ViewportError {
    #[error("failed to access {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("invalid layout document: {0}")]
    LayoutFormat(#[from] serde_json::Error),
    #[error("invalid settings document: {0}")]
    SettingsFormat(#[from] toml::de::Error),
    #[error("failed to encode settings: {0}")]
    SettingsEncode(#[from] toml::ser::Error),
    #[error("quick setup supports 2 or 4 players, got {0}")]
    UnsupportedPlayerCount(u32),
    #[error("unknown layout preset '{0}'")]
    UnknownPreset(String),
}

/// Failure to give a pane its player or pawn. The rest of the layout still
/// applies when one of these occurs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProvisionError {
    #[error("no local player for slot {0} and auto-spawn is disabled")]
    AutoSpawnDisabled(PlayerSlot),
    #[error("failed to create local player for slot {slot}: {reason}")]
    CreatePlayer { slot: PlayerSlot, reason: String },
    #[error("no local player for slot {0}")]
    MissingPlayer(PlayerSlot),
    #[error("failed to spawn {class} for slot {slot}")]
    SpawnFailed { slot: PlayerSlot, class: PawnClass },
}

impl ProvisionError {
    pub fn slot(&self) -> PlayerSlot {
        match self {
            ProvisionError::AutoSpawnDisabled(slot) | ProvisionError::MissingPlayer(slot) => *slot,
            ProvisionError::CreatePlayer { slot, .. }
            | ProvisionError::SpawnFailed { slot, .. } => *slot,
        }
    }
}
