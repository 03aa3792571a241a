//! Theme engine errors

use crate::theme::ThemeMode;
use halo_platform::PlatformError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ThemeError {
    /// The theme was applied for this session but could not be stored
    #[error("theme {mode} applied but not persisted: {source}")]
    Persist {
        mode: ThemeMode,
        #[source]
        source: PlatformError,
    },

    /// The stored preference could not be removed
    #[error("failed to clear stored theme preference: {0}")]
    Clear(#[source] PlatformError),

    #[error("unknown theme mode {0:?}, expected \"light\" or \"dark\"")]
    UnknownMode(String),
}
