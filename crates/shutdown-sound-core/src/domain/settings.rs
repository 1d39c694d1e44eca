//! The shutdown sound settings record.

use serde::{Deserialize, Serialize};

/// Whether a sound plays at shutdown and which one.
///
/// The three fields are always stored and loaded together; see
/// [`crate::ShutdownSoundConfig`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShutdownSoundSettings {
    /// `true` when the shutdown sound is enabled.
    pub can_play: bool,
    /// Sound theme identifier (e.g. `"deepin"`).
    pub theme: String,
    /// Event name inside the theme (e.g. `"system-shutdown"`).
    pub event: String,
}

impl ShutdownSoundSettings {
    /// Creates a settings record from its three fields.
    pub fn new(can_play: bool, theme: impl Into<String>, event: impl Into<String>) -> Self {
        Self {
            can_play,
            theme: theme.into(),
            event: event.into(),
        }
    }
}
