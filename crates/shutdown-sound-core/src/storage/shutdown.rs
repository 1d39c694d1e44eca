//! Load and store [`ShutdownSoundSettings`] in the shutdown sound key file.
//!
//! File layout:
//!
//! ```text
//! [Shutdown]
//! CanPlay=true
//! SoundTheme=deepin
//! SoundEvent=system-shutdown
//! ```
//!
//! Every [`ShutdownSoundConfig::get`] reads the file from scratch and every
//! [`ShutdownSoundConfig::set`] rewrites it completely.  Nothing is cached.
//!
//! # What happens on `set` (for beginners)
//!
//! 1. If the file does not exist, an empty one is created with mode 0644.
//! 2. The current content is parsed, so other groups and keys are kept.
//! 3. The three keys are overwritten in the `[Shutdown]` group.
//! 4. The whole document is serialized and written back over the file.
//!
//! Comments in the existing file are not kept; the key file parser does not
//! carry them in its document model.
//!
//! # How a value becomes an error
//!
//! | File content                  | Error                                |
//! |-------------------------------|--------------------------------------|
//! | no file                       | [`ShutdownSoundError::FileMissing`]  |
//! | `[Shutdown` (no `]`)          | [`ShutdownSoundError::Parse`]        |
//! | bytes that are not UTF-8      | [`ShutdownSoundError::Encoding`]     |
//! | no `CanPlay` line             | [`ShutdownSoundError::MissingKey`]   |
//! | `CanPlay=maybe`               | [`ShutdownSoundError::TypeMismatch`] |
//!
//! # Concurrency
//!
//! There is no locking.  Concurrent writers race and the last one wins; a
//! reader running alongside a writer may see a truncated file and fail with
//! a parse or missing-key error.  The write truncates the file in place
//! rather than renaming a temporary file over it, so a crash mid-write can
//! leave a partial file behind.

use std::io;
use std::path::{Path, PathBuf};

use ini::Ini;
use thiserror::Error;
use tracing::{debug, trace};

use crate::domain::settings::ShutdownSoundSettings;
use crate::keyfile::{self, FieldError, ValueError};
use crate::storage::{FileSystem, OsFileSystem};

/// Well-known location of the settings file.
pub const DEFAULT_SHUTDOWN_SOUND_FILE: &str = "/tmp/deepin-shutdown-sound.ini";

const GROUP_SHUTDOWN: &str = "Shutdown";
const KEY_CAN_PLAY: &str = "CanPlay";
const KEY_SOUND_THEME: &str = "SoundTheme";
const KEY_SOUND_EVENT: &str = "SoundEvent";

/// rw-r--r--
const FILE_MODE: u32 = 0o644;

/// Error type for shutdown sound settings operations.
#[derive(Debug, Error)]
pub enum ShutdownSoundError {
    /// The settings file does not exist.
    #[error("shutdown sound file {} does not exist", .path.display())]
    FileMissing { path: PathBuf },

    /// The settings file is not a valid key file.
    #[error("failed to parse shutdown sound file {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: ini::ParseError,
    },

    /// The settings file is not valid UTF-8.
    #[error("shutdown sound file {} is not valid UTF-8: {source}", .path.display())]
    Encoding {
        path: PathBuf,
        #[source]
        source: std::str::Utf8Error,
    },

    /// The `[Shutdown]` group or one of its keys is absent.
    #[error("{key} is missing from [{group}] in {}", .path.display())]
    MissingKey {
        path: PathBuf,
        group: &'static str,
        key: &'static str,
    },

    /// A key is present but holds a value of the wrong type.
    #[error("{key} in [{group}] of {} has the wrong type: {source}", .path.display())]
    TypeMismatch {
        path: PathBuf,
        group: &'static str,
        key: &'static str,
        #[source]
        source: ValueError,
    },

    /// Creating, reading or writing the file failed.
    #[error("I/O error accessing shutdown sound file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Coarse category of a [`ShutdownSoundError`], for callers that only need
/// to branch on what went wrong.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    FileMissing,
    Parse,
    MissingKey,
    TypeMismatch,
    Io,
}

impl ShutdownSoundError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::FileMissing { .. } => ErrorKind::FileMissing,
            Self::Parse { .. } | Self::Encoding { .. } => ErrorKind::Parse,
            Self::MissingKey { .. } => ErrorKind::MissingKey,
            Self::TypeMismatch { .. } => ErrorKind::TypeMismatch,
            Self::Io { .. } => ErrorKind::Io,
        }
    }

    /// The settings file the failed operation was working on.
    pub fn path(&self) -> &Path {
        match self {
            Self::FileMissing { path }
            | Self::Parse { path, .. }
            | Self::Encoding { path, .. }
            | Self::MissingKey { path, .. }
            | Self::TypeMismatch { path, .. }
            | Self::Io { path, .. } => path.as_path(),
        }
    }
}

// ── Accessor ──────────────────────────────────────────────────────────────────

/// Reads and writes the shutdown sound settings file.
///
/// # Example
///
/// ```rust,no_run
/// use shutdown_sound_core::{ShutdownSoundConfig, ShutdownSoundSettings};
///
/// let config = ShutdownSoundConfig::default();
/// config.set(&ShutdownSoundSettings::new(true, "deepin", "system-shutdown"))?;
/// assert!(config.get()?.can_play);
/// # Ok::<(), shutdown_sound_core::ShutdownSoundError>(())
/// ```
#[derive(Debug, Clone)]
pub struct ShutdownSoundConfig<F = OsFileSystem> {
    path: PathBuf,
    fs: F,
}

impl ShutdownSoundConfig<OsFileSystem> {
    /// Creates an accessor for the settings file at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self::with_file_system(path, OsFileSystem)
    }
}

impl Default for ShutdownSoundConfig<OsFileSystem> {
    /// Uses [`DEFAULT_SHUTDOWN_SOUND_FILE`].
    fn default() -> Self {
        Self::new(DEFAULT_SHUTDOWN_SOUND_FILE)
    }
}

impl<F: FileSystem> ShutdownSoundConfig<F> {
    /// Creates an accessor that goes through `fs` for all file access.
    pub fn with_file_system(path: impl Into<PathBuf>, fs: F) -> Self {
        Self {
            path: path.into(),
            fs,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    #[cfg(test)]
    pub(crate) fn file_system(&self) -> &F {
        &self.fs
    }

    /// Loads the settings from disk.
    ///
    /// Keys are read in the order `CanPlay`, `SoundTheme`, `SoundEvent` and
    /// the first failure is returned; there is no partial result.
    ///
    /// # Errors
    ///
    /// - [`ShutdownSoundError::FileMissing`] if the file does not exist.
    /// - [`ShutdownSoundError::Io`] if it exists but cannot be read.
    /// - [`ShutdownSoundError::Parse`] if it is not a valid key file.
    /// - [`ShutdownSoundError::Encoding`] if it is not UTF-8.
    /// - [`ShutdownSoundError::MissingKey`] if the group or a key is absent.
    /// - [`ShutdownSoundError::TypeMismatch`] if a value has the wrong type.
    pub fn get(&self) -> Result<ShutdownSoundSettings, ShutdownSoundError> {
        let doc = self.load()?;

        let can_play = keyfile::get_boolean(&doc, GROUP_SHUTDOWN, KEY_CAN_PLAY)
            .map_err(|e| self.field_error(KEY_CAN_PLAY, e))?;
        let theme = keyfile::get_string(&doc, GROUP_SHUTDOWN, KEY_SOUND_THEME)
            .map_err(|e| self.field_error(KEY_SOUND_THEME, e))?;
        let event = keyfile::get_string(&doc, GROUP_SHUTDOWN, KEY_SOUND_EVENT)
            .map_err(|e| self.field_error(KEY_SOUND_EVENT, e))?;

        debug!(
            "loaded shutdown sound settings from {}: can_play={can_play} theme={theme:?} event={event:?}",
            self.path.display()
        );
        Ok(ShutdownSoundSettings {
            can_play,
            theme,
            event,
        })
    }

    /// Writes `settings` to disk, creating the file if it does not exist.
    ///
    /// Groups and keys already in the file other than the three settings keys
    /// are kept; comments are dropped.  `theme` and `event` are not validated.
    ///
    /// # Errors
    ///
    /// - [`ShutdownSoundError::Io`] if the file cannot be created, read or
    ///   written.  A failed write may leave the file truncated.
    /// - [`ShutdownSoundError::Parse`] or [`ShutdownSoundError::Encoding`] if
    ///   the existing file is not a valid key file.
    pub fn set(&self, settings: &ShutdownSoundSettings) -> Result<(), ShutdownSoundError> {
        if !self.fs.exists(&self.path) {
            trace!("creating {}", self.path.display());
            self.fs
                .create_empty(&self.path)
                .map_err(|source| self.io_error(source))?;
        }

        let mut doc = self.load()?;
        keyfile::set_boolean(&mut doc, GROUP_SHUTDOWN, KEY_CAN_PLAY, settings.can_play);
        keyfile::set_string(&mut doc, GROUP_SHUTDOWN, KEY_SOUND_THEME, &settings.theme);
        keyfile::set_string(&mut doc, GROUP_SHUTDOWN, KEY_SOUND_EVENT, &settings.event);

        let data = keyfile::to_data(&doc).map_err(|source| self.io_error(source))?;
        self.fs
            .write(&self.path, &data, FILE_MODE)
            .map_err(|source| self.io_error(source))?;

        debug!(
            "stored shutdown sound settings to {}: can_play={} theme={:?} event={:?}",
            self.path.display(),
            settings.can_play,
            settings.theme,
            settings.event
        );
        Ok(())
    }

    fn load(&self) -> Result<Ini, ShutdownSoundError> {
        let bytes = match self.fs.read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(ShutdownSoundError::FileMissing {
                    path: self.path.clone(),
                })
            }
            Err(source) => return Err(self.io_error(source)),
        };
        trace!("read {} bytes from {}", bytes.len(), self.path.display());

        let text = std::str::from_utf8(&bytes).map_err(|source| ShutdownSoundError::Encoding {
            path: self.path.clone(),
            source,
        })?;
        keyfile::parse(text).map_err(|source| ShutdownSoundError::Parse {
            path: self.path.clone(),
            source,
        })
    }

    fn field_error(&self, key: &'static str, err: FieldError) -> ShutdownSoundError {
        match err {
            FieldError::Missing => ShutdownSoundError::MissingKey {
                path: self.path.clone(),
                group: GROUP_SHUTDOWN,
                key,
            },
            FieldError::Invalid(source) => ShutdownSoundError::TypeMismatch {
                path: self.path.clone(),
                group: GROUP_SHUTDOWN,
                key,
                source,
            },
        }
    }

    fn io_error(&self, source: io::Error) -> ShutdownSoundError {
        ShutdownSoundError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
