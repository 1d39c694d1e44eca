//! # shutdown-sound-core
//!
//! Reads and writes the key file that tells the session whether a sound
//! should play at shutdown, and which theme and event to use.
//!
//! The file is a small GLib-style key file with a single `[Shutdown]` group:
//!
//! ```text
//! [Shutdown]
//! CanPlay=true
//! SoundTheme=deepin
//! SoundEvent=system-shutdown
//! ```
//!
//! # What is a key file? (for beginners)
//!
//! A key file is the INI-like format GLib uses for desktop settings.  It is
//! plain text made of `[Group]` headers, each followed by `Key=Value` lines.
//! Values are untyped text; a reader decides whether `CanPlay=true` is a
//! boolean or a string.  Lines starting with `#` are comments.
//!
//! Parsing and writing the groups and lines is done by the `rust-ini` crate.
//! The GLib rules for values (booleans spelled `true`/`false`/`1`/`0`, `\s`
//! for a space and similar escapes) live in this crate, so a file written
//! here can be read by any GLib program and vice versa.
//!
//! # Modules
//!
//! - **`domain`** – The [`ShutdownSoundSettings`] record.  Plain data, no I/O.
//!
//! - **`keyfile`** – Typed `get`/`set` of boolean and string values on top
//!   of a `rust-ini` document.  Value errors surface as [`ValueError`].
//!
//! - **`storage`** – The [`FileSystem`] seam and the [`ShutdownSoundConfig`]
//!   accessor that implements `get` and `set` on top of it.

pub mod domain;
mod keyfile;
pub mod storage;

pub use domain::settings::ShutdownSoundSettings;
pub use keyfile::ValueError;
pub use storage::shutdown::{
    ErrorKind, ShutdownSoundConfig, ShutdownSoundError, DEFAULT_SHUTDOWN_SOUND_FILE,
};
pub use storage::{FileSystem, OsFileSystem};
