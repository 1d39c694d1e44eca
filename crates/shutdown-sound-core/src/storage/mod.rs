//! Storage infrastructure: the settings file on disk.
//!
//! [`FileSystem`] is the small set of file primitives the settings store
//! needs.  [`OsFileSystem`] is the real implementation; [`mock`] holds an
//! in-memory one for unit tests that need to inject I/O failures.
//!
//! # Why a trait for four file calls? (for beginners)
//!
//! [`shutdown::ShutdownSoundConfig`] is generic over `F: FileSystem` and
//! defaults to [`OsFileSystem`], so normal callers never see the parameter:
//!
//! ```rust,no_run
//! use shutdown_sound_core::ShutdownSoundConfig;
//!
//! let config = ShutdownSoundConfig::new("/tmp/deepin-shutdown-sound.ini");
//! ```
//!
//! Unit tests swap in [`mock::MockFileSystem`] instead.  It can be told to
//! fail a create, read or write with a chosen `io::ErrorKind`, which is the
//! only practical way to cover the `Io` error paths without root access or
//! a full disk.
//!
//! # Permissions
//!
//! New files get mode `0644` (owner read/write, everyone else read-only).
//! The mode is applied only when the file is created; rewriting an existing
//! file keeps whatever permissions it already has.

use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::Path;

pub mod mock;
pub mod shutdown;

/// File primitives used by [`shutdown::ShutdownSoundConfig`].
pub trait FileSystem {
    /// Returns `true` if `path` exists.
    fn exists(&self, path: &Path) -> bool;
    /// Creates `path` as an empty file.  An already existing file is left
    /// untouched and is not an error.
    fn create_empty(&self, path: &Path) -> io::Result<()>;
    /// Reads the whole file.
    fn read(&self, path: &Path) -> io::Result<Vec<u8>>;
    /// Replaces the content of `path`, creating it with `mode` (Unix
    /// permission bits) if it does not exist.
    fn write(&self, path: &Path, contents: &[u8], mode: u32) -> io::Result<()>;
}

/// [`FileSystem`] backed by `std::fs`.
#[derive(Debug, Clone, Copy, Default)]
pub struct OsFileSystem;

impl FileSystem for OsFileSystem {
    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn create_empty(&self, path: &Path) -> io::Result<()> {
        match open_options(0o644).create_new(true).open(path) {
            Ok(_) => Ok(()),
            // Another writer got there first.
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => Ok(()),
            Err(e) => Err(e),
        }
    }

    fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        std::fs::read(path)
    }

    fn write(&self, path: &Path, contents: &[u8], mode: u32) -> io::Result<()> {
        let mut file = open_options(mode).create(true).truncate(true).open(path)?;
        file.write_all(contents)?;
        file.flush()
    }
}

#[cfg(unix)]
fn open_options(mode: u32) -> OpenOptions {
    use std::os::unix::fs::OpenOptionsExt;

    let mut opts = OpenOptions::new();
    opts.write(true).mode(mode);
    opts
}

#[cfg(not(unix))]
fn open_options(_mode: u32) -> OpenOptions {
    let mut opts = OpenOptions::new();
    opts.write(true);
    opts
}
