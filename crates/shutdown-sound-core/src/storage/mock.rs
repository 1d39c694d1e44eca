//! In-memory file system for unit testing.
//!
//! Lets tests seed file content and make individual primitives fail without
//! touching the real disk.

use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use super::FileSystem;

#[derive(Debug, Clone)]
struct MockFile {
    contents: Vec<u8>,
    mode: u32,
}

/// A [`FileSystem`] that keeps files in a map.
#[derive(Debug, Default)]
pub struct MockFileSystem {
    files: Mutex<HashMap<PathBuf, MockFile>>,
    fail_create: Mutex<Option<io::ErrorKind>>,
    fail_read: Mutex<Option<io::ErrorKind>>,
    fail_write: Mutex<Option<io::ErrorKind>>,
    write_count: Mutex<u32>,
}

impl MockFileSystem {
    /// Creates an empty mock file system.
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds `path` with `contents` (mode `0o644`).
    pub fn with_file(self, path: impl Into<PathBuf>, contents: impl Into<Vec<u8>>) -> Self {
        self.files.lock().expect("lock poisoned").insert(
            path.into(),
            MockFile {
                contents: contents.into(),
                mode: 0o644,
            },
        );
        self
    }

    /// Makes every subsequent `create_empty` fail with `kind`.
    pub fn fail_create(&self, kind: io::ErrorKind) {
        *self.fail_create.lock().expect("lock poisoned") = Some(kind);
    }

    /// Makes every subsequent `read` of an existing file fail with `kind`.
    pub fn fail_read(&self, kind: io::ErrorKind) {
        *self.fail_read.lock().expect("lock poisoned") = Some(kind);
    }

    /// Makes every subsequent `write` fail with `kind`.
    pub fn fail_write(&self, kind: io::ErrorKind) {
        *self.fail_write.lock().expect("lock poisoned") = Some(kind);
    }

    /// Current content of `path` as UTF-8, if the file exists.
    pub fn contents(&self, path: &Path) -> Option<String> {
        self.files
            .lock()
            .expect("lock poisoned")
            .get(path)
            .map(|f| String::from_utf8_lossy(&f.contents).into_owned())
    }

    /// Permission bits `path` was created with, if the file exists.
    pub fn mode(&self, path: &Path) -> Option<u32> {
        self.files.lock().expect("lock poisoned").get(path).map(|f| f.mode)
    }

    /// Number of successful `write` calls.
    pub fn write_count(&self) -> u32 {
        *self.write_count.lock().expect("lock poisoned")
    }
}

impl FileSystem for MockFileSystem {
    fn exists(&self, path: &Path) -> bool {
        self.files.lock().expect("lock poisoned").contains_key(path)
    }

    fn create_empty(&self, path: &Path) -> io::Result<()> {
        if let Some(kind) = *self.fail_create.lock().expect("lock poisoned") {
            return Err(io::Error::new(kind, "injected create failure"));
        }
        self.files
            .lock()
            .expect("lock poisoned")
            .entry(path.to_path_buf())
            .or_insert(MockFile {
                contents: Vec::new(),
                mode: 0o644,
            });
        Ok(())
    }

    fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        let files = self.files.lock().expect("lock poisoned");
        let file = files
            .get(path)
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "no such file"))?;
        if let Some(kind) = *self.fail_read.lock().expect("lock poisoned") {
            return Err(io::Error::new(kind, "injected read failure"));
        }
        Ok(file.contents.clone())
    }

    fn write(&self, path: &Path, contents: &[u8], mode: u32) -> io::Result<()> {
        if let Some(kind) = *self.fail_write.lock().expect("lock poisoned") {
            return Err(io::Error::new(kind, "injected write failure"));
        }
        let mut files = self.files.lock().expect("lock poisoned");
        let file = files.entry(path.to_path_buf()).or_insert(MockFile {
            contents: Vec::new(),
            mode,
        });
        file.contents = contents.to_vec();
        *self.write_count.lock().expect("lock poisoned") += 1;
        Ok(())
    }
}
