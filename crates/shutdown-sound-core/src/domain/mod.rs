//! Domain types.  No file system access happens here.

pub mod settings;
