//! Append-only error log file, created on first run.
//!
//! Grounded on `main.go`'s `initLog`: create the file if it's missing,
//! otherwise open it for appending. The service logs through `tracing`
//! everywhere else; this file exists only so that `ApiError` responses have
//! a durable trail on disk independent of wherever stdout ends up.

use std::fs::OpenOptions;
use std::path::Path;

pub fn open(path: &Path) -> std::io::Result<std::fs::File> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    OpenOptions::new().create(true).append(true).open(path)
}
