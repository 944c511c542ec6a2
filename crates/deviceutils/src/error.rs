//! Common error types

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// Writing `offline` to the device's sysfs control file failed.
    #[error("failed to write offline state to {path}")]
    DisableWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The mount/format collaborator could not detect the filesystem type.
    #[error("failed to get disk format for {device_path} (aka {dev_fs_path})")]
    DiskFormat {
        device_path: String,
        dev_fs_path: String,
        #[source]
        source: anyhow::Error,
    },

    /// Stat of the per-filesystem sysfs entry failed for a reason other than
    /// the entry being absent. In-use status is unknown to the caller.
    #[error("failed to stat {path}")]
    SysfsStat {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, Error>;
