//! Mount/format collaborator interface
//!
//! The host owns the mount and format machinery; this crate only needs one
//! query from it. The error type is opaque on purpose: detection failures are
//! wrapped and surfaced verbatim, never interpreted here.

/// Capability to detect the on-disk filesystem type of a block device.
pub trait DiskFormatProber {
    /// Return the detected filesystem type (e.g. `ext4`, `xfs`) for the
    /// device at `device_path`, or fail if detection is impossible.
    fn get_disk_format(&self, device_path: &str) -> anyhow::Result<String>;
}
