//! Device control via the kernel sysfs tree
//!
//! Implements the two privileged operations a node agent needs around volume
//! teardown: forcing a block device offline, and checking whether a device's
//! filesystem is still registered with the kernel. Both key into `/sys` by the
//! device's short name (the final segment of its path), so `/dev/sdb` and a
//! `/dev/disk/by-id/...` alias to the same device behave identically.

use std::ffi::OsStr;
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::os::unix::fs::OpenOptionsExt;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::format::DiskFormatProber;

/// Controller for kernel-level block device state
///
/// Stateless: every call derives everything it needs from its arguments and
/// the sysfs tree, so a single controller may be shared freely across threads.
/// Production code uses [`DeviceController::new`]; tests point
/// [`DeviceController::with_sysfs_root`] at a scratch directory instead of the
/// real kernel interface.
#[derive(Debug, Clone)]
pub struct DeviceController {
    /// Root of the sysfs tree, `/sys` outside of tests
    sysfs_root: PathBuf,
}

impl DeviceController {
    /// Create a controller over the real kernel sysfs tree
    pub fn new() -> Self {
        Self::with_sysfs_root("/sys")
    }

    /// Create a controller rooted at an arbitrary directory
    pub fn with_sysfs_root(root: impl Into<PathBuf>) -> Self {
        Self {
            sysfs_root: root.into(),
        }
    }

    /// Ask the kernel to disable a block device
    ///
    /// Writes `offline` to the device's sysfs state file. Success means only
    /// that the write completed; the device state is never read back.
    ///
    /// This is dangerous to use. Once a device is disabled it is unusable and
    /// cannot be re-enabled unless its serial number is known, but the serial
    /// number cannot be read from a disabled device. If a device is disabled
    /// during unstage and the next stage call arrives without an intervening
    /// unpublish/publish sequence, the disabled state will make staging fail.
    /// Callers must therefore keep a persistent record of disabled devices
    /// that survives restarts before invoking this; the controller does not
    /// track anything on their behalf.
    pub fn disable_device(&self, device_path: &str) -> Result<()> {
        let device_name = device_short_name(Path::new(device_path));
        let state_path = self
            .sysfs_root
            .join("block")
            .join(device_name)
            .join("device")
            .join("state");

        warn!(
            "Disabling device {} via {}",
            device_path,
            state_path.display()
        );

        write_control_file(&state_path, b"offline\n").map_err(|source| Error::DisableWrite {
            path: state_path,
            source,
        })
    }

    /// Check whether a device's filesystem is currently in use by the kernel
    ///
    /// Detects the device's filesystem type through `prober`, then stats
    /// `<sysfs>/fs/<fstype>/<name>` where `<name>` is the final segment of
    /// `dev_fs_path`. A missing entry means the filesystem is not in use; a
    /// present entry reports in-use exactly when it is a directory. Purely a
    /// metadata probe, nothing is opened or read.
    ///
    /// On a stat failure other than absence the in-use status is unknown and
    /// an error is returned; callers must not fall back to "not in use".
    pub fn is_device_filesystem_in_use(
        &self,
        prober: &dyn DiskFormatProber,
        device_path: &str,
        dev_fs_path: &str,
    ) -> Result<bool> {
        let fstype =
            prober
                .get_disk_format(device_path)
                .map_err(|source| Error::DiskFormat {
                    device_path: device_path.to_string(),
                    dev_fs_path: dev_fs_path.to_string(),
                    source,
                })?;

        let dev_fs_name = device_short_name(Path::new(dev_fs_path));
        let fs_entry_path = self.sysfs_root.join("fs").join(&fstype).join(dev_fs_name);

        match fs::metadata(&fs_entry_path) {
            Ok(meta) => {
                debug!(
                    "Filesystem entry {} exists (dir: {})",
                    fs_entry_path.display(),
                    meta.is_dir()
                );
                Ok(meta.is_dir())
            }
            // No entry for this filesystem, the device is not in use
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(
                    "No filesystem entry at {}, device not in use",
                    fs_entry_path.display()
                );
                Ok(false)
            }
            Err(source) => Err(Error::SysfsStat {
                path: fs_entry_path,
                source,
            }),
        }
    }
}

impl Default for DeviceController {
    fn default() -> Self {
        Self::new()
    }
}

/// Extract the device short name from a device path
///
/// Only the final path segment matters: `/dev/sdb`, `sdb`, and
/// `/dev/disk/by-id/../../sdb` all name the device `sdb`. Inputs without a
/// final segment are passed through unchanged.
pub fn device_short_name(path: &Path) -> &OsStr {
    path.file_name().unwrap_or(path.as_os_str())
}

/// Single write of `contents` to a sysfs control file, mode 0644
fn write_control_file(path: &Path, contents: &[u8]) -> io::Result<()> {
    let mut file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(0o644)
        .open(path)?;
    file.write_all(contents)
}
