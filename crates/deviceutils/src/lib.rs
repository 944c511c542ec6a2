//! Privileged block-device helpers for storage node agents
//!
//! This crate provides the two `/sys`-backed operations a node agent needs
//! when detaching or unstaging volumes: taking a block device offline through
//! its kernel control file, and checking whether a device's filesystem is
//! still in use via per-filesystem sysfs metadata. Filesystem type detection
//! is delegated to the caller through the [`DiskFormatProber`] trait.
//!
//! Linux-only: both operations are conventions of the Linux sysfs tree.

pub mod controller;
pub mod error;
pub mod format;
pub mod logging;

pub use controller::{DeviceController, device_short_name};
pub use error::{Error, Result};
pub use format::DiskFormatProber;
pub use logging::setup_logging;
