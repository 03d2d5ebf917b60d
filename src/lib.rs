//! Inventory of user profile disks (`UVHD-<SID>.vhdx`).
//!
//! For each search directory the scanner lists the profile disks, resolves the
//! owning account from the SID in the file name, and probes whether the disk is
//! currently held open by another process.

pub mod config;
pub mod disks;
pub mod error;
pub mod identity;
pub mod output;
pub mod storage;

pub use config::Config;
pub use disks::{classify, resolve_search_paths, DiskScanner, ProfileDisk};
pub use error::ScanError;
pub use identity::{Directory, DirectoryError, DirectoryService, Identity, IdentityResolver};
pub use storage::{probe, LocalStorage, LockState, Storage};
