//! User profile disks
//!
//! Naming convention, record type and the directory scanner.

pub mod name;
pub mod record;
pub mod scanner;

pub use name::{classify, PROFILE_DISK_GLOB};
pub use record::ProfileDisk;
pub use scanner::{resolve_search_paths, DiskScanner};
