//! Error types for profile disk scans.
//!
//! Only the conditions below stop a scan. Identity lookup failures, lock
//! contention and names that are not profile disks are absorbed into the
//! individual records instead.

use std::io;
use std::path::{Path, PathBuf};

/// Fatal scan failure, naming the path and what the caller has to fix.
#[derive(Debug, thiserror::Error)]
pub enum ScanError {
    /// A search path does not exist or is not a directory.
    #[error("Path does not exist or is not a directory: {}", path.display())]
    NotFound { path: PathBuf },

    /// The lock probe was refused by the OS, so the lock state is unknown.
    #[error(
        "Access denied while checking whether {} is locked. Checking user profile disks requires full control on both the network share permissions and the NTFS/local ACLs.",
        path.display()
    )]
    PermissionDenied {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The directory exists but its entries could not be listed.
    #[error("Failed to read directory {}: {source}", path.display())]
    Enumerate {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl ScanError {
    /// The path this error is attributed to.
    pub fn path(&self) -> &Path {
        match self {
            ScanError::NotFound { path }
            | ScanError::PermissionDenied { path, .. }
            | ScanError::Enumerate { path, .. } => path.as_path(),
        }
    }

    pub fn is_permission_error(&self) -> bool {
        matches!(self, ScanError::PermissionDenied { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_names_path() {
        let err = ScanError::NotFound {
            path: PathBuf::from("/srv/profiles/missing"),
        };
        assert!(err.to_string().contains("/srv/profiles/missing"));
        assert_eq!(err.path(), Path::new("/srv/profiles/missing"));
        assert!(!err.is_permission_error());
    }

    #[test]
    fn test_permission_denied_mentions_share_and_acl() {
        let err = ScanError::PermissionDenied {
            path: PathBuf::from("UVHD-S-1-5-21-1.vhdx"),
            source: io::Error::from(io::ErrorKind::PermissionDenied),
        };
        let message = err.to_string();
        assert!(message.contains("UVHD-S-1-5-21-1.vhdx"));
        assert!(message.contains("network share"));
        assert!(message.contains("ACL"));
        assert!(err.is_permission_error());
    }
}
