//! Profile disk records

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::identity::Identity;
use crate::storage::DiskFile;

/// One profile disk found by a scan.
///
/// `is_locked` reflects the moment the disk was probed and can be stale by the
/// time the record is read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileDisk {
    /// The disk image file
    pub file: DiskFile,

    /// SID token taken verbatim from the file name
    pub sid: String,

    /// Owning account, `None` when the SID could not be resolved
    pub identity: Option<Identity>,

    /// Whether another process held the disk open at probe time
    pub is_locked: bool,
}

impl ProfileDisk {
    pub fn path(&self) -> &Path {
        &self.file.path
    }

    pub fn name(&self) -> &str {
        &self.file.name
    }

    /// Owner for display, falling back to the raw SID
    pub fn owner(&self) -> String {
        self.identity
            .as_ref()
            .map(|identity| identity.qualified_name())
            .unwrap_or_else(|| self.sid.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn disk(identity: Option<Identity>) -> ProfileDisk {
        ProfileDisk {
            file: DiskFile::new(PathBuf::from("/upd/UVHD-S-1-5-21-111.vhdx")),
            sid: "S-1-5-21-111".to_string(),
            identity,
            is_locked: false,
        }
    }

    #[test]
    fn test_owner_falls_back_to_sid() {
        assert_eq!(disk(None).owner(), "S-1-5-21-111");

        let resolved = disk(Some(Identity::new("S-1-5-21-111", "alice").with_domain("CORP")));
        assert_eq!(resolved.owner(), "CORP\\alice");
        assert_eq!(resolved.name(), "UVHD-S-1-5-21-111.vhdx");
    }

    #[test]
    fn test_serializes_camel_case() {
        let json = serde_json::to_value(disk(None)).unwrap();
        assert_eq!(json["isLocked"], false);
        assert_eq!(json["sid"], "S-1-5-21-111");
        assert!(json["identity"].is_null());
        assert_eq!(json["file"]["name"], "UVHD-S-1-5-21-111.vhdx");
    }
}
