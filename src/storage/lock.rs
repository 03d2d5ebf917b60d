//! Lock probing
//!
//! Profile disks have no lock flag of their own. A disk that is attached to a
//! session is held open by the host, so the only signal available is whether
//! we can open it exclusively ourselves. The answer is only valid for the
//! instant of the probe.

use serde::{Deserialize, Serialize};
use std::io;
use std::path::Path;

use super::Storage;
use crate::error::ScanError;

/// Lock state observed by a probe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LockState {
    Unlocked,
    Locked,
}

impl LockState {
    pub fn is_locked(self) -> bool {
        self == LockState::Locked
    }
}

/// Probe whether another process holds `path` open.
///
/// Access denied is fatal: it means the caller can't tell, not that the file
/// is locked. Every other open failure counts as locked.
pub fn probe<S: Storage>(storage: &S, path: &Path) -> Result<LockState, ScanError> {
    match storage.open_exclusive(path) {
        Ok(handle) => {
            drop(handle);
            Ok(LockState::Unlocked)
        }
        Err(e) if e.kind() == io::ErrorKind::PermissionDenied => {
            Err(ScanError::PermissionDenied {
                path: path.to_path_buf(),
                source: e,
            })
        }
        Err(e) => {
            tracing::debug!("{} is in use: {}", path.display(), e);
            Ok(LockState::Locked)
        }
    }
}
