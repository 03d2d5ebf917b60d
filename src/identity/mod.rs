//! Identity resolution
//!
//! Maps the SID embedded in a profile disk name to the account that owns it.
//! Resolution is best-effort: every failure, from a malformed SID to an
//! unreachable directory, ends up as "unknown owner" and never stops a scan.

pub mod sid;
pub mod sid_map;
#[cfg(windows)]
pub mod windows;

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub use sid::is_valid_sid;
pub use sid_map::SidMap;

/// Account that owns a profile disk
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    /// SID as found in the file name
    pub sid: String,

    /// Account (SAM) name, e.g. `alice`
    pub account: String,

    /// Domain or machine the account lives in
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_principal_name: Option<String>,
}

impl Identity {
    pub fn new(sid: impl Into<String>, account: impl Into<String>) -> Self {
        Self {
            sid: sid.into(),
            account: account.into(),
            domain: None,
            display_name: None,
            user_principal_name: None,
        }
    }

    pub fn with_domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = Some(domain.into());
        self
    }

    /// `DOMAIN\account`, or just the account when the domain is unknown
    pub fn qualified_name(&self) -> String {
        match &self.domain {
            Some(domain) if !domain.is_empty() => format!("{}\\{}", domain, self.account),
            _ => self.account.clone(),
        }
    }
}

/// Failure reported by a directory backend
#[derive(Debug, thiserror::Error)]
pub enum DirectoryError {
    #[error("Malformed SID: {0}")]
    MalformedSid(String),

    #[error("Directory lookup failed for {sid}: {message}")]
    Lookup { sid: String, message: String },

    #[error("Failed to load account map {}: {message}", path.display())]
    Load { path: PathBuf, message: String },
}

/// A directory that can find accounts by SID.
///
/// `Ok(None)` means the directory answered and has no such account.
pub trait DirectoryService {
    fn find_by_identity(&self, sid: &str) -> Result<Option<Identity>, DirectoryError>;
}

/// Directory backends available to a scan session.
///
/// Created once when the session starts and lent to every lookup.
pub enum Directory {
    /// No directory configured; every owner is unknown
    Offline,
    /// Account map loaded from a JSON file
    SidMap(SidMap),
    /// Windows account lookup
    #[cfg(windows)]
    Windows(windows::AccountLookup),
}

impl Directory {
    pub fn name(&self) -> &'static str {
        match self {
            Directory::Offline => "offline",
            Directory::SidMap(_) => "sid-map",
            #[cfg(windows)]
            Directory::Windows(_) => "windows",
        }
    }
}

impl DirectoryService for Directory {
    fn find_by_identity(&self, sid: &str) -> Result<Option<Identity>, DirectoryError> {
        match self {
            Directory::Offline => Ok(None),
            Directory::SidMap(map) => map.find_by_identity(sid),
            #[cfg(windows)]
            Directory::Windows(lookup) => lookup.find_by_identity(sid),
        }
    }
}

/// Best-effort SID to account resolution over a borrowed directory.
pub struct IdentityResolver<'a, D: DirectoryService + ?Sized> {
    directory: &'a D,
}

impl<'a, D: DirectoryService + ?Sized> IdentityResolver<'a, D> {
    pub fn new(directory: &'a D) -> Self {
        Self { directory }
    }

    /// Resolve a SID, or `None` if it can't be resolved for any reason.
    ///
    /// A single attempt is made; failures are logged and not retried.
    pub fn resolve(&self, sid: &str) -> Option<Identity> {
        match self.directory.find_by_identity(sid) {
            Ok(Some(identity)) => {
                tracing::debug!("Resolved {} to {}", sid, identity.qualified_name());
                Some(identity)
            }
            Ok(None) => {
                tracing::debug!("No account found for {}", sid);
                None
            }
            Err(DirectoryError::MalformedSid(token)) => {
                tracing::debug!("Not a valid SID: {:?}", token);
                None
            }
            Err(e) => {
                tracing::warn!("Identity lookup failed: {}", e);
                None
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::cell::Cell;
    use std::collections::HashMap;

    /// In-memory directory with an optional forced failure and a call counter
    #[derive(Default)]
    pub struct FakeDirectory {
        pub accounts: HashMap<String, Identity>,
        pub fail_with: Option<String>,
        pub calls: Cell<usize>,
    }

    impl FakeDirectory {
        pub fn with_account(mut self, sid: &str, account: &str) -> Self {
            self.accounts
                .insert(sid.to_string(), Identity::new(sid, account).with_domain("CORP"));
            self
        }
    }

    impl DirectoryService for FakeDirectory {
        fn find_by_identity(&self, sid: &str) -> Result<Option<Identity>, DirectoryError> {
            self.calls.set(self.calls.get() + 1);
            if let Some(message) = &self.fail_with {
                return Err(DirectoryError::Lookup {
                    sid: sid.to_string(),
                    message: message.clone(),
                });
            }
            if !is_valid_sid(sid) {
                return Err(DirectoryError::MalformedSid(sid.to_string()));
            }
            Ok(self.accounts.get(sid).cloned())
        }
    }

    #[test]
    fn test_resolve_known_sid() {
        let directory = FakeDirectory::default().with_account("S-1-5-21-111", "alice");
        let resolver = IdentityResolver::new(&directory);

        let identity = resolver.resolve("S-1-5-21-111").unwrap();
        assert_eq!(identity.account, "alice");
        assert_eq!(identity.qualified_name(), "CORP\\alice");
    }

    #[test]
    fn test_unknown_sid_is_unresolved() {
        let directory = FakeDirectory::default();
        let resolver = IdentityResolver::new(&directory);
        assert!(resolver.resolve("S-1-5-21-999").is_none());
    }

    #[test]
    fn test_malformed_sid_is_unresolved() {
        let directory = FakeDirectory::default().with_account("S-1-5-21-111", "alice");
        let resolver = IdentityResolver::new(&directory);
        assert!(resolver.resolve("template").is_none());
        assert!(resolver.resolve("").is_none());
    }

    #[test]
    fn test_lookup_error_is_unresolved_without_retry() {
        let directory = FakeDirectory {
            fail_with: Some("server unavailable".to_string()),
            ..FakeDirectory::default()
        };
        let resolver = IdentityResolver::new(&directory);

        assert!(resolver.resolve("S-1-5-21-111").is_none());
        assert_eq!(directory.calls.get(), 1);
    }

    #[test]
    fn test_offline_directory_resolves_nothing() {
        let directory = Directory::Offline;
        let resolver = IdentityResolver::new(&directory);
        assert!(resolver.resolve("S-1-5-21-111").is_none());
        assert_eq!(directory.name(), "offline");
    }

    #[test]
    fn test_qualified_name_without_domain() {
        let identity = Identity::new("S-1-5-21-1", "bob");
        assert_eq!(identity.qualified_name(), "bob");
    }
}
