//! Account map directory
//!
//! A JSON file exported from the directory service, keyed by SID:
//!
//! ```json
//! {
//!   "S-1-5-21-111": { "account": "alice", "domain": "CORP", "displayName": "Alice Smith" }
//! }
//! ```
//!
//! Lets the scanner name disk owners on hosts that can't query the domain.

use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

use super::sid::{is_valid_sid, normalize_sid};
use super::{DirectoryError, DirectoryService, Identity};

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AccountEntry {
    account: String,
    #[serde(default)]
    domain: Option<String>,
    #[serde(default)]
    display_name: Option<String>,
    #[serde(default)]
    user_principal_name: Option<String>,
}

/// SID to account map loaded once per session
#[derive(Debug, Clone, Default)]
pub struct SidMap {
    accounts: HashMap<String, AccountEntry>,
}

impl SidMap {
    /// Load the map from a JSON file
    pub fn load(path: &Path) -> Result<Self, DirectoryError> {
        let json = fs::read_to_string(path).map_err(|e| DirectoryError::Load {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        let map = Self::from_json(&json).map_err(|e| DirectoryError::Load {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        tracing::info!(
            "Loaded {} accounts from {}",
            map.accounts.len(),
            path.display()
        );

        Ok(map)
    }

    /// Parse a map from its JSON text
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let raw: HashMap<String, AccountEntry> = serde_json::from_str(json)?;

        let accounts = raw
            .into_iter()
            .filter_map(|(sid, entry)| {
                if is_valid_sid(&sid) {
                    Some((normalize_sid(&sid), entry))
                } else {
                    tracing::warn!("Ignoring account map entry with invalid SID {:?}", sid);
                    None
                }
            })
            .collect();

        Ok(Self { accounts })
    }

    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }
}

impl DirectoryService for SidMap {
    fn find_by_identity(&self, sid: &str) -> Result<Option<Identity>, DirectoryError> {
        if !is_valid_sid(sid) {
            return Err(DirectoryError::MalformedSid(sid.to_string()));
        }

        Ok(self.accounts.get(&normalize_sid(sid)).map(|entry| Identity {
            sid: sid.to_string(),
            account: entry.account.clone(),
            domain: entry.domain.clone(),
            display_name: entry.display_name.clone(),
            user_principal_name: entry.user_principal_name.clone(),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const SAMPLE: &str = r#"{
        "S-1-5-21-111": { "account": "alice", "domain": "CORP", "displayName": "Alice Smith" },
        "s-1-5-21-222": { "account": "bob", "userPrincipalName": "bob@corp.example" },
        "not-a-sid": { "account": "ghost" }
    }"#;

    #[test]
    fn test_from_json_skips_invalid_sids() {
        let map = SidMap::from_json(SAMPLE).unwrap();
        assert_eq!(map.len(), 2);
    }

    #[test]
    fn test_lookup_is_case_insensitive() {
        let map = SidMap::from_json(SAMPLE).unwrap();

        let alice = map.find_by_identity("s-1-5-21-111").unwrap().unwrap();
        assert_eq!(alice.account, "alice");
        assert_eq!(alice.sid, "s-1-5-21-111");
        assert_eq!(alice.display_name.as_deref(), Some("Alice Smith"));

        let bob = map.find_by_identity("S-1-5-21-222").unwrap().unwrap();
        assert_eq!(bob.user_principal_name.as_deref(), Some("bob@corp.example"));
        assert!(bob.domain.is_none());
    }

    #[test]
    fn test_unknown_and_malformed() {
        let map = SidMap::from_json(SAMPLE).unwrap();
        assert!(map.find_by_identity("S-1-5-21-333").unwrap().is_none());
        assert!(matches!(
            map.find_by_identity("not-a-sid"),
            Err(DirectoryError::MalformedSid(_))
        ));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();

        let map = SidMap::load(file.path()).unwrap();
        assert_eq!(map.len(), 2);
    }

    #[test]
    fn test_load_invalid_json() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"[1, 2, 3]").unwrap();

        let err = SidMap::load(file.path()).unwrap_err();
        assert!(matches!(err, DirectoryError::Load { .. }));
    }

    #[test]
    fn test_load_missing_file() {
        let err = SidMap::load(Path::new("/nonexistent/sid-map.json")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/sid-map.json"));
    }
}
