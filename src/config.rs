//! Scan configuration
//!
//! Values come from the environment (a `.env` file is loaded first by the
//! binary) and can be overridden from the command line.

use std::path::PathBuf;

use crate::identity::{Directory, DirectoryError, SidMap};

/// Environment variable naming the JSON account map
pub const SID_MAP_ENV: &str = "UVHD_SID_MAP";

/// Environment variable naming the server used for Windows account lookups
pub const DIRECTORY_SERVER_ENV: &str = "UVHD_DIRECTORY_SERVER";

/// Default log filter when `RUST_LOG` is unset
pub const DEFAULT_LOG_FILTER: &str = "warn,uvhd_scan=info";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Config {
    /// Account map file
    pub sid_map: Option<PathBuf>,

    /// Whether `sid_map` was asked for explicitly (env or flag) rather than
    /// picked up from the config directory
    pub sid_map_explicit: bool,

    /// Server or domain controller for Windows account lookups
    pub directory_server: Option<String>,
}

impl Config {
    /// Load from the process environment
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load using `lookup` to read variables
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_blank = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let (sid_map, sid_map_explicit) = match non_blank(SID_MAP_ENV) {
            Some(path) => (Some(PathBuf::from(path)), true),
            None => (Self::default_sid_map().filter(|p| p.is_file()), false),
        };

        Self {
            sid_map,
            sid_map_explicit,
            directory_server: non_blank(DIRECTORY_SERVER_ENV),
        }
    }

    /// `<config dir>/uvhd-scan/sid-map.json`
    pub fn default_sid_map() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("uvhd-scan").join("sid-map.json"))
    }

    pub fn with_sid_map(mut self, path: PathBuf) -> Self {
        self.sid_map = Some(path);
        self.sid_map_explicit = true;
        self
    }

    pub fn with_directory_server(mut self, server: String) -> Self {
        self.directory_server = Some(server);
        self
    }

    /// Open the directory session for a scan.
    ///
    /// Prefers the account map, then the Windows account lookup, and falls
    /// back to resolving nothing.
    pub fn open_directory(&self) -> Result<Directory, DirectoryError> {
        if let Some(path) = &self.sid_map {
            match SidMap::load(path) {
                Ok(map) => return Ok(Directory::SidMap(map)),
                Err(e) if self.sid_map_explicit => return Err(e),
                Err(e) => tracing::warn!("{}. Ignoring default account map.", e),
            }
        }

        Ok(Self::native_directory(self.directory_server.as_deref()))
    }

    #[cfg(windows)]
    fn native_directory(server: Option<&str>) -> Directory {
        Directory::Windows(crate::identity::windows::AccountLookup::new(server))
    }

    #[cfg(not(windows))]
    fn native_directory(server: Option<&str>) -> Directory {
        if let Some(server) = server {
            tracing::warn!(
                "{} is only used on Windows; ignoring {}",
                DIRECTORY_SERVER_ENV,
                server
            );
        }
        Directory::Offline
    }
}
