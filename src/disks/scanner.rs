//! Profile disk scanner
//!
//! Lists the profile disks in each search path, resolves their owners and
//! probes whether they are in use. Paths are scanned one after another and
//! each disk is fully processed before the next one.

use std::path::{Path, PathBuf};
use std::time::Instant;

use super::name::{classify, PROFILE_DISK_GLOB};
use super::record::ProfileDisk;
use crate::error::ScanError;
use crate::identity::{DirectoryService, IdentityResolver};
use crate::storage::{probe, Storage};

/// Turn user-supplied search paths into the set to scan.
///
/// Duplicates are dropped keeping first-seen order. No paths, or a single
/// blank one, means the current directory.
pub fn resolve_search_paths<I, P>(paths: I, current_dir: &Path) -> Vec<PathBuf>
where
    I: IntoIterator<Item = P>,
    P: AsRef<str>,
{
    let mut unique: Vec<String> = Vec::new();
    for path in paths {
        let path = path.as_ref();
        if !unique.iter().any(|p| p == path) {
            unique.push(path.to_string());
        }
    }

    if unique.len() == 1 && unique[0].trim().is_empty() {
        unique.clear();
    }

    if unique.is_empty() {
        return vec![current_dir.to_path_buf()];
    }

    unique.into_iter().map(PathBuf::from).collect()
}

/// Scans directories for profile disks using one directory session
pub struct DiskScanner<'a, S: Storage, D: DirectoryService + ?Sized> {
    storage: &'a S,
    resolver: IdentityResolver<'a, D>,
}

impl<'a, S: Storage, D: DirectoryService + ?Sized> DiskScanner<'a, S, D> {
    pub fn new(storage: &'a S, directory: &'a D) -> Self {
        Self {
            storage,
            resolver: IdentityResolver::new(directory),
        }
    }

    /// Scan every path and concatenate the results in path order.
    ///
    /// With `locked_only`, the combined list is reduced to locked disks.
    /// Any fatal error discards all results.
    pub fn scan(
        &self,
        paths: &[PathBuf],
        locked_only: bool,
    ) -> Result<Vec<ProfileDisk>, ScanError> {
        let mut disks = Vec::new();

        for path in paths {
            disks.extend(self.scan_path(path)?);
        }

        if locked_only {
            disks.retain(|disk| disk.is_locked);
        }

        Ok(disks)
    }

    /// Scan a single directory
    pub fn scan_path(&self, path: &Path) -> Result<Vec<ProfileDisk>, ScanError> {
        let start = Instant::now();

        if !self.storage.is_dir(path) {
            return Err(ScanError::NotFound {
                path: path.to_path_buf(),
            });
        }

        let files = self
            .storage
            .list_matching(path, PROFILE_DISK_GLOB)
            .map_err(|source| ScanError::Enumerate {
                path: path.to_path_buf(),
                source,
            })?;

        let mut disks = Vec::with_capacity(files.len());

        for file in files {
            // The glob should already guarantee this
            let Some(sid) = classify(&file.name) else {
                tracing::debug!("Skipping {}: not a profile disk", file.name);
                continue;
            };
            let sid = sid.to_string();

            let identity = self.resolver.resolve(&sid);
            let is_locked = probe(self.storage, &file.path)?.is_locked();

            tracing::debug!(
                "{}: owner={} locked={}",
                file.name,
                identity
                    .as_ref()
                    .map(|i| i.qualified_name())
                    .unwrap_or_else(|| "<unknown>".to_string()),
                is_locked
            );

            disks.push(ProfileDisk {
                file,
                sid,
                identity,
                is_locked,
            });
        }

        tracing::info!(
            "Scanned {}: {} profile disks ({} locked) in {}ms",
            path.display(),
            disks.len(),
            disks.iter().filter(|d| d.is_locked).count(),
            start.elapsed().as_millis()
        );

        Ok(disks)
    }
}
