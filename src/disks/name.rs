//! Profile disk file names
//!
//! User profile disks are stored as `UVHD-<SID>.vhdx`. The prefix and the
//! extension are matched case-insensitively; the SID in between is passed on
//! verbatim and may still turn out to be invalid.

/// Glob used to pre-filter directory listings.
pub const PROFILE_DISK_GLOB: &str = "UVHD-*.vhdx";

const PREFIX: &str = "UVHD-";
const SUFFIX: &str = ".vhdx";

/// Extract the identity token from a profile disk file name.
///
/// Returns `None` when the name does not follow the profile disk convention,
/// in which case the file must be skipped.
pub fn classify(name: &str) -> Option<&str> {
    if name.len() < PREFIX.len() + SUFFIX.len() {
        return None;
    }

    let split_at = name.len() - SUFFIX.len();
    let prefix = name.get(..PREFIX.len())?;
    let suffix = name.get(split_at..)?;

    if !prefix.eq_ignore_ascii_case(PREFIX) || !suffix.eq_ignore_ascii_case(SUFFIX) {
        return None;
    }

    name.get(PREFIX.len()..split_at)
}
