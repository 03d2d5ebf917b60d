//! Security identifier syntax

use once_cell::sync::Lazy;
use regex::Regex;

/// `S-<revision>-<authority>[-<subauthority>...]`, revision is always 1.
static SID_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[Ss]-1-(\d{1,13}|0[xX][0-9a-fA-F]{12})(-\d{1,10}){0,15}$")
        .expect("Invalid SID regex")
});

/// Check whether a token is a syntactically valid string SID.
///
/// Sub-authorities are 32-bit values; anything larger is rejected.
pub fn is_valid_sid(token: &str) -> bool {
    if !SID_PATTERN.is_match(token) {
        return false;
    }

    token
        .split('-')
        .skip(3)
        .all(|part| part.parse::<u32>().is_ok())
}

/// Normalize a SID for map lookups (upper-case `S`, hex authority upper-cased).
pub fn normalize_sid(token: &str) -> String {
    token.to_ascii_uppercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_sids() {
        assert!(is_valid_sid("S-1-5-21-111"));
        assert!(is_valid_sid("S-1-5-21-3623811015-3361044348-30300820-1013"));
        assert!(is_valid_sid("s-1-5-18"));
        assert!(is_valid_sid("S-1-1-0"));
    }

    #[test]
    fn test_invalid_sids() {
        assert!(!is_valid_sid(""));
        assert!(!is_valid_sid("S-2-5-21"));
        assert!(!is_valid_sid("S-1"));
        assert!(!is_valid_sid("S-1-5-21-"));
        assert!(!is_valid_sid("template"));
        assert!(!is_valid_sid("S-1-5-21-4294967296"));
        assert!(!is_valid_sid("S-1-5-21-111 "));
    }

    #[test]
    fn test_normalize_sid() {
        assert_eq!(normalize_sid("s-1-5-21-111"), "S-1-5-21-111");
    }
}
