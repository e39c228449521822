//! Feature layout - centralized feature definition
//!
//! The single source of truth for the extractor's feature schema. Any change
//! to the names or their order must increment [`FEATURE_VERSION`]: persisted
//! feature payloads and trained classifier artifacts are keyed to it.

use crc32fast::Hasher;
use serde::{Deserialize, Serialize};

/// Current feature layout version
pub const FEATURE_VERSION: u8 = 1;

/// Feature names in the exact order they appear in the values array.
pub const FEATURE_LAYOUT: &[&str] = &[
    // === Validity (0) ===
    "is_valid_url",          // 0: URL conforms to the URL grammar

    // === Scheme / security (1-2) ===
    "is_https",              // 1: scheme is https
    "port_present",          // 2: explicit port in the authority

    // === Lengths (3-7) ===
    "url_length",            // 3
    "host_length",           // 4
    "path_length",           // 5
    "query_length",          // 6
    "fragment_length",       // 7

    // === Punctuation counts (8-17) ===
    "num_dots",              // 8
    "num_hyphens",           // 9
    "num_underscores",       // 10
    "num_slashes",           // 11
    "num_question",          // 12
    "num_equal",             // 13
    "num_ampersand",         // 14
    "num_percent",           // 15
    "num_at",                // 16
    "num_hash",              // 17

    // === Digits (18-19) ===
    "num_digits",            // 18
    "digit_ratio",           // 19

    // === Domain parts (20-23) ===
    "subdomain_levels",      // 20
    "subdomain_length",      // 21
    "domain_length",         // 22
    "tld_length",            // 23

    // === Structural red flags (24-31) ===
    "has_ip",                // 24: raw IPv4 literal in the host
    "has_hex_ip",            // 25: hex-encoded IP octets
    "http_count",            // 26: literal "http" occurrences
    "has_http_in_path",      // 27: "http" inside path/query
    "double_slash_after_scheme", // 28
    "has_punycode",          // 29: "xn--" marker
    "host_has_hyphen",       // 30
    "has_at_symbol",         // 31

    // === Lexical heuristics (32-35) ===
    "brand_word_hits",       // 32
    "is_shortener",          // 33
    "is_suspicious_tld",     // 34
    "sensitive_token_hits",  // 35

    // === Entropy (36-37) ===
    "url_entropy",           // 36
    "host_entropy",          // 37
];

/// Total number of features. Must match `FEATURE_LAYOUT.len()`.
pub const FEATURE_COUNT: usize = 38;

/// Compute CRC32 hash of the feature layout, used to detect layout
/// mismatches between persisted payloads and the running extractor.
pub fn compute_layout_hash() -> u32 {
    let mut hasher = Hasher::new();
    hasher.update(&[FEATURE_VERSION]);
    for name in FEATURE_LAYOUT {
        hasher.update(name.as_bytes());
        hasher.update(&[0]);
    }
    hasher.finalize()
}

/// Get layout hash (inputs are const, so this is stable per build)
pub fn layout_hash() -> u32 {
    compute_layout_hash()
}

/// Complete layout information for serialization/logging
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutInfo {
    pub version: u8,
    pub hash: u32,
    pub feature_count: usize,
    pub feature_names: Vec<String>,
}

impl LayoutInfo {
    pub fn current() -> Self {
        Self {
            version: FEATURE_VERSION,
            hash: layout_hash(),
            feature_count: FEATURE_COUNT,
            feature_names: FEATURE_LAYOUT.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// Get feature index by name (O(n), the layout is small)
pub fn feature_index(name: &str) -> Option<usize> {
    FEATURE_LAYOUT.iter().position(|&n| n == name)
}

/// Get feature name by index
pub fn feature_name(index: usize) -> Option<&'static str> {
    FEATURE_LAYOUT.get(index).copied()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feature_count() {
        assert_eq!(FEATURE_COUNT, 38);
        assert_eq!(FEATURE_LAYOUT.len(), FEATURE_COUNT);
    }

    #[test]
    fn test_layout_hash_consistency() {
        assert_eq!(compute_layout_hash(), compute_layout_hash());
    }

    #[test]
    fn test_layout_hash_non_zero() {
        assert_ne!(layout_hash(), 0);
    }

    #[test]
    fn test_feature_index() {
        assert_eq!(feature_index("is_valid_url"), Some(0));
        assert_eq!(feature_index("url_length"), Some(3));
        assert_eq!(feature_index("host_entropy"), Some(37));
        assert_eq!(feature_index("nonexistent"), None);
    }

    #[test]
    fn test_feature_name() {
        assert_eq!(feature_name(0), Some("is_valid_url"));
        assert_eq!(feature_name(37), Some("host_entropy"));
        assert_eq!(feature_name(100), None);
    }

    #[test]
    fn test_layout_info() {
        let info = LayoutInfo::current();
        assert_eq!(info.version, FEATURE_VERSION);
        assert_eq!(info.feature_names.len(), FEATURE_COUNT);
    }
}
