//! Fixed lexical vocabularies
//!
//! Starter sets. Only hit counts and membership flags feed the feature
//! vector, so extending a set does not change the layout.

use std::collections::HashSet;

use once_cell::sync::Lazy;

/// Common URL shorteners (often abused)
pub static SHORTENER_DOMAINS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "bit.ly", "tinyurl.com", "t.co", "goo.gl", "ow.ly", "is.gd", "buff.ly",
        "cutt.ly", "rebrand.ly", "rb.gy", "shorturl.at", "shorte.st", "bitly.com",
    ]
    .into_iter()
    .collect()
});

/// TLDs with a disproportionate share of abuse
pub static SUSPICIOUS_TLDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "zip", "mov", "kim", "country", "stream", "gq", "tk", "top", "xyz",
        "monster", "work", "click", "link", "biz", "info",
    ]
    .into_iter()
    .collect()
});

/// Brand-bait words commonly planted in lookalike URLs
pub static BRAND_WORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "google", "gmail", "facebook", "instagram", "whatsapp", "paypal", "apple",
        "microsoft", "netflix", "amazon", "bank", "secure", "login", "signin",
        "verify", "update", "account", "billing", "support",
    ]
    .into_iter()
    .collect()
});

/// Tokens frequently found in phishing paths and query strings
pub const SENSITIVE_TOKENS: &[&str] = &[
    "login", "signin", "verify", "update", "secure", "account", "banking", "password",
];
