//! Probability calibration and threshold adjustment
//!
//! The trained classifier carries a length bias: long, deep, legitimate URLs
//! get over-flagged. This layer corrects the probability and adapts the
//! decision threshold from URL-shape signals, without retraining. The
//! correction runs before the threshold adjustment and both key off the same
//! signals; the branch order is part of the scoring contract.

use std::collections::HashSet;

use once_cell::sync::Lazy;

use crate::logic::domain;
use crate::models::Label;

/// Domains never treated as phishing-suspect without rule overrides.
static KNOWN_DOMAINS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "google.com", "www.google.com", "youtube.com", "www.youtube.com",
        "github.com", "www.github.com", "amazon.com", "www.amazon.com",
        "ebay.com", "www.ebay.com", "stackoverflow.com", "www.stackoverflow.com",
        "facebook.com", "www.facebook.com", "twitter.com", "www.twitter.com",
        "linkedin.com", "www.linkedin.com", "reddit.com", "www.reddit.com",
        "wikipedia.org", "www.wikipedia.org", "apple.com", "www.apple.com",
        "microsoft.com", "www.microsoft.com", "adobe.com", "www.adobe.com",
        "oracle.com", "www.oracle.com", "docs.oracle.com",
        "nytimes.com", "www.nytimes.com", "cnn.com", "www.cnn.com",
        "bbc.com", "www.bbc.com", "amazonaws.com", "www.amazonaws.com",
        "cloudflare.com", "www.cloudflare.com",
    ]
    .into_iter()
    .collect()
});

/// TLDs eligible for the length-based corrections.
static COMMON_TLDS: Lazy<HashSet<&'static str>> =
    Lazy::new(|| ["com", "org", "edu", "gov"].into_iter().collect());

/// Path tokens typical of ordinary site navigation.
const COMMON_PATH_TOKENS: &[&str] = &[
    "/login", "/register", "/api", "/docs", "/watch", "/product", "/sch", "/item",
];

/// URL-shape signals the correction and threshold tables key off.
#[derive(Debug, Clone, Copy)]
struct UrlSignals {
    known_domain: bool,
    common_tld: bool,
    common_path: bool,
    url_len: usize,
}

impl UrlSignals {
    fn derive(url: &str) -> Self {
        let trimmed = url.trim();
        let (registrable, host) = domain::resolve(trimmed);

        let known_domain = KNOWN_DOMAINS.contains(host.as_str())
            || KNOWN_DOMAINS.contains(registrable.as_str());

        let tld = host.rsplit('.').next().unwrap_or("");
        let common_tld = host.contains('.') && COMMON_TLDS.contains(tld);

        let parts = domain::split_url(&domain::normalize_url(trimmed));
        let path_query = if parts.query.is_empty() {
            parts.path
        } else {
            format!("{}?{}", parts.path, parts.query)
        };
        let common_path = COMMON_PATH_TOKENS.iter().any(|t| path_query.contains(t));

        Self {
            known_domain,
            common_tld,
            common_path,
            // Length of the raw caller-supplied URL, not the normalized form
            url_len: trimmed.chars().count(),
        }
    }
}

type Predicate = fn(&UrlSignals) -> bool;

fn known_domain(s: &UrlSignals) -> bool {
    s.known_domain
}

fn short_common_tld(s: &UrlSignals) -> bool {
    s.common_tld && s.url_len <= 50
}

fn medium_common_tld_with_path(s: &UrlSignals) -> bool {
    s.common_tld && s.url_len <= 80 && s.common_path
}

fn common_tld_with_path(s: &UrlSignals) -> bool {
    s.common_tld && s.common_path
}

fn long_unknown(s: &UrlSignals) -> bool {
    s.url_len > 100 && !s.known_domain
}

/// Additive probability corrections, first match wins.
const CORRECTIONS: &[(Predicate, f64)] = &[
    (known_domain, -0.6),
    (short_common_tld, -0.3),
    (medium_common_tld_with_path, -0.4),
    (common_tld_with_path, -0.25),
];

/// Decision-threshold overrides, first match wins; no match keeps the
/// caller-requested threshold.
const THRESHOLD_OVERRIDES: &[(Predicate, f64)] = &[
    (known_domain, 0.8),
    (short_common_tld, 0.7),
    (long_unknown, 0.3),
];

/// Calibrated decision derived from the raw classifier probability.
#[derive(Debug, Clone, PartialEq)]
pub struct Calibration {
    /// Corrected probability; this is the reported risk score.
    pub risk_score: f64,
    /// Threshold actually applied after adjustment.
    pub threshold: f64,
    pub prediction: i32,
    pub label: Label,
}

fn round6(x: f64) -> f64 {
    (x * 1e6).round() / 1e6
}

/// Apply the bias correction and threshold adjustment to a raw probability.
pub fn calibrate(raw_probability: f64, url: &str, requested_threshold: f64) -> Calibration {
    let signals = UrlSignals::derive(url);
    let raw = raw_probability.clamp(0.0, 1.0);

    let correction = CORRECTIONS
        .iter()
        .find(|(applies, _)| applies(&signals))
        .map(|(_, delta)| *delta)
        .unwrap_or(0.0);
    let corrected = (raw + correction).clamp(0.0, 1.0);

    let threshold = THRESHOLD_OVERRIDES
        .iter()
        .find(|(applies, _)| applies(&signals))
        .map(|(_, t)| *t)
        .unwrap_or(requested_threshold);

    let prediction = i32::from(corrected >= threshold);

    Calibration {
        risk_score: round6(corrected),
        threshold,
        prediction,
        label: Label::from_prediction(prediction),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_domain_correction_and_threshold() {
        let cal = calibrate(0.7, "https://www.google.com/search?q=rust", 0.5);
        assert!((cal.risk_score - 0.1).abs() < 1e-9);
        assert_eq!(cal.threshold, 0.8);
        assert_eq!(cal.label, Label::Legitimate);
    }

    #[test]
    fn test_short_common_tld_correction() {
        let url = "http://smallsite.com/page";
        assert!(url.chars().count() <= 50);
        let cal = calibrate(0.6, url, 0.5);
        assert!((cal.risk_score - 0.3).abs() < 1e-9);
        assert_eq!(cal.threshold, 0.7);
        assert_eq!(cal.prediction, 0);
    }

    #[test]
    fn test_medium_length_with_common_path() {
        let url = "https://example.org/docs/reference/library/urllib.parse.html";
        let len = url.chars().count();
        assert!(len > 50 && len <= 80, "len = {len}");
        let cal = calibrate(0.7, url, 0.5);
        // -0.4 correction, threshold stays at the requested 0.5
        assert!((cal.risk_score - 0.3).abs() < 1e-9);
        assert_eq!(cal.threshold, 0.5);
        assert_eq!(cal.label, Label::Legitimate);
    }

    #[test]
    fn test_long_url_with_common_path() {
        let url = format!(
            "https://example.com/docs/{}",
            "segment/".repeat(12)
        );
        let len = url.chars().count();
        assert!(len > 100, "len = {len}");
        let cal = calibrate(0.6, &url, 0.5);
        // -0.25 correction, aggressive 0.3 threshold for long unknown URLs
        assert!((cal.risk_score - 0.35).abs() < 1e-9);
        assert_eq!(cal.threshold, 0.3);
        assert_eq!(cal.label, Label::Phishing);
    }

    #[test]
    fn test_uncommon_tld_no_correction() {
        // .net is outside the common set; the raw probability passes through
        let cal = calibrate(0.93, "http://paypal-security-check.net/verify", 0.5);
        assert_eq!(cal.risk_score, 0.93);
        assert_eq!(cal.threshold, 0.5);
        assert_eq!(cal.label, Label::Phishing);
    }

    #[test]
    fn test_correction_clamps_to_zero() {
        let cal = calibrate(0.2, "https://www.github.com/", 0.5);
        assert_eq!(cal.risk_score, 0.0);
    }

    #[test]
    fn test_monotonic_in_raw_probability() {
        let urls = [
            "https://www.google.com/search?q=test",
            "http://smallsite.com/page",
            "http://paypal-security-check.net/verify",
            "https://example.org/docs/reference/library/urllib.parse.html",
        ];
        for url in urls {
            let mut prev = -1.0;
            for step in 0..=100 {
                let raw = step as f64 / 100.0;
                let cal = calibrate(raw, url, 0.5);
                assert!(
                    cal.risk_score >= prev,
                    "corrected probability decreased at raw={raw} for {url}"
                );
                prev = cal.risk_score;
            }
        }
    }

    #[test]
    fn test_unparseable_url_is_total() {
        let cal = calibrate(0.5, "", 0.5);
        assert_eq!(cal.risk_score, 0.5);
        assert_eq!(cal.threshold, 0.5);
        assert_eq!(cal.label, Label::Phishing);
    }
}
