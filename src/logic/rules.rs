//! Pre-scan rule engine
//!
//! Consults the enabled allow/deny rules plus the global auto-block-bare-IP
//! policy and can force a verdict before the classifier is consulted.

use crate::logic::domain;
use crate::models::{DetectionRule, Label};

/// Synthetic rule name reported for the bare-IP auto-block policy.
pub const AUTO_BLOCK_RULE: &str = "SYSTEM_AUTO_BLOCK_IP";

/// Verdict forced by the rule layer, bypassing classifier inference.
#[derive(Debug, Clone, PartialEq)]
pub struct ForcedVerdict {
    pub label: Label,
    pub prediction: i32,
    pub risk_score: f64,
    pub reason: String,
    pub matched_rule: String,
}

/// Evaluate the override layer for a URL.
///
/// First-match-wins over the rule slice as given: a broader rule earlier in
/// the ordering beats a more specific one later. Callers must preserve the
/// store's stable ordering.
pub fn apply_overrides(
    url: &str,
    auto_block_ip: bool,
    rules: &[DetectionRule],
) -> Option<ForcedVerdict> {
    let norm_url = url.trim().to_lowercase();
    let (registrable, host) = domain::resolve(url);

    if auto_block_ip && domain::is_ip_host(&host) {
        return Some(ForcedVerdict {
            label: Label::Phishing,
            prediction: 1,
            risk_score: 0.99,
            reason: "auto_block_ip".to_string(),
            matched_rule: AUTO_BLOCK_RULE.to_string(),
        });
    }

    for rule in rules.iter().filter(|r| r.enabled) {
        let pattern = rule.pattern.trim().to_lowercase();
        if pattern.is_empty() {
            continue;
        }

        let matched =
            norm_url.contains(&pattern) || pattern == registrable || pattern == host;
        if !matched {
            continue;
        }

        match rule.list_type.as_str() {
            "allow" => {
                return Some(ForcedVerdict {
                    label: Label::Legitimate,
                    prediction: 0,
                    risk_score: rule.force_risk_score.unwrap_or(0.05).min(0.2),
                    reason: "allowlist".to_string(),
                    matched_rule: pattern,
                });
            }
            "deny" => {
                return Some(ForcedVerdict {
                    label: Label::Phishing,
                    prediction: 1,
                    risk_score: rule.force_risk_score.unwrap_or(0.98).max(0.9),
                    reason: "denylist".to_string(),
                    matched_rule: pattern,
                });
            }
            other => {
                tracing::debug!("ignoring rule with unknown list_type '{other}'");
                continue;
            }
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auto_block_ip() {
        let verdict = apply_overrides("http://192.168.1.5/login", true, &[]).unwrap();
        assert_eq!(verdict.label, Label::Phishing);
        assert!(verdict.risk_score >= 0.9);
        assert_eq!(verdict.reason, "auto_block_ip");
        assert_eq!(verdict.matched_rule, AUTO_BLOCK_RULE);
    }

    #[test]
    fn test_auto_block_disabled() {
        assert!(apply_overrides("http://192.168.1.5/login", false, &[]).is_none());
    }

    #[test]
    fn test_auto_block_precedes_rules() {
        let rules = vec![DetectionRule::allow("192.168.1.5")];
        let verdict = apply_overrides("http://192.168.1.5/", true, &rules).unwrap();
        assert_eq!(verdict.reason, "auto_block_ip");
    }

    #[test]
    fn test_allow_rule_clamps_risk() {
        let rules = vec![DetectionRule::allow("google.com")];
        let verdict =
            apply_overrides("https://google.com/search?q=test", true, &rules).unwrap();
        assert_eq!(verdict.label, Label::Legitimate);
        assert_eq!(verdict.risk_score, 0.05);
        assert_eq!(verdict.matched_rule, "google.com");

        let rules = vec![DetectionRule::allow("google.com").with_force_risk_score(0.5)];
        let verdict = apply_overrides("https://google.com/", true, &rules).unwrap();
        assert_eq!(verdict.risk_score, 0.2);
    }

    #[test]
    fn test_deny_rule_clamps_risk() {
        let rules = vec![DetectionRule::deny("evil.test")];
        let verdict = apply_overrides("http://evil.test/paypal", true, &rules).unwrap();
        assert_eq!(verdict.label, Label::Phishing);
        assert_eq!(verdict.risk_score, 0.98);
        assert_eq!(verdict.reason, "denylist");

        let rules = vec![DetectionRule::deny("evil.test").with_force_risk_score(0.4)];
        let verdict = apply_overrides("http://evil.test/", true, &rules).unwrap();
        assert_eq!(verdict.risk_score, 0.9);
    }

    #[test]
    fn test_first_match_wins() {
        // Both rules match; evaluation order decides the outcome
        let deny_first = vec![
            DetectionRule::deny("example.com"),
            DetectionRule::allow("login.example.com"),
        ];
        let verdict =
            apply_overrides("http://login.example.com/", true, &deny_first).unwrap();
        assert_eq!(verdict.label, Label::Phishing);

        let allow_first = vec![
            DetectionRule::allow("login.example.com"),
            DetectionRule::deny("example.com"),
        ];
        let verdict =
            apply_overrides("http://login.example.com/", true, &allow_first).unwrap();
        assert_eq!(verdict.label, Label::Legitimate);
    }

    #[test]
    fn test_matches_registrable_domain_and_host() {
        let rules = vec![DetectionRule::deny("example.co.uk")];
        let verdict = apply_overrides("http://sub.example.co.uk/", true, &rules).unwrap();
        assert_eq!(verdict.label, Label::Phishing);

        let rules = vec![DetectionRule::allow("sub.example.co.uk")];
        let verdict = apply_overrides("http://sub.example.co.uk/", true, &rules).unwrap();
        assert_eq!(verdict.label, Label::Legitimate);
    }

    #[test]
    fn test_disabled_and_empty_rules_skipped() {
        let mut disabled = DetectionRule::deny("example.com");
        disabled.enabled = false;
        let mut empty = DetectionRule::deny("");
        empty.pattern = String::new();

        assert!(apply_overrides("http://example.com/", true, &[disabled, empty]).is_none());
    }

    #[test]
    fn test_no_match_falls_through() {
        let rules = vec![DetectionRule::deny("evil.test")];
        assert!(apply_overrides("http://fine.example.org/", true, &rules).is_none());
    }
}
