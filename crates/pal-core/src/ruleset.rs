//! Compiled rule set and the decision procedure.
//!
//! A `RuleSet` is immutable once built. The engine swaps whole sets in and
//! out; nothing here mutates after construction, which is what makes the
//! many-readers model safe.

use std::collections::HashSet;

use crate::hash::hash_domain;
use crate::types::{Pattern, Rule, Verdict};
use crate::url::{extract_host, host_suffixes};

/// The active matching structure: hashed domain sets for the common case,
/// compiled patterns for everything else.
#[derive(Debug, Default)]
pub struct RuleSet {
    block_domains: HashSet<u64>,
    allow_domains: HashSet<u64>,
    block_patterns: Vec<Pattern>,
    allow_patterns: Vec<Pattern>,
    rule_count: usize,
}

impl RuleSet {
    /// A set with no rules. Decides Allow for everything.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a set from parsed rules. Domain duplicates collapse via the hash
    /// sets; pattern duplicates are the caller's concern.
    pub fn from_rules(rules: impl IntoIterator<Item = Rule>) -> Self {
        let mut set = Self::default();
        for rule in rules {
            match rule {
                Rule::Domain { host, exception } => {
                    let h = hash_domain(&host);
                    if exception {
                        set.allow_domains.insert(h);
                    } else {
                        set.block_domains.insert(h);
                    }
                }
                Rule::Pattern { pattern, exception } => {
                    if exception {
                        set.allow_patterns.push(pattern);
                    } else {
                        set.block_patterns.push(pattern);
                    }
                }
            }
        }
        set.rule_count = set.block_domains.len()
            + set.allow_domains.len()
            + set.block_patterns.len()
            + set.allow_patterns.len();
        set
    }

    pub fn rule_count(&self) -> usize {
        self.rule_count
    }

    pub fn is_empty(&self) -> bool {
        self.rule_count == 0
    }

    /// Decide block/allow for one URL. Pure read; allow rules beat block
    /// rules; anything unmatched is allowed.
    ///
    /// Exception lookups only run once a block rule has matched, which keeps
    /// the common (unmatched) case to a domain walk plus one pattern scan.
    pub fn decide(&self, url: &str) -> Verdict {
        let host = extract_host(url).unwrap_or("");

        let mut blocked = false;
        if !host.is_empty() && !self.block_domains.is_empty() {
            for suffix in host_suffixes(host) {
                if self.block_domains.contains(&hash_domain(suffix)) {
                    blocked = true;
                    break;
                }
            }
        }
        if !blocked {
            blocked = self.block_patterns.iter().any(|p| p.matches(url));
        }
        if !blocked {
            return Verdict::Allow;
        }

        if !host.is_empty() && !self.allow_domains.is_empty() {
            for suffix in host_suffixes(host) {
                if self.allow_domains.contains(&hash_domain(suffix)) {
                    return Verdict::Allow;
                }
            }
        }
        if self.allow_patterns.iter().any(|p| p.matches(url)) {
            return Verdict::Allow;
        }

        Verdict::Block
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Anchor;

    fn domain(host: &str) -> Rule {
        Rule::Domain { host: host.to_string(), exception: false }
    }

    fn allow_domain(host: &str) -> Rule {
        Rule::Domain { host: host.to_string(), exception: true }
    }

    fn pattern(parts: &[&str], exception: bool) -> Rule {
        Rule::Pattern {
            pattern: Pattern {
                parts: parts.iter().map(|s| s.to_string()).collect(),
                anchor: Anchor::None,
                boundary_end: false,
                require_end: false,
            },
            exception,
        }
    }

    #[test]
    fn test_empty_set_allows() {
        let set = RuleSet::empty();
        assert!(set.is_empty());
        assert_eq!(set.decide("https://ads.example.com/x"), Verdict::Allow);
    }

    #[test]
    fn test_domain_rule_blocks_host_and_subdomains() {
        let set = RuleSet::from_rules([domain("ads.example.com")]);
        assert_eq!(set.decide("https://ads.example.com/x"), Verdict::Block);
        assert_eq!(set.decide("https://tracker.ads.example.com/y"), Verdict::Block);
        assert_eq!(set.decide("https://example.com/"), Verdict::Allow);
        assert_eq!(set.decide("https://news.example.com/"), Verdict::Allow);
    }

    #[test]
    fn test_domain_matching_is_case_insensitive() {
        let set = RuleSet::from_rules([domain("Ads.Example.COM")]);
        assert_eq!(set.decide("https://ADS.example.com/x"), Verdict::Block);
    }

    #[test]
    fn test_exception_beats_block() {
        let set = RuleSet::from_rules([
            domain("example.com"),
            allow_domain("good.example.com"),
        ]);
        assert_eq!(set.decide("https://example.com/"), Verdict::Block);
        assert_eq!(set.decide("https://cdn.example.com/"), Verdict::Block);
        assert_eq!(set.decide("https://good.example.com/"), Verdict::Allow);
        assert_eq!(set.decide("https://a.good.example.com/"), Verdict::Allow);
    }

    #[test]
    fn test_pattern_rules() {
        let set = RuleSet::from_rules([
            pattern(&["/adframe/"], false),
            pattern(&["/adframe/allowed/"], true),
        ]);
        assert_eq!(set.decide("https://x.com/adframe/banner"), Verdict::Block);
        assert_eq!(set.decide("https://x.com/adframe/allowed/1"), Verdict::Allow);
        assert_eq!(set.decide("https://x.com/content/"), Verdict::Allow);
    }

    #[test]
    fn test_schemeless_input_skips_domain_rules() {
        // No extractable host, so only patterns apply.
        let set = RuleSet::from_rules([domain("ads.example.com")]);
        assert_eq!(set.decide("ads.example.com/x"), Verdict::Allow);

        let set = RuleSet::from_rules([pattern(&["ads.example.com"], false)]);
        assert_eq!(set.decide("ads.example.com/x"), Verdict::Block);
    }

    #[test]
    fn test_duplicate_domains_collapse() {
        let set = RuleSet::from_rules([domain("a.com"), domain("a.com"), domain("A.COM")]);
        assert_eq!(set.rule_count(), 1);
    }

    #[test]
    fn test_fqdn_trailing_dot() {
        let set = RuleSet::from_rules([domain("ads.example.com")]);
        assert_eq!(set.decide("https://ads.example.com./x"), Verdict::Block);
    }
}
