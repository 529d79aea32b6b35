//! Compilation entry point: list text in, installable rule set out.
//!
//! Compilation is a pure function with no side effects on any engine. The
//! boundary layer compiles first and swaps the finished set in afterwards,
//! which is what keeps a failed load from disturbing the active rules.

use std::collections::HashSet;

use log::debug;
use thiserror::Error;

use pal_core::ruleset::RuleSet;
use pal_core::types::Rule;

use crate::parser::{parse_filter_list, LineStats};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CompileError {
    /// Null, empty, or whitespace-only input.
    #[error("filter list text is empty")]
    EmptyInput,
    /// The input had content but nothing usable came out of it.
    #[error("no usable rules in filter list ({skipped} lines skipped)")]
    NoValidRules { skipped: usize },
}

/// Counts reported alongside a successful compile.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ListSummary {
    pub lines: LineStats,
    /// Rules parsed before deduplication.
    pub parsed_rules: usize,
    /// Exact duplicates dropped.
    pub deduped: usize,
    pub domain_rules: usize,
    pub pattern_rules: usize,
    pub exception_rules: usize,
}

/// A compiled list, ready to install.
#[derive(Debug)]
pub struct CompiledList {
    pub rules: RuleSet,
    pub summary: ListSummary,
}

pub fn compile_list(text: &str) -> Result<CompiledList, CompileError> {
    if text.trim().is_empty() {
        return Err(CompileError::EmptyInput);
    }

    let outcome = parse_filter_list(text);
    if outcome.rules.is_empty() {
        return Err(CompileError::NoValidRules {
            skipped: outcome.stats.skipped,
        });
    }

    let mut rules = outcome.rules;
    let parsed_rules = rules.len();
    let deduped = dedupe_rules(&mut rules);

    let mut summary = ListSummary {
        lines: outcome.stats,
        parsed_rules,
        deduped,
        ..Default::default()
    };
    for rule in &rules {
        if rule.is_exception() {
            summary.exception_rules += 1;
        }
        match rule {
            Rule::Domain { .. } => summary.domain_rules += 1,
            Rule::Pattern { .. } => summary.pattern_rules += 1,
        }
    }

    debug!(
        "compiled {} rules ({} domain, {} pattern, {} exceptions, {} duplicates dropped)",
        parsed_rules - deduped,
        summary.domain_rules,
        summary.pattern_rules,
        summary.exception_rules,
        deduped
    );

    Ok(CompiledList {
        rules: RuleSet::from_rules(rules),
        summary,
    })
}

/// Drop exact duplicates, keeping first-occurrence order for patterns.
fn dedupe_rules(rules: &mut Vec<Rule>) -> usize {
    let before = rules.len();
    let mut seen: HashSet<Rule> = HashSet::with_capacity(before);
    rules.retain(|rule| seen.insert(rule.clone()));
    before - rules.len()
}

#[cfg(test)]
mod tests {
    use pal_core::types::Verdict;

    use super::*;

    #[test]
    fn compiles_domain_and_exception_rules() {
        let list = "\
! Title: test list
||ads.example.com^
||tracker.example.com^
@@||good.ads.example.com^
";
        let compiled = compile_list(list).expect("list should compile");
        let rules = &compiled.rules;

        assert_eq!(rules.decide("https://ads.example.com/a.js"), Verdict::Block);
        assert_eq!(rules.decide("https://sub.tracker.example.com/"), Verdict::Block);
        assert_eq!(rules.decide("https://good.ads.example.com/a.js"), Verdict::Allow);
        assert_eq!(rules.decide("https://example.com/"), Verdict::Allow);

        assert_eq!(compiled.summary.domain_rules, 3);
        assert_eq!(compiled.summary.exception_rules, 1);
        assert_eq!(compiled.summary.lines.comments, 1);
    }

    #[test]
    fn compiles_hosts_file_lines() {
        let list = "\
# AdAway style
127.0.0.1 localhost
0.0.0.0 ads.badsite.test
::1 ip6-localhost
0.0.0.0 metrics.badsite.test
";
        let compiled = compile_list(list).expect("hosts list should compile");
        let rules = &compiled.rules;

        assert_eq!(rules.decide("http://ads.badsite.test/pixel"), Verdict::Block);
        assert_eq!(rules.decide("http://metrics.badsite.test/"), Verdict::Block);
        // Loopback housekeeping entries never become rules.
        assert_eq!(rules.decide("http://localhost/admin"), Verdict::Allow);
        assert_eq!(compiled.summary.domain_rules, 2);
    }

    #[test]
    fn compiles_bare_domains() {
        let compiled = compile_list("doubleclick.net\n").expect("should compile");
        assert_eq!(
            compiled.rules.decide("https://stats.doubleclick.net/x"),
            Verdict::Block
        );
        // Host-suffix semantics, not substring: the domain inside a query
        // string of another host does not match.
        assert_eq!(
            compiled.rules.decide("https://ok.com/?r=doubleclick.net"),
            Verdict::Allow
        );
    }

    #[test]
    fn compiles_wildcard_patterns() {
        let list = "\
/banner/*/ad.
|http://promo.
||cdn.example.com/sync^
";
        let compiled = compile_list(list).expect("should compile");
        let rules = &compiled.rules;

        assert_eq!(compiled.summary.pattern_rules, 3);
        assert_eq!(
            rules.decide("https://x.com/banner/top/ad.png"),
            Verdict::Block
        );
        assert_eq!(rules.decide("http://promo.example.com/"), Verdict::Block);
        assert_eq!(
            rules.decide("https://cdn.example.com/sync?id=1"),
            Verdict::Block
        );
        assert_eq!(rules.decide("https://cdn.example.com/syncer"), Verdict::Allow);
    }

    #[test]
    fn host_anchor_with_tail_is_not_a_domain_rule() {
        let compiled = compile_list("||example.com/ads/\n").expect("should compile");
        assert_eq!(compiled.summary.domain_rules, 0);
        assert_eq!(compiled.summary.pattern_rules, 1);
        assert_eq!(
            compiled.rules.decide("https://example.com/ads/1.js"),
            Verdict::Block
        );
        // The whole host must not be blocked by the pattern's host part.
        assert_eq!(compiled.rules.decide("https://example.com/"), Verdict::Allow);
    }

    #[test]
    fn skips_cosmetic_and_option_rules() {
        let list = "\
example.com##.ad-banner
##.generic-ad
||ads.example.com^$third-party
||tracker.example.com^
";
        let compiled = compile_list(list).expect("should compile");
        assert_eq!(compiled.summary.lines.cosmetic, 1);
        // `##.generic-ad` starts with '#' and reads as a comment line.
        assert_eq!(compiled.summary.lines.comments, 1);
        assert_eq!(compiled.summary.lines.skipped, 1);
        assert_eq!(compiled.summary.domain_rules, 1);
        assert_eq!(
            compiled.rules.decide("https://ads.example.com/"),
            Verdict::Allow
        );
    }

    #[test]
    fn deduplicates_rules() {
        let list = "\
||ads.example.com^
||ads.example.com^
/banner/
/banner/
";
        let compiled = compile_list(list).expect("should compile");
        assert_eq!(compiled.summary.parsed_rules, 4);
        assert_eq!(compiled.summary.deduped, 2);
        assert_eq!(compiled.rules.rule_count(), 2);
    }

    #[test]
    fn empty_input_fails() {
        assert!(matches!(compile_list(""), Err(CompileError::EmptyInput)));
        assert!(matches!(compile_list("   \n\t\n"), Err(CompileError::EmptyInput)));
    }

    #[test]
    fn junk_only_input_fails() {
        let err = compile_list("ab\n^^\n").expect_err("junk should not compile");
        assert_eq!(err, CompileError::NoValidRules { skipped: 2 });

        // Comments alone are not usable rules either.
        assert!(matches!(
            compile_list("! just a comment\n"),
            Err(CompileError::NoValidRules { .. })
        ));
    }

    #[test]
    fn tiny_patterns_are_rejected_as_too_broad() {
        let compiled = compile_list("ab*\n||ads.example.com^\n").expect("should compile");
        assert_eq!(compiled.summary.lines.skipped, 1);
        assert_eq!(compiled.rules.rule_count(), 1);
    }
}
