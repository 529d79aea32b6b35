//! Filter-list parser.
//!
//! Line-oriented EasyList/hosts-file subset:
//!
//! - `!`, `[`, `#` lines are comments
//! - cosmetic rules (`##`, `#@#`, `#?#`) are skipped, they are not network rules
//! - `@@` prefixes an exception; the remainder parses like a block rule
//! - `||host^` (also bare `||host`) blocks the host and every subdomain
//! - `0.0.0.0 host` hosts-file entries become domain rules
//! - a bare registrable domain becomes a domain rule
//! - anything else becomes a wildcard pattern: `*` gaps, `|`/`||` anchors,
//!   trailing `^` separator, trailing `|` end anchor
//!
//! Unparseable lines, and lines carrying `$option` suffixes, are counted and
//! dropped, never fatal: real-world lists always contain directives this
//! engine does not model.

use std::net::IpAddr;

use pal_core::types::{Anchor, Pattern, Rule};

/// Hosts-file names that must never become block rules.
const HOSTS_IGNORE: &[&str] = &[
    "localhost",
    "localhost.localdomain",
    "local",
    "broadcasthost",
    "ip6-localhost",
    "ip6-loopback",
];

/// Shortest usable literal content of a pattern. Anything shorter matches
/// half the internet and is dropped as malformed.
const MIN_PATTERN_LITERALS: usize = 3;

/// Line census accumulated during a parse.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LineStats {
    /// Every line in the input, including blanks.
    pub total: usize,
    /// Comment and list-header lines.
    pub comments: usize,
    /// Cosmetic (element-hiding) rules, out of scope for network decisions.
    pub cosmetic: usize,
    /// Lines that parsed as nothing usable.
    pub skipped: usize,
}

/// Parsed rules plus the census for reporting.
#[derive(Debug, Default)]
pub struct ParseOutcome {
    pub rules: Vec<Rule>,
    pub stats: LineStats,
}

pub fn parse_filter_list(text: &str) -> ParseOutcome {
    let mut outcome = ParseOutcome::default();

    for raw_line in text.lines() {
        outcome.stats.total += 1;

        let mut line = raw_line.trim();
        if line.is_empty() {
            continue;
        }
        if is_comment_line(line) {
            outcome.stats.comments += 1;
            continue;
        }
        if line.contains("##") || line.contains("#@#") || line.contains("#?#") {
            outcome.stats.cosmetic += 1;
            continue;
        }

        // `$type,domain=...` option suffixes are not modeled here. Dropping
        // the whole line is the safe direction: honoring the pattern while
        // ignoring its options would over-block.
        if line.contains('$') {
            outcome.stats.skipped += 1;
            continue;
        }

        let mut exception = false;
        if let Some(rest) = line.strip_prefix("@@") {
            exception = true;
            line = rest.trim_start();
        }

        if let Some(host) = parse_host_anchor_rule(line) {
            outcome.rules.push(Rule::Domain { host, exception });
            continue;
        }

        match parse_hosts_line(line) {
            HostsLine::Domain(host) => {
                outcome.rules.push(Rule::Domain { host, exception });
                continue;
            }
            HostsLine::Ignored => {
                outcome.stats.skipped += 1;
                continue;
            }
            HostsLine::NotHosts => {}
        }

        if let Some(host) = parse_bare_domain(line) {
            outcome.rules.push(Rule::Domain { host, exception });
            continue;
        }

        match parse_pattern_rule(line) {
            Some(pattern) => outcome.rules.push(Rule::Pattern { pattern, exception }),
            None => outcome.stats.skipped += 1,
        }
    }

    outcome
}

fn is_comment_line(line: &str) -> bool {
    line.starts_with('!') || line.starts_with('[') || line.starts_with('#')
}

/// `||host^`, `||host^|`, or bare `||host`: a pure domain rule. Returns None
/// when anything else follows the host, so `||host^path` and `||host/path`
/// fall through to the pattern parser instead of silently losing their tails.
fn parse_host_anchor_rule(line: &str) -> Option<String> {
    let mut rest = line.strip_prefix("||")?.trim_end_matches(['^', '|']);
    if rest.starts_with('.') {
        rest = &rest[1..];
    }
    normalize_domain(rest)
}

enum HostsLine {
    /// Not a hosts-file entry at all.
    NotHosts,
    /// A hosts-file entry, but one that must not become a rule.
    Ignored,
    Domain(String),
}

/// `<ip> <hostname>` hosts-file entries. The IP must actually parse; loopback
/// housekeeping names never become rules.
fn parse_hosts_line(line: &str) -> HostsLine {
    let mut parts = line.split_whitespace();
    let (Some(first), Some(second)) = (parts.next(), parts.next()) else {
        return HostsLine::NotHosts;
    };

    if first.parse::<IpAddr>().is_err() {
        return HostsLine::NotHosts;
    }

    match normalize_domain(second) {
        Some(host) if !HOSTS_IGNORE.contains(&host.as_str()) => HostsLine::Domain(host),
        _ => HostsLine::Ignored,
    }
}

/// A lone domain on its own line. Requires a dot so single labels (and random
/// words) do not turn into rules.
fn parse_bare_domain(line: &str) -> Option<String> {
    if !line.contains('.') {
        return None;
    }
    normalize_domain(line)
}

fn normalize_domain(host: &str) -> Option<String> {
    let trimmed = host.trim().trim_matches('.');
    if trimmed.is_empty() {
        return None;
    }

    if !trimmed
        .bytes()
        .all(|b| b.is_ascii_alphanumeric() || b == b'.' || b == b'-')
    {
        return None;
    }

    Some(trimmed.to_ascii_lowercase())
}

fn parse_pattern_rule(line: &str) -> Option<Pattern> {
    let (anchor, rest) = if let Some(rest) = line.strip_prefix("||") {
        (Anchor::HostEdge, rest)
    } else if let Some(rest) = line.strip_prefix('|') {
        (Anchor::Start, rest)
    } else {
        (Anchor::None, line)
    };

    let (rest, require_end) = match rest.strip_suffix('|') {
        Some(stripped) => (stripped, true),
        None => (rest, false),
    };

    let (rest, boundary_end) = match rest.strip_suffix('^') {
        Some(stripped) => (stripped, true),
        None => (rest, false),
    };

    let parts: Vec<String> = rest
        .split('*')
        .filter(|p| !p.is_empty())
        .map(str::to_string)
        .collect();

    let literals: usize = parts.iter().map(String::len).sum();
    if literals < MIN_PATTERN_LITERALS {
        return None;
    }

    Some(Pattern {
        parts,
        anchor,
        boundary_end,
        require_end,
    })
}
