//! Core type definitions shared by the compiler and the evaluator.

use crate::url::is_boundary_char;

// =============================================================================
// Verdict
// =============================================================================

/// Outcome of evaluating one URL against the active rule set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// No block rule matched, or an exception overrode one.
    Allow,
    /// A block rule matched and no exception saved it.
    Block,
}

impl Verdict {
    #[inline]
    pub fn is_block(self) -> bool {
        matches!(self, Verdict::Block)
    }
}

// =============================================================================
// Compiled Patterns
// =============================================================================

/// Anchoring mode for the first literal part of a pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Anchor {
    /// Part may occur anywhere in the URL.
    None,
    /// Part must sit at the very start of the URL (`|` prefix).
    Start,
    /// Part must begin where a host label begins (`||` prefix): at the start
    /// of the input, right after `://`, or right after a `.`.
    HostEdge,
}

/// A compiled wildcard pattern: literal parts in order, with `*` gaps between
/// them. Splitting happens once at compile time, never per lookup.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Pattern {
    /// Literal segments that must occur in order.
    pub parts: Vec<String>,
    /// Placement constraint on the first segment.
    pub anchor: Anchor,
    /// Trailing `^`: the byte after the match must be a separator or the end.
    pub boundary_end: bool,
    /// Trailing `|`: the match must end exactly at the end of the URL.
    pub require_end: bool,
}

impl Pattern {
    /// Match against a URL. Works on raw bytes so arbitrary (non-ASCII,
    /// percent-encoded) inputs can never panic the hot path.
    pub fn matches(&self, url: &str) -> bool {
        let hay = url.as_bytes();

        let mut parts = self.parts.iter();
        let first = match parts.next() {
            Some(p) => p.as_bytes(),
            None => return false,
        };

        let mut pos = match self.anchor {
            Anchor::Start => {
                if !hay.starts_with(first) {
                    return false;
                }
                first.len()
            }
            Anchor::HostEdge => {
                let mut search = 0;
                loop {
                    let found = match find_sub(hay, first, search) {
                        Some(i) => i,
                        None => return false,
                    };
                    if at_host_edge(hay, found) {
                        break found + first.len();
                    }
                    search = found + 1;
                }
            }
            Anchor::None => match find_sub(hay, first, 0) {
                Some(i) => i + first.len(),
                None => return false,
            },
        };

        for part in parts {
            pos = match find_sub(hay, part.as_bytes(), pos) {
                Some(i) => i + part.len(),
                None => return false,
            };
        }

        if self.require_end && pos != hay.len() {
            return false;
        }
        if self.boundary_end && pos < hay.len() && !is_boundary_char(hay[pos]) {
            return false;
        }
        true
    }
}

/// Naive substring search over bytes. Filter-pattern parts are short, so the
/// simple scan beats setting up anything cleverer.
#[inline]
fn find_sub(haystack: &[u8], needle: &[u8], from: usize) -> Option<usize> {
    if needle.is_empty() {
        return Some(from.min(haystack.len()));
    }
    if from + needle.len() > haystack.len() {
        return None;
    }
    haystack[from..]
        .windows(needle.len())
        .position(|w| w == needle)
        .map(|i| from + i)
}

/// True if `idx` is a position where a hostname label can begin.
#[inline]
fn at_host_edge(hay: &[u8], idx: usize) -> bool {
    if idx == 0 {
        return true;
    }
    if hay[idx - 1] == b'.' {
        return true;
    }
    hay[..idx].ends_with(b"://")
}

// =============================================================================
// Parsed Rules
// =============================================================================

/// One rule as produced by the filter-list parser, before set construction.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Rule {
    /// Matches a host and all of its subdomains.
    Domain { host: String, exception: bool },
    /// Wildcard/anchor pattern matched against the full URL.
    Pattern { pattern: Pattern, exception: bool },
}

impl Rule {
    pub fn is_exception(&self) -> bool {
        match self {
            Rule::Domain { exception, .. } => *exception,
            Rule::Pattern { exception, .. } => *exception,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pat(parts: &[&str], anchor: Anchor, boundary_end: bool) -> Pattern {
        Pattern {
            parts: parts.iter().map(|s| s.to_string()).collect(),
            anchor,
            boundary_end,
            require_end: false,
        }
    }

    #[test]
    fn test_plain_substring() {
        let p = pat(&["/banner/"], Anchor::None, false);
        assert!(p.matches("https://cdn.example.com/banner/img.png"));
        assert!(!p.matches("https://cdn.example.com/header/img.png"));
    }

    #[test]
    fn test_wildcard_parts_in_order() {
        let p = pat(&["/ads/", ".js"], Anchor::None, false);
        assert!(p.matches("https://x.com/ads/loader.js"));
        // Parts present but out of order must not match.
        assert!(!p.matches("https://x.com/loader.js/ads/"));
    }

    #[test]
    fn test_start_anchor() {
        let p = pat(&["http://tracker."], Anchor::Start, false);
        assert!(p.matches("http://tracker.example.com/x"));
        assert!(!p.matches("https://site.com/?u=http://tracker.example.com"));
    }

    #[test]
    fn test_host_edge_anchor() {
        let p = pat(&["ads.example.com/pixel"], Anchor::HostEdge, false);
        assert!(p.matches("https://ads.example.com/pixel?id=1"));
        assert!(p.matches("https://sub.ads.example.com/pixel"));
        // Host appears only in the query string: not a host edge.
        assert!(!p.matches("https://ok.com/?r=zads.example.com/pixel"));
    }

    #[test]
    fn test_boundary_end() {
        let p = pat(&["example.com/track"], Anchor::HostEdge, true);
        assert!(p.matches("https://example.com/track"));
        assert!(p.matches("https://example.com/track?x=1"));
        assert!(!p.matches("https://example.com/tracker"));
    }

    #[test]
    fn test_require_end() {
        let p = Pattern {
            parts: vec!["/collect".to_string()],
            anchor: Anchor::None,
            boundary_end: false,
            require_end: true,
        };
        assert!(p.matches("https://stats.example.com/collect"));
        assert!(!p.matches("https://stats.example.com/collect/v2"));
    }

    #[test]
    fn test_non_ascii_input_does_not_panic() {
        let p = pat(&["münchen"], Anchor::HostEdge, true);
        assert!(!p.matches("https://example.com/straße/münchení"));
    }

    #[test]
    fn test_empty_pattern_never_matches() {
        let p = pat(&[], Anchor::None, false);
        assert!(!p.matches("https://example.com/"));
    }
}
