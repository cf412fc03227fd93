//! Pure text filter defeating simple obfuscation.
//!
//! The filter normalizes input (case fold, zero-width stripping,
//! look-alike character substitution) and then tests it against a fixed
//! block list three ways:
//!
//! 1. word-boundary match on the normalized text,
//! 2. substring match on the normalized text with all separators
//!    removed (catches `n-i-g-g-e-r` and `N I G G E R`),
//! 3. substring match on the lowercased original.
//!
//! Checks 2 and 3 only run for terms of five or more characters; short
//! terms match too many innocent words without a boundary.
//!
//! The verdict never names the matched term.

use regex::Regex;

/// User-facing reason attached to every rejection.
pub const REJECTION_REASON: &str = "text contains disallowed content";

/// Result of screening one piece of text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verdict {
    /// Whether the text may be persisted.
    pub safe: bool,
    /// Generic reason when unsafe; never echoes the matched term.
    pub reason: Option<String>,
}

impl Verdict {
    /// The passing verdict.
    #[must_use]
    pub const fn safe() -> Self {
        Self {
            safe: true,
            reason: None,
        }
    }

    /// The failing verdict with the generic reason.
    #[must_use]
    pub fn rejected() -> Self {
        Self {
            safe: false,
            reason: Some(REJECTION_REASON.to_string()),
        }
    }
}

/// Terms blocked on sight in free-text fields.
const DEFAULT_BLOCKLIST: &[&str] = &[
    "nigger", "nigga", "faggot", "tranny", "beaner", "wetback", "kike", "spic", "chink", "coon",
    "retard",
];

/// Terms shorter than this are only matched at word boundaries.
const MIN_COLLAPSED_LEN: usize = 5;

struct BlockedTerm {
    term: String,
    boundary: Regex,
    check_collapsed: bool,
}

/// Block-list filter over free-text fields.
///
/// Pure: no side effects and no network calls. Applied synchronously
/// before persisting listing notes and interaction messages.
pub struct ModerationFilter {
    terms: Vec<BlockedTerm>,
}

impl std::fmt::Debug for ModerationFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Keep the term list out of Debug output and logs.
        f.debug_struct("ModerationFilter")
            .field("terms", &self.terms.len())
            .finish()
    }
}

impl ModerationFilter {
    /// Creates a filter over the built-in block list.
    #[must_use]
    pub fn new() -> Self {
        Self::with_terms(DEFAULT_BLOCKLIST)
    }

    /// Creates a filter over a custom block list.
    #[must_use]
    pub fn with_terms(terms: &[&str]) -> Self {
        let terms = terms
            .iter()
            .filter_map(|raw| {
                let term = raw.to_lowercase();
                let boundary = Regex::new(&format!(r"\b{}\b", regex::escape(&term))).ok()?;
                Some(BlockedTerm {
                    check_collapsed: term.len() >= MIN_COLLAPSED_LEN,
                    term,
                    boundary,
                })
            })
            .collect();
        Self { terms }
    }

    /// Screens one piece of text. First match short-circuits.
    #[must_use]
    pub fn review(&self, text: &str) -> Verdict {
        let normalized = normalize(text);
        let collapsed: String = normalized.chars().filter(|c| c.is_alphanumeric()).collect();
        let raw_lower = text.to_lowercase();

        for blocked in &self.terms {
            if blocked.boundary.is_match(&normalized) {
                return Verdict::rejected();
            }
            if blocked.check_collapsed
                && (collapsed.contains(&blocked.term) || raw_lower.contains(&blocked.term))
            {
                return Verdict::rejected();
            }
        }
        Verdict::safe()
    }
}

impl Default for ModerationFilter {
    fn default() -> Self {
        Self::new()
    }
}

/// Case-folds, strips zero-width characters, and maps look-alike
/// characters to canonical letters.
fn normalize(text: &str) -> String {
    text.to_lowercase()
        .chars()
        .filter(|c| !is_zero_width(*c))
        .map(substitute_lookalike)
        .collect()
}

const fn is_zero_width(c: char) -> bool {
    matches!(
        c,
        '\u{200B}' | '\u{200C}' | '\u{200D}' | '\u{2060}' | '\u{FEFF}'
    )
}

const fn substitute_lookalike(c: char) -> char {
    match c {
        '0' => 'o',
        '1' | '!' => 'i',
        '3' => 'e',
        '4' | '@' => 'a',
        '5' | '$' => 's',
        '7' | '+' => 't',
        '8' => 'b',
        '9' => 'g',
        '|' => 'l',
        other => other,
    }
}
