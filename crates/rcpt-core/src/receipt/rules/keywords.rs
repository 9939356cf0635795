//! Role keyword tables and fuzzy keyword matching.
//!
//! Keywords of four or more characters match as substrings of the line, or
//! against any word within the edit radius. Shorter keywords ("tax", "due")
//! match a whole word, or a word one edit away that carries a digit
//! (`T4X`, `6ST`): as substrings they fire inside ordinary item names, and a
//! free edit turns most three-letter words into one of them.

use serde::{Deserialize, Serialize};
use strsim::levenshtein;

use super::patterns::{MATCH_NOISE, STARRED_TOTAL};

/// Shortest keyword that matches as a substring and with the full edit radius.
pub const FUZZY_MIN_LEN: usize = 4;

/// Summary roles a receipt line can play.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Total,
    Tax,
    Subtotal,
}

/// Keywords that identify one role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleKeywordSet {
    /// Role assigned on match.
    pub role: Role,
    /// Lower-case keywords.
    pub keywords: Vec<String>,
    /// Keywords that veto the role even when a keyword matched.
    #[serde(default)]
    pub exclusions: Vec<String>,
    /// Also match a run of asterisks followed by a total keyword.
    #[serde(default)]
    pub starred: bool,
}

impl RoleKeywordSet {
    pub fn new(role: Role, keywords: &[&str]) -> Self {
        Self {
            role,
            keywords: keywords.iter().map(|k| k.to_lowercase()).collect(),
            exclusions: Vec::new(),
            starred: false,
        }
    }

    pub fn with_exclusions(mut self, exclusions: &[&str]) -> Self {
        self.exclusions = exclusions.iter().map(|k| k.to_lowercase()).collect();
        self
    }

    pub fn with_starred(mut self, starred: bool) -> Self {
        self.starred = starred;
        self
    }

    /// Whether the line plays this role.
    pub fn matches(&self, text: &MatchText, max_distance: usize) -> bool {
        if self.starred && STARRED_TOTAL.is_match(text.as_str()) {
            return true;
        }

        let hit = self
            .keywords
            .iter()
            .any(|k| keyword_matches(k, text, max_distance));

        hit && !self
            .exclusions
            .iter()
            .any(|k| keyword_matches(k, text, max_distance))
    }
}

/// Role tables in precedence order: total, tax, subtotal.
///
/// "subtotal" contains "total", so the total role excludes it.
pub fn default_role_keywords() -> Vec<RoleKeywordSet> {
    vec![
        RoleKeywordSet::new(Role::Total, &["total", "balance", "amount", "due"])
            .with_exclusions(&["subtotal", "sub total"])
            .with_starred(true),
        RoleKeywordSet::new(Role::Tax, &["tax", "hst", "gst", "pst", "vat", "sales tax"]),
        RoleKeywordSet::new(Role::Subtotal, &["subtotal", "sub total"]),
    ]
}

/// Lower-cased, de-noised form of a line used for keyword tests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchText {
    text: String,
    words: Vec<String>,
}

impl MatchText {
    pub fn new(line: &str) -> Self {
        let stripped = MATCH_NOISE.replace_all(line, " ").to_lowercase();
        let words: Vec<String> = stripped.split_whitespace().map(str::to_string).collect();
        Self {
            text: words.join(" "),
            words,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn words(&self) -> &[String] {
        &self.words
    }
}

/// Edit budget for matching `word` against `keyword`.
///
/// Long keywords take the full radius. Short keywords allow a single edit,
/// and only in words with a digit, the usual shape of a misread letter.
pub fn fuzzy_budget(keyword: &str, word: &str, max_distance: usize) -> usize {
    if keyword.chars().count() >= FUZZY_MIN_LEN {
        max_distance
    } else if word.chars().any(|c| c.is_ascii_digit()) {
        max_distance.min(1)
    } else {
        0
    }
}

fn keyword_matches(keyword: &str, text: &MatchText, max_distance: usize) -> bool {
    let exact = if keyword.chars().count() < FUZZY_MIN_LEN {
        text.words.iter().any(|w| w == keyword)
    } else {
        text.text.contains(keyword)
    };
    if exact {
        return true;
    }

    if keyword.contains(' ') {
        return false;
    }

    text.words.iter().any(|w| {
        let budget = fuzzy_budget(keyword, w, max_distance);
        budget > 0 && levenshtein(w, keyword) <= budget
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn role_of(line: &str) -> Option<Role> {
        let text = MatchText::new(line);
        default_role_keywords()
            .into_iter()
            .find(|set| set.matches(&text, 2))
            .map(|set| set.role)
    }

    #[test]
    fn test_match_text() {
        let text = MatchText::new("  Sub-Total:   $4.78 ");
        assert_eq!(text.as_str(), "sub total 4.78");
        assert_eq!(text.words().len(), 3);
    }

    #[test]
    fn test_exact_roles() {
        assert_eq!(role_of("TOTAL 5.16"), Some(Role::Total));
        assert_eq!(role_of("TAX 0.38"), Some(Role::Tax));
        assert_eq!(role_of("SUBTOTAL 4.78"), Some(Role::Subtotal));
        assert_eq!(role_of("SUB-TOTAL 4.78"), Some(Role::Subtotal));
        assert_eq!(role_of("BALANCE DUE 5.16"), Some(Role::Total));
    }

    #[test]
    fn test_fuzzy_roles() {
        assert_eq!(role_of("TOTA1 5.16"), Some(Role::Total));
        assert_eq!(role_of("T0TA1 5.16"), Some(Role::Total));
        assert_eq!(role_of("T4X 0.38"), Some(Role::Tax));
        assert_eq!(role_of("6ST 0.65"), Some(Role::Tax));
        assert_eq!(role_of("SUBT0TAL 4.78"), Some(Role::Subtotal));
        assert_eq!(role_of("BALANSE 5.16"), Some(Role::Total));
    }

    #[test]
    fn test_total_wins_over_tax() {
        assert_eq!(role_of("TOTAL TAX 0.38"), Some(Role::Total));
    }

    #[test]
    fn test_starred_total() {
        assert_eq!(role_of("***TOTAL 5.16"), Some(Role::Total));
    }

    #[test]
    fn test_short_keywords_need_whole_words() {
        assert_eq!(role_of("PRODUCE 3.99"), None);
        assert_eq!(role_of("TAXI FARE 12.00"), None);
        assert_eq!(role_of("X 9.99"), None);
        assert_eq!(role_of("HST 0.65"), Some(Role::Tax));
        assert_eq!(role_of("TEA 2.49"), None);
        assert_eq!(role_of("HOT DOG 2.99"), None);
    }

    #[test]
    fn test_item_lines_have_no_role() {
        assert_eq!(role_of("BANANAS 1.29"), None);
        assert_eq!(role_of("MILK 3.49"), None);
        assert_eq!(role_of("PAPER TOWELS 5.99"), None);
    }

    #[test]
    fn test_fuzzy_budget() {
        assert_eq!(fuzzy_budget("total", "t0ta1", 2), 2);
        assert_eq!(fuzzy_budget("amount", "amownt", 1), 1);
        assert_eq!(fuzzy_budget("tax", "t4x", 2), 1);
        assert_eq!(fuzzy_budget("tax", "tea", 2), 0);
        assert_eq!(fuzzy_budget("due", "du3", 0), 0);
    }
}
