//! Dictionary-based token correction.

use std::sync::Arc;

use strsim::levenshtein;

use super::dictionary::{Dictionary, DictionaryEntry, clean_word};

/// Default correction radius.
pub const DEFAULT_MAX_DISTANCE: usize = 2;

/// Snaps a misread token to the nearest known word within a small radius.
#[derive(Debug, Clone)]
pub struct TokenCorrector {
    dictionary: Arc<Dictionary>,
    max_distance: usize,
}

impl TokenCorrector {
    pub fn new(dictionary: Arc<Dictionary>) -> Self {
        Self {
            dictionary,
            max_distance: DEFAULT_MAX_DISTANCE,
        }
    }

    /// Set the largest accepted edit distance.
    pub fn with_max_distance(mut self, max_distance: usize) -> Self {
        self.max_distance = max_distance;
        self
    }

    pub fn dictionary(&self) -> &Arc<Dictionary> {
        &self.dictionary
    }

    /// Correct a single token.
    ///
    /// Tokens of one character, and tokens with no dictionary word within
    /// the radius, come back unchanged. A corrected word takes the casing
    /// style of the input (`MLIK` → `MILK`, `Mlik` → `Milk`).
    pub fn correct_token(&self, token: &str) -> String {
        if token.chars().count() <= 1 {
            return token.to_string();
        }

        let cleaned = clean_word(token);
        if cleaned.is_empty() {
            return token.to_string();
        }

        match self.best_match(&cleaned) {
            Some((entry, _)) => match_case(token, &entry.word),
            None => token.to_string(),
        }
    }

    /// Nearest entry for a cleaned word with its distance.
    ///
    /// Ties go to the higher frequency, then to the earlier entry.
    pub fn best_match(&self, cleaned: &str) -> Option<(&DictionaryEntry, usize)> {
        if let Some(entry) = self.dictionary.get(cleaned) {
            return Some((entry, 0));
        }

        let len = cleaned.chars().count();
        let mut best: Option<(&DictionaryEntry, usize)> = None;

        for entry in self.dictionary.entries() {
            if entry.word.chars().count().abs_diff(len) > self.max_distance {
                continue;
            }

            let distance = levenshtein(cleaned, &entry.word);
            if distance > self.max_distance {
                continue;
            }

            let better = match best {
                None => true,
                Some((current, current_distance)) => {
                    distance < current_distance
                        || (distance == current_distance && entry.frequency > current.frequency)
                }
            };

            if better {
                best = Some((entry, distance));
            }
        }

        best
    }
}

/// Re-case `word` after the letters of `template`.
fn match_case(template: &str, word: &str) -> String {
    let letters: Vec<char> = template.chars().filter(|c| c.is_alphabetic()).collect();

    if letters.len() > 1 && letters.iter().all(|c| c.is_uppercase()) {
        return word.to_uppercase();
    }

    let title = letters.first().is_some_and(|c| c.is_uppercase())
        && letters.iter().skip(1).all(|c| c.is_lowercase());
    if title {
        let mut chars = word.chars();
        return match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        };
    }

    word.to_string()
}
