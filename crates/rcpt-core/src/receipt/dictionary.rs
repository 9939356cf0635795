//! Frequency-weighted vocabulary for token correction.

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::DictionaryError;

/// A known word and its tie-breaking weight.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DictionaryEntry {
    pub word: String,
    pub frequency: u32,
}

impl DictionaryEntry {
    pub fn new(word: impl Into<String>, frequency: u32) -> Self {
        Self {
            word: word.into(),
            frequency,
        }
    }
}

/// Immutable vocabulary, unique by word, in enumeration order.
#[derive(Debug, Clone)]
pub struct Dictionary {
    entries: Vec<DictionaryEntry>,
    index: HashMap<String, usize>,
}

/// Merchants, grocery words, units and summary words seen on North
/// American receipts.
const BUILTIN_VOCABULARY: &[(&str, u32)] = &[
    // Summary lines
    ("total", 100),
    ("subtotal", 90),
    ("tax", 90),
    ("balance", 70),
    ("amount", 70),
    ("due", 60),
    // Merchants
    ("walmart", 95),
    ("target", 90),
    ("costco", 85),
    ("kroger", 80),
    ("safeway", 80),
    ("walgreens", 70),
    ("publix", 65),
    ("albertsons", 55),
    ("aldi", 60),
    ("wegmans", 45),
    ("trader", 50),
    ("joes", 50),
    ("whole", 60),
    ("foods", 60),
    ("market", 55),
    ("grocery", 50),
    ("pharmacy", 40),
    ("supercenter", 45),
    // Produce
    ("bananas", 70),
    ("banana", 60),
    ("apples", 60),
    ("apple", 55),
    ("oranges", 45),
    ("lemons", 35),
    ("limes", 30),
    ("grapes", 40),
    ("berries", 35),
    ("strawberries", 40),
    ("blueberries", 35),
    ("avocado", 40),
    ("tomatoes", 45),
    ("potatoes", 45),
    ("onions", 45),
    ("garlic", 35),
    ("lettuce", 40),
    ("spinach", 35),
    ("carrots", 40),
    ("celery", 30),
    ("broccoli", 35),
    ("peppers", 30),
    ("cucumber", 30),
    ("organic", 50),
    ("produce", 40),
    // Dairy and bakery
    ("milk", 80),
    ("butter", 55),
    ("cheese", 60),
    ("cheddar", 35),
    ("yogurt", 50),
    ("cream", 45),
    ("eggs", 70),
    ("large", 45),
    ("bread", 70),
    ("wheat", 35),
    ("bagels", 30),
    ("tortillas", 30),
    // Pantry
    ("rice", 50),
    ("pasta", 45),
    ("sauce", 40),
    ("cereal", 45),
    ("oats", 30),
    ("flour", 30),
    ("sugar", 35),
    ("coffee", 55),
    ("tea", 30),
    ("juice", 50),
    ("water", 55),
    ("soda", 40),
    ("chips", 45),
    ("cookies", 35),
    ("crackers", 30),
    ("peanut", 30),
    ("soup", 35),
    ("beans", 35),
    ("honey", 25),
    ("salt", 25),
    ("olive", 25),
    ("oil", 30),
    // Meat and frozen
    ("chicken", 60),
    ("breast", 35),
    ("beef", 50),
    ("ground", 40),
    ("pork", 35),
    ("bacon", 40),
    ("turkey", 35),
    ("salmon", 30),
    ("shrimp", 25),
    ("frozen", 35),
    ("pizza", 40),
    ("ice", 30),
    // Household
    ("paper", 40),
    ("towels", 35),
    ("tissue", 30),
    ("toilet", 30),
    ("soap", 35),
    ("detergent", 30),
    ("shampoo", 25),
    ("toothpaste", 25),
    ("tote", 20),
    ("bag", 30),
    ("bags", 30),
    // Units and receipt vocabulary
    ("each", 45),
    ("pack", 35),
    ("dozen", 30),
    ("gallon", 35),
    ("ounce", 25),
    ("pound", 30),
    ("lbs", 30),
    ("qty", 30),
    ("price", 35),
    ("savings", 40),
    ("coupon", 35),
    ("discount", 35),
    ("member", 30),
    ("rewards", 30),
    ("cash", 50),
    ("change", 45),
    ("credit", 45),
    ("debit", 40),
    ("card", 45),
    ("visa", 35),
    ("mastercard", 25),
    ("store", 40),
    ("thank", 45),
    ("you", 45),
    ("items", 40),
    ("sold", 30),
];

impl Dictionary {
    /// Build from entries, keeping the first occurrence of each word.
    ///
    /// Words are lower-cased and reduced to letters and digits, the same
    /// form the corrector compares against.
    pub fn from_entries<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = DictionaryEntry>,
    {
        let mut dictionary = Self {
            entries: Vec::new(),
            index: HashMap::new(),
        };

        for entry in entries {
            dictionary.insert(entry);
        }

        dictionary
    }

    /// The built-in receipt vocabulary.
    pub fn builtin() -> Self {
        Self::from_entries(
            BUILTIN_VOCABULARY
                .iter()
                .map(|(word, frequency)| DictionaryEntry::new(*word, *frequency)),
        )
    }

    /// Parse a vocabulary file: `word [frequency]` per line, `#` comments.
    pub fn parse(text: &str) -> Result<Self, DictionaryError> {
        let mut entries = Vec::new();

        for (number, line) in text.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let mut parts = line.split_whitespace();
            let word = parts.next().unwrap_or_default();
            let frequency = match parts.next() {
                Some(value) => value.parse::<u32>().map_err(|_| DictionaryError::Parse {
                    line: number + 1,
                    reason: format!("invalid frequency '{}'", value),
                })?,
                None => 1,
            };

            if parts.next().is_some() {
                return Err(DictionaryError::Parse {
                    line: number + 1,
                    reason: "expected 'word [frequency]'".to_string(),
                });
            }

            entries.push(DictionaryEntry::new(word, frequency));
        }

        let listed = entries.len();
        let dictionary = Self::from_entries(entries);
        if dictionary.len() < listed {
            warn!(
                "Skipped {} duplicate or empty dictionary entries",
                listed - dictionary.len()
            );
        }
        if dictionary.is_empty() {
            return Err(DictionaryError::Empty);
        }

        Ok(dictionary)
    }

    /// Load a vocabulary file from disk.
    pub fn from_file(path: &Path) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let dictionary = Self::parse(&content)?;
        debug!(
            "Loaded {} dictionary words from {}",
            dictionary.len(),
            path.display()
        );
        Ok(dictionary)
    }

    /// Append words with frequency 1; known words are left as they are.
    pub fn with_words<I, S>(mut self, words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for word in words {
            self.insert(DictionaryEntry::new(word.as_ref(), 1));
        }
        self
    }

    /// Exact lookup of an already cleaned word.
    pub fn get(&self, word: &str) -> Option<&DictionaryEntry> {
        self.index.get(word).map(|&i| &self.entries[i])
    }

    /// Entries in enumeration order.
    pub fn entries(&self) -> &[DictionaryEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn insert(&mut self, entry: DictionaryEntry) {
        let word = clean_word(&entry.word);
        if word.is_empty() {
            warn!("Skipping dictionary entry without letters: {:?}", entry.word);
            return;
        }

        if self.index.contains_key(&word) {
            debug!("Skipping duplicate dictionary word: {}", word);
            return;
        }

        self.index.insert(word.clone(), self.entries.len());
        self.entries.push(DictionaryEntry::new(word, entry.frequency));
    }
}

impl Default for Dictionary {
    fn default() -> Self {
        Self::builtin()
    }
}

/// Lower-case a token and keep only letters and digits.
pub fn clean_word(token: &str) -> String {
    token
        .chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}
