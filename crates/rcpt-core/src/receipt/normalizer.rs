//! Line cleanup ahead of classification.

use super::corrector::TokenCorrector;
use super::rules::patterns::NUMERIC_TOKEN;

/// Turns raw OCR lines into trimmed, whitespace-collapsed, corrected lines.
#[derive(Debug, Clone)]
pub struct LineNormalizer {
    corrector: TokenCorrector,
    correct_tokens: bool,
}

impl LineNormalizer {
    pub fn new(corrector: TokenCorrector) -> Self {
        Self {
            corrector,
            correct_tokens: true,
        }
    }

    /// Enable or disable dictionary correction.
    pub fn with_correction(mut self, enabled: bool) -> Self {
        self.correct_tokens = enabled;
        self
    }

    pub fn corrector(&self) -> &TokenCorrector {
        &self.corrector
    }

    pub fn correction_enabled(&self) -> bool {
        self.correct_tokens
    }

    /// Split OCR text into normalized lines, dropping blank ones.
    pub fn normalize_text(&self, text: &str) -> Vec<String> {
        text.lines()
            .filter(|line| !line.trim().is_empty())
            .map(|line| self.normalize(line))
            .filter(|line| !line.is_empty())
            .collect()
    }

    /// Normalize a single line.
    pub fn normalize(&self, raw: &str) -> String {
        let visible = strip_invisible(raw);

        visible
            .split_whitespace()
            .map(|token| self.normalize_token(token))
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn normalize_token(&self, token: &str) -> String {
        if !self.correct_tokens || NUMERIC_TOKEN.is_match(token) || token.chars().count() <= 2 {
            return token.to_string();
        }

        // Surrounding punctuation ("TOTAL:", "***TOTAL") is kept around the
        // corrected core.
        let Some(start) = token.find(char::is_alphanumeric) else {
            return token.to_string();
        };
        let end = token
            .char_indices()
            .rev()
            .find(|(_, c)| c.is_alphanumeric())
            .map(|(i, c)| i + c.len_utf8())
            .unwrap_or(token.len());

        let core = &token[start..end];
        format!(
            "{}{}{}",
            &token[..start],
            self.corrector.correct_token(core),
            &token[end..]
        )
    }
}

/// Replace whitespace-like controls with spaces and drop invisible characters.
fn strip_invisible(line: &str) -> String {
    line.chars()
        .filter_map(|c| {
            if c.is_whitespace() {
                Some(' ')
            } else if c.is_control() || is_zero_width(c) {
                None
            } else {
                Some(c)
            }
        })
        .collect()
}

fn is_zero_width(c: char) -> bool {
    matches!(
        c,
        '\u{00ad}' | '\u{200b}'..='\u{200f}' | '\u{2060}'..='\u{2064}' | '\u{feff}'
    )
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::receipt::dictionary::Dictionary;

    fn normalizer() -> LineNormalizer {
        LineNormalizer::new(TokenCorrector::new(Arc::new(Dictionary::builtin())))
    }

    #[test]
    fn test_collapses_whitespace() {
        assert_eq!(normalizer().normalize("  MILK \t  3.49  "), "MILK 3.49");
    }

    #[test]
    fn test_strips_invisible_characters() {
        assert_eq!(normalizer().normalize("BRE\u{200b}AD\u{0007} 2.99"), "BREAD 2.99");
    }

    #[test]
    fn test_corrects_words_and_keeps_punctuation() {
        assert_eq!(normalizer().normalize("CHEEZE, 4.50"), "CHEESE, 4.50");
        assert_eq!(normalizer().normalize("(Mlik)"), "(Milk)");
    }

    #[test]
    fn test_numeric_and_short_tokens_pass_through() {
        let normalizer = normalizer();
        assert_eq!(normalizer.normalize("$12.99 2 @ 1.50"), "$12.99 2 @ 1.50");
        assert_eq!(normalizer.normalize("01/15/2024 14:22"), "01/15/2024 14:22");
        assert_eq!(normalizer.normalize("3.49A"), "3.49A");
        assert_eq!(normalizer.normalize("LB EA"), "LB EA");
    }

    #[test]
    fn test_corrects_digits_misread_for_letters() {
        let normalizer = normalizer();
        assert_eq!(normalizer.normalize("TOTA1 5.16"), "TOTAL 5.16");
        assert_eq!(normalizer.normalize("T0TA1: 5.16"), "TOTAL: 5.16");
        assert_eq!(normalizer.normalize("T4X 0.38"), "TAX 0.38");
        assert_eq!(normalizer.normalize("M1LK 3.49"), "MILK 3.49");
    }

    #[test]
    fn test_starred_marker_survives() {
        assert_eq!(normalizer().normalize("***TOTAL 5.16"), "***TOTAL 5.16");
    }

    #[test]
    fn test_correction_can_be_disabled() {
        let normalizer = normalizer().with_correction(false);
        assert_eq!(normalizer.normalize("  MLIK   3.49"), "MLIK 3.49");
    }

    #[test]
    fn test_normalize_text_drops_blank_lines() {
        let lines = normalizer().normalize_text("SAFEWAY\n\n   \n\u{200b}\r\nMILK 3.49\r\n");
        assert_eq!(lines, vec!["SAFEWAY".to_string(), "MILK 3.49".to_string()]);
    }
}
