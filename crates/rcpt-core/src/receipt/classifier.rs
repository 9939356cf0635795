//! Keyword-driven line classification.

use serde::Serialize;
use tracing::trace;

use super::rules::keywords::{MatchText, Role, RoleKeywordSet, default_role_keywords};
use super::rules::prices::last_price;

/// Default minimum length of an item name.
pub const DEFAULT_MIN_ITEM_NAME_LEN: usize = 2;

/// Outcome of classifying one normalized line.
///
/// Prices are the raw matched text; canonical formatting happens when the
/// receipt is assembled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "class", rename_all = "snake_case")]
pub enum LineClass {
    Total { price: String },
    Tax { price: String },
    Subtotal { price: String },
    Item { name: String, price: String },
    Skip,
}

impl LineClass {
    /// The summary role of the line, if any.
    pub fn role(&self) -> Option<Role> {
        match self {
            LineClass::Total { .. } => Some(Role::Total),
            LineClass::Tax { .. } => Some(Role::Tax),
            LineClass::Subtotal { .. } => Some(Role::Subtotal),
            LineClass::Item { .. } | LineClass::Skip => None,
        }
    }

    /// Short label used in diagnostics.
    pub fn label(&self) -> &'static str {
        match self {
            LineClass::Total { .. } => "total",
            LineClass::Tax { .. } => "tax",
            LineClass::Subtotal { .. } => "subtotal",
            LineClass::Item { .. } => "item",
            LineClass::Skip => "skip",
        }
    }
}

/// Classifies lines as total, tax, subtotal, item, or noise.
#[derive(Debug, Clone)]
pub struct LineClassifier {
    roles: Vec<RoleKeywordSet>,
    max_edit_distance: usize,
    min_item_name_len: usize,
}

impl LineClassifier {
    /// Classifier with the default role tables.
    pub fn new() -> Self {
        Self {
            roles: default_role_keywords(),
            max_edit_distance: 2,
            min_item_name_len: DEFAULT_MIN_ITEM_NAME_LEN,
        }
    }

    /// Replace the role tables; their order is the match precedence.
    pub fn with_roles(mut self, roles: Vec<RoleKeywordSet>) -> Self {
        self.roles = roles;
        self
    }

    pub fn with_max_edit_distance(mut self, max_edit_distance: usize) -> Self {
        self.max_edit_distance = max_edit_distance;
        self
    }

    pub fn with_min_item_name_len(mut self, min_item_name_len: usize) -> Self {
        self.min_item_name_len = min_item_name_len;
        self
    }

    pub fn roles(&self) -> &[RoleKeywordSet] {
        &self.roles
    }

    /// Classify one normalized line.
    pub fn classify(&self, line: &str) -> LineClass {
        let Some(price) = last_price(line) else {
            return LineClass::Skip;
        };

        let text = MatchText::new(line);
        if let Some(role) = self.match_role(&text) {
            let price = price.source;
            return match role {
                Role::Total => LineClass::Total { price },
                Role::Tax => LineClass::Tax { price },
                Role::Subtotal => LineClass::Subtotal { price },
            };
        }

        let (start, end) = price.position;
        let residual = format!("{} {}", &line[..start], &line[end..]);
        let name = residual.split_whitespace().collect::<Vec<_>>().join(" ");

        if name.chars().count() < self.min_item_name_len {
            trace!("Dropping line with short item name: {}", line);
            return LineClass::Skip;
        }

        LineClass::Item {
            name,
            price: price.source,
        }
    }

    fn match_role(&self, text: &MatchText) -> Option<Role> {
        self.roles
            .iter()
            .find(|set| set.matches(text, self.max_edit_distance))
            .map(|set| set.role)
    }
}

impl Default for LineClassifier {
    fn default() -> Self {
        Self::new()
    }
}
