//! Name-based inclusion rules.

use serde::{Deserialize, Serialize};

/// Keeps a contest when its lowercased name contains `phrase`, and also
/// `requires` when that is set.
///
/// Matching is case-insensitive: both the rule and the name are lowercased.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarkerRule {
    /// Series label, e.g. "atcoder beginner contest".
    pub phrase: String,
    /// Optional second marker, e.g. a division qualifier such as "div. 2".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requires: Option<String>,
}

impl MarkerRule {
    /// A rule matching a single phrase.
    pub fn phrase(phrase: impl Into<String>) -> Self {
        Self {
            phrase: phrase.into().to_lowercase(),
            requires: None,
        }
    }

    /// A rule matching a phrase conjoined with a second marker.
    pub fn phrase_with(phrase: impl Into<String>, requires: impl Into<String>) -> Self {
        Self {
            phrase: phrase.into().to_lowercase(),
            requires: Some(requires.into().to_lowercase()),
        }
    }

    /// Returns true if `name` satisfies this rule.
    pub fn matches(&self, name: &str) -> bool {
        let name = name.to_lowercase();
        name.contains(&self.phrase.to_lowercase())
            && self
                .requires
                .as_ref()
                .is_none_or(|marker| name.contains(&marker.to_lowercase()))
    }

    /// Returns true if any rule in `rules` matches `name`.
    pub fn any_match(rules: &[MarkerRule], name: &str) -> bool {
        rules.iter().any(|rule| rule.matches(name))
    }
}
