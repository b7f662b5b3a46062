//! Device name matching.

/// Name fragment that identifies headphone endpoints.
pub const DEFAULT_MATCH_FRAGMENT: &str = "headphones";

/// Case-insensitive substring predicate over an endpoint's friendly name.
///
/// Only case folding is applied: no trimming, no locale-aware comparison.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchRule {
    fragment: String,
}

impl MatchRule {
    pub fn new(fragment: impl AsRef<str>) -> Self {
        Self {
            fragment: fragment.as_ref().to_lowercase(),
        }
    }

    pub fn fragment(&self) -> &str {
        &self.fragment
    }

    pub fn matches(&self, friendly_name: &str) -> bool {
        friendly_name.to_lowercase().contains(&self.fragment)
    }
}

impl Default for MatchRule {
    fn default() -> Self {
        Self::new(DEFAULT_MATCH_FRAGMENT)
    }
}
