mod rules;

pub use rules::RiskRule;

use super::domain::{ModerationResult, RiskFlag};

/// Maps a moderation verdict to at most one risk flag, first matching rule wins.
#[derive(Debug, Clone)]
pub struct RiskClassifier {
    rules: Vec<RiskRule>,
}

impl RiskClassifier {
    pub fn standard() -> Self {
        Self::with_rules(RiskRule::STANDARD_ORDER.to_vec())
    }

    pub fn with_rules(rules: Vec<RiskRule>) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &[RiskRule] {
        &self.rules
    }

    pub fn classify(&self, result: &ModerationResult) -> Option<RiskFlag> {
        // The provider's own verdict gates every category check.
        if !result.flagged {
            return None;
        }

        self.rules
            .iter()
            .find(|rule| rule.matches(&result.categories))
            .map(RiskRule::flag)
    }
}

impl Default for RiskClassifier {
    fn default() -> Self {
        Self::standard()
    }
}
