use super::super::domain::{ModerationCategories, RiskFlag};

/// One entry in the ordered category-to-flag table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RiskRule {
    /// `self_harm` or `self_harm_intent`.
    SelfHarm,
    /// `violence` or `harassment_threatening`.
    Violence,
}

impl RiskRule {
    /// Self-harm outranks violence when a message trips both.
    pub const STANDARD_ORDER: [RiskRule; 2] = [RiskRule::SelfHarm, RiskRule::Violence];

    pub fn matches(&self, categories: &ModerationCategories) -> bool {
        match self {
            RiskRule::SelfHarm => categories.self_harm || categories.self_harm_intent,
            RiskRule::Violence => categories.violence || categories.harassment_threatening,
        }
    }

    pub fn flag(&self) -> RiskFlag {
        match self {
            RiskRule::SelfHarm => RiskFlag::SelfHarm,
            RiskRule::Violence => RiskFlag::Violence,
        }
    }
}
