use serde::{Deserialize, Serialize};

use super::domain::{IntakeField, IntakeFieldSet};

/// Weight of each answered field toward intake completeness.
pub const FIELD_WEIGHTS: [(IntakeField, u32); 7] = [
    (IntakeField::Symptoms, 3),
    (IntakeField::Duration, 2),
    (IntakeField::Triggers, 2),
    (IntakeField::Intensity, 1),
    (IntakeField::Frequency, 1),
    (IntakeField::ImpactOnLife, 2),
    (IntakeField::CopingMechanisms, 1),
];

pub const MAX_INTAKE_SCORE: u32 = 12;

/// Half of [`MAX_INTAKE_SCORE`].
pub const ENOUGH_DATA_THRESHOLD: u32 = 6;

impl IntakeField {
    pub fn weight(self) -> u32 {
        FIELD_WEIGHTS
            .iter()
            .find(|(field, _)| *field == self)
            .map(|(_, weight)| *weight)
            .unwrap_or(0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntakeScore {
    pub score: u32,
    pub enough_data: bool,
}

/// Stateless weighted-sum scorer over the fixed weight table.
#[derive(Debug, Clone, Copy, Default)]
pub struct IntakeScorer;

impl IntakeScorer {
    pub fn score(&self, fields: &IntakeFieldSet) -> IntakeScore {
        let score = FIELD_WEIGHTS
            .iter()
            .filter(|(field, _)| fields.is_answered(*field))
            .map(|(_, weight)| *weight)
            .sum();

        IntakeScore {
            score,
            enough_data: score >= ENOUGH_DATA_THRESHOLD,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn weights_sum_to_the_maximum_score() {
        let total: u32 = FIELD_WEIGHTS.iter().map(|(_, weight)| weight).sum();
        assert_eq!(total, MAX_INTAKE_SCORE);
        assert_eq!(ENOUGH_DATA_THRESHOLD * 2, MAX_INTAKE_SCORE);
    }

    #[test]
    fn every_field_has_a_positive_weight() {
        for field in IntakeField::ALL {
            assert!(field.weight() > 0, "{field} must carry weight");
        }
        assert_eq!(IntakeField::Symptoms.weight(), 3);
        assert_eq!(IntakeField::ImpactOnLife.weight(), 2);
        assert_eq!(IntakeField::CopingMechanisms.weight(), 1);
    }
}
