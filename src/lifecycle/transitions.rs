//! Declared stage transitions

use std::collections::HashSet;

use crate::{
    error::{AppError, AppResult},
    models::Stage,
};

/// Every stage may currently move to every stage, including itself.
/// Restricting a transition means removing it from this table.
const DEFAULT_RULES: &[(Stage, &[Stage])] = &[
    (Stage::New, &[Stage::New, Stage::InProgress, Stage::Repaired, Stage::Scrap]),
    (Stage::InProgress, &[Stage::New, Stage::InProgress, Stage::Repaired, Stage::Scrap]),
    (Stage::Repaired, &[Stage::New, Stage::InProgress, Stage::Repaired, Stage::Scrap]),
    (Stage::Scrap, &[Stage::New, Stage::InProgress, Stage::Repaired, Stage::Scrap]),
];

/// Set of legal `(from, to)` stage pairs
#[derive(Debug, Clone)]
pub struct TransitionTable {
    allowed: HashSet<(Stage, Stage)>,
}

impl TransitionTable {
    pub fn new(rules: &[(Stage, &[Stage])]) -> Self {
        let allowed = rules
            .iter()
            .flat_map(|(from, targets)| targets.iter().map(move |to| (*from, *to)))
            .collect();
        Self { allowed }
    }

    pub fn allows(&self, from: Stage, to: Stage) -> bool {
        self.allowed.contains(&(from, to))
    }

    pub fn check(&self, from: Stage, to: Stage) -> AppResult<()> {
        if self.allows(from, to) {
            Ok(())
        } else {
            Err(AppError::BusinessRule(format!(
                "Transition from {} to {} is not allowed",
                from, to
            )))
        }
    }
}

impl Default for TransitionTable {
    fn default() -> Self {
        Self::new(DEFAULT_RULES)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_table_is_permissive() {
        let table = TransitionTable::default();
        for from in Stage::ALL {
            for to in Stage::ALL {
                assert!(table.allows(*from, *to), "{from} -> {to}");
            }
        }
        // repaired back to new is accepted today
        assert!(table.check(Stage::Repaired, Stage::New).is_ok());
    }

    #[test]
    fn test_restricted_table_rejects() {
        let table = TransitionTable::new(&[(Stage::New, &[Stage::InProgress])]);
        assert!(table.allows(Stage::New, Stage::InProgress));
        assert!(!table.allows(Stage::InProgress, Stage::New));
        assert!(matches!(
            table.check(Stage::Scrap, Stage::New),
            Err(AppError::BusinessRule(_))
        ));
    }
}
