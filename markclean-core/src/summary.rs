//! Reporting types describing what a cleanup run changed.

use serde::{Deserialize, Serialize};

use crate::sanitizers::compiler::CompiledRule;

/// Number of elements a single rename rule touched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleSummaryItem {
    /// Position of the rule in the profile's rule list.
    pub index: usize,
    pub rule: String,
    pub occurrences: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CleanupSummary {
    pub elements_visited: usize,
    pub attributes_removed: usize,
    pub class_tokens_removed: usize,
    pub class_attributes_removed: usize,
    pub indentation_runs_removed: usize,
    pub renames: Vec<RuleSummaryItem>,
}

impl CleanupSummary {
    pub fn record_rule(&mut self, rule: &CompiledRule, occurrences: usize) {
        self.renames.push(RuleSummaryItem {
            index: rule.index,
            rule: rule.label(),
            occurrences,
        });
    }

    pub fn total_renames(&self) -> usize {
        self.renames.iter().map(|r| r.occurrences).sum()
    }

    /// True when the run left the tree untouched.
    pub fn is_noop(&self) -> bool {
        self.attributes_removed == 0
            && self.class_tokens_removed == 0
            && self.class_attributes_removed == 0
            && self.indentation_runs_removed == 0
            && self.total_renames() == 0
    }
}
