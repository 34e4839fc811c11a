//! Per-check outcomes and the AND-gate reduction.

use driveguard_types::CheckName;
use std::collections::BTreeMap;

/// Named boolean results handed from the pipeline to the aggregator.
///
/// A check that never ran has no entry; every accessor reports it as
/// failing.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct VerificationOutcome {
    results: BTreeMap<CheckName, bool>,
}

impl VerificationOutcome {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, name: CheckName, ok: bool) {
        self.results.insert(name, ok);
    }

    /// `Some(status)` if the check ran.
    pub fn get(&self, name: CheckName) -> Option<bool> {
        self.results.get(&name).copied()
    }

    /// Status with skipped checks counted as failures.
    pub fn passed(&self, name: CheckName) -> bool {
        self.get(name).unwrap_or(false)
    }

    pub fn liveness_ok(&self) -> bool {
        self.passed(CheckName::Liveness)
    }

    pub fn ocr_ok(&self) -> bool {
        self.passed(CheckName::Ocr)
    }

    pub fn face_ok(&self) -> bool {
        self.passed(CheckName::FaceMatch)
    }

    pub fn api_ok(&self) -> bool {
        self.passed(CheckName::LicenseApi)
    }

    pub fn alcohol_ok(&self) -> bool {
        self.passed(CheckName::Alcohol)
    }

    /// Checks that actually ran, in execution order.
    pub fn executed(&self) -> Vec<CheckName> {
        CheckName::ALL
            .into_iter()
            .filter(|n| self.results.contains_key(n))
            .collect()
    }
}

impl FromIterator<(CheckName, bool)> for VerificationOutcome {
    fn from_iter<I: IntoIterator<Item = (CheckName, bool)>>(iter: I) -> Self {
        Self {
            results: iter.into_iter().collect(),
        }
    }
}

/// Reduces an outcome to a single allow/deny verdict.
#[derive(Clone, Copy, Debug, Default)]
pub struct DecisionAggregator;

impl DecisionAggregator {
    /// `true` only if every check in [`CheckName::ALL`] ran and passed.
    pub fn reduce(&self, outcome: &VerificationOutcome) -> bool {
        CheckName::ALL.into_iter().all(|name| outcome.passed(name))
    }

    /// Checks holding the verdict back, failed or skipped.
    pub fn failing(&self, outcome: &VerificationOutcome) -> Vec<CheckName> {
        CheckName::ALL
            .into_iter()
            .filter(|&name| !outcome.passed(name))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn all_passing() -> VerificationOutcome {
        CheckName::ALL.into_iter().map(|n| (n, true)).collect()
    }

    #[test]
    fn all_passing_allows() {
        assert!(DecisionAggregator.reduce(&all_passing()));
        assert!(DecisionAggregator.failing(&all_passing()).is_empty());
    }

    #[test]
    fn single_failure_blocks() {
        for name in CheckName::ALL {
            let mut outcome = all_passing();
            outcome.set(name, false);
            assert!(!DecisionAggregator.reduce(&outcome), "{name} failing must block");
            assert_eq!(DecisionAggregator.failing(&outcome), vec![name]);
        }
    }

    #[test]
    fn skipped_check_counts_as_failure() {
        let outcome: VerificationOutcome = [
            (CheckName::Liveness, true),
            (CheckName::Ocr, true),
            (CheckName::FaceMatch, true),
            (CheckName::Alcohol, true),
        ]
        .into_iter()
        .collect();
        assert!(!outcome.api_ok());
        assert_eq!(outcome.get(CheckName::LicenseApi), None);
        assert!(!DecisionAggregator.reduce(&outcome));
        assert_eq!(DecisionAggregator.failing(&outcome), vec![CheckName::LicenseApi]);
    }

    #[test]
    fn empty_outcome_blocks() {
        let outcome = VerificationOutcome::new();
        assert!(!DecisionAggregator.reduce(&outcome));
        assert_eq!(DecisionAggregator.failing(&outcome).len(), CheckName::ALL.len());
        assert!(outcome.executed().is_empty());
    }

    #[test]
    fn executed_is_in_pipeline_order() {
        let outcome: VerificationOutcome = [(CheckName::Alcohol, true), (CheckName::Liveness, false)]
            .into_iter()
            .collect();
        assert_eq!(outcome.executed(), vec![CheckName::Liveness, CheckName::Alcohol]);
    }
}
