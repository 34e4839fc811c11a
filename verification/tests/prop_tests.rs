use proptest::prelude::*;

use driveguard_types::CheckName;
use driveguard_verification::{DecisionAggregator, VerificationOutcome};

/// Each check is either skipped (`None`) or ran with a status.
fn outcome() -> impl Strategy<Value = Vec<Option<bool>>> {
    prop::collection::vec(proptest::option::of(any::<bool>()), CheckName::ALL.len())
}

proptest! {
    /// The verdict is true iff every check ran and passed.
    #[test]
    fn verdict_is_and_over_full_check_set(statuses in outcome()) {
        let outcome: VerificationOutcome = CheckName::ALL
            .into_iter()
            .zip(statuses.iter())
            .filter_map(|(name, s)| s.map(|ok| (name, ok)))
            .collect();

        let expected = statuses.iter().all(|s| *s == Some(true));
        prop_assert_eq!(DecisionAggregator.reduce(&outcome), expected);
    }

    /// Any false or skipped check forces a false verdict and is reported as failing.
    #[test]
    fn any_failing_check_blocks(statuses in outcome(), idx in 0usize..5, skip in any::<bool>()) {
        let mut statuses = statuses;
        statuses[idx] = if skip { None } else { Some(false) };
        let outcome: VerificationOutcome = CheckName::ALL
            .into_iter()
            .zip(statuses.iter())
            .filter_map(|(name, s)| s.map(|ok| (name, ok)))
            .collect();

        prop_assert!(!DecisionAggregator.reduce(&outcome));
        prop_assert!(DecisionAggregator.failing(&outcome).contains(&CheckName::ALL[idx]));
    }
}
