use proptest::prelude::*;

use driveguard_store::{read_record, SessionRecord, RECORD_FILE_NAME};
use driveguard_types::{CheckName, CheckResult, Timestamp};

fn details() -> impl Strategy<Value = Option<serde_json::Value>> {
    prop_oneof![
        Just(None),
        Just(Some(serde_json::Value::Null)),
        (0u16..1024).prop_map(|v| Some(serde_json::json!({ "raw_value": v, "detected": v >= 450 }))),
        "[a-z ]{0,16}".prop_map(|s| Some(serde_json::json!({ "error": s }))),
    ]
}

fn check_result() -> impl Strategy<Value = CheckResult> {
    (
        prop::sample::select(CheckName::ALL.to_vec()),
        any::<bool>(),
        details(),
        0i64..4_000_000_000,
    )
        .prop_map(|(name, status, details, secs)| {
            CheckResult::new(name, status, details, Timestamp::from_secs(secs))
        })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// A record written to disk reads back with the same ordered checks and decision.
    #[test]
    fn record_disk_roundtrip(
        checks in prop::collection::vec(check_result(), 0..6),
        decision in proptest::option::of(any::<bool>()),
        started in 0i64..4_000_000_000,
    ) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(RECORD_FILE_NAME);
        let record = SessionRecord {
            session_id: "session_prop".into(),
            started_at: Timestamp::from_secs(started),
            checks,
            final_decision: decision,
        };
        record.write_atomic(&path).unwrap();
        prop_assert_eq!(read_record(&path).unwrap(), record);
    }
}
