use super::*;

fn reverted(version: i64, order: i64) -> AppliedVersionRecord {
    let mut record = AppliedVersionRecord::new(version, order);
    record.reverted_order = Some(order + 1);
    record
}

#[test]
fn test_rows_merge_manifest_and_ledger() {
    let manifest = [(2, "Orders"), (1, "Initial Migration"), (3, "Audit")];
    let records = vec![AppliedVersionRecord::new(1, 1), reverted(2, 2)];

    let rows = build_rows(&manifest, &records);
    let states: Vec<_> = rows.iter().map(|r| (r.version, r.state)).collect();
    assert_eq!(
        states,
        vec![
            (1, VersionState::Applied),
            (2, VersionState::Reverted),
            (3, VersionState::Pending),
        ]
    );
    assert!(rows[0].applied_at.is_some());
    assert!(rows[2].applied_at.is_none());
}

#[test]
fn test_ledger_only_version_is_unknown() {
    let records = vec![AppliedVersionRecord::new(9, 1)];
    let rows = build_rows(&[(1, "Initial Migration")], &records);

    assert_eq!(rows.len(), 2);
    assert_eq!(rows[1].version, 9);
    assert_eq!(rows[1].state, VersionState::Unknown);
    assert_eq!(rows[1].description, None);
}

#[test]
fn test_json_shape() {
    let rows = build_rows(&[(1, "Initial Migration")], &[]);
    let json = serde_json::to_value(&rows).unwrap();
    assert_eq!(json[0]["version"], 1);
    assert_eq!(json[0]["state"], "pending");
    assert_eq!(json[0]["description"], "Initial Migration");
    assert!(json[0]["applied_at"].is_null());
}
