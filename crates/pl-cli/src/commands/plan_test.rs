use super::*;
use pl_core::{ColumnSpec, MigrationDescriptor, TableSpec};

fn migration(version: i64, table: &str, type_name: &str) -> ManifestMigration {
    ManifestMigration::new(MigrationDescriptor::new(
        version,
        format!("create {table}"),
        vec![TableSpec::new(
            table,
            vec![
                ColumnSpec::new("Id", "Int64").primary_key(),
                ColumnSpec::new("Payload", type_name).nullable(),
            ],
        )],
    ))
}

#[test]
fn test_apply_plan_is_ascending() {
    let second = migration(2, "Orders", "Text");
    let first = migration(1, "Widgets", "Text");
    let planned = plan(vec![&second, &first], Direction::Apply);

    let versions: Vec<_> = planned.iter().map(|p| p.version).collect();
    assert_eq!(versions, vec![1, 2]);
    let ops = planned[0].operations.as_ref().unwrap();
    assert_eq!(ops.len(), 2);
    assert_eq!(ops[0].kind(), "CreateTable");
    assert_eq!(ops[1].kind(), "AddColumn");
}

#[test]
fn test_revert_plan_is_descending() {
    let first = migration(1, "Widgets", "Text");
    let second = migration(2, "Orders", "Text");
    let planned = plan(vec![&first, &second], Direction::Revert);

    let versions: Vec<_> = planned.iter().map(|p| p.version).collect();
    assert_eq!(versions, vec![2, 1]);
    let ops = planned[0].operations.as_ref().unwrap();
    assert_eq!(ops.len(), 1);
    assert_eq!(ops[0].kind(), "DropTable");
}

#[test]
fn test_build_error_is_reported_not_raised() {
    let bad = migration(3, "Files", "Blob");
    let planned = plan(vec![&bad], Direction::Apply);

    assert!(planned[0].operations.is_none());
    assert!(planned[0].error.as_deref().unwrap().contains("Blob"));
}
