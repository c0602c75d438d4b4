//! End-to-end runs against a file-backed DuckDB database.

use pl_core::{
    ColumnSpec, LedgerConfig, Manifest, ManifestMigration, RevertPolicy, TableOrdering,
};
use pl_db::DuckDbExecutor;
use pl_meta::{DuckDbLedgerStore, VersionLedger};
use pl_runner::{MigrationRunner, SkipReason};
use std::sync::Arc;
use tempfile::TempDir;

const MANIFEST: &str = r#"{
  "migrations": [
    {
      "version": 1,
      "description": "Initial Migration",
      "tables": [
        {
          "name": "Widgets",
          "columns": [
            { "name": "Id", "type": "Int64", "isPrimaryKey": true, "isIdentity": true },
            { "name": "Name", "type": "Text", "isNullable": true }
          ]
        }
      ]
    },
    {
      "version": 2,
      "description": "Orders",
      "tables": [
        {
          "name": "OrderLines",
          "columns": [
            { "name": "OrderId", "type": "Int32", "references": { "table": "Orders", "column": "Id" } }
          ]
        },
        {
          "name": "Orders",
          "columns": [
            { "name": "Id", "type": "Int32", "isPrimaryKey": true },
            { "name": "PlacedAt", "type": "DateTime", "isNullable": true }
          ]
        }
      ]
    }
  ]
}"#;

struct Target {
    executor: Arc<DuckDbExecutor>,
    ledger: Arc<VersionLedger>,
}

fn open(path: &str) -> Target {
    let executor = DuckDbExecutor::new(path).unwrap();
    let conn = executor.try_clone_connection().unwrap();
    let store = DuckDbLedgerStore::from_connection(conn, &LedgerConfig::default()).unwrap();
    Target {
        executor: Arc::new(executor),
        ledger: Arc::new(VersionLedger::new(store)),
    }
}

fn migrations(ordering: TableOrdering) -> Vec<ManifestMigration> {
    Manifest::from_json_str(MANIFEST)
        .unwrap()
        .migrations
        .into_iter()
        .map(|d| ManifestMigration::with_ordering(d, ordering))
        .collect()
}

#[test]
fn test_apply_revert_and_reopen() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("inventory.duckdb");
    let path = path.to_str().unwrap();
    let batch = migrations(TableOrdering::Dependency);

    {
        let target = open(path);
        let runner = MigrationRunner::new(target.executor.clone(), Arc::clone(&target.ledger));
        let outcomes = runner.run_pending(&batch).unwrap();
        assert!(outcomes.iter().all(|o| o.is_committed()));

        assert!(target.executor.relation_exists("Widgets").unwrap());
        assert_eq!(
            target.executor.column_names("OrderLines").unwrap(),
            vec!["OrderId"]
        );
    }

    {
        let target = open(path);
        assert!(target.ledger.has_applied(1).unwrap());
        assert!(target.ledger.has_applied(2).unwrap());

        let runner = MigrationRunner::new(target.executor.clone(), Arc::clone(&target.ledger))
            .with_revert_policy(RevertPolicy::Release);
        assert_eq!(
            runner.apply(&batch[0]).skip_reason(),
            Some(SkipReason::AlreadyApplied)
        );

        let reverted = runner.revert(&batch[1]);
        assert!(reverted.is_committed(), "{:?}", reverted.status);
        assert!(!target.executor.relation_exists("Orders").unwrap());
        assert!(!target.executor.relation_exists("OrderLines").unwrap());
        assert!(target.executor.relation_exists("Widgets").unwrap());
    }

    let target = open(path);
    assert!(target.ledger.has_applied(1).unwrap());
    assert!(!target.ledger.has_applied(2).unwrap());
    assert_eq!(target.ledger.latest_applied().unwrap(), Some(1));
}

#[test]
fn test_declared_order_with_forward_reference_fails_without_recording() {
    let target = open(":memory:");
    let runner = MigrationRunner::new(target.executor.clone(), Arc::clone(&target.ledger));
    let batch = migrations(TableOrdering::Declared);

    let outcomes = runner.run_pending(&batch).unwrap();
    assert!(outcomes[0].is_committed());
    // OrderLines references Orders, which does not exist yet in declared order
    assert!(outcomes[1].is_failed());
    assert_eq!(outcomes[1].executed, 0);
    assert!(!target.ledger.has_applied(2).unwrap());
}

#[test]
fn test_identity_column_generates_values() {
    let target = open(":memory:");
    let runner = MigrationRunner::new(target.executor.clone(), Arc::clone(&target.ledger));
    let batch = migrations(TableOrdering::Declared);
    assert!(runner.apply(&batch[0]).is_committed());

    target
        .executor
        .execute_batch("INSERT INTO \"Widgets\" (\"Name\") VALUES ('a'), ('b'), (NULL)")
        .unwrap();
    assert_eq!(
        target
            .executor
            .query_count("SELECT DISTINCT \"Id\" FROM \"Widgets\"")
            .unwrap(),
        3
    );
}

#[test]
fn test_unsupported_type_never_touches_database() {
    let target = open(":memory:");
    let runner = MigrationRunner::new(target.executor.clone(), Arc::clone(&target.ledger));
    let bad = ManifestMigration::new(pl_core::MigrationDescriptor::new(
        7,
        "blob",
        vec![pl_core::TableSpec::new(
            "Files",
            vec![ColumnSpec::new("Data", "Blob")],
        )],
    ));

    let outcome = runner.apply(&bad);
    assert!(outcome.is_failed());
    assert!(!target.executor.relation_exists("Files").unwrap());
    assert!(!target.ledger.has_applied(7).unwrap());
}
