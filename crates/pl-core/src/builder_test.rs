use super::*;
use crate::column_type::{ColumnKey, LogicalType};

fn widgets_descriptor() -> MigrationDescriptor {
    MigrationDescriptor::new(
        1,
        "Initial Migration",
        vec![TableSpec::new(
            "Widgets",
            vec![
                ColumnSpec::new("Id", "Int64").primary_key().identity(),
                ColumnSpec::new("Name", "Text").nullable(),
            ],
        )],
    )
}

fn three_table_descriptor() -> MigrationDescriptor {
    MigrationDescriptor::new(
        2,
        "Catalog",
        vec![
            TableSpec::new(
                "Categories",
                vec![
                    ColumnSpec::new("Id", "Int32").primary_key().identity(),
                    ColumnSpec::new("Title", "String"),
                ],
            ),
            TableSpec::new(
                "Products",
                vec![
                    ColumnSpec::new("Id", "Int32").primary_key().identity(),
                    ColumnSpec::new("CategoryId", "Int32").references("Categories", "Id"),
                    ColumnSpec::new("Name", "String"),
                    ColumnSpec::new("Added", "DateTime").nullable(),
                ],
            ),
            TableSpec::new("Tags", vec![ColumnSpec::new("Label", "Text").primary_key()]),
        ],
    )
}

#[test]
fn test_widgets_apply_sequence() {
    let ops = build_apply_operations(&widgets_descriptor()).unwrap();
    let rendered: Vec<String> = ops.iter().map(|op| op.to_string()).collect();
    assert_eq!(
        rendered,
        vec![
            "CreateTable(Widgets, Id: int64 pk identity)",
            "AddColumn(Widgets, Name: text nullable)",
        ]
    );

    match &ops[0] {
        SchemaOperation::CreateTable {
            table,
            first_column,
        } => {
            assert_eq!(table, "Widgets");
            assert_eq!(first_column.data_type, LogicalType::Integer64);
            assert_eq!(first_column.key, ColumnKey::PrimaryKeyIdentity);
        }
        other => panic!("expected CreateTable, got {other}"),
    }
}

#[test]
fn test_apply_shape_per_table() {
    let descriptor = three_table_descriptor();
    let ops = build_apply_operations(&descriptor).unwrap();

    let expected_len: usize = descriptor.tables.iter().map(|t| t.columns.len()).sum();
    assert_eq!(ops.len(), expected_len);

    // Each table: one CreateTable followed by its AddColumns in declared order,
    // before anything for the next table
    let mut cursor = 0;
    for table in &descriptor.tables {
        match &ops[cursor] {
            SchemaOperation::CreateTable {
                table: name,
                first_column,
            } => {
                assert_eq!(name, table.name.as_str());
                assert_eq!(first_column.name, table.columns[0].name.as_str());
            }
            other => panic!("expected CreateTable for {}, got {other}", table.name),
        }
        cursor += 1;
        for column in table.remaining_columns() {
            match &ops[cursor] {
                SchemaOperation::AddColumn {
                    table: name,
                    column: def,
                } => {
                    assert_eq!(name, table.name.as_str());
                    assert_eq!(def.name, column.name.as_str());
                }
                other => panic!("expected AddColumn, got {other}"),
            }
            cursor += 1;
        }
    }
}

#[test]
fn test_revert_reverses_declaration_order() {
    let ops = build_revert_operations(&three_table_descriptor()).unwrap();
    assert_eq!(
        ops,
        vec![
            SchemaOperation::DropTable {
                table: TableName::new("Tags")
            },
            SchemaOperation::DropTable {
                table: TableName::new("Products")
            },
            SchemaOperation::DropTable {
                table: TableName::new("Categories")
            },
        ]
    );
}

#[test]
fn test_zero_tables_is_noop() {
    let descriptor = MigrationDescriptor::new(9, "nothing", vec![]);
    assert!(build_apply_operations(&descriptor).unwrap().is_empty());
    assert!(build_revert_operations(&descriptor).unwrap().is_empty());
}

#[test]
fn test_empty_table_rejected_in_both_directions() {
    let descriptor = MigrationDescriptor::new(
        3,
        "broken",
        vec![
            TableSpec::new("Ok", vec![ColumnSpec::new("Id", "Int32")]),
            TableSpec::new("Hollow", vec![]),
        ],
    );
    let expected = BuildError::EmptyTable {
        table: "Hollow".to_string(),
    };
    assert_eq!(build_apply_operations(&descriptor).unwrap_err(), expected);
    assert_eq!(build_revert_operations(&descriptor).unwrap_err(), expected);
}

#[test]
fn test_identity_on_text_fails_resolution() {
    let descriptor = MigrationDescriptor::new(
        4,
        "bad identity",
        vec![TableSpec::new(
            "Codes",
            vec![ColumnSpec::new("Code", "Text").identity()],
        )],
    );
    let err = build_apply_operations(&descriptor).unwrap_err();
    assert!(matches!(
        err.resolution(),
        Some(ResolveError::InvalidFlagCombination { .. })
    ));
    assert!(matches!(err, BuildError::Resolution { ref table, .. } if table == "Codes"));
}

#[test]
fn test_unsupported_type_in_later_column() {
    let descriptor = MigrationDescriptor::new(
        5,
        "bad type",
        vec![TableSpec::new(
            "Files",
            vec![
                ColumnSpec::new("Id", "Int32").primary_key(),
                ColumnSpec::new("Data", "Blob"),
            ],
        )],
    );
    let err = build_apply_operations(&descriptor).unwrap_err();
    assert!(matches!(
        err.resolution(),
        Some(ResolveError::UnsupportedType { .. })
    ));
}

#[test]
fn test_structural_validation() {
    let duplicate_table = MigrationDescriptor::new(
        6,
        "dup",
        vec![
            TableSpec::new("A", vec![ColumnSpec::new("Id", "Int32")]),
            TableSpec::new("A", vec![ColumnSpec::new("Id", "Int32")]),
        ],
    );
    assert!(matches!(
        validate_descriptor(&duplicate_table),
        Err(BuildError::DuplicateTable { .. })
    ));

    let duplicate_column = MigrationDescriptor::new(
        6,
        "dup",
        vec![TableSpec::new(
            "A",
            vec![ColumnSpec::new("Id", "Int32"), ColumnSpec::new("Id", "Text")],
        )],
    );
    assert!(matches!(
        validate_descriptor(&duplicate_column),
        Err(BuildError::DuplicateColumn { .. })
    ));

    let unnamed = MigrationDescriptor::new(
        6,
        "unnamed",
        vec![TableSpec::new("", vec![ColumnSpec::new("Id", "Int32")])],
    );
    assert_eq!(
        validate_descriptor(&unnamed),
        Err(BuildError::EmptyTableName)
    );
}

#[test]
fn test_build_is_deterministic() {
    let descriptor = three_table_descriptor();
    assert_eq!(
        build_apply_operations(&descriptor).unwrap(),
        build_apply_operations(&descriptor).unwrap()
    );
}

#[test]
fn test_declared_order_is_not_reordered() {
    // Child declared before parent stays that way unless dependency ordering is requested
    let descriptor = MigrationDescriptor::new(
        7,
        "child first",
        vec![
            TableSpec::new(
                "Child",
                vec![
                    ColumnSpec::new("Id", "Int32").primary_key(),
                    ColumnSpec::new("ParentId", "Int32").references("Parent", "KeyColumn"),
                ],
            ),
            TableSpec::new(
                "Parent",
                vec![ColumnSpec::new("KeyColumn", "Int32").primary_key()],
            ),
        ],
    );

    let declared: Vec<String> = build_apply_operations(&descriptor)
        .unwrap()
        .iter()
        .filter(|op| op.kind() == "CreateTable")
        .map(|op| op.table().to_string())
        .collect();
    assert_eq!(declared, vec!["Child", "Parent"]);

    let by_dependency: Vec<String> =
        build_apply_operations_with(&descriptor, TableOrdering::Dependency)
            .unwrap()
            .iter()
            .filter(|op| op.kind() == "CreateTable")
            .map(|op| op.table().to_string())
            .collect();
    assert_eq!(by_dependency, vec!["Parent", "Child"]);

    let revert: Vec<String> = build_revert_operations_with(&descriptor, TableOrdering::Dependency)
        .unwrap()
        .iter()
        .map(|op| op.table().to_string())
        .collect();
    assert_eq!(revert, vec!["Child", "Parent"]);
}

#[test]
fn test_incremental_builder_chaining() {
    let mut builder = OperationBuilder::new();
    builder
        .create_table("Parent", &ColumnSpec::new("KeyColumn", "Int32").primary_key())
        .unwrap()
        .add_column("Parent", &ColumnSpec::new("Column1", "Int32"))
        .unwrap()
        .drop_table("Legacy")
        .unwrap();

    assert_eq!(builder.len(), 3);
    assert_eq!(builder.operations()[2].kind(), "DropTable");
    assert!(matches!(
        builder.drop_table(""),
        Err(BuildError::EmptyTableName)
    ));
    assert_eq!(builder.finish().len(), 3);
}

#[test]
fn test_operations_serialize_with_tag() {
    let ops = build_apply_operations(&widgets_descriptor()).unwrap();
    let json = serde_json::to_value(&ops[1]).unwrap();
    assert_eq!(json["op"], "add_column");
    assert_eq!(json["table"], "Widgets");
    assert_eq!(json["column"]["data_type"], "text");
    assert_eq!(json["column"]["nullable"], true);
}
