use super::*;

#[test]
fn test_parse_aliases() {
    assert_eq!(LogicalType::parse("Int32"), Some(LogicalType::Integer32));
    assert_eq!(LogicalType::parse("int64"), Some(LogicalType::Integer64));
    assert_eq!(LogicalType::parse("String"), Some(LogicalType::Text));
    assert_eq!(LogicalType::parse("AnsiString"), Some(LogicalType::Text));
    assert_eq!(LogicalType::parse(" DateTime "), Some(LogicalType::DateTime));
    assert_eq!(LogicalType::parse("Guid"), Some(LogicalType::Uuid));
    assert_eq!(LogicalType::parse("Blob"), None);
}

#[test]
fn test_canonical_names_roundtrip() {
    for ty in LogicalType::ALL {
        assert_eq!(LogicalType::parse(ty.as_str()), Some(ty));
    }
}

#[test]
fn test_only_integers_are_incrementable() {
    let incrementable: Vec<LogicalType> = LogicalType::ALL
        .into_iter()
        .filter(|t| t.is_incrementable())
        .collect();
    assert_eq!(
        incrementable,
        vec![
            LogicalType::Integer16,
            LogicalType::Integer32,
            LogicalType::Integer64
        ]
    );
}

#[test]
fn test_first_column_all_key_combinations_on_integers() {
    for ty in LogicalType::ALL.into_iter().filter(|t| t.is_incrementable()) {
        for (pk, identity, expected) in [
            (true, true, ColumnKey::PrimaryKeyIdentity),
            (true, false, ColumnKey::PrimaryKey),
            (false, true, ColumnKey::Identity),
            (false, false, ColumnKey::Plain),
        ] {
            let mut spec = ColumnSpec::new("Id", ty.as_str());
            spec.is_primary_key = pk;
            spec.is_identity = identity;
            let def = resolve_first_column(&spec).unwrap();
            assert_eq!(def.key, expected, "type {ty}, pk={pk}, identity={identity}");
            assert_eq!(def.data_type, ty);
            assert!(!def.nullable);
        }
    }
}

#[test]
fn test_first_column_identity_rejected_on_non_integers() {
    for ty in LogicalType::ALL.into_iter().filter(|t| !t.is_incrementable()) {
        for pk in [true, false] {
            let mut spec = ColumnSpec::new("Key", ty.as_str()).identity();
            spec.is_primary_key = pk;
            let err = resolve_first_column(&spec).unwrap_err();
            assert!(
                matches!(err, ResolveError::InvalidFlagCombination { .. }),
                "type {ty} should reject identity"
            );
        }

        // Primary key alone is fine for every type
        let def = resolve_first_column(&ColumnSpec::new("Key", ty.as_str()).primary_key()).unwrap();
        assert_eq!(def.key, ColumnKey::PrimaryKey);
    }
}

#[test]
fn test_identity_on_text_is_invalid_flag_combination() {
    let spec = ColumnSpec::new("Code", "Text").identity();
    let err = resolve_first_column(&spec).unwrap_err();
    match err {
        ResolveError::InvalidFlagCombination { column, reason } => {
            assert_eq!(column, "Code");
            assert!(reason.contains("text"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn test_first_column_nullable_key_rejected() {
    let spec = ColumnSpec::new("Id", "Int32").primary_key().nullable();
    assert!(matches!(
        resolve_first_column(&spec),
        Err(ResolveError::InvalidFlagCombination { .. })
    ));

    let spec = ColumnSpec::new("Id", "Int32").identity().nullable();
    assert!(matches!(
        resolve_first_column(&spec),
        Err(ResolveError::InvalidFlagCombination { .. })
    ));
}

#[test]
fn test_first_column_plain_keeps_nullability() {
    let def = resolve_first_column(&ColumnSpec::new("Note", "Text").nullable()).unwrap();
    assert_eq!(def.key, ColumnKey::Plain);
    assert!(def.nullable);
}

#[test]
fn test_subsequent_column_encodes_nullable() {
    let nullable = resolve_subsequent_column(&ColumnSpec::new("Name", "String").nullable()).unwrap();
    assert!(nullable.nullable);
    assert_eq!(nullable.data_type, LogicalType::Text);
    assert_eq!(nullable.key, ColumnKey::Plain);

    let required = resolve_subsequent_column(&ColumnSpec::new("Name", "String")).unwrap();
    assert!(!required.nullable);
}

#[test]
fn test_subsequent_column_rejects_key_flags() {
    for spec in [
        ColumnSpec::new("Other", "Int32").primary_key(),
        ColumnSpec::new("Other", "Int32").identity(),
    ] {
        assert!(matches!(
            resolve_subsequent_column(&spec),
            Err(ResolveError::InvalidFlagCombination { .. })
        ));
    }
}

#[test]
fn test_unsupported_type() {
    let spec = ColumnSpec::new("Payload", "Blob");
    let expected = ResolveError::UnsupportedType {
        column: "Payload".to_string(),
        type_name: "Blob".to_string(),
    };
    assert_eq!(resolve_first_column(&spec).unwrap_err(), expected);
    assert_eq!(resolve_subsequent_column(&spec).unwrap_err(), expected);
}

#[test]
fn test_empty_column_name() {
    let spec = ColumnSpec::new("", "Int32");
    assert_eq!(
        resolve_first_column(&spec).unwrap_err(),
        ResolveError::EmptyColumnName
    );
}

#[test]
fn test_definition_display() {
    let id = resolve_first_column(&ColumnSpec::new("Id", "Int64").primary_key().identity()).unwrap();
    assert_eq!(id.to_string(), "Id: int64 pk identity");

    let name = resolve_subsequent_column(&ColumnSpec::new("Name", "Text").nullable()).unwrap();
    assert_eq!(name.to_string(), "Name: text nullable");

    let fk = resolve_subsequent_column(&ColumnSpec::new("OwnerId", "Int32").references("Users", "Id"))
        .unwrap();
    assert_eq!(fk.to_string(), "OwnerId: int32 -> Users.Id");
}
