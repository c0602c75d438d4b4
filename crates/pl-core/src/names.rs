//! Strongly-typed table and column identifiers.
//!
//! Manifest input carries plain strings; the resolver and builder convert them
//! into these wrappers so every emitted operation names a non-empty object.

use crate::newtype_string::define_identifier;

define_identifier! {
    /// Name of a table targeted by a schema operation.
    pub struct TableName;
}

define_identifier! {
    /// Name of a column inside a table.
    pub struct ColumnName;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_try_new_rejects_empty() {
        assert!(TableName::try_new("").is_none());
        assert!(ColumnName::try_new("").is_none());
        assert_eq!(TableName::try_new("Widgets").unwrap(), "Widgets");
    }

    #[test]
    fn test_quoted_escapes_embedded_quotes() {
        assert_eq!(TableName::new("Widgets").quoted(), "\"Widgets\"");
        assert_eq!(ColumnName::new("odd\"name").quoted(), "\"odd\"\"name\"");
    }

    #[test]
    fn test_deserialize_rejects_empty() {
        let err = serde_json::from_str::<TableName>(r#""""#).unwrap_err();
        assert!(err.to_string().contains("TableName must not be empty"));

        let name: ColumnName = serde_json::from_str(r#""Id""#).unwrap();
        assert_eq!(name.as_str(), "Id");
    }

    #[test]
    fn test_borrow_lookup() {
        use std::collections::HashSet;
        let mut set = HashSet::new();
        set.insert(TableName::new("Parent"));
        assert!(set.contains("Parent"));
        assert!(!set.contains("Child"));
    }
}
