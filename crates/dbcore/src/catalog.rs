//! Introspected schema metadata: fields, indexes and foreign keys.
//!
//! Adapters build these while answering catalog calls; after construction
//! they are read-only and carry no reference back to the adapter.

use crate::error::{DbError, DbResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Declared column type, normalised across backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FieldType {
    Blob,
    VarChar,
    Char,
    Integer,
    DateTime,
    Date,
    Time,
    Float,
    Bit,
}

impl FieldType {
    pub const ALL: [FieldType; 9] = [
        FieldType::Blob,
        FieldType::VarChar,
        FieldType::Char,
        FieldType::Integer,
        FieldType::DateTime,
        FieldType::Date,
        FieldType::Time,
        FieldType::Float,
        FieldType::Bit,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FieldType::Blob => "Blob",
            FieldType::VarChar => "VarChar",
            FieldType::Char => "Char",
            FieldType::Integer => "Integer",
            FieldType::DateTime => "DateTime",
            FieldType::Date => "Date",
            FieldType::Time => "Time",
            FieldType::Float => "Float",
            FieldType::Bit => "Bit",
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FieldType {
    type Err = DbError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FieldType::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| DbError::validation(format!("unknown field type '{s}'")))
    }
}

/// One physical column as reported by an adapter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    name: String,
    original_name: String,
    table: String,
    original_table: String,
    default: Option<String>,
    max_length: Option<u32>,
    comment: Option<String>,
    identity: bool,
    not_null: bool,
    primary_key: bool,
    unique: bool,
    timestamp: bool,
    field_type: FieldType,
}

impl Field {
    /// Start a field description. Original names default to the given names.
    pub fn new(name: impl Into<String>, table: impl Into<String>, field_type: FieldType) -> Self {
        let name = name.into();
        let table = table.into();
        Self {
            original_name: name.clone(),
            original_table: table.clone(),
            name,
            table,
            default: None,
            max_length: None,
            comment: None,
            identity: false,
            not_null: false,
            primary_key: false,
            unique: false,
            timestamp: false,
            field_type,
        }
    }

    /// Set the name before aliasing.
    pub fn with_original_name(mut self, name: impl Into<String>) -> Self {
        self.original_name = name.into();
        self
    }

    /// Set the table name before aliasing.
    pub fn with_original_table(mut self, table: impl Into<String>) -> Self {
        self.original_table = table.into();
        self
    }

    pub fn with_default(mut self, default: impl Into<String>) -> Self {
        self.default = Some(default.into());
        self
    }

    pub fn with_max_length(mut self, len: u32) -> Self {
        self.max_length = Some(len);
        self
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    /// Mark as auto-increment.
    pub fn identity(mut self) -> Self {
        self.identity = true;
        self
    }

    pub fn not_null(mut self) -> Self {
        self.not_null = true;
        self
    }

    pub fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self
    }

    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    pub fn timestamp(mut self) -> Self {
        self.timestamp = true;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn original_name(&self) -> &str {
        &self.original_name
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn original_table(&self) -> &str {
        &self.original_table
    }

    pub fn default_value(&self) -> Option<&str> {
        self.default.as_deref()
    }

    pub fn max_length(&self) -> Option<u32> {
        self.max_length
    }

    pub fn comment(&self) -> Option<&str> {
        self.comment.as_deref()
    }

    pub fn is_identity(&self) -> bool {
        self.identity
    }

    pub fn is_not_null(&self) -> bool {
        self.not_null
    }

    pub fn is_primary_key(&self) -> bool {
        self.primary_key
    }

    pub fn is_unique(&self) -> bool {
        self.unique
    }

    pub fn is_timestamp(&self) -> bool {
        self.timestamp
    }

    pub fn field_type(&self) -> FieldType {
        self.field_type
    }
}

/// A physical index on a table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Index {
    key_name: String,
    primary_key: bool,
    unique: bool,
    columns: Vec<String>,
}

impl Index {
    pub fn new<I, S>(
        key_name: impl Into<String>,
        primary_key: bool,
        unique: bool,
        columns: I,
    ) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            key_name: key_name.into(),
            primary_key,
            unique,
            columns: columns.into_iter().map(Into::into).collect(),
        }
    }

    pub fn key_name(&self) -> &str {
        &self.key_name
    }

    pub fn is_primary_key(&self) -> bool {
        self.primary_key
    }

    pub fn is_unique(&self) -> bool {
        self.unique
    }

    /// Indexed columns in index order.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }
}

/// A foreign key constraint. Local and referenced columns correspond by position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForeignKey {
    key_name: String,
    columns: Vec<String>,
    reference_table: String,
    reference_columns: Vec<String>,
}

impl ForeignKey {
    /// Fails if the local and referenced column lists differ in length.
    pub fn new<I, J, S, T>(
        key_name: impl Into<String>,
        columns: I,
        reference_table: impl Into<String>,
        reference_columns: J,
    ) -> DbResult<Self>
    where
        I: IntoIterator<Item = S>,
        J: IntoIterator<Item = T>,
        S: Into<String>,
        T: Into<String>,
    {
        let key_name = key_name.into();
        let columns: Vec<String> = columns.into_iter().map(Into::into).collect();
        let reference_columns: Vec<String> =
            reference_columns.into_iter().map(Into::into).collect();

        if columns.len() != reference_columns.len() {
            return Err(DbError::validation(format!(
                "foreign key '{key_name}' has {} local columns but {} referenced columns",
                columns.len(),
                reference_columns.len()
            )));
        }

        Ok(Self {
            key_name,
            columns,
            reference_table: reference_table.into(),
            reference_columns,
        })
    }

    pub fn key_name(&self) -> &str {
        &self.key_name
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn reference_table(&self) -> &str {
        &self.reference_table
    }

    pub fn reference_columns(&self) -> &[String] {
        &self.reference_columns
    }

    /// `(local, referenced)` column pairs.
    pub fn column_pairs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.columns
            .iter()
            .map(String::as_str)
            .zip(self.reference_columns.iter().map(String::as_str))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_type_parse_and_display() {
        for t in FieldType::ALL {
            assert_eq!(t.to_string().parse::<FieldType>().unwrap(), t);
        }
        assert_eq!("varchar".parse::<FieldType>().unwrap(), FieldType::VarChar);
        assert!("json".parse::<FieldType>().is_err());
    }

    #[test]
    fn field_builder_defaults() {
        let f = Field::new("id", "users", FieldType::Integer)
            .identity()
            .primary_key()
            .not_null();
        assert_eq!(f.name(), "id");
        assert_eq!(f.original_name(), "id");
        assert_eq!(f.original_table(), "users");
        assert!(f.is_identity() && f.is_primary_key() && f.is_not_null());
        assert!(!f.is_unique() && !f.is_timestamp());
        assert_eq!(f.default_value(), None);
        assert_eq!(f.field_type(), FieldType::Integer);
    }

    #[test]
    fn field_aliasing() {
        let f = Field::new("uname", "u", FieldType::VarChar)
            .with_original_name("username")
            .with_original_table("users")
            .with_max_length(64)
            .with_default("''")
            .with_comment("login");
        assert_eq!(f.original_name(), "username");
        assert_eq!(f.table(), "u");
        assert_eq!(f.max_length(), Some(64));
        assert_eq!(f.default_value(), Some("''"));
        assert_eq!(f.comment(), Some("login"));
    }

    #[test]
    fn index_keeps_column_order() {
        let idx = Index::new("ix_name", false, true, ["last", "first"]);
        assert_eq!(idx.columns(), ["last", "first"]);
        assert!(idx.is_unique());
        assert!(!idx.is_primary_key());
    }

    #[test]
    fn foreign_key_pairs() {
        let fk =
            ForeignKey::new("fk_order_user", ["user_id", "tenant"], "users", ["id", "tenant"])
                .unwrap();
        let pairs: Vec<_> = fk.column_pairs().collect();
        assert_eq!(pairs, vec![("user_id", "id"), ("tenant", "tenant")]);
        assert_eq!(fk.reference_table(), "users");
    }

    #[test]
    fn foreign_key_arity_mismatch() {
        let err = ForeignKey::new("fk", ["a", "b"], "t", ["x"]).unwrap_err();
        assert!(matches!(err, DbError::Validation(_)));
    }

    #[test]
    fn catalog_serializes_for_schema_caches() {
        let idx = Index::new("PRIMARY", true, true, ["id"]);
        let json = serde_json::to_string(&idx).unwrap();
        let back: Index = serde_json::from_str(&json).unwrap();
        assert_eq!(back, idx);
    }
}
