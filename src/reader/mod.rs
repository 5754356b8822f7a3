//! Read access to the indicator and geometry stores
//!
//! The query layer never touches a connection directly. It goes through the
//! [`Reader`] trait so that tests can swap in an in-memory store or wrap one
//! to observe the statements issued.

pub mod sqlite;

pub use sqlite::SqliteReader;

use rusqlite::types::Value;

use crate::error::StoreError;

/// Column affinity as SQLite derives it from the declared type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Affinity {
    Integer,
    Real,
    Numeric,
    Text,
    Blob,
}

impl Affinity {
    /// Apply SQLite's affinity rules to a declared column type
    pub fn from_declared(decl_type: &str) -> Self {
        let upper = decl_type.to_ascii_uppercase();
        if upper.contains("INT") {
            Affinity::Integer
        } else if upper.contains("CHAR") || upper.contains("CLOB") || upper.contains("TEXT") {
            Affinity::Text
        } else if upper.contains("BLOB") || upper.trim().is_empty() {
            Affinity::Blob
        } else if upper.contains("REAL") || upper.contains("FLOA") || upper.contains("DOUB") {
            Affinity::Real
        } else {
            Affinity::Numeric
        }
    }

    pub fn is_numeric(self) -> bool {
        matches!(self, Affinity::Integer | Affinity::Real | Affinity::Numeric)
    }
}

/// One column of a store table, in declaration order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnInfo {
    pub name: String,
    pub decl_type: String,
}

impl ColumnInfo {
    pub fn new(name: impl Into<String>, decl_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            decl_type: decl_type.into(),
        }
    }

    pub fn affinity(&self) -> Affinity {
        Affinity::from_declared(&self.decl_type)
    }
}

/// A result row, one value per selected column
pub type Row = Vec<Value>;

/// Read-only access to a store
pub trait Reader {
    /// Columns of `table` in declaration order; empty if the table does not exist
    fn table_columns(&self, table: &str) -> Result<Vec<ColumnInfo>, StoreError>;

    /// Run a read query with bound parameters and collect every row
    fn query(&self, sql: &str, params: &[Value]) -> Result<Vec<Row>, StoreError>;
}

impl<R: Reader + ?Sized> Reader for &R {
    fn table_columns(&self, table: &str) -> Result<Vec<ColumnInfo>, StoreError> {
        (**self).table_columns(table)
    }

    fn query(&self, sql: &str, params: &[Value]) -> Result<Vec<Row>, StoreError> {
        (**self).query(sql, params)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_affinity_rules() {
        assert_eq!(Affinity::from_declared("INTEGER"), Affinity::Integer);
        assert_eq!(Affinity::from_declared("BIGINT"), Affinity::Integer);
        assert_eq!(Affinity::from_declared("REAL"), Affinity::Real);
        assert_eq!(Affinity::from_declared("double"), Affinity::Real);
        assert_eq!(Affinity::from_declared("DECIMAL(10,2)"), Affinity::Numeric);
        assert_eq!(Affinity::from_declared("VARCHAR(20)"), Affinity::Text);
        assert_eq!(Affinity::from_declared("TEXT"), Affinity::Text);
        assert_eq!(Affinity::from_declared(""), Affinity::Blob);
        // "POINT" contains "INT"
        assert_eq!(Affinity::from_declared("POINT"), Affinity::Integer);
    }

    #[test]
    fn test_numeric_affinity() {
        assert!(ColumnInfo::new("total_desastres", "REAL").affinity().is_numeric());
        assert!(!ColumnInfo::new("sigla_uf", "TEXT").affinity().is_numeric());
        assert!(!ColumnInfo::new("geometry", "BLOB").affinity().is_numeric());
    }
}
