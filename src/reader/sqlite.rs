use log::debug;
use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection, OpenFlags};
use std::path::Path;

use super::{ColumnInfo, Reader, Row};
use crate::error::StoreError;

/// SQLite-backed reader over a single shared connection
#[derive(Debug)]
pub struct SqliteReader {
    conn: Connection,
}

impl SqliteReader {
    /// Open an existing store read-only
    pub fn open(db_path: &Path) -> Result<Self, StoreError> {
        let conn = Connection::open_with_flags(
            db_path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .map_err(|source| StoreError::Open {
            path: db_path.to_path_buf(),
            source,
        })?;

        conn.pragma_update(None, "query_only", true)
            .map_err(|source| StoreError::Open {
                path: db_path.to_path_buf(),
                source,
            })?;

        debug!("Opened store {:?} read-only", db_path);
        Ok(Self { conn })
    }

    /// Wrap a connection that is already open, e.g. an in-memory store
    pub fn from_connection(conn: Connection) -> Self {
        Self { conn }
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }
}

impl Reader for SqliteReader {
    fn table_columns(&self, table: &str) -> Result<Vec<ColumnInfo>, StoreError> {
        let mut stmt = self
            .conn
            .prepare_cached("SELECT name, type FROM pragma_table_info(?1) ORDER BY cid")?;

        let columns = stmt
            .query_map([table], |row| {
                Ok(ColumnInfo::new(
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                ))
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(columns)
    }

    fn query(&self, sql: &str, params: &[Value]) -> Result<Vec<Row>, StoreError> {
        debug!("Executing: {} with {:?}", sql, params);

        let mut stmt = self.conn.prepare_cached(sql)?;
        let width = stmt.column_count();

        let rows = stmt
            .query_map(params_from_iter(params.iter()), |row| {
                (0..width).map(|idx| row.get::<_, Value>(idx)).collect()
            })?
            .collect::<rusqlite::Result<Vec<Row>>>()?;

        Ok(rows)
    }
}
