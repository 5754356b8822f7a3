use anyhow::{bail, Context, Result};
use log::info;
use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection, Transaction};
use std::collections::HashMap;
use std::path::Path;

use super::schema_gen::{generate_create_table, generate_insert};
use crate::config::{is_plain_identifier, StoreLayout, STRUCTURAL_COLUMNS};
use crate::schema::{
    dictionary_table, geometry_table, indicator_table, DictionaryEntry, TableSchema,
};

/// One (municipality, year) record; indicators left out are stored as NULL
#[derive(Debug, Clone, Default)]
pub struct IndicatorRow {
    pub municipality_id: i64,
    pub year: i32,
    pub values: HashMap<String, f64>,
}

impl IndicatorRow {
    pub fn new(municipality_id: i64, year: i32) -> Self {
        Self {
            municipality_id,
            year,
            values: HashMap::new(),
        }
    }

    pub fn with(mut self, indicator: impl Into<String>, value: f64) -> Self {
        self.values.insert(indicator.into(), value);
        self
    }
}

/// A municipality and its boundary as WKT
#[derive(Debug, Clone)]
pub struct MunicipalityRow {
    pub code: i64,
    pub name: String,
    pub geometry: Option<String>,
}

impl MunicipalityRow {
    pub fn new(code: i64, name: impl Into<String>, geometry: Option<&str>) -> Self {
        Self {
            code,
            name: name.into(),
            geometry: geometry.map(str::to_string),
        }
    }
}

/// Creates a store with the expected schema and loads rows into it
pub struct StoreWriter {
    conn: Connection,
    indicators: TableSchema,
    geometries: TableSchema,
    dictionary: TableSchema,
}

impl StoreWriter {
    /// Create a new store file, replacing any existing one
    pub fn create(db_path: &Path, layout: &StoreLayout, indicators: &[&str]) -> Result<Self> {
        // Remove existing database if present
        if db_path.exists() {
            std::fs::remove_file(db_path).context("Failed to remove existing database")?;
        }

        let conn = Connection::open(db_path).context("Failed to create database")?;

        conn.execute_batch(
            "PRAGMA synchronous = NORMAL;
             PRAGMA cache_size = -64000;",
        )?;

        Self::with_connection(conn, layout, indicators)
    }

    /// Create the store inside an already open connection
    pub fn with_connection(conn: Connection, layout: &StoreLayout, indicators: &[&str]) -> Result<Self> {
        layout.validate()?;
        for name in indicators {
            if !is_plain_identifier(name) {
                bail!("Indicator name {:?} is not a plain identifier", name);
            }
            if STRUCTURAL_COLUMNS.contains(name) {
                bail!("Indicator name {:?} clashes with a structural column", name);
            }
        }

        let writer = Self {
            conn,
            indicators: indicator_table(layout, indicators),
            geometries: geometry_table(layout),
            dictionary: dictionary_table(layout),
        };
        writer.create_tables()?;
        Ok(writer)
    }

    fn create_tables(&self) -> Result<()> {
        for schema in [&self.indicators, &self.geometries, &self.dictionary] {
            let sql = generate_create_table(schema);
            self.conn
                .execute(&sql, [])
                .with_context(|| format!("Failed to create table: {}", schema.name))?;
        }
        info!(
            "Created store tables with {} indicator columns",
            self.indicators.columns.len() - 2
        );
        Ok(())
    }

    /// Insert indicator records, rejecting names the table does not have
    pub fn insert_indicators(&mut self, rows: &[IndicatorRow]) -> Result<u64> {
        let known: Vec<&str> = self.indicators.column_names().skip(2).collect();
        for row in rows {
            if let Some(name) = row.values.keys().find(|k| !known.contains(&k.as_str())) {
                bail!("Unknown indicator column: {}", name);
            }
        }

        let batch: Vec<Vec<Value>> = rows
            .iter()
            .map(|row| {
                let mut values = vec![
                    Value::Integer(row.year.into()),
                    Value::Integer(row.municipality_id),
                ];
                values.extend(known.iter().map(|name| match row.values.get(*name) {
                    Some(v) => Value::Real(*v),
                    None => Value::Null,
                }));
                values
            })
            .collect();

        let sql = generate_insert(&self.indicators);
        self.insert_all(&self.indicators.name.clone(), &sql, &batch)
    }

    pub fn insert_municipalities(&mut self, rows: &[MunicipalityRow]) -> Result<u64> {
        let batch: Vec<Vec<Value>> = rows
            .iter()
            .map(|row| {
                vec![
                    Value::Integer(row.code),
                    Value::Text(row.name.clone()),
                    row.geometry.clone().map_or(Value::Null, Value::Text),
                ]
            })
            .collect();

        let sql = generate_insert(&self.geometries);
        self.insert_all(&self.geometries.name.clone(), &sql, &batch)
    }

    pub fn insert_dictionary(&mut self, entries: &[DictionaryEntry]) -> Result<u64> {
        let batch: Vec<Vec<Value>> = entries
            .iter()
            .map(|e| vec![Value::Text(e.name.clone()), Value::Text(e.description.clone())])
            .collect();

        let sql = generate_insert(&self.dictionary);
        self.insert_all(&self.dictionary.name.clone(), &sql, &batch)
    }

    fn insert_all(&mut self, table: &str, sql: &str, batch: &[Vec<Value>]) -> Result<u64> {
        let tx = self.conn.transaction()?;
        insert_batch(&tx, sql, batch).with_context(|| format!("Failed to insert into {}", table))?;
        tx.commit()?;
        Ok(batch.len() as u64)
    }

    /// Hand the connection over, e.g. to read an in-memory store
    pub fn into_connection(self) -> Connection {
        self.conn
    }

    /// Finalize the database
    pub fn finalize(self) -> Result<()> {
        self.conn.execute_batch("PRAGMA optimize;")?;
        Ok(())
    }
}

/// Insert a batch of rows inside a transaction
fn insert_batch(tx: &Transaction, sql: &str, batch: &[Vec<Value>]) -> Result<()> {
    let mut stmt = tx.prepare_cached(sql)?;
    for row in batch {
        stmt.execute(params_from_iter(row.iter()))?;
    }
    Ok(())
}
