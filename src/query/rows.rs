use rusqlite::types::Value;
use serde::{Serialize, Serializer};

use crate::error::StoreError;
use crate::reader::Row;

/// Boundary of a municipality as stored
#[derive(Debug, Clone, PartialEq)]
pub enum Geometry {
    Wkt(String),
    Wkb(Vec<u8>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GeometryKind {
    Polygon,
    MultiPolygon,
    Other,
}

impl Geometry {
    /// Shape type from the WKT tag or the WKB type code
    pub fn kind(&self) -> GeometryKind {
        match self {
            Geometry::Wkt(text) => {
                let tag: String = text
                    .trim_start()
                    .chars()
                    .take_while(|c| c.is_ascii_alphabetic())
                    .collect::<String>()
                    .to_ascii_uppercase();
                match tag.as_str() {
                    "POLYGON" => GeometryKind::Polygon,
                    "MULTIPOLYGON" => GeometryKind::MultiPolygon,
                    _ => GeometryKind::Other,
                }
            }
            Geometry::Wkb(bytes) => {
                if bytes.len() < 5 {
                    return GeometryKind::Other;
                }
                let code = [bytes[1], bytes[2], bytes[3], bytes[4]];
                let code = match bytes[0] {
                    0 => u32::from_be_bytes(code),
                    1 => u32::from_le_bytes(code),
                    _ => return GeometryKind::Other,
                };
                // ISO Z/M variants add multiples of 1000
                match code % 1000 {
                    3 => GeometryKind::Polygon,
                    6 => GeometryKind::MultiPolygon,
                    _ => GeometryKind::Other,
                }
            }
        }
    }
}

impl Serialize for Geometry {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Geometry::Wkt(text) => serializer.serialize_str(text),
            Geometry::Wkb(bytes) => {
                let hex: String = bytes.iter().map(|b| format!("{:02x}", b)).collect();
                serializer.serialize_str(&hex)
            }
        }
    }
}

/// One municipality shaded on the map
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChoroplethRow {
    pub municipality_id: i64,
    pub municipality_name: String,
    pub value: f64,
    pub geometry: Geometry,
}

/// Yearly total across all municipalities
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SeriesPoint {
    pub year: i32,
    pub total: f64,
}

/// One municipality placed on the scatterplot
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScatterRow {
    pub municipality_id: i64,
    pub municipality_name: Option<String>,
    pub x: f64,
    pub y: f64,
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "NULL",
        Value::Integer(_) => "INTEGER",
        Value::Real(_) => "REAL",
        Value::Text(_) => "TEXT",
        Value::Blob(_) => "BLOB",
    }
}

fn column<'a>(row: &'a Row, idx: usize, name: &'static str) -> Result<&'a Value, StoreError> {
    row.get(idx).ok_or(StoreError::Decode {
        column: name,
        expected: "a value",
        found: "no column",
    })
}

fn mismatch(name: &'static str, expected: &'static str, found: &Value) -> StoreError {
    StoreError::Decode {
        column: name,
        expected,
        found: type_name(found),
    }
}

pub(crate) fn get_i64(row: &Row, idx: usize, name: &'static str) -> Result<i64, StoreError> {
    match column(row, idx, name)? {
        Value::Integer(i) => Ok(*i),
        other => Err(mismatch(name, "INTEGER", other)),
    }
}

pub(crate) fn get_year(row: &Row, idx: usize, name: &'static str) -> Result<i32, StoreError> {
    let value = get_i64(row, idx, name)?;
    i32::try_from(value).map_err(|_| StoreError::Decode {
        column: name,
        expected: "a year",
        found: "out-of-range INTEGER",
    })
}

pub(crate) fn get_f64(row: &Row, idx: usize, name: &'static str) -> Result<f64, StoreError> {
    match column(row, idx, name)? {
        Value::Integer(i) => Ok(*i as f64),
        Value::Real(f) => Ok(*f),
        other => Err(mismatch(name, "a number", other)),
    }
}

pub(crate) fn get_opt_text(
    row: &Row,
    idx: usize,
    name: &'static str,
) -> Result<Option<String>, StoreError> {
    match column(row, idx, name)? {
        Value::Null => Ok(None),
        Value::Text(s) => Ok(Some(s.clone())),
        other => Err(mismatch(name, "TEXT", other)),
    }
}

pub(crate) fn get_geometry(row: &Row, idx: usize, name: &'static str) -> Result<Geometry, StoreError> {
    match column(row, idx, name)? {
        Value::Text(s) => Ok(Geometry::Wkt(s.clone())),
        Value::Blob(b) => Ok(Geometry::Wkb(b.clone())),
        other => Err(mismatch(name, "TEXT or BLOB", other)),
    }
}
