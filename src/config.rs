use anyhow::{Context, Result};
use directories::ProjectDirs;
use std::fs;
use std::path::PathBuf;

use crate::error::QueryError;

/// Indicator picked when the user has not chosen one
pub const DEFAULT_INDICATOR: &str = "total_desastres";

/// Year picked when the user has not chosen one and it has data
pub const DEFAULT_YEAR: i32 = 2023;

/// File name of the store inside the project data directory
pub const DEFAULT_DB_FILE: &str = "mape.sqlite";

/// Year column of the indicator table
pub const YEAR_COLUMN: &str = "ano";
/// Municipality column of the indicator table
pub const MUNICIPALITY_ID_COLUMN: &str = "id_municipio";
/// Municipality code column of the geometry table
pub const MUNICIPALITY_CODE_COLUMN: &str = "code_muni";
/// Municipality name column of the geometry table
pub const MUNICIPALITY_NAME_COLUMN: &str = "name_muni";
/// Boundary column of the geometry table
pub const GEOMETRY_COLUMN: &str = "geometry";
/// Name column of the dictionary table
pub const DICTIONARY_NAME_COLUMN: &str = "nome_variavel";
/// Description column of the dictionary table
pub const DICTIONARY_DESCRIPTION_COLUMN: &str = "descricao";

/// Columns that are never offered as indicators
pub const STRUCTURAL_COLUMNS: &[&str] = &[YEAR_COLUMN, MUNICIPALITY_ID_COLUMN, GEOMETRY_COLUMN];

/// Table names of the three stores
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreLayout {
    pub indicator_table: String,
    pub geometry_table: String,
    pub dictionary_table: String,
}

impl Default for StoreLayout {
    fn default() -> Self {
        Self {
            indicator_table: "mape_municipios".to_string(),
            geometry_table: "municipalities".to_string(),
            dictionary_table: "dicionario".to_string(),
        }
    }
}

impl StoreLayout {
    /// Reject table names that are not plain SQL identifiers
    pub fn validate(&self) -> Result<(), QueryError> {
        for name in [
            &self.indicator_table,
            &self.geometry_table,
            &self.dictionary_table,
        ] {
            if !is_plain_identifier(name) {
                return Err(QueryError::schema(format!(
                    "table name {:?} is not a plain identifier",
                    name
                )));
            }
        }
        Ok(())
    }
}

/// `[A-Za-z_][A-Za-z0-9_]*`
pub fn is_plain_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Default store location under the platform data directory
pub fn default_db_path() -> Result<PathBuf> {
    let proj_dirs = ProjectDirs::from("br.org", "mape", "mape-municipios")
        .context("Could not determine data directory")?;
    let data_dir = proj_dirs.data_dir();

    fs::create_dir_all(data_dir).context("Failed to create data directory")?;

    Ok(data_dir.join(DEFAULT_DB_FILE))
}

/// Use the explicit path if given, else the default location
pub fn resolve_db_path(custom: Option<PathBuf>) -> Result<PathBuf> {
    match custom {
        Some(path) => Ok(path),
        None => default_db_path(),
    }
}
