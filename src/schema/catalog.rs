use log::{debug, warn};
use rusqlite::types::Value;
use std::collections::{HashMap, HashSet};

use super::tables::{dictionary_table, geometry_table, indicator_table};
use super::types::{Indicator, TableSchema};
use crate::config::{StoreLayout, STRUCTURAL_COLUMNS};
use crate::error::{QueryError, Result};
use crate::query::sql::quote_ident;
use crate::reader::{ColumnInfo, Reader};

/// Indicators offered for selection, with their dictionary descriptions
///
/// Built once from schema introspection. This is the allow-list every
/// indicator name is checked against before it is embedded in a query.
#[derive(Debug, Clone)]
pub struct Catalog {
    indicators: Vec<Indicator>,
    index: HashMap<String, usize>,
}

impl Catalog {
    /// Introspect the stores described by `layout`
    pub fn load(reader: &impl Reader, layout: &StoreLayout) -> Result<Self> {
        let columns = require_table(reader, &indicator_table(layout, &[]))?;
        require_table(reader, &geometry_table(layout))?;

        let mut descriptions = load_dictionary(reader, layout)?;

        let mut indicators = Vec::new();
        for column in columns {
            if STRUCTURAL_COLUMNS.contains(&column.name.as_str()) {
                continue;
            }
            if !column.affinity().is_numeric() {
                debug!(
                    "Skipping non-numeric column {} ({})",
                    column.name, column.decl_type
                );
                continue;
            }
            let description = descriptions.remove(&column.name);
            indicators.push(Indicator::new(column.name, description));
        }

        if indicators.is_empty() {
            return Err(QueryError::schema(format!(
                "table {} has no indicator columns",
                layout.indicator_table
            )));
        }

        if !descriptions.is_empty() {
            debug!(
                "Ignoring {} dictionary entries without a matching column",
                descriptions.len()
            );
        }

        Ok(Self::from_indicators(indicators))
    }

    fn from_indicators(indicators: Vec<Indicator>) -> Self {
        let index = indicators
            .iter()
            .enumerate()
            .map(|(i, ind)| (ind.name().to_string(), i))
            .collect();
        Self { indicators, index }
    }

    pub fn indicators(&self) -> &[Indicator] {
        &self.indicators
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.indicators.iter().map(Indicator::name)
    }

    pub fn get(&self, name: &str) -> Option<&Indicator> {
        self.index.get(name).map(|&i| &self.indicators[i])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Look up `name` on the allow-list
    pub fn resolve(&self, name: &str) -> Result<&Indicator> {
        self.get(name)
            .ok_or_else(|| QueryError::UnknownIndicator(name.to_string()))
    }

    pub fn len(&self) -> usize {
        self.indicators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indicators.is_empty()
    }
}

/// Fetch the columns of `expected.name`, failing if the table or any expected column is missing
fn require_table(reader: &impl Reader, expected: &TableSchema) -> Result<Vec<ColumnInfo>> {
    let columns = reader.table_columns(&expected.name)?;
    if columns.is_empty() {
        return Err(QueryError::schema(format!(
            "table {} not found",
            expected.name
        )));
    }

    for name in expected.column_names() {
        if !columns.iter().any(|c| c.name == name) {
            return Err(QueryError::schema(format!(
                "table {} is missing column {}",
                expected.name, name
            )));
        }
    }

    Ok(columns)
}

/// Read the optional dictionary table
fn load_dictionary(reader: &impl Reader, layout: &StoreLayout) -> Result<HashMap<String, String>> {
    let schema = dictionary_table(layout);
    if reader.table_columns(&schema.name)?.is_empty() {
        warn!(
            "Dictionary table {} not found, indicators will have no descriptions",
            schema.name
        );
        return Ok(HashMap::new());
    }
    require_table(reader, &schema)?;

    let columns: Vec<_> = schema.column_names().map(quote_ident).collect();
    let sql = format!(
        "SELECT {} FROM {}",
        columns.join(", "),
        quote_ident(&schema.name)
    );

    let mut seen = HashSet::new();
    let mut entries = HashMap::new();
    for row in reader.query(&sql, &[])? {
        let (name, description) = match (row.first(), row.get(1)) {
            (Some(Value::Text(name)), Some(Value::Text(text))) => (name, Some(text)),
            (Some(Value::Text(name)), Some(Value::Null)) => (name, None),
            _ => {
                return Err(QueryError::schema(format!(
                    "dictionary table {} holds a non-text entry",
                    schema.name
                )))
            }
        };

        if !seen.insert(name.clone()) {
            return Err(QueryError::schema(format!(
                "dictionary table {} has more than one entry for {}",
                schema.name, name
            )));
        }
        if let Some(text) = description {
            entries.insert(name.clone(), text.clone());
        }
    }

    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reader::SqliteReader;
    use rusqlite::Connection;

    fn reader(sql: &str) -> SqliteReader {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(sql).unwrap();
        SqliteReader::from_connection(conn)
    }

    const GEOMETRY: &str =
        "CREATE TABLE municipalities (code_muni INTEGER PRIMARY KEY, name_muni TEXT, geometry TEXT);";

    #[test]
    fn test_load_keeps_column_order_and_skips_structural() {
        let r = reader(&format!(
            "CREATE TABLE mape_municipios (ano INTEGER, id_municipio INTEGER, total_desastres REAL,
                 sigla_uf TEXT, pib DOUBLE, populacao BIGINT);
             {GEOMETRY}"
        ));
        let catalog = Catalog::load(&r, &StoreLayout::default()).unwrap();
        let names: Vec<_> = catalog.names().collect();
        assert_eq!(names, ["total_desastres", "pib", "populacao"]);
        assert!(!catalog.contains("ano"));
        assert!(!catalog.contains("sigla_uf"));
    }

    #[test]
    fn test_geometry_column_in_indicator_table_is_structural() {
        let r = reader(&format!(
            "CREATE TABLE mape_municipios (ano INTEGER, id_municipio INTEGER, geometry NUMERIC, x REAL);
             {GEOMETRY}"
        ));
        let catalog = Catalog::load(&r, &StoreLayout::default()).unwrap();
        assert_eq!(catalog.names().collect::<Vec<_>>(), ["x"]);
    }

    #[test]
    fn test_missing_tables_are_schema_errors() {
        let r = reader(GEOMETRY);
        let err = Catalog::load(&r, &StoreLayout::default()).unwrap_err();
        assert!(matches!(err, QueryError::Schema(ref m) if m.contains("mape_municipios")));

        let r = reader("CREATE TABLE mape_municipios (ano INTEGER, id_municipio INTEGER, x REAL);");
        let err = Catalog::load(&r, &StoreLayout::default()).unwrap_err();
        assert!(matches!(err, QueryError::Schema(ref m) if m.contains("municipalities")));
    }

    #[test]
    fn test_missing_structural_column_is_schema_error() {
        let r = reader(&format!(
            "CREATE TABLE mape_municipios (id_municipio INTEGER, x REAL); {GEOMETRY}"
        ));
        let err = Catalog::load(&r, &StoreLayout::default()).unwrap_err();
        assert!(matches!(err, QueryError::Schema(ref m) if m.contains("ano")));
    }

    #[test]
    fn test_no_indicator_columns_is_schema_error() {
        let r = reader(&format!(
            "CREATE TABLE mape_municipios (ano INTEGER, id_municipio INTEGER, nome TEXT); {GEOMETRY}"
        ));
        assert!(matches!(
            Catalog::load(&r, &StoreLayout::default()),
            Err(QueryError::Schema(_))
        ));
    }

    #[test]
    fn test_dictionary_descriptions() {
        let r = reader(&format!(
            "CREATE TABLE mape_municipios (ano INTEGER, id_municipio INTEGER, total_desastres REAL, pib REAL);
             {GEOMETRY}
             CREATE TABLE dicionario (nome_variavel TEXT, descricao TEXT);
             INSERT INTO dicionario VALUES ('total_desastres', 'Total de desastres naturais'),
                                           ('ausente', 'Sem coluna correspondente');"
        ));
        let catalog = Catalog::load(&r, &StoreLayout::default()).unwrap();
        assert_eq!(
            catalog.get("total_desastres").unwrap().description(),
            Some("Total de desastres naturais")
        );
        assert_eq!(catalog.get("pib").unwrap().description(), None);
        assert!(!catalog.contains("ausente"));
    }

    #[test]
    fn test_duplicate_dictionary_entry_is_schema_error() {
        let r = reader(&format!(
            "CREATE TABLE mape_municipios (ano INTEGER, id_municipio INTEGER, pib REAL);
             {GEOMETRY}
             CREATE TABLE dicionario (nome_variavel TEXT, descricao TEXT);
             INSERT INTO dicionario VALUES ('pib', 'um'), ('pib', 'dois');"
        ));
        let err = Catalog::load(&r, &StoreLayout::default()).unwrap_err();
        assert!(matches!(err, QueryError::Schema(ref m) if m.contains("more than one")));
    }

    #[test]
    fn test_duplicate_entry_with_null_description_is_schema_error() {
        let r = reader(&format!(
            "CREATE TABLE mape_municipios (ano INTEGER, id_municipio INTEGER, pib REAL);
             {GEOMETRY}
             CREATE TABLE dicionario (nome_variavel TEXT, descricao TEXT);
             INSERT INTO dicionario VALUES ('pib', NULL), ('pib', 'Produto'), ('pib', NULL);"
        ));
        let err = Catalog::load(&r, &StoreLayout::default()).unwrap_err();
        assert!(matches!(err, QueryError::Schema(ref m) if m.contains("more than one")));
    }

    #[test]
    fn test_null_description_leaves_indicator_undescribed() {
        let r = reader(&format!(
            "CREATE TABLE mape_municipios (ano INTEGER, id_municipio INTEGER, pib REAL);
             {GEOMETRY}
             CREATE TABLE dicionario (nome_variavel TEXT, descricao TEXT);
             INSERT INTO dicionario VALUES ('pib', NULL);"
        ));
        let catalog = Catalog::load(&r, &StoreLayout::default()).unwrap();
        assert_eq!(catalog.get("pib").unwrap().description(), None);
    }

    #[test]
    fn test_resolve_unknown_name() {
        let r = reader(&format!(
            "CREATE TABLE mape_municipios (ano INTEGER, id_municipio INTEGER, pib REAL); {GEOMETRY}"
        ));
        let catalog = Catalog::load(&r, &StoreLayout::default()).unwrap();
        assert!(catalog.resolve("pib").is_ok());
        assert!(matches!(
            catalog.resolve("pib\"; DROP TABLE x; --"),
            Err(QueryError::UnknownIndicator(_))
        ));
    }
}
