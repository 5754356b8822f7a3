//! Table definitions for the indicator, geometry and dictionary stores

use super::types::*;
use crate::config::{
    StoreLayout, DICTIONARY_DESCRIPTION_COLUMN, DICTIONARY_NAME_COLUMN, GEOMETRY_COLUMN,
    MUNICIPALITY_CODE_COLUMN, MUNICIPALITY_ID_COLUMN, MUNICIPALITY_NAME_COLUMN, YEAR_COLUMN,
};

/// Per-(year, municipality) indicator values
pub fn indicator_table(layout: &StoreLayout, indicators: &[&str]) -> TableSchema {
    let mut columns = vec![
        Column::required(YEAR_COLUMN, ColumnType::Integer),
        Column::required(MUNICIPALITY_ID_COLUMN, ColumnType::Integer),
    ];
    columns.extend(
        indicators
            .iter()
            .map(|name| Column::new(*name, ColumnType::Real)),
    );

    TableSchema {
        name: layout.indicator_table.clone(),
        columns,
        primary_key: vec![YEAR_COLUMN, MUNICIPALITY_ID_COLUMN],
    }
}

/// Municipality names and boundaries
pub fn geometry_table(layout: &StoreLayout) -> TableSchema {
    TableSchema {
        name: layout.geometry_table.clone(),
        columns: vec![
            Column::required(MUNICIPALITY_CODE_COLUMN, ColumnType::Integer),
            Column::new(MUNICIPALITY_NAME_COLUMN, ColumnType::Text),
            Column::new(GEOMETRY_COLUMN, ColumnType::Text),
        ],
        primary_key: vec![MUNICIPALITY_CODE_COLUMN],
    }
}

/// Indicator name -> description
pub fn dictionary_table(layout: &StoreLayout) -> TableSchema {
    TableSchema {
        name: layout.dictionary_table.clone(),
        columns: vec![
            Column::required(DICTIONARY_NAME_COLUMN, ColumnType::Text),
            Column::new(DICTIONARY_DESCRIPTION_COLUMN, ColumnType::Text),
        ],
        primary_key: vec![DICTIONARY_NAME_COLUMN],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_indicator_table_columns() {
        let schema = indicator_table(&StoreLayout::default(), &["total_desastres", "pib"]);
        assert_eq!(schema.name, "mape_municipios");
        let names: Vec<_> = schema.column_names().collect();
        assert_eq!(names, ["ano", "id_municipio", "total_desastres", "pib"]);
        assert!(!schema.columns[0].nullable);
        assert!(schema.columns[2].nullable);
    }

    #[test]
    fn test_geometry_table_key() {
        let schema = geometry_table(&StoreLayout::default());
        assert_eq!(schema.primary_key, ["code_muni"]);
    }
}
