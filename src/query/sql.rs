//! SQL text for the view queries
//!
//! Identifiers are interpolated only from a validated [`Indicator`] or the
//! checked [`StoreLayout`], and are always quoted. Literal values are left
//! as `?N` placeholders for the caller to bind.

use crate::config::{
    StoreLayout, GEOMETRY_COLUMN, MUNICIPALITY_CODE_COLUMN, MUNICIPALITY_ID_COLUMN,
    MUNICIPALITY_NAME_COLUMN, YEAR_COLUMN,
};
use crate::schema::Indicator;

/// Quote an identifier, doubling embedded quotes
pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Predicate holding only for cells storing an actual number
///
/// Numeric columns may still hold text such as `''` or `'NA'`, which is
/// neither null nor plottable.
pub fn is_measured(expr: &str) -> String {
    format!("typeof({expr}) IN ('integer', 'real')")
}

/// Distinct years with a measured value, ascending
pub fn valid_years(layout: &StoreLayout, indicator: &Indicator) -> String {
    let year = quote_ident(YEAR_COLUMN);
    format!(
        "SELECT DISTINCT {year} FROM {table} \
         WHERE {year} IS NOT NULL AND {measured} \
         ORDER BY {year}",
        table = quote_ident(&layout.indicator_table),
        measured = is_measured(&quote_ident(indicator.name())),
    )
}

/// Values joined to geometries for year `?1`
pub fn choropleth(layout: &StoreLayout, indicator: &Indicator) -> String {
    let geometry = format!("g.{}", quote_ident(GEOMETRY_COLUMN));
    let value = format!("i.{}", quote_ident(indicator.name()));
    format!(
        "SELECT i.{id}, g.{name}, {value}, {geometry} \
         FROM {indicators} AS i \
         JOIN {geometries} AS g ON i.{id} = g.{code} \
         WHERE i.{year} = ?1 \
           AND {measured} \
           AND {geometry} IS NOT NULL \
           AND length({geometry}) > 0 \
         ORDER BY i.{id}",
        id = quote_ident(MUNICIPALITY_ID_COLUMN),
        name = quote_ident(MUNICIPALITY_NAME_COLUMN),
        code = quote_ident(MUNICIPALITY_CODE_COLUMN),
        year = quote_ident(YEAR_COLUMN),
        indicators = quote_ident(&layout.indicator_table),
        geometries = quote_ident(&layout.geometry_table),
        measured = is_measured(&value),
    )
}

/// Yearly sums strictly greater than `?1`, ascending
pub fn time_series(layout: &StoreLayout, indicator: &Indicator) -> String {
    let year = quote_ident(YEAR_COLUMN);
    let value = quote_ident(indicator.name());
    format!(
        "SELECT {year}, SUM({value}) FROM {table} \
         WHERE {year} IS NOT NULL AND {measured} \
         GROUP BY {year} \
         HAVING SUM({value}) > ?1 \
         ORDER BY {year}",
        table = quote_ident(&layout.indicator_table),
        measured = is_measured(&value),
    )
}

/// Rows with both values present for year `?1`, labelled with municipality names
pub fn scatter(layout: &StoreLayout, x: &Indicator, y: &Indicator) -> String {
    let x = format!("i.{}", quote_ident(x.name()));
    let y = format!("i.{}", quote_ident(y.name()));
    format!(
        "SELECT i.{id}, g.{name}, {x}, {y} \
         FROM {indicators} AS i \
         LEFT JOIN {geometries} AS g ON i.{id} = g.{code} \
         WHERE i.{year} = ?1 \
           AND {x_measured} \
           AND {y_measured} \
         ORDER BY i.{id}",
        id = quote_ident(MUNICIPALITY_ID_COLUMN),
        name = quote_ident(MUNICIPALITY_NAME_COLUMN),
        code = quote_ident(MUNICIPALITY_CODE_COLUMN),
        year = quote_ident(YEAR_COLUMN),
        indicators = quote_ident(&layout.indicator_table),
        geometries = quote_ident(&layout.geometry_table),
        x_measured = is_measured(&x),
        y_measured = is_measured(&y),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn indicator(name: &str) -> Indicator {
        Indicator::new(name.to_string(), None)
    }

    #[test]
    fn test_quote_ident() {
        assert_eq!(quote_ident("ano"), "\"ano\"");
        assert_eq!(quote_ident("a\"b"), "\"a\"\"b\"");
    }

    #[test]
    fn test_valid_years_sql() {
        let sql = valid_years(&StoreLayout::default(), &indicator("total_desastres"));
        assert_eq!(
            sql,
            "SELECT DISTINCT \"ano\" FROM \"mape_municipios\" \
             WHERE \"ano\" IS NOT NULL AND typeof(\"total_desastres\") IN ('integer', 'real') \
             ORDER BY \"ano\""
        );
    }

    #[test]
    fn test_literals_are_placeholders() {
        let layout = StoreLayout::default();
        let ind = indicator("total_desastres");
        assert!(choropleth(&layout, &ind).contains("\"ano\" = ?1"));
        assert!(time_series(&layout, &ind).contains("> ?1"));
        assert!(scatter(&layout, &ind, &ind).contains("\"ano\" = ?1"));
    }

    #[test]
    fn test_choropleth_uses_inner_join_and_scatter_left_join() {
        let layout = StoreLayout::default();
        let ind = indicator("pib");
        let choro = choropleth(&layout, &ind);
        assert!(choro.contains(" JOIN \"municipalities\" AS g ON i.\"id_municipio\" = g.\"code_muni\""));
        assert!(!choro.contains("LEFT JOIN"));
        assert!(scatter(&layout, &ind, &ind).contains("LEFT JOIN"));
    }

    #[test]
    fn test_every_view_filters_on_stored_numbers() {
        let layout = StoreLayout::default();
        let ind = indicator("pib");
        let measured = "typeof(i.\"pib\") IN ('integer', 'real')";
        assert!(choropleth(&layout, &ind).contains(measured));
        assert!(scatter(&layout, &ind, &ind).contains(measured));
        for sql in [valid_years(&layout, &ind), time_series(&layout, &ind)] {
            assert!(sql.contains("typeof(\"pib\") IN ('integer', 'real')"));
            assert!(sql.contains("\"ano\" IS NOT NULL"));
            assert!(!sql.contains("\"pib\" IS NOT NULL"));
        }
    }
}
