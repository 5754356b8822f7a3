//! Query layer: turns an indicator/year selection into the result sets
//! behind each dashboard view.
//!
//! Every result set returned here is complete and plottable: null values,
//! missing geometries and non-positive yearly totals are filtered out before
//! rows leave this module. Indicator names are checked against the
//! [`Catalog`] before any SQL is built, so an unknown name never reaches the
//! store.

pub mod rows;
pub mod sql;

pub use rows::{ChoroplethRow, Geometry, GeometryKind, ScatterRow, SeriesPoint};

use log::{debug, info};
use once_cell::unsync::OnceCell;
use rusqlite::types::Value;
use serde::Serialize;
use std::fmt;

use crate::config::{
    StoreLayout, GEOMETRY_COLUMN, MUNICIPALITY_ID_COLUMN, MUNICIPALITY_NAME_COLUMN, YEAR_COLUMN,
};
use crate::error::{QueryError, Result};
use crate::reader::Reader;
use crate::schema::{Catalog, Indicator};

/// Dashboard views fed by the query layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum View {
    Choropleth,
    TimeSeries,
    Scatter,
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            View::Choropleth => write!(f, "choropleth"),
            View::TimeSeries => write!(f, "time series"),
            View::Scatter => write!(f, "scatter"),
        }
    }
}

/// Read-only query layer over an injected [`Reader`]
pub struct QueryLayer<R> {
    reader: R,
    layout: StoreLayout,
    catalog: OnceCell<Catalog>,
}

impl<R: Reader> QueryLayer<R> {
    pub fn new(reader: R, layout: StoreLayout) -> Result<Self> {
        layout.validate()?;
        Ok(Self {
            reader,
            layout,
            catalog: OnceCell::new(),
        })
    }

    pub fn reader(&self) -> &R {
        &self.reader
    }

    pub fn layout(&self) -> &StoreLayout {
        &self.layout
    }

    /// Indicator catalog, introspected on first use and cached afterwards
    pub fn catalog(&self) -> Result<&Catalog> {
        self.catalog.get_or_try_init(|| -> Result<Catalog> {
            let catalog = Catalog::load(&self.reader, &self.layout)?;
            info!(
                "Loaded {} indicators from {}",
                catalog.len(),
                self.layout.indicator_table
            );
            Ok(catalog)
        })
    }

    /// Drop the cached catalog so the next call introspects the store again
    pub fn invalidate(&mut self) {
        if self.catalog.take().is_some() {
            debug!("Indicator catalog invalidated");
        }
    }

    /// Names of the selectable indicators, in column order
    pub fn list_indicators(&self) -> Result<Vec<String>> {
        Ok(self.catalog()?.names().map(str::to_string).collect())
    }

    /// Dictionary description of `indicator`, if it has one
    pub fn describe(&self, indicator: &str) -> Result<Option<&str>> {
        Ok(self.catalog()?.resolve(indicator)?.description())
    }

    fn resolve(&self, indicator: &str) -> Result<&Indicator> {
        self.catalog()?.resolve(indicator)
    }

    /// Years with at least one non-null value of `indicator`, ascending
    pub fn valid_years(&self, indicator: &str) -> Result<Vec<i32>> {
        let indicator = self.resolve(indicator)?;
        let sql = sql::valid_years(&self.layout, indicator);

        self.reader
            .query(&sql, &[])?
            .iter()
            .map(|row| rows::get_year(row, 0, YEAR_COLUMN).map_err(QueryError::from))
            .collect()
    }

    /// Non-null values for `year` joined to municipality geometries
    pub fn choropleth_data(&self, indicator: &str, year: i32) -> Result<Vec<ChoroplethRow>> {
        let indicator = self.resolve(indicator)?;
        let sql = sql::choropleth(&self.layout, indicator);

        let rows = self
            .reader
            .query(&sql, &[Value::Integer(year.into())])?
            .iter()
            .map(|row| -> Result<ChoroplethRow> {
                Ok(ChoroplethRow {
                    municipality_id: rows::get_i64(row, 0, MUNICIPALITY_ID_COLUMN)?,
                    municipality_name: rows::get_opt_text(row, 1, MUNICIPALITY_NAME_COLUMN)?
                        .unwrap_or_default(),
                    value: rows::get_f64(row, 2, "indicator")?,
                    geometry: rows::get_geometry(row, 3, GEOMETRY_COLUMN)?,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        debug!(
            "Choropleth {} {}: {} municipalities",
            indicator.name(),
            year,
            rows.len()
        );
        Ok(rows)
    }

    /// Yearly totals of `indicator`, keeping only strictly positive sums
    pub fn time_series(&self, indicator: &str) -> Result<Vec<SeriesPoint>> {
        let indicator = self.resolve(indicator)?;
        let sql = sql::time_series(&self.layout, indicator);

        self.reader
            .query(&sql, &[Value::Integer(0)])?
            .iter()
            .map(|row| -> Result<SeriesPoint> {
                Ok(SeriesPoint {
                    year: rows::get_year(row, 0, YEAR_COLUMN)?,
                    total: rows::get_f64(row, 1, "total")?,
                })
            })
            .collect()
    }

    /// Municipalities with both indicators present for `year`
    pub fn scatter_data(&self, x: &str, y: &str, year: i32) -> Result<Vec<ScatterRow>> {
        let catalog = self.catalog()?;
        let x = catalog.resolve(x)?;
        let y = catalog.resolve(y)?;
        let sql = sql::scatter(&self.layout, x, y);

        let rows = self
            .reader
            .query(&sql, &[Value::Integer(year.into())])?
            .iter()
            .map(|row| -> Result<ScatterRow> {
                Ok(ScatterRow {
                    municipality_id: rows::get_i64(row, 0, MUNICIPALITY_ID_COLUMN)?,
                    municipality_name: rows::get_opt_text(row, 1, MUNICIPALITY_NAME_COLUMN)?,
                    x: rows::get_f64(row, 2, "x")?,
                    y: rows::get_f64(row, 3, "y")?,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        debug!(
            "Scatter {} x {} {}: {} municipalities",
            x.name(),
            y.name(),
            year,
            rows.len()
        );
        Ok(rows)
    }
}
