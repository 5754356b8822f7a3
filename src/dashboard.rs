//! The boundary the presentation layer renders from.
//!
//! Each view is evaluated independently. A view with no rows becomes
//! [`Chart::NoData`] and a view whose query fails becomes
//! [`Chart::Unavailable`]; neither affects the other views. Only fatal
//! errors (schema, unknown indicator, lost connection) abort the render.

use log::warn;
use serde::Serialize;

use crate::error::{QueryError, Result};
use crate::query::{ChoroplethRow, QueryLayer, ScatterRow, SeriesPoint, View};
use crate::reader::Reader;
use crate::schema::Indicator;
use crate::session::Selection;

/// State of a single chart
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Chart<T> {
    Ready { data: T },
    NoData { message: String },
    Unavailable { message: String },
}

impl<T> Chart<T> {
    pub fn is_ready(&self) -> bool {
        matches!(self, Chart::Ready { .. })
    }

    pub fn data(&self) -> Option<&T> {
        match self {
            Chart::Ready { data } => Some(data),
            _ => None,
        }
    }
}

/// Ordinary least squares fit `y = slope * x + intercept`
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TrendLine {
    pub slope: f64,
    pub intercept: f64,
    pub r_squared: f64,
}

impl TrendLine {
    /// Fit over the scatter rows; `None` when x has no spread
    pub fn fit(rows: &[ScatterRow]) -> Option<Self> {
        if rows.len() < 2 {
            return None;
        }
        let n = rows.len() as f64;
        let mean_x = rows.iter().map(|r| r.x).sum::<f64>() / n;
        let mean_y = rows.iter().map(|r| r.y).sum::<f64>() / n;

        let (mut sxx, mut sxy, mut syy) = (0.0, 0.0, 0.0);
        for r in rows {
            let dx = r.x - mean_x;
            let dy = r.y - mean_y;
            sxx += dx * dx;
            sxy += dx * dy;
            syy += dy * dy;
        }

        if sxx == 0.0 {
            return None;
        }

        let slope = sxy / sxx;
        let intercept = mean_y - slope * mean_x;
        // A flat y is fitted exactly by the horizontal line
        let r_squared = if syy == 0.0 {
            1.0
        } else {
            (sxy * sxy) / (sxx * syy)
        };

        Some(Self {
            slope,
            intercept,
            r_squared,
        })
    }

    pub fn predict(&self, x: f64) -> f64 {
        self.slope * x + self.intercept
    }
}

/// Scatter rows plus their trend line
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScatterPanel {
    pub rows: Vec<ScatterRow>,
    pub trend: Option<TrendLine>,
}

/// Everything the three charts need for one selection
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardView {
    pub selection: Selection,
    pub primary: Indicator,
    pub secondary: Indicator,
    pub choropleth: Chart<Vec<ChoroplethRow>>,
    pub time_series: Chart<Vec<SeriesPoint>>,
    pub scatter: Chart<ScatterPanel>,
}

/// Renders selections against a query layer
pub struct Dashboard<'a, R> {
    layer: &'a QueryLayer<R>,
}

impl<'a, R: Reader> Dashboard<'a, R> {
    pub fn new(layer: &'a QueryLayer<R>) -> Self {
        Self { layer }
    }

    pub fn render(&self, selection: Selection) -> Result<DashboardView> {
        let catalog = self.layer.catalog()?;
        let primary = catalog.resolve(&selection.primary)?.clone();
        let secondary = catalog.resolve(&selection.secondary)?.clone();
        let year = selection.year;

        let choropleth = chart(
            View::Choropleth,
            self.layer.choropleth_data(primary.name(), year),
            |rows| rows.is_empty(),
            || format!("no municipality has {} and a boundary in {}", primary.name(), year),
        )?;

        let time_series = chart(
            View::TimeSeries,
            self.layer.time_series(primary.name()),
            |points| points.is_empty(),
            || format!("{} has no year with a positive total", primary.name()),
        )?;

        let scatter = chart(
            View::Scatter,
            self.layer
                .scatter_data(primary.name(), secondary.name(), year)
                .map(|rows| ScatterPanel {
                    trend: TrendLine::fit(&rows),
                    rows,
                }),
            |panel| panel.rows.is_empty(),
            || {
                format!(
                    "no municipality has both {} and {} in {}",
                    primary.name(),
                    secondary.name(),
                    year
                )
            },
        )?;

        Ok(DashboardView {
            selection,
            primary,
            secondary,
            choropleth,
            time_series,
            scatter,
        })
    }
}

/// Wrap one view's result, propagating only fatal errors
fn chart<T>(
    view: View,
    result: Result<T>,
    is_empty: impl FnOnce(&T) -> bool,
    detail: impl FnOnce() -> String,
) -> Result<Chart<T>> {
    match result {
        Ok(data) if is_empty(&data) => {
            let err = QueryError::InsufficientData {
                view,
                detail: detail(),
            };
            Ok(Chart::NoData {
                message: err.to_string(),
            })
        }
        Ok(data) => Ok(Chart::Ready { data }),
        Err(err) if err.is_fatal() => Err(err),
        Err(err) => {
            warn!("The {} view is unavailable: {}", view, err);
            Ok(Chart::Unavailable {
                message: err.to_string(),
            })
        }
    }
}
