use log::{info, warn};
use serde::Serialize;

use crate::config::{DEFAULT_INDICATOR, DEFAULT_YEAR};
use crate::error::{QueryError, Result};
use crate::query::QueryLayer;
use crate::reader::Reader;

/// What the user picked; anything left out gets a default
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionRequest {
    pub primary: Option<String>,
    pub year: Option<i32>,
    pub secondary: Option<String>,
}

/// A complete selection, checked against the store
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Selection {
    pub primary: String,
    pub year: i32,
    pub secondary: String,
    /// Years with data for the primary indicator
    pub valid_years: Vec<i32>,
    /// Indicators offered for comparison with the primary one
    pub secondary_candidates: Vec<String>,
}

impl SelectionRequest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn primary(mut self, name: impl Into<String>) -> Self {
        self.primary = Some(name.into());
        self
    }

    pub fn year(mut self, year: i32) -> Self {
        self.year = Some(year);
        self
    }

    pub fn secondary(mut self, name: impl Into<String>) -> Self {
        self.secondary = Some(name.into());
        self
    }

    /// Fill in defaults and validate against the store
    ///
    /// The year domain always comes from the resolved primary indicator. An
    /// indicator without any data yields [`QueryError::EmptyDomain`].
    pub fn resolve<R: Reader>(self, layer: &QueryLayer<R>) -> Result<Selection> {
        let catalog = layer.catalog()?;

        let primary = match self.primary {
            Some(name) => catalog.resolve(&name)?.name().to_string(),
            None if catalog.contains(DEFAULT_INDICATOR) => DEFAULT_INDICATOR.to_string(),
            None => catalog
                .names()
                .next()
                .map(str::to_string)
                .ok_or_else(|| QueryError::schema("no indicators available"))?,
        };

        let valid_years = layer.valid_years(&primary)?;
        let latest = match valid_years.last() {
            Some(&year) => year,
            None => {
                warn!("Indicator {} has no values", primary);
                return Err(QueryError::EmptyDomain { indicator: primary });
            }
        };

        let year = match self.year {
            Some(year) if valid_years.contains(&year) => year,
            Some(year) => {
                return Err(QueryError::YearOutOfDomain {
                    indicator: primary,
                    year,
                })
            }
            None if valid_years.contains(&DEFAULT_YEAR) => DEFAULT_YEAR,
            None => latest,
        };

        let secondary_candidates: Vec<String> = catalog
            .names()
            .filter(|name| *name != primary)
            .map(str::to_string)
            .collect();

        let secondary = match self.secondary {
            Some(name) => catalog.resolve(&name)?.name().to_string(),
            None => secondary_candidates
                .first()
                .cloned()
                .unwrap_or_else(|| primary.clone()),
        };

        info!(
            "Selection: {} ({}) against {}",
            primary, year, secondary
        );

        Ok(Selection {
            primary,
            year,
            secondary,
            valid_years,
            secondary_candidates,
        })
    }
}
