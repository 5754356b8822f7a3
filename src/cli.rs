use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::config::StoreLayout;

#[derive(Parser, Debug)]
#[command(name = "mape-municipios")]
#[command(version, about = "Query Brazilian municipal indicators for the MAPE dashboard")]
pub struct Cli {
    #[command(flatten)]
    pub store: StoreArgs,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

/// Where the store lives and how its tables are named
#[derive(Args, Debug)]
pub struct StoreArgs {
    /// SQLite store path (default: platform data directory)
    #[arg(long, env = "MAPE_DB", global = true)]
    pub db: Option<PathBuf>,

    /// Indicator table name
    #[arg(long, default_value = "mape_municipios", global = true)]
    pub indicator_table: String,

    /// Geometry table name
    #[arg(long, default_value = "municipalities", global = true)]
    pub geometry_table: String,

    /// Dictionary table name
    #[arg(long, default_value = "dicionario", global = true)]
    pub dictionary_table: String,
}

impl StoreArgs {
    pub fn layout(&self) -> StoreLayout {
        StoreLayout {
            indicator_table: self.indicator_table.clone(),
            geometry_table: self.geometry_table.clone(),
            dictionary_table: self.dictionary_table.clone(),
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create an empty store with the expected schema
    Init {
        /// Output SQLite database path
        output_db: PathBuf,

        /// Indicator columns to create (comma-separated)
        #[arg(short, long, value_delimiter = ',', required = true)]
        indicators: Vec<String>,
    },

    /// List selectable indicators with their descriptions
    Indicators,

    /// Years with data for an indicator
    Years {
        indicator: String,
    },

    /// Map rows for an indicator and year
    Choropleth {
        indicator: String,

        #[arg(short, long)]
        year: i32,
    },

    /// Yearly totals for an indicator
    Series {
        indicator: String,
    },

    /// Paired values of two indicators for a year
    Scatter {
        x: String,

        y: String,

        #[arg(long)]
        year: i32,
    },

    /// Resolve a selection and evaluate all three views
    Dashboard {
        /// Primary indicator (default: total_desastres or the first one)
        #[arg(short, long)]
        indicator: Option<String>,

        /// Year (default: 2023 or the latest with data)
        #[arg(long)]
        year: Option<i32>,

        /// Indicator compared on the scatterplot
        #[arg(short, long)]
        secondary: Option<String>,
    },
}

impl Cli {
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
