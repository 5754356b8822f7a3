use anyhow::{Context, Result};
use log::info;
use mape_municipios::{
    cli::{Cli, Commands},
    config::resolve_db_path,
    dashboard::Dashboard,
    query::QueryLayer,
    reader::SqliteReader,
    session::SelectionRequest,
    writer::StoreWriter,
};
use serde::Serialize;
use std::time::Instant;

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let text = serde_json::to_string_pretty(value).context("Failed to serialize output")?;
    println!("{}", text);
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse_args();

    let default_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    let start = Instant::now();
    let store = cli.store;
    let open = || -> Result<QueryLayer<SqliteReader>> {
        let db_path = resolve_db_path(store.db.clone())?;
        let reader = SqliteReader::open(&db_path)?;
        Ok(QueryLayer::new(reader, store.layout())?)
    };

    match cli.command {
        Commands::Init {
            output_db,
            indicators,
        } => {
            let names: Vec<&str> = indicators.iter().map(String::as_str).collect();
            let writer = StoreWriter::create(&output_db, &store.layout(), &names)?;
            writer.finalize()?;
            println!(
                "Created {:?} with {} indicator columns",
                output_db,
                names.len()
            );
        }

        Commands::Indicators => {
            let layer = open()?;
            print_json(&layer.catalog()?.indicators())?;
        }

        Commands::Years { indicator } => {
            print_json(&open()?.valid_years(&indicator)?)?;
        }

        Commands::Choropleth { indicator, year } => {
            print_json(&open()?.choropleth_data(&indicator, year)?)?;
        }

        Commands::Series { indicator } => {
            print_json(&open()?.time_series(&indicator)?)?;
        }

        Commands::Scatter { x, y, year } => {
            print_json(&open()?.scatter_data(&x, &y, year)?)?;
        }

        Commands::Dashboard {
            indicator,
            year,
            secondary,
        } => {
            let layer = open()?;
            let request = SelectionRequest {
                primary: indicator,
                year,
                secondary,
            };
            let selection = request.resolve(&layer)?;
            let view = Dashboard::new(&layer).render(selection)?;
            print_json(&view)?;
        }
    }

    info!("Done in {:.3}s", start.elapsed().as_secs_f64());
    Ok(())
}
