//! Headless front end: run one dashboard interaction and print both series as JSON.

use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use clap::Parser;

use covid_dash::config::DashboardConfig;
use covid_dash::data::filter::{DateRange, FilterCriteria, RegionSelector, ValueRange};
use covid_dash::data::loader::{load_file, LoadOptions};
use covid_dash::data::query::{query, QuerySettings};
use covid_dash::data::series::{BarOptions, Truncation};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Dataset file (.csv or .parquet); falls back to the config file
    #[arg(short, long, value_name = "FILE")]
    data: Option<PathBuf>,

    /// TOML configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Country name, or "Worldwide" for the population/GDP filter
    #[arg(long, default_value = RegionSelector::WORLDWIDE_LABEL)]
    country: String,

    #[arg(long, num_args = 2, value_names = ["LOW", "HIGH"])]
    population: Option<Vec<f64>>,

    #[arg(long, num_args = 2, value_names = ["LOW", "HIGH"])]
    gdp: Option<Vec<f64>>,

    /// First day (YYYY-MM-DD); defaults to the first day in the data
    #[arg(long)]
    start: Option<NaiveDate>,

    /// Last day and bar-chart date (YYYY-MM-DD); defaults to the last day in the data
    #[arg(long)]
    end: Option<NaiveDate>,

    /// Keep the first N countries in row order instead of the N largest
    #[arg(long)]
    first_encountered: bool,

    #[arg(long)]
    pretty: bool,
}

fn pair(values: Option<Vec<f64>>, default: [f64; 2]) -> ValueRange {
    match values.as_deref() {
        Some([low, high]) => ValueRange::new(*low, *high),
        _ => ValueRange::new(default[0], default[1]),
    }
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let config = DashboardConfig::load_or_default(cli.config.as_deref())?;

    let Some(path) = cli.data.or(config.data.path) else {
        bail!("No dataset given: pass --data or set [data] path in the config");
    };
    let options = LoadOptions {
        aggregate_prefix: config.data.aggregate_prefix,
    };
    let dataset = load_file(&path, &options)
        .with_context(|| format!("Failed to load dataset {:?}", path))?;

    let Some((first, last)) = dataset.date_span else {
        bail!("Dataset {:?} has no observations", path);
    };

    let criteria = FilterCriteria::new(
        RegionSelector::from_label(&cli.country),
        pair(cli.population, config.defaults.population),
        pair(cli.gdp, config.defaults.gdp_per_capita),
        DateRange::new(cli.start.unwrap_or(first), cli.end.unwrap_or(last)),
    )
    .context("Invalid filter")?;

    let settings = QuerySettings {
        bar: BarOptions {
            top_n: Some(config.defaults.top_n),
            truncation: if cli.first_encountered {
                Truncation::FirstEncountered
            } else {
                config.defaults.truncation
            },
        },
        ..QuerySettings::default()
    };

    let view = query(&dataset, &criteria, &settings);

    let stdout = io::stdout();
    let mut out = stdout.lock();
    if cli.pretty {
        serde_json::to_writer_pretty(&mut out, &view)?;
    } else {
        serde_json::to_writer(&mut out, &view)?;
    }
    writeln!(out)?;
    Ok(())
}
