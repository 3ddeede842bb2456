mod app;
mod color;
mod state;
mod ui;

use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use eframe::egui;

use app::CovidDashApp;
use covid_dash::config::DashboardConfig;
use covid_dash::data::loader::load_file;
use state::AppState;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Dataset to load at startup (.csv or .parquet)
    #[arg(short, long, value_name = "FILE")]
    data: Option<PathBuf>,

    /// TOML configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let mut config = DashboardConfig::load_or_default(cli.config.as_deref())?;
    if let Some(data) = cli.data {
        config.data.path = Some(data);
    }

    let window = config.window.clone();
    let startup_path = config.data.path.clone();
    let mut state = AppState::new(config);

    // A dataset named up front must load; without it there is nothing to show.
    if let Some(path) = startup_path {
        let dataset = load_file(&path, &state.load_options())
            .with_context(|| format!("Failed to load dataset {:?}", path))?;
        state.set_dataset(dataset);
    }

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([window.width, window.height])
            .with_min_inner_size([800.0, 500.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Covid Visualisation",
        options,
        Box::new(|_cc| Ok(Box::new(CovidDashApp::new(state)))),
    )
    .map_err(|e| anyhow!("{e}"))
}
