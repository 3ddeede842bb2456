use std::path::Path;
use std::sync::Arc;

use chrono::NaiveDate;

use covid_dash::config::DashboardConfig;
use covid_dash::data::filter::{DateRange, FilterCriteria, RegionSelector, ValueRange};
use covid_dash::data::loader::{load_file, LoadOptions};
use covid_dash::data::model::CovidDataset;
use covid_dash::data::query::{query, DashboardView, QuerySettings};
use covid_dash::data::series::BarOptions;
use covid_dash::CriteriaError;

use crate::color::ColorMap;

// ---------------------------------------------------------------------------
// Control values
// ---------------------------------------------------------------------------

/// Raw widget values, possibly inconsistent (e.g. low above high).
#[derive(Debug, Clone, PartialEq)]
pub struct Controls {
    pub region: RegionSelector,
    pub population: [f64; 2],
    pub gdp_per_capita: [f64; 2],
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl Controls {
    fn from_config(config: &DashboardConfig) -> Self {
        Self {
            region: RegionSelector::Worldwide,
            population: config.defaults.population,
            gdp_per_capita: config.defaults.gdp_per_capita,
            start: NaiveDate::default(),
            end: NaiveDate::default(),
        }
    }

    pub fn criteria(&self) -> Result<FilterCriteria, CriteriaError> {
        FilterCriteria::new(
            self.region.clone(),
            ValueRange::new(self.population[0], self.population[1]),
            ValueRange::new(self.gdp_per_capita[0], self.gdp_per_capita[1]),
            DateRange::new(self.start, self.end),
        )
    }
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    pub config: DashboardConfig,

    /// Loaded dataset (None until a file is loaded). Never mutated once set.
    pub dataset: Option<Arc<CovidDataset>>,

    pub controls: Controls,

    /// Charts for the current controls; None while the controls are invalid.
    pub view: Option<DashboardView>,

    /// One colour per location.
    pub color_map: ColorMap,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl AppState {
    pub fn new(config: DashboardConfig) -> Self {
        Self {
            controls: Controls::from_config(&config),
            config,
            dataset: None,
            view: None,
            color_map: ColorMap::default(),
            status_message: None,
        }
    }

    pub fn load_options(&self) -> LoadOptions {
        LoadOptions {
            aggregate_prefix: self.config.data.aggregate_prefix.clone(),
        }
    }

    pub fn query_settings(&self) -> QuerySettings {
        QuerySettings {
            bar: BarOptions {
                top_n: Some(self.config.defaults.top_n),
                truncation: self.config.defaults.truncation,
            },
            ..QuerySettings::default()
        }
    }

    /// Ingest a newly loaded dataset, reset the controls and draw.
    pub fn set_dataset(&mut self, dataset: CovidDataset) {
        self.controls = Controls::from_config(&self.config);
        if let Some((first, last)) = dataset.date_span {
            self.controls.start = first;
            self.controls.end = last;
        }
        self.color_map = ColorMap::new(&dataset.locations);
        self.dataset = Some(Arc::new(dataset));
        self.status_message = None;
        self.recompute();
    }

    /// Load a file picked in the UI. Failures are shown, not fatal.
    pub fn open_file(&mut self, path: &Path) {
        match load_file(path, &self.load_options()) {
            Ok(dataset) => {
                log::info!(
                    "Loaded {} observations covering {} locations",
                    dataset.len(),
                    dataset.locations.len()
                );
                self.set_dataset(dataset);
            }
            Err(e) => {
                log::error!("Failed to load file: {e:#}");
                self.status_message = Some(format!("Error: {e:#}"));
            }
        }
    }

    /// Rebuild both charts after a control change.
    pub fn recompute(&mut self) {
        let Some(dataset) = &self.dataset else {
            return;
        };
        match self.controls.criteria() {
            Ok(criteria) => {
                self.view = Some(query(dataset, &criteria, &self.query_settings()));
                self.status_message = None;
            }
            Err(e) => {
                log::warn!("Rejected filter: {e}");
                self.view = None;
                self.status_message = Some(format!("Invalid filter: {e}"));
            }
        }
    }
}
