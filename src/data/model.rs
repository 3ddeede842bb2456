use std::collections::HashSet;

use chrono::NaiveDate;
use serde::Serialize;

// ---------------------------------------------------------------------------
// Observation – one row of the source table
// ---------------------------------------------------------------------------

/// One country on one day. Absent cells are `None`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Observation {
    pub iso_code: String,
    pub location: String,
    pub date: NaiveDate,
    pub continent: Option<String>,
    /// Seven-day rolling average of daily new cases.
    pub new_cases_smoothed: Option<f64>,
    /// Policy strictness score, 0–100.
    pub stringency_index: Option<f64>,
    pub population: Option<f64>,
    pub gdp_per_capita: Option<f64>,
}

// ---------------------------------------------------------------------------
// CovidDataset – the complete loaded table
// ---------------------------------------------------------------------------

/// The loaded table with pre-computed indices for the controls.
///
/// Built once by the loader and then only read.
#[derive(Debug, Clone, Default)]
pub struct CovidDataset {
    /// All observations in file order.
    pub observations: Vec<Observation>,
    /// Distinct locations in order of first appearance.
    pub locations: Vec<String>,
    /// Earliest and latest observation date.
    pub date_span: Option<(NaiveDate, NaiveDate)>,
    /// Smallest and largest known population.
    pub population_span: Option<(f64, f64)>,
    /// Smallest and largest known GDP per capita.
    pub gdp_span: Option<(f64, f64)>,
}

impl CovidDataset {
    /// Build the indices from the loaded observations.
    pub fn from_observations(observations: Vec<Observation>) -> Self {
        let mut seen: HashSet<&str> = HashSet::new();
        let mut locations = Vec::new();
        let mut date_span: Option<(NaiveDate, NaiveDate)> = None;
        let mut population_span = None;
        let mut gdp_span = None;

        for obs in &observations {
            if seen.insert(obs.location.as_str()) {
                locations.push(obs.location.clone());
            }
            date_span = Some(match date_span {
                Some((lo, hi)) => (lo.min(obs.date), hi.max(obs.date)),
                None => (obs.date, obs.date),
            });
            widen(&mut population_span, obs.population);
            widen(&mut gdp_span, obs.gdp_per_capita);
        }

        CovidDataset {
            observations,
            locations,
            date_span,
            population_span,
            gdp_span,
        }
    }

    /// Number of observations.
    pub fn len(&self) -> usize {
        self.observations.len()
    }

    /// Whether the dataset is empty.
    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }
}

fn widen(span: &mut Option<(f64, f64)>, value: Option<f64>) {
    let Some(v) = value.filter(|v| !v.is_nan()) else {
        return;
    };
    *span = Some(match *span {
        Some((lo, hi)) => (lo.min(v), hi.max(v)),
        None => (v, v),
    });
}
