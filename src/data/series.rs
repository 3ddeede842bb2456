use std::collections::{BTreeMap, HashSet};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::filter::FilteredSubset;
use super::model::Observation;

// ---------------------------------------------------------------------------
// Indicator – which column a chart plots
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Indicator {
    StringencyIndex,
    NewCasesSmoothed,
}

impl Indicator {
    /// Axis label.
    pub fn label(self) -> &'static str {
        match self {
            Indicator::StringencyIndex => "Stringency index",
            Indicator::NewCasesSmoothed => "Daily Cases",
        }
    }

    /// The row's value, if present and a real number.
    pub fn value(self, obs: &Observation) -> Option<f64> {
        let v = match self {
            Indicator::StringencyIndex => obs.stringency_index,
            Indicator::NewCasesSmoothed => obs.new_cases_smoothed,
        };
        v.filter(|v| !v.is_nan())
    }
}

// ---------------------------------------------------------------------------
// Line series
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LinePoint {
    pub date: NaiveDate,
    pub value: f64,
}

/// One location's line.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineTrack {
    pub label: String,
    /// Ascending by date.
    pub points: Vec<LinePoint>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineSeries {
    pub indicator: Indicator,
    /// Ordered by label.
    pub tracks: Vec<LineTrack>,
}

impl LineSeries {
    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }
}

/// One track per location in the subset; rows without a value are skipped.
///
/// In single-location mode the subset only holds that location, so the
/// result has at most one track.
pub fn derive_line_series(subset: &FilteredSubset<'_>, indicator: Indicator) -> LineSeries {
    let mut by_location: BTreeMap<&str, Vec<LinePoint>> = BTreeMap::new();
    for row in subset.iter() {
        if let Some(value) = indicator.value(row) {
            by_location
                .entry(row.location.as_str())
                .or_default()
                .push(LinePoint {
                    date: row.date,
                    value,
                });
        }
    }

    let tracks = by_location
        .into_iter()
        .map(|(label, mut points)| {
            points.sort_by_key(|p| p.date);
            LineTrack {
                label: label.to_string(),
                points,
            }
        })
        .collect();

    LineSeries { indicator, tracks }
}

// ---------------------------------------------------------------------------
// Bar series
// ---------------------------------------------------------------------------

/// How the worldwide bar chart picks its `top_n` locations.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Truncation {
    /// The `top_n` largest values.
    #[default]
    ByValue,
    /// The first `top_n` distinct locations in row order, whatever their value.
    FirstEncountered,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BarOptions {
    /// Only applied in worldwide mode. `None` keeps every location.
    pub top_n: Option<usize>,
    pub truncation: Truncation,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BarEntry {
    pub label: String,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BarSeries {
    pub indicator: Indicator,
    pub as_of: NaiveDate,
    /// Descending by value, ties by label.
    pub entries: Vec<BarEntry>,
}

impl BarSeries {
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// One bar per location observed on `as_of`.
///
/// When a location has several rows that day, the first one counts.
pub fn derive_bar_series(
    subset: &FilteredSubset<'_>,
    indicator: Indicator,
    as_of: NaiveDate,
    options: &BarOptions,
) -> BarSeries {
    let mut seen: HashSet<&str> = HashSet::new();
    let mut candidates: Vec<(&str, Option<f64>)> = Vec::new();
    for row in subset.iter().filter(|r| r.date == as_of) {
        if seen.insert(row.location.as_str()) {
            candidates.push((row.location.as_str(), indicator.value(row)));
        }
    }

    let top_n = if subset.region().is_worldwide() {
        options.top_n
    } else {
        None
    };

    if let (Some(n), Truncation::FirstEncountered) = (top_n, options.truncation) {
        candidates.truncate(n);
    }

    let mut entries: Vec<BarEntry> = candidates
        .into_iter()
        .filter_map(|(label, value)| {
            value.map(|value| BarEntry {
                label: label.to_string(),
                value,
            })
        })
        .collect();

    entries.sort_by(|a, b| {
        b.value
            .total_cmp(&a.value)
            .then_with(|| a.label.cmp(&b.label))
    });

    if let (Some(n), Truncation::ByValue) = (top_n, options.truncation) {
        entries.truncate(n);
    }

    BarSeries {
        indicator,
        as_of,
        entries,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::filter::{filter, DateRange, FilterCriteria, RegionSelector, ValueRange};
    use crate::data::fixtures::{date, obs, small_world, ObservationExt};
    use crate::data::model::CovidDataset;

    fn everything(region: RegionSelector) -> FilterCriteria {
        FilterCriteria::new(
            region,
            ValueRange::new(0.0, f64::MAX),
            ValueRange::new(0.0, f64::MAX),
            DateRange::new(date("2021-01-01"), date("2021-01-03")),
        )
        .unwrap()
    }

    fn labels(series: &BarSeries) -> Vec<&str> {
        series.entries.iter().map(|e| e.label.as_str()).collect()
    }

    fn top(n: usize, truncation: Truncation) -> BarOptions {
        BarOptions {
            top_n: Some(n),
            truncation,
        }
    }

    #[test]
    fn line_tracks_are_grouped_and_date_ordered() {
        let ds = CovidDataset::from_observations(vec![
            obs("CAN", "Canada", "2021-01-03").with_stringency(65.0),
            obs("USA", "United States", "2021-01-02").with_stringency(72.0),
            obs("CAN", "Canada", "2021-01-01").with_stringency(60.0),
            obs("USA", "United States", "2021-01-01").with_stringency(70.0),
        ]);
        let subset = filter(&ds.observations, &everything(RegionSelector::Worldwide));
        let series = derive_line_series(&subset, Indicator::StringencyIndex);

        assert_eq!(series.tracks.len(), 2);
        let canada = &series.tracks[0];
        assert_eq!(canada.label, "Canada");
        assert_eq!(
            canada.points,
            vec![
                LinePoint {
                    date: date("2021-01-01"),
                    value: 60.0
                },
                LinePoint {
                    date: date("2021-01-03"),
                    value: 65.0
                },
            ]
        );
        assert_eq!(series.tracks[1].label, "United States");
    }

    #[test]
    fn single_location_gives_one_track() {
        let ds = small_world();
        let subset = filter(
            &ds.observations,
            &everything(RegionSelector::Location("Canada".to_string())),
        );
        let series = derive_line_series(&subset, Indicator::StringencyIndex);
        assert_eq!(series.tracks.len(), 1);
        let values: Vec<f64> = series.tracks[0].points.iter().map(|p| p.value).collect();
        assert_eq!(values, vec![60.0, 61.0, 65.0]);
    }

    #[test]
    fn missing_values_leave_gaps_not_zeros() {
        let mut blank = obs("USA", "United States", "2021-01-02");
        blank.stringency_index = None;
        let ds = CovidDataset::from_observations(vec![
            obs("USA", "United States", "2021-01-01"),
            blank,
        ]);
        let subset = filter(&ds.observations, &everything(RegionSelector::Worldwide));
        let series = derive_line_series(&subset, Indicator::StringencyIndex);
        assert_eq!(series.tracks[0].points.len(), 1);
    }

    #[test]
    fn bars_are_sorted_descending_with_label_ties() {
        let ds = CovidDataset::from_observations(vec![
            obs("BBB", "Bravo", "2021-01-01").with_cases(5.0),
            obs("CCC", "Charlie", "2021-01-01").with_cases(9.0),
            obs("AAA", "Alpha", "2021-01-01").with_cases(5.0),
        ]);
        let subset = filter(&ds.observations, &everything(RegionSelector::Worldwide));
        let series = derive_bar_series(
            &subset,
            Indicator::NewCasesSmoothed,
            date("2021-01-01"),
            &BarOptions::default(),
        );
        assert_eq!(labels(&series), vec!["Charlie", "Alpha", "Bravo"]);
        assert!(series
            .entries
            .windows(2)
            .all(|w| w[0].value >= w[1].value));
    }

    #[test]
    fn top_n_by_value_keeps_the_largest() {
        let ds = small_world();
        let subset = filter(&ds.observations, &everything(RegionSelector::Worldwide));
        let series = derive_bar_series(
            &subset,
            Indicator::NewCasesSmoothed,
            date("2021-01-03"),
            &top(7, Truncation::ByValue),
        );
        assert_eq!(
            labels(&series),
            vec![
                "United States",
                "Canada",
                "Small 8",
                "Small 7",
                "Small 6",
                "Small 5",
                "Small 4"
            ]
        );
    }

    #[test]
    fn top_n_first_encountered_keeps_row_order_then_sorts() {
        let ds = small_world();
        let subset = filter(&ds.observations, &everything(RegionSelector::Worldwide));
        let series = derive_bar_series(
            &subset,
            Indicator::NewCasesSmoothed,
            date("2021-01-03"),
            &top(7, Truncation::FirstEncountered),
        );
        assert_eq!(
            labels(&series),
            vec![
                "United States",
                "Canada",
                "Small 5",
                "Small 4",
                "Small 3",
                "Small 2",
                "Small 1"
            ]
        );
    }

    #[test]
    fn single_location_bar_is_never_truncated_away() {
        let ds = small_world();
        let subset = filter(
            &ds.observations,
            &everything(RegionSelector::Location("Small 1".to_string())),
        );
        let series = derive_bar_series(
            &subset,
            Indicator::NewCasesSmoothed,
            date("2021-01-03"),
            &top(0, Truncation::ByValue),
        );
        assert_eq!(
            series.entries,
            vec![BarEntry {
                label: "Small 1".to_string(),
                value: 10.0
            }]
        );
    }

    #[test]
    fn no_row_on_the_date_is_an_empty_series() {
        let ds = small_world();
        let subset = filter(&ds.observations, &everything(RegionSelector::Worldwide));
        let series = derive_bar_series(
            &subset,
            Indicator::NewCasesSmoothed,
            date("2021-06-01"),
            &top(7, Truncation::ByValue),
        );
        assert!(series.is_empty());
    }

    #[test]
    fn first_row_wins_for_duplicate_location() {
        let ds = CovidDataset::from_observations(vec![
            obs("USA", "United States", "2021-01-01").with_cases(1.0),
            obs("USA", "United States", "2021-01-01").with_cases(99.0),
        ]);
        let subset = filter(&ds.observations, &everything(RegionSelector::Worldwide));
        let series = derive_bar_series(
            &subset,
            Indicator::NewCasesSmoothed,
            date("2021-01-01"),
            &BarOptions::default(),
        );
        assert_eq!(series.entries.len(), 1);
        assert_eq!(series.entries[0].value, 1.0);
    }
}
