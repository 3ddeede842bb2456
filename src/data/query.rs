//! The seam the dashboard calls on every parameter change.

use serde::Serialize;

use super::filter::{filter, FilterCriteria, RegionSelector};
use super::model::CovidDataset;
use super::series::{
    derive_bar_series, derive_line_series, BarOptions, BarSeries, Indicator, LineSeries,
};

pub const NO_MATCHES: &str = "No countries match your filters.";

/// Knobs that are not part of the filter itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuerySettings {
    pub line_indicator: Indicator,
    pub bar_indicator: Indicator,
    pub bar: BarOptions,
}

impl Default for QuerySettings {
    fn default() -> Self {
        Self {
            line_indicator: Indicator::StringencyIndex,
            bar_indicator: Indicator::NewCasesSmoothed,
            bar: BarOptions {
                top_n: Some(7),
                ..BarOptions::default()
            },
        }
    }
}

/// A chart plus its title and an optional notice shown under the title.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Chart<S> {
    pub title: String,
    pub notice: Option<String>,
    pub series: S,
}

/// Everything the two charts need for one interaction.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardView {
    pub region: RegionSelector,
    pub stringency: Chart<LineSeries>,
    pub new_cases: Chart<BarSeries>,
}

/// Filter once, then derive the line series over the date range and the bar
/// series as of its last day.
pub fn query(
    dataset: &CovidDataset,
    criteria: &FilterCriteria,
    settings: &QuerySettings,
) -> DashboardView {
    let subset = filter(&dataset.observations, criteria);
    log::debug!(
        "{} of {} rows match {:?}",
        subset.len(),
        dataset.len(),
        criteria.region()
    );

    let line = derive_line_series(&subset, settings.line_indicator);
    let bars = derive_bar_series(
        &subset,
        settings.bar_indicator,
        criteria.dates().end,
        &settings.bar,
    );

    let (line_title, bar_title) = match criteria.region() {
        RegionSelector::Location(name) => (
            format!("Stringency Index in {name}"),
            format!("Daily new cases in {name}"),
        ),
        RegionSelector::Worldwide => (
            "Stringency Index in the filtered countries".to_string(),
            "Top Daily new cases in the filtered countries".to_string(),
        ),
    };

    DashboardView {
        region: criteria.region().clone(),
        stringency: Chart {
            title: line_title,
            notice: line.is_empty().then(|| NO_MATCHES.to_string()),
            series: line,
        },
        new_cases: Chart {
            title: bar_title,
            notice: bars.is_empty().then(|| NO_MATCHES.to_string()),
            series: bars,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::filter::{DateRange, ValueRange};
    use crate::data::fixtures::{date, obs, small_world, ObservationExt};
    use crate::data::series::BarEntry;

    fn criteria(region: RegionSelector, pop: (f64, f64), gdp: (f64, f64)) -> FilterCriteria {
        FilterCriteria::new(
            region,
            ValueRange::new(pop.0, pop.1),
            ValueRange::new(gdp.0, gdp.1),
            DateRange::new(date("2021-01-01"), date("2021-01-01")),
        )
        .unwrap()
    }

    #[test]
    fn two_country_scenario() {
        let ds = CovidDataset::from_observations(vec![
            obs("USA", "United States", "2021-01-01")
                .with_population(330e6)
                .with_gdp(60_000.0)
                .with_stringency(70.0),
            obs("CAN", "Canada", "2021-01-01")
                .with_population(38e6)
                .with_gdp(45_000.0)
                .with_stringency(60.0),
        ]);
        let settings = QuerySettings {
            bar_indicator: Indicator::StringencyIndex,
            ..QuerySettings::default()
        };

        let view = query(
            &ds,
            &criteria(RegionSelector::Worldwide, (1e6, 400e6), (40_000.0, 70_000.0)),
            &settings,
        );

        assert_eq!(view.stringency.series.tracks.len(), 2);
        assert_eq!(view.stringency.notice, None);
        assert_eq!(
            view.new_cases.series.entries,
            vec![
                BarEntry {
                    label: "United States".to_string(),
                    value: 70.0
                },
                BarEntry {
                    label: "Canada".to_string(),
                    value: 60.0
                },
            ]
        );
        assert_eq!(view.new_cases.title, "Top Daily new cases in the filtered countries");
    }

    #[test]
    fn empty_filter_produces_notices_not_errors() {
        let ds = small_world();
        let view = query(
            &ds,
            &criteria(RegionSelector::Worldwide, (0.0, f64::MAX), (0.0, 1.0)),
            &QuerySettings::default(),
        );
        assert!(view.stringency.series.is_empty());
        assert!(view.new_cases.series.is_empty());
        assert_eq!(view.stringency.notice.as_deref(), Some(NO_MATCHES));
        assert_eq!(view.new_cases.notice.as_deref(), Some(NO_MATCHES));
    }

    #[test]
    fn single_country_titles_and_bar_as_of_end_date() {
        let ds = small_world();
        let c = FilterCriteria::new(
            RegionSelector::Location("Canada".to_string()),
            ValueRange::new(0.0, 1.0),
            ValueRange::new(0.0, 1.0),
            DateRange::new(date("2021-01-01"), date("2021-01-02")),
        )
        .unwrap();

        let view = query(&ds, &c, &QuerySettings::default());
        assert_eq!(view.stringency.title, "Stringency Index in Canada");
        assert_eq!(view.new_cases.title, "Daily new cases in Canada");
        assert_eq!(view.new_cases.series.as_of, date("2021-01-02"));
        assert_eq!(view.new_cases.series.entries.len(), 1);
        assert_eq!(view.new_cases.series.entries[0].value, 6_100.0);
    }

    #[test]
    fn worldwide_bars_never_exceed_seven() {
        let ds = small_world();
        let c = FilterCriteria::new(
            RegionSelector::Worldwide,
            ValueRange::new(0.0, f64::MAX),
            ValueRange::new(0.0, f64::MAX),
            DateRange::new(date("2021-01-01"), date("2021-01-03")),
        )
        .unwrap();
        let view = query(&ds, &c, &QuerySettings::default());
        assert_eq!(view.new_cases.series.entries.len(), 7);
    }

    #[test]
    fn view_serializes_to_json() {
        let ds = small_world();
        let view = query(
            &ds,
            &criteria(RegionSelector::Worldwide, (1e6, 400e6), (40_000.0, 70_000.0)),
            &QuerySettings::default(),
        );
        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["region"], "Worldwide");
        assert_eq!(json["new_cases"]["series"]["as_of"], "2021-01-01");
        assert_eq!(json["stringency"]["series"]["indicator"], "stringency_index");
    }
}
