//! Hand-built observations for unit tests.

use chrono::NaiveDate;

use super::model::{CovidDataset, Observation};

pub fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

/// A fully populated row: 10M people, 10k GDP, stringency 50, 100 cases.
pub fn obs(iso: &str, location: &str, day: &str) -> Observation {
    Observation {
        iso_code: iso.to_string(),
        location: location.to_string(),
        date: date(day),
        continent: Some("Testland".to_string()),
        new_cases_smoothed: Some(100.0),
        stringency_index: Some(50.0),
        population: Some(10e6),
        gdp_per_capita: Some(10_000.0),
    }
}

pub trait ObservationExt {
    fn with_population(self, v: f64) -> Self;
    fn with_gdp(self, v: f64) -> Self;
    fn with_stringency(self, v: f64) -> Self;
    fn with_cases(self, v: f64) -> Self;
}

impl ObservationExt for Observation {
    fn with_population(mut self, v: f64) -> Self {
        self.population = Some(v);
        self
    }

    fn with_gdp(mut self, v: f64) -> Self {
        self.gdp_per_capita = Some(v);
        self
    }

    fn with_stringency(mut self, v: f64) -> Self {
        self.stringency_index = Some(v);
        self
    }

    fn with_cases(mut self, v: f64) -> Self {
        self.new_cases_smoothed = Some(v);
        self
    }
}

/// Two countries over three days plus a handful of smaller ones on the
/// last day, enough to exercise top-N truncation.
pub fn small_world() -> CovidDataset {
    let mut rows = Vec::new();
    for (day, us_s, ca_s) in [
        ("2021-01-01", 70.0, 60.0),
        ("2021-01-02", 72.0, 61.0),
        ("2021-01-03", 75.0, 65.0),
    ] {
        rows.push(
            obs("USA", "United States", day)
                .with_population(330e6)
                .with_gdp(60_000.0)
                .with_stringency(us_s)
                .with_cases(us_s * 1_000.0),
        );
        rows.push(
            obs("CAN", "Canada", day)
                .with_population(38e6)
                .with_gdp(45_000.0)
                .with_stringency(ca_s)
                .with_cases(ca_s * 100.0),
        );
    }
    // Eight small countries, cases 10, 20, ... 80 in file order.
    for i in 1..=8 {
        rows.push(
            obs(&format!("S{i:02}"), &format!("Small {i}"), "2021-01-03")
                .with_population(5e6)
                .with_gdp(8_000.0)
                .with_cases(i as f64 * 10.0),
        );
    }
    CovidDataset::from_observations(rows)
}
