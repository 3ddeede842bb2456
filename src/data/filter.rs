use chrono::NaiveDate;
use serde::Serialize;

use super::model::Observation;
use crate::error::CriteriaError;

// ---------------------------------------------------------------------------
// Filter criteria: what the parameter panel currently says
// ---------------------------------------------------------------------------

/// Which rows the charts are about.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub enum RegionSelector {
    /// Every country whose population and GDP fall within the ranges.
    Worldwide,
    /// One country, by its `location` name. The ranges are ignored.
    Location(String),
}

impl RegionSelector {
    pub const WORLDWIDE_LABEL: &'static str = "Worldwide";

    /// Map a selector label back to a selector.
    pub fn from_label(label: &str) -> Self {
        if label == Self::WORLDWIDE_LABEL {
            RegionSelector::Worldwide
        } else {
            RegionSelector::Location(label.to_string())
        }
    }

    pub fn label(&self) -> &str {
        match self {
            RegionSelector::Worldwide => Self::WORLDWIDE_LABEL,
            RegionSelector::Location(name) => name,
        }
    }

    pub fn is_worldwide(&self) -> bool {
        matches!(self, RegionSelector::Worldwide)
    }
}

/// Closed numeric interval `[low, high]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ValueRange {
    pub low: f64,
    pub high: f64,
}

impl ValueRange {
    pub fn new(low: f64, high: f64) -> Self {
        Self { low, high }
    }

    /// `None` never matches.
    pub fn contains(&self, value: Option<f64>) -> bool {
        value.is_some_and(|v| self.low <= v && v <= self.high)
    }

    fn validate(&self, field: &'static str) -> Result<(), CriteriaError> {
        if self.low.is_nan() || self.high.is_nan() {
            return Err(CriteriaError::NotANumber { field });
        }
        if self.low > self.high {
            return Err(CriteriaError::InvertedRange {
                field,
                low: self.low,
                high: self.high,
            });
        }
        Ok(())
    }
}

/// Closed calendar interval `[start, end]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

/// A validated set of filter parameters for one interaction.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FilterCriteria {
    region: RegionSelector,
    population: ValueRange,
    gdp_per_capita: ValueRange,
    dates: DateRange,
}

impl FilterCriteria {
    /// Reject inverted or NaN ranges here so the filter never has to guess.
    pub fn new(
        region: RegionSelector,
        population: ValueRange,
        gdp_per_capita: ValueRange,
        dates: DateRange,
    ) -> Result<Self, CriteriaError> {
        population.validate("population")?;
        gdp_per_capita.validate("GDP per capita")?;
        if dates.start > dates.end {
            return Err(CriteriaError::InvertedDates {
                start: dates.start,
                end: dates.end,
            });
        }
        Ok(Self {
            region,
            population,
            gdp_per_capita,
            dates,
        })
    }

    pub fn region(&self) -> &RegionSelector {
        &self.region
    }

    pub fn population(&self) -> ValueRange {
        self.population
    }

    pub fn gdp_per_capita(&self) -> ValueRange {
        self.gdp_per_capita
    }

    pub fn dates(&self) -> DateRange {
        self.dates
    }

    /// Whether a single row passes.
    pub fn matches(&self, obs: &Observation) -> bool {
        if !self.dates.contains(obs.date) {
            return false;
        }
        match &self.region {
            RegionSelector::Location(name) => obs.location == *name,
            RegionSelector::Worldwide => {
                self.population.contains(obs.population)
                    && self.gdp_per_capita.contains(obs.gdp_per_capita)
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Filtered subset
// ---------------------------------------------------------------------------

/// Rows that passed one [`FilterCriteria`], borrowed from the dataset.
#[derive(Debug, Clone)]
pub struct FilteredSubset<'a> {
    region: RegionSelector,
    rows: Vec<&'a Observation>,
}

impl<'a> FilteredSubset<'a> {
    /// The selector the subset was built with.
    pub fn region(&self) -> &RegionSelector {
        &self.region
    }

    pub fn rows(&self) -> &[&'a Observation] {
        &self.rows
    }

    pub fn iter(&self) -> impl Iterator<Item = &'a Observation> + '_ {
        self.rows.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Keep the rows that pass `criteria`, preserving their order.
///
/// Takes any row iterator so an existing subset can be narrowed again.
pub fn filter<'a, I>(rows: I, criteria: &FilterCriteria) -> FilteredSubset<'a>
where
    I: IntoIterator<Item = &'a Observation>,
{
    FilteredSubset {
        region: criteria.region.clone(),
        rows: rows.into_iter().filter(|obs| criteria.matches(obs)).collect(),
    }
}
