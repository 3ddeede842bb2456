//! Data layer: core types, loading, filtering, and chart series.
//!
//! Architecture:
//! ```text
//!  .csv / .parquet
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  loader   │  project columns, drop OWID_* rows → CovidDataset
//!   └──────────┘
//!        │
//!        ▼
//!   ┌──────────────┐
//!   │ CovidDataset │  Vec<Observation>, location / span index
//!   └──────────────┘
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  filter   │  FilterCriteria → FilteredSubset
//!   └──────────┘
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  series   │  LineSeries (stringency), BarSeries (new cases)
//!   └──────────┘
//! ```
//!
//! [`query::query`] runs the last two stages for one interaction.

pub mod filter;
pub mod loader;
pub mod model;
pub mod query;
pub mod series;

#[cfg(test)]
pub(crate) mod fixtures;
