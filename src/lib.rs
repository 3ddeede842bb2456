//! Filtering and aggregation core of the COVID-19 dashboard.
//!
//! The dashboard binary (`covid-dash`) and the headless `covid-query` tool
//! both sit on top of [`data::query::query`].

pub mod config;
pub mod data;
pub mod error;

pub use error::{CriteriaError, LoadError};
