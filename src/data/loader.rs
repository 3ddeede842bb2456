use std::fs::File;
use std::path::Path;

use arrow::array::{Array, ArrayRef, AsArray, Float64Array, StringArray};
use arrow::compute::{cast, cast_with_options, CastOptions};
use arrow::datatypes::{DataType, Date32Type, Float64Type};
use chrono::NaiveDate;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use parquet::arrow::ProjectionMask;

use super::model::{CovidDataset, Observation};
use crate::error::LoadError;

/// Days from 0001-01-01 (CE day 1) to 1970-01-01.
const UNIX_EPOCH_DAYS_FROM_CE: i32 = 719_163;

const DATE_FORMAT: &str = "%Y-%m-%d";

// ---------------------------------------------------------------------------
// Options
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct LoadOptions {
    /// Rows whose `iso_code` contains this are dropped. Empty keeps everything.
    pub aggregate_prefix: String,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            aggregate_prefix: "OWID".to_string(),
        }
    }
}

impl LoadOptions {
    fn is_aggregate(&self, iso_code: &str) -> bool {
        !self.aggregate_prefix.is_empty() && iso_code.contains(self.aggregate_prefix.as_str())
    }
}

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load an OWID-shaped dataset from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – one row per (country, date), header row required
/// * `.parquet` – same columns; only the required ones are decoded
///
/// Extra columns are ignored. Continent/world aggregate rows are dropped.
pub fn load_file(path: &Path, options: &LoadOptions) -> Result<CovidDataset, LoadError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let (observations, dropped) = match ext.as_str() {
        "csv" => load_csv(path, options)?,
        "parquet" | "pq" => load_parquet(path, options)?,
        other => return Err(LoadError::UnsupportedFormat(other.to_string())),
    };

    log::info!(
        "Loaded {} observations from {:?} ({} aggregate rows dropped)",
        observations.len(),
        path,
        dropped
    );

    Ok(CovidDataset::from_observations(observations))
}

fn open(path: &Path) -> Result<File, LoadError> {
    File::open(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })
}

// ---------------------------------------------------------------------------
// Column projection
// ---------------------------------------------------------------------------

/// Positions of the required columns in a header or schema.
#[derive(Debug, Clone, Copy)]
struct Projection {
    iso_code: usize,
    location: usize,
    date: usize,
    continent: usize,
    new_cases_smoothed: usize,
    stringency_index: usize,
    population: usize,
    gdp_per_capita: usize,
}

impl Projection {
    fn locate(find: impl Fn(&str) -> Option<usize>) -> Result<Self, LoadError> {
        let get = |name: &'static str| find(name).ok_or(LoadError::MissingColumn(name));
        Ok(Projection {
            iso_code: get("iso_code")?,
            location: get("location")?,
            date: get("date")?,
            continent: get("continent")?,
            new_cases_smoothed: get("new_cases_smoothed")?,
            stringency_index: get("stringency_index")?,
            population: get("population")?,
            gdp_per_capita: get("gdp_per_capita")?,
        })
    }

    fn indices(&self) -> [usize; 8] {
        [
            self.iso_code,
            self.location,
            self.date,
            self.continent,
            self.new_cases_smoothed,
            self.stringency_index,
            self.population,
            self.gdp_per_capita,
        ]
    }
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// Layout of `owid-covid-data.csv`: header row, ISO dates, empty cells for
/// missing values.
fn load_csv(path: &Path, options: &LoadOptions) -> Result<(Vec<Observation>, usize), LoadError> {
    let mut reader = csv::Reader::from_reader(open(path)?);
    let headers = reader.headers()?.clone();
    let cols = Projection::locate(|name| headers.iter().position(|h| h == name))?;

    let mut observations = Vec::new();
    let mut dropped = 0;

    for (idx, result) in reader.records().enumerate() {
        let record = result?;
        let row_no = record.position().map_or(idx as u64 + 2, |p| p.line());
        let cell = |idx: usize| record.get(idx).unwrap_or("").trim();

        let iso_code = cell(cols.iso_code);
        if options.is_aggregate(iso_code) {
            dropped += 1;
            continue;
        }

        observations.push(Observation {
            iso_code: iso_code.to_string(),
            location: cell(cols.location).to_string(),
            date: parse_date(cell(cols.date), row_no)?,
            continent: non_empty(cell(cols.continent)),
            new_cases_smoothed: parse_number(
                cell(cols.new_cases_smoothed),
                row_no,
                "new_cases_smoothed",
            )?,
            stringency_index: parse_number(
                cell(cols.stringency_index),
                row_no,
                "stringency_index",
            )?,
            population: parse_number(cell(cols.population), row_no, "population")?,
            gdp_per_capita: parse_number(cell(cols.gdp_per_capita), row_no, "gdp_per_capita")?,
        });
    }

    Ok((observations, dropped))
}

fn non_empty(s: &str) -> Option<String> {
    (!s.is_empty()).then(|| s.to_string())
}

fn parse_date(s: &str, row: u64) -> Result<NaiveDate, LoadError> {
    NaiveDate::parse_from_str(s, DATE_FORMAT).map_err(|_| LoadError::BadValue {
        row,
        column: "date",
        value: s.to_string(),
    })
}

fn parse_number(s: &str, row: u64, column: &'static str) -> Result<Option<f64>, LoadError> {
    if s.is_empty() {
        return Ok(None);
    }
    s.parse::<f64>()
        .map(Some)
        .map_err(|_| LoadError::BadValue {
            row,
            column,
            value: s.to_string(),
        })
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file with the OWID columns.
///
/// Works with files written by both **Pandas** (`df.to_parquet()`, dates as
/// timestamps) and **Polars** (`df.write_parquet()`, dates as `Date32`).
/// Numeric columns of any integer or float type are widened to `f64`; a text
/// cell that is not a number fails the load instead of becoming missing.
/// Rows in errors are 1-based record numbers.
fn load_parquet(
    path: &Path,
    options: &LoadOptions,
) -> Result<(Vec<Observation>, usize), LoadError> {
    let builder = ParquetRecordBatchReaderBuilder::try_new(open(path)?)?;
    let file_schema = builder.schema().clone();
    let cols = Projection::locate(|name| file_schema.index_of(name).ok())?;

    let mask = ProjectionMask::roots(builder.parquet_schema(), cols.indices());
    let reader = builder.with_projection(mask).build()?;

    let mut observations = Vec::new();
    let mut dropped = 0;
    let mut row_offset: u64 = 0;

    for batch_result in reader {
        let batch = batch_result?;
        // The projected batch only carries the required columns.
        let schema = batch.schema();
        let cols = Projection::locate(|name| schema.index_of(name).ok())?;

        let iso_code = string_column(batch.column(cols.iso_code))?;
        let location = string_column(batch.column(cols.location))?;
        let continent = string_column(batch.column(cols.continent))?;
        let dates = date_column(batch.column(cols.date), row_offset)?;
        let cases = float_column(batch.column(cols.new_cases_smoothed))?;
        let stringency = float_column(batch.column(cols.stringency_index))?;
        let population = float_column(batch.column(cols.population))?;
        let gdp = float_column(batch.column(cols.gdp_per_capita))?;

        for (row, date) in dates.into_iter().enumerate() {
            let row_no = row_offset + row as u64 + 1;
            let iso = required_str(&iso_code, row, row_no, "iso_code")?;
            if options.is_aggregate(iso) {
                dropped += 1;
                continue;
            }

            observations.push(Observation {
                iso_code: iso.to_string(),
                location: required_str(&location, row, row_no, "location")?.to_string(),
                date,
                continent: optional_str(&continent, row),
                new_cases_smoothed: optional_f64(&cases, row),
                stringency_index: optional_f64(&stringency, row),
                population: optional_f64(&population, row),
                gdp_per_capita: optional_f64(&gdp, row),
            });
        }

        row_offset += batch.num_rows() as u64;
    }

    Ok((observations, dropped))
}

// -- Arrow helpers --

fn string_column(col: &ArrayRef) -> Result<StringArray, LoadError> {
    let arr = cast(col.as_ref(), &DataType::Utf8)?;
    Ok(arr.as_string::<i32>().clone())
}

/// Casts that would turn a present value into null are errors.
fn strict_cast(col: &ArrayRef, to: &DataType) -> Result<ArrayRef, LoadError> {
    let options = CastOptions {
        safe: false,
        ..Default::default()
    };
    Ok(cast_with_options(col.as_ref(), to, &options)?)
}

fn float_column(col: &ArrayRef) -> Result<Float64Array, LoadError> {
    let arr = strict_cast(col, &DataType::Float64)?;
    Ok(arr.as_primitive::<Float64Type>().clone())
}

/// Decode a date column stored as `Date32`, `Date64`, a timestamp, or ISO text.
fn date_column(col: &ArrayRef, row_offset: u64) -> Result<Vec<NaiveDate>, LoadError> {
    let bad = |row: usize, value: String| LoadError::BadValue {
        row: row_offset + row as u64 + 1,
        column: "date",
        value,
    };

    match col.data_type() {
        DataType::Utf8 | DataType::LargeUtf8 => {
            let text = string_column(col)?;
            (0..text.len())
                .map(|row| {
                    if text.is_null(row) {
                        return Err(bad(row, "<null>".to_string()));
                    }
                    parse_date(text.value(row), row_offset + row as u64 + 1)
                })
                .collect()
        }
        _ => {
            let days = strict_cast(col, &DataType::Date32)?;
            let days = days.as_primitive::<Date32Type>();
            (0..days.len())
                .map(|row| {
                    if days.is_null(row) {
                        return Err(bad(row, "<null>".to_string()));
                    }
                    let d = days.value(row);
                    NaiveDate::from_num_days_from_ce_opt(d + UNIX_EPOCH_DAYS_FROM_CE)
                        .ok_or_else(|| bad(row, d.to_string()))
                })
                .collect()
        }
    }
}

fn required_str<'a>(
    arr: &'a StringArray,
    row: usize,
    row_no: u64,
    column: &'static str,
) -> Result<&'a str, LoadError> {
    if arr.is_null(row) {
        return Err(LoadError::BadValue {
            row: row_no,
            column,
            value: "<null>".to_string(),
        });
    }
    Ok(arr.value(row))
}

fn optional_str(arr: &StringArray, row: usize) -> Option<String> {
    if arr.is_null(row) {
        None
    } else {
        non_empty(arr.value(row))
    }
}

fn optional_f64(arr: &Float64Array, row: usize) -> Option<f64> {
    if arr.is_null(row) {
        None
    } else {
        Some(arr.value(row))
    }
}
