use std::fs::File;
use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{ArrayRef, Date32Array, Float64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use chrono::{Duration, NaiveDate};
use parquet::arrow::ArrowWriter;

/// (iso_code, continent, location, population, gdp_per_capita, wave peak per million)
const COUNTRIES: &[(&str, &str, &str, f64, f64, f64)] = &[
    ("USA", "North America", "United States", 331_000_000.0, 54_225.0, 750.0),
    ("CAN", "North America", "Canada", 38_000_000.0, 44_017.0, 220.0),
    ("MEX", "North America", "Mexico", 128_900_000.0, 17_336.0, 90.0),
    ("BRA", "South America", "Brazil", 212_600_000.0, 14_103.0, 350.0),
    ("IND", "Asia", "India", 1_380_000_000.0, 6_427.0, 280.0),
    ("IDN", "Asia", "Indonesia", 273_500_000.0, 11_188.0, 150.0),
    ("PAK", "Asia", "Pakistan", 220_900_000.0, 5_035.0, 30.0),
    ("BGD", "Asia", "Bangladesh", 164_700_000.0, 3_524.0, 40.0),
    ("NGA", "Africa", "Nigeria", 206_100_000.0, 5_338.0, 5.0),
    ("EGY", "Africa", "Egypt", 102_300_000.0, 10_550.0, 12.0),
    ("PHL", "Asia", "Philippines", 109_600_000.0, 7_599.0, 80.0),
    ("DEU", "Europe", "Germany", 83_800_000.0, 45_229.0, 300.0),
    ("GBR", "Europe", "United Kingdom", 67_900_000.0, 39_753.0, 800.0),
    ("LUX", "Europe", "Luxembourg", 626_000.0, 94_277.0, 900.0),
    ("TUV", "Oceania", "Tuvalu", 11_800.0, 3_575.0, 0.0),
];

/// Continent and world totals the loader is expected to drop.
const AGGREGATES: &[(&str, &str)] = &[("OWID_WRL", "World"), ("OWID_EUR", "Europe")];

const DAYS: i64 = 450;

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }
}

/// Two epidemic waves centred on day 120 and day 330.
fn wave(day: i64, peak_per_million: f64, population: f64) -> f64 {
    let bump = |centre: f64, width: f64| (-(day as f64 - centre).powi(2) / (2.0 * width * width)).exp();
    let shape = bump(120.0, 30.0) + 1.4 * bump(330.0, 45.0);
    shape * peak_per_million * population / 1e6
}

#[derive(Default)]
struct Columns {
    iso_code: Vec<String>,
    continent: Vec<Option<String>>,
    location: Vec<String>,
    date: Vec<NaiveDate>,
    new_cases_smoothed: Vec<Option<f64>>,
    stringency_index: Vec<Option<f64>>,
    population: Vec<f64>,
    gdp_per_capita: Vec<Option<f64>>,
}

fn generate(rng: &mut SimpleRng, first_day: NaiveDate) -> Columns {
    let mut cols = Columns::default();

    for day in 0..DAYS {
        let date = first_day + Duration::days(day);
        let mut world_cases = 0.0;

        for (idx, &(iso, continent, location, population, gdp, peak)) in COUNTRIES.iter().enumerate() {
            let cases = (wave(day, peak, population) + rng.gauss(0.0, peak * 0.02)).max(0.0);
            world_cases += cases;

            // Stringency rises with the first wave and relaxes slowly afterwards.
            let base = 20.0 + 60.0 * (day as f64 / 60.0).min(1.0) - 0.05 * (day - 60).max(0) as f64;
            let stringency = (base + idx as f64 * 1.5 + rng.gauss(0.0, 2.0)).clamp(0.0, 100.0);
            // Tuvalu never reported a stringency index.
            let stringency = (iso != "TUV").then_some((stringency * 100.0).round() / 100.0);

            cols.iso_code.push(iso.to_string());
            cols.continent.push(Some(continent.to_string()));
            cols.location.push(location.to_string());
            cols.date.push(date);
            cols.new_cases_smoothed.push((day >= 6).then_some((cases * 1000.0).round() / 1000.0));
            cols.stringency_index.push(stringency);
            cols.population.push(population);
            cols.gdp_per_capita.push(Some(gdp));
        }

        for &(iso, location) in AGGREGATES {
            cols.iso_code.push(iso.to_string());
            cols.continent.push(None);
            cols.location.push(location.to_string());
            cols.date.push(date);
            cols.new_cases_smoothed.push(Some(world_cases));
            cols.stringency_index.push(None);
            cols.population.push(7_800_000_000.0);
            cols.gdp_per_capita.push(None);
        }
    }

    cols
}

fn write_csv(cols: &Columns, path: &str) -> Result<()> {
    let mut writer = csv::Writer::from_path(path).with_context(|| format!("creating {path}"))?;
    writer.write_record([
        "iso_code",
        "continent",
        "location",
        "date",
        "new_cases_smoothed",
        "stringency_index",
        "population",
        "gdp_per_capita",
    ])?;

    let opt = |v: Option<f64>| v.map(|v| v.to_string()).unwrap_or_default();
    for i in 0..cols.iso_code.len() {
        writer.write_record([
            cols.iso_code[i].clone(),
            cols.continent[i].clone().unwrap_or_default(),
            cols.location[i].clone(),
            cols.date[i].format("%Y-%m-%d").to_string(),
            opt(cols.new_cases_smoothed[i]),
            opt(cols.stringency_index[i]),
            cols.population[i].to_string(),
            opt(cols.gdp_per_capita[i]),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

fn write_parquet(cols: &Columns, path: &str) -> Result<()> {
    let epoch = NaiveDate::default();
    let days: Vec<i32> = cols
        .date
        .iter()
        .map(|d| d.signed_duration_since(epoch).num_days() as i32)
        .collect();

    let schema = Arc::new(Schema::new(vec![
        Field::new("iso_code", DataType::Utf8, false),
        Field::new("continent", DataType::Utf8, true),
        Field::new("location", DataType::Utf8, false),
        Field::new("date", DataType::Date32, false),
        Field::new("new_cases_smoothed", DataType::Float64, true),
        Field::new("stringency_index", DataType::Float64, true),
        Field::new("population", DataType::Float64, false),
        Field::new("gdp_per_capita", DataType::Float64, true),
    ]));

    let columns: Vec<ArrayRef> = vec![
        Arc::new(StringArray::from(cols.iso_code.clone())),
        Arc::new(StringArray::from(cols.continent.clone())),
        Arc::new(StringArray::from(cols.location.clone())),
        Arc::new(Date32Array::from(days)),
        Arc::new(Float64Array::from(cols.new_cases_smoothed.clone())),
        Arc::new(Float64Array::from(cols.stringency_index.clone())),
        Arc::new(Float64Array::from(cols.population.clone())),
        Arc::new(Float64Array::from(cols.gdp_per_capita.clone())),
    ];

    let batch = RecordBatch::try_new(schema.clone(), columns).context("building record batch")?;
    let file = File::create(path).with_context(|| format!("creating {path}"))?;
    let mut writer = ArrowWriter::try_new(file, schema, None)?;
    writer.write(&batch)?;
    writer.close()?;
    Ok(())
}

fn main() -> Result<()> {
    env_logger::init();

    let mut rng = SimpleRng::new(42);
    let first_day = NaiveDate::from_ymd_opt(2020, 3, 1).context("invalid start date")?;
    let cols = generate(&mut rng, first_day);

    write_csv(&cols, "sample_owid.csv")?;
    write_parquet(&cols, "sample_owid.parquet")?;

    log::info!("generated {} rows", cols.iso_code.len());
    println!(
        "Wrote {} rows ({} countries, {} aggregates, {} days) to sample_owid.csv and sample_owid.parquet",
        cols.iso_code.len(),
        COUNTRIES.len(),
        AGGREGATES.len(),
        DAYS
    );
    Ok(())
}
