//! Data Processor Module
//! Canonicalizes column names, derives the `date` column and coerces rates.

use crate::data::loader::LoaderError;
use chrono::{NaiveDate, TimeDelta};
use polars::prelude::*;
use std::collections::BTreeSet;
use tracing::{debug, warn};

pub const STATE_COL: &str = "state";
pub const YEAR_MONTH_COL: &str = "_yearmonth";
pub const AGE_COL: &str = "agecategory_legend";
pub const SEX_COL: &str = "sex_label";
pub const RACE_COL: &str = "race_label";
pub const RATE_COL: &str = "hospitalization_rate";
pub const DATE_COL: &str = "date";

/// Source column names (after canonicalization) mapped to their stable names.
pub const COLUMN_RENAME_MAP: &[(&str, &str)] = &[("monthlyrate", RATE_COL)];

/// Columns every downstream stage relies on.
const REQUIRED_COLUMNS: [&str; 6] = [
    STATE_COL,
    YEAR_MONTH_COL,
    AGE_COL,
    SEX_COL,
    RACE_COL,
    RATE_COL,
];

/// Categorical dimensions the dashboard can filter on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Dimension {
    State,
    AgeCategory,
    Sex,
    Race,
}

impl Dimension {
    pub const ALL: [Dimension; 4] = [
        Dimension::State,
        Dimension::AgeCategory,
        Dimension::Sex,
        Dimension::Race,
    ];

    pub fn column(self) -> &'static str {
        match self {
            Dimension::State => STATE_COL,
            Dimension::AgeCategory => AGE_COL,
            Dimension::Sex => SEX_COL,
            Dimension::Race => RACE_COL,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Dimension::State => "Filter by state:",
            Dimension::AgeCategory => "Filter by age group:",
            Dimension::Sex => "Filter by sex:",
            Dimension::Race => "Filter by race:",
        }
    }
}

/// One observation of the normalized table.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub state: Option<String>,
    pub year_month: u32,
    pub age_category: Option<String>,
    pub sex: Option<String>,
    pub race: Option<String>,
    pub date: NaiveDate,
    pub hospitalization_rate: f64,
}

impl Record {
    pub fn label(&self, dimension: Dimension) -> Option<&str> {
        match dimension {
            Dimension::State => self.state.as_deref(),
            Dimension::AgeCategory => self.age_category.as_deref(),
            Dimension::Sex => self.sex.as_deref(),
            Dimension::Race => self.race.as_deref(),
        }
    }
}

/// Normalized hospitalization data.
///
/// `records[i]` is the typed view of row `i` of `frame`; the frame keeps every
/// source column so the raw table can be shown as loaded.
#[derive(Debug, Clone)]
pub struct HospitalizationTable {
    frame: DataFrame,
    records: Vec<Record>,
}

impl HospitalizationTable {
    pub fn frame(&self) -> &DataFrame {
        &self.frame
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn column_names(&self) -> Vec<String> {
        self.frame
            .get_column_names()
            .iter()
            .map(|s| s.to_string())
            .collect()
    }

    /// Sorted distinct non-null values of a dimension.
    pub fn unique_values(&self, dimension: Dimension) -> Vec<String> {
        self.records
            .iter()
            .filter_map(|r| r.label(dimension))
            .collect::<BTreeSet<_>>()
            .into_iter()
            .map(str::to_string)
            .collect()
    }

    /// Sorted distinct dates present in the table.
    pub fn months(&self) -> Vec<NaiveDate> {
        self.records
            .iter()
            .map(|r| r.date)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    pub fn date_bounds(&self) -> Option<(NaiveDate, NaiveDate)> {
        let min = self.records.iter().map(|r| r.date).min()?;
        let max = self.records.iter().map(|r| r.date).max()?;
        Some((min, max))
    }

    /// Display text of one cell; nulls render empty.
    pub fn cell_text(&self, column: &str, row: usize) -> String {
        self.frame
            .column(column)
            .ok()
            .and_then(|col| col.get(row).ok())
            .filter(|val| !val.is_null())
            .map(|val| val.to_string().trim_matches('"').to_string())
            .unwrap_or_default()
    }
}

/// Lowercase a header and join its words with underscores.
pub fn canonical_column_name(name: &str) -> String {
    name.split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
        .to_lowercase()
}

/// Derive the first day of the month from a `YYYYMM` value.
///
/// Fractional input is truncated. Only six-digit values with a valid month are accepted.
pub fn parse_year_month(raw: f64) -> Option<(u32, NaiveDate)> {
    if !raw.is_finite() {
        return None;
    }
    let year_month = raw.trunc();
    if !(100_000.0..=999_999.0).contains(&year_month) {
        return None;
    }

    let year_month = year_month as u32;
    let date = NaiveDate::from_ymd_opt((year_month / 100) as i32, year_month % 100, 1)?;
    Some((year_month, date))
}

/// Days since 1970-01-01, the physical value of a polars `Date`.
pub fn date_to_epoch_days(date: NaiveDate) -> i32 {
    date.signed_duration_since(NaiveDate::default()).num_days() as i32
}

pub fn epoch_days_to_date(days: i32) -> Option<NaiveDate> {
    NaiveDate::default().checked_add_signed(TimeDelta::try_days(days.into())?)
}

/// Normalize a raw CSV frame into a [`HospitalizationTable`].
///
/// Rows whose year-month or rate cannot be coerced are dropped.
pub fn prepare_table(raw: DataFrame) -> Result<HospitalizationTable, LoaderError> {
    let frame = canonicalize_columns(raw)?;
    check_schema(&frame)?;

    let year_months = frame.column(YEAR_MONTH_COL)?.cast(&DataType::Float64)?;
    let rates = frame.column(RATE_COL)?.cast(&DataType::Float64)?;
    let mut states = labels(&frame, STATE_COL)?;
    let mut ages = labels(&frame, AGE_COL)?;
    let mut sexes = labels(&frame, SEX_COL)?;
    let mut races = labels(&frame, RACE_COL)?;

    let mut keep = Vec::with_capacity(frame.height());
    let mut records = Vec::with_capacity(frame.height());

    for (i, (year_month, rate)) in year_months
        .f64()?
        .into_iter()
        .zip(rates.f64()?.into_iter())
        .enumerate()
    {
        let parsed = year_month.and_then(parse_year_month);
        let rate = rate.filter(|r| r.is_finite() && *r >= 0.0);

        let (Some((year_month, date)), Some(rate)) = (parsed, rate) else {
            keep.push(false);
            continue;
        };

        keep.push(true);
        records.push(Record {
            state: states[i].take(),
            year_month,
            age_category: ages[i].take(),
            sex: sexes[i].take(),
            race: races[i].take(),
            date,
            hospitalization_rate: rate,
        });
    }

    let dropped = frame.height() - records.len();
    if dropped > 0 {
        warn!("dropped {} rows with an invalid year-month or rate", dropped);
    }

    let mask: BooleanChunked = keep.into_iter().collect();
    let mut frame = frame.filter(&mask)?;

    let year_month_values: Vec<i64> = records.iter().map(|r| r.year_month as i64).collect();
    let rate_values: Vec<f64> = records.iter().map(|r| r.hospitalization_rate).collect();
    let date_values: Vec<i32> = records.iter().map(|r| date_to_epoch_days(r.date)).collect();

    frame.with_column(Column::new(YEAR_MONTH_COL.into(), year_month_values))?;
    frame.with_column(Column::new(RATE_COL.into(), rate_values))?;
    frame.with_column(Column::new(DATE_COL.into(), date_values).cast(&DataType::Date)?)?;

    debug!("normalized table: {} rows, {} columns", frame.height(), frame.width());
    Ok(HospitalizationTable { frame, records })
}

/// Rename every column to its canonical form, then apply [`COLUMN_RENAME_MAP`].
fn canonicalize_columns(raw: DataFrame) -> PolarsResult<DataFrame> {
    let columns: Vec<Column> = raw
        .take_columns()
        .into_iter()
        .map(|mut col| {
            let canonical = canonical_column_name(col.name());
            let name = COLUMN_RENAME_MAP
                .iter()
                .find(|(from, _)| *from == canonical)
                .map(|(_, to)| to.to_string())
                .unwrap_or(canonical);
            col.rename(PlSmallStr::from(name.as_str()));
            col
        })
        .collect();

    DataFrame::new(columns)
}

fn check_schema(frame: &DataFrame) -> Result<(), LoaderError> {
    let present: BTreeSet<String> = frame
        .get_column_names()
        .iter()
        .map(|s| s.to_string())
        .collect();

    let missing: Vec<String> = REQUIRED_COLUMNS
        .iter()
        .filter(|name| !present.contains(**name))
        .map(|name| name.to_string())
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(LoaderError::UnexpectedSchema { missing })
    }
}

fn labels(frame: &DataFrame, name: &str) -> PolarsResult<Vec<Option<String>>> {
    let col = frame.column(name)?.cast(&DataType::String)?;
    let values = col
        .str()?
        .into_iter()
        .map(|v| v.map(str::to_string))
        .collect();
    Ok(values)
}
