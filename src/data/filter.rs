//! Filter Module
//! Applies the sidebar selection to the normalized table.

use crate::data::processor::{Dimension, HospitalizationTable, Record};
use chrono::NaiveDate;
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

/// Inclusive range of dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    /// Build a range from two endpoints in either order.
    pub fn new(a: NaiveDate, b: NaiveDate) -> Self {
        Self {
            start: a.min(b),
            end: a.max(b),
        }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

/// Values chosen per dimension plus an optional date range.
///
/// A dimension with no chosen values places no constraint on the rows.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterSelection {
    pub date_range: Option<DateRange>,
    pub categories: BTreeMap<Dimension, BTreeSet<String>>,
}

impl FilterSelection {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub fn with_date_range(mut self, range: DateRange) -> Self {
        self.date_range = Some(range);
        self
    }

    #[cfg(test)]
    pub fn with_values<I, S>(mut self, dimension: Dimension, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.categories
            .entry(dimension)
            .or_default()
            .extend(values.into_iter().map(Into::into));
        self
    }

    pub fn is_selected(&self, dimension: Dimension, value: &str) -> bool {
        self.categories
            .get(&dimension)
            .is_some_and(|values| values.contains(value))
    }

    pub fn set_selected(&mut self, dimension: Dimension, value: &str, selected: bool) {
        let values = self.categories.entry(dimension).or_default();
        if selected {
            values.insert(value.to_string());
        } else {
            values.remove(value);
        }
    }

    pub fn clear(&mut self, dimension: Dimension) {
        self.categories.remove(&dimension);
    }

    pub fn selected_count(&self, dimension: Dimension) -> usize {
        self.categories.get(&dimension).map_or(0, BTreeSet::len)
    }

    /// True when the record passes every constraint.
    pub fn matches(&self, record: &Record) -> bool {
        if let Some(range) = &self.date_range {
            if !range.contains(record.date) {
                return false;
            }
        }

        self.categories
            .iter()
            .filter(|(_, values)| !values.is_empty())
            .all(|(dimension, values)| {
                record
                    .label(*dimension)
                    .is_some_and(|label| values.contains(label))
            })
    }
}

/// Rows of a table that survived filtering, in table order.
#[derive(Debug, Clone)]
pub struct FilteredView<'a> {
    table: &'a HospitalizationTable,
    rows: Vec<usize>,
}

impl<'a> FilteredView<'a> {
    /// Every row of the table.
    pub fn all(table: &'a HospitalizationTable) -> Self {
        Self {
            table,
            rows: (0..table.len()).collect(),
        }
    }

    /// Keep only the rows that also match `selection`.
    pub fn refine(mut self, selection: &FilterSelection) -> Self {
        let records = self.table.records();
        self.rows.retain(|&row| selection.matches(&records[row]));
        self
    }

    #[cfg(test)]
    pub fn rows(&self) -> &[usize] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn records(&self) -> impl Iterator<Item = &'a Record> + '_ {
        let records = self.table.records();
        self.rows.iter().map(move |&row| &records[row])
    }

    /// Row indices ordered by date, most recent first. Ties keep table order.
    pub fn rows_newest_first(&self) -> Vec<usize> {
        let records = self.table.records();
        let mut rows = self.rows.clone();
        rows.sort_by(|a, b| records[*b].date.cmp(&records[*a].date));
        rows
    }
}

/// Apply the date range and every categorical selection (logical AND).
pub fn apply_filters<'a>(
    table: &'a HospitalizationTable,
    selection: &FilterSelection,
) -> FilteredView<'a> {
    let view = FilteredView::all(table).refine(selection);
    debug!("filter kept {} of {} rows", view.len(), table.len());
    view
}
