//! Statistics Calculator Module
//! Groups filtered rows by region and month and averages their rates.

use crate::data::FilteredView;
use chrono::NaiveDate;
use statrs::statistics::Statistics;
use std::collections::BTreeMap;
use tracing::debug;

/// Mean rate for one (region, date) group.
#[derive(Debug, Clone, PartialEq)]
pub struct SummaryRow {
    pub state: String,
    pub date: NaiveDate,
    pub mean_rate: f64,
    /// Rows averaged into this point.
    pub observations: usize,
}

/// Average `hospitalization_rate` per (state, date), ordered by state then date.
///
/// Rows without a state are left out of the summary.
pub fn summarize(view: &FilteredView<'_>) -> Vec<SummaryRow> {
    let mut groups: BTreeMap<(&str, NaiveDate), Vec<f64>> = BTreeMap::new();

    for record in view.records() {
        if let Some(state) = record.state.as_deref() {
            groups
                .entry((state, record.date))
                .or_default()
                .push(record.hospitalization_rate);
        }
    }

    let summary: Vec<SummaryRow> = groups
        .into_iter()
        .map(|((state, date), rates)| SummaryRow {
            state: state.to_string(),
            date,
            observations: rates.len(),
            mean_rate: rates.iter().mean(),
        })
        .collect();

    debug!("summarized {} rows into {} points", view.len(), summary.len());
    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::fixtures::{snapshot_table, table_from_csv};
    use crate::data::{apply_filters, DateRange, Dimension, FilterSelection};

    fn month(m: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2022, m, 1).unwrap()
    }

    #[test]
    fn mean_of_one_two_three_is_two() {
        let table = snapshot_table();
        let view = apply_filters(
            &table,
            &FilterSelection::new()
                .with_values(Dimension::State, ["CA"])
                .with_date_range(DateRange::new(month(1), month(1))),
        );

        let summary = summarize(&view);
        assert_eq!(summary.len(), 1);
        assert_eq!(summary[0].state, "CA");
        assert_eq!(summary[0].observations, 3);
        assert!((summary[0].mean_rate - 2.0).abs() < 1e-12);
    }

    #[test]
    fn summary_is_sorted_by_state_then_date() {
        let table = snapshot_table();
        let summary = summarize(&apply_filters(&table, &FilterSelection::new()));

        let keys: Vec<(&str, NaiveDate)> = summary
            .iter()
            .map(|row| (row.state.as_str(), row.date))
            .collect();
        assert_eq!(
            keys,
            vec![
                ("CA", month(1)),
                ("CA", month(2)),
                ("NY", month(1)),
                ("NY", month(2)),
                ("NY", month(3)),
            ]
        );
        assert!((summary[1].mean_rate - 5.0).abs() < 1e-12);
        assert!((summary[2].mean_rate - 15.0).abs() < 1e-12);
    }

    #[test]
    fn empty_view_has_empty_summary() {
        let table = snapshot_table();
        let view = apply_filters(
            &table,
            &FilterSelection::new().with_values(Dimension::State, ["TX"]),
        );
        assert!(summarize(&view).is_empty());
    }

    #[test]
    fn rows_without_state_are_not_grouped() {
        let table = table_from_csv(
            "State,_YearMonth,AgeCategory_Legend,Sex_Label,Race_Label,MonthlyRate\n\
             ,202201,All,All,All,100.0\n\
             CA,202201,All,All,All,2.0\n",
        );
        let summary = summarize(&apply_filters(&table, &FilterSelection::new()));
        assert_eq!(summary.len(), 1);
        assert_eq!(summary[0].mean_rate, 2.0);
    }

    #[test]
    fn one_region_one_month_end_to_end() {
        let table = snapshot_table();
        let selection = FilterSelection::new()
            .with_values(Dimension::State, ["CA"])
            .with_date_range(DateRange::new(month(2), month(2)));

        let view = apply_filters(&table, &selection);
        assert_eq!(view.len(), 2);
        assert!(view
            .records()
            .all(|r| r.state.as_deref() == Some("CA") && r.date == month(2)));

        let summary = summarize(&view);
        let regions: std::collections::BTreeSet<&str> =
            view.records().filter_map(|r| r.state.as_deref()).collect();
        assert_eq!(summary.len(), regions.len());
        assert_eq!(summary[0].date, month(2));
        assert!((summary[0].mean_rate - 5.0).abs() < 1e-12);
    }
}
