//! Stats module - Aggregation of filtered rows for charting

mod calculator;

pub use calculator::{summarize, SummaryRow};
