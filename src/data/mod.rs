//! Data module - CSV loading, normalization, filtering and session state

mod filter;
mod loader;
mod processor;
mod session;

pub use filter::{apply_filters, DateRange, FilterSelection, FilteredView};
pub use loader::{DataLoader, DataSource};
pub use processor::{date_to_epoch_days, epoch_days_to_date, Dimension, HospitalizationTable};
pub use session::Session;
