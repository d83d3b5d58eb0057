//! Session Module
//! Per-session refresh flag and the memoized table.

use crate::data::loader::{DataSource, LoaderError, TableSource};
use crate::data::processor::HospitalizationTable;
use tracing::{debug, error, info};

/// State owned by one run of the dashboard.
#[derive(Debug, Default)]
pub struct Session {
    data_refreshed: bool,
    cache: Option<(DataSource, HospitalizationTable)>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the user has pulled the remote feed in this session.
    pub fn data_refreshed(&self) -> bool {
        self.data_refreshed
    }

    /// Source the next load reads from.
    pub fn source(&self) -> DataSource {
        if self.data_refreshed {
            DataSource::Remote
        } else {
            DataSource::Local
        }
    }

    /// Source of the table currently held, if any.
    pub fn cached_source(&self) -> Option<DataSource> {
        self.cache.as_ref().map(|(source, _)| *source)
    }

    /// Most recently loaded table, whichever source it came from.
    pub fn table(&self) -> Option<&HospitalizationTable> {
        self.cache.as_ref().map(|(_, table)| table)
    }

    /// Return the table for [`Session::source`], fetching only on a cache miss.
    ///
    /// A failed fetch leaves the previously cached table in place.
    pub fn load<S: TableSource>(
        &mut self,
        loader: &S,
    ) -> Result<&HospitalizationTable, LoaderError> {
        let wanted = self.source();

        let entry = match self.cache.take() {
            Some(entry) if entry.0 == wanted => {
                debug!("using cached {} table", wanted);
                entry
            }
            previous => match loader.fetch(wanted) {
                Ok(table) => (wanted, table),
                Err(err) => {
                    error!("loading {} failed: {}", wanted, err);
                    self.cache = previous;
                    return Err(err);
                }
            },
        };

        Ok(&self.cache.insert(entry).1)
    }

    /// Switch the session to the remote source and load it.
    ///
    /// On failure the session goes back to its previous source so the refresh can be retried.
    pub fn refresh<S: TableSource>(
        &mut self,
        loader: &S,
    ) -> Result<&HospitalizationTable, LoaderError> {
        let was_refreshed = self.data_refreshed;
        self.data_refreshed = true;

        if let Err(err) = self.load(loader).map(|_| ()) {
            self.data_refreshed = was_refreshed;
            return Err(err);
        }

        info!("session switched to {}", self.source());
        self.load(loader)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::fixtures::{snapshot_table, table_from_csv};
    use std::cell::{Cell, RefCell};
    use std::io;
    use std::path::PathBuf;

    const REMOTE_CSV: &str = "\
State,_YearMonth,AgeCategory_Legend,Sex_Label,Race_Label,MonthlyRate
CO,202301,All,All,All,7.0
";

    /// In-memory source that counts fetches per source.
    #[derive(Default)]
    struct FakeSource {
        local_fetches: Cell<usize>,
        remote_fetches: Cell<usize>,
        remote_down: Cell<bool>,
        log: RefCell<Vec<DataSource>>,
    }

    impl TableSource for FakeSource {
        fn fetch(&self, source: DataSource) -> Result<HospitalizationTable, LoaderError> {
            self.log.borrow_mut().push(source);
            match source {
                DataSource::Local => {
                    self.local_fetches.set(self.local_fetches.get() + 1);
                    Ok(snapshot_table())
                }
                DataSource::Remote => {
                    self.remote_fetches.set(self.remote_fetches.get() + 1);
                    if self.remote_down.get() {
                        Err(LoaderError::Io {
                            path: PathBuf::from("remote"),
                            source: io::Error::new(io::ErrorKind::ConnectionRefused, "down"),
                        })
                    } else {
                        Ok(table_from_csv(REMOTE_CSV))
                    }
                }
            }
        }
    }

    #[test]
    fn new_session_reads_local_snapshot() {
        let session = Session::new();
        assert!(!session.data_refreshed());
        assert_eq!(session.source(), DataSource::Local);
        assert!(session.table().is_none());
    }

    #[test]
    fn repeated_loads_are_memoized() {
        let source = FakeSource::default();
        let mut session = Session::new();

        let first = session.load(&source).unwrap().records().to_vec();
        let second = session.load(&source).unwrap().records().to_vec();

        assert_eq!(first, second);
        assert_eq!(source.local_fetches.get(), 1);
        assert_eq!(session.cached_source(), Some(DataSource::Local));
    }

    #[test]
    fn refresh_invalidates_local_cache() {
        let source = FakeSource::default();
        let mut session = Session::new();
        session.load(&source).unwrap();

        let table = session.refresh(&source).unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(table.records()[0].state.as_deref(), Some("CO"));

        assert!(session.data_refreshed());
        assert_eq!(session.cached_source(), Some(DataSource::Remote));

        session.load(&source).unwrap();
        assert_eq!(source.remote_fetches.get(), 1);
        assert_eq!(source.local_fetches.get(), 1);
        assert_eq!(
            *source.log.borrow(),
            vec![DataSource::Local, DataSource::Remote]
        );
    }

    #[test]
    fn failed_refresh_keeps_previous_table() {
        let source = FakeSource::default();
        source.remote_down.set(true);
        let mut session = Session::new();
        session.load(&source).unwrap();

        assert!(session.refresh(&source).is_err());
        assert!(!session.data_refreshed());
        assert_eq!(session.cached_source(), Some(DataSource::Local));
        assert_eq!(session.table().map(HospitalizationTable::len), Some(9));

        // still served from cache
        session.load(&source).unwrap();
        assert_eq!(source.local_fetches.get(), 1);

        source.remote_down.set(false);
        assert!(session.refresh(&source).is_ok());
        assert_eq!(source.remote_fetches.get(), 2);
        assert_eq!(session.cached_source(), Some(DataSource::Remote));
    }

    #[test]
    fn failed_first_load_leaves_session_empty() {
        struct Missing;
        impl TableSource for Missing {
            fn fetch(&self, _: DataSource) -> Result<HospitalizationTable, LoaderError> {
                Err(LoaderError::UnexpectedSchema {
                    missing: vec!["state".to_string()],
                })
            }
        }

        let mut session = Session::new();
        assert!(session.load(&Missing).is_err());
        assert!(session.table().is_none());
    }
}
