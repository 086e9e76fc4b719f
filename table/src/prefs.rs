use std::sync::Arc;

use erate_store::{KeyValueStore, StoreResult};
use log::warn;

/// Store key of the rows-per-page preference.
pub const ROWS_PER_PAGE_KEY: &str = "erate-table-rows-per-page";

pub const DEFAULT_ROWS_PER_PAGE: usize = 10;

/// Page sizes offered by the page-size picker.
pub const ROWS_PER_PAGE_OPTIONS: [usize; 4] = [10, 25, 50, 100];

/// Table preferences that outlive a session.
#[derive(Debug, Clone)]
pub struct TablePrefs {
    store: Arc<dyn KeyValueStore>,
}

impl TablePrefs {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Saved page size, or [`DEFAULT_ROWS_PER_PAGE`] when missing or unreadable.
    pub fn rows_per_page(&self) -> usize {
        match self.store.get(ROWS_PER_PAGE_KEY) {
            Ok(Some(raw)) => match raw.trim().parse::<usize>() {
                Ok(n) if n > 0 => n,
                _ => {
                    warn!("Ignoring invalid {ROWS_PER_PAGE_KEY} value {raw:?}");
                    DEFAULT_ROWS_PER_PAGE
                }
            },
            Ok(None) => DEFAULT_ROWS_PER_PAGE,
            Err(e) => {
                warn!("Failed to read {ROWS_PER_PAGE_KEY}: {e}");
                DEFAULT_ROWS_PER_PAGE
            }
        }
    }

    pub fn set_rows_per_page(&self, rows_per_page: usize) -> StoreResult<()> {
        self.store
            .set(ROWS_PER_PAGE_KEY, &rows_per_page.max(1).to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use erate_store::MemoryStore;

    #[test]
    fn test_default_when_unset() {
        let prefs = TablePrefs::new(Arc::new(MemoryStore::new()));
        assert_eq!(prefs.rows_per_page(), DEFAULT_ROWS_PER_PAGE);
    }

    #[test]
    fn test_round_trip_through_store() {
        let store = Arc::new(MemoryStore::new());
        let prefs = TablePrefs::new(store.clone());
        prefs.set_rows_per_page(50).expect("save");

        assert_eq!(
            store.get(ROWS_PER_PAGE_KEY).expect("read").as_deref(),
            Some("50")
        );
        assert_eq!(TablePrefs::new(store).rows_per_page(), 50);
    }

    #[test]
    fn test_garbage_falls_back_to_default() {
        for raw in ["", "0", "-3", "many"] {
            let store = MemoryStore::with_entries([(ROWS_PER_PAGE_KEY, raw)]);
            let prefs = TablePrefs::new(Arc::new(store));
            assert_eq!(prefs.rows_per_page(), DEFAULT_ROWS_PER_PAGE, "raw = {raw:?}");
        }
    }
}
