//! Client-side record table.
//!
//! Takes an in-memory list of heterogeneous records and provides text
//! filtering, single-column sorting, pagination, checkbox selection and an
//! optional per-row async "add" action. Nothing here touches the network; the
//! add action is supplied by the caller.
//!
//! ```text
//! rows -> filter -> sort -> paginate -> TableView
//! ```

mod actions;
mod columns;
mod error;
mod prefs;
pub mod query;
mod record;
mod selection;
mod table;
mod value;
mod view;

pub use actions::{AddAction, AddPayload, BulkAddReport, PAYLOAD_FIELDS, PayloadField};
pub use columns::{Column, MAX_AUTO_COLUMNS, header_label, resolve_columns};
pub use error::{TableError, TableResult};
pub use prefs::{DEFAULT_ROWS_PER_PAGE, ROWS_PER_PAGE_KEY, ROWS_PER_PAGE_OPTIONS, TablePrefs};
pub use query::SortDirection;
pub use record::{Record, Row};
pub use selection::{IdentityField, Selection};
pub use table::{AddedSet, DataTable, RenderedRow, TableView};
pub use value::{CellValue, YEAR_RANGE, compare_values};
pub use view::{SortState, ViewState};
