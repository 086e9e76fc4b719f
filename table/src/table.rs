//! [`DataTable`]: records plus view state, rendered one page at a time.

use std::collections::HashSet;

use log::{debug, info, warn};
use ustr::Ustr;

use crate::actions::{AddAction, AddPayload, BulkAddReport};
use crate::columns::{Column, resolve_columns};
use crate::error::{TableError, TableResult};
use crate::prefs::TablePrefs;
use crate::query::{self, SortDirection};
use crate::record::Record;
use crate::selection::{IdentityField, Selection};
use crate::view::ViewState;

/// Identities the caller already added somewhere. Re-checked on every render.
pub type AddedSet = HashSet<Ustr>;

/// One rendered page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableView {
    pub columns: Vec<Column>,
    pub rows: Vec<RenderedRow>,
    /// 1-indexed.
    pub page: usize,
    pub total_pages: usize,
    /// Rows left after filtering.
    pub total_rows: usize,
    pub has_prev: bool,
    pub has_next: bool,
    /// Whether the table has an identity field at all.
    pub selectable: bool,
    /// State of the select-all checkbox for this page.
    pub all_visible_selected: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedRow {
    pub identity: Option<Ustr>,
    pub cells: Vec<String>,
    pub selected: bool,
    pub busy: bool,
    pub added: bool,
}

impl RenderedRow {
    /// Whether the row's add control is live.
    pub fn can_add(&self) -> bool {
        self.identity.is_some() && !self.busy && !self.added
    }
}

/// In-memory records with filtering, sorting, pagination and selection.
///
/// Rows are never modified. Every query runs on the full set in the order
/// filter, sort, paginate.
#[derive(Debug)]
pub struct DataTable<R> {
    rows: Vec<R>,
    columns: Option<Vec<Ustr>>,
    identity: Option<IdentityField>,
    view: ViewState,
    selection: Selection,
    busy: HashSet<Ustr>,
    prefs: Option<TablePrefs>,
}

impl<R: Record> DataTable<R> {
    pub fn new(rows: Vec<R>) -> Self {
        Self {
            rows,
            columns: None,
            identity: None,
            view: ViewState::default(),
            selection: Selection::new(),
            busy: HashSet::new(),
            prefs: None,
        }
    }

    /// Show exactly these columns, in this order.
    pub fn with_columns<S: AsRef<str>>(mut self, keys: impl IntoIterator<Item = S>) -> Self {
        self.columns = Some(keys.into_iter().map(|k| Ustr::from(k.as_ref())).collect());
        self
    }

    /// Enable selection and add actions, keyed by `identity`.
    pub fn with_identity(mut self, identity: IdentityField) -> Self {
        self.identity = Some(identity);
        self
    }

    /// Load the saved page size and save future changes to it.
    pub fn with_prefs(mut self, prefs: TablePrefs) -> Self {
        self.view.set_rows_per_page(prefs.rows_per_page());
        self.prefs = Some(prefs);
        self
    }

    pub fn rows(&self) -> &[R] {
        &self.rows
    }

    pub fn view_state(&self) -> &ViewState {
        &self.view
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn columns(&self) -> Vec<Column> {
        resolve_columns(&self.rows, self.columns.as_deref())
    }

    pub fn identity_of(&self, row: &R) -> Option<Ustr> {
        self.identity.as_ref()?.identify(row)
    }

    /// Row with identity `id`, looked up across all rows, not just the visible ones.
    pub fn find(&self, id: Ustr) -> Option<&R> {
        self.rows
            .iter()
            .find(|row| self.identity_of(row) == Some(id))
    }

    pub fn is_busy(&self, id: Ustr) -> bool {
        self.busy.contains(&id)
    }

    // View controls.

    pub fn set_filter(&mut self, text: impl Into<String>) {
        self.view.set_filter(text);
    }

    pub fn toggle_sort(&mut self, column: &str) {
        self.view.toggle_sort(column);
    }

    pub fn set_sort(&mut self, column: &str, direction: SortDirection) {
        self.view.set_sort(column, direction);
    }

    pub fn set_rows_per_page(&mut self, rows_per_page: usize) {
        self.view.set_rows_per_page(rows_per_page);
        let Some(prefs) = &self.prefs else {
            return;
        };
        if let Err(e) = prefs.set_rows_per_page(self.view.rows_per_page()) {
            warn!("Failed to save rows per page: {e}");
        }
    }

    pub fn go_to_page(&mut self, page: usize) {
        self.view.go_to_page(page);
    }

    pub fn next_page(&mut self) -> bool {
        let total = self.total_pages();
        self.view.next_page(total)
    }

    pub fn prev_page(&mut self) -> bool {
        self.view.prev_page()
    }

    // Queries.

    /// Indices into [`Self::rows`] after filtering and sorting.
    pub fn processed_indices(&self) -> Vec<usize> {
        let mut indices = query::filter_indices(&self.rows, self.view.filter_text());
        if let Some(sort) = self.view.sort() {
            query::sort_indices(&self.rows, &mut indices, &sort.column, sort.direction);
        }
        indices
    }

    pub fn total_pages(&self) -> usize {
        query::total_pages(self.processed_indices().len(), self.view.rows_per_page())
    }

    /// Rows on the current page.
    pub fn visible_rows(&self) -> Vec<&R> {
        let indices = self.processed_indices();
        query::page_window(&indices, self.view.current_page(), self.view.rows_per_page())
            .iter()
            .map(|&i| &self.rows[i])
            .collect()
    }

    /// Identities on the current page that can be selected: identified and not yet added.
    pub fn selectable_visible(&self, added: &AddedSet) -> Vec<Ustr> {
        self.visible_rows()
            .into_iter()
            .filter_map(|row| self.identity_of(row))
            .filter(|id| !added.contains(id))
            .collect()
    }

    pub fn render(&self, added: &AddedSet) -> TableView {
        let columns = self.columns();
        let indices = self.processed_indices();
        let page = self.view.current_page();
        let rows_per_page = self.view.rows_per_page();
        let total_pages = query::total_pages(indices.len(), rows_per_page);

        let rows: Vec<RenderedRow> = query::page_window(&indices, page, rows_per_page)
            .iter()
            .map(|&i| {
                let row = &self.rows[i];
                let identity = self.identity_of(row);
                RenderedRow {
                    cells: query::render_cells(row, &columns),
                    selected: identity.is_some_and(|id| self.selection.contains(id)),
                    busy: identity.is_some_and(|id| self.busy.contains(&id)),
                    added: identity.is_some_and(|id| added.contains(&id)),
                    identity,
                }
            })
            .collect();

        let selectable_ids: Vec<Ustr> = rows
            .iter()
            .filter(|row| !row.added)
            .filter_map(|row| row.identity)
            .collect();

        TableView {
            columns,
            page,
            total_pages,
            total_rows: indices.len(),
            has_prev: page > 1,
            has_next: page < total_pages,
            selectable: self.identity.is_some(),
            all_visible_selected: self.selection.all_selected(&selectable_ids),
            rows,
        }
    }

    // Selection.

    /// Flip the checkbox of row `id`; returns whether it is selected afterwards.
    pub fn toggle_row(&mut self, id: Ustr, added: &AddedSet) -> TableResult<bool> {
        self.check_addable(id, added)?;
        Ok(self.selection.toggle(id))
    }

    /// The select-all checkbox. Only ever looks at the current page.
    pub fn toggle_select_all(&mut self, added: &AddedSet) -> TableResult<()> {
        if self.identity.is_none() {
            return Err(TableError::NoIdentity);
        }
        let visible = self.selectable_visible(added);
        self.selection.toggle_all(&visible);
        Ok(())
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    // Add actions.

    /// Mark row `id` in flight and build its payload.
    ///
    /// Must be paired with [`Self::finish_add`].
    pub fn begin_add(&mut self, id: Ustr, added: &AddedSet) -> TableResult<AddPayload> {
        self.check_addable(id, added)?;
        if self.busy.contains(&id) {
            return Err(TableError::Busy(id));
        }

        let identity = self.identity.as_ref().ok_or(TableError::NoIdentity)?;
        let payload = self
            .rows
            .iter()
            .find_map(|row| {
                AddPayload::from_record(row, identity).filter(|payload| payload.identity == id)
            })
            .ok_or(TableError::UnknownRow(id))?;

        self.busy.insert(id);
        Ok(payload)
    }

    /// Clear the in-flight mark of `id`. A success also deselects it.
    pub fn finish_add(&mut self, id: Ustr, succeeded: bool) {
        self.busy.remove(&id);
        if succeeded {
            self.selection.remove(id);
        }
    }

    /// Run `action` for row `id`.
    ///
    /// On failure the row stays selected so it can be retried.
    pub async fn add_row<A: AddAction>(
        &mut self,
        id: Ustr,
        added: &AddedSet,
        action: &A,
    ) -> TableResult<()> {
        let payload = self.begin_add(id, added)?;
        debug!("Adding {id}");

        match action.add(payload).await {
            Ok(()) => {
                self.finish_add(id, true);
                info!("Added {id}");
                Ok(())
            }
            Err(e) => {
                self.finish_add(id, false);
                warn!("Failed to add {id}: {e}");
                Err(TableError::add_failed(id, e.to_string()))
            }
        }
    }

    /// Add every selected row, one at a time, in selection order.
    ///
    /// A failure does not stop the run; failed rows stay selected.
    pub async fn add_selected<A: AddAction>(
        &mut self,
        added: &AddedSet,
        action: &A,
    ) -> BulkAddReport {
        let mut report = BulkAddReport::default();
        let pending: Vec<Ustr> = self.selection.iter().collect();

        for id in pending {
            match self.add_row(id, added, action).await {
                Ok(()) => report.added.push(id),
                Err(TableError::AddFailed { identity, message }) => {
                    report.failed.push((identity, message));
                }
                Err(e) => {
                    debug!("Skipping {id}: {e}");
                    report.skipped.push(id);
                }
            }
        }

        info!(
            "Bulk add finished: {} added, {} failed, {} skipped",
            report.added.len(),
            report.failed.len(),
            report.skipped.len()
        );
        report
    }

    fn check_addable(&self, id: Ustr, added: &AddedSet) -> TableResult<()> {
        if self.identity.is_none() {
            return Err(TableError::NoIdentity);
        }
        if added.contains(&id) {
            return Err(TableError::AlreadyAdded(id));
        }
        if self.find(id).is_none() {
            return Err(TableError::UnknownRow(id));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Row;

    fn schools(n: usize) -> Vec<Row> {
        (1..=n)
            .map(|i| {
                Row::new()
                    .with("ben", i.to_string())
                    .with("entity_name", format!("School {i}"))
            })
            .collect()
    }

    #[test]
    fn test_render_marks_boundaries() {
        let mut table = DataTable::new(schools(3));
        table.set_rows_per_page(2);

        let view = table.render(&AddedSet::new());
        assert_eq!(view.total_pages, 2);
        assert_eq!(view.total_rows, 3);
        assert!(!view.has_prev);
        assert!(view.has_next);
        assert!(!view.selectable);

        assert!(table.next_page());
        let view = table.render(&AddedSet::new());
        assert_eq!(view.rows.len(), 1);
        assert!(view.has_prev);
        assert!(!view.has_next);
        assert!(!table.next_page());
    }

    #[test]
    fn test_no_identity_field_disables_selection() {
        let mut table = DataTable::new(schools(2));
        assert_eq!(
            table.toggle_row(Ustr::from("1"), &AddedSet::new()),
            Err(TableError::NoIdentity)
        );
        assert_eq!(
            table.toggle_select_all(&AddedSet::new()),
            Err(TableError::NoIdentity)
        );
    }

    #[test]
    fn test_rows_without_identity_cannot_be_selected() {
        let rows = vec![Row::new().with("ben", "1"), Row::new().with("name", "orphan")];
        let mut table = DataTable::new(rows).with_identity(IdentityField::default());
        table.toggle_select_all(&AddedSet::new()).expect("select all");

        assert_eq!(table.selection().iter().collect::<Vec<_>>(), vec![Ustr::from("1")]);
        let view = table.render(&AddedSet::new());
        assert!(view.all_visible_selected);
        assert_eq!(view.rows[1].identity, None);
        assert!(!view.rows[1].can_add());
    }

    #[test]
    fn test_added_rows_are_not_selectable() {
        let mut table = DataTable::new(schools(2)).with_identity(IdentityField::default());
        let added: AddedSet = [Ustr::from("2")].into_iter().collect();

        assert_eq!(
            table.toggle_row(Ustr::from("2"), &added),
            Err(TableError::AlreadyAdded(Ustr::from("2")))
        );
        table.toggle_select_all(&added).expect("select all");
        assert_eq!(table.selection().len(), 1);

        let view = table.render(&added);
        assert!(view.rows[1].added);
        assert!(view.all_visible_selected);
    }

    #[test]
    fn test_begin_add_blocks_retrigger() {
        let mut table = DataTable::new(schools(1)).with_identity(IdentityField::default());
        let id = Ustr::from("1");
        let added = AddedSet::new();

        let payload = table.begin_add(id, &added).expect("begin");
        assert_eq!(payload.identity, id);
        assert!(table.render(&added).rows[0].busy);
        assert_eq!(table.begin_add(id, &added), Err(TableError::Busy(id)));

        table.finish_add(id, false);
        assert!(!table.is_busy(id));
        assert!(table.begin_add(id, &added).is_ok());
    }

    #[test]
    fn test_unknown_row() {
        let mut table = DataTable::new(schools(1)).with_identity(IdentityField::default());
        let id = Ustr::from("404");
        assert_eq!(
            table.begin_add(id, &AddedSet::new()),
            Err(TableError::UnknownRow(id))
        );
    }
}
