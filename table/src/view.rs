//! Transient view state: filter text, sort key and page cursor.

use ustr::Ustr;

use crate::prefs::DEFAULT_ROWS_PER_PAGE;
use crate::query::SortDirection;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortState {
    pub column: Ustr,
    pub direction: SortDirection,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewState {
    filter_text: String,
    sort: Option<SortState>,
    current_page: usize,
    rows_per_page: usize,
}

impl Default for ViewState {
    fn default() -> Self {
        Self::new(DEFAULT_ROWS_PER_PAGE)
    }
}

impl ViewState {
    pub fn new(rows_per_page: usize) -> Self {
        Self {
            filter_text: String::new(),
            sort: None,
            current_page: 1,
            rows_per_page: rows_per_page.max(1),
        }
    }

    pub fn filter_text(&self) -> &str {
        &self.filter_text
    }

    /// Replace the filter. Always returns to the first page.
    pub fn set_filter(&mut self, text: impl Into<String>) {
        self.filter_text = text.into();
        self.current_page = 1;
    }

    pub fn sort(&self) -> Option<SortState> {
        self.sort
    }

    /// Header click: the active column flips direction, any other column
    /// becomes the active one, ascending.
    pub fn toggle_sort(&mut self, column: impl Into<Ustr>) {
        let column = column.into();
        let direction = match self.sort {
            Some(active) if active.column == column => active.direction.flipped(),
            _ => SortDirection::Asc,
        };
        self.sort = Some(SortState { column, direction });
    }

    pub fn set_sort(&mut self, column: impl Into<Ustr>, direction: SortDirection) {
        self.sort = Some(SortState {
            column: column.into(),
            direction,
        });
    }

    pub fn clear_sort(&mut self) {
        self.sort = None;
    }

    pub fn current_page(&self) -> usize {
        self.current_page
    }

    pub fn rows_per_page(&self) -> usize {
        self.rows_per_page
    }

    /// Change the page size and go back to the first page. Zero counts as one.
    pub fn set_rows_per_page(&mut self, rows_per_page: usize) {
        self.rows_per_page = rows_per_page.max(1);
        self.current_page = 1;
    }

    /// Jump to `page` (1-indexed). Pages past the end render empty.
    pub fn go_to_page(&mut self, page: usize) {
        self.current_page = page.max(1);
    }

    /// Advance one page unless already on `total_pages` or beyond.
    pub fn next_page(&mut self, total_pages: usize) -> bool {
        if self.current_page < total_pages {
            self.current_page += 1;
            true
        } else {
            false
        }
    }

    /// Step back one page unless already on the first.
    pub fn prev_page(&mut self) -> bool {
        if self.current_page > 1 {
            self.current_page -= 1;
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_resets_page() {
        let mut view = ViewState::new(5);
        view.go_to_page(3);
        view.set_filter("springfield");
        assert_eq!(view.current_page(), 1);
        assert_eq!(view.filter_text(), "springfield");
    }

    #[test]
    fn test_toggle_sort() {
        let mut view = ViewState::default();
        assert_eq!(view.sort(), None);

        view.toggle_sort("amount");
        assert_eq!(view.sort().map(|s| s.direction), Some(SortDirection::Asc));

        view.toggle_sort("amount");
        assert_eq!(view.sort().map(|s| s.direction), Some(SortDirection::Desc));

        view.toggle_sort("amount");
        assert_eq!(view.sort().map(|s| s.direction), Some(SortDirection::Asc));

        view.toggle_sort("amount");
        view.toggle_sort("name");
        let sort = view.sort().expect("sorted");
        assert_eq!(sort.column, Ustr::from("name"));
        assert_eq!(sort.direction, SortDirection::Asc);
    }

    #[test]
    fn test_page_buttons_never_wrap() {
        let mut view = ViewState::new(1);
        assert!(!view.prev_page());
        assert!(view.next_page(2));
        assert_eq!(view.current_page(), 2);
        assert!(!view.next_page(2));
        assert_eq!(view.current_page(), 2);
        assert!(view.prev_page());
        assert_eq!(view.current_page(), 1);
    }

    #[test]
    fn test_no_pages_means_no_next() {
        let mut view = ViewState::default();
        assert!(!view.next_page(0));
        assert_eq!(view.current_page(), 1);
    }

    #[test]
    fn test_rows_per_page_floor_and_reset() {
        let mut view = ViewState::new(0);
        assert_eq!(view.rows_per_page(), 1);
        view.go_to_page(4);
        view.set_rows_per_page(25);
        assert_eq!(view.rows_per_page(), 25);
        assert_eq!(view.current_page(), 1);
    }
}
