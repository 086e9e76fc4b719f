//! Filter, sort and paginate, as pure functions over row indices.
//!
//! Working on indices keeps the caller's rows untouched and lets each stage
//! consume the previous stage's output.

use std::cmp::Ordering;

use crate::columns::Column;
use crate::record::Record;
use crate::value::{CellValue, compare_values};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn flipped(self) -> Self {
        match self {
            Self::Asc => Self::Desc,
            Self::Desc => Self::Asc,
        }
    }
}

/// Whether `row` matches `filter` (already lowercased) in any of its fields.
///
/// Every field of the record is searched, not only the displayed columns.
pub fn row_matches<R: Record>(row: &R, filter: &str) -> bool {
    row.keys().iter().any(|key| {
        row.value(key)
            .to_plain_string()
            .is_some_and(|s| s.to_lowercase().contains(filter))
    })
}

/// Indices of the rows matching `filter_text`, in original order.
pub fn filter_indices<R: Record>(rows: &[R], filter_text: &str) -> Vec<usize> {
    let needle = filter_text.to_lowercase();
    if needle.is_empty() {
        return (0..rows.len()).collect();
    }
    rows.iter()
        .enumerate()
        .filter(|(_, row)| row_matches(*row, &needle))
        .map(|(i, _)| i)
        .collect()
}

/// Order for one column: nulls and NaN last in both directions, the rest by
/// [`compare_values`] negated when descending.
pub fn compare_for_sort(a: &CellValue, b: &CellValue, direction: SortDirection) -> Ordering {
    match (a.sorts_last(), b.sorts_last()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => {
            let ord = compare_values(a, b);
            match direction {
                SortDirection::Asc => ord,
                SortDirection::Desc => ord.reverse(),
            }
        }
    }
}

/// Stable sort of `indices` by `column`.
pub fn sort_indices<R: Record>(rows: &[R], indices: &mut [usize], column: &str, direction: SortDirection) {
    // Extract once so the comparator does not rebuild values per comparison.
    let keys: Vec<CellValue> = rows.iter().map(|row| row.value(column)).collect();
    indices.sort_by(|&a, &b| compare_for_sort(&keys[a], &keys[b], direction));
}

/// `ceil(len / rows_per_page)`; a zero page size counts as one.
pub fn total_pages(len: usize, rows_per_page: usize) -> usize {
    len.div_ceil(rows_per_page.max(1))
}

/// Window for 1-indexed `page`. Out-of-range pages are empty.
pub fn page_window<T>(items: &[T], page: usize, rows_per_page: usize) -> &[T] {
    let rows_per_page = rows_per_page.max(1);
    let start = page.saturating_sub(1).saturating_mul(rows_per_page);
    if page == 0 || start >= items.len() {
        return &[];
    }
    let end = (start + rows_per_page).min(items.len());
    &items[start..end]
}

/// Cell strings for `row` under `columns`.
pub fn render_cells<R: Record>(row: &R, columns: &[Column]) -> Vec<String> {
    columns
        .iter()
        .map(|column| row.value(&column.key).to_string())
        .collect()
}
