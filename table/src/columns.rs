//! Column resolution and header labels.

use ustr::Ustr;

use crate::record::Record;

/// Columns shown when the caller does not pick them.
pub const MAX_AUTO_COLUMNS: usize = 8;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    pub key: Ustr,
    pub label: String,
}

impl Column {
    pub fn new(key: impl AsRef<str>) -> Self {
        let key = Ustr::from(key.as_ref());
        Self {
            label: header_label(&key),
            key,
        }
    }
}

/// The columns to display.
///
/// An explicit list is used verbatim. Otherwise the first record's keys, in
/// order, capped at [`MAX_AUTO_COLUMNS`]. No records and no list means no
/// columns.
pub fn resolve_columns<R: Record>(rows: &[R], explicit: Option<&[Ustr]>) -> Vec<Column> {
    match explicit {
        Some(keys) => keys.iter().map(Column::new).collect(),
        None => rows
            .first()
            .map(|first| {
                first
                    .keys()
                    .into_iter()
                    .take(MAX_AUTO_COLUMNS)
                    .map(Column::new)
                    .collect()
            })
            .unwrap_or_default(),
    }
}

/// Human label for a field name.
///
/// `funding_year` → `Funding Year`, `entityName` → `Entity Name`,
/// `BEN` → `BEN`. Underscores become spaces, a space goes before an uppercase
/// letter that follows a lowercase letter or digit, and every word starts
/// uppercase.
pub fn header_label(key: &str) -> String {
    let mut spaced = String::with_capacity(key.len() + 4);
    let mut prev: Option<char> = None;
    for c in key.chars() {
        let c = if c == '_' { ' ' } else { c };
        if c.is_uppercase() && prev.is_some_and(|p| p.is_lowercase() || p.is_ascii_digit()) {
            spaced.push(' ');
        }
        spaced.push(c);
        prev = Some(c);
    }

    spaced
        .split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
