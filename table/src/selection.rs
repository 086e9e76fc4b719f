//! Row identity and the set of selected rows.

use ustr::Ustr;

use crate::record::Record;

/// Field names that identify a row, tried in order and matched ignoring case.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityField {
    aliases: Vec<Ustr>,
}

impl Default for IdentityField {
    /// Billed entity number, under the names the list endpoints use for it.
    fn default() -> Self {
        Self::new(["ben", "billed_entity_number"])
    }
}

impl IdentityField {
    pub fn new<S: AsRef<str>>(aliases: impl IntoIterator<Item = S>) -> Self {
        Self {
            aliases: aliases
                .into_iter()
                .map(|alias| Ustr::from(alias.as_ref()))
                .collect(),
        }
    }

    /// The name the identity is sent under.
    pub fn canonical(&self) -> Option<Ustr> {
        self.aliases.first().copied()
    }

    pub fn aliases(&self) -> &[Ustr] {
        &self.aliases
    }

    /// Identity of `row`: the first alias present with a non-null, non-blank value.
    pub fn identify<R: Record>(&self, row: &R) -> Option<Ustr> {
        self.aliases.iter().find_map(|alias| {
            let (_, value) = row.value_ignore_case(alias)?;
            let text = value.to_plain_string()?;
            let text = text.trim();
            (!text.is_empty()).then(|| Ustr::from(text))
        })
    }
}

/// Selected identities in the order they were selected.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    ids: Vec<Ustr>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, id: Ustr) -> bool {
        self.ids.contains(&id)
    }

    /// Returns `false` if `id` was already selected.
    pub fn insert(&mut self, id: Ustr) -> bool {
        if self.contains(id) {
            return false;
        }
        self.ids.push(id);
        true
    }

    /// Returns `false` if `id` was not selected.
    pub fn remove(&mut self, id: Ustr) -> bool {
        let before = self.ids.len();
        self.ids.retain(|selected| *selected != id);
        self.ids.len() != before
    }

    /// Flip `id`; returns whether it is selected afterwards.
    pub fn toggle(&mut self, id: Ustr) -> bool {
        if self.remove(id) {
            false
        } else {
            self.ids.push(id);
            true
        }
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = Ustr> + '_ {
        self.ids.iter().copied()
    }

    /// Whether every one of `visible` is selected. Nothing visible means no.
    pub fn all_selected(&self, visible: &[Ustr]) -> bool {
        !visible.is_empty() && visible.iter().all(|id| self.contains(*id))
    }

    /// Select-all checkbox: empty the selection when every visible row is
    /// already selected, otherwise make it exactly the visible rows.
    pub fn toggle_all(&mut self, visible: &[Ustr]) {
        if self.all_selected(visible) {
            self.clear();
        } else {
            self.ids.clear();
            for id in visible {
                self.insert(*id);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Row;
    use crate::value::CellValue;

    fn ids(raw: &[&str]) -> Vec<Ustr> {
        raw.iter().map(|s| Ustr::from(*s)).collect()
    }

    #[test]
    fn test_identity_alias_group_ignores_case() {
        let field = IdentityField::default();
        assert_eq!(
            field.identify(&Row::new().with("BEN", 17)),
            Some(Ustr::from("17"))
        );
        assert_eq!(
            field.identify(&Row::new().with("Billed_Entity_Number", "88")),
            Some(Ustr::from("88"))
        );
    }

    #[test]
    fn test_missing_null_or_blank_identity() {
        let field = IdentityField::default();
        assert_eq!(field.identify(&Row::new().with("name", "A")), None);
        assert_eq!(field.identify(&Row::new().with("ben", CellValue::Null)), None);
        assert_eq!(field.identify(&Row::new().with("ben", "  ")), None);
    }

    #[test]
    fn test_later_alias_used_when_first_is_null() {
        let field = IdentityField::default();
        let row = Row::new()
            .with("ben", CellValue::Null)
            .with("billed_entity_number", 5);
        assert_eq!(field.identify(&row), Some(Ustr::from("5")));
    }

    #[test]
    fn test_toggle_and_order() {
        let mut selection = Selection::new();
        assert!(selection.toggle(Ustr::from("b")));
        assert!(selection.insert(Ustr::from("a")));
        assert!(!selection.insert(Ustr::from("a")));
        assert_eq!(selection.iter().collect::<Vec<_>>(), ids(&["b", "a"]));

        assert!(!selection.toggle(Ustr::from("b")));
        assert_eq!(selection.len(), 1);
        assert!(!selection.remove(Ustr::from("zzz")));
    }

    #[test]
    fn test_toggle_all_switches_between_empty_and_visible() {
        let mut selection = Selection::new();
        selection.insert(Ustr::from("elsewhere"));
        let page = ids(&["1", "2"]);

        selection.toggle_all(&page);
        assert_eq!(selection.iter().collect::<Vec<_>>(), page);
        assert!(selection.all_selected(&page));

        selection.toggle_all(&page);
        assert!(selection.is_empty());
    }

    #[test]
    fn test_all_selected_is_false_for_empty_page() {
        let mut selection = Selection::new();
        selection.insert(Ustr::from("1"));
        assert!(!selection.all_selected(&[]));
    }
}
