//! Keyboard-driven option lists.
//!
//! Each enum field and the add-row catalogue owns a selector keyed by a
//! [`SelectorId`]. The grid keeps one [`SelectorState`] per id.

use grid_model::RowIndex;

/// Navigation keys understood by selectors and fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavKey {
    Up,
    Down,
    Enter,
    Escape,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FieldId {
    pub row: RowIndex,
    pub name: String,
}

impl FieldId {
    pub fn new(row: RowIndex, name: impl Into<String>) -> Self {
        Self {
            row,
            name: name.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SelectorId {
    Field(FieldId),
    /// Code catalogue of a dynamic layout.
    AddRow,
}

/// One entry a selector can show.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectorItem {
    pub value: String,
    pub label: String,
}

impl SelectorItem {
    pub fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
        }
    }

    fn matches(&self, needle: &str) -> bool {
        needle.is_empty()
            || format!("{} - {}", self.value, self.label)
                .to_lowercase()
                .contains(needle)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectorState {
    pub open: bool,
    pub filter: String,
    pub highlighted: usize,
}

/// Result of a key press on a selector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectorOutcome {
    Moved,
    Commit(String),
    Closed,
    Ignored,
}

/// Items shown for `filter`, skipping `hidden` values.
pub fn visible_items<'a>(
    items: &'a [SelectorItem],
    filter: &str,
    hidden: &dyn Fn(&str) -> bool,
) -> Vec<&'a SelectorItem> {
    let needle = filter.trim().to_lowercase();
    items
        .iter()
        .filter(|item| !hidden(&item.value) && item.matches(&needle))
        .collect()
}

impl SelectorState {
    pub fn set_filter(&mut self, filter: &str) {
        self.filter = filter.to_string();
        self.highlighted = 0;
        self.open = true;
    }

    pub fn close(&mut self) {
        self.open = false;
        self.highlighted = 0;
    }

    /// Apply a key against the currently visible items.
    pub fn key(&mut self, key: NavKey, visible: &[&SelectorItem]) -> SelectorOutcome {
        let last = visible.len().saturating_sub(1);
        match key {
            NavKey::Down => {
                if self.open {
                    self.highlighted = (self.highlighted + 1).min(last);
                } else {
                    self.open = true;
                    self.highlighted = 0;
                }
                SelectorOutcome::Moved
            }
            NavKey::Up => {
                self.open = true;
                self.highlighted = self.highlighted.saturating_sub(1).min(last);
                SelectorOutcome::Moved
            }
            NavKey::Enter => {
                if !self.open {
                    return SelectorOutcome::Ignored;
                }
                match visible.get(self.highlighted.min(last)) {
                    Some(item) => {
                        let value = item.value.clone();
                        self.close();
                        self.filter.clear();
                        SelectorOutcome::Commit(value)
                    }
                    None => SelectorOutcome::Ignored,
                }
            }
            NavKey::Escape => {
                self.close();
                SelectorOutcome::Closed
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn items() -> Vec<SelectorItem> {
        vec![
            SelectorItem::new("10", "Bydło"),
            SelectorItem::new("11", "Trzoda chlewna"),
            SelectorItem::new("12", "Owce"),
        ]
    }

    #[test]
    fn filter_is_case_insensitive_over_code_and_label() {
        let items = items();
        let none = |_: &str| false;
        assert_eq!(visible_items(&items, "TRZODA", &none).len(), 1);
        assert_eq!(visible_items(&items, "11 - t", &none).len(), 1);
        assert_eq!(visible_items(&items, "1", &none).len(), 3);
        assert_eq!(visible_items(&items, "", &none).len(), 3);
    }

    #[test]
    fn hidden_items_never_match() {
        let items = items();
        let hidden = |value: &str| value == "11";
        assert!(visible_items(&items, "Trzoda", &hidden).is_empty());
    }

    #[test]
    fn highlight_is_clamped() {
        let items = items();
        let visible = visible_items(&items, "", &|_| false);
        let mut state = SelectorState::default();
        state.key(NavKey::Down, &visible);
        for _ in 0..5 {
            state.key(NavKey::Down, &visible);
        }
        assert_eq!(state.highlighted, 2);
        for _ in 0..5 {
            state.key(NavKey::Up, &visible);
        }
        assert_eq!(state.highlighted, 0);

        state.key(NavKey::Down, &visible);
        assert_eq!(state.key(NavKey::Enter, &visible), SelectorOutcome::Commit("11".into()));
        assert!(!state.open);
    }

    #[test]
    fn escape_closes_without_commit() {
        let items = items();
        let visible = visible_items(&items, "", &|_| false);
        let mut state = SelectorState::default();
        state.key(NavKey::Down, &visible);
        assert_eq!(state.key(NavKey::Escape, &visible), SelectorOutcome::Closed);
        assert_eq!(state.key(NavKey::Enter, &visible), SelectorOutcome::Ignored);
    }
}
