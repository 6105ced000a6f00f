use std::collections::BTreeSet;

/// Dates queued for a bulk block, as ISO strings.  Lives only for the
/// session; it is emptied once its dates have been committed.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub(crate) struct Selection(BTreeSet<String>);

#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) enum SelectionAction {
    /// Add the date if absent, remove it if present
    Toggle(String),
    Clear,
}

impl Selection {
    pub(crate) fn new() -> Selection {
        Selection::default()
    }

    #[must_use]
    pub(crate) fn apply(mut self, action: SelectionAction) -> Selection {
        match action {
            SelectionAction::Toggle(iso) => {
                if !self.0.remove(&iso) {
                    self.0.insert(iso);
                }
            }
            SelectionAction::Clear => self.0.clear(),
        }
        self
    }

    pub(crate) fn contains(&self, iso: &str) -> bool {
        self.0.contains(iso)
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub(crate) fn len(&self) -> usize {
        self.0.len()
    }

    /// Iterate over the selected dates in ascending order
    pub(crate) fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}
