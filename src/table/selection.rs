//! Row selection state derived from a controlled list of selected ids.
//!
//! The table never owns the selection. It reads the caller's list and
//! requests changes through `on_change`; the caller applies them and
//! renders again with the new list.

use super::column::Identifiable;

/// Callback invoked with the requested selection.
pub type SelectionCallback<'a> = &'a mut dyn FnMut(Vec<String>);

/// Selection derivations and toggle requests over one data slice.
pub struct Selection<'a, T> {
    data: &'a [T],
    selected: &'a [String],
    on_change: Option<SelectionCallback<'a>>,
}

impl<'a, T: Identifiable> Selection<'a, T> {
    /// Create a selection view without a change callback.
    ///
    /// Derivations work as usual; the handlers do nothing.
    pub fn new(data: &'a [T], selected: &'a [String]) -> Self {
        Self {
            data,
            selected,
            on_change: None,
        }
    }

    /// Create a selection view that reports changes to `on_change`.
    pub fn with_callback(
        data: &'a [T],
        selected: &'a [String],
        on_change: SelectionCallback<'a>,
    ) -> Self {
        Self {
            data,
            selected,
            on_change: Some(on_change),
        }
    }

    /// True when the data is non-empty and as many ids are selected as
    /// there are rows.
    ///
    /// Only lengths are compared; ids left over from another page count
    /// towards the total.
    pub fn all_selected(&self) -> bool {
        !self.data.is_empty() && self.selected.len() == self.data.len()
    }

    /// True when some but not all rows are selected.
    pub fn some_selected(&self) -> bool {
        !self.selected.is_empty() && self.selected.len() < self.data.len()
    }

    /// Whether the given row id is in the selection.
    pub fn is_row_selected(&self, id: &str) -> bool {
        self.selected.iter().any(|s| s == id)
    }

    /// The selection that "select all" would request.
    ///
    /// Clears when the lengths match, otherwise selects every id of the
    /// current data in data order.
    pub fn select_all_request(&self) -> Vec<String> {
        if self.selected.len() == self.data.len() {
            Vec::new()
        } else {
            self.data.iter().map(|row| row.id().to_string()).collect()
        }
    }

    /// The selection that toggling `id` would request.
    pub fn select_row_request(&self, id: &str) -> Vec<String> {
        if self.is_row_selected(id) {
            self.selected
                .iter()
                .filter(|s| s.as_str() != id)
                .cloned()
                .collect()
        } else {
            let mut next = self.selected.to_vec();
            next.push(id.to_string());
            next
        }
    }

    /// Request selecting (or clearing) every row.
    pub fn handle_select_all(&mut self) {
        if self.on_change.is_none() {
            return;
        }
        let next = self.select_all_request();
        if let Some(on_change) = self.on_change.as_mut() {
            on_change(next);
        }
    }

    /// Request toggling a single row.
    pub fn handle_select_row(&mut self, id: &str) {
        if self.on_change.is_none() {
            return;
        }
        let next = self.select_row_request(id);
        if let Some(on_change) = self.on_change.as_mut() {
            on_change(next);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Row(String);

    impl Identifiable for Row {
        fn id(&self) -> &str {
            &self.0
        }
    }

    fn rows(ids: &[&str]) -> Vec<Row> {
        ids.iter().map(|id| Row(id.to_string())).collect()
    }

    fn ids(ids: &[&str]) -> Vec<String> {
        ids.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_all_selected_requires_data() {
        let data: Vec<Row> = Vec::new();
        let selected = Vec::new();
        let selection = Selection::new(&data, &selected);
        assert!(!selection.all_selected());
        assert!(!selection.some_selected());
    }

    #[test]
    fn test_all_selected_when_lengths_match() {
        let data = rows(&["a", "b"]);
        let selected = ids(&["b", "a"]);
        let selection = Selection::new(&data, &selected);
        assert!(selection.all_selected());
        assert!(!selection.some_selected());
    }

    #[test]
    fn test_all_selected_is_length_based() {
        let data = rows(&["a", "b"]);
        let selected = ids(&["x", "y"]);
        let selection = Selection::new(&data, &selected);
        assert!(selection.all_selected());
        assert!(!selection.is_row_selected("a"));
    }

    #[test]
    fn test_some_selected_partial() {
        let data = rows(&["a", "b", "c"]);
        let selected = ids(&["b"]);
        let selection = Selection::new(&data, &selected);
        assert!(selection.some_selected());
        assert!(!selection.all_selected());
        assert!(selection.is_row_selected("b"));
        assert!(!selection.is_row_selected("c"));
    }

    #[test]
    fn test_some_selected_false_when_more_selected_than_rows() {
        let data = rows(&["a"]);
        let selected = ids(&["a", "z"]);
        let selection = Selection::new(&data, &selected);
        assert!(!selection.some_selected());
        assert!(!selection.all_selected());
    }

    #[test]
    fn test_select_all_toggles_full_and_empty() {
        let data = rows(&["a", "b", "c"]);
        let mut current: Vec<String> = Vec::new();

        for expected in [ids(&["a", "b", "c"]), Vec::new(), ids(&["a", "b", "c"])] {
            let mut requested = None;
            let mut on_change = |next: Vec<String>| requested = Some(next);
            Selection::with_callback(&data, &current, &mut on_change).handle_select_all();
            current = requested.expect("callback invoked");
            assert_eq!(current, expected);
        }
    }

    #[test]
    fn test_select_all_replaces_partial_selection() {
        let data = rows(&["a", "b", "c"]);
        let selected = ids(&["stale", "b"]);
        let selection = Selection::new(&data, &selected);
        assert_eq!(selection.select_all_request(), ids(&["a", "b", "c"]));
    }

    #[test]
    fn test_select_row_appends_and_removes_preserving_order() {
        let data = rows(&["a", "b", "c", "d"]);
        let selected = ids(&["c", "a", "d"]);
        let selection = Selection::new(&data, &selected);

        assert_eq!(selection.select_row_request("b"), ids(&["c", "a", "d", "b"]));
        assert_eq!(selection.select_row_request("a"), ids(&["c", "d"]));
    }

    #[test]
    fn test_handle_select_row_invokes_callback() {
        let data = rows(&["a", "b"]);
        let selected = ids(&["a"]);
        let mut calls = Vec::new();
        let mut on_change = |next: Vec<String>| calls.push(next);
        {
            let mut selection = Selection::with_callback(&data, &selected, &mut on_change);
            selection.handle_select_row("b");
            selection.handle_select_row("a");
        }
        assert_eq!(calls, vec![ids(&["a", "b"]), Vec::new()]);
    }

    #[test]
    fn test_handlers_without_callback_are_noops() {
        let data = rows(&["a"]);
        let selected = Vec::new();
        let mut selection = Selection::new(&data, &selected);
        selection.handle_select_all();
        selection.handle_select_row("a");
        assert!(selected.is_empty());
    }
}
