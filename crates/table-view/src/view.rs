use serde::Serialize;

/// Which columns of a table are shown.
///
/// Starts out with every column the first time columns are known; after that
/// it only loses columns that disappear from the data.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnSelection {
    selected: Option<Vec<String>>,
}

impl ColumnSelection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reconciles the selection with the columns the data currently has.
    ///
    /// An empty column set (data still loading) changes nothing. An empty
    /// selection is reseeded with every available column.
    pub fn sync(&mut self, available: &[String]) {
        if available.is_empty() {
            return;
        }
        let reseed = self.selected.as_ref().is_none_or(Vec::is_empty);
        if reseed {
            self.selected = Some(available.to_vec());
        } else if let Some(selected) = self.selected.as_mut() {
            selected.retain(|column| available.contains(column));
        }
    }

    /// The columns to display. An external override wins, even an empty one.
    pub fn active<'a>(&'a self, external: Option<&'a [String]>) -> &'a [String] {
        match external {
            Some(columns) => columns,
            None => self.selected.as_deref().unwrap_or(&[]),
        }
    }

    /// Shows a hidden column (at the end) or hides a shown one.
    pub fn toggle(&mut self, column: &str) {
        let selected = self.selected.get_or_insert_with(Vec::new);
        if let Some(position) = selected.iter().position(|c| c == column) {
            selected.remove(position);
        } else {
            selected.push(column.to_string());
        }
    }

    pub fn set(&mut self, columns: Vec<String>) {
        self.selected = Some(columns);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Overflow {
    Hidden,
    Auto,
}

/// Size bounds of the container a table is drawn in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ContainerStyle {
    /// `None` means unbounded.
    pub max_height: Option<u32>,
    pub overflow: Overflow,
}

/// The expand/collapse state of a long table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExpandableRows {
    expanded: bool,
}

impl ExpandableRows {
    pub const COLLAPSED_ROW_LIMIT: usize = 5;
    pub const COLLAPSED_MAX_HEIGHT: u32 = 300;
    pub const EXPANDED_MARGIN: u32 = 30;

    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_expanded(&self) -> bool {
        self.expanded
    }

    pub fn toggle(&mut self) {
        self.expanded = !self.expanded;
    }

    pub fn displayed_rows<'a, T>(&self, rows: &'a [T]) -> &'a [T] {
        if self.expanded {
            rows
        } else {
            &rows[..rows.len().min(Self::COLLAPSED_ROW_LIMIT)]
        }
    }

    /// The toggle is only worth offering when collapsing would hide rows.
    pub fn show_toggle(&self, total_rows: usize) -> bool {
        total_rows > Self::COLLAPSED_ROW_LIMIT
    }

    /// Collapsed: a fixed height with the overflow clipped. Expanded: the
    /// rendered table's natural height plus a margin, so the last row is
    /// never cut off; unbounded until that height has been measured.
    pub fn container_style(&self, scroll_height: Option<u32>) -> ContainerStyle {
        if !self.expanded {
            return ContainerStyle {
                max_height: Some(Self::COLLAPSED_MAX_HEIGHT),
                overflow: Overflow::Hidden,
            };
        }
        ContainerStyle {
            max_height: scroll_height.map(|height| height.saturating_add(Self::EXPANDED_MARGIN)),
            overflow: Overflow::Auto,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(columns: &[&str]) -> Vec<String> {
        columns.iter().map(|c| c.to_string()).collect()
    }

    #[test]
    fn selection_starts_full_then_drops_vanished_columns() {
        let mut selection = ColumnSelection::new();
        selection.sync(&[]);
        assert!(selection.active(None).is_empty());

        selection.sync(&names(&["A", "B", "C"]));
        assert_eq!(selection.active(None), names(&["A", "B", "C"]).as_slice());

        selection.sync(&names(&["A", "C"]));
        assert_eq!(selection.active(None), names(&["A", "C"]).as_slice());

        // A column that comes back is not re-selected automatically.
        selection.sync(&names(&["A", "B", "C"]));
        assert_eq!(selection.active(None), names(&["A", "C"]).as_slice());
    }

    #[test]
    fn reloading_table_keeps_the_selection() {
        let mut selection = ColumnSelection::new();
        selection.sync(&names(&["A", "B", "C"]));
        selection.sync(&[]);
        assert_eq!(selection.active(None), names(&["A", "B", "C"]).as_slice());

        selection.sync(&names(&["A", "B", "C"]));
        assert_eq!(selection.active(None), names(&["A", "B", "C"]).as_slice());
    }

    #[test]
    fn emptied_selection_is_reseeded() {
        let mut selection = ColumnSelection::new();
        selection.sync(&names(&["A", "B"]));
        selection.sync(&names(&["C"]));
        assert!(selection.active(None).is_empty());

        selection.sync(&names(&["C", "D"]));
        assert_eq!(selection.active(None), names(&["C", "D"]).as_slice());
    }

    #[test]
    fn external_override_wins_even_when_empty() {
        let mut selection = ColumnSelection::new();
        selection.sync(&names(&["A", "B"]));
        let external: Vec<String> = Vec::new();
        assert!(selection.active(Some(external.as_slice())).is_empty());
        let external = names(&["B"]);
        assert_eq!(selection.active(Some(external.as_slice())), external.as_slice());
    }

    #[test]
    fn toggle_hides_and_reshows_columns() {
        let mut selection = ColumnSelection::new();
        selection.set(names(&["A", "B"]));
        selection.toggle("A");
        assert_eq!(selection.active(None), names(&["B"]).as_slice());
        selection.toggle("A");
        assert_eq!(selection.active(None), names(&["B", "A"]).as_slice());
    }

    #[test]
    fn collapsed_tables_show_five_rows() {
        let rows: Vec<u32> = (0..8).collect();
        let mut view = ExpandableRows::new();
        assert_eq!(view.displayed_rows(&rows), &rows[..5]);
        assert!(view.show_toggle(rows.len()));
        assert!(!view.show_toggle(5));

        view.toggle();
        assert_eq!(view.displayed_rows(&rows).len(), 8);
        assert_eq!(view.displayed_rows(&rows[..3]).len(), 3);
    }

    #[test]
    fn container_grows_to_the_measured_height() {
        let mut view = ExpandableRows::new();
        assert_eq!(
            view.container_style(Some(900)),
            ContainerStyle { max_height: Some(300), overflow: Overflow::Hidden }
        );
        view.toggle();
        assert_eq!(
            view.container_style(Some(900)),
            ContainerStyle { max_height: Some(930), overflow: Overflow::Auto }
        );
        assert_eq!(view.container_style(None).max_height, None);
    }
}
