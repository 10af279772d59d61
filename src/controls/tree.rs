//! Expandable tree rows (e.g. a simulated menu tree)

use serde::{Deserialize, Serialize};

pub const EXPANDED: &str = "▼";
pub const COLLAPSED: &str = "▶";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeRow {
    pub label: String,
    #[serde(default)]
    pub level: usize,
    #[serde(default = "default_true")]
    pub visible: bool,
    #[serde(default = "default_true")]
    pub expanded: bool,
}

fn default_true() -> bool {
    true
}

impl TreeRow {
    pub fn new(label: impl Into<String>, level: usize) -> Self {
        Self {
            label: label.into(),
            level,
            visible: true,
            expanded: true,
        }
    }

    pub fn expander(&self) -> &'static str {
        if self.expanded {
            EXPANDED
        } else {
            COLLAPSED
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TreeRows {
    rows: Vec<TreeRow>,
}

impl TreeRows {
    pub fn new(rows: Vec<TreeRow>) -> Self {
        Self { rows }
    }

    pub fn rows(&self) -> &[TreeRow] {
        &self.rows
    }

    pub fn has_children(&self, index: usize) -> bool {
        match (self.rows.get(index), self.rows.get(index + 1)) {
            (Some(row), Some(next)) => next.level > row.level,
            _ => false,
        }
    }

    /// Flip a row's expander and show or hide every following deeper row.
    ///
    /// Descendants all take the new state, including rows under nested
    /// nodes that are themselves collapsed.
    pub fn toggle(&mut self, index: usize) {
        let Some(row) = self.rows.get_mut(index) else {
            return;
        };
        let was_expanded = row.expanded;
        row.expanded = !was_expanded;
        let level = row.level;

        for next in self.rows.iter_mut().skip(index + 1) {
            if next.level <= level {
                break;
            }
            next.visible = !was_expanded;
        }
    }

    /// Indices of rows currently shown
    pub fn visible_indices(&self) -> Vec<usize> {
        self.rows
            .iter()
            .enumerate()
            .filter(|(_, row)| row.visible)
            .map(|(i, _)| i)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn menu() -> TreeRows {
        TreeRows::new(vec![
            TreeRow::new("Favorites", 0),
            TreeRow::new("SAP Menu", 0),
            TreeRow::new("Logistics", 1),
            TreeRow::new("Materials Management", 2),
            TreeRow::new("Purchasing", 3),
            TreeRow::new("Accounting", 1),
            TreeRow::new("Tools", 0),
        ])
    }

    #[test]
    fn test_collapse_hides_descendants_only() {
        let mut tree = menu();
        tree.toggle(1);

        assert_eq!(tree.rows()[1].expander(), COLLAPSED);
        assert_eq!(tree.visible_indices(), vec![0, 1, 6]);
    }

    #[test]
    fn test_expand_shows_all_descendants() {
        let mut tree = menu();
        tree.toggle(2);
        tree.toggle(1);
        tree.toggle(1);

        assert_eq!(tree.rows()[1].expander(), EXPANDED);
        assert_eq!(tree.visible_indices(), vec![0, 1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn test_leaf_toggle_changes_only_expander() {
        let mut tree = menu();
        tree.toggle(4);
        assert_eq!(tree.visible_indices().len(), 7);
        assert!(!tree.rows()[4].expanded);
    }

    #[test]
    fn test_has_children() {
        let tree = menu();
        assert!(!tree.has_children(0));
        assert!(tree.has_children(1));
        assert!(!tree.has_children(6));
        assert!(!tree.has_children(99));
    }

    #[test]
    fn test_out_of_range_toggle_is_ignored() {
        let mut tree = menu();
        tree.toggle(42);
        assert_eq!(tree, menu());
    }
}
