//! Table row checkboxes and tab strips

/// Per-row checkboxes with a header "select all" checkbox
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowSelection {
    header: bool,
    rows: Vec<bool>,
}

impl RowSelection {
    pub fn new(row_count: usize) -> Self {
        Self {
            header: false,
            rows: vec![false; row_count],
        }
    }

    pub fn header_checked(&self) -> bool {
        self.header
    }

    pub fn is_checked(&self, row: usize) -> bool {
        self.rows.get(row).copied().unwrap_or(false)
    }

    pub fn checked_count(&self) -> usize {
        self.rows.iter().filter(|c| **c).count()
    }

    pub fn toggle_row(&mut self, row: usize) {
        if let Some(checked) = self.rows.get_mut(row) {
            *checked = !*checked;
        }
    }

    /// Flip the header checkbox and copy its state to every row
    pub fn toggle_all(&mut self) {
        self.header = !self.header;
        let state = self.header;
        self.rows.iter_mut().for_each(|c| *c = state);
    }
}

/// Tabs with exactly one active
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TabStrip {
    titles: Vec<String>,
    active: usize,
}

impl TabStrip {
    pub fn new(titles: Vec<String>) -> Self {
        Self { titles, active: 0 }
    }

    pub fn titles(&self) -> &[String] {
        &self.titles
    }

    pub fn active(&self) -> usize {
        self.active
    }

    pub fn is_empty(&self) -> bool {
        self.titles.is_empty()
    }

    /// Activate a tab; out-of-range indices are ignored
    pub fn switch_to(&mut self, index: usize) {
        if index < self.titles.len() {
            self.active = index;
        }
    }

    pub fn next(&mut self) {
        if !self.titles.is_empty() {
            self.active = (self.active + 1) % self.titles.len();
        }
    }

    pub fn prev(&mut self) {
        if !self.titles.is_empty() {
            let len = self.titles.len();
            self.active = if self.active == 0 { len - 1 } else { self.active - 1 };
        }
    }
}
