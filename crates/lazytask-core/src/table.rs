#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CellTone {
    Header,
    #[default]
    Normal,
    Active,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Cell {
    pub text: String,
    pub tone: CellTone,
    pub selectable: bool,
}

impl Cell {
    pub fn new(text: impl Into<String>, tone: CellTone, selectable: bool) -> Self {
        Self {
            text: text.into(),
            tone,
            selectable,
        }
    }

    pub fn header(text: impl Into<String>) -> Self {
        Self::new(text, CellTone::Header, false)
    }
}

/// Rendered grid of one panel. Row 0 holds the header once populated. Rows can
/// be ragged when a later write reaches further right than an earlier one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableModel {
    rows: Vec<Vec<Cell>>,
}

impl TableModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.rows.iter().map(Vec::len).max().unwrap_or(0)
    }

    pub fn cell_count(&self) -> usize {
        self.rows.iter().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    pub fn cell(&self, row: usize, column: usize) -> Option<&Cell> {
        self.rows.get(row).and_then(|cells| cells.get(column))
    }

    pub fn text(&self, row: usize, column: usize) -> Option<&str> {
        self.cell(row, column).map(|cell| cell.text.as_str())
    }

    pub fn set_cell(&mut self, row: usize, column: usize, cell: Cell) {
        if row >= self.rows.len() {
            self.rows.resize_with(row + 1, Vec::new);
        }
        let cells = &mut self.rows[row];
        if column >= cells.len() {
            cells.resize_with(column + 1, Cell::default);
        }
        cells[column] = cell;
    }

    pub fn clear(&mut self) {
        self.rows.clear();
    }

    pub fn truncate_rows(&mut self, rows: usize) {
        self.rows.truncate(rows);
    }

    pub fn is_row_selectable(&self, row: usize) -> bool {
        self.selectable_column(row).is_some()
    }

    pub fn selectable_column(&self, row: usize) -> Option<usize> {
        self.rows
            .get(row)?
            .iter()
            .position(|cell| cell.selectable)
    }

    /// Widest text per column, in characters.
    pub fn column_widths(&self) -> Vec<usize> {
        let mut widths = vec![0; self.column_count()];
        for cells in &self.rows {
            for (idx, cell) in cells.iter().enumerate() {
                widths[idx] = widths[idx].max(cell.text.chars().count());
            }
        }
        widths
    }
}
