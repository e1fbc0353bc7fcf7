use crate::spreadsheet::cell::Cell;

/// A worksheet read from a workbook. Only cells holding a value are kept.
pub(crate) struct Sheet {
    pub(crate) name: String,
    /// Cells in row-major order
    pub(crate) cells: Vec<Cell>,
    /// `(row, first cell, end cell)` for every row that holds at least one cell
    rows: Vec<(usize, usize, usize)>,
    /// Used column range, inclusive
    columns: Option<(usize, usize)>,
}

impl Sheet {
    pub(super) fn new(name: &str) -> Self {
        Self {
            name: name.to_owned(),
            cells: Vec::new(),
            rows: Vec::new(),
            columns: None,
        }
    }

    /// Adds a cell; cells must arrive in row-major order.
    pub(super) fn push(&mut self, cell: Cell) {
        let index = self.cells.len();
        match self.rows.last_mut() {
            Some((row, _, end)) if *row == cell.row => *end = index + 1,
            _ => self.rows.push((cell.row, index, index + 1)),
        }
        self.columns = Some(match self.columns {
            Some((first, last)) => (first.min(cell.col), last.max(cell.col)),
            None => (cell.col, cell.col),
        });
        self.cells.push(cell);
    }

    /// One record per non-empty row, each spanning the used column range.
    /// Rows without any cell are left out.
    pub(crate) fn records(&self) -> Vec<Vec<Option<&Cell>>> {
        let Some((first, last)) = self.columns else {
            return Vec::new();
        };
        self.rows
            .iter()
            .map(|&(_, start, end)| {
                let mut record = vec![None; last - first + 1];
                for cell in &self.cells[start..end] {
                    record[cell.col - first] = Some(cell);
                }
                record
            })
            .collect()
    }
}
