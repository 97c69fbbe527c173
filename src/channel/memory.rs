//! Caption Memory
//!
//! A fixed-geometry grid of styled cells (15 rows x 32 columns) backing
//! one caption buffer. Each channel owns two of these: the displayed
//! buffer and the non-displayed composition buffer.

use serde::{Deserialize, Serialize};

use super::cell::{CaptionStyle, Cell};

/// Number of rows in a caption frame
pub const CAPTION_ROWS: usize = 15;
/// Number of columns in a caption row
pub const CAPTION_COLS: usize = 32;

/// A row of caption cells
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaptionRow {
    pub cells: Vec<Cell>,
}

impl CaptionRow {
    pub fn new() -> Self {
        Self {
            cells: vec![Cell::default(); CAPTION_COLS],
        }
    }

    pub fn clear(&mut self) {
        for cell in &mut self.cells {
            cell.clear();
        }
    }

    /// True if no cell in this row has been written
    pub fn is_empty(&self) -> bool {
        self.cells.iter().all(|c| c.is_empty())
    }

    /// Column of the first written cell, if any
    pub fn first_occupied(&self) -> Option<usize> {
        self.cells.iter().position(|c| !c.is_empty())
    }

    /// Column of the last written cell, if any
    pub fn last_occupied(&self) -> Option<usize> {
        self.cells.iter().rposition(|c| !c.is_empty())
    }

    /// Erase cells from `col` to the end of the row
    pub fn erase_from(&mut self, col: usize) {
        for cell in self.cells.iter_mut().skip(col) {
            cell.clear();
        }
    }
}

impl Default for CaptionRow {
    fn default() -> Self {
        Self::new()
    }
}

/// One caption buffer: a fixed 15x32 grid of styled cells
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaptionMemory {
    rows: Vec<CaptionRow>,
}

impl CaptionMemory {
    pub fn new() -> Self {
        Self {
            rows: (0..CAPTION_ROWS).map(|_| CaptionRow::new()).collect(),
        }
    }

    /// Get a reference to a row
    pub fn row(&self, row: usize) -> Option<&CaptionRow> {
        self.rows.get(row)
    }

    /// Iterate over all rows, top to bottom
    pub fn rows(&self) -> impl Iterator<Item = &CaptionRow> {
        self.rows.iter()
    }

    /// Write a glyph with its style at a grid position
    pub fn write(&mut self, row: usize, col: usize, glyph: char, style: CaptionStyle) {
        if let Some(cell) = self.rows.get_mut(row).and_then(|r| r.cells.get_mut(col)) {
            *cell = Cell::new(glyph, style);
        }
    }

    /// Erase a single cell
    pub fn erase_cell(&mut self, row: usize, col: usize) {
        if let Some(cell) = self.rows.get_mut(row).and_then(|r| r.cells.get_mut(col)) {
            cell.clear();
        }
    }

    /// Erase from a column to the end of its row (DER)
    pub fn erase_to_end_of_row(&mut self, row: usize, col: usize) {
        if let Some(r) = self.rows.get_mut(row) {
            r.erase_from(col);
        }
    }

    /// Clear the entire buffer
    pub fn erase(&mut self) {
        for row in &mut self.rows {
            row.clear();
        }
    }

    /// True if no cell anywhere in the buffer has been written
    pub fn is_empty(&self) -> bool {
        self.rows.iter().all(|r| r.is_empty())
    }

    /// Shift the rows of a roll-up window up by one.
    ///
    /// The window spans `window` rows ending at `base_row` inclusive. The
    /// topmost window row is discarded and the base row is cleared for
    /// subsequent writes.
    pub fn shift_window_up(&mut self, base_row: usize, window: usize) {
        let base = base_row.min(CAPTION_ROWS - 1);
        let top = base.saturating_sub(window.saturating_sub(1));
        for row in top..base {
            self.rows[row] = self.rows[row + 1].clone();
        }
        self.rows[base].clear();
    }

    /// Move a roll-up window so its base lands on a new row, carrying the
    /// visible rows along (roll-up PAC repositioning).
    pub fn relocate_window(&mut self, old_base: usize, new_base: usize, window: usize) {
        let old_base = old_base.min(CAPTION_ROWS - 1);
        let new_base = new_base.min(CAPTION_ROWS - 1);
        if old_base == new_base {
            return;
        }
        let old_top = old_base.saturating_sub(window.saturating_sub(1));
        let moved: Vec<CaptionRow> = self.rows[old_top..=old_base].to_vec();
        for row in &mut self.rows {
            row.clear();
        }
        let new_top = new_base.saturating_sub(moved.len().saturating_sub(1));
        for (i, row) in moved.into_iter().enumerate() {
            let dst = new_top + i;
            if dst < CAPTION_ROWS {
                self.rows[dst] = row;
            }
        }
    }
}

impl Default for CaptionMemory {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_geometry() {
        let mem = CaptionMemory::new();
        assert_eq!(mem.rows().count(), CAPTION_ROWS);
        assert_eq!(mem.row(0).unwrap().cells.len(), CAPTION_COLS);
        assert!(mem.is_empty());
    }

    #[test]
    fn test_write_and_erase() {
        let mut mem = CaptionMemory::new();
        mem.write(3, 5, 'X', CaptionStyle::default());
        assert!(!mem.is_empty());
        assert_eq!(mem.row(3).unwrap().cells[5].glyph, Some('X'));

        mem.erase_cell(3, 5);
        assert!(mem.is_empty());
    }

    #[test]
    fn test_write_out_of_bounds_ignored() {
        let mut mem = CaptionMemory::new();
        mem.write(CAPTION_ROWS, 0, 'X', CaptionStyle::default());
        mem.write(0, CAPTION_COLS, 'X', CaptionStyle::default());
        assert!(mem.is_empty());
    }

    #[test]
    fn test_erase_to_end_of_row() {
        let mut mem = CaptionMemory::new();
        for col in 0..6 {
            mem.write(2, col, 'A', CaptionStyle::default());
        }
        mem.erase_to_end_of_row(2, 3);
        assert_eq!(mem.row(2).unwrap().last_occupied(), Some(2));
    }

    #[test]
    fn test_shift_window_up() {
        let mut mem = CaptionMemory::new();
        mem.write(13, 0, 'A', CaptionStyle::default());
        mem.write(14, 0, 'B', CaptionStyle::default());

        mem.shift_window_up(14, 2);

        // 'A' dropped off the top, 'B' moved up, base cleared
        assert_eq!(mem.row(13).unwrap().cells[0].glyph, Some('B'));
        assert!(mem.row(14).unwrap().is_empty());
    }

    #[test]
    fn test_shift_window_drops_only_within_window() {
        let mut mem = CaptionMemory::new();
        // Content above the window must be untouched
        mem.write(5, 0, 'Z', CaptionStyle::default());
        mem.write(14, 0, 'B', CaptionStyle::default());

        mem.shift_window_up(14, 2);

        assert_eq!(mem.row(5).unwrap().cells[0].glyph, Some('Z'));
        assert_eq!(mem.row(13).unwrap().cells[0].glyph, Some('B'));
    }

    #[test]
    fn test_relocate_window() {
        let mut mem = CaptionMemory::new();
        mem.write(13, 0, 'A', CaptionStyle::default());
        mem.write(14, 0, 'B', CaptionStyle::default());

        mem.relocate_window(14, 7, 2);

        assert_eq!(mem.row(6).unwrap().cells[0].glyph, Some('A'));
        assert_eq!(mem.row(7).unwrap().cells[0].glyph, Some('B'));
        assert!(mem.row(13).unwrap().is_empty());
        assert!(mem.row(14).unwrap().is_empty());
    }

    #[test]
    fn test_row_occupied_range() {
        let mut row = CaptionRow::new();
        assert_eq!(row.first_occupied(), None);
        row.cells[4] = Cell::new('a', CaptionStyle::default());
        row.cells[9] = Cell::new('b', CaptionStyle::default());
        assert_eq!(row.first_occupied(), Some(4));
        assert_eq!(row.last_occupied(), Some(9));
    }
}
