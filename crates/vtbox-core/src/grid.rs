//! Terminal grid: 2D cell matrix, cursor, scrolling region, and tab stops.
//!
//! The grid is the primary data model. It owns a flat vector of cells
//! indexed by `(row, col)` and provides the motion and erase primitives the
//! emulator dispatches. One grid type serves both emulation modes: a fixed
//! display (cursor targets clamp, overflowing lines scroll) and an
//! auto-grow probe (addressed positions grow the matrix, nothing scrolls).
//!
//! # Invariants
//!
//! 1. `1 <= cols` and `1 <= rows` at all times after construction.
//! 2. `cursor.row < rows` and `cursor.col <= cols` — the upper bound admits
//!    the pending-wrap position.
//! 3. `scroll_top <= scroll_bottom < rows`.
//! 4. Every tab stop is in `[0, cols)`.

use std::collections::BTreeSet;

use crate::cell::{Attrs, Cell};
use crate::cursor::{Cursor, SavedCursor};
use crate::error::{Error, Result};
use crate::modes::Modes;

/// Default display width in columns.
pub const DEFAULT_COLS: u32 = 80;
/// Default display height in rows.
pub const DEFAULT_ROWS: u32 = 24;
/// Tab stops sit at every multiple of this column interval.
pub const TAB_INTERVAL: u32 = 8;
/// Upper bound on `rows * cols` in auto-grow mode.
pub const MAX_CELLS: u64 = 10_000_000;

/// 2D terminal cell grid.
///
/// Cells are stored in row-major order in a flat `Vec<Cell>`.
#[derive(Debug, Clone)]
pub struct Grid {
    cells: Vec<Cell>,
    cols: u32,
    rows: u32,
    /// Addressed positions grow the matrix instead of clamping/scrolling.
    auto_grow: bool,
    pub cursor: Cursor,
    saved: Option<SavedCursor>,
    /// Scrolling region, 0-based, inclusive at both ends.
    scroll_top: u32,
    scroll_bottom: u32,
    tab_stops: BTreeSet<u32>,
    /// TBC 3 latch: once all stops are cleared, growth must not resurrect
    /// the default ones.
    tabs_cleared: bool,
    /// Attribute set applied to newly written (and erased) cells.
    pub attrs: Attrs,
    pub modes: Modes,
}

fn default_tab_stops(cols: u32) -> BTreeSet<u32> {
    (0..cols).step_by(TAB_INTERVAL as usize).collect()
}

impl Grid {
    /// Create a fixed-size grid filled with blank cells.
    ///
    /// Dimensions are floored at 1×1.
    #[must_use]
    pub fn new(cols: u32, rows: u32) -> Self {
        let cols = cols.max(1);
        let rows = rows.max(1);
        Self {
            cells: vec![Cell::default(); cols as usize * rows as usize],
            cols,
            rows,
            auto_grow: false,
            cursor: Cursor::default(),
            saved: None,
            scroll_top: 0,
            scroll_bottom: rows - 1,
            tab_stops: default_tab_stops(cols),
            tabs_cleared: false,
            attrs: Attrs::default(),
            modes: Modes::default(),
        }
    }

    /// Create a 1×1 auto-grow grid for display-bounds probing.
    #[must_use]
    pub fn auto_grow() -> Self {
        let mut grid = Self::new(1, 1);
        grid.auto_grow = true;
        grid
    }

    /// Number of columns.
    #[must_use]
    pub fn cols(&self) -> u32 {
        self.cols
    }

    /// Number of rows.
    #[must_use]
    pub fn rows(&self) -> u32 {
        self.rows
    }

    /// Get a reference to the cell at `(row, col)`, or `None` out of bounds.
    #[must_use]
    pub fn cell(&self, row: u32, col: u32) -> Option<&Cell> {
        if row < self.rows && col < self.cols {
            Some(&self.cells[self.index(row, col)])
        } else {
            None
        }
    }

    /// Get a slice of cells for the given row, or `None` out of bounds.
    #[must_use]
    pub fn row_cells(&self, row: u32) -> Option<&[Cell]> {
        if row < self.rows {
            let start = self.index(row, 0);
            Some(&self.cells[start..start + self.cols as usize])
        } else {
            None
        }
    }

    /// Scrolling region top margin (0-based, inclusive).
    #[must_use]
    pub fn scroll_top(&self) -> u32 {
        self.scroll_top
    }

    /// Scrolling region bottom margin (0-based, inclusive).
    #[must_use]
    pub fn scroll_bottom(&self) -> u32 {
        self.scroll_bottom
    }

    fn index(&self, row: u32, col: u32) -> usize {
        row as usize * self.cols as usize + col as usize
    }

    /// Cursor column clamped into the cell range, resolving a pending wrap.
    fn active_col(&self) -> u32 {
        self.cursor.col.min(self.cols - 1)
    }

    // ── Growth ──────────────────────────────────────────────────────

    /// Grow the matrix so `(row, col)` is addressable. No-op at a fixed size
    /// or when the position already fits.
    fn ensure(&mut self, row: u32, col: u32) -> Result<()> {
        if !self.auto_grow || (row < self.rows && col < self.cols) {
            return Ok(());
        }
        let new_cols = self.cols.max(col + 1);
        let new_rows = self.rows.max(row + 1);
        if u64::from(new_cols) * u64::from(new_rows) > MAX_CELLS {
            return Err(Error::GridOverflow {
                cols: new_cols,
                rows: new_rows,
            });
        }

        let mut cells = vec![Cell::default(); new_cols as usize * new_rows as usize];
        for r in 0..self.rows as usize {
            let old = r * self.cols as usize;
            let new = r * new_cols as usize;
            cells[new..new + self.cols as usize]
                .copy_from_slice(&self.cells[old..old + self.cols as usize]);
        }

        if self.scroll_bottom == self.rows - 1 {
            self.scroll_bottom = new_rows - 1;
        }
        if !self.tabs_cleared {
            let mut stop = self.cols.div_ceil(TAB_INTERVAL) * TAB_INTERVAL;
            while stop < new_cols {
                self.tab_stops.insert(stop);
                stop += TAB_INTERVAL;
            }
        }
        self.cells = cells;
        self.cols = new_cols;
        self.rows = new_rows;
        Ok(())
    }

    // ── Writing ─────────────────────────────────────────────────────

    /// Write one character at the cursor and advance.
    ///
    /// The wrap rule is a single condition: if the cursor sits at the
    /// pending-wrap position (`col == cols`) and autowrap is on, a deferred
    /// CR+LF runs first — scrolling if the cursor is at the bottom of the
    /// scrolling region — and only then is the character written. With
    /// autowrap off the write lands on the last column. In auto-grow mode
    /// the matrix widens instead and no wrap ever occurs.
    pub fn put(&mut self, ch: char) -> Result<()> {
        if self.auto_grow {
            let Cursor { row, col } = self.cursor;
            self.ensure(row, col)?;
            let idx = self.index(row, col);
            self.cells[idx] = Cell {
                ch,
                attrs: self.attrs,
            };
            self.cursor.col = col + 1;
            return Ok(());
        }

        if self.cursor.col >= self.cols {
            if self.modes.contains(Modes::AUTOWRAP) {
                self.carriage_return();
                self.line_feed()?;
            } else {
                self.cursor.col = self.cols - 1;
            }
        }
        let idx = self.index(self.cursor.row, self.cursor.col);
        self.cells[idx] = Cell {
            ch,
            attrs: self.attrs,
        };
        self.cursor.col += 1;
        Ok(())
    }

    // ── Line motion ─────────────────────────────────────────────────

    /// LF/VT/FF and `ESC D` (IND): cursor down one line.
    ///
    /// Scrolls the region up when the cursor is at its bottom margin; below
    /// the region the cursor clamps at the last row without scrolling.
    pub fn line_feed(&mut self) -> Result<()> {
        if self.auto_grow {
            self.ensure(self.cursor.row + 1, 0)?;
            self.cursor.row += 1;
        } else if self.cursor.row == self.scroll_bottom {
            self.scroll_up(1);
        } else if self.cursor.row + 1 < self.rows {
            self.cursor.row += 1;
        }
        Ok(())
    }

    /// `ESC M` (RI): cursor up one line, scrolling the region down at its
    /// top margin.
    pub fn reverse_index(&mut self) {
        if self.auto_grow {
            self.cursor.row = self.cursor.row.saturating_sub(1);
        } else if self.cursor.row == self.scroll_top {
            self.scroll_down(1);
        } else if self.cursor.row > 0 {
            self.cursor.row -= 1;
        }
    }

    /// CR: cursor to column 0.
    pub fn carriage_return(&mut self) {
        self.cursor.col = 0;
    }

    // ── Cursor motion ───────────────────────────────────────────────

    /// Absolute cursor positioning (CUP/HVP), 0-based inputs.
    ///
    /// In origin mode the row is relative to the scrolling region and
    /// clamped inside it; otherwise rows and columns clamp to the display —
    /// or grow it, in auto-grow mode.
    pub fn move_to(&mut self, row: u32, col: u32) -> Result<()> {
        self.move_to_row(row)?;
        self.move_to_col(col)
    }

    /// VPA-style vertical positioning; origin-mode aware.
    pub fn move_to_row(&mut self, row: u32) -> Result<()> {
        if self.auto_grow {
            self.ensure(row, 0)?;
            self.cursor.row = row;
        } else if self.modes.contains(Modes::ORIGIN) {
            self.cursor.row = (self.scroll_top + row).min(self.scroll_bottom);
        } else {
            self.cursor.row = row.min(self.rows - 1);
        }
        self.cursor.col = self.active_col();
        Ok(())
    }

    /// CHA-style horizontal positioning. Origin mode does not apply to
    /// columns on a VT100 (there are no left/right margins).
    pub fn move_to_col(&mut self, col: u32) -> Result<()> {
        if self.auto_grow {
            self.ensure(self.cursor.row, col)?;
            self.cursor.col = col;
        } else {
            self.cursor.col = col.min(self.cols - 1);
        }
        Ok(())
    }

    /// CUU: up `n`, clamped at the top margin (or row 0 when the cursor is
    /// already above the region).
    pub fn move_up(&mut self, n: u32) {
        let floor = if self.cursor.row >= self.scroll_top {
            self.scroll_top
        } else {
            0
        };
        self.cursor.row = self.cursor.row.saturating_sub(n).max(floor);
        self.cursor.col = self.active_col();
    }

    /// CUD: down `n`, clamped at the bottom margin (or the last row when the
    /// cursor is already below the region).
    pub fn move_down(&mut self, n: u32) -> Result<()> {
        if self.auto_grow {
            let target = self.cursor.row + n;
            self.ensure(target, 0)?;
            self.cursor.row = target;
        } else {
            let ceil = if self.cursor.row <= self.scroll_bottom {
                self.scroll_bottom
            } else {
                self.rows - 1
            };
            self.cursor.row = (self.cursor.row + n).min(ceil);
        }
        self.cursor.col = self.active_col();
        Ok(())
    }

    /// CUF: right `n`, clamped at the last column.
    pub fn move_right(&mut self, n: u32) -> Result<()> {
        let col = self.active_col();
        if self.auto_grow {
            let target = col + n;
            self.ensure(self.cursor.row, target)?;
            self.cursor.col = target;
        } else {
            self.cursor.col = (col + n).min(self.cols - 1);
        }
        Ok(())
    }

    /// CUB/BS: left `n`, non-wrapping, stops at column 0.
    pub fn move_left(&mut self, n: u32) {
        self.cursor.col = self.active_col().saturating_sub(n);
    }

    // ── Tab stops ───────────────────────────────────────────────────

    /// HT: advance to the next tab stop past the cursor, clamping at the
    /// last column when none remains.
    pub fn tab_forward(&mut self) {
        let col = self.active_col();
        let next = self.tab_stops.range(col + 1..).next().copied();
        self.cursor.col = next.unwrap_or(self.cols - 1).min(self.cols - 1);
    }

    /// CBT: move back `n` tab stops, stopping at column 0.
    pub fn back_tab(&mut self, n: u32) {
        let mut col = self.active_col();
        for _ in 0..n {
            col = self.tab_stops.range(..col).next_back().copied().unwrap_or(0);
        }
        self.cursor.col = col;
    }

    /// HTS: set a tab stop at the cursor column.
    pub fn set_tab_stop(&mut self) {
        let col = self.active_col();
        self.tab_stops.insert(col);
    }

    /// TBC 0: clear the tab stop at the cursor column, if any.
    pub fn clear_tab_stop(&mut self) {
        let col = self.active_col();
        self.tab_stops.remove(&col);
    }

    /// TBC 3: clear every tab stop. Later growth does not bring the default
    /// stops back.
    pub fn clear_all_tab_stops(&mut self) {
        self.tab_stops.clear();
        self.tabs_cleared = true;
    }

    // ── Erase operations ────────────────────────────────────────────
    //
    // Erased cells are blank but carry the current attribute set, so a
    // configured background persists — VT100 behavior.

    fn blank(&self) -> Cell {
        Cell::blank(self.attrs)
    }

    fn fill_span(&mut self, start: usize, end: usize) {
        let blank = self.blank();
        self.cells[start..end].fill(blank);
    }

    /// ED 0: erase from the cursor to the end of the display.
    pub fn erase_below(&mut self) {
        let start = self.index(self.cursor.row, self.active_col());
        self.fill_span(start, self.cells.len());
    }

    /// ED 1: erase from the start of the display through the cursor.
    pub fn erase_above(&mut self) {
        let end = self.index(self.cursor.row, self.active_col()) + 1;
        self.fill_span(0, end);
    }

    /// ED 2: erase the entire display.
    pub fn erase_all(&mut self) {
        self.fill_span(0, self.cells.len());
    }

    /// EL 0: erase from the cursor to the end of the line.
    pub fn erase_line_right(&mut self) {
        let start = self.index(self.cursor.row, self.active_col());
        let end = self.index(self.cursor.row, self.cols - 1) + 1;
        self.fill_span(start, end);
    }

    /// EL 1: erase from the start of the line through the cursor.
    pub fn erase_line_left(&mut self) {
        let start = self.index(self.cursor.row, 0);
        let end = self.index(self.cursor.row, self.active_col()) + 1;
        self.fill_span(start, end);
    }

    /// EL 2: erase the entire line.
    pub fn erase_line_all(&mut self) {
        let start = self.index(self.cursor.row, 0);
        let end = self.index(self.cursor.row, self.cols - 1) + 1;
        self.fill_span(start, end);
    }

    /// ECH: erase `n` characters at the cursor without moving it.
    pub fn erase_chars(&mut self, n: u32) {
        let col = self.active_col();
        let start = self.index(self.cursor.row, col);
        let end = start + (n.min(self.cols - col) as usize);
        self.fill_span(start, end);
    }

    /// Erase a rectangular region, both corners inclusive and clamped.
    pub fn clear_region(&mut self, r0: u32, c0: u32, r1: u32, c1: u32) {
        let r1 = r1.min(self.rows - 1);
        let c1 = c1.min(self.cols - 1);
        for row in r0..=r1 {
            if c0 > c1 {
                break;
            }
            let start = self.index(row, c0);
            let end = self.index(row, c1) + 1;
            self.fill_span(start, end);
        }
    }

    // ── Insert / delete characters ──────────────────────────────────

    /// ICH: insert `n` blank cells at the cursor, shifting the rest of the
    /// line right. Cells pushed past the right margin are lost.
    pub fn insert_chars(&mut self, n: u32) {
        let cols = self.cols as usize;
        let c = self.active_col() as usize;
        let n = (n as usize).min(cols - c);
        if n == 0 {
            return;
        }
        let start = self.index(self.cursor.row, 0);
        let blank = self.blank();
        let line = &mut self.cells[start..start + cols];
        line.copy_within(c..cols - n, c + n);
        line[c..c + n].fill(blank);
    }

    /// DCH: delete `n` cells at the cursor, shifting the rest of the line
    /// left and blanking the vacated right margin.
    pub fn delete_chars(&mut self, n: u32) {
        let cols = self.cols as usize;
        let c = self.active_col() as usize;
        let n = (n as usize).min(cols - c);
        if n == 0 {
            return;
        }
        let start = self.index(self.cursor.row, 0);
        let blank = self.blank();
        let line = &mut self.cells[start..start + cols];
        line.copy_within(c + n..cols, c);
        line[cols - n..].fill(blank);
    }

    // ── Scroll operations ───────────────────────────────────────────

    /// Scroll the region up `n` lines; blank lines appear at the bottom.
    pub fn scroll_up(&mut self, n: u32) {
        self.scroll_span_up(self.scroll_top, self.scroll_bottom, n);
    }

    /// Scroll the region down `n` lines; blank lines appear at the top.
    pub fn scroll_down(&mut self, n: u32) {
        self.scroll_span_down(self.scroll_top, self.scroll_bottom, n);
    }

    /// IL: insert `n` blank lines at the cursor row. No-op when the cursor
    /// is outside the scrolling region.
    pub fn insert_lines(&mut self, n: u32) {
        let row = self.cursor.row;
        if row < self.scroll_top || row > self.scroll_bottom {
            return;
        }
        self.scroll_span_down(row, self.scroll_bottom, n);
    }

    /// DL: delete `n` lines at the cursor row. No-op when the cursor is
    /// outside the scrolling region.
    pub fn delete_lines(&mut self, n: u32) {
        let row = self.cursor.row;
        if row < self.scroll_top || row > self.scroll_bottom {
            return;
        }
        self.scroll_span_up(row, self.scroll_bottom, n);
    }

    /// Shift rows in `[top, bottom]` up by `n`, blanking the vacated bottom.
    fn scroll_span_up(&mut self, top: u32, bottom: u32, n: u32) {
        let height = bottom - top + 1;
        let n = n.min(height);
        if n == 0 {
            return;
        }
        let cols = self.cols as usize;
        let src = (top + n) as usize * cols;
        let dst = top as usize * cols;
        let len = (height - n) as usize * cols;
        self.cells.copy_within(src..src + len, dst);
        let start = (bottom + 1 - n) as usize * cols;
        let end = (bottom + 1) as usize * cols;
        self.fill_span(start, end);
    }

    /// Shift rows in `[top, bottom]` down by `n`, blanking the vacated top.
    fn scroll_span_down(&mut self, top: u32, bottom: u32, n: u32) {
        let height = bottom - top + 1;
        let n = n.min(height);
        if n == 0 {
            return;
        }
        let cols = self.cols as usize;
        let src = top as usize * cols;
        let dst = (top + n) as usize * cols;
        let len = (height - n) as usize * cols;
        self.cells.copy_within(src..src + len, dst);
        let start = top as usize * cols;
        let end = (top + n) as usize * cols;
        self.fill_span(start, end);
    }

    // ── Scrolling region ────────────────────────────────────────────

    /// DECSTBM: set the scrolling region, 0-based inclusive margins, then
    /// home the cursor (origin-aware). Ignored unless the region spans at
    /// least two rows.
    pub fn set_scroll_region(&mut self, top: u32, bottom: u32) {
        let bottom = bottom.min(self.rows - 1);
        if top >= bottom {
            return;
        }
        self.scroll_top = top;
        self.scroll_bottom = bottom;
        self.home();
    }

    /// Cursor to the home position: row 0, or the top margin in origin mode.
    fn home(&mut self) {
        self.cursor.row = if self.modes.contains(Modes::ORIGIN) {
            self.scroll_top
        } else {
            0
        };
        self.cursor.col = 0;
    }

    // ── Save / restore ──────────────────────────────────────────────

    /// DECSC: snapshot cursor position, attributes, and origin mode.
    pub fn save_cursor(&mut self) {
        self.saved = Some(SavedCursor {
            row: self.cursor.row,
            col: self.active_col(),
            attrs: self.attrs,
            origin_mode: self.modes.contains(Modes::ORIGIN),
        });
    }

    /// DECRC: restore the last snapshot. Without one, the cursor homes and
    /// attributes reset, which is what the hardware does.
    pub fn restore_cursor(&mut self) {
        match self.saved {
            Some(saved) => {
                self.cursor.row = saved.row.min(self.rows - 1);
                self.cursor.col = saved.col.min(self.cols - 1);
                self.attrs = saved.attrs;
                self.modes.set(Modes::ORIGIN, saved.origin_mode);
            }
            None => {
                self.cursor = Cursor::default();
                self.attrs = Attrs::default();
            }
        }
    }

    // ── Whole-screen operations ─────────────────────────────────────

    /// DECALN: fill the entire grid with `E` in the current attributes and
    /// home the cursor.
    pub fn screen_alignment(&mut self) {
        let fill = Cell {
            ch: 'E',
            attrs: self.attrs,
        };
        self.cells.fill(fill);
        self.cursor = Cursor::default();
    }

    /// DECCOLM: switch to an 80- or 132-column display. The VT100 clears
    /// the screen on a column-mode change, homes the cursor, and resets the
    /// scrolling region — also in auto-grow mode, where this pins the grid
    /// at the selected geometry.
    pub fn set_columns(&mut self, cols: u32) {
        self.cols = cols.max(1);
        self.rows = DEFAULT_ROWS;
        self.cells = vec![Cell::default(); self.cols as usize * self.rows as usize];
        self.cursor = Cursor::default();
        self.scroll_top = 0;
        self.scroll_bottom = self.rows - 1;
        self.tab_stops = default_tab_stops(self.cols);
        self.tabs_cleared = false;
        self.modes.set(Modes::COLUMN_132, self.cols > DEFAULT_COLS);
    }

    /// RIS: reset to the initial state. Dimensions are retained.
    pub fn reset(&mut self) {
        self.cells.fill(Cell::default());
        self.cursor = Cursor::default();
        self.saved = None;
        self.scroll_top = 0;
        self.scroll_bottom = self.rows - 1;
        self.tab_stops = default_tab_stops(self.cols);
        self.tabs_cleared = false;
        self.attrs = Attrs::default();
        self.modes = Modes::default();
    }

    // ── Read-out ────────────────────────────────────────────────────

    /// Render the grid as text rows with trailing blank cells stripped per
    /// row and trailing fully-blank rows dropped. Leading blank rows are
    /// retained: the vertical position of content is meaningful.
    #[must_use]
    pub fn trimmed_rows(&self) -> Vec<String> {
        let mut lines: Vec<String> = (0..self.rows)
            .map(|r| {
                let start = self.index(r, 0);
                let row = &self.cells[start..start + self.cols as usize];
                let end = row
                    .iter()
                    .rposition(|cell| !cell.is_blank())
                    .map_or(0, |i| i + 1);
                row[..end].iter().map(|cell| cell.ch).collect()
            })
            .collect();
        while lines.last().is_some_and(|line| line.is_empty()) {
            lines.pop();
        }
        lines
    }
}
