//! Emulator: glues the parser to the grid.
//!
//! Each parsed [`Action`] is interpreted against the grid, resolving mode
//! flags (autowrap, origin mode, column width) and the scroll-vs-grow
//! decision. The two public consumers live here as well:
//!
//! - [`display_width`] runs auto-grow emulation and reports the final grid
//!   dimensions — the minimum bounding rectangle of the stream.
//! - [`trim`] runs fixed-size emulation at 80×24 and returns the visible
//!   rows with trailing blanks removed.

use tracing::trace;

use crate::cell::Color;
use crate::error::Result;
use crate::grid::{DEFAULT_COLS, DEFAULT_ROWS, Grid};
use crate::modes::Modes;
use crate::parser::{Action, CsiParams, Parser};

/// DECCOLM column counts.
const NARROW_COLS: u32 = 80;
const WIDE_COLS: u32 = 132;

/// Byte-stream terminal emulator.
#[derive(Debug, Clone)]
pub struct Emulator {
    parser: Parser,
    grid: Grid,
}

impl Emulator {
    /// Create a fixed-size emulator.
    #[must_use]
    pub fn new(cols: u32, rows: u32) -> Self {
        Self {
            parser: Parser::new(),
            grid: Grid::new(cols, rows),
        }
    }

    /// Create an auto-grow emulator for display-bounds probing.
    #[must_use]
    pub fn auto_grow() -> Self {
        Self {
            parser: Parser::new(),
            grid: Grid::auto_grow(),
        }
    }

    /// The current grid state.
    #[must_use]
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Consume the emulator, yielding the final grid.
    #[must_use]
    pub fn into_grid(self) -> Grid {
        self.grid
    }

    /// Feed a chunk of bytes through the parser into the grid.
    ///
    /// Fails only in auto-grow mode, when the stream addresses more cells
    /// than the growth limit allows; the grid keeps the state reached up to
    /// that point.
    pub fn feed(&mut self, bytes: &[u8]) -> Result<()> {
        for &b in bytes {
            if let Some(action) = self.parser.advance(b) {
                self.apply(action)?;
            }
        }
        Ok(())
    }

    fn apply(&mut self, action: Action) -> Result<()> {
        let grid = &mut self.grid;
        match action {
            Action::Print(ch) => grid.put(ch)?,
            Action::LineFeed | Action::Index => grid.line_feed()?,
            Action::CarriageReturn => grid.carriage_return(),
            Action::Tab => grid.tab_forward(),
            Action::Backspace => grid.move_left(1),
            Action::CursorUp(n) => grid.move_up(n.into()),
            Action::CursorDown(n) => grid.move_down(n.into())?,
            Action::CursorRight(n) => grid.move_right(n.into())?,
            Action::CursorLeft(n) => grid.move_left(n.into()),
            Action::CursorNextLine(n) => {
                grid.move_down(n.into())?;
                grid.carriage_return();
            }
            Action::CursorPrevLine(n) => {
                grid.move_up(n.into());
                grid.carriage_return();
            }
            Action::CursorColumn(col) => grid.move_to_col(col.into())?,
            Action::CursorRow(row) => grid.move_to_row(row.into())?,
            Action::CursorPosition { row, col } => grid.move_to(row.into(), col.into())?,
            Action::EraseInDisplay(mode) => match mode {
                0 => grid.erase_below(),
                1 => grid.erase_above(),
                _ => grid.erase_all(),
            },
            Action::EraseInLine(mode) => match mode {
                0 => grid.erase_line_right(),
                1 => grid.erase_line_left(),
                _ => grid.erase_line_all(),
            },
            Action::EraseChars(n) => grid.erase_chars(n.into()),
            Action::InsertChars(n) => grid.insert_chars(n.into()),
            Action::DeleteChars(n) => grid.delete_chars(n.into()),
            Action::InsertLines(n) => grid.insert_lines(n.into()),
            Action::DeleteLines(n) => grid.delete_lines(n.into()),
            Action::ScrollUp(n) => grid.scroll_up(n.into()),
            Action::ScrollDown(n) => grid.scroll_down(n.into()),
            Action::Sgr(params) => self.apply_sgr(&params),
            Action::DecSet(params) => self.apply_private_modes(&params, true),
            Action::DecRst(params) => self.apply_private_modes(&params, false),
            Action::AnsiSet(params) | Action::AnsiRst(params) => {
                // No ANSI standard mode changes the rendered grid here.
                trace!(?params, "ignoring ANSI mode change");
            }
            Action::SetScrollRegion { top, bottom } => {
                let bottom = if bottom == 0 {
                    grid.rows() - 1
                } else {
                    u32::from(bottom) - 1
                };
                grid.set_scroll_region(top.into(), bottom);
            }
            Action::SetTabStop => grid.set_tab_stop(),
            Action::ClearTabStop(mode) => match mode {
                0 => grid.clear_tab_stop(),
                3 => grid.clear_all_tab_stops(),
                other => trace!(mode = other, "ignoring TBC mode"),
            },
            Action::BackTab(n) => grid.back_tab(n.into()),
            Action::SaveCursor => grid.save_cursor(),
            Action::RestoreCursor => grid.restore_cursor(),
            Action::ReverseIndex => grid.reverse_index(),
            Action::NextLine => {
                grid.carriage_return();
                grid.line_feed()?;
            }
            Action::FullReset => grid.reset(),
            Action::ScreenAlignment => grid.screen_alignment(),
        }
        Ok(())
    }

    fn apply_sgr(&mut self, params: &CsiParams) {
        use crate::cell::AttrFlags;

        let attrs = &mut self.grid.attrs;
        for param in params {
            match param.unwrap_or(0) {
                0 => attrs.reset(),
                1 => attrs.flags.insert(AttrFlags::BOLD),
                4 => attrs.flags.insert(AttrFlags::UNDERLINE),
                5 => attrs.flags.insert(AttrFlags::BLINK),
                7 => attrs.flags.insert(AttrFlags::REVERSE),
                22 => attrs.flags.remove(AttrFlags::BOLD),
                24 => attrs.flags.remove(AttrFlags::UNDERLINE),
                25 => attrs.flags.remove(AttrFlags::BLINK),
                27 => attrs.flags.remove(AttrFlags::REVERSE),
                n @ 30..=37 => attrs.fg = Color::Indexed((n - 30) as u8),
                39 => attrs.fg = Color::Default,
                n @ 40..=47 => attrs.bg = Color::Indexed((n - 40) as u8),
                49 => attrs.bg = Color::Default,
                other => trace!(param = other, "ignoring SGR parameter"),
            }
        }
    }

    fn apply_private_modes(&mut self, params: &CsiParams, set: bool) {
        let grid = &mut self.grid;
        for param in params {
            match param.unwrap_or(0) {
                3 => grid.set_columns(if set { WIDE_COLS } else { NARROW_COLS }),
                6 => {
                    grid.modes.set(Modes::ORIGIN, set);
                    // DECOM homes the cursor: move_to(0, 0) resolves the
                    // new origin.
                    let _ = grid.move_to(0, 0);
                }
                7 => grid.modes.set(Modes::AUTOWRAP, set),
                25 => grid.modes.set(Modes::CURSOR_VISIBLE, set),
                other => trace!(mode = other, set, "ignoring private mode"),
            }
        }
    }
}

/// Compute the minimum bounding rectangle (columns, rows) needed to render
/// the byte stream.
///
/// Runs the emulator in auto-grow mode from a 1×1 grid: addressed positions
/// grow the grid and nothing ever scrolls. Fails with
/// [`Error::GridOverflow`](crate::Error::GridOverflow) when the stream
/// addresses more cells than the growth limit allows.
pub fn display_width(input: &[u8]) -> Result<(u32, u32)> {
    let mut emulator = Emulator::auto_grow();
    emulator.feed(input)?;
    let grid = emulator.grid();
    Ok((grid.cols(), grid.rows()))
}

/// Render the byte stream on an 80×24 display and return the visible rows,
/// with trailing blank cells stripped per row and trailing blank rows
/// dropped.
pub fn trim(input: &[u8]) -> Result<Vec<String>> {
    let mut emulator = Emulator::new(DEFAULT_COLS, DEFAULT_ROWS);
    emulator.feed(input)?;
    Ok(emulator.grid().trimmed_rows())
}
