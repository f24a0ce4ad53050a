//! Terminal cell: the fundamental unit of the grid.
//!
//! Each cell stores one character and its attribute set. Input is treated
//! as 8-bit characters, so every cell is exactly one column wide.

use bitflags::bitflags;

bitflags! {
    /// Character attribute flags.
    ///
    /// Maps directly to the VT100 SGR parameter values.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct AttrFlags: u8 {
        const BOLD      = 1 << 0;
        const UNDERLINE = 1 << 1;
        const BLINK     = 1 << 2;
        const REVERSE   = 1 << 3;
    }
}

/// Color for a cell slot: the terminal default or one of the eight base
/// colors (SGR 30–37 / 40–47).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Color {
    /// Terminal default (SGR 39 / SGR 49).
    #[default]
    Default,
    /// Base color index (0–7).
    Indexed(u8),
}

/// Attribute set for a cell: flags + foreground/background colors.
///
/// Equality is structural; the emulator value-copies the current attribute
/// set into every written cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Attrs {
    pub flags: AttrFlags,
    pub fg: Color,
    pub bg: Color,
}

impl Attrs {
    /// Reset all attributes to default (SGR 0).
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// A single cell in the terminal grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cell {
    /// The character content. A space for empty/erased cells.
    pub ch: char,
    /// Attribute set the cell was written with.
    pub attrs: Attrs,
}

impl Default for Cell {
    fn default() -> Self {
        Self {
            ch: ' ',
            attrs: Attrs::default(),
        }
    }
}

impl Cell {
    /// Create a cell with the given character and default attributes.
    #[must_use]
    pub fn new(ch: char) -> Self {
        Self {
            ch,
            attrs: Attrs::default(),
        }
    }

    /// A blank cell carrying the given attributes.
    ///
    /// Erase operations fill with this rather than [`Cell::default`] so a
    /// configured background survives the erase.
    #[must_use]
    pub fn blank(attrs: Attrs) -> Self {
        Self { ch: ' ', attrs }
    }

    /// Whether this cell renders as empty text.
    ///
    /// Attribute-insensitive: an erased cell with a colored background is
    /// still blank for trimming purposes.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.ch == ' '
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_cell_is_canonical_blank() {
        let cell = Cell::default();
        assert_eq!(cell.ch, ' ');
        assert_eq!(cell.attrs, Attrs::default());
        assert!(cell.is_blank());
        assert_eq!(cell, Cell::blank(Attrs::default()));
    }

    #[test]
    fn blank_keeps_attrs_but_stays_blank() {
        let attrs = Attrs {
            flags: AttrFlags::empty(),
            fg: Color::Default,
            bg: Color::Indexed(1),
        };
        let cell = Cell::blank(attrs);
        assert!(cell.is_blank());
        assert_eq!(cell.attrs.bg, Color::Indexed(1));
        assert_ne!(cell, Cell::default());
    }

    #[test]
    fn attrs_reset_is_bit_for_bit_default() {
        let mut attrs = Attrs {
            flags: AttrFlags::BOLD | AttrFlags::REVERSE,
            fg: Color::Indexed(7),
            bg: Color::Indexed(4),
        };
        attrs.reset();
        assert_eq!(attrs, Attrs::default());
    }

    #[test]
    fn color_default() {
        assert_eq!(Color::default(), Color::Default);
    }
}
