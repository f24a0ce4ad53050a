//! Terminal mode flags.

use bitflags::bitflags;

bitflags! {
    /// Mode bits tracked by the grid.
    ///
    /// These are the DEC private modes the emulator honors; everything else
    /// in a `CSI ? Pm h/l` sequence is consumed without effect.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Modes: u8 {
        /// DECAWM (`?7`): writing past the right edge wraps to the next line.
        const AUTOWRAP = 1 << 0;
        /// DECOM (`?6`): cursor addressing is relative to the scrolling region.
        const ORIGIN = 1 << 1;
        /// DECTCEM (`?25`): cursor is visible.
        const CURSOR_VISIBLE = 1 << 2;
        /// DECCOLM (`?3`): display is 132 columns wide instead of 80.
        const COLUMN_132 = 1 << 3;
    }
}

impl Default for Modes {
    fn default() -> Self {
        Modes::AUTOWRAP | Modes::CURSOR_VISIBLE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_modes_wrap_and_show_cursor() {
        let modes = Modes::default();
        assert!(modes.contains(Modes::AUTOWRAP));
        assert!(modes.contains(Modes::CURSOR_VISIBLE));
        assert!(!modes.contains(Modes::ORIGIN));
        assert!(!modes.contains(Modes::COLUMN_132));
    }

    #[test]
    fn set_and_clear() {
        let mut modes = Modes::default();
        modes.insert(Modes::ORIGIN);
        assert!(modes.contains(Modes::ORIGIN));
        modes.remove(Modes::AUTOWRAP);
        assert!(!modes.contains(Modes::AUTOWRAP));
    }
}
