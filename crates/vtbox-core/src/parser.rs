//! VT100/ANSI parser.
//!
//! A deterministic state machine converting an output byte stream into a
//! sequence of actions for the emulator. It owns no display state. Input is
//! treated as 8-bit characters: every octet in 0x20–0xFF except DEL
//! occupies exactly one cell.
//!
//! The error policy is total silence: malformed sequences, unknown final
//! bytes, and sequences with intermediate bytes the VT100 repertoire does
//! not use are discarded and the parser returns to ground. The parser
//! itself never fails.

use smallvec::SmallVec;
use tracing::trace;

/// CSI parameter list.
///
/// Parameters are optional unsigned integers: a missing parameter (`None`)
/// is distinct from an explicit zero and defaults per command. The inline
/// capacity covers any sequence the VT100 repertoire produces without a
/// heap allocation.
pub type CsiParams = SmallVec<[Option<u16>; 16]>;

/// Parser output actions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Print a single 8-bit character.
    Print(char),
    /// Line feed (`\n`, VT, FF): cursor down, scrolling at the region bottom.
    LineFeed,
    /// Carriage return (`\r`): cursor to column 0.
    CarriageReturn,
    /// Horizontal tab (`\t`): cursor to the next tab stop.
    Tab,
    /// Backspace (`\x08`): cursor left one, non-wrapping.
    Backspace,
    /// CUU (`CSI Ps A`): cursor up by count (default 1).
    CursorUp(u16),
    /// CUD (`CSI Ps B`): cursor down by count (default 1).
    CursorDown(u16),
    /// CUF (`CSI Ps C`): cursor right by count (default 1).
    CursorRight(u16),
    /// CUB (`CSI Ps D`): cursor left by count (default 1).
    CursorLeft(u16),
    /// CNL (`CSI Ps E`): cursor down by count and to column 0.
    CursorNextLine(u16),
    /// CPL (`CSI Ps F`): cursor up by count and to column 0.
    CursorPrevLine(u16),
    /// CHA (`CSI Ps G`): cursor to absolute column (0-indexed).
    CursorColumn(u16),
    /// VPA (`CSI Ps d`): cursor to absolute row (0-indexed).
    CursorRow(u16),
    /// CUP/HVP (`CSI Pr ; Pc H`, `… f`): cursor to 0-indexed row/col.
    CursorPosition { row: u16, col: u16 },
    /// ED (`CSI Ps J`): erase display; mode 0, 1, or 2.
    EraseInDisplay(u8),
    /// EL (`CSI Ps K`): erase line; mode 0, 1, or 2.
    EraseInLine(u8),
    /// ECH (`CSI Ps X`): erase characters at the cursor.
    EraseChars(u16),
    /// ICH (`CSI Ps @`): insert blank cells at the cursor column.
    InsertChars(u16),
    /// DCH (`CSI Ps P`): delete cells at the cursor column.
    DeleteChars(u16),
    /// IL (`CSI Ps L`): insert blank lines at the cursor row.
    InsertLines(u16),
    /// DL (`CSI Ps M`): delete lines at the cursor row.
    DeleteLines(u16),
    /// SU (`CSI Ps S`): scroll the region up by count.
    ScrollUp(u16),
    /// SD (`CSI Ps T`): scroll the region down by count.
    ScrollDown(u16),
    /// SGR (`CSI Pm m`): set graphic rendition. Interpretation is stateful
    /// and happens in the emulator.
    Sgr(CsiParams),
    /// DECSET (`CSI ? Pm h`): set DEC private mode(s).
    DecSet(CsiParams),
    /// DECRST (`CSI ? Pm l`): reset DEC private mode(s).
    DecRst(CsiParams),
    /// SM (`CSI Pm h`): set ANSI mode(s).
    AnsiSet(CsiParams),
    /// RM (`CSI Pm l`): reset ANSI mode(s).
    AnsiRst(CsiParams),
    /// DECSTBM (`CSI Pt ; Pb r`): set the scrolling region. `top` is
    /// 0-indexed inclusive; `bottom == 0` means "use full height" (the
    /// parser does not know the grid size), otherwise 0-indexed exclusive.
    SetScrollRegion { top: u16, bottom: u16 },
    /// HTS (`ESC H`): set a tab stop at the cursor column.
    SetTabStop,
    /// TBC (`CSI Ps g`): clear tab stops; 0 = at cursor, 3 = all.
    ClearTabStop(u16),
    /// CBT (`CSI Ps Z`): cursor backward tabulation by count.
    BackTab(u16),
    /// DECSC (`ESC 7`): save cursor state.
    SaveCursor,
    /// DECRC (`ESC 8`): restore cursor state.
    RestoreCursor,
    /// IND (`ESC D`): cursor down one line, scrolling at the bottom margin.
    Index,
    /// RI (`ESC M`): cursor up one line, scrolling at the top margin.
    ReverseIndex,
    /// NEL (`ESC E`): carriage return + index.
    NextLine,
    /// RIS (`ESC c`): full reset to the initial state.
    FullReset,
    /// DECALN (`ESC # 8`): fill the entire grid with `E`.
    ScreenAlignment,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    /// Expecting a printable or a C0 control.
    Ground,
    /// Saw `ESC`.
    Escape,
    /// Saw `ESC [`; no parameter byte yet.
    CsiEntry,
    /// Inside the parameter bytes of a CSI sequence.
    CsiParam,
    /// Saw an intermediate byte (0x20–0x2F) or a malformed parameter byte
    /// inside a CSI sequence. The VT100 repertoire has no such commands;
    /// the rest of the sequence is absorbed and dropped at the final byte.
    CsiIntermediate,
    /// Saw `ESC #`; the next byte selects a DEC screen/line primitive.
    Hash,
    /// Saw `ESC (` or `ESC )`; the next byte designates a charset.
    Charset,
}

/// VT100/ANSI parser state.
///
/// The parameter accumulator lives here and is cleared on every transition
/// back to ground.
#[derive(Debug, Clone)]
pub struct Parser {
    state: State,
    params: CsiParams,
    /// Digits accumulated for the parameter currently being read.
    current: Option<u16>,
    /// A leading `?` marked the sequence as DEC private.
    private: bool,
}

impl Default for Parser {
    fn default() -> Self {
        Self::new()
    }
}

impl Parser {
    /// Create a new parser in ground state.
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: State::Ground,
            params: CsiParams::new(),
            current: None,
            private: false,
        }
    }

    /// Whether the parser is in ground state (no sequence in progress).
    #[must_use]
    pub fn is_ground(&self) -> bool {
        self.state == State::Ground
    }

    /// Feed a chunk of bytes and return the parsed actions.
    #[must_use]
    pub fn feed(&mut self, bytes: &[u8]) -> Vec<Action> {
        let mut out = Vec::new();
        self.feed_into(bytes, &mut out);
        out
    }

    /// Feed a chunk of bytes, appending parsed actions to `out`.
    pub fn feed_into(&mut self, bytes: &[u8], out: &mut Vec<Action>) {
        for &b in bytes {
            if let Some(action) = self.advance(b) {
                out.push(action);
            }
        }
    }

    /// Advance the parser by one byte.
    ///
    /// Returns an action when a complete token is recognized.
    pub fn advance(&mut self, b: u8) -> Option<Action> {
        match self.state {
            State::Ground => self.advance_ground(b),
            State::Escape => self.advance_escape(b),
            State::CsiEntry => self.advance_csi_entry(b),
            State::CsiParam => self.advance_csi_param(b),
            State::CsiIntermediate => self.advance_csi_intermediate(b),
            State::Hash => self.advance_hash(b),
            State::Charset => self.advance_charset(b),
        }
    }

    fn advance_ground(&mut self, b: u8) -> Option<Action> {
        match b {
            0x08 => Some(Action::Backspace),
            b'\t' => Some(Action::Tab),
            b'\n' | 0x0B | 0x0C => Some(Action::LineFeed),
            b'\r' => Some(Action::CarriageReturn),
            0x1B => {
                self.enter_escape();
                None
            }
            // SO/SI charset shifts: consumed, no visible effect.
            0x0E | 0x0F => None,
            0x20..=0x7E | 0x80..=0xFF => Some(Action::Print(char::from(b))),
            // Remaining C0 controls (BEL included) and DEL are ignored.
            _ => None,
        }
    }

    fn advance_escape(&mut self, b: u8) -> Option<Action> {
        self.state = State::Ground;
        match b {
            b'[' => {
                self.state = State::CsiEntry;
                self.params.clear();
                self.current = None;
                self.private = false;
                None
            }
            b'#' => {
                self.state = State::Hash;
                None
            }
            b'(' | b')' => {
                self.state = State::Charset;
                None
            }
            b'7' => Some(Action::SaveCursor),
            b'8' => Some(Action::RestoreCursor),
            b'D' => Some(Action::Index),
            b'E' => Some(Action::NextLine),
            b'H' => Some(Action::SetTabStop),
            b'M' => Some(Action::ReverseIndex),
            b'c' => Some(Action::FullReset),
            _ => {
                trace!(byte = b, "discarding unknown escape sequence");
                None
            }
        }
    }

    fn advance_csi_entry(&mut self, b: u8) -> Option<Action> {
        match b {
            b'?' => {
                // Only valid before any parameter byte.
                self.private = true;
                None
            }
            b'0'..=b'9' => {
                self.current = Some(u16::from(b - b'0'));
                self.state = State::CsiParam;
                None
            }
            b';' => {
                self.params.push(None);
                self.state = State::CsiParam;
                None
            }
            0x20..=0x2F | 0x3A..=0x3E => {
                // Intermediates and malformed parameter bytes both doom the
                // sequence; absorb the remainder silently.
                self.state = State::CsiIntermediate;
                None
            }
            0x40..=0x7E => self.dispatch_csi(b),
            _ => self.abort_sequence(b),
        }
    }

    fn advance_csi_param(&mut self, b: u8) -> Option<Action> {
        match b {
            b'0'..=b'9' => {
                let digit = u16::from(b - b'0');
                self.current = Some(
                    self.current
                        .unwrap_or(0)
                        .saturating_mul(10)
                        .saturating_add(digit),
                );
                None
            }
            b';' => {
                self.params.push(self.current.take());
                None
            }
            0x20..=0x2F | 0x3A..=0x3F => {
                self.state = State::CsiIntermediate;
                None
            }
            0x40..=0x7E => self.dispatch_csi(b),
            _ => self.abort_sequence(b),
        }
    }

    fn advance_csi_intermediate(&mut self, b: u8) -> Option<Action> {
        match b {
            0x20..=0x3F => None,
            0x40..=0x7E => {
                // Nothing with intermediates is in the repertoire.
                trace!(final_byte = b, "discarding malformed CSI sequence");
                self.to_ground();
                None
            }
            _ => self.abort_sequence(b),
        }
    }

    fn advance_hash(&mut self, b: u8) -> Option<Action> {
        self.state = State::Ground;
        match b {
            b'8' => Some(Action::ScreenAlignment),
            // Double-size/single-size line modifiers: recognized and
            // consumed; lines stay single-width.
            b'3'..=b'6' => None,
            _ => {
                trace!(byte = b, "discarding unknown DEC hash sequence");
                None
            }
        }
    }

    fn advance_charset(&mut self, b: u8) -> Option<Action> {
        // The designator byte selects G0/G1; no mapping is performed.
        let _ = b;
        self.state = State::Ground;
        None
    }

    fn enter_escape(&mut self) {
        self.state = State::Escape;
        self.params.clear();
        self.current = None;
        self.private = false;
    }

    fn to_ground(&mut self) {
        self.state = State::Ground;
        self.params.clear();
        self.current = None;
        self.private = false;
    }

    /// A byte that cannot continue the sequence: drop the sequence and
    /// reprocess the byte in ground state (an ESC restarts a sequence).
    fn abort_sequence(&mut self, b: u8) -> Option<Action> {
        self.to_ground();
        if b == 0x1B {
            self.enter_escape();
            None
        } else {
            self.advance_ground(b)
        }
    }

    fn dispatch_csi(&mut self, fin: u8) -> Option<Action> {
        self.params.push(self.current.take());
        let params = core::mem::take(&mut self.params);
        let private = self.private;
        self.to_ground();

        if private {
            return match fin {
                b'h' => Some(Action::DecSet(params)),
                b'l' => Some(Action::DecRst(params)),
                _ => {
                    trace!(final_byte = fin, "discarding unknown private CSI sequence");
                    None
                }
            };
        }

        match fin {
            b'A' => Some(Action::CursorUp(count(&params, 0))),
            b'B' => Some(Action::CursorDown(count(&params, 0))),
            b'C' => Some(Action::CursorRight(count(&params, 0))),
            b'D' => Some(Action::CursorLeft(count(&params, 0))),
            b'E' => Some(Action::CursorNextLine(count(&params, 0))),
            b'F' => Some(Action::CursorPrevLine(count(&params, 0))),
            b'G' => Some(Action::CursorColumn(count(&params, 0) - 1)),
            b'd' => Some(Action::CursorRow(count(&params, 0) - 1)),
            b'H' | b'f' => Some(Action::CursorPosition {
                row: count(&params, 0) - 1,
                col: count(&params, 1) - 1,
            }),
            b'J' => {
                let mode = select(&params, 0);
                if mode <= 2 {
                    Some(Action::EraseInDisplay(mode as u8))
                } else {
                    trace!(mode, "discarding ED with unsupported mode");
                    None
                }
            }
            b'K' => {
                let mode = select(&params, 0);
                if mode <= 2 {
                    Some(Action::EraseInLine(mode as u8))
                } else {
                    trace!(mode, "discarding EL with unsupported mode");
                    None
                }
            }
            b'L' => Some(Action::InsertLines(count(&params, 0))),
            b'M' => Some(Action::DeleteLines(count(&params, 0))),
            b'@' => Some(Action::InsertChars(count(&params, 0))),
            b'P' => Some(Action::DeleteChars(count(&params, 0))),
            b'S' => Some(Action::ScrollUp(count(&params, 0))),
            b'T' => Some(Action::ScrollDown(count(&params, 0))),
            b'X' => Some(Action::EraseChars(count(&params, 0))),
            b'Z' => Some(Action::BackTab(count(&params, 0))),
            b'm' => Some(Action::Sgr(params)),
            b'h' => Some(Action::AnsiSet(params)),
            b'l' => Some(Action::AnsiRst(params)),
            b'r' => Some(Action::SetScrollRegion {
                top: count(&params, 0) - 1,
                bottom: select(&params, 1),
            }),
            b'g' => Some(Action::ClearTabStop(select(&params, 0))),
            _ => {
                trace!(final_byte = fin, "discarding unknown CSI sequence");
                None
            }
        }
    }
}

/// Count-style parameter: missing and zero both mean 1.
fn count(params: &CsiParams, idx: usize) -> u16 {
    params
        .get(idx)
        .copied()
        .flatten()
        .unwrap_or(1)
        .max(1)
}

/// Selector-style parameter: missing means 0.
fn select(params: &CsiParams, idx: usize) -> u16 {
    params.get(idx).copied().flatten().unwrap_or(0)
}
