#![forbid(unsafe_code)]

//! Host-agnostic VT100/ANSI terminal emulation core.
//!
//! `vtbox-core` is a deterministic byte-stream interpreter: it consumes a
//! mixture of printable characters, control characters, and escape
//! sequences, and maintains the virtual character grid the stream would
//! produce on a VT100 display — without any host I/O dependencies.
//!
//! # Primary responsibilities
//!
//! - **Grid**: 2D cell matrix with cursor, scrolling region, and tab stops.
//! - **Cell**: character content + attributes (colors, bold, underline, …).
//! - **Parser**: VT100/ANSI escape-sequence state machine.
//! - **Emulator**: glues the parser to the grid, resolving wrap, scroll,
//!   and mode semantics; runs either at a fixed size or in auto-grow mode.
//!
//! # Consumers
//!
//! - [`display_width`] measures the minimum bounding rectangle a stream
//!   needs to render (auto-grow emulation).
//! - [`trim`] renders a stream at 80×24 and returns the visible rows with
//!   trailing blanks removed.
//! - [`parse_hex_dump`] decodes canonical `hexdump -C` text into the raw
//!   octets the emulator consumes.
//!
//! # Design principles
//!
//! - **No I/O**: all types are pure data + logic; callers supply bytes.
//! - **Deterministic**: identical byte sequences always produce identical
//!   grids.
//! - **Total parsing**: malformed or unknown sequences are discarded, never
//!   surfaced as errors.
//! - **`#![forbid(unsafe_code)]`**: safety enforced at compile time.

pub mod cell;
pub mod cursor;
pub mod emulator;
pub mod error;
pub mod grid;
pub mod hexdump;
pub mod modes;
pub mod parser;

pub use cell::{AttrFlags, Attrs, Cell, Color};
pub use cursor::{Cursor, SavedCursor};
pub use emulator::{Emulator, display_width, trim};
pub use error::{Error, Result};
pub use grid::{DEFAULT_COLS, DEFAULT_ROWS, Grid, MAX_CELLS, TAB_INTERVAL};
pub use hexdump::parse_hex_dump;
pub use modes::Modes;
pub use parser::{Action, CsiParams, Parser};
