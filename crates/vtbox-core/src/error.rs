//! Error types for the emulator core.
//!
//! The parser never errors (unknown sequences are discarded) and the
//! emulator never errors at a fixed size; the only failure paths are the
//! hex-dump decoder and the auto-grow cell limit.

use thiserror::Error;

/// Errors surfaced by the public entry points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Error {
    /// The hex-dump decoder hit an unpaired nibble or a byte token that is
    /// not two hex digits. `line` is 1-based.
    #[error("malformed hex dump at line {line}")]
    MalformedHexDump { line: usize },

    /// Auto-grow emulation exceeded the grid cell limit.
    ///
    /// Carries the dimensions requested at the point of failure, so callers
    /// still see the partial measurement.
    #[error("grid overflow: {cols}x{rows} exceeds the cell limit")]
    GridOverflow { cols: u32, rows: u32 },
}

/// Result type alias for core operations.
pub type Result<T> = std::result::Result<T, Error>;
