//! Conformance against the VT100 demo test ("vttest") screen-alignment
//! capture and the reference display-width scenarios.
//!
//! The fixture is a `hexdump -C` capture of the byte stream vttest emits
//! for its screen-alignment page: DECALN, ED/EL carving, a border of `*`
//! and `+` drawn with CUP/HVP, IND/RI/NEL motion, and the centered message
//! text. After decoding and emulation, the trimmed display must reproduce
//! the reference frame cell for cell.

use vtbox_core::{display_width, parse_hex_dump, trim};

const SCREEN_ALIGNMENT_HEX: &str = include_str!("fixtures/vttest_screen_alignment.hex");
const SCREEN_ALIGNMENT_FRAME: &str = include_str!("fixtures/vttest_screen_alignment.txt");

#[test]
fn screen_alignment_fixture_decodes() {
    let bytes = parse_hex_dump(SCREEN_ALIGNMENT_HEX.as_bytes()).expect("fixture must decode");
    // The capture spans two stanzas totalling 0x2f8 + 0x10c4 bytes.
    assert_eq!(bytes.len(), 0x2f8 + 0x10c4);
    assert_eq!(bytes[0], 0x1b);
}

#[test]
fn screen_alignment_frame_matches_reference() {
    let bytes = parse_hex_dump(SCREEN_ALIGNMENT_HEX.as_bytes()).expect("fixture must decode");
    let lines = trim(&bytes).expect("fixed-size emulation cannot fail");

    let expected: Vec<&str> = SCREEN_ALIGNMENT_FRAME.lines().collect();
    assert_eq!(expected.len(), 24, "reference frame is a full display");
    assert_eq!(lines.len(), expected.len());
    for (row, (got, want)) in lines.iter().zip(&expected).enumerate() {
        assert_eq!(got, want, "row {row} differs");
    }
}

#[test]
fn screen_alignment_border_details() {
    let bytes = parse_hex_dump(SCREEN_ALIGNMENT_HEX.as_bytes()).unwrap();
    let lines = trim(&bytes).unwrap();

    // Outer border: unbroken '*' ring.
    assert_eq!(lines[0], "*".repeat(80));
    assert_eq!(lines[23], "*".repeat(80));
    // Inner border: '+' ring one cell in.
    assert_eq!(lines[1], format!("*{}*", "+".repeat(78)));
    assert_eq!(lines[22], format!("*{}*", "+".repeat(78)));
    // The message row inside the E-frame.
    assert!(lines[10].contains("The screen should be cleared,  and have an unbroken bor-"));
    assert!(lines[13].contains("Push <RETURN>"));
}

// ── Display-width scenarios ────────────────────────────────────────

#[test]
fn plain_text() {
    assert_eq!(display_width(b"Hello, world!").unwrap(), (13, 1));
    assert_eq!(trim(b"Hello, world!").unwrap(), vec!["Hello, world!"]);
}

#[test]
fn colored_text_has_the_same_geometry() {
    let input = b"\x1b[30;41mHello, world!\x1b[0m";
    assert_eq!(display_width(input).unwrap(), (13, 1));
    assert_eq!(trim(input).unwrap(), vec!["Hello, world!"]);
}

#[test]
fn narrow_mode_alignment_is_a_full_display() {
    let input = b"\x1b[?3l\x1b#8";
    assert_eq!(display_width(input).unwrap(), (80, 24));
    let lines = trim(input).unwrap();
    assert_eq!(lines.len(), 24);
    for line in &lines {
        assert_eq!(line.as_str(), "E".repeat(80));
    }
}

#[test]
fn absolute_addressing_places_cells() {
    let lines = trim(b"A\x1b[5;10HB").unwrap();
    assert_eq!(lines.len(), 5);
    assert_eq!(lines[0], "A");
    assert_eq!(lines[4], format!("{}B", " ".repeat(9)));
    for line in &lines[1..4] {
        assert!(line.is_empty());
    }
}

#[test]
fn cursor_back_overwrites_in_place() {
    assert_eq!(trim(b"ABC\x1b[2DX").unwrap(), vec!["AXC"]);
}
