//! Canonical hex-dump decoder.
//!
//! Converts `hexdump -C` style text back into the raw octets it describes:
//!
//! ```text
//! 00000000  1b 5b 3f 33 6c 1b 23 38  1b 5b 39 3b 31 30 48 1b  |.[?3l.#8.[9;10H.|
//! ```
//!
//! Stanzas may repeat and may be interleaved with header lines such as
//! `stdout:`; any line whose first token is not a lowercase hexadecimal
//! offset is skipped silently. The offset and the ASCII pane (everything
//! from the first `|`) are ignored. The emulator core is oblivious to this
//! decoding — it is pure format conversion.

use crate::error::{Error, Result};

/// Decode hex-dump text into raw octets.
///
/// Short final lines (fewer than 16 bytes) are accepted. A byte token that
/// is not exactly two hex digits on an otherwise well-formed line fails
/// with [`Error::MalformedHexDump`].
pub fn parse_hex_dump(input: &[u8]) -> Result<Vec<u8>> {
    let text = String::from_utf8_lossy(input);
    let mut out = Vec::new();

    for (idx, line) in text.lines().enumerate() {
        // The ASCII pane may contain anything, spaces and '|' included;
        // drop it before tokenizing.
        let data = match line.find('|') {
            Some(pane) => &line[..pane],
            None => line,
        };
        let mut tokens = data.split_ascii_whitespace();
        let Some(offset) = tokens.next() else {
            continue;
        };
        if !is_offset(offset) {
            continue;
        }
        for token in tokens {
            if token.len() != 2 || !token.bytes().all(|b| b.is_ascii_hexdigit()) {
                return Err(Error::MalformedHexDump { line: idx + 1 });
            }
            // Both digits verified hex above, so this cannot fail.
            out.push(u8::from_str_radix(token, 16).unwrap_or_default());
        }
    }
    Ok(out)
}

/// One or more lowercase hexadecimal digits.
fn is_offset(token: &str) -> bool {
    !token.is_empty()
        && token
            .bytes()
            .all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_a_full_line() {
        let input = b"00000000  48 65 6c 6c 6f 2c 20 77  6f 72 6c 64 21 0d 0a 21  |Hello, world!..!|\n";
        assert_eq!(parse_hex_dump(input).unwrap(), b"Hello, world!\r\n!");
    }

    #[test]
    fn decodes_a_short_final_line() {
        let input = b"00000010  2a 1b 5b\n";
        assert_eq!(parse_hex_dump(input).unwrap(), b"*\x1b[");
    }

    #[test]
    fn skips_header_and_blank_lines() {
        let input = b"stdout:\n\n00000000  61 62\nstdout:\n00000000  63\n";
        assert_eq!(parse_hex_dump(input).unwrap(), b"abc");
    }

    #[test]
    fn ascii_pane_is_ignored_even_with_hexish_content() {
        let input = b"00000000  61 62  |ab cd 12|\n";
        assert_eq!(parse_hex_dump(input).unwrap(), b"ab");
    }

    #[test]
    fn uppercase_offset_is_not_an_offset() {
        // `hexdump -C` offsets are lowercase; anything else is a skipped line.
        let input = b"0000000A  61 62\n";
        assert_eq!(parse_hex_dump(input).unwrap(), b"");
    }

    #[test]
    fn odd_length_token_is_malformed() {
        let input = b"00000000  61 6\n";
        assert_eq!(
            parse_hex_dump(input),
            Err(Error::MalformedHexDump { line: 1 })
        );
    }

    #[test]
    fn non_hex_token_is_malformed() {
        let input = b"00000000  61 zz\n";
        assert_eq!(
            parse_hex_dump(input),
            Err(Error::MalformedHexDump { line: 1 })
        );
    }

    #[test]
    fn error_reports_the_offending_line() {
        let input = b"00000000  61\n00000001  6\n";
        assert_eq!(
            parse_hex_dump(input),
            Err(Error::MalformedHexDump { line: 2 })
        );
    }

    #[test]
    fn empty_input_decodes_to_nothing() {
        assert_eq!(parse_hex_dump(b"").unwrap(), b"");
    }
}
