//! Capture codec: turns an agent artifact's raw bytes into a pure-ASCII
//! blob that survives any number of embed/regenerate cycles.
//!
//! Capture is total: no byte sequence can make it fail. Invalid UTF-8 is
//! replaced rather than rejected, em/en dashes are normalized to their
//! ASCII spellings, and any remaining non-ASCII character is written as a
//! numeric character reference (`&#NNN;`).

/// Encode raw artifact bytes into an embeddable ASCII string.
pub fn clean_ascii(raw: &[u8]) -> String {
    let decoded = String::from_utf8_lossy(raw);
    let normalized = decoded.replace('\u{2014}', "--").replace('\u{2013}', "-");

    let mut out = String::with_capacity(normalized.len());
    for ch in normalized.chars() {
        if ch.is_ascii() {
            out.push(ch);
        } else {
            out.push_str(&format!("&#{};", ch as u32));
        }
    }
    out
}

/// Decode the numeric character references produced by [`clean_ascii`].
/// Sequences that do not form a valid reference are kept verbatim.
pub fn decode_ascii(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(pos) = rest.find("&#") {
        out.push_str(&rest[..pos]);
        let tail = &rest[pos + 2..];

        let reference = tail.find(';').and_then(|end| {
            if end == 0 || !tail[..end].bytes().all(|b| b.is_ascii_digit()) {
                return None;
            }
            let ch = tail[..end].parse::<u32>().ok().and_then(char::from_u32)?;
            Some((ch, end))
        });

        match reference {
            Some((ch, end)) => {
                out.push(ch);
                rest = &tail[end + 1..];
            }
            None => {
                out.push_str("&#");
                rest = tail;
            }
        }
    }
    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ascii_input_passes_through() {
        let raw = b"{\"role\": \"successor\"}\n";
        assert_eq!(clean_ascii(raw), "{\"role\": \"successor\"}\n");
    }

    #[test]
    fn dashes_are_normalized() {
        let raw = "a \u{2014} b \u{2013} c".as_bytes();
        assert_eq!(clean_ascii(raw), "a -- b - c");
    }

    #[test]
    fn non_ascii_becomes_numeric_reference() {
        assert_eq!(clean_ascii("caf\u{e9}".as_bytes()), "caf&#233;");
    }

    #[test]
    fn capture_is_total_over_invalid_bytes() {
        let raw = [0x66, 0x6f, 0xff, 0xfe, 0x6f];
        let out = clean_ascii(&raw);
        assert!(out.is_ascii());
        // each invalid byte was replaced, then entity-encoded
        assert_eq!(out, "fo&#65533;&#65533;o");
    }

    #[test]
    fn round_trip_up_to_dash_normalization() {
        let source = "let x = \"\u{e9}t\u{e9}\"; // koala \u{1F428}\n";
        let encoded = clean_ascii(source.as_bytes());
        assert!(encoded.is_ascii());
        assert_eq!(decode_ascii(&encoded), source);
    }

    #[test]
    fn round_trip_normalizes_dashes() {
        let source = "a \u{2014} b";
        assert_eq!(decode_ascii(&clean_ascii(source.as_bytes())), "a -- b");
    }

    #[test]
    fn decode_keeps_malformed_references() {
        assert_eq!(decode_ascii("a &# b"), "a &# b");
        assert_eq!(decode_ascii("&#;"), "&#;");
        assert_eq!(decode_ascii("&#x41;"), "&#x41;");
        assert_eq!(decode_ascii("tail &#12"), "tail &#12");
    }

    #[test]
    fn decode_rejects_out_of_range_reference() {
        // larger than any scalar value; kept verbatim
        assert_eq!(decode_ascii("&#99999999999;"), "&#99999999999;");
    }

    #[test]
    fn double_capture_is_stable() {
        let source = "caf\u{e9}";
        let once = clean_ascii(source.as_bytes());
        let twice = clean_ascii(once.as_bytes());
        assert_eq!(once, twice);
    }
}
