//! Append-style JSON primitives used by the encoders.
//!
//! Everything here writes straight into a caller-owned `Vec<u8>` so a render
//! pass reuses one allocation.

use std::io::Write;

const HEX_UPPER: &[u8; 16] = b"0123456789ABCDEF";
const HEX_LOWER: &[u8; 16] = b"0123456789abcdef";

/// Append `s` as a quoted JSON string.
///
/// Only control bytes below 0x20, `\` and `"` are escaped. Multi-byte UTF-8
/// sequences never contain bytes below 0x80, so they pass through untouched.
pub fn push_str(buf: &mut Vec<u8>, s: &str) {
    let bytes = s.as_bytes();
    buf.reserve(bytes.len() + 2);
    buf.push(b'"');

    let mut start = 0;
    for (i, &c) in bytes.iter().enumerate() {
        if c >= 0x20 && c != b'\\' && c != b'"' {
            continue;
        }
        buf.extend_from_slice(&bytes[start..i]);
        match c {
            b'\\' | b'"' => buf.extend_from_slice(&[b'\\', c]),
            b'\n' => buf.extend_from_slice(b"\\n"),
            b'\r' => buf.extend_from_slice(b"\\r"),
            b'\t' => buf.extend_from_slice(b"\\t"),
            _ => buf.extend_from_slice(&[
                b'\\',
                b'u',
                b'0',
                b'0',
                HEX_LOWER[usize::from(c >> 4)],
                HEX_LOWER[usize::from(c & 0xF)],
            ]),
        }
        start = i + 1;
    }

    buf.extend_from_slice(&bytes[start..]);
    buf.push(b'"');
}

/// Append a decimal integer.
#[inline]
pub fn push_int(buf: &mut Vec<u8>, v: i64) {
    // Writing into a Vec cannot fail.
    let _ = write!(buf, "{v}");
}

/// Append `#RRGGBB`, or `#RRGGBBAA` when the alpha channel is not opaque.
pub fn push_hex_color(buf: &mut Vec<u8>, rrggbbaa: u32) {
    buf.reserve(9);
    buf.push(b'#');
    let digits = if rrggbbaa & 0xFF == 0xFF { 6 } else { 8 };
    for n in 0..digits {
        let shift = 28 - n * 4;
        buf.push(HEX_UPPER[((rrggbbaa >> shift) & 0xF) as usize]);
    }
}
