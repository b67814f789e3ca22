//! Conversion between UTF-8 bytes and numeric code points.
//!
//! The decoder trusts its input: it is only ever handed the bytes of a `str`,
//! so every sequence it sees is well formed. Going the other way, the encoder
//! lays out bytes for any value up to `0x10FFFF` and [`to_string`] rejects
//! whatever is not a Unicode scalar value.

const CONTINUATION: u32 = 0x80;

/// Decode the character starting at the beginning of `bytes`.
///
/// Returns the code point and the number of bytes it occupies,
/// or `None` if `bytes` is empty.
pub fn decode_at(bytes: &[u8]) -> Option<(u32, usize)> {
    let lead = u32::from(*bytes.first()?);
    let cont = |i: usize| bytes.get(i).map_or(0, |&b| u32::from(b) & 0x3F);
    Some(match lead {
        0x00..=0x7F => (lead, 1),
        0xC0..=0xDF => ((lead - 0xC0) * 64 + cont(1), 2),
        0xE0..=0xEF => ((lead - 0xE0) * 4096 + cont(1) * 64 + cont(2), 3),
        0xF0..=0xFF => (
            (lead - 0xF0) * 262_144 + cont(1) * 4096 + cont(2) * 64 + cont(3),
            4,
        ),
        // A stray continuation byte never starts a character of a `str`.
        _ => (lead, 1),
    })
}

/// Iterator over the code points of a UTF-8 byte string.
#[derive(Clone)]
pub struct CodePointIter<'a> {
    bytes: &'a [u8],
}

impl<'a> Iterator for CodePointIter<'a> {
    type Item = u32;

    fn next(&mut self) -> Option<u32> {
        let (code, width) = decode_at(self.bytes)?;
        self.bytes = self.bytes.get(width..).unwrap_or(&[]);
        Some(code)
    }
}

#[inline]
pub fn code_points(input: &str) -> CodePointIter<'_> {
    CodePointIter {
        bytes: input.as_bytes(),
    }
}

/// Lay out `code` as UTF-8 into `buf`, returning the used prefix.
///
/// Returns `None` for values above `0x10FFFF`.
pub fn encode_utf8(code: u32, buf: &mut [u8; 4]) -> Option<&[u8]> {
    let width = if code <= 0x7F {
        buf[0] = code as u8;
        1
    } else if code <= 0x7FF {
        buf[0] = ((code >> 6) + 0xC0) as u8;
        buf[1] = ((code & 0x3F) + CONTINUATION) as u8;
        2
    } else if code <= 0xFFFF {
        buf[0] = ((code >> 12) + 0xE0) as u8;
        buf[1] = (((code >> 6) & 0x3F) + CONTINUATION) as u8;
        buf[2] = ((code & 0x3F) + CONTINUATION) as u8;
        3
    } else if code <= 0x10_FFFF {
        buf[0] = ((code >> 18) + 0xF0) as u8;
        buf[1] = (((code >> 12) & 0x3F) + CONTINUATION) as u8;
        buf[2] = (((code >> 6) & 0x3F) + CONTINUATION) as u8;
        buf[3] = ((code & 0x3F) + CONTINUATION) as u8;
        4
    } else {
        return None;
    };
    Some(&buf[..width])
}

/// Assemble a string from code points.
///
/// Fails if any value is a surrogate or lies outside the Unicode range.
pub fn to_string(points: &[u32]) -> Option<String> {
    let mut bytes = Vec::with_capacity(points.len());
    let mut buf = [0; 4];
    for &code in points {
        bytes.extend_from_slice(encode_utf8(code, &mut buf)?);
    }
    String::from_utf8(bytes).ok()
}

/// The code points of one label, split into the views the Bootstring
/// encoder needs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CodePoints {
    /// Every code point, in input order.
    pub all: Vec<u32>,
    /// Code points below 128, in input order.
    pub basic: Vec<u32>,
    /// Code points of 128 and above, in input order, repeats included.
    pub non_basic: Vec<u32>,
}

impl CodePoints {
    pub fn new(input: &str) -> Self {
        let mut points = CodePoints::default();
        for code in code_points(input) {
            if code < 0x80 {
                points.basic.push(code);
            } else {
                points.non_basic.push(code);
            }
            points.all.push(code);
        }
        points
    }

    #[inline]
    pub fn is_basic(&self) -> bool {
        self.non_basic.is_empty()
    }

    /// Distinct non-basic code points, ascending.
    pub fn distinct_non_basic(&self) -> Vec<u32> {
        let mut distinct = self.non_basic.clone();
        distinct.sort_unstable();
        distinct.dedup();
        distinct
    }
}
