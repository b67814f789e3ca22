//! Punycode ([RFC 3492](http://tools.ietf.org/html/rfc3492)) implementation.
//!
//! `encode` and `decode` are the plain Bootstring transform.
//! `encode_label` and `decode_label` add the ACE handling used for domain
//! labels: the `xn--` prefix, and leaving labels that are already ASCII alone.
use crate::codepoint::CodePoints;
use thiserror::Error;

pub const BASE: u32 = 36;
pub const T_MIN: u32 = 1;
pub const T_MAX: u32 = 26;
pub const SKEW: u32 = 38;
pub const DAMP: u32 = 700;
pub const INITIAL_BIAS: u32 = 72;
pub const INITIAL_N: u32 = 0x80;
pub const DELIMITER: char = '-';
pub const PREFIX: &str = "xn--";

/// Failures of the Bootstring transform on a single label.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    #[error("invalid punycode digit {0:?}")]
    InvalidDigit(char),
    #[error("punycode input ends in the middle of a number")]
    UnexpectedEnd,
    #[error("non-basic code point {0:?} before the delimiter")]
    NonBasicSeed(char),
    #[error("punycode arithmetic overflow")]
    Overflow,
    #[error("decoded value {0:#x} is not a unicode scalar value")]
    InvalidCodePoint(u32),
}

/// Digit base for position `k` of a variable-length integer.
///
/// Always within `T_MIN..=T_MAX`.
#[inline]
pub fn threshold(k: u32, bias: u32) -> u32 {
    if k <= bias + T_MIN {
        T_MIN
    } else if k >= bias + T_MAX {
        T_MAX
    } else {
        k - bias
    }
}

/// Bias adaptation after a delta has been coded.
#[inline]
pub fn adapt(mut delta: u32, num_points: u32, first_time: bool) -> u32 {
    delta /= if first_time { DAMP } else { 2 };
    delta += delta / num_points;
    let mut k = 0;
    while delta > ((BASE - T_MIN) * T_MAX) / 2 {
        delta /= BASE - T_MIN;
        k += BASE;
    }
    k + (((BASE - T_MIN + 1) * delta) / (delta + SKEW))
}

#[inline]
fn value_to_digit(value: u32) -> char {
    match value {
        0..=25 => (value as u8 + b'a') as char,
        26..=35 => (value as u8 - 26 + b'0') as char,
        _ => unreachable!("digit value {} out of range", value),
    }
}

#[inline]
fn digit_to_value(c: char) -> Option<u32> {
    match c {
        'a'..='z' => Some(c as u32 - 'a' as u32),
        '0'..='9' => Some(c as u32 - '0' as u32 + 26),
        _ => None,
    }
}

/// Encode a label to its ACE form.
///
/// Labels made only of basic code points come back unchanged, without
/// prefix. Everything else is Punycode with `xn--` in front.
pub fn encode_label(label: &str) -> Result<String, Error> {
    let points = CodePoints::new(label);
    if points.is_basic() {
        return Ok(label.to_owned());
    }
    let mut output = String::with_capacity(PREFIX.len() + label.len() * 2);
    output.push_str(PREFIX);
    encode_into(&points, &mut output)?;
    Ok(output)
}

/// Decode the part of an ACE label that follows `xn--`.
#[inline]
pub fn decode_label(input: &str) -> Result<String, Error> {
    decode_to_string(input)
}

/// Convert an Unicode `str` to Punycode.
pub fn encode_str(input: &str) -> Result<String, Error> {
    encode(&CodePoints::new(input))
}

/// Convert code points to Punycode.
pub fn encode(input: &CodePoints) -> Result<String, Error> {
    let mut output = String::with_capacity(input.all.len() * 2);
    encode_into(input, &mut output)?;
    Ok(output)
}

fn encode_into(input: &CodePoints, output: &mut String) -> Result<(), Error> {
    for &code in &input.basic {
        output.push(code as u8 as char);
    }
    let basic_length = input.basic.len() as u32;
    if basic_length > 0 {
        output.push(DELIMITER);
    }

    let mut n = INITIAL_N;
    let mut delta: u32 = 0;
    let mut bias = INITIAL_BIAS;
    let mut processed = basic_length;

    for m in input.distinct_non_basic() {
        let step = (m - n)
            .checked_mul(processed + 1)
            .ok_or(Error::Overflow)?;
        delta = delta.checked_add(step).ok_or(Error::Overflow)?;
        n = m;

        for &c in &input.all {
            if c < n {
                delta = delta.checked_add(1).ok_or(Error::Overflow)?;
            }
            if c == n {
                let mut q = delta;
                let mut k = BASE;
                loop {
                    let t = threshold(k, bias);
                    if q < t {
                        break;
                    }
                    output.push(value_to_digit(t + (q - t) % (BASE - t)));
                    q = (q - t) / (BASE - t);
                    k += BASE;
                }
                output.push(value_to_digit(q));
                bias = adapt(delta, processed + 1, processed == basic_length);
                delta = 0;
                processed += 1;
            }
        }
        delta = delta.checked_add(1).ok_or(Error::Overflow)?;
        n += 1;
    }
    Ok(())
}

/// Convert Punycode to an Unicode `String`.
pub fn decode_to_string(input: &str) -> Result<String, Error> {
    decode(input)?
        .into_iter()
        .map(|code| std::char::from_u32(code).ok_or(Error::InvalidCodePoint(code)))
        .collect()
}

/// Convert Punycode to code points.
pub fn decode(input: &str) -> Result<Vec<u32>, Error> {
    let (seed, digits) = match input.rfind(DELIMITER) {
        Some(position) => (&input[..position], &input[position + 1..]),
        None => ("", input),
    };
    let mut output = Vec::with_capacity(input.len());
    for c in seed.chars() {
        if !c.is_ascii() {
            return Err(Error::NonBasicSeed(c));
        }
        output.push(c as u32);
    }

    let mut n = INITIAL_N;
    let mut i: u32 = 0;
    let mut bias = INITIAL_BIAS;
    let mut digits = digits.chars();

    while let Some(mut c) = digits.next() {
        let old_i = i;
        let mut w: u32 = 1;
        let mut k = BASE;
        loop {
            let digit = digit_to_value(c).ok_or(Error::InvalidDigit(c))?;
            i = digit
                .checked_mul(w)
                .and_then(|x| i.checked_add(x))
                .ok_or(Error::Overflow)?;
            let t = threshold(k, bias);
            if digit < t {
                break;
            }
            w = w.checked_mul(BASE - t).ok_or(Error::Overflow)?;
            k += BASE;
            c = digits.next().ok_or(Error::UnexpectedEnd)?;
        }

        let length = output.len() as u32 + 1;
        bias = adapt(i - old_i, length, old_i == 0);
        n = n.checked_add(i / length).ok_or(Error::Overflow)?;
        i %= length;
        if std::char::from_u32(n).is_none() {
            return Err(Error::InvalidCodePoint(n));
        }
        output.insert(i as usize, n);
        i += 1;
    }
    Ok(output)
}
