//! Conversion of internationalized domain names between their Unicode form
//! and the ASCII-compatible encoding used on the wire.
//!
//! The conversion follows [Punycode (RFC 3492)](https://tools.ietf.org/html/rfc3492)
//! for individual labels and the preprocessing steps of
//! [*Unicode IDNA Compatibility Processing*
//! (Unicode Technical Standard #46)](http://www.unicode.org/reports/tr46/)
//! for whole domains: mapping, normalization, rejection of disallowed
//! characters and per-label validation.
//!
//! Character-class data comes from a [`Tables`] provider. [`Uts46Tables`] is
//! used unless a [`Codec`] is built with another one. It covers only a
//! subset of the UTS #46 data.
pub mod codepoint;
pub mod punycode;
pub mod tables;
mod uts46;

pub use crate::tables::{NormalizationForm, Tables, Uts46Tables};
pub use crate::uts46::{Codec, Config, Error, MAX_DOMAIN_LENGTH, MAX_LABEL_LENGTH};

/// Return the ASCII representation of a domain name,
/// normalizing characters (upper-case to lower-case and other kinds of equivalence)
/// and using Punycode as necessary.
pub fn domain_to_ascii(domain: &str) -> Result<String, Error> {
    Config::default().encode(domain)
}

/// Like [`domain_to_ascii`], with STD3 ASCII rules in effect.
pub fn domain_to_ascii_strict(domain: &str) -> Result<String, Error> {
    Config::default().use_std3_ascii_rules(true).encode(domain)
}

/// Return the Unicode representation of a domain name,
/// decoding every label that carries the `xn--` prefix.
pub fn domain_to_unicode(domain: &str) -> Result<String, Error> {
    Config::default().decode(domain)
}
