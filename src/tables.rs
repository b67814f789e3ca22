//! Character-class tables consumed by the preprocessing and validation steps.
//!
//! The codec only ever talks to the [`Tables`] trait. [`Uts46Tables`] is the
//! built-in provider: a compact subset of the UTS #46 mapping data derived
//! from the Unicode properties the standard library and
//! `unicode-normalization` already carry. Its base mapping is NFKC followed
//! by lowercasing, so mapped text maps to itself.
use std::borrow::Cow;
use unicode_normalization::UnicodeNormalization;

/// Normalization forms a provider must support.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NormalizationForm {
    /// Canonical composition (NFC).
    C,
    /// Compatibility composition (NFKC).
    Kc,
}

/// Lookup capability over the UTS #46 character classes.
///
/// Mappings are applied one character at a time and their output is not
/// looked up again.
pub trait Tables {
    /// Characters that are never allowed in a domain name.
    fn is_disallowed(&self, c: char) -> bool;

    /// Characters only rejected when STD3 ASCII rules are in effect.
    fn is_disallowed_std3(&self, c: char) -> bool;

    /// Characters removed before mapping.
    fn is_ignored(&self, c: char) -> bool;

    /// Mapping applied in every mode.
    fn base_mapping(&self, c: char) -> Option<Cow<'static, str>>;

    /// Mapping applied in transitional mode only.
    fn deviation_mapping(&self, c: char) -> Option<Cow<'static, str>>;

    /// Mapping applied when STD3 ASCII rules are off.
    fn not_std3_mapping(&self, c: char) -> Option<Cow<'static, str>>;

    fn normalize(&self, text: &str, form: NormalizationForm) -> String {
        match form {
            NormalizationForm::C => text.nfc().collect(),
            NormalizationForm::Kc => text.nfkc().collect(),
        }
    }
}

impl<'a, T: Tables + ?Sized> Tables for &'a T {
    fn is_disallowed(&self, c: char) -> bool {
        (**self).is_disallowed(c)
    }
    fn is_disallowed_std3(&self, c: char) -> bool {
        (**self).is_disallowed_std3(c)
    }
    fn is_ignored(&self, c: char) -> bool {
        (**self).is_ignored(c)
    }
    fn base_mapping(&self, c: char) -> Option<Cow<'static, str>> {
        (**self).base_mapping(c)
    }
    fn deviation_mapping(&self, c: char) -> Option<Cow<'static, str>> {
        (**self).deviation_mapping(c)
    }
    fn not_std3_mapping(&self, c: char) -> Option<Cow<'static, str>> {
        (**self).not_std3_mapping(c)
    }
    fn normalize(&self, text: &str, form: NormalizationForm) -> String {
        (**self).normalize(text, form)
    }
}

/// The default provider.
///
/// This is not the generated UTS #46 mapping table. It covers case folding,
/// NFKC compatibility mappings, the deviation characters, the common ignored
/// and disallowed ranges, and the fullwidth punctuation and space mappings.
/// Anything outside those classes is treated as valid and unmapped, including
/// unassigned code points. Supply a complete [`Tables`] implementation where
/// exact UTS #46 conformance matters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Uts46Tables;

impl Tables for Uts46Tables {
    fn is_disallowed(&self, c: char) -> bool {
        let code = c as u32;
        match c {
            '\u{80}'..='\u{9F}'
            | '\u{200E}'..='\u{200F}'
            | '\u{2028}'..='\u{202E}'
            | '\u{2066}'..='\u{2069}'
            | '\u{2FF0}'..='\u{2FFB}'
            | '\u{E000}'..='\u{F8FF}'
            | '\u{FDD0}'..='\u{FDEF}'
            | '\u{FFF9}'..='\u{FFFD}'
            | '\u{E0001}'
            | '\u{E0020}'..='\u{E007F}'
            | '\u{F0000}'..='\u{10FFFF}' => true,
            _ => code & 0xFFFE == 0xFFFE,
        }
    }

    fn is_disallowed_std3(&self, c: char) -> bool {
        if c.is_ascii() {
            return !(c.is_ascii_alphanumeric() || c == '-' || c == '.');
        }
        self.not_std3_mapping(c).is_some()
    }

    fn is_ignored(&self, c: char) -> bool {
        match c {
            '\u{AD}'
            | '\u{34F}'
            | '\u{180B}'..='\u{180D}'
            | '\u{180F}'
            | '\u{200B}'
            | '\u{2060}'
            | '\u{2064}'
            | '\u{FE00}'..='\u{FE0F}'
            | '\u{FEFF}'
            | '\u{1BCA0}'..='\u{1BCA3}'
            | '\u{E0100}'..='\u{E01EF}' => true,
            _ => false,
        }
    }

    fn base_mapping(&self, c: char) -> Option<Cow<'static, str>> {
        match c {
            'a'..='z' | '0'..='9' | '-' | '.' => None,
            '\u{3002}' | '\u{FF0E}' | '\u{FF61}' => Some(Cow::Borrowed(".")),
            '\u{1E9E}' => Some(Cow::Borrowed("ss")),
            _ => {
                let folded: String = std::iter::once(c)
                    .nfkc()
                    .flat_map(char::to_lowercase)
                    .collect();
                if folded.chars().eq(std::iter::once(c)) {
                    None
                } else {
                    Some(Cow::Owned(folded))
                }
            }
        }
    }

    fn deviation_mapping(&self, c: char) -> Option<Cow<'static, str>> {
        match c {
            '\u{DF}' => Some(Cow::Borrowed("ss")),
            '\u{3C2}' => Some(Cow::Borrowed("\u{3C3}")),
            '\u{200C}' | '\u{200D}' => Some(Cow::Borrowed("")),
            _ => None,
        }
    }

    fn not_std3_mapping(&self, c: char) -> Option<Cow<'static, str>> {
        match c {
            '\u{A0}' | '\u{2000}'..='\u{200A}' | '\u{202F}' | '\u{205F}' | '\u{3000}' => {
                Some(Cow::Borrowed(" "))
            }
            // Fullwidth ASCII punctuation, minus the hyphen and full stop.
            '\u{FF01}'..='\u{FF0C}'
            | '\u{FF0F}'
            | '\u{FF1A}'..='\u{FF20}'
            | '\u{FF3B}'..='\u{FF40}'
            | '\u{FF5B}'..='\u{FF5E}' => {
                std::char::from_u32(c as u32 - 0xFEE0).map(|ascii| Cow::Owned(ascii.to_string()))
            }
            _ => None,
        }
    }
}
