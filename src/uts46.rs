//! [*Unicode IDNA Compatibility Processing*
//! (Unicode Technical Standard #46)](http://www.unicode.org/reports/tr46/)
//! style preprocessing and per-label validation, on top of [`punycode`].
use crate::punycode::{self, PREFIX};
use crate::tables::{NormalizationForm, Tables, Uts46Tables};
use log::{debug, trace};
use std::borrow::Cow;
use thiserror::Error;
use unicode_bidi::{bidi_class, BidiClass};
use unicode_normalization::char::{canonical_combining_class, is_combining_mark};

pub const MAX_LABEL_LENGTH: usize = 63;
pub const MAX_DOMAIN_LENGTH: usize = 253;

const ZWNJ: char = '\u{200C}';
const ZWJ: char = '\u{200D}';
const VIRAMA: u8 = 9;

/// Reasons a domain name or a single label is rejected.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Error {
    #[error("empty label")]
    EmptyLabel,
    #[error("label is longer than 63 octets")]
    LabelTooLong,
    #[error("domain name is longer than 253 octets")]
    DomainNameTooLong,
    #[error("label starts with a hyphen")]
    LeadingHyphen,
    #[error("label ends with a hyphen")]
    TrailingHyphen,
    #[error("label has hyphens in the third and fourth positions")]
    HyphenAtPosition3And4,
    #[error("label starts with a combining mark")]
    LeadingCombiningMark,
    #[error("domain name contains a disallowed character")]
    Disallowed,
    #[error("invalid punycode")]
    InvalidPunycodeDigit,
    #[error("label contains a dot")]
    LabelContainsDot,
    #[error("invalid ACE label")]
    InvalidAceLabel,
    #[error("label breaks the bidi rule")]
    Bidi,
    #[error("label breaks the contextual joiner rule")]
    ContextJ,
}

impl From<punycode::Error> for Error {
    fn from(e: punycode::Error) -> Self {
        debug!("punycode failure: {}", e);
        Error::InvalidPunycodeDigit
    }
}

impl Error {
    /// Whether the label at `index` of a `count`-label domain may carry
    /// this error and still be accepted by `encode`/`decode`.
    fn is_tolerated(self, index: usize, count: usize) -> bool {
        match self {
            Error::HyphenAtPosition3And4 => true,
            Error::EmptyLabel => count > 1 && index == count - 1,
            Error::LabelTooLong
            | Error::DomainNameTooLong
            | Error::LeadingHyphen
            | Error::TrailingHyphen
            | Error::LeadingCombiningMark
            | Error::Disallowed
            | Error::InvalidPunycodeDigit
            | Error::LabelContainsDot
            | Error::InvalidAceLabel
            | Error::Bidi
            | Error::ContextJ => false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Config {
    non_transitional: bool,
    use_std3_ascii_rules: bool,
    check_bidi: bool,
    check_joiners: bool,
}

/// Transitional processing with STD3 rules and the optional IDNA2008
/// context checks turned off.
impl Default for Config {
    fn default() -> Self {
        Config {
            non_transitional: false,
            use_std3_ascii_rules: false,
            check_bidi: false,
            check_joiners: false,
        }
    }
}

impl Config {
    /// Keep deviation characters (ß, ς, ZWJ, ZWNJ) instead of mapping them.
    /// Breaks compatibility with IDNA2003.
    #[inline]
    pub fn non_transitional(mut self, value: bool) -> Self {
        self.non_transitional = value;
        self
    }

    /// Restrict labels to letters, digits and hyphens.
    #[inline]
    pub fn use_std3_ascii_rules(mut self, value: bool) -> Self {
        self.use_std3_ascii_rules = value;
        self
    }

    /// Apply the RFC 5893 bidi rule to domains containing right-to-left labels.
    #[inline]
    pub fn check_bidi(mut self, value: bool) -> Self {
        self.check_bidi = value;
        self
    }

    /// Only allow ZWJ and ZWNJ directly after a virama.
    #[inline]
    pub fn check_joiners(mut self, value: bool) -> Self {
        self.check_joiners = value;
        self
    }

    /// Bind this configuration to the built-in tables.
    #[inline]
    pub fn codec(self) -> Codec {
        Codec::new(self, Uts46Tables)
    }

    pub fn encode(self, domain: &str) -> Result<String, Error> {
        self.codec().encode(domain)
    }

    pub fn decode(self, domain: &str) -> Result<String, Error> {
        self.codec().decode(domain)
    }
}

/// A configured converter between Unicode and ASCII domain names.
///
/// Holds no state besides its configuration and table provider, so one value
/// can be shared freely between threads.
#[derive(Debug, Clone, Default)]
pub struct Codec<T = Uts46Tables> {
    config: Config,
    tables: T,
}

impl<T: Tables> Codec<T> {
    pub fn new(config: Config, tables: T) -> Self {
        Codec { config, tables }
    }

    #[inline]
    pub fn config(&self) -> Config {
        self.config
    }

    fn is_disallowed(&self, c: char) -> bool {
        self.tables.is_disallowed(c)
            || (self.config.use_std3_ascii_rules && self.tables.is_disallowed_std3(c))
    }

    fn remap(&self, c: char) -> Option<Cow<'static, str>> {
        if !self.config.use_std3_ascii_rules {
            if let Some(mapped) = self.tables.not_std3_mapping(c) {
                return Some(mapped);
            }
        }
        if !self.config.non_transitional {
            if let Some(mapped) = self.tables.deviation_mapping(c) {
                return Some(mapped);
            }
        }
        self.tables.base_mapping(c)
    }

    /// Reject disallowed characters, drop ignored ones, apply the mappings
    /// and normalize to NFKC.
    ///
    /// http://www.unicode.org/reports/tr46/#Processing
    pub fn preprocess(&self, domain: &str) -> Result<String, Error> {
        if let Some(c) = domain.chars().find(|&c| self.is_disallowed(c)) {
            debug!("disallowed character {:?} in {:?}", c, domain);
            return Err(Error::Disallowed);
        }
        let mut mapped = String::with_capacity(domain.len());
        for c in domain.chars().filter(|&c| !self.tables.is_ignored(c)) {
            match self.remap(c) {
                Some(replacement) => mapped.push_str(&replacement),
                None => mapped.push(c),
            }
        }
        let normalized = self.tables.normalize(&mapped, NormalizationForm::Kc);
        trace!("preprocessed {:?} to {:?}", domain, normalized);
        Ok(normalized)
    }

    /// Check one label.
    ///
    /// `for_encoding` selects the checks made on a label that has just been
    /// converted to ASCII; otherwise the label is treated as decoded Unicode.
    pub fn validate_label(&self, label: &str, for_encoding: bool) -> Result<(), Error> {
        let first = match label.chars().next() {
            Some(c) => c,
            None => return Err(Error::EmptyLabel),
        };
        if for_encoding {
            if label.len() > MAX_LABEL_LENGTH {
                return Err(Error::LabelTooLong);
            }
            if self.config.use_std3_ascii_rules
                && !label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
            {
                return Err(Error::InvalidPunycodeDigit);
            }
        }
        if label.starts_with('-') {
            return Err(Error::LeadingHyphen);
        }
        if label.ends_with('-') {
            return Err(Error::TrailingHyphen);
        }
        if label.chars().skip(2).take(2).eq("--".chars()) {
            return Err(Error::HyphenAtPosition3And4);
        }
        if is_combining_mark(first) {
            return Err(Error::LeadingCombiningMark);
        }
        if label.chars().any(|c| self.is_disallowed(c)) {
            return Err(Error::InvalidAceLabel);
        }
        if !for_encoding && self.tables.normalize(label, NormalizationForm::Kc) != label {
            return Err(Error::InvalidAceLabel);
        }
        if label.contains('.') {
            return Err(Error::LabelContainsDot);
        }
        if self.config.check_joiners && !passes_contextj(label) {
            return Err(Error::ContextJ);
        }
        Ok(())
    }

    /// http://www.unicode.org/reports/tr46/#ToASCII
    ///
    /// The domain must first survive [`decode`](Self::decode); only then is
    /// each label converted and checked again in its ASCII form.
    pub fn encode(&self, domain: &str) -> Result<String, Error> {
        self.decode(domain)?;

        let preprocessed = self.preprocess(domain)?;
        let count = preprocessed.split('.').count();
        let mut output = String::with_capacity(preprocessed.len());
        for (index, label) in preprocessed.split('.').enumerate() {
            if index > 0 {
                output.push('.');
            }
            let encoded = punycode::encode_label(label)?;
            if let Err(error) = self.validate_label(&encoded, true) {
                if !error.is_tolerated(index, count) {
                    debug!("rejecting label {:?} of {:?}: {}", encoded, domain, error);
                    return Err(error);
                }
            }
            output.push_str(&encoded);
        }

        if output.trim_end_matches('.').len() > MAX_DOMAIN_LENGTH {
            debug!("{:?} encodes to {} octets", domain, output.len());
            return Err(Error::DomainNameTooLong);
        }
        Ok(output)
    }

    /// http://www.unicode.org/reports/tr46/#ToUnicode
    ///
    /// Labels starting with `xn--` are decoded; the others pass through.
    pub fn decode(&self, domain: &str) -> Result<String, Error> {
        let preprocessed = self.preprocess(domain)?;
        let count = preprocessed.split('.').count();
        let mut output = String::with_capacity(preprocessed.len());
        for (index, label) in preprocessed.split('.').enumerate() {
            if index > 0 {
                output.push('.');
            }
            let decoded = match label.strip_prefix(PREFIX) {
                Some(rest) => Cow::Owned(punycode::decode_label(rest)?),
                None => Cow::Borrowed(label),
            };
            if let Err(error) = self.validate_label(&decoded, false) {
                if !error.is_tolerated(index, count) {
                    debug!("rejecting label {:?} of {:?}: {}", decoded, domain, error);
                    return Err(error);
                }
            }
            output.push_str(&decoded);
        }

        if self.config.check_bidi && is_bidi_domain(&output) {
            if let Some(label) = output.split('.').find(|label| !passes_bidi(label)) {
                debug!("label {:?} of {:?} fails the bidi rule", label, domain);
                return Err(Error::Bidi);
            }
        }
        Ok(output)
    }
}

/// ZWNJ and ZWJ must follow a virama.
///
/// https://tools.ietf.org/html/rfc5892#appendix-A.1
fn passes_contextj(label: &str) -> bool {
    let mut previous = None;
    for c in label.chars() {
        if (c == ZWNJ || c == ZWJ)
            && previous.map_or(true, |p| canonical_combining_class(p) != VIRAMA)
        {
            return false;
        }
        previous = Some(c);
    }
    true
}

fn is_bidi_domain(domain: &str) -> bool {
    domain
        .chars()
        .filter(|c| !c.is_ascii_graphic())
        .any(|c| matches!(bidi_class(c), BidiClass::R | BidiClass::AL | BidiClass::AN))
}

/// https://tools.ietf.org/html/rfc5893#section-2
fn passes_bidi(label: &str) -> bool {
    use BidiClass::*;

    let first = match label.chars().next() {
        Some(c) => bidi_class(c),
        None => return true,
    };
    // Trailing non-spacing marks do not decide the direction of the end.
    let last = label.chars().rev().map(bidi_class).find(|&class| class != NSM);
    match first {
        L => {
            label
                .chars()
                .map(bidi_class)
                .all(|class| matches!(class, L | EN | ES | CS | ET | ON | BN | NSM))
                && matches!(last, Some(L) | Some(EN))
        }
        R | AL => {
            let (mut found_en, mut found_an) = (false, false);
            for class in label.chars().map(bidi_class) {
                match class {
                    EN => found_en = true,
                    AN => found_an = true,
                    R | AL | ES | CS | ET | ON | BN | NSM => {}
                    _ => return false,
                }
            }
            matches!(last, Some(R) | Some(AL) | Some(EN) | Some(AN)) && !(found_en && found_an)
        }
        _ => false,
    }
}
