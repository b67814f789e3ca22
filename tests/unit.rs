use idna_codec::{Codec, Config, Error, Tables, Uts46Tables, MAX_DOMAIN_LENGTH};
use std::borrow::Cow;
use std::sync::Arc;
use std::thread;

#[test]
fn ascii_domains_pass_through() {
    for domain in &["example", "example.com", "a-b.c-d.e", "ab--cd.org", "x1.y2.z3."] {
        assert_eq!(idna_codec::domain_to_ascii(domain).as_deref(), Ok(*domain));
        assert_eq!(idna_codec::domain_to_unicode(domain).as_deref(), Ok(*domain));
    }
}

#[test]
fn unicode_round_trip() {
    let codec = Config::default().codec();
    for domain in &[
        "m\u{FC}ller",
        "B\u{FC}cher.Example",
        "\u{4F8B}\u{5B50}.\u{6D4B}\u{8BD5}",
        "\u{3B4}\u{3BF}\u{3BA}\u{3B9}\u{3BC}\u{3AE}.gr.",
        "\u{438}\u{441}\u{43F}\u{44B}\u{442}\u{430}\u{43D}\u{438}\u{435}.xn--mller-kva",
    ] {
        let ascii = codec.encode(domain).unwrap();
        assert!(ascii.is_ascii(), "{:?}", ascii);
        assert_eq!(codec.decode(&ascii), codec.decode(domain));
    }
}

#[test]
fn encode_is_idempotent_over_ace() {
    let codec = Config::default().codec();
    let ascii = codec.encode("m\u{FC}ller.\u{4F8B}\u{5B50}").unwrap();
    assert_eq!(ascii, "xn--mller-kva.xn--fsqu00a");
    assert_eq!(codec.encode(&ascii).unwrap(), ascii);
}

#[test]
fn label_length_boundary() {
    let codec = Config::default().codec();
    let ok = "a".repeat(63);
    assert_eq!(codec.encode(&ok).unwrap(), ok);
    assert_eq!(codec.encode(&"a".repeat(64)), Err(Error::LabelTooLong));
    assert_eq!(codec.validate_label(&"a".repeat(64), true), Err(Error::LabelTooLong));
    // The limit applies to the encoded form.
    let wide = "\u{FC}".repeat(64);
    assert_eq!(codec.encode(&wide), Err(Error::LabelTooLong));
}

#[test]
fn domain_length_boundary() {
    let codec = Config::default().codec();
    let label = "a".repeat(63);
    let fits = format!("{0}.{0}.{0}.{1}", label, "a".repeat(61));
    assert_eq!(fits.len(), MAX_DOMAIN_LENGTH);
    assert_eq!(codec.encode(&fits).unwrap(), fits);
    let with_root = format!("{}.", fits);
    assert_eq!(codec.encode(&with_root).unwrap(), with_root);

    let too_long = format!("{0}.{0}.{0}.{0}", label);
    assert_eq!(codec.encode(&too_long), Err(Error::DomainNameTooLong));
}

#[test]
fn empty_labels() {
    let codec = Config::default().codec();
    assert_eq!(codec.encode("a..b"), Err(Error::EmptyLabel));
    assert_eq!(codec.encode("a.b.").unwrap(), "a.b.");
    assert_eq!(codec.decode("a.b.").unwrap(), "a.b.");
    assert_eq!(codec.encode(""), Err(Error::EmptyLabel));
    assert_eq!(codec.decode(".a"), Err(Error::EmptyLabel));
}

#[test]
fn hyphen_rules() {
    let codec = Config::default().codec();
    assert_eq!(codec.validate_label("a-", true), Err(Error::TrailingHyphen));
    assert_eq!(codec.validate_label("-a", true), Err(Error::LeadingHyphen));
    assert_eq!(codec.validate_label("ab--c", true), Err(Error::HyphenAtPosition3And4));
    assert_eq!(codec.encode("ab--c").unwrap(), "ab--c");
    assert_eq!(codec.encode("a-"), Err(Error::TrailingHyphen));
    assert_eq!(codec.encode("-a"), Err(Error::LeadingHyphen));
}

#[test]
fn transitional_and_std3_modes() {
    assert_eq!(Config::default().encode("fa\u{DF}.de").unwrap(), "fass.de");
    assert_eq!(
        Config::default().non_transitional(true).encode("fa\u{DF}.de").unwrap(),
        "xn--fa-hia.de"
    );
    assert_eq!(Config::default().encode("a!b").unwrap(), "a!b");
    assert_eq!(
        Config::default().use_std3_ascii_rules(true).encode("a!b"),
        Err(Error::Disallowed)
    );
}

struct Custom;

impl Tables for Custom {
    fn is_disallowed(&self, c: char) -> bool {
        c == 'q'
    }
    fn is_disallowed_std3(&self, _: char) -> bool {
        false
    }
    fn is_ignored(&self, c: char) -> bool {
        c == '*'
    }
    fn base_mapping(&self, c: char) -> Option<Cow<'static, str>> {
        if c == '@' {
            Some(Cow::Borrowed("at"))
        } else {
            None
        }
    }
    fn deviation_mapping(&self, _: char) -> Option<Cow<'static, str>> {
        None
    }
    fn not_std3_mapping(&self, _: char) -> Option<Cow<'static, str>> {
        None
    }
}

#[test]
fn injected_tables() {
    let codec = Codec::new(Config::default(), Custom);
    assert_eq!(codec.encode("me@home*.org").unwrap(), "meathome.org");
    assert_eq!(codec.encode("quiz"), Err(Error::Disallowed));
    // No case folding without a mapping for it.
    assert_eq!(codec.encode("Org").unwrap(), "Org");

    let borrowed = Codec::new(Config::default(), &Uts46Tables);
    assert_eq!(borrowed.encode("Org").unwrap(), "org");
}

#[test]
fn shared_between_threads() {
    let codec = Arc::new(Config::default().codec());
    let handles: Vec<_> = (0..4)
        .map(|_| {
            let codec = Arc::clone(&codec);
            thread::spawn(move || codec.encode("b\u{FC}cher.example"))
        })
        .collect();
    for handle in handles {
        assert_eq!(handle.join().unwrap().unwrap(), "xn--bcher-kva.example");
    }
}

#[test]
fn decode_of_encode_matches_decode() {
    const ALPHABET: &[char] = &['a', 'B', 'x', 'n', '-', '.', '\u{FC}', '\u{DF}', '\u{4F8B}', '1'];
    bolero::check!().for_each(|data: &[u8]| {
        if let Ok(indices) = <Vec<u8> as arbitrary::Arbitrary>::arbitrary(
            &mut arbitrary::Unstructured::new(data),
        ) {
            let domain: String = indices
                .iter()
                .map(|&i| ALPHABET[usize::from(i) % ALPHABET.len()])
                .collect();
            let codec = Config::default().codec();
            if let Ok(ascii) = codec.encode(&domain) {
                assert!(ascii.is_ascii());
                assert_eq!(codec.decode(&ascii), codec.decode(&domain));
            }
        }
    });
}

#[cfg(feature = "serde")]
#[test]
fn config_from_json() {
    let config: Config = serde_json::from_str(r#"{"use_std3_ascii_rules": true}"#).unwrap();
    assert_eq!(config, Config::default().use_std3_ascii_rules(true));
}
