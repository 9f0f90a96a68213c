//! HTML entity decoding for OpenTDB text fields
//!
//! The API encodes questions and answers with HTML entities by default
//! (`&quot;`, `&#039;`, `&eacute;`, ...). [`decode_html_entities`] replaces the
//! known set with literal characters and leaves anything else untouched.

use regex::{Captures, Regex};
use std::borrow::Cow;
use std::sync::LazyLock;

#[allow(clippy::expect_used)]
static ENTITY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"&(#[0-9]{1,7}|[A-Za-z]{2,8});").expect("valid entity pattern"));

/// Decode the supported HTML entities in `input`
///
/// Decoding is repeated until the text stops changing, so double-encoded
/// input such as `&amp;quot;` ends up as `"` and `decode(decode(x)) == decode(x)`
/// holds for every input. Unknown entities and invalid code points pass through
/// unchanged.
pub fn decode_html_entities(input: &str) -> String {
    let mut current = input.to_string();
    // Every pass that changes the text shortens it, so this terminates.
    loop {
        let next = decode_once(&current).into_owned();
        if next == current {
            return current;
        }
        current = next;
    }
}

fn decode_once(input: &str) -> Cow<'_, str> {
    if !input.contains('&') {
        return Cow::Borrowed(input);
    }
    ENTITY.replace_all(input, |caps: &Captures<'_>| {
        let body = &caps[1];
        let decoded = match body.strip_prefix('#') {
            Some(digits) => numeric_entity(digits),
            None => named_entity(body),
        };
        match decoded {
            Some(c) => c.to_string(),
            None => caps[0].to_string(),
        }
    })
}

fn numeric_entity(digits: &str) -> Option<char> {
    digits.parse::<u32>().ok().and_then(char::from_u32)
}

fn named_entity(name: &str) -> Option<char> {
    let c = match name {
        "quot" => '"',
        "apos" => '\'',
        "amp" => '&',
        "lt" => '<',
        "gt" => '>',
        "nbsp" => '\u{a0}',
        "hellip" => '…',
        "copy" => '©',
        "reg" => '®',
        "trade" => '™',
        "deg" => '°',
        "lsquo" => '‘',
        "rsquo" => '’',
        "ldquo" => '“',
        "rdquo" => '”',
        "ndash" => '–',
        "mdash" => '—',
        "shy" => '\u{ad}',
        "aacute" => 'á',
        "Aacute" => 'Á',
        "agrave" => 'à',
        "Agrave" => 'À',
        "acirc" => 'â',
        "Acirc" => 'Â',
        "atilde" => 'ã',
        "Atilde" => 'Ã',
        "auml" => 'ä',
        "Auml" => 'Ä',
        "aring" => 'å',
        "Aring" => 'Å',
        "aelig" => 'æ',
        "AElig" => 'Æ',
        "ccedil" => 'ç',
        "Ccedil" => 'Ç',
        "eacute" => 'é',
        "Eacute" => 'É',
        "egrave" => 'è',
        "Egrave" => 'È',
        "ecirc" => 'ê',
        "Ecirc" => 'Ê',
        "euml" => 'ë',
        "Euml" => 'Ë',
        "iacute" => 'í',
        "Iacute" => 'Í',
        "igrave" => 'ì',
        "Igrave" => 'Ì',
        "icirc" => 'î',
        "Icirc" => 'Î',
        "iuml" => 'ï',
        "Iuml" => 'Ï',
        "ntilde" => 'ñ',
        "Ntilde" => 'Ñ',
        "oacute" => 'ó',
        "Oacute" => 'Ó',
        "ograve" => 'ò',
        "Ograve" => 'Ò',
        "ocirc" => 'ô',
        "Ocirc" => 'Ô',
        "otilde" => 'õ',
        "Otilde" => 'Õ',
        "ouml" => 'ö',
        "Ouml" => 'Ö',
        "oslash" => 'ø',
        "Oslash" => 'Ø',
        "uacute" => 'ú',
        "Uacute" => 'Ú',
        "ugrave" => 'ù',
        "Ugrave" => 'Ù',
        "ucirc" => 'û',
        "Ucirc" => 'Û',
        "uuml" => 'ü',
        "Uuml" => 'Ü',
        "yacute" => 'ý',
        "Yacute" => 'Ý',
        "yuml" => 'ÿ',
        "szlig" => 'ß',
        _ => return None,
    };
    Some(c)
}
