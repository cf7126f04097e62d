//! Conversion of mail text to UTF-8
//!
//! Text fields may come from anywhere, so their character set is unknown. The
//! [`Normalizer`] tries an ordered list of candidate charsets and keeps the first one
//! that decodes the bytes without any malformed sequence.
//!
//! The order matters: several single-byte charsets accept the same bytes (every byte is
//! valid ISO-8859-15 and ISO-8859-2), so the first candidate that fits wins, not the
//! most likely one. windows-1252 is the exception: it only matches text using at least
//! one of its printable `0x80..=0x9F` characters, and none of its undefined bytes.

use std::{
    borrow::Cow,
    fmt::{self, Debug, Display, Formatter},
    mem,
    str::{self, FromStr},
};

use encoding_rs::Encoding;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

use crate::{error, mail::AddressMap, Error, Mail, Text};

/// A character set the normalizer can detect
#[derive(Clone, Copy, PartialEq, Eq)]
pub enum Charset {
    /// Strict 7-bit ASCII
    Ascii,
    /// Any WHATWG encoding
    Encoding(&'static Encoding),
}

impl Charset {
    pub fn name(&self) -> &'static str {
        match *self {
            Charset::Ascii => "ASCII",
            Charset::Encoding(encoding) => encoding.name(),
        }
    }

    /// Returns true if text in this charset is already UTF-8
    pub fn is_canonical(&self) -> bool {
        match *self {
            Charset::Ascii => true,
            Charset::Encoding(encoding) => encoding == encoding_rs::UTF_8,
        }
    }

    /// Decodes `bytes`, failing on the first malformed sequence
    pub fn decode<'a>(&self, bytes: &'a [u8]) -> Option<Cow<'a, str>> {
        match *self {
            Charset::Ascii => {
                if bytes.is_ascii() {
                    str::from_utf8(bytes).ok().map(Cow::Borrowed)
                } else {
                    None
                }
            }
            Charset::Encoding(encoding) if encoding == encoding_rs::WINDOWS_1252 => {
                if is_windows_1252(bytes) {
                    encoding.decode_without_bom_handling_and_without_replacement(bytes)
                } else {
                    None
                }
            }
            Charset::Encoding(encoding) => {
                encoding.decode_without_bom_handling_and_without_replacement(bytes)
            }
        }
    }

    /// Candidates tried by default, highest priority first
    pub fn defaults() -> Vec<Charset> {
        let mut candidates = vec![Charset::Ascii];
        candidates.extend(
            [
                encoding_rs::UTF_8,
                encoding_rs::WINDOWS_1252,
                encoding_rs::ISO_8859_15,
                encoding_rs::UTF_16BE,
                encoding_rs::UTF_16LE,
                encoding_rs::EUC_JP,
                encoding_rs::SHIFT_JIS,
                encoding_rs::ISO_2022_JP,
                encoding_rs::ISO_8859_2,
                encoding_rs::ISO_8859_3,
                encoding_rs::ISO_8859_4,
                encoding_rs::ISO_8859_5,
                encoding_rs::ISO_8859_6,
                encoding_rs::ISO_8859_7,
                encoding_rs::ISO_8859_8,
                encoding_rs::ISO_8859_10,
                encoding_rs::ISO_8859_13,
                encoding_rs::ISO_8859_14,
                encoding_rs::GBK,
                encoding_rs::GB18030,
                encoding_rs::BIG5,
                encoding_rs::EUC_KR,
                encoding_rs::WINDOWS_1251,
                encoding_rs::IBM866,
                encoding_rs::KOI8_R,
            ]
            .into_iter()
            .map(Charset::Encoding),
        );
        candidates
    }
}

/// Bytes left undefined by windows-1252
const WINDOWS_1252_UNDEFINED: [u8; 5] = [0x81, 0x8D, 0x8F, 0x90, 0x9D];

/// Returns true if `bytes` use a character specific to windows-1252 and no undefined byte
fn is_windows_1252(bytes: &[u8]) -> bool {
    let mut specific = false;
    for byte in bytes {
        if WINDOWS_1252_UNDEFINED.contains(byte) {
            return false;
        }
        specific |= (0x80..=0x9F).contains(byte);
    }
    specific
}

impl Debug for Charset {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "Charset({})", self.name())
    }
}

impl Display for Charset {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Charset {
    type Err = Error;

    /// Parses a WHATWG label, or `ascii` / `us-ascii` for strict ASCII
    fn from_str(label: &str) -> Result<Self, Self::Err> {
        let label = label.trim();
        if label.eq_ignore_ascii_case("ascii") || label.eq_ignore_ascii_case("us-ascii") {
            return Ok(Charset::Ascii);
        }

        Encoding::for_label_no_replacement(label.as_bytes())
            .map(Charset::Encoding)
            .ok_or_else(|| error::configuration(format!("unknown charset `{label}`")))
    }
}

impl Serialize for Charset {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.name())
    }
}

impl<'de> Deserialize<'de> for Charset {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let label = Cow::<'de, str>::deserialize(deserializer)?;
        label.parse().map_err(de::Error::custom)
    }
}

/// Converts text to UTF-8 using an ordered list of candidate charsets
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Normalizer {
    candidates: Vec<Charset>,
}

impl Default for Normalizer {
    fn default() -> Self {
        Normalizer::new(Charset::defaults())
    }
}

impl Normalizer {
    /// Creates a normalizer trying `candidates` in order
    pub fn new(candidates: Vec<Charset>) -> Self {
        Normalizer { candidates }
    }

    pub fn candidates(&self) -> &[Charset] {
        &self.candidates
    }

    /// Returns true if `bytes` are valid UTF-8
    pub fn is_canonical(bytes: &[u8]) -> bool {
        str::from_utf8(bytes).is_ok()
    }

    /// Finds the first candidate decoding `bytes`
    pub fn detect(&self, bytes: &[u8]) -> Option<Charset> {
        self.decode(bytes).map(|(charset, _)| charset)
    }

    fn decode<'a>(&self, bytes: &'a [u8]) -> Option<(Charset, Cow<'a, str>)> {
        self.candidates
            .iter()
            .find_map(|charset| charset.decode(bytes).map(|decoded| (*charset, decoded)))
    }

    /// Converts `text` to UTF-8.
    ///
    /// Text detected as UTF-8 (or ASCII) is returned untouched.
    ///
    /// ```
    /// use mailroom::{Normalizer, Text};
    ///
    /// # use std::error::Error;
    /// # fn main() -> Result<(), Box<dyn Error>> {
    /// let normalizer = Normalizer::default();
    /// let text = normalizer.to_canonical(Text::from(&b"caf\xe9"[..]))?;
    /// assert_eq!(text.as_str(), Some("café"));
    /// # Ok(())
    /// # }
    /// ```
    pub fn to_canonical(&self, text: Text) -> Result<Text, Error> {
        let converted = match self.decode(text.as_bytes()) {
            Some((charset, _)) if charset.is_canonical() => None,
            Some((_charset, decoded)) => {
                #[cfg(feature = "tracing")]
                tracing::debug!(charset = _charset.name(), "converting text to UTF-8");
                Some(decoded.into_owned())
            }
            None => {
                return Err(error::encoding(format!(
                    "Unable to detect encoding of `{}`",
                    text.to_string_lossy()
                )))
            }
        };

        Ok(converted.map_or(text, Text::from))
    }

    /// Converts every text field of `mail` which is not UTF-8 yet: subject, bodies, and
    /// both addresses and labels of the sender and recipient maps.
    pub fn normalize(&self, mail: &mut Mail) -> Result<(), Error> {
        self.normalize_text(&mut mail.subject)?;
        if let Some(body) = mail.text_body.as_mut() {
            self.normalize_text(body)?;
        }
        if let Some(body) = mail.html_body.as_mut() {
            self.normalize_text(body)?;
        }

        for map in [
            &mut mail.sender,
            &mut mail.recipients,
            &mut mail.cc,
            &mut mail.bcc,
        ] {
            self.normalize_map(map)?;
        }

        Ok(())
    }

    fn normalize_text(&self, text: &mut Text) -> Result<(), Error> {
        if !Normalizer::is_canonical(text.as_bytes()) {
            *text = self.to_canonical(mem::take(text))?;
        }
        Ok(())
    }

    fn normalize_map(&self, map: &mut AddressMap) -> Result<(), Error> {
        if map
            .iter()
            .all(|(k, v)| Normalizer::is_canonical(k.as_bytes()) && Normalizer::is_canonical(v.as_bytes()))
        {
            return Ok(());
        }

        let mut converted = AddressMap::new();
        for (mut address, mut label) in mem::take(map) {
            self.normalize_text(&mut address)?;
            self.normalize_text(&mut label)?;
            converted.insert(address, label);
        }
        *map = converted;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn text(bytes: &[u8]) -> Text {
        Text::from(bytes)
    }

    #[test]
    fn default_order_starts_with_ascii_and_utf8() {
        let defaults = Charset::defaults();
        assert_eq!(defaults[0], Charset::Ascii);
        assert_eq!(defaults[1], Charset::Encoding(encoding_rs::UTF_8));
        assert_eq!(defaults[2], Charset::Encoding(encoding_rs::WINDOWS_1252));
    }

    #[test]
    fn utf8_is_left_untouched() {
        let normalizer = Normalizer::default();
        let original = Text::from("Grüße aus Köln");
        assert_eq!(normalizer.to_canonical(original.clone()).unwrap(), original);
        assert_eq!(
            normalizer.detect("Grüße".as_bytes()),
            Some(Charset::Encoding(encoding_rs::UTF_8))
        );
        assert_eq!(normalizer.detect(b"plain"), Some(Charset::Ascii));
    }

    #[test]
    fn latin_text_is_converted() {
        let normalizer = Normalizer::default();
        let converted = normalizer.to_canonical(text(b"d\xe9j\xe0 vu")).unwrap();
        assert_eq!(converted.as_str(), Some("déjà vu"));
    }

    #[test]
    fn legacy_fixtures_are_detected() {
        let normalizer = Normalizer::default();

        let latin9 = text(b"\xe9\xe8\xe0\xa4");
        assert_eq!(
            normalizer.detect(latin9.as_bytes()),
            Some(Charset::Encoding(encoding_rs::ISO_8859_15))
        );
        assert_eq!(normalizer.to_canonical(latin9).unwrap().as_str(), Some("éèà€"));

        let cp1252 = text(b"\x82\x83\x8c\x9a\x9c\x95");
        assert_eq!(
            normalizer.detect(cp1252.as_bytes()),
            Some(Charset::Encoding(encoding_rs::WINDOWS_1252))
        );
        assert_eq!(normalizer.to_canonical(cp1252).unwrap().as_str(), Some("‚ƒŒšœ•"));
    }

    #[test]
    fn windows_1252_rejects_undefined_bytes() {
        let cp1252 = Charset::Encoding(encoding_rs::WINDOWS_1252);
        assert_eq!(cp1252.decode(b"\x81"), None);
        assert_eq!(cp1252.decode(b"\x80\x9d"), None);
        assert_eq!(cp1252.decode(b"caf\xe9"), None);
        assert_eq!(cp1252.decode(b"\x80 caf\xe9").as_deref(), Some("€ café"));

        assert_ne!(Normalizer::default().detect(b"\x81"), Some(cp1252));
    }

    #[test]
    fn first_matching_candidate_wins() {
        let currency = b"\xa4";

        let latin9_first = Normalizer::new(vec![
            Charset::Encoding(encoding_rs::ISO_8859_15),
            Charset::Encoding(encoding_rs::ISO_8859_2),
        ]);
        assert_eq!(
            latin9_first.to_canonical(text(currency)).unwrap().as_str(),
            Some("€")
        );

        let latin2_first = Normalizer::new(vec![
            Charset::Encoding(encoding_rs::ISO_8859_2),
            Charset::Encoding(encoding_rs::ISO_8859_15),
        ]);
        assert_eq!(
            latin2_first.to_canonical(text(currency)).unwrap().as_str(),
            Some("¤")
        );
    }

    #[test]
    fn shift_jis_is_converted() {
        let normalizer = Normalizer::new(vec![
            Charset::Encoding(encoding_rs::UTF_8),
            Charset::Encoding(encoding_rs::SHIFT_JIS),
        ]);
        let converted = normalizer.to_canonical(text(b"\x93\xfa\x96\x7b")).unwrap();
        assert_eq!(converted.as_str(), Some("日本"));
    }

    #[test]
    fn conversion_is_idempotent() {
        let normalizer = Normalizer::default();
        for input in [
            &b"caf\xe9"[..],
            &b"\x80 price"[..],
            &b"na\xefve"[..],
            "déjà".as_bytes(),
        ] {
            let once = normalizer.to_canonical(text(input)).unwrap();
            let twice = normalizer.to_canonical(once.clone()).unwrap();
            assert_eq!(once, twice);
        }
    }

    #[test]
    fn unknown_encoding_fails() {
        let normalizer = Normalizer::new(vec![Charset::Ascii, Charset::Encoding(encoding_rs::UTF_8)]);
        let err = normalizer.to_canonical(text(b"caf\xe9")).unwrap_err();
        assert!(err.is_encoding());
        assert_eq!(
            err.to_string(),
            "encoding error: Unable to detect encoding of `caf\u{fffd}`"
        );
    }

    #[test]
    fn charset_labels() {
        assert_eq!("us-ascii".parse::<Charset>().unwrap(), Charset::Ascii);
        assert_eq!(
            "latin1".parse::<Charset>().unwrap(),
            Charset::Encoding(encoding_rs::WINDOWS_1252)
        );
        assert_eq!(
            "Shift_JIS".parse::<Charset>().unwrap(),
            Charset::Encoding(encoding_rs::SHIFT_JIS)
        );
        assert!("klingon".parse::<Charset>().unwrap_err().is_configuration());

        let parsed: Vec<Charset> = serde_json::from_str(r#"["ascii", "utf-8"]"#).unwrap();
        assert_eq!(
            parsed,
            vec![Charset::Ascii, Charset::Encoding(encoding_rs::UTF_8)]
        );
    }

    #[test]
    fn normalize_mail() {
        let mut mail = Mail::builder()
            .subject(&b"R\xe9sum\xe9"[..])
            .text_body(&b"Voil\xe0"[..])
            .html_body("<p>déjà</p>")
            .from_labeled("from@domain.tld", &b"Fran\xe7ois"[..])
            .to_labeled("to@domain.tld", &b"Andr\xe9"[..])
            .build();

        Normalizer::default().normalize(&mut mail).unwrap();

        assert_eq!(mail.subject().as_str(), Some("Résumé"));
        assert_eq!(mail.text_body().unwrap().as_str(), Some("Voilà"));
        assert_eq!(mail.html_body().unwrap().as_str(), Some("<p>déjà</p>"));
        assert_eq!(mail.sender()[&Text::from("from@domain.tld")], "François");
        assert_eq!(mail.recipients()[&Text::from("to@domain.tld")], "André");
    }
}
