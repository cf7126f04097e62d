use std::{
    borrow::Cow,
    fmt::{Debug, Display, Formatter, Result as FmtResult},
    str,
};

use serde::{
    de::{Deserializer, Error as DeError, Visitor},
    ser::{Error as SerError, Serializer},
    Deserialize, Serialize,
};

/// Text of unknown character encoding.
///
/// Mails are often assembled from legacy sources (windows-1252 databases, Shift_JIS
/// exports, ...), so a `Text` keeps the raw bytes until the [`Normalizer`] has converted
/// them to UTF-8. Serializing a `Text` which is not valid UTF-8 fails.
///
/// [`Normalizer`]: crate::Normalizer
#[derive(Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Text(Vec<u8>);

impl Text {
    /// Creates an empty text
    pub const fn new() -> Self {
        Text(Vec::new())
    }

    /// The raw bytes
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Returns the text as `&str` if it is valid UTF-8
    pub fn as_str(&self) -> Option<&str> {
        str::from_utf8(&self.0).ok()
    }

    /// Lossy UTF-8 rendering, used in messages and logs
    pub fn to_string_lossy(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.0)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }

    pub(crate) fn prepend(&mut self, prefix: &[u8]) {
        self.0.splice(0..0, prefix.iter().copied());
    }
}

impl Debug for Text {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self.as_str() {
            Some(s) => Debug::fmt(s, f),
            None => write!(f, "Text({:?})", self.0),
        }
    }
}

impl Display for Text {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(&self.to_string_lossy())
    }
}

impl AsRef<[u8]> for Text {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl From<&str> for Text {
    fn from(value: &str) -> Self {
        Text(value.as_bytes().to_vec())
    }
}

impl From<String> for Text {
    fn from(value: String) -> Self {
        Text(value.into_bytes())
    }
}

impl From<&String> for Text {
    fn from(value: &String) -> Self {
        Text(value.as_bytes().to_vec())
    }
}

impl From<&[u8]> for Text {
    fn from(value: &[u8]) -> Self {
        Text(value.to_vec())
    }
}

impl<const N: usize> From<&[u8; N]> for Text {
    fn from(value: &[u8; N]) -> Self {
        Text(value.to_vec())
    }
}

impl From<Vec<u8>> for Text {
    fn from(value: Vec<u8>) -> Self {
        Text(value)
    }
}

impl PartialEq<str> for Text {
    fn eq(&self, other: &str) -> bool {
        self.0 == other.as_bytes()
    }
}

impl PartialEq<&str> for Text {
    fn eq(&self, other: &&str) -> bool {
        self.0 == other.as_bytes()
    }
}

impl Serialize for Text {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self.as_str() {
            Some(s) => serializer.serialize_str(s),
            None => Err(S::Error::custom(format!(
                "`{}` is not valid UTF-8",
                self.to_string_lossy()
            ))),
        }
    }
}

impl<'de> Deserialize<'de> for Text {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct TextVisitor;

        impl<'de> Visitor<'de> for TextVisitor {
            type Value = Text;

            fn expecting(&self, formatter: &mut Formatter<'_>) -> FmtResult {
                formatter.write_str("a string")
            }

            fn visit_str<E>(self, s: &str) -> Result<Self::Value, E>
            where
                E: DeError,
            {
                Ok(Text::from(s))
            }

            fn visit_string<E>(self, s: String) -> Result<Self::Value, E>
            where
                E: DeError,
            {
                Ok(Text::from(s))
            }
        }

        deserializer.deserialize_str(TextVisitor)
    }
}
