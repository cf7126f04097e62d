//! Error type for the preparation and dispatch pipeline

use std::{error::Error as StdError, fmt};

use crate::{mail::Violation, BoxError};

// Inspired by https://github.com/seanmonstar/reqwest/blob/a8566383168c0ef06c21f38cbc9213af6ff6db31/src/error.rs

/// The Errors that may occur while preparing or transmitting a mail
pub struct Error {
    inner: Box<Inner>,
}

struct Inner {
    kind: Kind,
    source: Option<BoxError>,
}

impl Error {
    pub(crate) fn new<E>(kind: Kind, source: Option<E>) -> Error
    where
        E: Into<BoxError>,
    {
        Error {
            inner: Box::new(Inner {
                kind,
                source: source.map(Into::into),
            }),
        }
    }

    /// Returns true if the mail did not pass validation
    pub fn is_validation(&self) -> bool {
        matches!(self.inner.kind, Kind::Validation(_))
    }

    /// Returns true if the mailer is misconfigured
    pub fn is_configuration(&self) -> bool {
        matches!(self.inner.kind, Kind::Configuration)
    }

    /// Returns true if a text field could not be converted to UTF-8
    pub fn is_encoding(&self) -> bool {
        matches!(self.inner.kind, Kind::Encoding)
    }

    /// Returns true if the mail or its context could not be serialized
    pub fn is_serialization(&self) -> bool {
        matches!(self.inner.kind, Kind::Serialization)
    }

    /// Returns true if the error was raised by the sender
    pub fn is_transport(&self) -> bool {
        matches!(self.inner.kind, Kind::Transport)
    }

    /// Returns the violated rules, if the error comes from validation.
    pub fn violations(&self) -> Option<&[Violation]> {
        match self.inner.kind {
            Kind::Validation(ref violations) => Some(violations),
            _ => None,
        }
    }
}

#[derive(Debug)]
pub(crate) enum Kind {
    /// The mail breaks one or more structural rules
    Validation(Vec<Violation>),
    /// Audit mode without any notifier, unusable base URL
    Configuration,
    /// No candidate charset matches a text field
    Encoding,
    /// JSON encoding of the mail or its context failed
    Serialization,
    /// Error returned by the sender
    Transport,
}

impl fmt::Debug for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut builder = f.debug_struct("mailroom::Error");

        builder.field("kind", &self.inner.kind);

        if let Some(ref source) = self.inner.source {
            builder.field("source", source);
        }

        builder.finish()
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.inner.kind {
            Kind::Validation(ref violations) => {
                // The violation list is the whole message.
                return f.write_str(&Violation::join(violations));
            }
            Kind::Configuration => f.write_str("configuration error")?,
            Kind::Encoding => f.write_str("encoding error")?,
            Kind::Serialization => f.write_str("serialization error")?,
            Kind::Transport => f.write_str("transport error")?,
        };

        if let Some(ref e) = self.inner.source {
            write!(f, ": {e}")?;
        }

        Ok(())
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.inner.source.as_ref().map(|e| {
            let r: &(dyn std::error::Error + 'static) = &**e;
            r
        })
    }
}

pub(crate) fn validation(violations: Vec<Violation>) -> Error {
    Error::new::<BoxError>(Kind::Validation(violations), None)
}

pub(crate) fn configuration<E: Into<BoxError>>(e: E) -> Error {
    Error::new(Kind::Configuration, Some(e))
}

pub(crate) fn encoding<E: Into<BoxError>>(e: E) -> Error {
    Error::new(Kind::Encoding, Some(e))
}

pub(crate) fn serialization<E: Into<BoxError>>(e: E) -> Error {
    Error::new(Kind::Serialization, Some(e))
}

pub(crate) fn transport<E: Into<BoxError>>(e: E) -> Error {
    Error::new(Kind::Transport, Some(e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_source() {
        let err = configuration("a logger has to be set for logging mails");
        assert!(err.is_configuration());
        assert_eq!(
            err.to_string(),
            "configuration error: a logger has to be set for logging mails"
        );
    }

    #[test]
    fn transport_keeps_source() {
        let err = transport(std::io::Error::new(
            std::io::ErrorKind::TimedOut,
            "timed out",
        ));
        assert!(err.is_transport());
        let source = err.source().unwrap();
        let io_err = source.downcast_ref::<std::io::Error>().unwrap();
        assert_eq!(io_err.kind(), std::io::ErrorKind::TimedOut);
    }
}
