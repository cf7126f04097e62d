//! ### Sending prepared mails
//!
//! The [`Mailer`](crate::Mailer) never talks to the network itself: once a mail is
//! prepared, it is serialized into a [`Request`] and handed to a [`Sender`], which owns
//! the transport, its timeouts and its retry policy.
//!
//! The following senders are available:
//!
//! * The [`StubSender`] answers a fixed outcome and keeps every request it received. It
//!   is useful for tests and demos.
//! * The `FileSender` (feature `file-sender`) writes each request to a JSON file. It can
//!   be used for debugging or to keep a trace of every sent mail.

use std::fmt::{self, Display, Formatter};

use serde::Serialize;
use url::Url;

#[cfg(feature = "file-sender")]
#[cfg_attr(docsrs, doc(cfg(feature = "file-sender")))]
pub mod file;
pub mod stub;

#[cfg(feature = "file-sender")]
pub use self::file::FileSender;
pub use self::stub::StubSender;

/// Body parameter holding the serialized mail
pub const MAIL_PARAM: &str = "mail";
/// Body parameter holding the serialized transmission context
pub const CONTEXT_PARAM: &str = "context";

/// Delivers requests to the remote mail service
pub trait Sender {
    /// Error produced by the Sender
    type Error: std::error::Error + Send + Sync + 'static;

    /// Sends the request.
    ///
    /// `Ok(false)` is a soft failure (the service refused the mail), an `Err` is a
    /// transport failure.
    fn send(&self, request: &Request) -> Result<bool, Self::Error>;
}

impl<S: Sender + ?Sized> Sender for &S {
    type Error = S::Error;

    fn send(&self, request: &Request) -> Result<bool, Self::Error> {
        (**self).send(request)
    }
}

/// HTTP method of a request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    Post,
}

impl Display for Method {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Method::Post => "POST",
        })
    }
}

/// A request for the remote mail service
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Request {
    method: Method,
    url: Url,
    params: Vec<(String, String)>,
}

impl Request {
    pub fn new(method: Method, url: Url) -> Self {
        Request {
            method,
            url,
            params: Vec::new(),
        }
    }

    /// Adds a body parameter
    pub fn add_param<N: Into<String>, V: Into<String>>(&mut self, name: N, value: V) -> &mut Self {
        self.params.push((name.into(), value.into()));
        self
    }

    pub fn method(&self) -> Method {
        self.method
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Body parameters, in insertion order
    pub fn params(&self) -> &[(String, String)] {
        &self.params
    }

    /// Value of the first body parameter called `name`
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(param, _)| param == name)
            .map(|(_, value)| value.as_str())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn params_keep_order() {
        let mut request = Request::new(
            Method::Post,
            Url::parse("http://127.0.0.1:8081/api/mails").unwrap(),
        );
        request.add_param(MAIL_PARAM, "{}").add_param(CONTEXT_PARAM, "[]");

        assert_eq!(request.param(MAIL_PARAM), Some("{}"));
        assert_eq!(request.param("missing"), None);
        assert_eq!(
            serde_json::to_string(&request).unwrap(),
            r#"{"method":"POST","url":"http://127.0.0.1:8081/api/mails","params":[["mail","{}"],["context","[]"]]}"#
        );
    }
}
