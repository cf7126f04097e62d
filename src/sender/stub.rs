//! The stub sender answers a fixed outcome and keeps the requests it received. It can be
//! useful for testing purposes.
//!
//! ```rust
//! use mailroom::sender::{Method, Request, Sender, StubSender};
//!
//! # use std::error::Error;
//! # fn main() -> Result<(), Box<dyn Error>> {
//! let sender = StubSender::new_ok();
//! let request = Request::new(Method::Post, "http://localhost/api/mails".parse()?);
//!
//! assert_eq!(sender.send(&request)?, true);
//! assert_eq!(sender.requests(), vec![request]);
//! # Ok(())
//! # }
//! ```

use std::{
    error::Error as StdError,
    fmt,
    sync::{Arc, Mutex, PoisonError},
};

use super::{Request, Sender};

/// An error returned by the stub sender
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Error {
    message: String,
}

impl Error {
    pub fn new<M: Into<String>>(message: M) -> Self {
        Error {
            message: message.into(),
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl StdError for Error {}

/// This sender records the requests and returns the given response
#[derive(Debug, Clone)]
pub struct StubSender {
    response: Result<bool, Error>,
    request_log: Arc<Mutex<Vec<Request>>>,
}

impl StubSender {
    /// Creates a new sender that always returns the given response
    pub fn new(response: Result<bool, Error>) -> StubSender {
        StubSender {
            response,
            request_log: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Creates a new sender that always accepts the mail
    pub fn new_ok() -> StubSender {
        StubSender::new(Ok(true))
    }

    /// Creates a new sender that always refuses the mail without raising an error
    pub fn new_refused() -> StubSender {
        StubSender::new(Ok(false))
    }

    /// Creates a new sender that always fails with the given message
    pub fn new_error<M: Into<String>>(message: M) -> StubSender {
        StubSender::new(Err(Error::new(message)))
    }

    /// Return all the requests sent so far, oldest first
    pub fn requests(&self) -> Vec<Request> {
        self.request_log
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl Sender for StubSender {
    type Error = Error;

    fn send(&self, request: &Request) -> Result<bool, Error> {
        #[cfg(feature = "tracing")]
        tracing::debug!(method = %request.method(), url = %request.url(), "stub sender received a request");

        self.request_log
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(request.clone());
        self.response.clone()
    }
}
