//! The file sender writes each request to the given directory. The name of the file will
//! be `<uuid>.json`.
//! It can be useful for testing purposes, or if you want to keep track of sent mails.
//!
//! ```rust,no_run
//! use std::env::temp_dir;
//!
//! use mailroom::{sender::FileSender, Mail, Mailer};
//!
//! # use std::error::Error;
//! # fn main() -> Result<(), Box<dyn Error>> {
//! let mailer = Mailer::builder("http://127.0.0.1:8081", FileSender::new(temp_dir()))?.build();
//!
//! let mut mail = Mail::builder()
//!     .subject("Happy new year")
//!     .text_body("Be happy!")
//!     .from("nobody@domain.tld")
//!     .to("hei@domain.tld")
//!     .build();
//!
//! mailer.transmit(&mut mail)?;
//! # Ok(())
//! # }
//! ```

use std::{
    error::Error as StdError,
    fmt::{self, Display, Formatter},
    fs, io,
    path::{Path, PathBuf},
    sync::{Mutex, PoisonError},
};

use uuid::Uuid;

use super::{Request, Sender};

/// Writes every request, as JSON, to a file
#[derive(Debug)]
pub struct FileSender {
    path: PathBuf,
    last_id: Mutex<Option<Uuid>>,
}

impl FileSender {
    /// Creates a new sender writing to the given directory
    pub fn new<P: AsRef<Path>>(path: P) -> FileSender {
        FileSender {
            path: PathBuf::from(path.as_ref()),
            last_id: Mutex::new(None),
        }
    }

    fn path(&self, id: &Uuid) -> PathBuf {
        self.path.join(format!("{id}.json"))
    }

    /// Path of the file written by the last successful send
    pub fn last_file(&self) -> Option<PathBuf> {
        self.last_id
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .map(|id| self.path(id))
    }
}

impl Sender for FileSender {
    type Error = Error;

    fn send(&self, request: &Request) -> Result<bool, Error> {
        let id = Uuid::new_v4();
        let file = self.path(&id);

        let serialized = serde_json::to_string(request).map_err(Error::Json)?;
        fs::write(&file, serialized).map_err(Error::Io)?;

        #[cfg(feature = "tracing")]
        tracing::debug!(file = %file.display(), "request written");

        *self.last_id.lock().unwrap_or_else(PoisonError::into_inner) = Some(id);
        Ok(true)
    }
}

/// An enum of all error kinds.
#[derive(Debug)]
pub enum Error {
    /// IO error
    Io(io::Error),
    /// JSON serialization error
    Json(serde_json::Error),
}

impl Display for Error {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> fmt::Result {
        match *self {
            Error::Io(ref err) => write!(fmt, "file sender: {err}"),
            Error::Json(ref err) => write!(fmt, "file sender: {err}"),
        }
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match *self {
            Error::Io(ref err) => Some(err),
            Error::Json(ref err) => Some(err),
        }
    }
}
