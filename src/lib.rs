//! Mailroom prepares outbound mails and hands them to a remote mail delivery service.
//!
//! A [`Mail`] goes through a fixed pipeline before it leaves the process:
//!
//! * the pre-validation [hook chain](hook) may rewrite it (the [`AddressSanitizer`]
//!   is installed there by the sanitizing configuration),
//! * it is [validated](mail::validate),
//! * all its recipients may be replaced by a [catch-all](catchall) address,
//! * every text field is [normalized](encoding) to UTF-8,
//! * it is serialized to JSON and given to a [`Sender`].
//!
//! Each step can emit [`Notification`]s to a logger and an audit [`Notifier`].
//!
//! ## Example
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use mailroom::{sender::StubSender, Mail, Mailer, MemoryNotifier, Outcome};
//!
//! # use std::error::Error;
//! # fn main() -> Result<(), Box<dyn Error>> {
//! let logger = Arc::new(MemoryNotifier::new());
//! let mailer = Mailer::builder("http://127.0.0.1:8081", StubSender::new_ok())?
//!     .logger(logger.clone())
//!     .audit(true)
//!     .build();
//!
//! let mut mail = Mail::builder()
//!     .subject("Happy new year")
//!     .text_body("Be happy!")
//!     .from("nobody@domain.tld")
//!     .to("hei@domain.tld")
//!     .build();
//!
//! assert_eq!(mailer.transmit(&mut mail)?, Outcome::Sent);
//! assert_eq!(logger.messages(), vec!["Successfully sent mail".to_owned()]);
//! # Ok(())
//! # }
//! ```
//!
//! ## Features
//!
//! * **tracing** (default): log pipeline stages with [tracing](https://docs.rs/tracing)
//!   and enable [`TracingNotifier`]
//! * **file-sender**: enable [`sender::FileSender`]

#![doc(html_root_url = "https://docs.rs/crate/mailroom/0.3.0")]
#![forbid(unsafe_code)]
#![deny(
    missing_copy_implementations,
    trivial_casts,
    trivial_numeric_casts,
    unstable_features,
    unused_import_braces,
    rust_2018_idioms,
    clippy::string_add,
    clippy::string_add_assign,
    clippy::verbose_file_reads,
    clippy::unnecessary_self_imports,
    clippy::string_to_string,
    clippy::mem_forget,
    clippy::cast_lossless,
    clippy::inefficient_to_string,
    clippy::inline_always,
    clippy::linkedlist,
    clippy::macro_use_imports,
    clippy::manual_assert,
    clippy::unnecessary_join,
    clippy::wildcard_imports,
    clippy::zero_sized_map_values
)]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod address;
pub mod catchall;
pub mod encoding;
mod error;
pub mod hook;
pub mod mail;
pub mod mailer;
pub mod notification;
pub mod sender;
mod text;

pub use crate::{
    address::{Address, AddressError, AddressSanitizer},
    encoding::{Charset, Normalizer},
    error::Error,
    hook::{Hook, HookChain},
    mail::{AddressMap, Attachment, Context, Mail, MailBuilder},
    mailer::{Mailer, MailerBuilder, Options, Outcome},
    notification::{Category, Level, MemoryNotifier, Notification, Notifier},
    sender::{Method, Request, Sender},
    text::Text,
};
#[cfg(feature = "tracing")]
pub use crate::notification::TracingNotifier;

pub(crate) type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Namespace stamped on every notification emitted by this crate
pub const NAMESPACE: &str = "/mailer/client";
