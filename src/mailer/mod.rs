//! The transmission pipeline
//!
//! [`Mailer::transmit`] takes a mail through every preparation step, then hands it to
//! the configured [`Sender`]:
//!
//! 1. the hook chain runs, in registration order,
//! 2. the mail is validated; an invalid mail is an error, unless a logger is configured,
//!    in which case the logger is told and the mail is not sent,
//! 3. the audit notifier is resolved (audit mode falls back to the logger),
//! 4. recipients are rerouted to the catch-all address, if any,
//! 5. text fields are converted to UTF-8,
//! 6. the mail (and the transmission context) are serialized to JSON,
//! 7. the sender is called and the outcome notified.
//!
//! The mail is rewritten in place along the way, whatever the outcome.

use std::{
    fmt::{self, Debug, Formatter},
    sync::Arc,
};

use url::Url;

pub use self::builder::{MailerBuilder, Options};
use crate::{
    catchall, error,
    mail::{self, Context, Violation},
    notification::{Level, Notification},
    sender::{Method, Request, CONTEXT_PARAM, MAIL_PARAM},
    Address, Error, Hook, HookChain, Mail, Normalizer, Notifier, Sender,
};

mod builder;

/// Path of the mail endpoint, relative to the base URL
pub const MAILS_PATH: &str = "api/mails";

/// What happened to a transmitted mail
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The sender accepted the mail
    Sent,
    /// The sender refused the mail
    Failed,
    /// The mail was invalid and the logger was told, nothing was sent
    Rejected,
}

impl Outcome {
    pub fn is_sent(&self) -> bool {
        matches!(self, Outcome::Sent)
    }
}

/// Prepares mails and hands them to a [`Sender`]
pub struct Mailer<S> {
    sender: S,
    endpoint: Url,
    catch_all: Option<Address>,
    audit: bool,
    normalizer: Normalizer,
    hooks: HookChain,
    logger: Option<Arc<dyn Notifier>>,
    audit_notifier: Option<Arc<dyn Notifier>>,
}

impl<S: Sender> Mailer<S> {
    /// Creates a builder for a mailer posting to the service at `base_url`
    pub fn builder(base_url: &str, sender: S) -> Result<MailerBuilder<S>, Error> {
        MailerBuilder::new(base_url, sender)
    }

    /// Transmits `mail`, without transmission context
    pub fn transmit(&self, mail: &mut Mail) -> Result<Outcome, Error> {
        self.transmit_with_context(mail, &Context::new())
    }

    /// Transmits `mail`, with `context` sent alongside when not empty
    pub fn transmit_with_context(
        &self,
        mail: &mut Mail,
        context: &Context,
    ) -> Result<Outcome, Error> {
        self.hooks.run(mail, self.resolve_audit_notifier().ok().flatten());

        if let Err(violations) = mail::validate(mail) {
            return self.reject(mail, violations);
        }

        let audit = self.resolve_audit_notifier()?;

        if let Some(ref catch_all) = self.catch_all {
            catchall::reroute(mail, catch_all);
        }

        self.normalizer.normalize(mail)?;

        let request = self.request(mail, context)?;

        #[cfg(feature = "tracing")]
        tracing::debug!(url = %request.url(), "sending mail");

        match self.sender.send(&request) {
            Ok(true) => {
                if let Some(audit) = audit {
                    audit.notify(Notification::audit(
                        Level::Info,
                        "Successfully sent mail",
                        &mail.context,
                    ));
                }
                Ok(Outcome::Sent)
            }
            Ok(false) => {
                #[cfg(feature = "tracing")]
                tracing::warn!("sender refused the mail");

                if let Some(logger) = self.logger() {
                    logger.notify(Notification::audit(
                        Level::Error,
                        "Failed to sent mail",
                        &mail.context,
                    ));
                }
                Ok(Outcome::Failed)
            }
            Err(err) => {
                #[cfg(feature = "tracing")]
                tracing::error!(error = %err, "sender failed");

                if let Some(logger) = self.logger() {
                    logger.notify(Notification::audit(
                        Level::Error,
                        format!("Failed to sent mail ({err})"),
                        &mail.context,
                    ));
                }
                Err(error::transport(err))
            }
        }
    }

    fn reject(&self, mail: &Mail, violations: Vec<Violation>) -> Result<Outcome, Error> {
        let Some(logger) = self.logger() else {
            return Err(error::validation(violations));
        };

        #[cfg(feature = "tracing")]
        tracing::warn!(violations = violations.len(), "mail rejected");

        logger.notify(Notification::audit(
            Level::Error,
            format!("Mail instance is not valid:\n{}", Violation::join(&violations)),
            &mail.context,
        ));
        Ok(Outcome::Rejected)
    }

    fn request(&self, mail: &Mail, context: &Context) -> Result<Request, Error> {
        let mut request = Request::new(Method::Post, self.endpoint.clone());

        let encoded = serde_json::to_string(mail).map_err(error::serialization)?;
        request.add_param(MAIL_PARAM, encoded);

        if !context.is_empty() {
            let encoded = serde_json::to_string(context).map_err(error::serialization)?;
            request.add_param(CONTEXT_PARAM, encoded);
        }

        Ok(request)
    }
}

impl<S> Mailer<S> {
    /// The notifier receiving success notifications for this transmission.
    ///
    /// An explicit audit notifier always wins. In audit mode, the logger stands in for a
    /// missing audit notifier, and having neither is a configuration error.
    fn resolve_audit_notifier(&self) -> Result<Option<&dyn Notifier>, Error> {
        match (self.audit_notifier.as_deref(), self.logger.as_deref()) {
            (Some(audit), _) => Ok(Some(audit)),
            (None, Some(logger)) if self.audit => Ok(Some(logger)),
            (None, None) if self.audit => Err(error::configuration(
                "a logger has to be set for logging mails",
            )),
            _ => Ok(None),
        }
    }

    pub fn sender(&self) -> &S {
        &self.sender
    }

    /// URL the mails are posted to
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    pub fn catch_all(&self) -> Option<&Address> {
        self.catch_all.as_ref()
    }

    pub fn set_catch_all(&mut self, catch_all: Option<Address>) -> &mut Self {
        self.catch_all = catch_all;
        self
    }

    /// Returns true if every sent mail is reported to the audit notifier
    pub fn is_audit(&self) -> bool {
        self.audit
    }

    pub fn set_audit(&mut self, audit: bool) -> &mut Self {
        self.audit = audit;
        self
    }

    pub fn normalizer(&self) -> &Normalizer {
        &self.normalizer
    }

    pub fn set_normalizer(&mut self, normalizer: Normalizer) -> &mut Self {
        self.normalizer = normalizer;
        self
    }

    pub fn logger(&self) -> Option<&dyn Notifier> {
        self.logger.as_deref()
    }

    pub fn set_logger(&mut self, logger: Option<Arc<dyn Notifier>>) -> &mut Self {
        self.logger = logger;
        self
    }

    /// The explicitly configured audit notifier, see [`Mailer::set_audit`]
    pub fn audit_notifier(&self) -> Option<&dyn Notifier> {
        self.audit_notifier.as_deref()
    }

    pub fn set_audit_notifier(&mut self, audit_notifier: Option<Arc<dyn Notifier>>) -> &mut Self {
        self.audit_notifier = audit_notifier;
        self
    }

    pub fn hooks(&self) -> &HookChain {
        &self.hooks
    }

    /// Adds a hook run after the ones already registered
    pub fn add_hook<H: Hook + 'static>(&mut self, hook: H) -> &mut Self {
        self.hooks.push(hook);
        self
    }

    /// Adds a hook run before the ones already registered
    pub fn prepend_hook<H: Hook + 'static>(&mut self, hook: H) -> &mut Self {
        self.hooks.prepend(hook);
        self
    }

    pub fn clear_hooks(&mut self) -> &mut Self {
        self.hooks.clear();
        self
    }
}

impl<S: Debug> Debug for Mailer<S> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("Mailer")
            .field("sender", &self.sender)
            .field("endpoint", &self.endpoint.as_str())
            .field("catch_all", &self.catch_all)
            .field("audit", &self.audit)
            .field("normalizer", &self.normalizer)
            .field("hooks", &self.hooks)
            .field("logger", &self.logger.is_some())
            .field("audit_notifier", &self.audit_notifier.is_some())
            .finish()
    }
}
