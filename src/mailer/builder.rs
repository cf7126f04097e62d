use std::{
    fmt::{self, Debug, Formatter},
    sync::Arc,
};

use serde::{Deserialize, Serialize};
use url::Url;

use super::{Mailer, MAILS_PATH};
use crate::{
    address::DEFAULT_DELIMITERS, error, Address, AddressSanitizer, Charset, Error, Hook,
    HookChain, Normalizer, Notifier, Sender,
};

/// Mailer options, as found in a configuration file
///
/// ```
/// use mailroom::Options;
///
/// let options: Options = serde_json::from_str(
///     r#"{
///         "base_url": "http://127.0.0.1:8081",
///         "catch_all": "dev@dev.com",
///         "audit": true,
///         "delimiters": [",", ";"]
///     }"#,
/// )
/// .unwrap();
///
/// assert!(options.audit);
/// assert_eq!(options.delimiters, Some(vec![',', ';']));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Options {
    /// Base URL of the mail service
    pub base_url: Option<Url>,
    /// Address receiving every mail instead of the real recipients
    pub catch_all: Option<Address>,
    /// Report every sent mail to the audit notifier
    pub audit: bool,
    /// Charsets tried, in order, when converting text to UTF-8
    pub encodings: Option<Vec<Charset>>,
    /// Clean recipient fields, splitting entries on these delimiters
    pub delimiters: Option<Vec<char>>,
}

/// Contains the configuration of a [`Mailer`]
pub struct MailerBuilder<S> {
    sender: S,
    endpoint: Url,
    catch_all: Option<Address>,
    audit: bool,
    normalizer: Normalizer,
    sanitizer: Option<AddressSanitizer>,
    hooks: HookChain,
    logger: Option<Arc<dyn Notifier>>,
    audit_notifier: Option<Arc<dyn Notifier>>,
}

impl<S: Sender> MailerBuilder<S> {
    /// Creates a new builder posting mails to the service at `base_url`
    pub fn new(base_url: &str, sender: S) -> Result<Self, Error> {
        let base_url = Url::parse(base_url)
            .map_err(|e| error::configuration(format!("invalid base URL `{base_url}`: {e}")))?;
        Self::with_url(base_url, sender)
    }

    /// Creates a builder from deserialized options
    pub fn from_options(options: Options, sender: S) -> Result<Self, Error> {
        let base_url = options
            .base_url
            .ok_or_else(|| error::configuration("a base URL has to be set"))?;

        let mut builder = Self::with_url(base_url, sender)?.audit(options.audit);
        if let Some(catch_all) = options.catch_all {
            builder = builder.catch_all(catch_all);
        }
        if let Some(encodings) = options.encodings {
            builder = builder.encodings(encodings);
        }
        if let Some(delimiters) = options.delimiters {
            builder = builder.address_delimiters(delimiters);
        }
        Ok(builder)
    }

    fn with_url(base_url: Url, sender: S) -> Result<Self, Error> {
        Ok(MailerBuilder {
            sender,
            endpoint: endpoint(base_url)?,
            catch_all: None,
            audit: false,
            normalizer: Normalizer::default(),
            sanitizer: None,
            hooks: HookChain::new(),
            logger: None,
            audit_notifier: None,
        })
    }

    /// Reroute every mail to `address`
    pub fn catch_all(mut self, address: Address) -> Self {
        self.catch_all = Some(address);
        self
    }

    /// Report every sent mail to the audit notifier (or the logger, if there is none)
    pub fn audit(mut self, audit: bool) -> Self {
        self.audit = audit;
        self
    }

    /// Replace the charsets tried, in order, when converting text to UTF-8
    pub fn encodings(mut self, candidates: Vec<Charset>) -> Self {
        self.normalizer = Normalizer::new(candidates);
        self
    }

    /// Clean recipient fields before validation, with the default delimiters
    pub fn sanitize_addresses(self) -> Self {
        self.address_delimiters(DEFAULT_DELIMITERS.to_vec())
    }

    /// Clean recipient fields before validation, splitting entries on `delimiters`
    pub fn address_delimiters(mut self, delimiters: Vec<char>) -> Self {
        self.sanitizer = Some(AddressSanitizer::new(delimiters));
        self
    }

    /// Register a hook, run after the ones already registered
    pub fn hook<H: Hook + 'static>(mut self, hook: H) -> Self {
        self.hooks.push(hook);
        self
    }

    /// Set the notifier receiving errors
    pub fn logger(mut self, logger: Arc<dyn Notifier>) -> Self {
        self.logger = Some(logger);
        self
    }

    /// Set the notifier receiving audit events
    pub fn audit_notifier(mut self, audit_notifier: Arc<dyn Notifier>) -> Self {
        self.audit_notifier = Some(audit_notifier);
        self
    }

    /// Build the mailer
    ///
    /// The address sanitizer, when enabled, runs before every other hook.
    pub fn build(self) -> Mailer<S> {
        let mut hooks = self.hooks;
        if let Some(sanitizer) = self.sanitizer {
            hooks.prepend(sanitizer);
        }

        Mailer {
            sender: self.sender,
            endpoint: self.endpoint,
            catch_all: self.catch_all,
            audit: self.audit,
            normalizer: self.normalizer,
            hooks,
            logger: self.logger,
            audit_notifier: self.audit_notifier,
        }
    }
}

/// Appends the mail path to `base`, keeping the path of `base`
fn endpoint(mut base: Url) -> Result<Url, Error> {
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }

    base.join(MAILS_PATH)
        .map_err(|e| error::configuration(format!("invalid base URL `{base}`: {e}")))
}

impl<S: Debug> Debug for MailerBuilder<S> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("MailerBuilder")
            .field("sender", &self.sender)
            .field("endpoint", &self.endpoint.as_str())
            .field("catch_all", &self.catch_all)
            .field("audit", &self.audit)
            .field("normalizer", &self.normalizer)
            .field("sanitizer", &self.sanitizer)
            .field("hooks", &self.hooks)
            .field("logger", &self.logger.is_some())
            .field("audit_notifier", &self.audit_notifier.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::{sender::StubSender, Mail, MemoryNotifier, Text};

    #[test]
    fn endpoint_keeps_base_path() {
        for (base, expected) in [
            ("http://127.0.0.1:8081", "http://127.0.0.1:8081/api/mails"),
            ("https://mail.example.com/v1", "https://mail.example.com/v1/api/mails"),
            ("https://mail.example.com/v1/", "https://mail.example.com/v1/api/mails"),
        ] {
            let mailer = MailerBuilder::new(base, StubSender::new_ok()).unwrap().build();
            assert_eq!(mailer.endpoint().as_str(), expected);
        }
    }

    #[test]
    fn invalid_base_url() {
        let err = MailerBuilder::new("not a url", StubSender::new_ok()).unwrap_err();
        assert!(err.is_configuration());

        let err = MailerBuilder::new("mailto:dev@dev.com", StubSender::new_ok()).unwrap_err();
        assert!(err.is_configuration());
    }

    #[test]
    fn options_configure_the_mailer() {
        let options: Options = serde_json::from_str(
            r#"{
                "base_url": "http://127.0.0.1:8081",
                "catch_all": "dev@dev.com",
                "audit": true,
                "encodings": ["ascii", "utf-8", "iso-8859-15"]
            }"#,
        )
        .unwrap();

        let mailer = MailerBuilder::from_options(options, StubSender::new_ok())
            .unwrap()
            .build();

        assert!(mailer.is_audit());
        assert_eq!(mailer.catch_all().map(ToString::to_string), Some("dev@dev.com".to_owned()));
        assert_eq!(
            mailer.normalizer().candidates(),
            &[
                Charset::Ascii,
                Charset::Encoding(encoding_rs::UTF_8),
                Charset::Encoding(encoding_rs::ISO_8859_15),
            ]
        );
        assert!(mailer.hooks().is_empty());
    }

    #[test]
    fn options_require_a_base_url() {
        let err = MailerBuilder::from_options(Options::default(), StubSender::new_ok()).unwrap_err();
        assert!(err.is_configuration());
    }

    #[test]
    fn options_reject_invalid_catch_all() {
        let err = serde_json::from_str::<Options>(r#"{ "catch_all": "nobody" }"#).unwrap_err();
        assert!(err.to_string().contains("Missing domain or user"));
    }

    #[test]
    fn sanitizer_runs_first() {
        let notifier = Arc::new(MemoryNotifier::new());
        let mailer = MailerBuilder::new("http://127.0.0.1:8081", StubSender::new_ok())
            .unwrap()
            .hook(|mail: &mut Mail| {
                let count = mail.recipients().len().to_string();
                mail.set_subject(count);
            })
            .sanitize_addresses()
            .audit_notifier(notifier.clone())
            .build();
        assert_eq!(mailer.hooks().len(), 2);

        let mut mail = Mail::builder().to("a@domain.tld, b@domain.tld").build();
        mailer.hooks().run(&mut mail, mailer.audit_notifier());

        assert_eq!(mail.subject(), &Text::from("2"));
        assert!(notifier.notifications().is_empty());
    }
}
