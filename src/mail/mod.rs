//! The mail handed to the pipeline
//!
//! A [`Mail`] is plain data: free-text subject and bodies, address maps and opaque
//! attachments. Nothing is checked when it is built; the [`Mailer`](crate::Mailer)
//! rewrites and validates it during transmission.
//!
//! ```rust
//! use mailroom::Mail;
//!
//! let mail = Mail::builder()
//!     .subject("Quarterly report")
//!     .text_body("See attached")
//!     .from_labeled("reports@domain.tld", "Reporting")
//!     .to("dest1@domain.com, dest2@domain.com")
//!     .build();
//!
//! assert_eq!(mail.recipients().len(), 1);
//! ```

use std::collections::BTreeMap;

use serde::Serialize;

pub use self::{
    attachment::Attachment,
    validator::{validate, Violation},
};
use crate::Text;

mod attachment;
mod validator;

/// Address → label map.
///
/// Addresses are the keys, so a second insert of the same address replaces the label.
/// An address which is its own label has no explicit label.
pub type AddressMap = BTreeMap<Text, Text>;

/// Opaque key → value mapping carried along for correlation
pub type Context = BTreeMap<String, String>;

/// A mail, before or after its preparation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Mail {
    pub(crate) subject: Text,
    pub(crate) text_body: Option<Text>,
    pub(crate) html_body: Option<Text>,
    pub(crate) sender: AddressMap,
    pub(crate) recipients: AddressMap,
    pub(crate) cc: AddressMap,
    pub(crate) bcc: AddressMap,
    pub(crate) reply_to: AddressMap,
    pub(crate) disposition_notification_to: AddressMap,
    pub(crate) attachments: Vec<Attachment>,
    pub(crate) context: Context,
}

macro_rules! address_field {
    ($field:ident, $field_mut:ident, $set:ident, $add:ident, $add_labeled:ident, $clear:ident, $what:literal) => {
        #[doc = concat!("The ", $what, " of this mail")]
        pub fn $field(&self) -> &AddressMap {
            &self.$field
        }

        #[doc = concat!("Mutable access to the ", $what)]
        pub fn $field_mut(&mut self) -> &mut AddressMap {
            &mut self.$field
        }

        #[doc = concat!("Replaces the ", $what)]
        pub fn $set(&mut self, addresses: AddressMap) -> &mut Self {
            self.$field = addresses;
            self
        }

        #[doc = concat!("Adds an unlabeled entry to the ", $what)]
        pub fn $add<A: Into<Text>>(&mut self, address: A) -> &mut Self {
            let address = address.into();
            self.$field.insert(address.clone(), address);
            self
        }

        #[doc = concat!("Adds a labeled entry to the ", $what)]
        pub fn $add_labeled<A: Into<Text>, L: Into<Text>>(
            &mut self,
            address: A,
            label: L,
        ) -> &mut Self {
            self.$field.insert(address.into(), label.into());
            self
        }

        #[doc = concat!("Removes every entry of the ", $what)]
        pub fn $clear(&mut self) -> &mut Self {
            self.$field.clear();
            self
        }
    };
}

impl Mail {
    /// Creates an empty mail
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new mail builder
    pub fn builder() -> MailBuilder {
        MailBuilder::new()
    }

    pub fn subject(&self) -> &Text {
        &self.subject
    }

    pub fn set_subject<T: Into<Text>>(&mut self, subject: T) -> &mut Self {
        self.subject = subject.into();
        self
    }

    pub fn text_body(&self) -> Option<&Text> {
        self.text_body.as_ref()
    }

    pub fn set_text_body<T: Into<Text>>(&mut self, body: T) -> &mut Self {
        self.text_body = Some(body.into());
        self
    }

    pub fn html_body(&self) -> Option<&Text> {
        self.html_body.as_ref()
    }

    pub fn set_html_body<T: Into<Text>>(&mut self, body: T) -> &mut Self {
        self.html_body = Some(body.into());
        self
    }

    /// The effective sender: the first entry of the sender map
    pub fn effective_sender(&self) -> Option<(&Text, &Text)> {
        self.sender.iter().next()
    }

    address_field!(
        sender,
        sender_mut,
        set_sender,
        add_sender,
        add_sender_labeled,
        clear_sender,
        "sender"
    );
    address_field!(
        recipients,
        recipients_mut,
        set_recipients,
        add_recipient,
        add_recipient_labeled,
        clear_recipients,
        "recipients"
    );
    address_field!(cc, cc_mut, set_cc, add_cc, add_cc_labeled, clear_cc, "cc recipients");
    address_field!(
        bcc,
        bcc_mut,
        set_bcc,
        add_bcc,
        add_bcc_labeled,
        clear_bcc,
        "bcc recipients"
    );
    address_field!(
        reply_to,
        reply_to_mut,
        set_reply_to,
        add_reply_to,
        add_reply_to_labeled,
        clear_reply_to,
        "reply-to addresses"
    );
    address_field!(
        disposition_notification_to,
        disposition_notification_to_mut,
        set_disposition_notification_to,
        add_disposition_notification_to,
        add_disposition_notification_to_labeled,
        clear_disposition_notification_to,
        "read receipt addresses"
    );

    pub fn attachments(&self) -> &[Attachment] {
        &self.attachments
    }

    pub fn add_attachment(&mut self, attachment: Attachment) -> &mut Self {
        self.attachments.push(attachment);
        self
    }

    pub fn context(&self) -> &Context {
        &self.context
    }

    pub fn context_mut(&mut self) -> &mut Context {
        &mut self.context
    }
}

/// A builder for mails
#[derive(Debug, Clone, Default)]
pub struct MailBuilder {
    mail: Mail,
}

impl MailBuilder {
    /// Creates a new default mail builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `Subject`
    pub fn subject<T: Into<Text>>(mut self, subject: T) -> Self {
        self.mail.set_subject(subject);
        self
    }

    /// Set the plain text body
    pub fn text_body<T: Into<Text>>(mut self, body: T) -> Self {
        self.mail.set_text_body(body);
        self
    }

    /// Set the html body
    pub fn html_body<T: Into<Text>>(mut self, body: T) -> Self {
        self.mail.set_html_body(body);
        self
    }

    /// Set the sender
    pub fn from<A: Into<Text>>(mut self, address: A) -> Self {
        self.mail.clear_sender().add_sender(address);
        self
    }

    /// Set the sender with a display label
    pub fn from_labeled<A: Into<Text>, L: Into<Text>>(mut self, address: A, label: L) -> Self {
        self.mail.clear_sender().add_sender_labeled(address, label);
        self
    }

    /// Add a recipient
    pub fn to<A: Into<Text>>(mut self, address: A) -> Self {
        self.mail.add_recipient(address);
        self
    }

    /// Add a recipient with a display label
    pub fn to_labeled<A: Into<Text>, L: Into<Text>>(mut self, address: A, label: L) -> Self {
        self.mail.add_recipient_labeled(address, label);
        self
    }

    /// Add a `Cc` recipient
    pub fn cc<A: Into<Text>>(mut self, address: A) -> Self {
        self.mail.add_cc(address);
        self
    }

    /// Add a `Cc` recipient with a display label
    pub fn cc_labeled<A: Into<Text>, L: Into<Text>>(mut self, address: A, label: L) -> Self {
        self.mail.add_cc_labeled(address, label);
        self
    }

    /// Add a `Bcc` recipient
    pub fn bcc<A: Into<Text>>(mut self, address: A) -> Self {
        self.mail.add_bcc(address);
        self
    }

    /// Add a `Bcc` recipient with a display label
    pub fn bcc_labeled<A: Into<Text>, L: Into<Text>>(mut self, address: A, label: L) -> Self {
        self.mail.add_bcc_labeled(address, label);
        self
    }

    /// Add a `Reply-To` address
    pub fn reply_to<A: Into<Text>>(mut self, address: A) -> Self {
        self.mail.add_reply_to(address);
        self
    }

    /// Ask for a read receipt at `address`
    pub fn disposition_notification_to<A: Into<Text>>(mut self, address: A) -> Self {
        self.mail.add_disposition_notification_to(address);
        self
    }

    pub fn attachment(mut self, attachment: Attachment) -> Self {
        self.mail.add_attachment(attachment);
        self
    }

    /// Add a correlation entry to the context
    pub fn context<K: Into<String>, V: Into<String>>(mut self, key: K, value: V) -> Self {
        self.mail.context.insert(key.into(), value.into());
        self
    }

    pub fn build(self) -> Mail {
        self.mail
    }
}
