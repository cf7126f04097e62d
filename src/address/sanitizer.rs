//! Cleaning of address fields typed by humans
//!
//! People paste anything in a recipient field: several addresses separated by commas or
//! semicolons, quoted names, stray words. The [`AddressSanitizer`] splits such entries
//! into individual addresses and drops everything which is not a valid address,
//! warning the audit notifier about what was dropped.

use crate::{
    hook::Hook,
    mail::{AddressMap, Context},
    notification::{Level, Notification},
    Address, Mail, Notifier, Text,
};

/// Delimiters splitting the addresses of a single entry
pub const DEFAULT_DELIMITERS: [char; 5] = [',', ';', '-', ' ', '\t'];

const EMPTY_FIELD_WARNING: &str = "Got empty address email after address email cleaning";

/// Splits free-text address entries into validated addresses
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddressSanitizer {
    delimiters: Vec<char>,
}

impl Default for AddressSanitizer {
    fn default() -> Self {
        AddressSanitizer::new(DEFAULT_DELIMITERS.to_vec())
    }
}

impl AddressSanitizer {
    /// Creates a sanitizer splitting on `delimiters`
    ///
    /// With no delimiter, entries are not split at all.
    pub fn new(delimiters: Vec<char>) -> Self {
        AddressSanitizer { delimiters }
    }

    pub fn delimiters(&self) -> &[char] {
        &self.delimiters
    }

    pub fn set_delimiters(&mut self, delimiters: Vec<char>) -> &mut Self {
        self.delimiters = delimiters;
        self
    }

    /// Cleans one address field.
    ///
    /// Each entry is split into tokens; valid tokens are kept, labeled with the entry's
    /// label when it has one, and invalid tokens are reported with one warning per entry.
    /// When nothing valid is left of a non-empty field, a last warning says so.
    ///
    /// ```
    /// use mailroom::{AddressSanitizer, AddressMap, Context, Text};
    ///
    /// let mut field = AddressMap::new();
    /// field.insert(
    ///     Text::from("dest1@domain.com; dest2@domain.com"),
    ///     Text::from("Team"),
    /// );
    ///
    /// let cleaned = AddressSanitizer::default().sanitize(&field, &Context::new(), None);
    /// assert_eq!(cleaned.len(), 2);
    /// assert_eq!(cleaned[&Text::from("dest2@domain.com")], "Team");
    /// ```
    pub fn sanitize(
        &self,
        addresses: &AddressMap,
        context: &Context,
        notifier: Option<&dyn Notifier>,
    ) -> AddressMap {
        let mut sanitized = AddressMap::new();

        for (entry, label) in addresses {
            let has_label = entry != label;
            let mut invalid = Vec::new();

            for token in self.split(entry) {
                if token.trim().is_empty() {
                    continue;
                }

                if !Address::is_valid(&token) {
                    invalid.push(format!("`{token}`"));
                    continue;
                }

                let token = Text::from(token);
                let label = if has_label {
                    label.clone()
                } else {
                    token.clone()
                };
                sanitized.insert(token, label);
            }

            if !invalid.is_empty() {
                #[cfg(feature = "tracing")]
                tracing::debug!(entry = %entry, invalid = invalid.len(), "dropped invalid addresses");

                let message = if invalid.len() > 1 {
                    format!("{} are not valid email address", invalid.join(", "))
                } else {
                    format!("{} is not a valid email address", invalid.join(", "))
                };
                notify(notifier, message, context);
            }
        }

        if !addresses.is_empty() && sanitized.is_empty() {
            notify(notifier, EMPTY_FIELD_WARNING, context);
        }

        sanitized
    }

    /// Cleans the recipients, then the bcc, then the cc of `mail`
    pub fn sanitize_mail(&self, mail: &mut Mail, notifier: Option<&dyn Notifier>) {
        mail.recipients = self.sanitize(&mail.recipients, &mail.context, notifier);
        mail.bcc = self.sanitize(&mail.bcc, &mail.context, notifier);
        mail.cc = self.sanitize(&mail.cc, &mail.context, notifier);
    }

    /// Strips quotes, folds every delimiter into the first one and splits on it.
    ///
    /// Entries are free text of unknown encoding; tokens are validated as UTF-8 text, so
    /// undecodable bytes can never end up in a valid token.
    fn split(&self, entry: &Text) -> Vec<String> {
        let unquoted: String = entry.to_string_lossy().chars().filter(|&c| c != '"').collect();

        match self.delimiters.first() {
            Some(&first) => unquoted
                .chars()
                .map(|c| if self.delimiters.contains(&c) { first } else { c })
                .collect::<String>()
                .split(first)
                .map(ToOwned::to_owned)
                .collect(),
            None => vec![unquoted],
        }
    }
}

impl Hook for AddressSanitizer {
    fn before_validation(&self, mail: &mut Mail, audit: Option<&dyn Notifier>) {
        self.sanitize_mail(mail, audit);
    }
}

fn notify<M: Into<String>>(notifier: Option<&dyn Notifier>, message: M, context: &Context) {
    if let Some(notifier) = notifier {
        notifier.notify(Notification::audit(Level::Warning, message, context));
    }
}
