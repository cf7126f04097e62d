//! Rerouting of every recipient to a single catch-all address
//!
//! Outside production, mails must not reach real people. When a catch-all address is
//! configured, the [`Mailer`](crate::Mailer) replaces recipients, cc and bcc with that
//! address, and prepends the original recipient list to each body so the intercepted mail
//! still tells who it was meant for.

use crate::{mail::AddressMap, Address, Mail, Text};

const BANNER: &str = "**************************************************";

/// Prefix added to the subject of rerouted mails
pub const SUBJECT_PREFIX: &str = "[Caught] ";

/// Rewrites `mail` so that `catch_all` is its only recipient.
///
/// ```
/// use mailroom::{catchall, Address, Mail, Text};
///
/// # use std::error::Error;
/// # fn main() -> Result<(), Box<dyn Error>> {
/// let mut mail = Mail::builder()
///     .subject("Invoice")
///     .text_body("Please pay")
///     .to("a@domain.tld")
///     .build();
///
/// catchall::reroute(&mut mail, &"dev@dev.com".parse::<Address>()?);
///
/// assert_eq!(mail.subject(), &"[Caught] Invoice");
/// assert!(mail.recipients().contains_key(&Text::from("dev@dev.com")));
/// # Ok(())
/// # }
/// ```
pub fn reroute(mail: &mut Mail, catch_all: &Address) {
    let info = info_block(mail);

    for body in [mail.text_body.as_mut(), mail.html_body.as_mut()]
        .into_iter()
        .flatten()
    {
        if !body.is_empty() {
            body.prepend(&info);
        }
    }

    mail.subject.prepend(SUBJECT_PREFIX.as_bytes());

    mail.clear_recipients().clear_cc().clear_bcc();
    mail.add_recipient(catch_all);

    #[cfg(feature = "tracing")]
    tracing::debug!(catch_all = %catch_all, "recipients rerouted to catch-all address");
}

fn info_block(mail: &Mail) -> Vec<u8> {
    let mut info = Vec::new();
    push_line(&mut info, BANNER.as_bytes());
    push_addresses(&mut info, "Original recipients: \t", &mail.recipients);
    if !mail.cc.is_empty() {
        push_addresses(&mut info, "Original cc: \t", &mail.cc);
    }
    if !mail.bcc.is_empty() {
        push_addresses(&mut info, "Original bcc: \t", &mail.bcc);
    }
    push_line(&mut info, BANNER.as_bytes());
    info
}

fn push_addresses(info: &mut Vec<u8>, title: &str, addresses: &AddressMap) {
    let mut line = title.as_bytes().to_vec();
    for (i, address) in addresses.keys().map(Text::as_bytes).enumerate() {
        if i > 0 {
            line.extend_from_slice(b", ");
        }
        line.extend_from_slice(address);
    }
    push_line(info, &line);
}

fn push_line(info: &mut Vec<u8>, line: &[u8]) {
    info.extend_from_slice(line);
    info.push(b'\n');
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn dev() -> Address {
        "dev@dev.com".parse().unwrap()
    }

    #[test]
    fn recipients_are_replaced() {
        let mut mail = Mail::builder()
            .subject("Subject")
            .text_body("Body")
            .to("a@domain.tld")
            .to("b@domain.tld")
            .cc("c@domain.tld")
            .bcc("d@domain.tld")
            .build();

        reroute(&mut mail, &dev());

        let recipients: Vec<_> = mail.recipients().iter().collect();
        assert_eq!(
            recipients,
            vec![(&Text::from("dev@dev.com"), &Text::from("dev@dev.com"))]
        );
        assert!(mail.cc().is_empty());
        assert!(mail.bcc().is_empty());
        assert_eq!(mail.subject(), &"[Caught] Subject");
    }

    #[test]
    fn original_recipients_are_prepended_to_bodies() {
        let mut mail = Mail::builder()
            .text_body("Body")
            .html_body("<p>Body</p>")
            .to("a@domain.tld")
            .to("b@domain.tld")
            .cc("c@domain.tld")
            .build();

        reroute(&mut mail, &dev());

        let expected = format!(
            "{BANNER}\nOriginal recipients: \ta@domain.tld, b@domain.tld\n\
             Original cc: \tc@domain.tld\n{BANNER}\n"
        );
        assert_eq!(
            mail.text_body().unwrap().as_str().unwrap(),
            format!("{expected}Body")
        );
        assert_eq!(
            mail.html_body().unwrap().as_str().unwrap(),
            format!("{expected}<p>Body</p>")
        );
    }

    #[test]
    fn empty_bodies_stay_empty() {
        let mut mail = Mail::builder()
            .text_body("")
            .html_body("<p>Body</p>")
            .to("a@domain.tld")
            .build();

        reroute(&mut mail, &dev());

        assert!(mail.text_body().unwrap().is_empty());
        assert!(mail.html_body().unwrap().as_str().unwrap().contains("Original recipients:"));
        assert!(!mail.html_body().unwrap().as_str().unwrap().contains("Original bcc:"));
    }
}
