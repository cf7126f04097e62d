use std::sync::Arc;

use mailroom::{sender::StubSender, Charset, Mail, MailerBuilder, MemoryNotifier, Options, Outcome};
use pretty_assertions::assert_eq;

#[test]
fn options_from_json() {
    let options: Options = serde_json::from_str(
        r#"{
            "base_url": "https://mail.example.com/v2",
            "catch_all": "dev@dev.com",
            "encodings": ["ascii", "utf-8", "windows-1252"],
            "delimiters": [",", ";"]
        }"#,
    )
    .unwrap();

    assert_eq!(options.base_url.as_ref().map(|url| url.as_str()), Some("https://mail.example.com/v2"));
    assert!(!options.audit);
    assert_eq!(
        options.encodings,
        Some(vec![
            Charset::Ascii,
            Charset::Encoding(encoding_rs::UTF_8),
            Charset::Encoding(encoding_rs::WINDOWS_1252),
        ])
    );
}

#[test]
fn options_reject_unknown_charset() {
    let err = serde_json::from_str::<Options>(r#"{ "encodings": ["klingon"] }"#).unwrap_err();
    assert!(err.to_string().contains("klingon"));
}

#[test]
fn mailer_from_options() {
    let options: Options = serde_json::from_str(
        r#"{
            "base_url": "https://mail.example.com/v2",
            "catch_all": "dev@dev.com",
            "audit": true,
            "delimiters": [";"]
        }"#,
    )
    .unwrap();

    let sender = StubSender::new_ok();
    let logger = Arc::new(MemoryNotifier::new());
    let mailer = MailerBuilder::from_options(options, &sender)
        .unwrap()
        .logger(logger.clone())
        .build();

    assert_eq!(mailer.endpoint().as_str(), "https://mail.example.com/v2/api/mails");

    let mut mail = Mail::builder()
        .subject("Report")
        .text_body("Numbers")
        .from("reports@domain.tld")
        .to("a@domain.tld;b@domain.tld")
        .build();
    assert_eq!(mailer.transmit(&mut mail).unwrap(), Outcome::Sent);

    assert_eq!(mail.subject(), &"[Caught] Report");
    assert_eq!(logger.messages(), vec!["Successfully sent mail"]);
    assert!(mail
        .text_body()
        .and_then(|body| body.as_str())
        .unwrap()
        .contains("Original recipients: \ta@domain.tld, b@domain.tld\n"));
}
