use std::sync::Arc;

use mailroom::{sender::StubSender, Mail, Mailer, TracingNotifier};

fn main() {
    tracing_subscriber::fmt::init();

    let sender = StubSender::new_ok();
    let mailer = Mailer::builder("http://127.0.0.1:8081", &sender)
        .unwrap()
        .catch_all("dev@dev.com".parse().unwrap())
        .sanitize_addresses()
        .logger(Arc::new(TracingNotifier))
        .audit(true)
        .build();

    let mut mail = Mail::builder()
        .subject("Quarterly report")
        .text_body("Numbers are up.")
        .from_labeled("reports@domain.tld", "Reporting")
        .to("ceo@domain.tld; cfo@domain.tld, not an address")
        .cc("board@domain.tld")
        .build();

    match mailer.transmit(&mut mail) {
        Ok(outcome) => println!("Mail transmitted: {outcome:?}"),
        Err(e) => panic!("Could not transmit mail: {e}"),
    }

    for request in sender.requests() {
        println!("{} {}", request.method(), request.url());
        for (name, value) in request.params() {
            println!("{name}={value}");
        }
    }
}
