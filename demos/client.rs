use std::{sync::Arc, thread};

use mailroom::{sender::StubSender, Mail, Mailer, MemoryNotifier};

fn main() {
    let logger = Arc::new(MemoryNotifier::new());
    let mailer = Arc::new(
        Mailer::builder("http://127.0.0.1:8081", StubSender::new_ok())
            .unwrap()
            .logger(logger.clone())
            .audit(true)
            .build(),
    );

    let mut threads = Vec::new();
    for i in 1..5 {
        let mailer = Arc::clone(&mailer);
        threads.push(thread::spawn(move || {
            let mut mail = Mail::builder()
                .subject(format!("Hello #{i}"))
                .text_body("Hello World!")
                .from("user@localhost.localdomain")
                .to("root@localhost.localdomain")
                .context("thread", i.to_string())
                .build();

            mailer.transmit(&mut mail)
        }));
    }

    for thread in threads {
        match thread.join() {
            Ok(Ok(outcome)) if outcome.is_sent() => println!("Mail sent"),
            Ok(Ok(outcome)) => println!("Mail not sent: {outcome:?}"),
            Ok(Err(e)) => println!("Could not transmit mail: {e}"),
            Err(_) => println!("Thread panicked"),
        }
    }

    for notification in logger.notifications() {
        println!("[{}] {} {:?}", notification.level(), notification.message(), notification.context());
    }
}
