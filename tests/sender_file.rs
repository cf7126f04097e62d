#[cfg(test)]
#[cfg(feature = "file-sender")]
mod test {
    use std::{env::temp_dir, fs};

    use mailroom::{sender::FileSender, Mail, Mailer, Outcome};
    use pretty_assertions::assert_eq;
    use serde_json::Value;

    #[test]
    fn file_sender() {
        let sender = FileSender::new(temp_dir());
        let mailer = Mailer::builder("http://127.0.0.1:8081", &sender)
            .unwrap()
            .build();

        let mut mail = Mail::builder()
            .subject("Hello ß☺ example")
            .text_body("Be happy!")
            .from("user@localhost.localdomain")
            .to("root@localhost.localdomain")
            .build();
        assert_eq!(mailer.transmit(&mut mail).unwrap(), Outcome::Sent);

        let file = sender.last_file().unwrap();
        let written: Value = serde_json::from_str(&fs::read_to_string(&file).unwrap()).unwrap();

        assert_eq!(written["method"], "POST");
        assert_eq!(written["url"], "http://127.0.0.1:8081/api/mails");
        assert_eq!(written["params"][0][0], "mail");

        let mail: Value = serde_json::from_str(written["params"][0][1].as_str().unwrap()).unwrap();
        assert_eq!(mail["subject"], "Hello ß☺ example");

        fs::remove_file(file).unwrap();
    }

    #[test]
    fn file_sender_missing_directory() {
        let sender = FileSender::new(temp_dir().join("mailroom-does-not-exist"));
        let mailer = Mailer::builder("http://127.0.0.1:8081", &sender)
            .unwrap()
            .build();

        let mut mail = Mail::builder()
            .subject("Hello")
            .text_body("Be happy!")
            .from("user@localhost.localdomain")
            .to("root@localhost.localdomain")
            .build();

        let err = mailer.transmit(&mut mail).unwrap_err();
        assert!(err.is_transport());
        assert!(sender.last_file().is_none());
    }
}
