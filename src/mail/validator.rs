use std::fmt::{Display, Formatter, Result as FmtResult};

use super::Mail;

/// A broken structural rule
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Violation {
    field: &'static str,
    message: &'static str,
}

impl Violation {
    const fn new(field: &'static str, message: &'static str) -> Self {
        Violation { field, message }
    }

    pub fn field(&self) -> &'static str {
        self.field
    }

    pub fn message(&self) -> &'static str {
        self.message
    }

    /// Renders violations as `field: message` separated by `; `
    pub fn join(violations: &[Violation]) -> String {
        violations
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("; ")
    }
}

impl Display for Violation {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Checks the structural rules of a mail.
///
/// Rules are checked in a fixed order (subject, body, sender, recipients) and every
/// broken one is reported.
pub fn validate(mail: &Mail) -> Result<(), Vec<Violation>> {
    let mut violations = Vec::new();

    if mail.subject.is_empty() {
        violations.push(Violation::new("subject", "Subject is empty"));
    }

    let has_body = [&mail.text_body, &mail.html_body]
        .into_iter()
        .any(|body| body.as_ref().is_some_and(|body| !body.is_empty()));
    if !has_body {
        violations.push(Violation::new("body", "Both text and html bodies are empty"));
    }

    if mail.sender.is_empty() {
        violations.push(Violation::new("sender", "Sender is null"));
    }

    if mail.recipients.is_empty() {
        violations.push(Violation::new("recipients", "Recipients is empty"));
    }

    if violations.is_empty() {
        Ok(())
    } else {
        Err(violations)
    }
}
