//! Notifications emitted while a mail goes through the pipeline
//!
//! The pipeline never stores notifications: each event builds a fresh [`Notification`]
//! and hands it to a [`Notifier`]. Two notifiers may be configured on a
//! [`Mailer`](crate::Mailer), a logger (errors) and an audit notifier (traceability).

use std::{
    fmt::{self, Display, Formatter},
    sync::{Mutex, PoisonError},
};

use serde::{Deserialize, Serialize};

use crate::{mail::Context, NAMESPACE};

/// Severity of a notification, ordered from least to most severe
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Info,
    Warning,
    Error,
}

impl Display for Level {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Level::Info => "info",
            Level::Warning => "warning",
            Level::Error => "error",
        })
    }
}

/// What a notification is about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Security,
    Performance,
    Business,
    /// Traceability of mails, the only category used by the pipeline
    Audit,
    Technical,
}

/// A single event, addressed to a [`Notifier`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    namespace: String,
    category: Category,
    level: Level,
    message: String,
    context: Context,
}

impl Notification {
    /// Creates a notification in the given category
    pub fn new<M: Into<String>>(category: Category, level: Level, message: M) -> Self {
        Notification {
            namespace: NAMESPACE.to_owned(),
            category,
            level,
            message: message.into(),
            context: Context::new(),
        }
    }

    /// Creates an audit notification carrying a copy of `context`
    pub fn audit<M: Into<String>>(level: Level, message: M, context: &Context) -> Self {
        Notification::new(Category::Audit, level, message).with_context(context.clone())
    }

    pub fn with_context(mut self, context: Context) -> Self {
        self.context = context;
        self
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn category(&self) -> Category {
        self.category
    }

    pub fn level(&self) -> Level {
        self.level
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn context(&self) -> &Context {
        &self.context
    }
}

/// Receives notifications.
///
/// Delivery is fire-and-forget from the pipeline's point of view: a notifier has no way
/// to report a failure back, and its own failures are its own business.
pub trait Notifier: Send + Sync {
    /// Delivers a notification
    fn notify(&self, notification: Notification);
}

/// Notifier keeping every notification in memory
///
/// Useful in tests, or to inspect what happened during a transmission.
#[derive(Debug, Default)]
pub struct MemoryNotifier {
    notifications: Mutex<Vec<Notification>>,
}

impl MemoryNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of the received notifications, oldest first
    pub fn notifications(&self) -> Vec<Notification> {
        self.notifications
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Returns the messages of the received notifications, oldest first
    pub fn messages(&self) -> Vec<String> {
        self.notifications
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|n| n.message.clone())
            .collect()
    }

    /// Removes and returns the received notifications
    pub fn take(&self) -> Vec<Notification> {
        std::mem::take(
            &mut *self
                .notifications
                .lock()
                .unwrap_or_else(PoisonError::into_inner),
        )
    }
}

impl Notifier for MemoryNotifier {
    fn notify(&self, notification: Notification) {
        self.notifications
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(notification);
    }
}

/// Notifier turning notifications into `tracing` events
///
/// The event level follows the notification level; the namespace, category and context
/// are recorded as fields.
#[cfg(feature = "tracing")]
#[cfg_attr(docsrs, doc(cfg(feature = "tracing")))]
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

#[cfg(feature = "tracing")]
impl Notifier for TracingNotifier {
    fn notify(&self, notification: Notification) {
        let context = format!("{:?}", notification.context);
        match notification.level {
            Level::Info => tracing::info!(
                namespace = %notification.namespace,
                category = ?notification.category,
                context = %context,
                "{}",
                notification.message
            ),
            Level::Warning => tracing::warn!(
                namespace = %notification.namespace,
                category = ?notification.category,
                context = %context,
                "{}",
                notification.message
            ),
            Level::Error => tracing::error!(
                namespace = %notification.namespace,
                category = ?notification.category,
                context = %context,
                "{}",
                notification.message
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn levels_are_ordered_by_severity() {
        assert!(Level::Info < Level::Warning);
        assert!(Level::Warning < Level::Error);
        assert_eq!(
            [Level::Error, Level::Info, Level::Warning].iter().max(),
            Some(&Level::Error)
        );
    }

    #[test]
    fn audit_copies_context() {
        let mut context = Context::new();
        context.insert("order".to_owned(), "42".to_owned());

        let notification = Notification::audit(Level::Warning, "careful", &context);
        assert_eq!(notification.namespace(), "/mailer/client");
        assert_eq!(notification.category(), Category::Audit);
        assert_eq!(notification.level(), Level::Warning);
        assert_eq!(notification.context(), &context);
    }

    #[test]
    fn memory_notifier_records_in_order() {
        let notifier = MemoryNotifier::new();
        notifier.notify(Notification::new(Category::Technical, Level::Info, "one"));
        notifier.notify(Notification::new(Category::Technical, Level::Error, "two"));

        assert_eq!(notifier.messages(), vec!["one", "two"]);
        assert_eq!(notifier.take().len(), 2);
        assert!(notifier.notifications().is_empty());
    }

    #[cfg(feature = "tracing")]
    #[test]
    fn tracing_notifier_does_not_panic_without_subscriber() {
        TracingNotifier.notify(Notification::new(Category::Audit, Level::Error, "boom"));
    }
}
