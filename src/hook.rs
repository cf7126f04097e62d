//! Callbacks run on a mail before it is validated
//!
//! Any `Fn(&mut Mail)` closure is a [`Hook`]. Hooks which need to report what they did
//! (like the [`AddressSanitizer`](crate::AddressSanitizer)) implement the trait directly
//! and receive the audit notifier of the mailer.
//!
//! ```rust
//! use mailroom::{HookChain, Mail};
//!
//! let mut hooks = HookChain::new();
//! hooks.push(|mail: &mut Mail| {
//!     mail.set_subject("[Newsletter] Spring sale");
//! });
//!
//! let mut mail = Mail::new();
//! hooks.run(&mut mail, None);
//! assert_eq!(mail.subject(), &"[Newsletter] Spring sale");
//! ```

use std::fmt::{self, Debug, Formatter};

use crate::{Mail, Notifier};

/// A rewrite applied to a mail before validation
///
/// The audit notifier given to hooks is the one resolved for the whole transmission: in
/// audit mode without an explicit audit notifier, hooks already report to the logger.
pub trait Hook: Send + Sync {
    /// Rewrites `mail`, optionally reporting to `audit`
    fn before_validation(&self, mail: &mut Mail, audit: Option<&dyn Notifier>);
}

impl<F> Hook for F
where
    F: Fn(&mut Mail) + Send + Sync,
{
    fn before_validation(&self, mail: &mut Mail, _audit: Option<&dyn Notifier>) {
        self(mail)
    }
}

/// Ordered list of hooks, run first to last
#[derive(Default)]
pub struct HookChain {
    hooks: Vec<Box<dyn Hook>>,
}

impl HookChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a hook, it will run after the ones already registered
    pub fn push<H: Hook + 'static>(&mut self, hook: H) -> &mut Self {
        self.hooks.push(Box::new(hook));
        self
    }

    /// Inserts a hook in first position
    pub fn prepend<H: Hook + 'static>(&mut self, hook: H) -> &mut Self {
        self.hooks.insert(0, Box::new(hook));
        self
    }

    /// Removes every registered hook
    pub fn clear(&mut self) -> &mut Self {
        self.hooks.clear();
        self
    }

    pub fn len(&self) -> usize {
        self.hooks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hooks.is_empty()
    }

    /// Runs every hook in order against `mail`
    pub fn run(&self, mail: &mut Mail, audit: Option<&dyn Notifier>) {
        for hook in &self.hooks {
            hook.before_validation(mail, audit);
        }
    }
}

impl Debug for HookChain {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("HookChain")
            .field("len", &self.hooks.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn append(suffix: &'static str) -> impl Fn(&mut Mail) + Send + Sync {
        move |mail: &mut Mail| {
            let subject = format!("{}{suffix}", mail.subject());
            mail.set_subject(subject);
        }
    }

    #[test]
    fn hooks_run_in_order() {
        let mut hooks = HookChain::new();
        hooks.push(append("b")).push(append("c")).prepend(append("a"));
        assert_eq!(hooks.len(), 3);

        let mut mail = Mail::new();
        hooks.run(&mut mail, None);
        assert_eq!(mail.subject(), &"abc");
    }

    #[test]
    fn clear_removes_every_hook() {
        let mut hooks = HookChain::new();
        hooks.push(append("a"));
        hooks.clear();
        assert!(hooks.is_empty());

        let mut mail = Mail::new();
        hooks.run(&mut mail, None);
        assert!(mail.subject().is_empty());
    }
}
