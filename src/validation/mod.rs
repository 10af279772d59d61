//! Input validation for walkthrough steps
//!
//! - `Matcher` compares typed input against an expected value
//! - `FieldCheck` ties a matcher to a live field, the user-facing messages
//!   and the acknowledgment timer
//! - `Notifier` is how validation talks to the user

pub mod ack;
mod field;

pub use ack::{AckTimer, Acknowledgment, DEFAULT_ACK_DELAY};
pub use field::{FieldRegistry, InputField};

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

/// Shows a blocking message to the user
pub trait Notifier {
    fn alert(&self, message: &str);
}

pub type SharedNotifier = Rc<dyn Notifier>;

/// Notifier for non-interactive runs: messages go to the log
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn alert(&self, message: &str) {
        tracing::info!(message, "Alert");
    }
}

/// FIFO of pending alerts, drained by the TUI one dialog at a time
#[derive(Debug, Default, Clone)]
pub struct AlertQueue {
    pending: Rc<RefCell<VecDeque<String>>>,
}

impl AlertQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pop(&self) -> Option<String> {
        self.pending.borrow_mut().pop_front()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.borrow().is_empty()
    }

    pub fn len(&self) -> usize {
        self.pending.borrow().len()
    }
}

impl Notifier for AlertQueue {
    fn alert(&self, message: &str) {
        self.pending.borrow_mut().push_back(message.to_string());
    }
}

/// How typed input is compared against the expected value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Matcher {
    /// Transaction code: case-insensitive, `/n` shorthand accepted
    Command(String),
    /// Exact, case-sensitive match
    Exact(String),
}

impl Matcher {
    pub fn expected(&self) -> &str {
        match self {
            Matcher::Command(expected) | Matcher::Exact(expected) => expected,
        }
    }

    pub fn matches(&self, input: &str) -> bool {
        match self {
            Matcher::Command(expected) => {
                let value = input.trim().to_uppercase();
                let expected = expected.to_uppercase();
                value == expected || value.strip_prefix("/N") == Some(expected.as_str())
            }
            Matcher::Exact(expected) => input == expected,
        }
    }
}

/// A check of one field against one expected value
#[derive(Clone)]
pub struct FieldCheck {
    field: InputField,
    matcher: Matcher,
    success_message: String,
    failure_message: String,
    notifier: SharedNotifier,
    ack: AckTimer,
}

impl FieldCheck {
    pub fn new(
        field: InputField,
        matcher: Matcher,
        notifier: SharedNotifier,
        ack: AckTimer,
    ) -> Self {
        Self {
            field,
            matcher,
            success_message: String::new(),
            failure_message: String::new(),
            notifier,
            ack,
        }
    }

    pub fn with_messages(mut self, success: impl Into<String>, failure: impl Into<String>) -> Self {
        self.success_message = success.into();
        self.failure_message = failure.into();
        self
    }

    pub fn field(&self) -> &InputField {
        &self.field
    }

    pub fn matcher(&self) -> &Matcher {
        &self.matcher
    }

    /// Compare the field's current value without side effects
    pub fn is_satisfied(&self) -> bool {
        self.matcher.matches(&self.field.value())
    }

    /// Run the check the way the "check" button does.
    ///
    /// On a match the field is highlighted and an acknowledgment is
    /// scheduled; the advance happens when it fires. On a mismatch the user
    /// is told what to type and the field is refocused.
    pub fn confirm(&self) -> bool {
        if self.is_satisfied() {
            self.field.highlight();
            tracing::debug!(field = self.field.id(), "Check passed, acknowledgment scheduled");
            self.ack.schedule(Acknowledgment {
                message: non_empty(&self.success_message),
            });
            true
        } else {
            self.reject();
            false
        }
    }

    /// Predicate for the sequencer: alerts and refocuses on mismatch
    pub fn gate(&self) -> impl FnMut() -> bool + 'static {
        let check = self.clone();
        move || {
            if check.is_satisfied() {
                check.field.highlight();
                true
            } else {
                check.reject();
                false
            }
        }
    }

    fn reject(&self) {
        tracing::debug!(
            field = self.field.id(),
            expected = self.matcher.expected(),
            "Check failed"
        );
        if !self.failure_message.is_empty() {
            self.notifier.alert(&self.failure_message);
        }
        self.field.focus();
    }
}

fn non_empty(message: &str) -> Option<String> {
    if message.is_empty() {
        None
    } else {
        Some(message.to_string())
    }
}
