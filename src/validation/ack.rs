//! Deferred acknowledgment after a successful check
//!
//! A successful field check waits a short, fixed delay before telling the
//! user and advancing. The timer is a one-shot tokio task; it cannot be
//! cancelled and carries no generation token, so if the user navigates
//! before it fires the advance applies to whatever step is current then.

use std::time::Duration;

use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use super::Notifier;
use crate::sequencer::{ShowHook, StepSequencer};

/// Default delay before a successful check advances
pub const DEFAULT_ACK_DELAY: Duration = Duration::from_millis(500);

/// Message shown when the acknowledgment fires, followed by an advance
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Acknowledgment {
    pub message: Option<String>,
}

#[derive(Debug, Clone)]
pub struct AckTimer {
    delay: Duration,
    tx: UnboundedSender<Acknowledgment>,
}

impl AckTimer {
    /// Create a timer and the receiver the UI loop drains
    pub fn channel(delay: Duration) -> (Self, UnboundedReceiver<Acknowledgment>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { delay, tx }, rx)
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Fire `ack` once after the delay
    pub fn schedule(&self, ack: Acknowledgment) {
        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            tracing::warn!("No async runtime; dropping acknowledgment");
            return;
        };

        let tx = self.tx.clone();
        let delay = self.delay;
        handle.spawn(async move {
            tokio::time::sleep(delay).await;
            if tx.send(ack).is_err() {
                tracing::debug!("Acknowledgment receiver closed");
            }
        });
    }
}

/// Apply a fired acknowledgment: tell the user, then advance
pub fn apply<H: ShowHook>(
    ack: Acknowledgment,
    sequencer: &mut StepSequencer<H>,
    notifier: &dyn Notifier,
) -> bool {
    if let Some(message) = ack.message {
        notifier.alert(&message);
    }
    let from = sequencer.current_index();
    let advanced = sequencer.advance();
    tracing::debug!(from, advanced, "Acknowledgment applied");
    advanced
}
