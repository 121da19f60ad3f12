//! Inbound channel for pushed config updates.
//!
//! The realtime subscription lives on the JS side; it forwards raw payloads
//! through a [`ConfigPublisher`]. The controller drains the matching
//! [`ConfigFeed`] on each tick. Dropping the publisher marks the subscription
//! as gone; the controller then keeps its last known config.

use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};

pub fn config_channel() -> (ConfigPublisher, ConfigFeed) {
    let (tx, rx) = mpsc::channel();
    (ConfigPublisher { tx }, ConfigFeed { rx })
}

#[derive(Clone, Debug)]
pub struct ConfigPublisher {
    tx: Sender<String>,
}

impl ConfigPublisher {
    /// Queue a raw JSON payload. Returns false once the controller side is gone.
    pub fn publish(&self, payload: impl Into<String>) -> bool {
        self.tx.send(payload.into()).is_ok()
    }
}

#[derive(Debug)]
pub struct ConfigFeed {
    rx: Receiver<String>,
}

/// Result of draining the feed once.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct FeedPoll {
    pub payloads: Vec<String>,
    /// Every publisher has been dropped.
    pub closed: bool,
}

impl ConfigFeed {
    pub fn poll(&self) -> FeedPoll {
        let mut out = FeedPoll::default();
        loop {
            match self.rx.try_recv() {
                Ok(payload) => out.payloads.push(payload),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    out.closed = true;
                    break;
                }
            }
        }
        out
    }
}
