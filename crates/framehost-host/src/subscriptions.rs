use std::collections::HashMap;

use framehost_codec::MessageType;
use tokio::sync::mpsc::error::TryRecvError;

use crate::error::Result;
use crate::reply::ReplyTo;
use crate::services::PositionReceiver;

struct Subscription {
    reply: ReplyTo,
    updates: PositionReceiver,
    closed: bool,
}

/// Sentinels subscribed to position updates, with the channel each one
/// receives updates on.
///
/// A sentinel is registered at most once and never removed; when the
/// service drops its sender the entry stays, marked closed.
#[derive(Default)]
pub struct SubscriptionRegistry {
    index: HashMap<String, usize>,
    entries: Vec<Subscription>,
}

impl SubscriptionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_subscribed(&self, sentinel: &str) -> bool {
        self.index.contains_key(sentinel)
    }

    /// Register the subscription for `reply`'s sentinel.
    ///
    /// Returns false, dropping `updates`, if the sentinel is already registered.
    pub fn insert(&mut self, reply: ReplyTo, updates: PositionReceiver) -> bool {
        if self.is_subscribed(reply.sentinel()) {
            return false;
        }
        self.index
            .insert(reply.sentinel().to_string(), self.entries.len());
        self.entries.push(Subscription {
            reply,
            updates,
            closed: false,
        });
        true
    }

    /// Forward every queued update as a `position` message.
    ///
    /// Subscriptions are drained in registration order, each one in the order
    /// its updates were sent. Returns the number of messages posted.
    pub fn flush(&mut self) -> Result<usize> {
        let mut forwarded = 0usize;
        for entry in self.entries.iter_mut().filter(|entry| !entry.closed) {
            loop {
                match entry.updates.try_recv() {
                    Ok(data) => {
                        entry.reply.send(MessageType::Position, &data)?;
                        forwarded = forwarded.saturating_add(1);
                    }
                    Err(TryRecvError::Empty) => break,
                    Err(TryRecvError::Disconnected) => {
                        tracing::debug!(
                            sentinel = %entry.reply.sentinel(),
                            "position observer closed"
                        );
                        entry.closed = true;
                        break;
                    }
                }
            }
        }
        Ok(forwarded)
    }

    /// Whether the service side of `sentinel`'s subscription has gone away.
    pub fn is_closed(&self, sentinel: &str) -> bool {
        self.index
            .get(sentinel)
            .is_some_and(|&slot| self.entries[slot].closed)
    }

    /// Registered sentinels, in registration order.
    pub fn sentinels(&self) -> Vec<&str> {
        self.entries
            .iter()
            .map(|entry| entry.reply.sentinel())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
